use crate::{
    devices,
    signals::{self, signal, waker},
    util::{
        async_flag,
        runnable::{Exited, Runnable},
    },
};
use async_trait::async_trait;
use futures::stream::StreamExt;
use maplit::hashmap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
}

/// Software switch.
///
/// The state follows values arriving on [SignalIdentifier::Input] and can
/// also be set programmatically; either way the current state is published
/// on [SignalIdentifier::Output]. Starts off.
#[derive(Debug)]
pub struct Device {
    configuration: Configuration,

    signals_targets_changed_waker: waker::TargetsChangedWaker,
    signals_sources_changed_waker: waker::SourcesChangedWaker,
    signal_input: signal::state_target_queued::Signal<bool>,
    signal_output: signal::state_source::Signal<bool>,
}
impl Device {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,

            signals_targets_changed_waker: waker::TargetsChangedWaker::new(),
            signals_sources_changed_waker: waker::SourcesChangedWaker::new(),
            signal_input: signal::state_target_queued::Signal::<bool>::new(),
            signal_output: signal::state_source::Signal::<bool>::new(Some(false)),
        }
    }

    pub fn state(&self) -> bool {
        self.signal_output.peek_last().unwrap_or(false)
    }
    pub fn set(
        &self,
        value: bool,
    ) {
        if self.signal_output.set_one(Some(value)) {
            log::debug!("{}: set {}", self.configuration.name, value);
            self.signals_sources_changed_waker.wake();
        }
    }

    fn signals_targets_changed(&self) {
        let mut signals_sources_changed = false;

        for value in self.signal_input.take_pending().into_vec().into_iter().flatten() {
            if self.signal_output.set_one(Some(value)) {
                log::debug!("{}: set {}", self.configuration.name, value);
                signals_sources_changed = true;
            }
        }

        if signals_sources_changed {
            self.signals_sources_changed_waker.wake();
        }
    }

    async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        self.signals_targets_changed_waker
            .stream(true)
            .take_until(exit_flag)
            .for_each(|()| async move {
                self.signals_targets_changed();
            })
            .await;

        Exited
    }
}
impl devices::Device for Device {
    fn class(&self) -> Cow<'static, str> {
        Cow::from("soft/switch_a")
    }

    fn as_runnable(&self) -> Option<&dyn Runnable> {
        Some(self)
    }
    fn as_signals_device_base(&self) -> &dyn signals::DeviceBase {
        self
    }
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SignalIdentifier {
    Input,
    Output,
}
impl signals::Identifier for SignalIdentifier {}
impl signals::Device for Device {
    fn targets_changed_waker(&self) -> Option<&waker::TargetsChangedWaker> {
        Some(&self.signals_targets_changed_waker)
    }
    fn sources_changed_waker(&self) -> Option<&waker::SourcesChangedWaker> {
        Some(&self.signals_sources_changed_waker)
    }

    type Identifier = SignalIdentifier;
    fn by_identifier(&self) -> signals::ByIdentifier<'_, Self::Identifier> {
        hashmap! {
            SignalIdentifier::Input => &self.signal_input as &dyn signal::Base,
            SignalIdentifier::Output => &self.signal_output as &dyn signal::Base,
        }
    }
}
#[async_trait]
impl Runnable for Device {
    async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        self.run(exit_flag).await
    }
}

#[cfg(test)]
mod tests {
    use super::{Configuration, Device};
    use crate::signals::{signal::StateTargetRemoteBase, types::ValueErased};

    fn device() -> Device {
        Device::new(Configuration {
            name: "switch".to_owned(),
        })
    }

    #[test]
    fn starts_off() {
        let device = device();
        assert!(!device.state());
    }

    #[test]
    fn set_updates_output() {
        let device = device();

        device.set(true);
        assert!(device.state());
        assert_eq!(device.signal_output.peek_last(), Some(true));
    }

    #[test]
    fn input_forwarded_to_output() {
        let device = device();

        let values: [Option<ValueErased>; 2] = [Some(Box::new(true)), Some(Box::new(false))];
        assert!(StateTargetRemoteBase::set(&device.signal_input, &values));

        device.signals_targets_changed();
        assert!(!device.state());
    }
}

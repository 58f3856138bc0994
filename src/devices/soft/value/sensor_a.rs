use crate::{
    datatypes::real::Real,
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

/// Software value sensor.
///
/// Values are either published programmatically (measurement inputs) or
/// arrive on [SignalIdentifier::Input] (computed outputs); both end up on
/// [SignalIdentifier::Output]. Starts with no value.
#[derive(Debug)]
pub struct Device {
    configuration: Configuration,

    signals_targets_changed_waker: waker::TargetsChangedWaker,
    signals_sources_changed_waker: waker::SourcesChangedWaker,
    signal_input: signal::state_target_queued::Signal<Real>,
    signal_output: signal::state_source::Signal<Real>,
}
impl Device {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,

            signals_targets_changed_waker: waker::TargetsChangedWaker::new(),
            signals_sources_changed_waker: waker::SourcesChangedWaker::new(),
            signal_input: signal::state_target_queued::Signal::<Real>::new(),
            signal_output: signal::state_source::Signal::<Real>::new(None),
        }
    }

    pub fn value(&self) -> Option<Real> {
        self.signal_output.peek_last()
    }
    pub fn publish(
        &self,
        value: Real,
    ) {
        if self.signal_output.set_one(Some(value)) {
            log::debug!("{}: published {}", self.configuration.name, value);
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
        Cow::from("soft/value/sensor_a")
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
    use crate::datatypes::real::Real;

    #[test]
    fn publish_updates_value() {
        let device = Device::new(Configuration {
            name: "sensor".to_owned(),
        });
        assert_eq!(device.value(), None);

        device.publish(Real::from_f64(230.0).unwrap());
        assert_eq!(device.value(), Some(Real::from_f64(230.0).unwrap()));
    }
}

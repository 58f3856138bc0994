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
use std::{
    borrow::Cow,
    sync::atomic::{AtomicUsize, Ordering},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
}

/// Software momentary button, pressed through [SignalIdentifier::Press]
/// events. Keeps a press counter.
#[derive(Debug)]
pub struct Device {
    configuration: Configuration,

    presses: AtomicUsize,

    signals_targets_changed_waker: waker::TargetsChangedWaker,
    signal_press: signal::event_target_queued::Signal<()>,
}
impl Device {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,

            presses: AtomicUsize::new(0),

            signals_targets_changed_waker: waker::TargetsChangedWaker::new(),
            signal_press: signal::event_target_queued::Signal::<()>::new(),
        }
    }

    pub fn presses(&self) -> usize {
        self.presses.load(Ordering::Relaxed)
    }

    fn signals_targets_changed(&self) {
        let count = self.signal_press.take_pending().len();
        if count > 0 {
            self.presses.fetch_add(count, Ordering::Relaxed);
            log::info!("{}: pressed (x{})", self.configuration.name, count);
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
        Cow::from("soft/button_a")
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
    Press,
}
impl signals::Identifier for SignalIdentifier {}
impl signals::Device for Device {
    fn targets_changed_waker(&self) -> Option<&waker::TargetsChangedWaker> {
        Some(&self.signals_targets_changed_waker)
    }

    type Identifier = SignalIdentifier;
    fn by_identifier(&self) -> signals::ByIdentifier<'_, Self::Identifier> {
        hashmap! {
            SignalIdentifier::Press => &self.signal_press as &dyn signal::Base,
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
    use crate::signals::{signal::EventTargetRemoteBase, types::ValueErased};

    #[test]
    fn counts_presses() {
        let device = Device::new(Configuration {
            name: "button".to_owned(),
        });

        let values: [ValueErased; 2] = [Box::new(()), Box::new(())];
        assert!(EventTargetRemoteBase::push(&device.signal_press, &values));
        device.signals_targets_changed();

        assert_eq!(device.presses(), 2);
    }
}

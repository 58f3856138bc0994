use crate::{
    devices,
    signals::{self, signal, waker},
};
use maplit::hashmap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
}

/// Software binary sensor, published programmatically. Starts inactive.
#[derive(Debug)]
pub struct Device {
    configuration: Configuration,

    signals_sources_changed_waker: waker::SourcesChangedWaker,
    signal_output: signal::state_source::Signal<bool>,
}
impl Device {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,

            signals_sources_changed_waker: waker::SourcesChangedWaker::new(),
            signal_output: signal::state_source::Signal::<bool>::new(Some(false)),
        }
    }

    pub fn value(&self) -> bool {
        self.signal_output.peek_last().unwrap_or(false)
    }
    pub fn publish(
        &self,
        value: bool,
    ) {
        if self.signal_output.set_one(Some(value)) {
            log::debug!("{}: published {}", self.configuration.name, value);
            self.signals_sources_changed_waker.wake();
        }
    }
}
impl devices::Device for Device {
    fn class(&self) -> Cow<'static, str> {
        Cow::from("soft/binary_sensor_a")
    }

    fn as_signals_device_base(&self) -> &dyn signals::DeviceBase {
        self
    }
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SignalIdentifier {
    Output,
}
impl signals::Identifier for SignalIdentifier {}
impl signals::Device for Device {
    fn sources_changed_waker(&self) -> Option<&waker::SourcesChangedWaker> {
        Some(&self.signals_sources_changed_waker)
    }

    type Identifier = SignalIdentifier;
    fn by_identifier(&self) -> signals::ByIdentifier<'_, Self::Identifier> {
        hashmap! {
            SignalIdentifier::Output => &self.signal_output as &dyn signal::Base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Configuration, Device};

    #[test]
    fn publish_updates_value() {
        let device = Device::new(Configuration {
            name: "sensor".to_owned(),
        });
        assert!(!device.value());

        device.publish(true);
        assert!(device.value());
    }
}

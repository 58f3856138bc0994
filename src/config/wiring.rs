use super::{Config, Platform};
use crate::devices::{
    self,
    genset::controller,
    helpers::{DeviceHandle, Devices, Signals},
    soft::{binary_sensor_a, button_a, switch_a, value::sensor_a},
};
use crate::signals::exchanger::ConnectionRequested;
use anyhow::{anyhow, Error};
use std::collections::HashMap;

/// Devices of a configured installation.
///
/// One soft device per declared component plus the generator controller,
/// owned here so the runner can borrow them.
#[derive(Debug)]
pub struct Installation {
    switches: HashMap<String, switch_a::Device>,
    sensors: HashMap<String, sensor_a::Device>,
    binary_sensors: HashMap<String, binary_sensor_a::Device>,
    buttons: HashMap<String, button_a::Device>,
    controller: controller::Device,
}
impl Installation {
    pub fn new(config: &Config) -> Self {
        let mut switches = HashMap::<String, switch_a::Device>::new();
        let mut sensors = HashMap::<String, sensor_a::Device>::new();
        let mut binary_sensors = HashMap::<String, binary_sensor_a::Device>::new();
        let mut buttons = HashMap::<String, button_a::Device>::new();

        for component in config.components.iter() {
            let id = component.id.clone();
            match component.platform {
                Platform::Switch => {
                    switches.insert(
                        id.clone(),
                        switch_a::Device::new(switch_a::Configuration { name: id }),
                    );
                }
                Platform::Sensor => {
                    sensors.insert(
                        id.clone(),
                        sensor_a::Device::new(sensor_a::Configuration { name: id }),
                    );
                }
                Platform::BinarySensor => {
                    binary_sensors.insert(
                        id.clone(),
                        binary_sensor_a::Device::new(binary_sensor_a::Configuration { name: id }),
                    );
                }
                Platform::Button => {
                    buttons.insert(
                        id.clone(),
                        button_a::Device::new(button_a::Configuration { name: id }),
                    );
                }
            }
        }

        let generator_control = &config.generator_control;
        let controller = controller::Device::new(controller::Configuration::new(
            "generator_control".to_owned(),
            generator_control.relays.len(),
            generator_control.analog_sensors.len(),
            generator_control.binary_sensors.len(),
            generator_control.modbus_sensors.len(),
            generator_control.buttons.len(),
            generator_control.output_sensors.len(),
        ));

        Self {
            switches,
            sensors,
            binary_sensors,
            buttons,
            controller,
        }
    }

    pub fn controller(&self) -> &controller::Device {
        &self.controller
    }
    pub fn switch(
        &self,
        id: &str,
    ) -> Option<&switch_a::Device> {
        self.switches.get(id)
    }
    pub fn sensor(
        &self,
        id: &str,
    ) -> Option<&sensor_a::Device> {
        self.sensors.get(id)
    }
    pub fn binary_sensor(
        &self,
        id: &str,
    ) -> Option<&binary_sensor_a::Device> {
        self.binary_sensors.get(id)
    }
    pub fn button(
        &self,
        id: &str,
    ) -> Option<&button_a::Device> {
        self.buttons.get(id)
    }

    /// Device registry and signal connections for the runner.
    ///
    /// Every listed reference produces exactly one connection, in key order
    /// and list order of the `generator_control` section.
    pub fn registrations(
        &self,
        config: &Config,
    ) -> Result<Registrations<'_>, Error> {
        let mut device_registry = Devices::new();

        let controller_handle = device_registry.add(&self.controller);

        let mut switch_handles = HashMap::<&str, DeviceHandle<'_, switch_a::Device>>::new();
        let mut sensor_handles = HashMap::<&str, DeviceHandle<'_, sensor_a::Device>>::new();
        let mut binary_sensor_handles =
            HashMap::<&str, DeviceHandle<'_, binary_sensor_a::Device>>::new();
        let mut button_handles = HashMap::<&str, DeviceHandle<'_, button_a::Device>>::new();

        for component in config.components.iter() {
            let id = component.id.as_str();
            match component.platform {
                Platform::Switch => {
                    let device = self
                        .switches
                        .get(id)
                        .ok_or_else(|| anyhow!("switch {:?} not built", id))?;
                    switch_handles.insert(id, device_registry.add(device));
                }
                Platform::Sensor => {
                    let device = self
                        .sensors
                        .get(id)
                        .ok_or_else(|| anyhow!("sensor {:?} not built", id))?;
                    sensor_handles.insert(id, device_registry.add(device));
                }
                Platform::BinarySensor => {
                    let device = self
                        .binary_sensors
                        .get(id)
                        .ok_or_else(|| anyhow!("binary sensor {:?} not built", id))?;
                    binary_sensor_handles.insert(id, device_registry.add(device));
                }
                Platform::Button => {
                    let device = self
                        .buttons
                        .get(id)
                        .ok_or_else(|| anyhow!("button {:?} not built", id))?;
                    button_handles.insert(id, device_registry.add(device));
                }
            }
        }

        let switch_handle = |id: &str| {
            switch_handles
                .get(id)
                .copied()
                .ok_or_else(|| anyhow!("switch {:?} not found", id))
        };
        let sensor_handle = |id: &str| {
            sensor_handles
                .get(id)
                .copied()
                .ok_or_else(|| anyhow!("sensor {:?} not found", id))
        };

        let mut signals = Signals::new();
        let generator_control = &config.generator_control;

        signals.d2d(
            switch_handle(&generator_control.control_switch)?,
            switch_a::SignalIdentifier::Output,
            controller_handle,
            controller::SignalIdentifier::ControlSwitch,
        );
        signals.d2d(
            switch_handle(&generator_control.control_ac)?,
            switch_a::SignalIdentifier::Output,
            controller_handle,
            controller::SignalIdentifier::ControlAc,
        );
        for (index, id) in generator_control.relays.iter().enumerate() {
            signals.d2d(
                controller_handle,
                controller::SignalIdentifier::Relay(index),
                switch_handle(id)?,
                switch_a::SignalIdentifier::Input,
            );
        }
        for (index, id) in generator_control.analog_sensors.iter().enumerate() {
            signals.d2d(
                sensor_handle(id)?,
                sensor_a::SignalIdentifier::Output,
                controller_handle,
                controller::SignalIdentifier::AnalogSensor(index),
            );
        }
        for (index, id) in generator_control.binary_sensors.iter().enumerate() {
            let handle = binary_sensor_handles
                .get(id.as_str())
                .copied()
                .ok_or_else(|| anyhow!("binary sensor {:?} not found", id))?;
            signals.d2d(
                handle,
                binary_sensor_a::SignalIdentifier::Output,
                controller_handle,
                controller::SignalIdentifier::BinarySensor(index),
            );
        }
        for (index, id) in generator_control.modbus_sensors.iter().enumerate() {
            signals.d2d(
                sensor_handle(id)?,
                sensor_a::SignalIdentifier::Output,
                controller_handle,
                controller::SignalIdentifier::ModbusSensor(index),
            );
        }
        for (index, id) in generator_control.buttons.iter().enumerate() {
            let handle = button_handles
                .get(id.as_str())
                .copied()
                .ok_or_else(|| anyhow!("button {:?} not found", id))?;
            signals.d2d(
                controller_handle,
                controller::SignalIdentifier::Button(index),
                handle,
                button_a::SignalIdentifier::Press,
            );
        }
        for (index, id) in generator_control.output_sensors.iter().enumerate() {
            signals.d2d(
                controller_handle,
                controller::SignalIdentifier::OutputValue(index),
                sensor_handle(id)?,
                sensor_a::SignalIdentifier::Input,
            );
        }

        Ok(Registrations {
            devices_by_id: device_registry.into_devices_by_id(),
            connections_requested: signals.into_connections_requested(),
        })
    }
}

#[derive(Debug)]
pub struct Registrations<'p> {
    pub devices_by_id: HashMap<devices::Id, &'p dyn devices::Device>,
    pub connections_requested: Box<[ConnectionRequested]>,
}

#[cfg(test)]
mod tests {
    use super::Installation;
    use crate::{
        config::Config,
        datatypes::real::Real,
        devices::{genset::controller, runner::Runner, Device},
        signals::IdentifierBaseWrapper,
    };
    use serde_json::json;

    fn config() -> Config {
        Config::parse(
            &json!({
                "components": [
                    { "platform": "switch", "id": "control" },
                    { "platform": "switch", "id": "ac_present" },
                    { "platform": "switch", "id": "relay_fuel" },
                    { "platform": "switch", "id": "relay_engine" },
                    { "platform": "sensor", "id": "gen_voltage" },
                    { "platform": "binary_sensor", "id": "choke_closed" },
                    { "platform": "button", "id": "choke_close" },
                    { "platform": "button", "id": "choke_open" },
                    { "platform": "sensor", "id": "regime" },
                    { "platform": "sensor", "id": "step" },
                ],
                "generator_control": {
                    "control_switch": "control",
                    "control_ac": "ac_present",
                    "relays": ["relay_fuel", "relay_engine"],
                    "analog_sensors": ["gen_voltage"],
                    "binary_sensors": ["choke_closed"],
                    "buttons": ["choke_close", "choke_open"],
                    "output_sensors": ["regime", "step"],
                },
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn one_connection_per_reference_in_order() {
        let config = config();
        let installation = Installation::new(&config);
        let registrations = installation.registrations(&config).unwrap();

        // control_switch, control_ac, 2 relays, 1 analog, 1 binary,
        // 2 buttons, 2 output sensors
        assert_eq!(registrations.connections_requested.len(), 10);

        // every connection touches the controller (device #1) on exactly
        // one end; their order follows the section keys and list order
        let controller_signals = registrations
            .connections_requested
            .iter()
            .map(|(source, target)| {
                let controller_end = [source, target]
                    .into_iter()
                    .find(|reference| reference.device_id == 1)
                    .unwrap();
                controller_end.signal_identifier.clone()
            })
            .collect::<Vec<_>>();

        let expected = [
            controller::SignalIdentifier::ControlSwitch,
            controller::SignalIdentifier::ControlAc,
            controller::SignalIdentifier::Relay(0),
            controller::SignalIdentifier::Relay(1),
            controller::SignalIdentifier::AnalogSensor(0),
            controller::SignalIdentifier::BinarySensor(0),
            controller::SignalIdentifier::Button(0),
            controller::SignalIdentifier::Button(1),
            controller::SignalIdentifier::OutputValue(0),
            controller::SignalIdentifier::OutputValue(1),
        ]
        .into_iter()
        .map(IdentifierBaseWrapper::new)
        .collect::<Vec<_>>();
        assert_eq!(controller_signals, expected);

        // measurements flow into the controller, actions flow out of it
        assert_eq!(registrations.connections_requested[0].1.device_id, 1);
        assert_eq!(registrations.connections_requested[2].0.device_id, 1);
    }

    #[test]
    fn installation_exposes_configured_devices() {
        let config = config();
        let installation = Installation::new(&config);

        assert_eq!(installation.controller().class(), "genset/controller");

        let control = installation.switch("control").unwrap();
        control.set(true);
        assert!(control.state());

        let voltage = installation.sensor("gen_voltage").unwrap();
        voltage.publish(Real::from_f64(230.0).unwrap());
        assert_eq!(voltage.value(), Some(Real::from_f64(230.0).unwrap()));

        let choke_closed = installation.binary_sensor("choke_closed").unwrap();
        choke_closed.publish(true);
        assert!(choke_closed.value());

        assert_eq!(installation.button("choke_close").unwrap().presses(), 0);

        // ids resolve within their own platform only
        assert!(installation.switch("gen_voltage").is_none());
        assert!(installation.sensor("control").is_none());
        assert!(installation.binary_sensor("missing").is_none());
        assert!(installation.button("missing").is_none());
    }

    #[test]
    fn omitted_optional_lists_produce_no_connections() {
        let config = Config::parse(
            &json!({
                "components": [
                    { "platform": "switch", "id": "control" },
                    { "platform": "switch", "id": "ac_present" },
                ],
                "generator_control": {
                    "control_switch": "control",
                    "control_ac": "ac_present",
                    "relays": [],
                },
            })
            .to_string(),
        )
        .unwrap();

        let installation = Installation::new(&config);
        let registrations = installation.registrations(&config).unwrap();

        // only the two control connections remain
        assert_eq!(registrations.connections_requested.len(), 2);
    }

    #[test]
    fn registrations_build_a_valid_runner() {
        let config = config();
        let installation = Installation::new(&config);
        let registrations = installation.registrations(&config).unwrap();

        Runner::new(
            &registrations.devices_by_id,
            &registrations.connections_requested,
        )
        .unwrap();
    }
}

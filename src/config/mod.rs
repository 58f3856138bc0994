pub mod wiring;

use anyhow::{bail, ensure, Context, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Switch,
    Sensor,
    BinarySensor,
    Button,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Component {
    pub platform: Platform,
    pub id: String,
}

/// The `generator_control` section.
///
/// All values are ids of declared components; list order is meaningful, the
/// controller addresses its peripherals by position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorControl {
    pub control_switch: String,
    pub control_ac: String,
    pub relays: Vec<String>,
    #[serde(default)]
    pub analog_sensors: Vec<String>,
    #[serde(default)]
    pub binary_sensors: Vec<String>,
    #[serde(default)]
    pub modbus_sensors: Vec<String>,
    #[serde(default)]
    pub buttons: Vec<String>,
    #[serde(default)]
    pub output_sensors: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub components: Vec<Component>,
    pub generator_control: GeneratorControl,
}
impl Config {
    pub fn parse(data: &str) -> Result<Self, Error> {
        let config = serde_json::from_str::<Self>(data).context("parsing")?;
        config.validate().context("validation")?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        let mut components_by_id = HashMap::<&str, Platform>::new();
        for component in self.components.iter() {
            ensure!(
                components_by_id
                    .insert(component.id.as_str(), component.platform)
                    .is_none(),
                "duplicated component id {:?}",
                component.id,
            );
        }

        let resolve = |id: &str, platform: Platform| -> Result<(), Error> {
            match components_by_id.get(id) {
                Some(found) if *found == platform => Ok(()),
                Some(found) => bail!(
                    "component {:?} has platform {:?}, expected {:?}",
                    id,
                    found,
                    platform
                ),
                None => bail!("component {:?} not found", id),
            }
        };

        let generator_control = &self.generator_control;

        resolve(&generator_control.control_switch, Platform::Switch).context("control_switch")?;
        resolve(&generator_control.control_ac, Platform::Switch).context("control_ac")?;
        for (index, id) in generator_control.relays.iter().enumerate() {
            resolve(id, Platform::Switch).with_context(|| format!("relays[{index}]"))?;
        }
        for (index, id) in generator_control.analog_sensors.iter().enumerate() {
            resolve(id, Platform::Sensor).with_context(|| format!("analog_sensors[{index}]"))?;
        }
        for (index, id) in generator_control.binary_sensors.iter().enumerate() {
            resolve(id, Platform::BinarySensor)
                .with_context(|| format!("binary_sensors[{index}]"))?;
        }
        for (index, id) in generator_control.modbus_sensors.iter().enumerate() {
            resolve(id, Platform::Sensor).with_context(|| format!("modbus_sensors[{index}]"))?;
        }
        for (index, id) in generator_control.buttons.iter().enumerate() {
            resolve(id, Platform::Button).with_context(|| format!("buttons[{index}]"))?;
        }
        for (index, id) in generator_control.output_sensors.iter().enumerate() {
            resolve(id, Platform::Sensor).with_context(|| format!("output_sensors[{index}]"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Config, anyhow::Error> {
        Config::parse(&value.to_string())
    }

    #[test]
    fn accepts_complete_config() {
        let config = parse(json!({
            "components": [
                { "platform": "switch", "id": "control" },
                { "platform": "switch", "id": "ac_present" },
                { "platform": "switch", "id": "relay_fuel" },
                { "platform": "sensor", "id": "gen_voltage" },
                { "platform": "binary_sensor", "id": "choke_closed" },
                { "platform": "button", "id": "choke_close" },
                { "platform": "sensor", "id": "regime" },
            ],
            "generator_control": {
                "control_switch": "control",
                "control_ac": "ac_present",
                "relays": ["relay_fuel"],
                "analog_sensors": ["gen_voltage"],
                "binary_sensors": ["choke_closed"],
                "buttons": ["choke_close"],
                "output_sensors": ["regime"],
            },
        }))
        .unwrap();

        // omitted optional keys default to empty
        assert!(config.generator_control.modbus_sensors.is_empty());
    }

    #[test]
    fn rejects_missing_control_switch() {
        let error = parse(json!({
            "components": [
                { "platform": "switch", "id": "ac_present" },
            ],
            "generator_control": {
                "control_ac": "ac_present",
                "relays": [],
            },
        }))
        .unwrap_err();
        assert!(error.to_string().contains("parsing"));
    }

    #[test]
    fn rejects_missing_control_ac() {
        assert!(parse(json!({
            "components": [
                { "platform": "switch", "id": "control" },
            ],
            "generator_control": {
                "control_switch": "control",
                "relays": [],
            },
        }))
        .is_err());
    }

    #[test]
    fn accepts_empty_relays() {
        assert!(parse(json!({
            "components": [
                { "platform": "switch", "id": "control" },
                { "platform": "switch", "id": "ac_present" },
            ],
            "generator_control": {
                "control_switch": "control",
                "control_ac": "ac_present",
                "relays": [],
            },
        }))
        .is_ok());
    }

    #[test]
    fn rejects_unknown_reference() {
        let error = parse(json!({
            "components": [
                { "platform": "switch", "id": "control" },
                { "platform": "switch", "id": "ac_present" },
            ],
            "generator_control": {
                "control_switch": "control",
                "control_ac": "ac_present",
                "relays": ["missing"],
            },
        }))
        .unwrap_err();
        assert!(format!("{error:#}").contains("relays[0]"));
    }

    #[test]
    fn rejects_platform_mismatch() {
        let error = parse(json!({
            "components": [
                { "platform": "switch", "id": "control" },
                { "platform": "switch", "id": "ac_present" },
                { "platform": "sensor", "id": "gen_voltage" },
            ],
            "generator_control": {
                "control_switch": "control",
                "control_ac": "ac_present",
                "relays": ["gen_voltage"],
            },
        }))
        .unwrap_err();
        assert!(format!("{error:#}").contains("expected Switch"));
    }

    #[test]
    fn rejects_duplicated_component_id() {
        let error = parse(json!({
            "components": [
                { "platform": "switch", "id": "control" },
                { "platform": "sensor", "id": "control" },
                { "platform": "switch", "id": "ac_present" },
            ],
            "generator_control": {
                "control_switch": "control",
                "control_ac": "ac_present",
                "relays": [],
            },
        }))
        .unwrap_err();
        assert!(format!("{error:#}").contains("duplicated component id"));
    }
}

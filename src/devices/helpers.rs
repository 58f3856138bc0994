use super::{Device, Id as DeviceId};
use crate::signals::{
    exchanger::{ConnectionRequested, DeviceSignalRef},
    Device as SignalsDevice, IdentifierBaseWrapper,
};
use std::collections::HashMap;

/// Registry of devices for a single installation.
///
/// Devices are borrowed, so the caller keeps ownership; [DeviceHandle]s
/// returned from [Devices::add] are used for typed signal wiring.
#[derive(Debug)]
pub struct Devices<'d> {
    devices: Vec<&'d dyn Device>,
}
impl<'d> Devices<'d> {
    pub fn new() -> Self {
        Self {
            devices: Vec::<&'d dyn Device>::new(),
        }
    }

    pub fn add<D: Device + SignalsDevice>(
        &mut self,
        device: &'d D,
    ) -> DeviceHandle<'d, D> {
        let device_id = (self.devices.len() + 1) as DeviceId; // starts from 1
        self.devices.push(device);

        DeviceHandle::new(device_id, device)
    }

    pub fn into_devices_by_id(self) -> HashMap<DeviceId, &'d dyn Device> {
        self.devices
            .into_iter()
            .enumerate()
            .map(|(index, device)| ((index + 1) as DeviceId, device))
            .collect()
    }
}

#[derive(Debug)]
pub struct DeviceHandle<'d, D: Device + SignalsDevice> {
    device_id: DeviceId,
    device: &'d D,
}
impl<'d, D: Device + SignalsDevice> DeviceHandle<'d, D> {
    fn new(
        device_id: DeviceId,
        device: &'d D,
    ) -> Self {
        Self { device_id, device }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }
    pub fn device(&self) -> &'d D {
        self.device
    }
}
impl<'d, D: Device + SignalsDevice> Clone for DeviceHandle<'d, D> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'d, D: Device + SignalsDevice> Copy for DeviceHandle<'d, D> {}

#[derive(Debug)]
pub struct Signals {
    connections_requested: Vec<ConnectionRequested>,
}
impl Signals {
    pub fn new() -> Self {
        Self {
            connections_requested: Vec::<ConnectionRequested>::new(),
        }
    }

    // device to device
    pub fn d2d<SD: Device + SignalsDevice, TD: Device + SignalsDevice>(
        &mut self,
        source_device: DeviceHandle<'_, SD>,
        source_signal_identifier: <SD as SignalsDevice>::Identifier,
        target_device: DeviceHandle<'_, TD>,
        target_signal_identifier: <TD as SignalsDevice>::Identifier,
    ) {
        self.connections_requested.push((
            DeviceSignalRef::new(
                source_device.device_id(),
                IdentifierBaseWrapper::new(source_signal_identifier),
            ),
            DeviceSignalRef::new(
                target_device.device_id(),
                IdentifierBaseWrapper::new(target_signal_identifier),
            ),
        ));
    }

    pub fn into_connections_requested(self) -> Box<[ConnectionRequested]> {
        self.connections_requested.into_boxed_slice()
    }
}

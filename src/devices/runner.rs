use super::{Device, Id as DeviceId};
use crate::{
    signals::exchanger::{ConnectionRequested, Exchanger},
    util::{
        async_flag,
        runnable::{Exited, Runnable},
    },
};
use anyhow::{Context, Error};
use async_trait::async_trait;
use futures::{future::join_all, join};
use std::collections::HashMap;

/// Drives a set of devices: the signal exchanger plus the run loop of every
/// device exposing one.
pub struct Runner<'d> {
    exchanger: Exchanger<'d>,
    runnables: Box<[&'d dyn Runnable]>,
}
impl<'d> Runner<'d> {
    pub fn new(
        devices: &HashMap<DeviceId, &'d dyn Device>,
        connections_requested: &[ConnectionRequested],
    ) -> Result<Self, Error> {
        let signals_devices = devices
            .iter()
            .map(|(device_id, device)| (*device_id, device.as_signals_device_base()))
            .collect::<HashMap<_, _>>();
        let exchanger =
            Exchanger::new(&signals_devices, connections_requested).context("exchanger")?;

        let runnables = devices
            .values()
            .filter_map(|device| device.as_runnable())
            .collect::<Box<[_]>>();

        Ok(Self {
            exchanger,
            runnables,
        })
    }

    pub async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        let exchanger_runner = self.exchanger.run(exit_flag.clone());
        let runnables_runner = join_all(
            self.runnables
                .iter()
                .map(|runnable| runnable.run(exit_flag.clone())),
        );

        let (Exited, _) = join!(exchanger_runner, runnables_runner);

        Exited
    }
}
#[async_trait]
impl Runnable for Runner<'_> {
    async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        self.run(exit_flag).await
    }
}

use super::{
    signal::{
        EventSourceRemoteBase, EventTargetRemoteBase, RemoteBase, RemoteBaseVariant,
        StateSourceRemoteBase, StateTargetRemoteBase,
    },
    waker::{SourcesChangedWaker, TargetsChangedWaker},
    DeviceBase, IdentifierBaseWrapper,
};
use crate::{
    devices::Id as DeviceId,
    util::{
        async_flag,
        runnable::{Exited, Runnable},
    },
};
use anyhow::{anyhow, bail, ensure, Error};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct DeviceSignalRef {
    pub device_id: DeviceId,
    pub signal_identifier: IdentifierBaseWrapper,
}
impl DeviceSignalRef {
    pub fn new(
        device_id: DeviceId,
        signal_identifier: IdentifierBaseWrapper,
    ) -> Self {
        Self {
            device_id,
            signal_identifier,
        }
    }
}

// source -> target
pub type ConnectionRequested = (DeviceSignalRef, DeviceSignalRef);

struct StateRoute<'d> {
    source: &'d dyn StateSourceRemoteBase,
    targets: Vec<(DeviceId, &'d dyn StateTargetRemoteBase)>,
}
struct EventRoute<'d> {
    source: &'d dyn EventSourceRemoteBase,
    targets: Vec<(DeviceId, &'d dyn EventTargetRemoteBase)>,
}

struct SourceDeviceRoutes<'d> {
    sources_changed_waker: &'d SourcesChangedWaker,
    state: HashMap<IdentifierBaseWrapper, StateRoute<'d>>,
    event: HashMap<IdentifierBaseWrapper, EventRoute<'d>>,
}

/// Routes signal values between devices.
///
/// Constructed from the requested connection list; every connection is
/// resolved and checked here, so a miswired configuration fails before
/// anything runs.
pub struct Exchanger<'d> {
    targets_changed_wakers: HashMap<DeviceId, &'d TargetsChangedWaker>,
    routes_by_source_device: HashMap<DeviceId, SourceDeviceRoutes<'d>>,
    state_targets_disconnected: Vec<(DeviceId, &'d dyn StateTargetRemoteBase)>,
}
impl<'d> Exchanger<'d> {
    pub fn new(
        devices: &HashMap<DeviceId, &'d dyn DeviceBase>,
        connections_requested: &[ConnectionRequested],
    ) -> Result<Self, Error> {
        struct DeviceSignals<'d> {
            device: &'d dyn DeviceBase,
            signals: HashMap<IdentifierBaseWrapper, &'d dyn RemoteBase>,
        }

        let device_signals = devices
            .iter()
            .map(|(device_id, device)| {
                let signals = device
                    .by_identifier_erased()
                    .into_iter()
                    .map(|(identifier, signal)| (identifier, signal.as_remote_base()))
                    .collect::<HashMap<_, _>>();

                (
                    *device_id,
                    DeviceSignals {
                        device: *device,
                        signals,
                    },
                )
            })
            .collect::<HashMap<DeviceId, DeviceSignals<'d>>>();

        // devices with sources must expose a sources waker, devices with
        // targets a targets waker; all state targets start disconnected
        let mut targets_changed_wakers = HashMap::<DeviceId, &'d TargetsChangedWaker>::new();
        let mut state_targets_disconnected =
            HashMap::<DeviceSignalRef, (DeviceId, &'d dyn StateTargetRemoteBase)>::new();

        for (device_id, device_signals_) in device_signals.iter() {
            for (signal_identifier, remote_base) in device_signals_.signals.iter() {
                match remote_base.as_remote_base_variant() {
                    RemoteBaseVariant::StateSource(_) | RemoteBaseVariant::EventSource(_) => {
                        ensure!(
                            device_signals_.device.sources_changed_waker_base().is_some(),
                            "missing sources waker on device #{} ({}) with sources",
                            device_id,
                            device_signals_.device.type_name(),
                        );
                    }
                    RemoteBaseVariant::StateTarget(state_target_remote_base) => {
                        let targets_changed_waker = device_signals_
                            .device
                            .targets_changed_waker_base()
                            .ok_or_else(|| {
                                anyhow!(
                                    "missing targets waker on device #{} ({}) with targets",
                                    device_id,
                                    device_signals_.device.type_name(),
                                )
                            })?;
                        targets_changed_wakers.insert(*device_id, targets_changed_waker);

                        state_targets_disconnected.insert(
                            DeviceSignalRef::new(*device_id, signal_identifier.clone()),
                            (*device_id, state_target_remote_base),
                        );
                    }
                    RemoteBaseVariant::EventTarget(_) => {
                        let targets_changed_waker = device_signals_
                            .device
                            .targets_changed_waker_base()
                            .ok_or_else(|| {
                                anyhow!(
                                    "missing targets waker on device #{} ({}) with targets",
                                    device_id,
                                    device_signals_.device.type_name(),
                                )
                            })?;
                        targets_changed_wakers.insert(*device_id, targets_changed_waker);
                    }
                }
            }
        }

        let mut routes_by_source_device = HashMap::<DeviceId, SourceDeviceRoutes<'d>>::new();

        // each state target accepts at most one source; event connections
        // must not repeat
        let mut state_targets_connected = HashSet::<DeviceSignalRef>::new();
        let mut event_connections = HashSet::<(DeviceSignalRef, DeviceSignalRef)>::new();

        for (source, target) in connections_requested.iter() {
            let source_device = device_signals
                .get(&source.device_id)
                .ok_or_else(|| anyhow!("source device #{} not found", source.device_id))?;
            let source_remote_base = *source_device
                .signals
                .get(&source.signal_identifier)
                .ok_or_else(|| {
                    anyhow!(
                        "signal {:?} not found on source device #{} ({})",
                        source.signal_identifier,
                        source.device_id,
                        source_device.device.type_name(),
                    )
                })?;

            let target_device = device_signals
                .get(&target.device_id)
                .ok_or_else(|| anyhow!("target device #{} not found", target.device_id))?;
            let target_remote_base = *target_device
                .signals
                .get(&target.signal_identifier)
                .ok_or_else(|| {
                    anyhow!(
                        "signal {:?} not found on target device #{} ({})",
                        target.signal_identifier,
                        target.device_id,
                        target_device.device.type_name(),
                    )
                })?;

            ensure!(
                RemoteBase::type_id(source_remote_base) == RemoteBase::type_id(target_remote_base),
                "source #{} ({}) :: {:?} -> target #{} ({}) :: {:?} type mismatch: {} -> {}",
                source.device_id,
                source_device.device.type_name(),
                source.signal_identifier,
                target.device_id,
                target_device.device.type_name(),
                target.signal_identifier,
                source_remote_base.type_name(),
                target_remote_base.type_name(),
            );

            match (
                source_remote_base.as_remote_base_variant(),
                target_remote_base.as_remote_base_variant(),
            ) {
                (
                    RemoteBaseVariant::StateSource(state_source_remote_base),
                    RemoteBaseVariant::StateTarget(state_target_remote_base),
                ) => {
                    ensure!(
                        state_targets_connected.insert(target.clone()),
                        "multiple sources for target #{} ({}) :: {:?}",
                        target.device_id,
                        target_device.device.type_name(),
                        target.signal_identifier,
                    );
                    state_targets_disconnected.remove(target);

                    let routes = routes_by_source_device
                        .entry(source.device_id)
                        .or_insert_with(|| SourceDeviceRoutes {
                            // presence checked during signal iteration
                            sources_changed_waker: source_device
                                .device
                                .sources_changed_waker_base()
                                .unwrap(),
                            state: HashMap::new(),
                            event: HashMap::new(),
                        });
                    routes
                        .state
                        .entry(source.signal_identifier.clone())
                        .or_insert_with(|| StateRoute {
                            source: state_source_remote_base,
                            targets: Vec::new(),
                        })
                        .targets
                        .push((target.device_id, state_target_remote_base));
                }
                (
                    RemoteBaseVariant::EventSource(event_source_remote_base),
                    RemoteBaseVariant::EventTarget(event_target_remote_base),
                ) => {
                    ensure!(
                        event_connections.insert((source.clone(), target.clone())),
                        "duplicated connection #{} ({}) :: {:?} -> #{} ({}) :: {:?}",
                        source.device_id,
                        source_device.device.type_name(),
                        source.signal_identifier,
                        target.device_id,
                        target_device.device.type_name(),
                        target.signal_identifier,
                    );

                    let routes = routes_by_source_device
                        .entry(source.device_id)
                        .or_insert_with(|| SourceDeviceRoutes {
                            sources_changed_waker: source_device
                                .device
                                .sources_changed_waker_base()
                                .unwrap(),
                            state: HashMap::new(),
                            event: HashMap::new(),
                        });
                    routes
                        .event
                        .entry(source.signal_identifier.clone())
                        .or_insert_with(|| EventRoute {
                            source: event_source_remote_base,
                            targets: Vec::new(),
                        })
                        .targets
                        .push((target.device_id, event_target_remote_base));
                }
                (
                    RemoteBaseVariant::StateSource(_),
                    RemoteBaseVariant::EventTarget(_),
                )
                | (
                    RemoteBaseVariant::EventSource(_),
                    RemoteBaseVariant::StateTarget(_),
                ) => {
                    bail!(
                        "signal class mismatch #{} ({}) :: {:?} -> #{} ({}) :: {:?}",
                        source.device_id,
                        source_device.device.type_name(),
                        source.signal_identifier,
                        target.device_id,
                        target_device.device.type_name(),
                        target.signal_identifier,
                    );
                }
                _ => {
                    bail!(
                        "signal direction mismatch #{} ({}) :: {:?} -> #{} ({}) :: {:?}",
                        source.device_id,
                        source_device.device.type_name(),
                        source.signal_identifier,
                        target.device_id,
                        target_device.device.type_name(),
                        target.signal_identifier,
                    );
                }
            }
        }

        let state_targets_disconnected = state_targets_disconnected.into_values().collect();

        Ok(Self {
            targets_changed_wakers,
            routes_by_source_device,
            state_targets_disconnected,
        })
    }

    fn targets_changed_wake(
        &self,
        device_ids: HashSet<DeviceId>,
    ) {
        for device_id in device_ids {
            self.targets_changed_wakers
                .get(&device_id)
                .unwrap()
                .wake();
        }
    }

    // Pushes None into disconnected state targets and forwards last/pending
    // values of all sources, so every target starts from a defined value.
    fn initialize(&self) {
        let mut devices_to_wake = HashSet::<DeviceId>::new();

        for (device_id, state_target_remote_base) in self.state_targets_disconnected.iter() {
            if state_target_remote_base.set(&[None]) {
                devices_to_wake.insert(*device_id);
            }
        }

        for routes in self.routes_by_source_device.values() {
            for route in routes.state.values() {
                let mut values = route.source.take_pending();
                if values.is_empty() {
                    values = vec![route.source.peek_last()].into_boxed_slice();
                }

                for (target_device_id, state_target_remote_base) in route.targets.iter() {
                    if state_target_remote_base.set(&values) {
                        devices_to_wake.insert(*target_device_id);
                    }
                }
            }
            for route in routes.event.values() {
                let values = route.source.take_pending();
                if values.is_empty() {
                    continue;
                }

                for (target_device_id, event_target_remote_base) in route.targets.iter() {
                    if event_target_remote_base.push(&values) {
                        devices_to_wake.insert(*target_device_id);
                    }
                }
            }
        }

        self.targets_changed_wake(devices_to_wake);
    }

    fn device_sources_forward(
        &self,
        device_id: DeviceId,
    ) {
        let routes = match self.routes_by_source_device.get(&device_id) {
            Some(routes) => routes,
            None => return,
        };

        let mut devices_to_wake = HashSet::<DeviceId>::new();

        for route in routes.state.values() {
            let values = route.source.take_pending();
            if values.is_empty() {
                continue;
            }

            for (target_device_id, state_target_remote_base) in route.targets.iter() {
                if state_target_remote_base.set(&values) {
                    devices_to_wake.insert(*target_device_id);
                }
            }
        }
        for route in routes.event.values() {
            let values = route.source.take_pending();
            if values.is_empty() {
                continue;
            }

            for (target_device_id, event_target_remote_base) in route.targets.iter() {
                if event_target_remote_base.push(&values) {
                    devices_to_wake.insert(*target_device_id);
                }
            }
        }

        self.targets_changed_wake(devices_to_wake);
    }

    pub async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        self.initialize();

        let source_device_streams = self
            .routes_by_source_device
            .iter()
            .map(|(device_id, routes)| {
                let device_id = *device_id;
                routes
                    .sources_changed_waker
                    .stream(true)
                    .map(move |()| device_id)
                    .boxed()
            })
            .collect::<Vec<_>>();

        stream::select_all(source_device_streams)
            .take_until(exit_flag.clone())
            .for_each(|device_id| async move {
                self.device_sources_forward(device_id);
            })
            .await;

        // with no source devices the combined stream ends immediately
        exit_flag.await;

        Exited
    }
}
#[async_trait]
impl Runnable for Exchanger<'_> {
    async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        self.run(exit_flag).await
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceSignalRef, Exchanger};
    use crate::{
        devices::Id as DeviceId,
        signals::{
            self,
            signal::{self, StateTargetRemoteBase},
            waker::{SourcesChangedWaker, TargetsChangedWaker},
            DeviceBase, IdentifierBaseWrapper,
        },
    };
    use maplit::hashmap;
    use std::collections::HashMap;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum SignalIdentifier {
        Value,
    }
    impl signals::Identifier for SignalIdentifier {}

    #[derive(Debug)]
    struct SourceDevice {
        sources_changed_waker: SourcesChangedWaker,
        signal_output: signal::state_source::Signal<bool>,
    }
    impl SourceDevice {
        fn new() -> Self {
            Self {
                sources_changed_waker: SourcesChangedWaker::new(),
                signal_output: signal::state_source::Signal::<bool>::new(Some(false)),
            }
        }
    }
    impl signals::Device for SourceDevice {
        fn sources_changed_waker(&self) -> Option<&SourcesChangedWaker> {
            Some(&self.sources_changed_waker)
        }

        type Identifier = SignalIdentifier;
        fn by_identifier(&self) -> signals::ByIdentifier<'_, Self::Identifier> {
            hashmap! {
                SignalIdentifier::Value => &self.signal_output as &dyn signal::Base,
            }
        }
    }

    #[derive(Debug)]
    struct TargetDevice {
        targets_changed_waker: TargetsChangedWaker,
        signal_input: signal::state_target_queued::Signal<bool>,
    }
    impl TargetDevice {
        fn new() -> Self {
            Self {
                targets_changed_waker: TargetsChangedWaker::new(),
                signal_input: signal::state_target_queued::Signal::<bool>::new(),
            }
        }
    }
    impl signals::Device for TargetDevice {
        fn targets_changed_waker(&self) -> Option<&TargetsChangedWaker> {
            Some(&self.targets_changed_waker)
        }

        type Identifier = SignalIdentifier;
        fn by_identifier(&self) -> signals::ByIdentifier<'_, Self::Identifier> {
            hashmap! {
                SignalIdentifier::Value => &self.signal_input as &dyn signal::Base,
            }
        }
    }

    #[derive(Debug)]
    struct EventTargetDevice {
        targets_changed_waker: TargetsChangedWaker,
        signal_input: signal::event_target_queued::Signal<bool>,
    }
    impl signals::Device for EventTargetDevice {
        fn targets_changed_waker(&self) -> Option<&TargetsChangedWaker> {
            Some(&self.targets_changed_waker)
        }

        type Identifier = SignalIdentifier;
        fn by_identifier(&self) -> signals::ByIdentifier<'_, Self::Identifier> {
            hashmap! {
                SignalIdentifier::Value => &self.signal_input as &dyn signal::Base,
            }
        }
    }

    fn device_signal_ref(device_id: DeviceId) -> DeviceSignalRef {
        DeviceSignalRef::new(device_id, IdentifierBaseWrapper::new(SignalIdentifier::Value))
    }

    #[test]
    fn forwards_state_values() {
        let source_device = SourceDevice::new();
        let target_device = TargetDevice::new();

        let devices: HashMap<DeviceId, &dyn DeviceBase> = hashmap! {
            1 => &source_device as &dyn DeviceBase,
            2 => &target_device as &dyn DeviceBase,
        };
        let connections = [(device_signal_ref(1), device_signal_ref(2))];

        let exchanger = Exchanger::new(&devices, &connections).unwrap();

        // initial forward pushes the last value
        exchanger.initialize();
        assert_eq!(target_device.signal_input.peek_last(), Some(false));

        assert!(source_device.signal_output.set_one(Some(true)));
        exchanger.device_sources_forward(1);
        assert_eq!(target_device.signal_input.peek_last(), Some(true));
    }

    #[test]
    fn disconnected_target_initialized_with_none() {
        let target_device = TargetDevice::new();

        let devices: HashMap<DeviceId, &dyn DeviceBase> = hashmap! {
            1 => &target_device as &dyn DeviceBase,
        };

        let exchanger = Exchanger::new(&devices, &[]).unwrap();
        exchanger.initialize();

        let pending = target_device.signal_input.take_pending();
        assert_eq!(pending.as_ref(), [None]);
    }

    #[test]
    fn rejects_unknown_device() {
        let source_device = SourceDevice::new();

        let devices: HashMap<DeviceId, &dyn DeviceBase> = hashmap! {
            1 => &source_device as &dyn DeviceBase,
        };
        let connections = [(device_signal_ref(1), device_signal_ref(7))];

        let error = Exchanger::new(&devices, &connections).err().unwrap();
        assert!(error.to_string().contains("target device #7 not found"));
    }

    #[test]
    fn rejects_class_mismatch() {
        let source_device = SourceDevice::new();
        let event_target_device = EventTargetDevice {
            targets_changed_waker: TargetsChangedWaker::new(),
            signal_input: signal::event_target_queued::Signal::<bool>::new(),
        };

        let devices: HashMap<DeviceId, &dyn DeviceBase> = hashmap! {
            1 => &source_device as &dyn DeviceBase,
            2 => &event_target_device as &dyn DeviceBase,
        };
        let connections = [(device_signal_ref(1), device_signal_ref(2))];

        let error = Exchanger::new(&devices, &connections).err().unwrap();
        assert!(error.to_string().contains("signal class mismatch"));
    }

    #[test]
    fn rejects_multiple_sources_for_state_target() {
        let source_a = SourceDevice::new();
        let source_b = SourceDevice::new();
        let target_device = TargetDevice::new();

        let devices: HashMap<DeviceId, &dyn DeviceBase> = hashmap! {
            1 => &source_a as &dyn DeviceBase,
            2 => &source_b as &dyn DeviceBase,
            3 => &target_device as &dyn DeviceBase,
        };
        let connections = [
            (device_signal_ref(1), device_signal_ref(3)),
            (device_signal_ref(2), device_signal_ref(3)),
        ];

        let error = Exchanger::new(&devices, &connections).err().unwrap();
        assert!(error.to_string().contains("multiple sources"));
    }

    #[test]
    fn state_target_set_is_lossless() {
        let target = signal::state_target_queued::Signal::<bool>::new();

        let values: [Option<crate::signals::types::ValueErased>; 3] = [
            Some(Box::new(true)),
            Some(Box::new(false)),
            Some(Box::new(true)),
        ];
        assert!(StateTargetRemoteBase::set(&target, &values));

        let pending = target.take_pending();
        assert_eq!(pending.as_ref(), [Some(true), Some(false), Some(true)]);
    }
}

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
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Cow,
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio_stream::wrappers::IntervalStream;

// relay roles, by position on the relay list
pub const RELAY_FUEL: usize = 0;
pub const RELAY_ENGINE: usize = 1;
pub const RELAY_STARTER: usize = 2;
pub const RELAY_POWER: usize = 5;

// button roles
pub const BUTTON_CHOKE_CLOSE: usize = 0;
pub const BUTTON_CHOKE_OPEN: usize = 1;

// measurement roles
pub const ANALOG_GENERATOR_VOLTAGE: usize = 2;
pub const BINARY_CHOKE_CLOSED: usize = 4;

// output value roles
pub const OUTPUT_REGIME: usize = 0;
pub const OUTPUT_STEP: usize = 1;
pub const OUTPUT_TIMEOUT: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Regime {
    Null,
    Stop,
    Start,
    AcOk,
    AcFail,
}
impl Regime {
    fn code(self) -> u32 {
        match self {
            Regime::Null => 0,
            Regime::Stop => 1,
            Regime::Start => 2,
            Regime::AcOk => 3,
            Regime::AcFail => 4,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Step {
    Null,

    StartBegin,
    StartEngineOn,
    StartChokeClose,
    StartStarterOn,
    StartStarterWait,
    StartStarterStop,
    StartChokeOpen,
    StartPowerOn,
    StartWaitRestart,
    StartEnd,

    StopBegin,
    StopPowerOff,
    StopEngineOff,
    StopEnd,

    AcBegin,
    AcGenOff,
    AcGenOn,
}
impl Step {
    fn code(self) -> u32 {
        match self {
            Step::Null => 0,

            Step::StartBegin => 1,
            Step::StartEngineOn => 2,
            Step::StartChokeClose => 3,
            Step::StartStarterOn => 4,
            Step::StartStarterWait => 5,
            Step::StartStarterStop => 6,
            Step::StartChokeOpen => 7,
            Step::StartPowerOn => 8,
            Step::StartWaitRestart => 11,
            Step::StartEnd => 99,

            Step::StopBegin => 101,
            Step::StopPowerOff => 102,
            Step::StopEngineOff => 104,
            Step::StopEnd => 199,

            Step::AcBegin => 201,
            Step::AcGenOff => 202,
            Step::AcGenOn => 203,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,

    pub relays: usize,
    pub analog_sensors: usize,
    pub binary_sensors: usize,
    pub modbus_sensors: usize,
    pub buttons: usize,
    pub output_values: usize,

    pub tick_interval: Duration,
    pub fuel_prime_duration: Duration,
    pub cranking_duration: Duration,
    pub choke_open_delay: Duration,
    pub restart_pause: Duration,
    pub load_connect_delay: Duration,
    pub power_off_cooldown: Duration,
    pub ac_ok_stop_delay: Duration,
    pub ac_fail_start_delay: Duration,
    pub restarts_max: u32,
    pub generator_voltage_threshold: f64,
}
impl Configuration {
    pub fn new(
        name: String,
        relays: usize,
        analog_sensors: usize,
        binary_sensors: usize,
        modbus_sensors: usize,
        buttons: usize,
        output_values: usize,
    ) -> Self {
        Self {
            name,

            relays,
            analog_sensors,
            binary_sensors,
            modbus_sensors,
            buttons,
            output_values,

            tick_interval: Duration::from_millis(500),
            fuel_prime_duration: Duration::from_secs(5),
            cranking_duration: Duration::from_secs(15),
            choke_open_delay: Duration::from_secs(3),
            restart_pause: Duration::from_secs(15),
            load_connect_delay: Duration::from_secs(30),
            power_off_cooldown: Duration::from_secs(20),
            ac_ok_stop_delay: Duration::from_secs(15 * 60),
            ac_fail_start_delay: Duration::from_secs(30 * 60),
            restarts_max: 6,
            generator_voltage_threshold: 10.0,
        }
    }
}

#[derive(Debug)]
struct State {
    control_last: bool,
    control_ac_last: bool,

    sequence_running: bool,
    regime: Regime,
    step: Step,
    step_time_last: Option<Instant>,
    delay_until: Option<Instant>,
    cranking_until: Option<Instant>,
    restarts: u32,
    timeout_published: u32,

    analog_values: Box<[f64]>,
    binary_values: Box<[bool]>,
    modbus_values: Box<[f64]>,
}
impl State {
    fn new(configuration: &Configuration) -> Self {
        Self {
            control_last: false,
            control_ac_last: false,

            sequence_running: false,
            regime: Regime::Null,
            step: Step::Null,
            step_time_last: None,
            delay_until: None,
            cranking_until: None,
            restarts: 0,
            timeout_published: 0,

            analog_values: vec![0.0; configuration.analog_sensors].into_boxed_slice(),
            binary_values: vec![false; configuration.binary_sensors].into_boxed_slice(),
            modbus_values: vec![0.0; configuration.modbus_sensors].into_boxed_slice(),
        }
    }
}

/// Generator / AC transfer controller.
///
/// Watches the control switch and the mains presence flag and drives the
/// engine through start / stop sequences: fuel priming, choke handling,
/// cranking with retries, load connection and cool-down. Progress is
/// published on the output value signals as numeric regime / step codes
/// plus the running delay countdown in seconds.
#[derive(Debug)]
pub struct Device {
    configuration: Configuration,

    state: RwLock<State>,

    signals_targets_changed_waker: waker::TargetsChangedWaker,
    signals_sources_changed_waker: waker::SourcesChangedWaker,
    signal_control_switch: signal::state_target_queued::Signal<bool>,
    signal_control_ac: signal::state_target_queued::Signal<bool>,
    signal_relays: Box<[signal::state_source::Signal<bool>]>,
    signal_analog_sensors: Box<[signal::state_target_queued::Signal<Real>]>,
    signal_binary_sensors: Box<[signal::state_target_queued::Signal<bool>]>,
    signal_modbus_sensors: Box<[signal::state_target_queued::Signal<Real>]>,
    signal_buttons: Box<[signal::event_source::Signal<()>]>,
    signal_output_values: Box<[signal::state_source::Signal<Real>]>,
}
impl Device {
    pub fn new(configuration: Configuration) -> Self {
        let state = State::new(&configuration);

        // relays start off, the well-known output values start at zero
        let signal_relays = (0..configuration.relays)
            .map(|_| signal::state_source::Signal::<bool>::new(Some(false)))
            .collect::<Box<[_]>>();
        let signal_output_values = (0..configuration.output_values)
            .map(|index| {
                let initial = match index {
                    OUTPUT_REGIME | OUTPUT_STEP | OUTPUT_TIMEOUT => Some(Real::zero()),
                    _ => None,
                };
                signal::state_source::Signal::<Real>::new(initial)
            })
            .collect::<Box<[_]>>();

        Self {
            signals_targets_changed_waker: waker::TargetsChangedWaker::new(),
            signals_sources_changed_waker: waker::SourcesChangedWaker::new(),
            signal_control_switch: signal::state_target_queued::Signal::<bool>::new(),
            signal_control_ac: signal::state_target_queued::Signal::<bool>::new(),
            signal_relays,
            signal_analog_sensors: (0..configuration.analog_sensors)
                .map(|_| signal::state_target_queued::Signal::<Real>::new())
                .collect::<Box<[_]>>(),
            signal_binary_sensors: (0..configuration.binary_sensors)
                .map(|_| signal::state_target_queued::Signal::<bool>::new())
                .collect::<Box<[_]>>(),
            signal_modbus_sensors: (0..configuration.modbus_sensors)
                .map(|_| signal::state_target_queued::Signal::<Real>::new())
                .collect::<Box<[_]>>(),
            signal_buttons: (0..configuration.buttons)
                .map(|_| signal::event_source::Signal::<()>::new())
                .collect::<Box<[_]>>(),
            signal_output_values,

            state: RwLock::new(state),
            configuration,
        }
    }

    fn analog_value(
        &self,
        state: &State,
        index: usize,
    ) -> f64 {
        state.analog_values.get(index).copied().unwrap_or(0.0)
    }
    fn binary_value(
        &self,
        state: &State,
        index: usize,
    ) -> bool {
        state.binary_values.get(index).copied().unwrap_or(false)
    }

    fn relay_state(
        &self,
        index: usize,
    ) -> bool {
        self.signal_relays
            .get(index)
            .and_then(|signal| signal.peek_last())
            .unwrap_or(false)
    }
    fn relay_set(
        &self,
        index: usize,
        value: bool,
        sources_changed: &mut bool,
    ) {
        match self.signal_relays.get(index) {
            Some(signal) => {
                if signal.set_one(Some(value)) {
                    *sources_changed = true;
                }
            }
            None => log::warn!(
                "{}: relay #{} not configured, ignoring",
                self.configuration.name,
                index
            ),
        }
    }
    fn relays_all_off(
        &self,
        sources_changed: &mut bool,
    ) {
        for index in 0..self.signal_relays.len() {
            self.relay_set(index, false, sources_changed);
        }
    }

    fn button_press(
        &self,
        index: usize,
        sources_changed: &mut bool,
    ) {
        match self.signal_buttons.get(index) {
            Some(signal) => {
                log::info!("{}: pressing button #{}", self.configuration.name, index);
                if signal.push_one(()) {
                    *sources_changed = true;
                }
            }
            None => log::warn!(
                "{}: button #{} not configured, ignoring",
                self.configuration.name,
                index
            ),
        }
    }

    fn output_value_set(
        &self,
        index: usize,
        value: Real,
        sources_changed: &mut bool,
    ) {
        if let Some(signal) = self.signal_output_values.get(index) {
            if signal.set_one(Some(value)) {
                *sources_changed = true;
            }
        }
    }

    fn sequence_set(
        &self,
        state: &mut State,
        regime: Regime,
        step: Step,
        sources_changed: &mut bool,
    ) {
        state.regime = regime;
        state.step = step;
        self.output_value_set(OUTPUT_REGIME, Real::from(regime.code()), sources_changed);
        self.output_value_set(OUTPUT_STEP, Real::from(step.code()), sources_changed);
    }
    fn sequence_set_step(
        &self,
        state: &mut State,
        step: Step,
        sources_changed: &mut bool,
    ) {
        state.step = step;
        self.output_value_set(OUTPUT_STEP, Real::from(step.code()), sources_changed);
    }

    fn sequence_trigger_start(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        log::info!("{}: starting generator", self.configuration.name);
        state.sequence_running = true;
        self.sequence_set(state, Regime::Start, Step::StartBegin, sources_changed);
        state.step_time_last = Some(now);
        state.restarts = 0;
        self.sequence_step(state, now, sources_changed);
    }
    fn sequence_trigger_stop(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        log::info!("{}: stopping generator", self.configuration.name);
        state.sequence_running = true;
        self.sequence_set(state, Regime::Stop, Step::StopBegin, sources_changed);
        state.step_time_last = Some(now);
        self.sequence_step(state, now, sources_changed);
    }
    fn sequence_trigger_ac_ok(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        if state.regime == Regime::Stop {
            return;
        }
        log::info!(
            "{}: mains restored, scheduling generator stop",
            self.configuration.name
        );
        state.sequence_running = true;
        self.sequence_set(state, Regime::AcOk, Step::AcBegin, sources_changed);
        state.step_time_last = Some(now);
        state.restarts = 0;
        self.sequence_step(state, now, sources_changed);
    }
    fn sequence_trigger_ac_fail(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        if state.regime == Regime::Start {
            return;
        }
        log::info!(
            "{}: mains failed, scheduling generator start",
            self.configuration.name
        );
        state.sequence_running = true;
        self.sequence_set(state, Regime::AcFail, Step::AcBegin, sources_changed);
        state.step_time_last = Some(now);
        state.restarts = 0;
        self.sequence_step(state, now, sources_changed);
    }

    fn sequence_step(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        match state.regime {
            Regime::Null => {}
            Regime::Stop => self.sequence_stop_step(state, now, sources_changed),
            Regime::Start => self.sequence_start_step(state, now, sources_changed),
            Regime::AcOk => self.sequence_ac_ok_step(state, now, sources_changed),
            Regime::AcFail => self.sequence_ac_fail_step(state, now, sources_changed),
        }
    }

    fn sequence_start_step(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        let generator_running = self.analog_value(state, ANALOG_GENERATOR_VOLTAGE)
            > self.configuration.generator_voltage_threshold;

        match state.step {
            Step::StartBegin => {
                // already spinning - connect the load directly
                if generator_running {
                    self.sequence_set_step(state, Step::StartPowerOn, sources_changed);
                } else {
                    self.sequence_set_step(state, Step::StartEngineOn, sources_changed);
                }
            }
            Step::StartEngineOn => {
                self.relay_set(RELAY_FUEL, true, sources_changed);
                self.relay_set(RELAY_ENGINE, true, sources_changed);

                self.sequence_set_step(state, Step::StartChokeClose, sources_changed);
                state.delay_until = Some(now + self.configuration.fuel_prime_duration);
            }
            Step::StartChokeClose => {
                if !self.binary_value(state, BINARY_CHOKE_CLOSED) {
                    self.button_press(BUTTON_CHOKE_CLOSE, sources_changed);
                }
                self.sequence_set_step(state, Step::StartStarterOn, sources_changed);
            }
            Step::StartStarterOn => {
                state.cranking_until = Some(now + self.configuration.cranking_duration);
                self.relay_set(RELAY_STARTER, true, sources_changed);
                self.sequence_set_step(state, Step::StartStarterWait, sources_changed);
            }
            Step::StartStarterWait => {
                let cranking_expired = state
                    .cranking_until
                    .map_or(true, |cranking_until| cranking_until < now);
                if cranking_expired || generator_running {
                    self.sequence_set_step(state, Step::StartStarterStop, sources_changed);
                }
            }
            Step::StartStarterStop => {
                self.relay_set(RELAY_STARTER, false, sources_changed);
                if generator_running {
                    state.delay_until = Some(now + self.configuration.choke_open_delay);
                    self.sequence_set_step(state, Step::StartChokeOpen, sources_changed);
                } else {
                    state.delay_until = Some(now + self.configuration.restart_pause);
                    self.sequence_set_step(state, Step::StartWaitRestart, sources_changed);
                }
            }
            Step::StartWaitRestart => {
                if state.restarts > self.configuration.restarts_max {
                    log::warn!(
                        "{}: generator failed to start, giving up",
                        self.configuration.name
                    );
                    self.sequence_set(state, Regime::Stop, Step::StopBegin, sources_changed);
                } else if state.restarts % 2 == 0 {
                    // alternate choke position between attempts
                    self.button_press(BUTTON_CHOKE_OPEN, sources_changed);
                    self.sequence_set_step(state, Step::StartStarterOn, sources_changed);
                } else {
                    self.sequence_set_step(state, Step::StartChokeClose, sources_changed);
                }
                state.restarts += 1;
            }
            Step::StartChokeOpen => {
                self.button_press(BUTTON_CHOKE_OPEN, sources_changed);
                state.delay_until = Some(now + self.configuration.load_connect_delay);
                self.sequence_set_step(state, Step::StartPowerOn, sources_changed);
            }
            Step::StartPowerOn => {
                self.relay_set(RELAY_POWER, true, sources_changed);
                self.sequence_set_step(state, Step::StartEnd, sources_changed);
            }
            Step::StartEnd => {}
            _ => self.sequence_set(state, Regime::Null, Step::Null, sources_changed),
        }
    }

    fn sequence_stop_step(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        match state.step {
            Step::StopBegin => {
                if self.relay_state(RELAY_POWER) {
                    self.sequence_set_step(state, Step::StopPowerOff, sources_changed);
                } else {
                    self.sequence_set_step(state, Step::StopEngineOff, sources_changed);
                }
            }
            Step::StopPowerOff => {
                self.relay_set(RELAY_POWER, false, sources_changed);
                state.delay_until = Some(now + self.configuration.power_off_cooldown);
                self.sequence_set_step(state, Step::StopEngineOff, sources_changed);
            }
            Step::StopEngineOff => {
                self.relays_all_off(sources_changed);
                self.sequence_set_step(state, Step::StopEnd, sources_changed);
            }
            Step::StopEnd => {}
            _ => self.sequence_set(state, Regime::Null, Step::Null, sources_changed),
        }
    }

    fn sequence_ac_ok_step(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        match state.step {
            Step::AcBegin => {
                state.delay_until = Some(now + self.configuration.ac_ok_stop_delay);
                self.sequence_set_step(state, Step::AcGenOff, sources_changed);
            }
            _ => self.sequence_set(state, Regime::Stop, Step::StopBegin, sources_changed),
        }
    }
    fn sequence_ac_fail_step(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        match state.step {
            Step::AcBegin => {
                state.delay_until = Some(now + self.configuration.ac_fail_start_delay);
                self.sequence_set_step(state, Step::AcGenOn, sources_changed);
            }
            Step::AcGenOn => {
                self.sequence_set(state, Regime::Start, Step::StartBegin, sources_changed);
            }
            _ => self.sequence_set(state, Regime::Stop, Step::StopBegin, sources_changed),
        }
    }

    // regular sequence advance, gated by tick interval and pending delay
    fn sequence_poll(
        &self,
        state: &mut State,
        now: Instant,
        sources_changed: &mut bool,
    ) {
        if !state.sequence_running {
            return;
        }
        let step_due = state
            .step_time_last
            .map_or(true, |step_time_last| {
                now.duration_since(step_time_last) >= self.configuration.tick_interval
            });
        if !step_due {
            return;
        }

        match state.delay_until {
            Some(delay_until) if delay_until > now => {
                let remaining = delay_until.duration_since(now).as_secs() as u32;
                if state.timeout_published != remaining {
                    state.timeout_published = remaining;
                    self.output_value_set(OUTPUT_TIMEOUT, Real::from(remaining), sources_changed);
                }
            }
            _ => {
                self.sequence_step(state, now, sources_changed);
                state.step_time_last = Some(now);
                if state.timeout_published != 0 {
                    state.timeout_published = 0;
                    self.output_value_set(OUTPUT_TIMEOUT, Real::zero(), sources_changed);
                }
            }
        }
    }

    fn tick(
        &self,
        now: Instant,
    ) {
        let mut state = self.state.write();
        let mut sources_changed = false;

        self.sequence_poll(&mut state, now, &mut sources_changed);

        drop(state);
        if sources_changed {
            self.signals_sources_changed_waker.wake();
        }
    }

    fn signals_targets_changed(
        &self,
        now: Instant,
    ) {
        let mut state = self.state.write();
        let mut sources_changed = false;

        // measurements - only the latest value matters
        for (index, signal) in self.signal_analog_sensors.iter().enumerate() {
            let last = signal.take_last();
            if last.pending {
                state.analog_values[index] = last.value.map_or(0.0, |value| value.to_f64());
            }
        }
        for (index, signal) in self.signal_binary_sensors.iter().enumerate() {
            let last = signal.take_last();
            if last.pending {
                state.binary_values[index] = last.value.unwrap_or(false);
            }
        }
        for (index, signal) in self.signal_modbus_sensors.iter().enumerate() {
            let last = signal.take_last();
            if last.pending {
                state.modbus_values[index] = last.value.map_or(0.0, |value| value.to_f64());
            }
        }

        // control edges are lossless, every transition triggers its sequence
        for value in self.signal_control_switch.take_pending().into_vec() {
            let value = value.unwrap_or(false);
            if value == state.control_last {
                continue;
            }
            state.control_last = value;
            state.step_time_last = None;
            state.delay_until = None;

            if value {
                self.sequence_trigger_start(&mut state, now, &mut sources_changed);
            } else {
                self.sequence_trigger_stop(&mut state, now, &mut sources_changed);
            }
        }

        for value in self.signal_control_ac.take_pending().into_vec() {
            let value = value.unwrap_or(false);
            if value == state.control_ac_last {
                continue;
            }
            state.control_ac_last = value;

            if value {
                self.sequence_trigger_ac_ok(&mut state, now, &mut sources_changed);
            } else {
                self.sequence_trigger_ac_fail(&mut state, now, &mut sources_changed);
            }
        }

        drop(state);
        if sources_changed {
            self.signals_sources_changed_waker.wake();
        }
    }

    async fn run(
        &self,
        exit_flag: async_flag::Receiver,
    ) -> Exited {
        enum RunEvent {
            TargetsChanged,
            Tick,
        }

        let targets_changed_runner = self
            .signals_targets_changed_waker
            .stream(true)
            .map(|()| RunEvent::TargetsChanged);

        let tick_runner = IntervalStream::new(tokio::time::interval(
            self.configuration.tick_interval,
        ))
        .map(|_| RunEvent::Tick);

        stream::select(targets_changed_runner, tick_runner)
            .take_until(exit_flag)
            .for_each(|event| async move {
                let now = Instant::now();
                match event {
                    RunEvent::TargetsChanged => self.signals_targets_changed(now),
                    RunEvent::Tick => self.tick(now),
                }
            })
            .await;

        Exited
    }
}
impl devices::Device for Device {
    fn class(&self) -> Cow<'static, str> {
        Cow::from("genset/controller")
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
    ControlSwitch,
    ControlAc,
    Relay(usize),
    AnalogSensor(usize),
    BinarySensor(usize),
    ModbusSensor(usize),
    Button(usize),
    OutputValue(usize),
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
        let mut by_identifier =
            HashMap::<SignalIdentifier, &dyn signal::Base>::new();

        by_identifier.insert(
            SignalIdentifier::ControlSwitch,
            &self.signal_control_switch as &dyn signal::Base,
        );
        by_identifier.insert(
            SignalIdentifier::ControlAc,
            &self.signal_control_ac as &dyn signal::Base,
        );
        for (index, signal) in self.signal_relays.iter().enumerate() {
            by_identifier.insert(SignalIdentifier::Relay(index), signal as &dyn signal::Base);
        }
        for (index, signal) in self.signal_analog_sensors.iter().enumerate() {
            by_identifier.insert(
                SignalIdentifier::AnalogSensor(index),
                signal as &dyn signal::Base,
            );
        }
        for (index, signal) in self.signal_binary_sensors.iter().enumerate() {
            by_identifier.insert(
                SignalIdentifier::BinarySensor(index),
                signal as &dyn signal::Base,
            );
        }
        for (index, signal) in self.signal_modbus_sensors.iter().enumerate() {
            by_identifier.insert(
                SignalIdentifier::ModbusSensor(index),
                signal as &dyn signal::Base,
            );
        }
        for (index, signal) in self.signal_buttons.iter().enumerate() {
            by_identifier.insert(SignalIdentifier::Button(index), signal as &dyn signal::Base);
        }
        for (index, signal) in self.signal_output_values.iter().enumerate() {
            by_identifier.insert(
                SignalIdentifier::OutputValue(index),
                signal as &dyn signal::Base,
            );
        }

        by_identifier
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

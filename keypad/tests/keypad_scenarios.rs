//! End-to-end behaviour of four channels, the handoff and the dispatcher.

use std::{cell::Cell, convert::Infallible};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use keypad::{
    ButtonChannel, ChannelConfig, DispatchOutcome, EdgeOutcome, HidTransport, KeyCode,
    KeyboardReport, KeypadState, LinkState, RemoteWakeup, ReportDispatcher,
};
use usb_device::UsbError;

const CHANNELS: [ChannelConfig; 4] = [
    ChannelConfig { pin: 2, scancode: KeyCode::R },
    ChannelConfig { pin: 3, scancode: KeyCode::I },
    ChannelConfig { pin: 4, scancode: KeyCode::C },
    ChannelConfig { pin: 5, scancode: KeyCode::H },
];

/// A button wired active-low: idle reads high.
struct Button<'a>(&'a Cell<bool>);

impl ErrorType for Button<'_> {
    type Error = Infallible;
}

impl InputPin for Button<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

#[derive(Default)]
struct Led {
    on: bool,
    toggles: u32,
}

impl ErrorType for Led {
    type Error = Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.on = false;
        self.toggles += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.on = true;
        self.toggles += 1;
        Ok(())
    }
}

impl StatefulOutputPin for Led {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.on)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.on)
    }
}

#[derive(Default)]
struct Host {
    received: Vec<[u8; 8]>,
    refuse: u32,
}

impl HidTransport for Host {
    fn submit_input_report(&mut self, report: &KeyboardReport) -> Result<(), UsbError> {
        if self.refuse > 0 {
            self.refuse -= 1;
            return Err(UsbError::WouldBlock);
        }
        self.received.push(*report.as_bytes());
        Ok(())
    }
}

#[derive(Default)]
struct Wakeups(Cell<u32>);

impl RemoteWakeup for Wakeups {
    fn request_remote_wakeup(&self) {
        self.0.set(self.0.get() + 1);
    }
}

struct Rig<'a> {
    channels: Vec<ButtonChannel<'a, Button<'a>>>,
    dispatcher: ReportDispatcher<'a, Host, Led>,
    wakeups: Wakeups,
}

impl<'a> Rig<'a> {
    fn new(state: &'a KeypadState, levels: &'a [Cell<bool>; 4]) -> Self {
        let channels = CHANNELS
            .iter()
            .zip(levels)
            .map(|(config, level)| ButtonChannel::bind(*config, Button(level), state).unwrap())
            .collect();
        let dispatcher = ReportDispatcher::new(state, Host::default(), Led::default());
        Self { channels, dispatcher, wakeups: Wakeups::default() }
    }

    fn edge(&mut self, channel: usize) -> EdgeOutcome {
        self.channels[channel].on_edge(&self.wakeups)
    }

    fn received(&self) -> &[[u8; 8]] {
        &self.dispatcher.transport().received
    }
}

fn idle_levels() -> [Cell<bool>; 4] {
    [Cell::new(true), Cell::new(true), Cell::new(true), Cell::new(true)]
}

fn report(code: KeyCode) -> [u8; 8] {
    [0, 0, 0, 0, 0, 0, 0, code.as_u8()]
}

#[test]
fn channels_start_with_no_key() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let rig = Rig::new(&state, &levels);

    for channel in &rig.channels {
        assert!(channel.baseline());
        assert_eq!(channel.current_scancode(), KeyCode::Empty.as_u8());
    }
    assert_eq!(state.report.load(), 0);
    assert!(!state.signal.is_pending());
}

#[test]
fn press_sends_r_and_toggles_led() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);
    state.link.on_link_status(LinkState::Active);

    levels[0].set(false);
    assert_eq!(rig.edge(0), EdgeOutcome::Reported(KeyCode::R.as_u8()));
    assert!(state.signal.is_pending());

    assert_eq!(rig.dispatcher.try_dispatch(), Some(DispatchOutcome::Sent));
    assert_eq!(rig.received(), [report(KeyCode::R)]);
    assert!(rig.dispatcher.led().on);
    assert_eq!(rig.wakeups.0.get(), 0);
}

#[test]
fn press_then_release_round_trips() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);

    let mut writes = Vec::new();
    for level in [false, false, true, true] {
        levels[2].set(level);
        if let EdgeOutcome::Reported(code) = rig.edge(2) {
            writes.push(code);
            rig.dispatcher.try_dispatch();
        }
    }

    assert_eq!(writes, [KeyCode::C.as_u8(), KeyCode::Empty.as_u8()]);
    assert_eq!(rig.received(), [report(KeyCode::C), report(KeyCode::Empty)]);
    assert_eq!(rig.dispatcher.led().toggles, 2);
}

#[test]
fn same_classification_does_not_signal_again() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);

    levels[1].set(false);
    rig.edge(1);
    assert!(state.signal.try_take());

    for _ in 0..5 {
        assert_eq!(rig.edge(1), EdgeOutcome::Unchanged);
        assert!(!state.signal.is_pending());
    }
}

#[test]
fn edges_between_drains_coalesce_to_the_latest() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);

    levels[3].set(false);
    rig.edge(3);
    levels[3].set(true);
    rig.edge(3);
    levels[3].set(false);
    rig.edge(3);

    assert_eq!(rig.dispatcher.try_dispatch(), Some(DispatchOutcome::Sent));
    assert_eq!(rig.dispatcher.try_dispatch(), None);
    assert_eq!(rig.received(), [report(KeyCode::H)]);
}

#[test]
fn suspended_link_wakes_host_without_reporting() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);
    state.link.on_link_status(LinkState::Suspended);

    levels[0].set(false);
    assert_eq!(rig.edge(0), EdgeOutcome::WakeRequested);
    assert_eq!(rig.wakeups.0.get(), 1);
    assert_eq!(state.report.load(), 0);
    assert_eq!(rig.dispatcher.try_dispatch(), None);

    state.link.on_link_status(LinkState::Active);
    assert_eq!(rig.edge(0), EdgeOutcome::Reported(KeyCode::R.as_u8()));
    assert_eq!(rig.wakeups.0.get(), 1);
}

#[test]
fn failed_submission_does_not_block_the_next_report() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);
    rig.dispatcher = ReportDispatcher::new(&state, Host { refuse: 1, ..Default::default() }, Led::default());

    levels[1].set(false);
    rig.edge(1);
    assert_eq!(
        rig.dispatcher.try_dispatch(),
        Some(DispatchOutcome::SubmitFailed(UsbError::WouldBlock))
    );
    assert!(!rig.dispatcher.led().on);

    levels[1].set(true);
    rig.edge(1);
    assert_eq!(rig.dispatcher.try_dispatch(), Some(DispatchOutcome::Sent));
    assert_eq!(rig.received(), [report(KeyCode::Empty)]);
    assert!(rig.dispatcher.led().on);
}

#[test]
fn overlapping_presses_are_last_write_wins() {
    let state = KeypadState::new();
    let levels = idle_levels();
    let mut rig = Rig::new(&state, &levels);

    levels[0].set(false);
    rig.edge(0);
    levels[1].set(false);
    rig.edge(1);
    rig.dispatcher.try_dispatch();

    // Releasing R clears the slot even though I is still held.
    levels[0].set(true);
    rig.edge(0);
    rig.dispatcher.try_dispatch();

    assert_eq!(rig.received(), [report(KeyCode::I), report(KeyCode::Empty)]);
    assert_eq!(rig.channels[1].current_scancode(), KeyCode::I.as_u8());
}

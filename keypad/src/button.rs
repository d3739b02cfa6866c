//! One physical button on an edge-triggered input.
//!
//! All four buttons are the same component; what differs is the
//! [`ChannelConfig`] each one is bound with.

use embedded_hal::digital::{Error as _, InputPin};

use crate::{error::InitError, key_codes::KeyCode, state::KeypadState};

/// Per-button wiring: which pin, and which key it types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// GPIO number, used to identify the channel in logs and errors.
    pub pin: u8,
    pub scancode: KeyCode,
}

/// The transport's "please resume the link" primitive.
pub trait RemoteWakeup {
    fn request_remote_wakeup(&self);
}

/// What an edge interrupt did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// The link was suspended; a wakeup was requested and nothing else changed.
    WakeRequested,
    /// The pin could not be read; nothing changed.
    ReadFailed,
    /// The classification matched the channel's previous one.
    Unchanged,
    /// A new scancode was published and the dispatcher signalled.
    Reported(u8),
}

pub struct ButtonChannel<'a, P> {
    config: ChannelConfig,
    pin: P,
    /// Pin level at rest, captured once at bind time.
    baseline: bool,
    current_scancode: u8,
    state: &'a KeypadState,
}

impl<'a, P: InputPin> ButtonChannel<'a, P> {
    /// Bind a configured input pin to a channel and capture its baseline.
    ///
    /// The pin must already be an input and the button must be at rest. A
    /// channel cannot classify anything without a baseline, so a failed read
    /// here is fatal.
    pub fn bind(config: ChannelConfig, mut pin: P, state: &'a KeypadState) -> Result<Self, InitError> {
        let baseline = match pin.is_high() {
            Ok(level) => level,
            Err(err) => {
                error!("Failed to get the state of pin {=u8}, error: {}", config.pin, err.kind());
                return Err(InitError::BaselineRead { pin: config.pin });
            },
        };

        info!("Pin {=u8} bound to {}, baseline high: {=bool}", config.pin, config.scancode, baseline);

        Ok(Self { config, pin, baseline, current_scancode: KeyCode::Empty.as_u8(), state })
    }

    /// Handle one edge on this channel's pin. Runs in interrupt context and never blocks.
    pub fn on_edge<W: RemoteWakeup + ?Sized>(&mut self, wakeup: &W) -> EdgeOutcome {
        if self.state.link.is_suspended() {
            wakeup.request_remote_wakeup();
            return EdgeOutcome::WakeRequested;
        }

        let level = match self.pin.is_high() {
            Ok(level) => level,
            Err(err) => {
                warn!("Failed to get the state of pin {=u8}, error: {}", self.config.pin, err.kind());
                return EdgeOutcome::ReadFailed;
            },
        };

        let scancode = if level != self.baseline {
            self.config.scancode.as_u8()
        } else {
            KeyCode::Empty.as_u8()
        };

        if scancode == self.current_scancode {
            return EdgeOutcome::Unchanged;
        }

        self.current_scancode = scancode;
        self.state.report.store(scancode);
        self.state.signal.raise();

        EdgeOutcome::Reported(scancode)
    }
}

impl<P> ButtonChannel<'_, P> {
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn baseline(&self) -> bool {
        self.baseline
    }

    pub fn current_scancode(&self) -> u8 {
        self.current_scancode
    }

    /// Access to the pin, for the platform's interrupt flag handling.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

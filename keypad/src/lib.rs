//! Button-edge to HID-report core of the USB keypad firmware.
//!
//! Four [`ButtonChannel`]s run from the GPIO edge interrupt. Each publishes
//! its scancode into the [`SharedReport`] and raises the [`HandoffSignal`];
//! the [`ReportDispatcher`] waits on that signal in thread mode and pushes
//! the report out through the [`HidClass`]. Everything the two sides share
//! lives in one [`KeypadState`].
//!
//! Nothing here touches RP2040 registers, so the whole state machine runs
//! under `cargo test` on the host.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod button;
pub mod dispatch;
pub mod error;
pub mod handoff;
pub mod hid_class;
pub mod hid_descriptor;
pub mod indicators;
pub mod key_codes;
pub mod link;
pub mod report;
pub mod state;

pub use button::{ButtonChannel, ChannelConfig, EdgeOutcome, RemoteWakeup};
pub use dispatch::{DispatchOutcome, HidTransport, ReportDispatcher};
pub use error::InitError;
pub use handoff::HandoffSignal;
pub use hid_class::HidClass;
pub use indicators::IndicatorLeds;
pub use key_codes::KeyCode;
pub use link::{LinkState, LinkStatus};
pub use report::{KeyboardReport, SharedReport};
pub use state::KeypadState;

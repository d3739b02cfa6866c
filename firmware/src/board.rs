//! Board wiring and USB identity.

use keypad::{ChannelConfig, KeyCode};

pub const EXTERNAL_CRYSTAL_FREQUENCY_HZ: u32 = 12_000_000;

pub const NUM_BUTTONS: usize = 4;

/// Buttons, in the order `main` binds their pins. Each button pulls its pin
/// to ground, so the idle level is high.
pub const CHANNELS: [ChannelConfig; NUM_BUTTONS] = [
    ChannelConfig { pin: 2, scancode: KeyCode::R },
    ChannelConfig { pin: 3, scancode: KeyCode::I },
    ChannelConfig { pin: 4, scancode: KeyCode::C },
    ChannelConfig { pin: 5, scancode: KeyCode::H },
];

// https://github.com/obdev/v-usb/blob/7a28fdc685952412dad2b8842429127bc1cf9fa7/usbdrv/USB-IDs-for-free.txt#L128
pub const USB_VID: u16 = 0x16c0;
pub const USB_PID: u16 = 0x27db;
pub const MANUFACTURER: &str = "bschwind";
pub const PRODUCT: &str = "usb keypad";
pub const SERIAL_NUMBER: &str = "0001";

pub const HID_POLL_MS: u8 = 8;

//! Boot keyboard report layout.
//!
//! The input report is 8 bytes: a modifier bitmap, a reserved byte, then
//! six keycode slots. The keypad only ever drives one key, and it keeps that
//! key in the last slot.

/// Length of one input report in bytes.
pub const REPORT_LEN: usize = 8;

/// Modifier bitmap. Never set by the keypad.
pub const MODIFIER_OFFSET: usize = 0;

/// Indicator slot. Always zero in reports sent by the keypad.
pub const LED_OFFSET: usize = 2;

/// The single keycode the keypad drives.
pub const KEYCODE_OFFSET: usize = 7;

// Only the keycode byte is ever written; it must not alias the bytes kept clear.
const _: () = assert!(
    KEYCODE_OFFSET < REPORT_LEN && KEYCODE_OFFSET != MODIFIER_OFFSET && KEYCODE_OFFSET != LED_OFFSET
);

/// Output report bits the host sends for its lock keys.
pub const LED_NUM_LOCK: u8 = 1 << 0;
pub const LED_CAPS_LOCK: u8 = 1 << 1;
pub const LED_SCROLL_LOCK: u8 = 1 << 2;

#[rustfmt::skip]
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,        // Usage Page (Generic Desktop Ctrls)
    0x09, 0x06,        // Usage (Keyboard)
    0xA1, 0x01,        // Collection (Application)

    // Modifier Keys
    0x05, 0x07,        //   Usage Page (Kbrd/Keypad)
    0x19, 0xE0,        //   Usage Minimum (0xE0)
    0x29, 0xE7,        //   Usage Maximum (0xE7)
    0x15, 0x00,        //   Logical Minimum (0)
    0x25, 0x01,        //   Logical Maximum (1)
    0x95, 0x08,        //   Report Count (8)
    0x75, 0x01,        //   Report Size (1)
    0x81, 0x02,        //   Input (Data,Var,Abs,No Wrap,Linear,Preferred State,No Null Position)

    // Reserved Byte
    0x95, 0x01,        //   Report Count (1)
    0x75, 0x08,        //   Report Size (8)
    0x81, 0x01,        //   Input (Const,Var,Abs,No Wrap,Linear,Preferred State,No Null Position)

    // LEDs
    0x05, 0x08,        //   Usage Page (LEDs)
    0x19, 0x01,        //   Usage Minimum (Num Lock)
    0x29, 0x05,        //   Usage Maximum (Kana)
    0x95, 0x05,        //   Report Count (5)
    0x75, 0x01,        //   Report Size (1)
    0x91, 0x02,        //   Output (Data,Var,Abs,No Wrap,Linear,Preferred State,No Null Position,Non-volatile)

    // LED Padding
    0x95, 0x01,        //   Report Count (1)
    0x75, 0x03,        //   Report Size (3)
    0x91, 0x01,        //   Output (Const,Var,Abs,No Wrap,Linear,Preferred State,No Null Position,Non-volatile)

    // Keycodes
    0x05, 0x07,        //   Usage Page (Kbrd/Keypad)
    0x19, 0x00,        //   Usage Minimum (0x00)
    0x29, 0x65,        //   Usage Maximum (Keyboard Application)
    0x15, 0x00,        //   Logical Minimum (0)
    0x25, 0x65,        //   Logical Maximum (101)
    0x95, 0x06,        //   Report Count (6)
    0x75, 0x08,        //   Report Size (8)
    0x81, 0x00,        //   Input (Data,Array,Abs,No Wrap,Linear,Preferred State,No Null Position)

    0xC0,              // End Collection
];

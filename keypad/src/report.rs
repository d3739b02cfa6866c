use core::sync::atomic::{AtomicU8, Ordering};

use crate::{
    hid_descriptor::{KEYCODE_OFFSET, REPORT_LEN},
    key_codes::KeyCode,
};

/// One boot keyboard input report, as it goes out on the interrupt endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    bytes: [u8; REPORT_LEN],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self { bytes: [0; REPORT_LEN] }
    }

    /// A report with `scancode` in the keycode slot and every other byte zero.
    pub const fn with_scancode(scancode: u8) -> Self {
        let mut bytes = [0; REPORT_LEN];
        bytes[KEYCODE_OFFSET] = scancode;
        Self { bytes }
    }

    pub fn scancode(&self) -> u8 {
        self.bytes[KEYCODE_OFFSET]
    }

    pub fn as_bytes(&self) -> &[u8; REPORT_LEN] {
        &self.bytes
    }
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

/// The in-flight report shared between the edge interrupts and the dispatch loop.
///
/// Only the keycode byte is mutable, so the whole shared state is one atomic
/// byte. Button channels store into it from interrupt context; the dispatcher
/// loads it after it has consumed a handoff wake.
pub struct SharedReport {
    scancode: AtomicU8,
}

impl SharedReport {
    pub const fn new() -> Self {
        Self { scancode: AtomicU8::new(KeyCode::Empty.as_u8()) }
    }

    pub fn store(&self, scancode: u8) {
        self.scancode.store(scancode, Ordering::Release);
    }

    pub fn load(&self) -> u8 {
        self.scancode.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> KeyboardReport {
        KeyboardReport::with_scancode(self.load())
    }
}

impl Default for SharedReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scancode_lands_in_the_last_byte_only() {
        let report = KeyboardReport::with_scancode(KeyCode::R.as_u8());
        assert_eq!(report.as_bytes(), &[0, 0, 0, 0, 0, 0, 0, 0x15]);
        assert_eq!(report.scancode(), 0x15);
    }

    #[test]
    fn shared_report_starts_empty() {
        let shared = SharedReport::new();
        assert_eq!(shared.load(), KeyCode::Empty.as_u8());
        assert_eq!(shared.snapshot(), KeyboardReport::empty());
    }

    #[test]
    fn last_store_wins() {
        let shared = SharedReport::new();
        shared.store(KeyCode::R.as_u8());
        shared.store(KeyCode::H.as_u8());
        assert_eq!(shared.snapshot().as_bytes(), &[0, 0, 0, 0, 0, 0, 0, 0x0B]);
    }
}

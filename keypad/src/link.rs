use core::sync::atomic::{AtomicU8, Ordering};

use usb_device::device::UsbDeviceState;

/// USB link state as far as the keypad cares about it.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Active = 0,
    Suspended = 1,
    Other = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LinkState::Active,
            1 => LinkState::Suspended,
            _ => LinkState::Other,
        }
    }
}

impl From<UsbDeviceState> for LinkState {
    fn from(state: UsbDeviceState) -> Self {
        match state {
            UsbDeviceState::Configured => LinkState::Active,
            UsbDeviceState::Suspend => LinkState::Suspended,
            UsbDeviceState::Default | UsbDeviceState::Addressed => LinkState::Other,
        }
    }
}

/// Latest link state reported by the USB stack.
///
/// Written only from the USB interrupt, read by the edge interrupts.
pub struct LinkStatus {
    state: AtomicU8,
}

impl LinkStatus {
    pub const fn new() -> Self {
        Self { state: AtomicU8::new(LinkState::Other as u8) }
    }

    /// Record a status event from the transport. Returns whether the state changed.
    pub fn on_link_status(&self, state: LinkState) -> bool {
        let previous = LinkState::from_u8(self.state.load(Ordering::Relaxed));
        if previous == state {
            return false;
        }

        self.state.store(state as u8, Ordering::Release);
        info!("USB link {} -> {}", previous, state);
        true
    }

    pub fn get(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_suspended(&self) -> bool {
        self.get() == LinkState::Suspended
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::new()
    }
}

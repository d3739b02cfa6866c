use core::fmt;

/// Startup failures. Any of these stops the firmware before the dispatch
/// loop starts; there is no partial-operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// A peripheral was already taken or its clock would not come up.
    DeviceNotReady,
    /// The baseline level of a button pin could not be read.
    BaselineRead { pin: u8 },
    /// An LED output could not be driven to its initial level.
    LedConfig { led: u8 },
    /// usb-device rejected the device configuration.
    UsbBuilder,
    /// The USB bus allocator was already claimed.
    UsbBusTaken,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::DeviceNotReady => write!(f, "device not ready"),
            InitError::BaselineRead { pin } => write!(f, "failed to read baseline of pin {pin}"),
            InitError::LedConfig { led } => write!(f, "failed to configure LED {led}"),
            InitError::UsbBuilder => write!(f, "USB device configuration rejected"),
            InitError::UsbBusTaken => write!(f, "USB bus already in use"),
        }
    }
}

use embedded_hal::digital::{OutputPin, PinState};

use crate::hid_descriptor::{LED_CAPS_LOCK, LED_NUM_LOCK, LED_SCROLL_LOCK};

const MASKS: [u8; 3] = [LED_NUM_LOCK, LED_CAPS_LOCK, LED_SCROLL_LOCK];

/// Mirrors the host's Num/Caps/Scroll Lock state onto three LEDs.
pub struct IndicatorLeds<P> {
    pins: [P; 3],
    shown: u8,
}

impl<P: OutputPin> IndicatorLeds<P> {
    /// Pins must already be driven low.
    pub fn new(pins: [P; 3]) -> Self {
        Self { pins, shown: 0 }
    }

    /// Drive the LEDs whose bit differs from what is currently shown.
    ///
    /// Stops at the first failed write; that LED keeps its old bit in
    /// `shown`, so the next call tries it again.
    pub fn apply(&mut self, host_leds: u8) -> Result<(), P::Error> {
        for (pin, mask) in self.pins.iter_mut().zip(MASKS) {
            if (host_leds ^ self.shown) & mask == 0 {
                continue;
            }

            pin.set_state(PinState::from(host_leds & mask != 0))?;
            self.shown ^= mask;
        }

        Ok(())
    }

    pub fn shown(&self) -> u8 {
        self.shown
    }
}

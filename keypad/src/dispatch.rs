//! The worker side of the handoff: wait for a wake, send the current report,
//! blink the status LED.

use embedded_hal::digital::{Error as _, StatefulOutputPin};
use usb_device::UsbError;

use crate::{report::KeyboardReport, state::KeypadState};

/// Where finished input reports go.
pub trait HidTransport {
    fn submit_input_report(&mut self, report: &KeyboardReport) -> Result<(), UsbError>;
}

impl<T: HidTransport + ?Sized> HidTransport for &mut T {
    fn submit_input_report(&mut self, report: &KeyboardReport) -> Result<(), UsbError> {
        (**self).submit_input_report(report)
    }
}

/// Result of one pass through the loop. Failures are logged, never fatal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    Sent,
    /// The transport refused the report. The next state change sends a fresh one.
    SubmitFailed(UsbError),
    /// The report went out but the status LED could not be toggled.
    LedFailed,
}

pub struct ReportDispatcher<'a, T, L> {
    state: &'a KeypadState,
    transport: T,
    led: L,
    reports_sent: u32,
}

impl<'a, T: HidTransport, L: StatefulOutputPin> ReportDispatcher<'a, T, L> {
    pub fn new(state: &'a KeypadState, transport: T, led: L) -> Self {
        Self { state, transport, led, reports_sent: 0 }
    }

    /// Send whatever the shared report holds right now.
    pub fn dispatch_once(&mut self) -> DispatchOutcome {
        let report = self.state.report.snapshot();

        if let Err(err) = self.transport.submit_input_report(&report) {
            match err {
                // Endpoint still busy with the previous report.
                UsbError::WouldBlock => info!("UsbError::WouldBlock"),
                _ => error!("HID write error, {}", err),
            }
            return DispatchOutcome::SubmitFailed(err);
        }

        self.reports_sent = self.reports_sent.wrapping_add(1);
        debug!("Sent report {=u32}: {}", self.reports_sent, report);

        // Toggle LED on sent report
        if let Err(err) = self.led.toggle() {
            error!("Failed to toggle the LED pin, error: {}", err.kind());
            return DispatchOutcome::LedFailed;
        }

        DispatchOutcome::Sent
    }

    /// Dispatch only if a wake is pending.
    pub fn try_dispatch(&mut self) -> Option<DispatchOutcome> {
        self.state.signal.try_take().then(|| self.dispatch_once())
    }

    /// Run forever. `park` is how the worker sleeps between checks of the
    /// handoff signal (`wfe` on target).
    pub fn run(&mut self, mut park: impl FnMut()) -> ! {
        loop {
            self.state.signal.wait(&mut park);
            self.dispatch_once();
        }
    }

    pub fn reports_sent(&self) -> u32 {
        self.reports_sent
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn led(&self) -> &L {
        &self.led
    }
}

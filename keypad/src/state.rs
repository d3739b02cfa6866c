use crate::{handoff::HandoffSignal, link::LinkStatus, report::SharedReport};

/// Everything the interrupt side and the dispatch side share.
///
/// The firmware keeps one of these in a `static` and hands a reference to
/// every button channel, the HID class and the dispatcher.
pub struct KeypadState {
    pub report: SharedReport,
    pub signal: HandoffSignal,
    pub link: LinkStatus,
}

impl KeypadState {
    pub const fn new() -> Self {
        Self { report: SharedReport::new(), signal: HandoffSignal::new(), link: LinkStatus::new() }
    }
}

impl Default for KeypadState {
    fn default() -> Self {
        Self::new()
    }
}

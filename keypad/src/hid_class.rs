use usb_device::{
    class_prelude::{
        ControlIn, ControlOut, DescriptorWriter, EndpointIn, InterfaceNumber, UsbBus, UsbBusAllocator,
        UsbClass,
    },
    control::{Recipient, Request, RequestType},
    Result, UsbError,
};

use crate::{
    dispatch::HidTransport,
    hid_descriptor::{KEYBOARD_REPORT_DESCRIPTOR, REPORT_LEN},
    report::KeyboardReport,
    state::KeypadState,
};

const USB_CLASS_HID: u8 = 0x03;
const HID_SUBCLASS_BOOT: u8 = 0x01;
const HID_PROTOCOL_KEYBOARD: u8 = 0x01;

// Descriptor type
// 0x21      - HID
// 0x22      - Report
// 0x23      - Physical Descriptor
// 0x24-0x2F - Reserved
const DESCRIPTOR_TYPE_HID: u8 = 0x21;
const DESCRIPTOR_TYPE_REPORT: u8 = 0x22;

// Class-specific requests (HID 1.11, section 7.2)
const GET_REPORT: u8 = 0x01;
const GET_IDLE: u8 = 0x02;
const GET_PROTOCOL: u8 = 0x03;
const SET_REPORT: u8 = 0x09;
const SET_IDLE: u8 = 0x0A;
const SET_PROTOCOL: u8 = 0x0B;

// Report type, high byte of wValue in GET_REPORT / SET_REPORT
const REPORT_TYPE_INPUT: u8 = 0x01;
const REPORT_TYPE_OUTPUT: u8 = 0x02;

/// Report protocol. Boot protocol (0) uses the same 8-byte layout.
const PROTOCOL_REPORT: u8 = 0x01;

/// Full HID descriptor, including bLength and bDescriptorType.
fn hid_descriptor() -> [u8; 9] {
    let descriptor_len = KEYBOARD_REPORT_DESCRIPTOR.len() as u16;
    let [descriptor_len_lsb, descriptor_len_msb] = descriptor_len.to_le_bytes();

    [
        9,                      // bLength
        DESCRIPTOR_TYPE_HID,    // bDescriptorType - HID
        0x11,                   // bcdHID - 1.11 - LSB first
        0x01,                   // bcdHID - 1.11 - LSB first
        0x00,                   // bCountryCode - 0 = Not supported/specified
        1,                      // bNumDescriptors - Number of HID class descriptors to follow
        DESCRIPTOR_TYPE_REPORT, // bDescriptorType - Report
        descriptor_len_lsb,     // wDescriptorLength - LSB first
        descriptor_len_msb,     // wDescriptorLength - LSB first
    ]
}

/// What to answer on the control IN pipe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum InReply {
    /// Not ours; usb-device handles or stalls it.
    Ignore,
    Reject,
    ReportDescriptor,
    HidDescriptor,
    Report(KeyboardReport),
    Byte(u8),
}

/// What to answer on the control OUT pipe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum OutReply {
    Ignore,
    Accept,
    Reject,
}

/// Interface state set by the host through control requests.
struct HidControl {
    interface: u8,
    idle_rate: u8,
    protocol: u8,
    host_leds: u8,
}

impl HidControl {
    const fn new(interface: u8) -> Self {
        Self { interface, idle_rate: 0, protocol: PROTOCOL_REPORT, host_leds: 0 }
    }

    fn reset(&mut self) {
        *self = Self::new(self.interface);
    }

    fn is_ours(&self, req: &Request) -> bool {
        req.recipient == Recipient::Interface && req.index == self.interface as u16
    }

    fn control_in(&self, req: &Request, state: &KeypadState) -> InReply {
        if !self.is_ours(req) {
            return InReply::Ignore;
        }

        match req.request_type {
            RequestType::Standard if req.request == Request::GET_DESCRIPTOR => {
                let [descriptor_type, _index] = req.value.to_be_bytes();
                match descriptor_type {
                    DESCRIPTOR_TYPE_REPORT => InReply::ReportDescriptor,
                    DESCRIPTOR_TYPE_HID => InReply::HidDescriptor,
                    _ => InReply::Ignore,
                }
            },
            RequestType::Class => match req.request {
                GET_REPORT => {
                    let [report_type, _report_id] = req.value.to_be_bytes();
                    if report_type == REPORT_TYPE_INPUT {
                        InReply::Report(state.report.snapshot())
                    } else {
                        InReply::Reject
                    }
                },
                GET_IDLE => InReply::Byte(self.idle_rate),
                GET_PROTOCOL => InReply::Byte(self.protocol),
                _ => InReply::Reject,
            },
            _ => InReply::Ignore,
        }
    }

    fn control_out(&mut self, req: &Request, data: &[u8]) -> OutReply {
        if req.request_type != RequestType::Class || !self.is_ours(req) {
            return OutReply::Ignore;
        }

        match req.request {
            SET_REPORT => {
                let [report_type, _report_id] = req.value.to_be_bytes();
                if report_type == REPORT_TYPE_OUTPUT {
                    if let Some(&leds) = data.first() {
                        debug!("Host LEDs: {=u8:#x}", leds);
                        self.host_leds = leds;
                    }
                }
                OutReply::Accept
            },
            SET_IDLE => {
                let [duration, _report_id] = req.value.to_be_bytes();
                self.idle_rate = duration;
                OutReply::Accept
            },
            SET_PROTOCOL => {
                let [_, protocol] = req.value.to_be_bytes();
                self.protocol = protocol;
                OutReply::Accept
            },
            _ => OutReply::Reject,
        }
    }
}

// A HID device is composed of the following endpoints:
// * A pair of control IN and OUT endpoints called the default endpoint
//   (handled by usb-device, class requests are forwarded here)
// * An interrupt IN endpoint
// * An optional interrupt OUT endpoint (not used: output reports arrive
//   through SET_REPORT on the control pipe)
pub struct HidClass<'a, B: UsbBus> {
    usb_interface: InterfaceNumber,
    // The Interrupt pipe is used for transmitting low latency data to the host.
    in_endpoint: EndpointIn<'a, B>,
    control: HidControl,
    state: &'a KeypadState,
}

impl<'a, B: UsbBus> HidClass<'a, B> {
    pub fn new(bus_allocator: &'a UsbBusAllocator<B>, state: &'a KeypadState, poll_ms: u8) -> Self {
        let usb_interface = bus_allocator.interface();

        let max_packet_size = REPORT_LEN as u16;
        let in_endpoint = bus_allocator.interrupt(max_packet_size, poll_ms);

        Self { usb_interface, in_endpoint, control: HidControl::new(u8::from(usb_interface)), state }
    }

    pub fn push_input(&self, report: &KeyboardReport) -> Result<usize> {
        self.in_endpoint.write(report.as_bytes())
    }

    /// Last lock-key bitmap the host sent with SET_REPORT(Output).
    pub fn host_leds(&self) -> u8 {
        self.control.host_leds
    }
}

impl<B: UsbBus> UsbClass<B> for HidClass<'_, B> {
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        // The bInterfaceClass member of an Interface descriptor is always 3 for HID class devices.
        // Boot subclass with the keyboard protocol, so BIOSes can use the keypad too.
        writer.interface(
            self.usb_interface,
            USB_CLASS_HID,
            HID_SUBCLASS_BOOT,
            HID_PROTOCOL_KEYBOARD,
        )?;

        // The writer adds bLength and bDescriptorType itself.
        writer.write(DESCRIPTOR_TYPE_HID, &hid_descriptor()[2..])?;

        writer.endpoint(&self.in_endpoint)?;

        Ok(())
    }

    fn reset(&mut self) {
        self.control.reset();
    }

    // The Control pipe is used for:
    // * Receiving and responding to requests for USB control and class data.
    // * Transmitting data when polled by the HID class driver (using the Get_Report request).
    fn control_in(&mut self, xfer: ControlIn<B>) {
        let req = *xfer.request();

        match self.control.control_in(&req, self.state) {
            InReply::Ignore => {},
            InReply::Reject => {
                xfer.reject().ok();
            },
            InReply::ReportDescriptor => {
                xfer.accept_with_static(KEYBOARD_REPORT_DESCRIPTOR).ok();
            },
            InReply::HidDescriptor => {
                xfer.accept_with(&hid_descriptor()).ok();
            },
            InReply::Report(report) => {
                xfer.accept_with(report.as_bytes()).ok();
            },
            InReply::Byte(value) => {
                xfer.accept_with(&[value]).ok();
            },
        }
    }

    // Output reports are transmitted to the device through the Control endpoint,
    // using Set_Report(Output) requests.
    fn control_out(&mut self, xfer: ControlOut<B>) {
        let req = *xfer.request();

        match self.control.control_out(&req, xfer.data()) {
            OutReply::Ignore => {},
            OutReply::Accept => {
                xfer.accept().ok();
            },
            OutReply::Reject => {
                xfer.reject().ok();
            },
        }
    }
}

impl<B: UsbBus> HidTransport for HidClass<'_, B> {
    fn submit_input_report(&mut self, report: &KeyboardReport) -> core::result::Result<(), UsbError> {
        self.push_input(report).map(|_| ())
    }
}

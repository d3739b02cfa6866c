// Four-button USB keypad. Button edges are handled in the GPIO interrupt,
// reports go out from thread mode.

#![no_main]
#![no_std]

use core::cell::RefCell;
use critical_section::Mutex;
use defmt::{error, info, warn};
use defmt_rtt as _;
use embedded_hal::digital::OutputPin;
use keypad::{
    ButtonChannel, EdgeOutcome, HidClass, HidTransport, IndicatorLeds, InitError, KeyboardReport,
    KeypadState, LinkState, RemoteWakeup, ReportDispatcher,
};
use panic_probe as _;
use rp2040_hal::{
    gpio::{DynPinId, FunctionSioInput, FunctionSioOutput, Interrupt, Pin, PullDown, PullUp},
    pac::{self, interrupt},
    usb::UsbBus,
    Watchdog,
};
use usb_device::{
    bus::UsbBusAllocator,
    device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbVidPid},
    UsbError,
};

/// The linker will place this boot block at the start of our program image. We
/// need this to help the ROM bootloader get our code up and running.
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

mod board;

type ButtonPin = Pin<DynPinId, FunctionSioInput, PullUp>;
type LedPin = Pin<DynPinId, FunctionSioOutput, PullDown>;
type Button = ButtonChannel<'static, ButtonPin>;
type Dispatcher = ReportDispatcher<'static, SharedHid, LedPin>;

static KEYPAD: KeypadState = KeypadState::new();

// Owned by the interrupt handlers once `start` hands them over.
static BUTTONS: Mutex<RefCell<Option<[Button; board::NUM_BUTTONS]>>> =
    Mutex::new(RefCell::new(None));
static USB_DEVICE: Mutex<RefCell<Option<UsbDevice<'static, UsbBus>>>> =
    Mutex::new(RefCell::new(None));
static USB_HID: Mutex<RefCell<Option<HidClass<'static, UsbBus>>>> =
    Mutex::new(RefCell::new(None));
static INDICATORS: Mutex<RefCell<Option<IndicatorLeds<LedPin>>>> =
    Mutex::new(RefCell::new(None));

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

#[cortex_m_rt::entry]
fn main() -> ! {
    info!("Start of main()");

    match start() {
        Ok(mut dispatcher) => {
            info!("Start dispatch loop");
            dispatcher.run(cortex_m::asm::wfe)
        },
        Err(err) => {
            error!("Startup failed: {}", err);
            loop {
                cortex_m::asm::wfi();
            }
        },
    }
}

fn start() -> Result<Dispatcher, InitError> {
    let mut pac = pac::Peripherals::take().ok_or(InitError::DeviceNotReady)?;

    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    let clocks = rp2040_hal::clocks::init_clocks_and_plls(
        board::EXTERNAL_CRYSTAL_FREQUENCY_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .map_err(|_| InitError::DeviceNotReady)?;

    // Get the GPIO peripherals.
    let sio = rp2040_hal::Sio::new(pac.SIO);

    let pins =
        rp2040_hal::gpio::Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);

    // LED 0 is the on-board LED and blinks once per report. LEDs 1-3 show the
    // host's Num/Caps/Scroll Lock.
    let mut leds: [LedPin; 4] = [
        pins.gpio25.into_push_pull_output().into_dyn_pin(),
        pins.gpio6.into_push_pull_output().into_dyn_pin(),
        pins.gpio7.into_push_pull_output().into_dyn_pin(),
        pins.gpio8.into_push_pull_output().into_dyn_pin(),
    ];
    for (index, led) in leds.iter_mut().enumerate() {
        led.set_low().map_err(|_| InitError::LedConfig { led: index as u8 })?;
    }
    let [status_led, num_lock, caps_lock, scroll_lock] = leds;

    // Set up the button pins. Keep in sync with `board::CHANNELS`.
    let buttons = bind_buttons([
        pins.gpio2.into_pull_up_input().into_dyn_pin(),
        pins.gpio3.into_pull_up_input().into_dyn_pin(),
        pins.gpio4.into_pull_up_input().into_dyn_pin(),
        pins.gpio5.into_pull_up_input().into_dyn_pin(),
    ])?;

    // Setup USB
    let force_vbus_detect_bit = true;
    let usb_bus = UsbBus::new(
        pac.USBCTRL_REGS,
        pac.USBCTRL_DPRAM,
        clocks.usb_clock,
        force_vbus_detect_bit,
        &mut pac.RESETS,
    );

    let bus_allocator: &'static UsbBusAllocator<UsbBus> =
        cortex_m::singleton!(: UsbBusAllocator<UsbBus> = UsbBusAllocator::new(usb_bus))
            .ok_or(InitError::UsbBusTaken)?;

    let hid_endpoint = HidClass::new(bus_allocator, &KEYPAD, board::HID_POLL_MS);

    let keypad_usb_device =
        UsbDeviceBuilder::new(bus_allocator, UsbVidPid(board::USB_VID, board::USB_PID))
            .strings(&[StringDescriptors::default()
                .manufacturer(board::MANUFACTURER)
                .product(board::PRODUCT)
                .serial_number(board::SERIAL_NUMBER)])
            .map_err(|_| InitError::UsbBuilder)?
            .supports_remote_wakeup(true)
            .build();

    critical_section::with(|cs| {
        BUTTONS.borrow(cs).replace(Some(buttons));
        USB_HID.borrow(cs).replace(Some(hid_endpoint));
        USB_DEVICE.borrow(cs).replace(Some(keypad_usb_device));
        INDICATORS.borrow(cs).replace(Some(IndicatorLeds::new([num_lock, caps_lock, scroll_lock])));
    });

    // SAFETY: every resource the handlers touch is in place.
    unsafe {
        pac::NVIC::unmask(pac::Interrupt::USBCTRL_IRQ);
        pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }

    info!("USB initialized");

    Ok(ReportDispatcher::new(&KEYPAD, SharedHid, status_led))
}

fn bind_buttons(pins: [ButtonPin; board::NUM_BUTTONS]) -> Result<[Button; board::NUM_BUTTONS], InitError> {
    let [sw0, sw1, sw2, sw3] = pins;
    let [cfg0, cfg1, cfg2, cfg3] = board::CHANNELS;

    let mut buttons = [
        ButtonChannel::bind(cfg0, sw0, &KEYPAD)?,
        ButtonChannel::bind(cfg1, sw1, &KEYPAD)?,
        ButtonChannel::bind(cfg2, sw2, &KEYPAD)?,
        ButtonChannel::bind(cfg3, sw3, &KEYPAD)?,
    ];

    for button in buttons.iter_mut() {
        let pin = button.pin_mut();
        pin.set_interrupt_enabled(Interrupt::EdgeLow, true);
        pin.set_interrupt_enabled(Interrupt::EdgeHigh, true);
    }

    Ok(buttons)
}

/// The dispatcher's view of the HID class, which lives with the USB interrupt.
struct SharedHid;

impl HidTransport for SharedHid {
    fn submit_input_report(&mut self, report: &KeyboardReport) -> Result<(), UsbError> {
        critical_section::with(|cs| match USB_HID.borrow_ref_mut(cs).as_mut() {
            Some(hid) => hid.submit_input_report(report),
            None => Err(UsbError::InvalidState),
        })
    }
}

/// Remote wakeup through the RP2040's resume signalling.
struct UsbWakeup;

impl RemoteWakeup for UsbWakeup {
    fn request_remote_wakeup(&self) {
        critical_section::with(|cs| match USB_DEVICE.borrow_ref(cs).as_ref() {
            Some(device) if device.remote_wakeup_enabled() => {
                info!("Requesting remote wakeup");
                device.bus().remote_wakeup();
            },
            Some(_) => warn!("Remote wakeup not enabled by host"),
            None => {},
        });
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn IO_IRQ_BANK0() {
    critical_section::with(|cs| {
        let mut buttons = BUTTONS.borrow_ref_mut(cs);
        let Some(buttons) = buttons.as_mut() else {
            return;
        };

        for button in buttons.iter_mut() {
            let pin = button.pin_mut();
            let fell = pin.interrupt_status(Interrupt::EdgeLow);
            let rose = pin.interrupt_status(Interrupt::EdgeHigh);
            if !fell && !rose {
                continue;
            }
            pin.clear_interrupt(Interrupt::EdgeLow);
            pin.clear_interrupt(Interrupt::EdgeHigh);

            if let EdgeOutcome::Reported(_) = button.on_edge(&UsbWakeup) {
                // Wake the dispatcher out of `wfe`.
                cortex_m::asm::sev();
            }
        }
    });
}

#[allow(non_snake_case)]
#[interrupt]
fn USBCTRL_IRQ() {
    critical_section::with(|cs| {
        let mut device = USB_DEVICE.borrow_ref_mut(cs);
        let mut hid = USB_HID.borrow_ref_mut(cs);
        let (Some(device), Some(hid)) = (device.as_mut(), hid.as_mut()) else {
            return;
        };

        device.poll(&mut [hid]);
        KEYPAD.link.on_link_status(LinkState::from(device.state()));

        if let Some(indicators) = INDICATORS.borrow_ref_mut(cs).as_mut() {
            if indicators.apply(hid.host_leds()).is_err() {
                warn!("Failed to update the indicator LEDs");
            }
        }
    });
}

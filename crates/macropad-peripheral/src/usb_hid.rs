use core::cell::RefCell;
use core::fmt::Display;

use cortex_m::interrupt::{Mutex, free};
use macropad_common::{dev_debug, dev_warn};
use macropad_core::hid::{ConsumerState, HidTransport, KeyChangeError, KeyboardState};
use macropad_core::keys::{ConsumerCode, Key};
use usb_device::{
    bus::{UsbBus, UsbBusAllocator},
    prelude::BuilderError,
    device::{StringDescriptors, UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid},
};
use usbd_hid::{
    UsbError,
    descriptor::{KeyboardReport, MediaKeyboardReport, SerializedDescriptor},
    hid_class::{HIDClass, HidClassSettings, HidProtocol, HidSubClass},
};

#[derive(Debug)]
pub enum HidPushError {
    Usb(UsbError),
    NotConfigured,
}

impl From<UsbError> for HidPushError {
    fn from(value: UsbError) -> Self {
        Self::Usb(value)
    }
}

impl Display for HidPushError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HidPushError::Usb(usb_error) => write!(f, "Usb error: {:?}", usb_error),
            HidPushError::NotConfigured => write!(f, "Device not configured by host"),
        }
    }
}

pub struct UsbHidSettings<'s, 'b> {
    pub vid_pid: UsbVidPid,
    pub string_descriptors: &'s [StringDescriptors<'b>],
    pub poll_ms: u8,
}

/// A USB device exposing a boot keyboard and a consumer control
/// interface.
pub struct UsbHid<'a, B: UsbBus> {
    usb_dev: UsbDevice<'a, B>,
    keyboard: HIDClass<'a, B>,
    consumer: HIDClass<'a, B>,
}

impl<'a, B: UsbBus> UsbHid<'a, B> {
    pub fn alloc<'s>(allocator: &'a UsbBusAllocator<B>, settings: &'s UsbHidSettings<'s, 'a>) -> Result<Self, BuilderError> {
        let mut keyboard_settings = HidClassSettings::default();
        keyboard_settings.protocol = HidProtocol::Keyboard;
        keyboard_settings.subclass = HidSubClass::Boot;

        let keyboard =
            HIDClass::new_ep_in_with_settings(allocator, KeyboardReport::desc(), settings.poll_ms, keyboard_settings);
        let consumer = HIDClass::new_ep_in(allocator, MediaKeyboardReport::desc(), settings.poll_ms);

        let usb_dev = UsbDeviceBuilder::new(allocator, UsbVidPid(settings.vid_pid.0, settings.vid_pid.1))
            .strings(settings.string_descriptors)?
            .build();

        Ok(Self {
            usb_dev,
            keyboard,
            consumer,
        })
    }

    /// Services the USB device. Must be called from the USB interrupt.
    pub fn poll(&mut self) -> bool {
        self.usb_dev.poll(&mut [&mut self.keyboard, &mut self.consumer])
    }

    pub fn is_configured(&self) -> bool {
        self.usb_dev.state() == UsbDeviceState::Configured
    }

    pub fn push_keyboard(&mut self, report: &KeyboardReport) -> Result<(), HidPushError> {
        if !self.is_configured() {
            return Err(HidPushError::NotConfigured);
        }
        self.keyboard.push_input(report)?;
        Ok(())
    }

    pub fn push_consumer(&mut self, report: &MediaKeyboardReport) -> Result<(), HidPushError> {
        if !self.is_configured() {
            return Err(HidPushError::NotConfigured);
        }
        self.consumer.push_input(report)?;
        Ok(())
    }
}

pub type SharedUsbHid<B> = Mutex<RefCell<Option<UsbHid<'static, B>>>>;

/// The [`HidTransport`] used by the control loop. It keeps the state of
/// the reports, and hands every change to the USB device that lives in
/// `device`, shared with the USB interrupt.
pub struct UsbHidTransport<B: UsbBus + 'static> {
    device: &'static SharedUsbHid<B>,
    keyboard: KeyboardState,
    consumer: ConsumerState,
}

enum Report {
    Keyboard(KeyboardReport),
    Consumer(MediaKeyboardReport),
}

impl<B: UsbBus + 'static> UsbHidTransport<B> {
    pub const fn new(device: &'static SharedUsbHid<B>) -> Self {
        Self {
            device,
            keyboard: KeyboardState::new(),
            consumer: ConsumerState::new(),
        }
    }

    fn on_key_change(&mut self, key: Key, change: Result<(), KeyChangeError>) {
        match change {
            Ok(()) => self.send(Report::Keyboard(self.keyboard.report())),
            Err(KeyChangeError::RollOver) => {
                dev_warn!("Key roll over while pressing {:?}", key);
                self.send(Report::Keyboard(self.keyboard.report()));
            }
            Err(e) => {
                dev_warn!("Unable to change state of key {:?}: {}", key, e);
            }
        }
    }

    fn on_consumer_change(&mut self, code: ConsumerCode, change: Result<(), KeyChangeError>) {
        match change {
            Ok(()) => self.send(Report::Consumer(self.consumer.report())),
            Err(e) => {
                dev_warn!("Unable to change state of consumer usage {:?}: {}", code, e);
            }
        }
    }

    /// Spins until the endpoint accepts the report. Interrupts are
    /// enabled between attempts, so that the USB interrupt can drain
    /// the endpoint.
    fn send(&mut self, report: Report) {
        loop {
            let result = free(|cs| {
                let mut device = self.device.borrow(cs).borrow_mut();
                device.as_mut().map(|hid| match &report {
                    Report::Keyboard(r) => hid.push_keyboard(r),
                    Report::Consumer(r) => hid.push_consumer(r),
                })
            });

            match result {
                Some(Ok(())) => return,
                Some(Err(HidPushError::Usb(UsbError::WouldBlock))) => core::hint::spin_loop(),
                Some(Err(HidPushError::NotConfigured)) => {
                    dev_debug!("Dropping report, device not configured");
                    return;
                }
                Some(Err(e)) => {
                    dev_warn!("Unable to send report: {}", e);
                    return;
                }
                None => {
                    dev_warn!("USB device not initialized yet");
                    return;
                }
            }
        }
    }
}

impl<B: UsbBus + 'static> HidTransport for UsbHidTransport<B> {
    fn press(&mut self, key: Key) {
        let change = self.keyboard.press(key);
        self.on_key_change(key, change);
    }

    fn release(&mut self, key: Key) {
        let change = self.keyboard.release(key);
        self.on_key_change(key, change);
    }

    fn press_consumer(&mut self, code: ConsumerCode) {
        let change = self.consumer.press(code);
        self.on_consumer_change(code, change);
    }

    fn release_consumer(&mut self, code: ConsumerCode) {
        let change = self.consumer.release(code);
        self.on_consumer_change(code, change);
    }
}

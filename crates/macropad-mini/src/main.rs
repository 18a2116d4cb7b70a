// Firmware for a three key macro pad with a rotary encoder and one
// addressable RGB pixel per key, built around an STM32F411 "Black Pill".

#![no_std]
#![no_main]
#![allow(static_mut_refs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::bare_urls)]

mod config;
mod layout;

use config::*;

use core::cell::RefCell;
use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use cortex_m::interrupt::{Mutex, free};
use embedded_hal::delay::DelayNs;
use macropad_common::dev_info;
use macropad_core::boot::BootGate;
use macropad_core::control::ControlLoop;
use macropad_core::encoder::RotaryEncoder;
use macropad_core::indicator::IndicatorStrip;
use macropad_core::input::ActiveLow;
use macropad_peripheral::BootloaderUtil;
use macropad_peripheral::bootloader::SystemBootloader;
use macropad_peripheral::usb_hid::{SharedUsbHid, UsbHid, UsbHidSettings, UsbHidTransport};
use macropad_peripheral::watchdog::IndependentWatchdog;

#[allow(unused_imports)]
use panic_itm as _;

use cortex_m_rt::entry;
use stm32f4xx_hal::{
    gpio::NoPin,
    interrupt,
    otg_fs::USB,
    pac::{self, NVIC},
    prelude::*,
};
use usb_device::bus::UsbBusAllocator;
use usb_device::device::{StringDescriptors, UsbVidPid};
use ws2812_spi::Ws2812;

static mut EP_MEMORY: [u32; 1024] = [0; 1024];
static mut USB_ALLOC: MaybeUninit<UsbBusAllocator<TUsbBus>> = MaybeUninit::uninit();

// Shared between the control loop, which pushes reports, and the USB
// interrupt, which polls the device.
static USB_HID: SharedUsbHid<TUsbBus> = Mutex::new(RefCell::new(None));

fn usb_hid() -> &'static SharedUsbHid<TUsbBus> {
    &USB_HID
}

#[entry]
fn main() -> ! {
    main0()
}

fn main0() -> ! {
    unsafe {
        BootloaderUtil::handle_bootloader_enter_request();
    }

    let dp = pac::Peripherals::take().unwrap();
    let cortex = cortex_m::Peripherals::take().unwrap();

    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(25.MHz())
        .sysclk(96.MHz())
        .pclk1(48.MHz())
        .pclk2(48.MHz())
        .require_pll48clk()
        .freeze();

    #[cfg(feature = "dev-log")]
    itm_logger::init_with_level(log::Level::Info).unwrap();
    dev_info!("Device startup. Device configuration:");
    dev_info!(" - Loop period: {} ms", LOOP_PERIOD_MS);
    dev_info!(" - Indicator max level: {}", INDICATOR_MAX);

    let gpioa = dp.GPIOA.split();
    let gpiob = dp.GPIOB.split();

    let mut delay = cortex.SYST.delay(&clocks);

    let spi = dp.SPI1.spi(
        (gpioa.pa5, NoPin::new(), gpioa.pa7),
        ws2812_spi::MODE,
        3.MHz(),
        &clocks,
    );
    let mut strip: TStrip = IndicatorStrip::new(Ws2812::new(spi), PALETTE);

    let mut keys: [KeyPin; KEYS] = [
        ActiveLow::new(gpiob.pb12.into_pull_up_input().erase()),
        ActiveLow::new(gpiob.pb13.into_pull_up_input().erase()),
        ActiveLow::new(gpiob.pb14.into_pull_up_input().erase()),
    ];
    let encoder: TEncoder = RotaryEncoder::new(
        ActiveLow::new(gpiob.pb6.into_pull_up_input().erase()),
        ActiveLow::new(gpiob.pb7.into_pull_up_input().erase()),
        ActiveLow::new(gpiob.pb8.into_pull_up_input().erase()),
    );

    delay.delay_ms(PIN_SETTLE_MS);

    // Holding key 1 while plugging the device in enters the bootloader.
    let boot = BootGate::sample(&mut keys[0]).resolve(&mut strip, &mut SystemBootloader);

    let usb = USB {
        usb_global: dp.OTG_FS_GLOBAL,
        usb_device: dp.OTG_FS_DEVICE,
        usb_pwrclk: dp.OTG_FS_PWRCLK,
        pin_dm: gpioa.pa11.into(),
        pin_dp: gpioa.pa12.into(),
        hclk: clocks.hclk(),
    };

    let usb_alloc = unsafe { USB_ALLOC.write(TUsbBus::new(usb, addr_of_mut!(EP_MEMORY).as_mut().unwrap())) };

    let hid = UsbHid::alloc(
        usb_alloc,
        &UsbHidSettings {
            vid_pid: UsbVidPid(USB_VID_PID.0, USB_VID_PID.1),
            string_descriptors: &[StringDescriptors::new(USB_LANG)
                .serial_number(USB_SERIAL)
                .manufacturer(USB_MANUFACTURER)
                .product(USB_PRODUCT)],
            poll_ms: USB_POLL_MS,
        },
    )
    .unwrap();

    free(|cs| {
        usb_hid().borrow(cs).replace(Some(hid));
    });

    unsafe {
        NVIC::unmask(pac::Interrupt::OTG_FS);
    }

    let control: TControlLoop = ControlLoop::start(
        keys,
        encoder,
        &layout::BINDINGS,
        strip,
        UsbHidTransport::new(usb_hid()),
        delay,
        IndependentWatchdog::new(dp.IWDG, WATCHDOG_TIMEOUT_MS.millis()),
        LOOP_PERIOD_MS,
        boot,
    );

    control.run()
}

#[interrupt]
fn OTG_FS() {
    free(|cs| {
        if let Some(hid) = usb_hid().borrow(cs).borrow_mut().as_mut() {
            hid.poll();
        }
    });
}

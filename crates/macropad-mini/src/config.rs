use macropad_core::control::ControlLoop;
use macropad_core::encoder::{RotaryEncoder, SpinWait};
use macropad_core::indicator::{ChannelColor, IndicatorStrip};
use macropad_core::input::ActiveLow;
use macropad_peripheral::usb_hid::UsbHidTransport;
use macropad_peripheral::watchdog::IndependentWatchdog;
use stm32f4xx_hal::{
    gpio::{ErasedPin, Input},
    otg_fs::USB,
    pac::SPI1,
    spi::Spi,
    timer::SysDelay,
};
use synopsys_usb_otg::UsbBus;
use usb_device::LangID;
use ws2812_spi::Ws2812;

pub const KEYS: usize = 3;
pub const CHANNELS: usize = 3;

pub const INDICATOR_MAX: u8 = 127;
pub const PALETTE: [ChannelColor; CHANNELS] = [ChannelColor::Red, ChannelColor::Green, ChannelColor::Blue];

pub const LOOP_PERIOD_MS: u32 = 5;
pub const WATCHDOG_TIMEOUT_MS: u32 = 1000;
// Time given to the pins to settle after enabling the pull-ups, before
// sampling the boot key.
pub const PIN_SETTLE_MS: u32 = 10;

// Time given to a freshly opened terminal to take the focus.
#[cfg(feature = "layout-desktop")]
pub const TERMINAL_FOCUS_DELAY_MS: u32 = 500;

pub const USB_VID_PID: (u16, u16) = (0x16c0, 0x27db);
pub const USB_LANG: LangID = LangID::EN_US;
pub const USB_MANUFACTURER: &str = "macropad";
pub const USB_PRODUCT: &str = "MacroPad Mini";
pub const USB_SERIAL: &str = "0";
pub const USB_POLL_MS: u8 = 1;

pub type KeyPin = ActiveLow<ErasedPin<Input>>;
pub type EncoderPin = ActiveLow<ErasedPin<Input>>;

pub type TUsbBus = UsbBus<USB>;
pub type TPixels = Ws2812<Spi<SPI1>>;
pub type TStrip = IndicatorStrip<TPixels, CHANNELS, INDICATOR_MAX>;
pub type TEncoder = RotaryEncoder<EncoderPin, EncoderPin, EncoderPin, SpinWait>;

pub type TControlLoop = ControlLoop<
    KeyPin,
    EncoderPin,
    EncoderPin,
    EncoderPin,
    SpinWait,
    UsbHidTransport<TUsbBus>,
    SysDelay,
    IndependentWatchdog,
    TPixels,
    KEYS,
    CHANNELS,
    INDICATOR_MAX,
>;

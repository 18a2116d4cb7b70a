use macropad_common::dev_info;
use macropad_core::control::Watchdog;
use stm32f4xx_hal::pac::IWDG;
use fugit::MillisDurationU32 as MilliSeconds;
use stm32f4xx_hal::watchdog;

/// The independent watchdog of the chip. Once started, it cannot be
/// stopped, and resets the core unless fed within `timeout`.
pub struct IndependentWatchdog {
    iwdg: watchdog::IndependentWatchdog,
    timeout: MilliSeconds,
}

impl IndependentWatchdog {
    pub fn new(iwdg: IWDG, timeout: MilliSeconds) -> Self {
        Self {
            iwdg: watchdog::IndependentWatchdog::new(iwdg),
            timeout,
        }
    }
}

impl Watchdog for IndependentWatchdog {
    fn start(&mut self) {
        dev_info!("Starting watchdog with a {} ms timeout", self.timeout.ticks());
        self.iwdg.start(self.timeout);
    }

    #[inline]
    fn feed(&mut self) {
        self.iwdg.feed();
    }
}

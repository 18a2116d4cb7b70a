use macropad_common::dev_info;
use smart_leds::{RGB8, SmartLedsWrite};

use crate::indicator::IndicatorStrip;
use crate::input::RawInput;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootMode {
    Normal,
    BootloaderEntry,
}

/// Transfers the execution to the bootloader. There is no way back.
pub trait Bootloader {
    fn enter(&mut self) -> !;
}

/// Proof that the boot gate decided to boot normally. Only the gate is
/// able to create it, and the control loop cannot be started without
/// one.
#[derive(Debug)]
pub struct NormalBoot {
    _private: (),
}

/// The one-time decision, made at power-up, of whether the device has
/// to boot normally or enter the bootloader. The decision is taken from
/// the raw state of a single key, before any debounce history exists.
#[derive(Clone, Copy, Debug)]
pub struct BootGate {
    mode: BootMode,
}

impl BootGate {
    pub fn sample<R: RawInput>(key: &mut R) -> Self {
        let mode = if key.is_asserted() {
            BootMode::BootloaderEntry
        } else {
            BootMode::Normal
        };
        Self { mode }
    }

    pub fn mode(&self) -> BootMode {
        self.mode
    }

    /// Either returns the normal boot token, or lights every indicator
    /// at full brightness and enters the bootloader.
    pub fn resolve<W, L, const N: usize, const MAX: u8>(
        self,
        strip: &mut IndicatorStrip<W, N, MAX>,
        bootloader: &mut L,
    ) -> NormalBoot
    where
        W: SmartLedsWrite<Color = RGB8>,
        L: Bootloader,
    {
        match self.mode {
            BootMode::Normal => {
                dev_info!("Booting normally");
                NormalBoot { _private: () }
            }
            BootMode::BootloaderEntry => {
                dev_info!("Boot key held, entering bootloader");
                strip.render_full();
                bootloader.enter()
            }
        }
    }
}

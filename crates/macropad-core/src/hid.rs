use core::fmt::Display;

use heapless::Vec;
use macropad_common::dev_warn;
use usbd_hid::descriptor::{KeyboardReport, MediaKeyboardReport};

use crate::keys::{ConsumerCode, Key, KeyCode};

/// A type that is able to deliver key and consumer control changes to
/// the USB host. Whatever USB implementation, endpoints or report
/// protocol it uses under the hood is implementation-specific.
///
/// Operations have no error channel: once the transport is
/// initialized, they are assumed to always succeed.
pub trait HidTransport {
    fn press(&mut self, key: Key);
    fn release(&mut self, key: Key);

    fn press_consumer(&mut self, code: ConsumerCode);
    fn release_consumer(&mut self, code: ConsumerCode);

    /// Presses and releases a key.
    fn tap(&mut self, key: Key) {
        self.press(key);
        self.release(key);
    }

    fn tap_consumer(&mut self, code: ConsumerCode) {
        self.press_consumer(code);
        self.release_consumer(code);
    }

    /// Types every character of `text`, in order. Characters that
    /// cannot be typed are skipped.
    fn print(&mut self, text: &str) {
        for c in text.chars() {
            let key = Key::Char(c);
            if key.resolve().is_none() {
                dev_warn!("Skipping character that cannot be typed: {:?}", c);
                continue;
            }
            self.tap(key);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyChangeError {
    /// The key cannot be represented in a keyboard report.
    Unsupported,
    /// The key was already pressed, or already released.
    InvalidState,
    /// Too many keys are pressed at once.
    RollOver,
}

impl Display for KeyChangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KeyChangeError::Unsupported => write!(f, "Key not supported"),
            KeyChangeError::InvalidState => write!(f, "Key already in the requested state"),
            KeyChangeError::RollOver => write!(f, "Too many keys pressed"),
        }
    }
}

const USAGE_ERROR_ROLL_OVER: u8 = 0x01;
const LEFT_SHIFT_BIT: u8 = 0b0000_0010;
const MAX_REPORT_KEYS: usize = 6;
const MAX_ROLLED_OVER_KEYS: usize = 8;

/// Holds the state of the keys currently pressed, from which boot
/// protocol keyboard reports are built.
pub struct KeyboardState {
    modifiers: u8,
    /// Number of pressed keys that needed an implicit Shift to be
    /// typed.
    implicit_shift: u8,
    keys: Vec<u8, MAX_REPORT_KEYS>,
    /// Pressed keys that didn't fit in the report. Keys beyond this
    /// capacity are not tracked at all.
    rolled_over: Vec<u8, MAX_ROLLED_OVER_KEYS>,
}

impl KeyboardState {
    pub const fn new() -> Self {
        Self {
            modifiers: 0,
            implicit_shift: 0,
            keys: Vec::new(),
            rolled_over: Vec::new(),
        }
    }

    pub fn press(&mut self, key: Key) -> Result<(), KeyChangeError> {
        let code = key.resolve().ok_or(KeyChangeError::Unsupported)?;
        if let Some(bit) = code.modifier_bit() {
            if self.modifiers & bit != 0 {
                return Err(KeyChangeError::InvalidState);
            }
            self.modifiers |= bit;
            return Ok(());
        }

        if self.keys.contains(&code.usage) || self.rolled_over.contains(&code.usage) {
            return Err(KeyChangeError::InvalidState);
        }

        if self.keys.push(code.usage).is_err() {
            let _ = self.rolled_over.push(code.usage);
            return Err(KeyChangeError::RollOver);
        }

        self.mark_implicit_shift(code, true);
        Ok(())
    }

    pub fn release(&mut self, key: Key) -> Result<(), KeyChangeError> {
        let code = key.resolve().ok_or(KeyChangeError::Unsupported)?;
        if let Some(bit) = code.modifier_bit() {
            if self.modifiers & bit == 0 {
                return Err(KeyChangeError::InvalidState);
            }
            self.modifiers &= !bit;
            return Ok(());
        }

        if let Some(pos) = self.keys.iter().position(|k| *k == code.usage) {
            self.keys.remove(pos);
            self.mark_implicit_shift(code, false);
            return Ok(());
        }

        match self.rolled_over.iter().position(|k| *k == code.usage) {
            Some(pos) => {
                self.rolled_over.remove(pos);
                Ok(())
            }
            None => Err(KeyChangeError::InvalidState),
        }
    }

    fn mark_implicit_shift(&mut self, code: KeyCode, pressed: bool) {
        if !code.shift {
            return;
        }

        if pressed {
            self.implicit_shift += 1;
        } else {
            self.implicit_shift = self.implicit_shift.saturating_sub(1);
        }
    }

    pub fn is_rolled_over(&self) -> bool {
        !self.rolled_over.is_empty()
    }

    pub fn modifiers(&self) -> u8 {
        if self.implicit_shift > 0 {
            self.modifiers | LEFT_SHIFT_BIT
        } else {
            self.modifiers
        }
    }

    pub fn report(&self) -> KeyboardReport {
        let mut keycodes = [0u8; MAX_REPORT_KEYS];
        if self.is_rolled_over() {
            keycodes = [USAGE_ERROR_ROLL_OVER; MAX_REPORT_KEYS];
        } else {
            keycodes[..self.keys.len()].copy_from_slice(&self.keys);
        }

        KeyboardReport {
            modifier: self.modifiers(),
            reserved: 0,
            leds: 0,
            keycodes,
        }
    }
}

/// Holds the consumer control usage currently pressed. Only one can
/// be pressed at a time; pressing another one replaces it.
pub struct ConsumerState {
    active: Option<ConsumerCode>,
}

impl ConsumerState {
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn press(&mut self, code: ConsumerCode) -> Result<(), KeyChangeError> {
        if self.active == Some(code) {
            return Err(KeyChangeError::InvalidState);
        }
        self.active = Some(code);
        Ok(())
    }

    pub fn release(&mut self, code: ConsumerCode) -> Result<(), KeyChangeError> {
        if self.active != Some(code) {
            return Err(KeyChangeError::InvalidState);
        }
        self.active = None;
        Ok(())
    }

    pub fn active(&self) -> Option<ConsumerCode> {
        self.active
    }

    pub fn report(&self) -> MediaKeyboardReport {
        MediaKeyboardReport {
            usage_id: self.active.map(ConsumerCode::usage).unwrap_or(0),
        }
    }
}

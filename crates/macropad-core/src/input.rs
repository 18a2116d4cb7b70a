use embedded_hal::digital::InputPin;
use macropad_common::{KeyState, Transition};

/// A physical input line whose only observable property is whether
/// it is asserted or not at the moment of reading it.
pub trait RawInput {
    fn is_asserted(&mut self) -> bool;
}

/// An input pin wired with a pull-up resistor, so that the line is
/// asserted while it is being pulled low (e.g. by a switch to ground).
pub struct ActiveLow<P: InputPin> {
    pin: P,
}

impl<P: InputPin> ActiveLow<P> {
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> RawInput for ActiveLow<P> {
    #[inline]
    fn is_asserted(&mut self) -> bool {
        // A pin that cannot be read is considered idle.
        self.pin.is_low().unwrap_or(false)
    }
}

/// An input pin wired with a pull-down resistor, asserted while high.
pub struct ActiveHigh<P: InputPin> {
    pin: P,
}

impl<P: InputPin> ActiveHigh<P> {
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> RawInput for ActiveHigh<P> {
    #[inline]
    fn is_asserted(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}

/// A single physical input, debounced by sampling it once per control
/// loop iteration.
///
/// No filtering is done over multiple samples: the fixed period of the
/// control loop acts as the sampling interval, so a level is never
/// reported unless it is still present one full period after the
/// previous sample. The reported state changes at most once per call
/// to [`DebouncedInput::classify`], and always to the level read in
/// that same call.
pub struct DebouncedInput<R: RawInput> {
    raw: R,
    stable_state: KeyState,
}

impl<R: RawInput> DebouncedInput<R> {
    /// Creates the input with no debounce history, that is, released.
    pub const fn new(raw: R) -> Self {
        Self {
            raw,
            stable_state: KeyState::Released,
        }
    }

    /// Samples the raw input once and classifies the sample against
    /// the last reported state, updating it if it has changed.
    pub fn classify(&mut self) -> Transition {
        let current = KeyState::from_bool(self.raw.is_asserted());
        let transition = Transition::between(self.stable_state, current);
        self.stable_state = current;
        transition
    }

    #[inline(always)]
    pub fn state(&self) -> KeyState {
        self.stable_state
    }
}

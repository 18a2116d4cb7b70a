use macropad_common::{Transition, dev_trace};

use crate::input::{DebouncedInput, RawInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

/// Blocks until the current detent of an encoder has been cleared,
/// that is, until its phase A stops being asserted.
pub trait DetentWait {
    fn wait_for_release<A: RawInput>(&mut self, phase_a: &mut A);
}

/// Busy-waits on phase A. If the encoder stays in the middle of a
/// detent forever, so does this wait, and the watchdog will
/// eventually reset the device.
#[derive(Clone, Copy, Default)]
pub struct SpinWait;

impl DetentWait for SpinWait {
    fn wait_for_release<A: RawInput>(&mut self, phase_a: &mut A) {
        while phase_a.is_asserted() {
            core::hint::spin_loop();
        }
    }
}

/// A rotary encoder made of a quadrature pair plus its push button.
///
/// Rotation is not debounced: it is resolved synchronously in the
/// same call it is detected, waiting for the detent to be cleared
/// before returning, so a single detent can never be reported twice.
pub struct RotaryEncoder<A, B, S, W = SpinWait>
where
    A: RawInput,
    B: RawInput,
    S: RawInput,
    W: DetentWait,
{
    phase_a: A,
    phase_b: B,
    switch: DebouncedInput<S>,
    wait: W,
}

impl<A: RawInput, B: RawInput, S: RawInput> RotaryEncoder<A, B, S, SpinWait> {
    pub const fn new(phase_a: A, phase_b: B, switch: S) -> Self {
        Self::with_wait(phase_a, phase_b, switch, SpinWait)
    }
}

impl<A, B, S, W> RotaryEncoder<A, B, S, W>
where
    A: RawInput,
    B: RawInput,
    S: RawInput,
    W: DetentWait,
{
    pub const fn with_wait(phase_a: A, phase_b: B, switch: S, wait: W) -> Self {
        Self {
            phase_a,
            phase_b,
            switch: DebouncedInput::new(switch),
            wait,
        }
    }

    pub fn classify_switch(&mut self) -> Transition {
        self.switch.classify()
    }

    pub fn switch(&self) -> &DebouncedInput<S> {
        &self.switch
    }

    /// Checks whether the encoder is in a detent. If it is, the
    /// direction is picked from phase B, `on_rotate` is invoked with
    /// it exactly once and then this blocks until phase A is released.
    pub fn poll_rotation(&mut self, on_rotate: impl FnOnce(Rotation)) -> Option<Rotation> {
        if !self.phase_a.is_asserted() {
            return None;
        }

        let rotation = if self.phase_b.is_asserted() {
            Rotation::CounterClockwise
        } else {
            Rotation::Clockwise
        };

        dev_trace!("Encoder rotation: {:?}", rotation);
        on_rotate(rotation);
        self.wait.wait_for_release(&mut self.phase_a);
        Some(rotation)
    }
}

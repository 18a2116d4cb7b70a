use embedded_hal::delay::DelayNs;
use macropad_common::Transition;
use macropad_common::util::BoundedIndex;

use crate::encoder::Rotation;
use crate::hid::HidTransport;
use crate::keys::{ConsumerCode, Key};

/// An effect that a binding can have on the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Press(Key),
    Release(Key),
    Tap(Key),
    Print(&'static str),
    /// Presses every modifier in order, taps the key and then releases
    /// the modifiers in the same order they were pressed.
    Chord(&'static [Key], Key),
    PressConsumer(ConsumerCode),
    ReleaseConsumer(ConsumerCode),
    TapConsumer(ConsumerCode),
    /// Stalls the control loop for the given number of milliseconds.
    Delay(u32),
    /// Selects the next [`Axis`] and sends the chord of its letter
    /// with the given modifiers.
    CycleAxis(&'static [Key]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }
}

/// Mutable state shared by the actions of every binding. Owned by the
/// control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    axis: Axis,
}

impl ActionContext {
    pub const fn new() -> Self {
        Self { axis: Axis::X }
    }

    pub const fn axis(&self) -> Axis {
        self.axis
    }

    fn advance_axis(&mut self) -> Axis {
        self.axis = self.axis.next();
        self.axis
    }
}

impl Default for ActionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Performs the given actions, in order, against the HID transport.
pub fn perform<H, D>(actions: &[Action], hid: &mut H, delay: &mut D, context: &mut ActionContext)
where
    H: HidTransport,
    D: DelayNs,
{
    for action in actions {
        match *action {
            Action::Press(key) => hid.press(key),
            Action::Release(key) => hid.release(key),
            Action::Tap(key) => hid.tap(key),
            Action::Print(text) => hid.print(text),
            Action::Chord(modifiers, key) => chord(hid, modifiers, key),
            Action::PressConsumer(code) => hid.press_consumer(code),
            Action::ReleaseConsumer(code) => hid.release_consumer(code),
            Action::TapConsumer(code) => hid.tap_consumer(code),
            Action::Delay(ms) => delay.delay_ms(ms),
            Action::CycleAxis(modifiers) => {
                let axis = context.advance_axis();
                chord(hid, modifiers, Key::Char(axis.letter()));
            }
        }
    }
}

fn chord<H: HidTransport>(hid: &mut H, modifiers: &[Key], key: Key) {
    for modifier in modifiers {
        hid.press(*modifier);
    }
    hid.tap(key);
    for modifier in modifiers {
        hid.release(*modifier);
    }
}

/// How a binding drives its indicator channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorBinding<const CHANNELS: usize> {
    None,
    /// Lights the channel on the pressed edge only.
    FlashOnPress(BoundedIndex<CHANNELS>),
    /// Lights the channel on the pressed edge and keeps it lit for as
    /// long as the input is held.
    LitWhileHeld(BoundedIndex<CHANNELS>),
}

impl<const CHANNELS: usize> IndicatorBinding<CHANNELS> {
    pub const fn channel(&self) -> Option<BoundedIndex<CHANNELS>> {
        match *self {
            IndicatorBinding::None => None,
            IndicatorBinding::FlashOnPress(ch) | IndicatorBinding::LitWhileHeld(ch) => Some(ch),
        }
    }

    /// The channel that must be set to its maximum level after the
    /// given transition, if any.
    pub const fn activation(&self, transition: Transition) -> Option<BoundedIndex<CHANNELS>> {
        match (*self, transition) {
            (IndicatorBinding::FlashOnPress(ch), Transition::PressedEdge) => Some(ch),
            (IndicatorBinding::LitWhileHeld(ch), Transition::PressedEdge | Transition::SteadyPressed) => Some(ch),
            _ => None,
        }
    }
}

/// The actions bound to a single logical input.
#[derive(Clone, Copy, Debug)]
pub struct Binding<const CHANNELS: usize> {
    pub on_press: &'static [Action],
    pub on_release: &'static [Action],
    pub on_hold: &'static [Action],
    pub indicator: IndicatorBinding<CHANNELS>,
}

impl<const CHANNELS: usize> Binding<CHANNELS> {
    pub const NONE: Self = Self::new();

    pub const fn new() -> Self {
        Self {
            on_press: &[],
            on_release: &[],
            on_hold: &[],
            indicator: IndicatorBinding::None,
        }
    }

    pub const fn on_press(mut self, actions: &'static [Action]) -> Self {
        self.on_press = actions;
        self
    }

    pub const fn on_release(mut self, actions: &'static [Action]) -> Self {
        self.on_release = actions;
        self
    }

    pub const fn on_hold(mut self, actions: &'static [Action]) -> Self {
        self.on_hold = actions;
        self
    }

    pub const fn indicator(mut self, indicator: IndicatorBinding<CHANNELS>) -> Self {
        self.indicator = indicator;
        self
    }

    pub const fn actions_for(&self, transition: Transition) -> &'static [Action] {
        match transition {
            Transition::PressedEdge => self.on_press,
            Transition::ReleasedEdge => self.on_release,
            Transition::SteadyPressed => self.on_hold,
            Transition::SteadyReleased => &[],
        }
    }
}

/// The whole binding table of the device: one binding per key, in the
/// order they are dispatched, plus the encoder ones.
#[derive(Clone, Copy, Debug)]
pub struct Bindings<const KEYS: usize, const CHANNELS: usize> {
    pub keys: [Binding<CHANNELS>; KEYS],
    pub encoder_switch: Binding<CHANNELS>,
    pub rotate_cw: &'static [Action],
    pub rotate_ccw: &'static [Action],
}

impl<const KEYS: usize, const CHANNELS: usize> Bindings<KEYS, CHANNELS> {
    pub const fn rotation(&self, rotation: Rotation) -> &'static [Action] {
        match rotation {
            Rotation::Clockwise => self.rotate_cw,
            Rotation::CounterClockwise => self.rotate_ccw,
        }
    }
}

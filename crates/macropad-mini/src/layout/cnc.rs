//! Jog pendant layout for CNC control software. Every shortcut is sent
//! with Ctrl+Alt+GUI held.

use macropad_common::util::BoundedIndex;
use macropad_core::action::{Action, Binding, Bindings, IndicatorBinding};
use macropad_core::keys::Key;

use crate::config::{CHANNELS, KEYS};

const MODS: &[Key] = &[Key::LEFT_CTRL, Key::LEFT_ALT, Key::LEFT_GUI];

const FEED_HOLD: &[Action] = &[Action::Tap(Key::Char('!'))];
const HOMING: &[Action] = &[Action::Chord(MODS, Key::Char('h'))];
const UNLOCK: &[Action] = &[Action::Chord(MODS, Key::Char('u'))];
const SELECT_NEXT_AXIS: &[Action] = &[Action::CycleAxis(MODS)];
const JOG_FORWARD: &[Action] = &[Action::Chord(MODS, Key::Char(']'))];
const JOG_BACKWARD: &[Action] = &[Action::Chord(MODS, Key::Char('['))];

pub static BINDINGS: Bindings<KEYS, CHANNELS> = Bindings {
    keys: [
        Binding::new()
            .on_press(FEED_HOLD)
            .indicator(IndicatorBinding::LitWhileHeld(BoundedIndex::from_const::<0>())),
        Binding::new()
            .on_press(HOMING)
            .indicator(IndicatorBinding::LitWhileHeld(BoundedIndex::from_const::<1>())),
        Binding::new()
            .on_press(UNLOCK)
            .indicator(IndicatorBinding::LitWhileHeld(BoundedIndex::from_const::<2>())),
    ],
    encoder_switch: Binding::new().on_press(SELECT_NEXT_AXIS),
    rotate_cw: JOG_FORWARD,
    rotate_ccw: JOG_BACKWARD,
};

use macropad_common::util::BoundedIndex;
use macropad_core::action::{Action, Binding, Bindings, IndicatorBinding};
use macropad_core::keys::{ConsumerCode, Key};

use crate::config::{CHANNELS, KEYS, TERMINAL_FOCUS_DELAY_MS};

// Opens a terminal and shuts the host down.
const SHUTDOWN: &[Action] = &[
    Action::Press(Key::LEFT_GUI),
    Action::Tap(Key::Char('t')),
    Action::Delay(TERMINAL_FOCUS_DELAY_MS),
    Action::Release(Key::LEFT_GUI),
    Action::Print("sudo shutdown -h now"),
    Action::Tap(Key::RETURN),
];

// Ctrl+Alt+Del, held for as long as the key is.
const CTRL_ALT_DEL_PRESS: &[Action] = &[
    Action::Press(Key::LEFT_CTRL),
    Action::Press(Key::LEFT_ALT),
    Action::Press(Key::DELETE),
];
const CTRL_ALT_DEL_RELEASE: &[Action] = &[
    Action::Release(Key::DELETE),
    Action::Release(Key::LEFT_ALT),
    Action::Release(Key::LEFT_CTRL),
];

const MUTE_PRESS: &[Action] = &[Action::PressConsumer(ConsumerCode::MUTE)];
const MUTE_RELEASE: &[Action] = &[Action::ReleaseConsumer(ConsumerCode::MUTE)];

const PLAY_PAUSE: &[Action] = &[Action::TapConsumer(ConsumerCode::PLAY_PAUSE)];
const VOLUME_UP: &[Action] = &[Action::TapConsumer(ConsumerCode::VOLUME_UP)];
const VOLUME_DOWN: &[Action] = &[Action::TapConsumer(ConsumerCode::VOLUME_DOWN)];

pub static BINDINGS: Bindings<KEYS, CHANNELS> = Bindings {
    keys: [
        Binding::new()
            .on_press(SHUTDOWN)
            .indicator(IndicatorBinding::FlashOnPress(BoundedIndex::from_const::<0>())),
        Binding::new()
            .on_press(CTRL_ALT_DEL_PRESS)
            .on_release(CTRL_ALT_DEL_RELEASE)
            .indicator(IndicatorBinding::LitWhileHeld(BoundedIndex::from_const::<1>())),
        Binding::new()
            .on_press(MUTE_PRESS)
            .on_release(MUTE_RELEASE)
            .indicator(IndicatorBinding::LitWhileHeld(BoundedIndex::from_const::<2>())),
    ],
    encoder_switch: Binding::new().on_press(PLAY_PAUSE),
    rotate_cw: VOLUME_UP,
    rotate_ccw: VOLUME_DOWN,
};

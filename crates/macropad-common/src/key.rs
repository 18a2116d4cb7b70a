#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyState {
    Released = 0,
    Pressed = 1,
}

impl KeyState {
    pub const fn from_bool(value: bool) -> KeyState {
        match value {
            true => KeyState::Pressed,
            false => KeyState::Released,
        }
    }

    pub const fn to_bool(self) -> bool {
        match self {
            KeyState::Released => false,
            KeyState::Pressed => true,
        }
    }
}

impl Default for KeyState {
    fn default() -> Self {
        KeyState::Released
    }
}

/// The classification of a single sample of an input, compared
/// against the last state that was reported for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    PressedEdge,
    ReleasedEdge,
    SteadyPressed,
    SteadyReleased,
}

impl Transition {
    pub const fn between(previous: KeyState, current: KeyState) -> Transition {
        match (previous, current) {
            (KeyState::Released, KeyState::Pressed) => Transition::PressedEdge,
            (KeyState::Pressed, KeyState::Released) => Transition::ReleasedEdge,
            (KeyState::Pressed, KeyState::Pressed) => Transition::SteadyPressed,
            (KeyState::Released, KeyState::Released) => Transition::SteadyReleased,
        }
    }

    /// The state the input is in after this transition.
    pub const fn state(self) -> KeyState {
        match self {
            Transition::PressedEdge | Transition::SteadyPressed => KeyState::Pressed,
            Transition::ReleasedEdge | Transition::SteadyReleased => KeyState::Released,
        }
    }

    pub const fn is_edge(self) -> bool {
        matches!(self, Transition::PressedEdge | Transition::ReleasedEdge)
    }
}

use usbd_hid::descriptor::{KeyboardUsage, MediaKey};

/// A key that can be sent to the host. Characters are translated to
/// the key that produces them in a US layout, pressing Shift
/// alongside when needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Usage(u8),
}

/// A key resolved into a HID keyboard page usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCode {
    pub usage: u8,
    pub shift: bool,
}

const USAGE_MODIFIER_FIRST: u8 = 0xe0;
const USAGE_MODIFIER_LAST: u8 = 0xe7;

impl KeyCode {
    pub const fn plain(usage: u8) -> Self {
        Self { usage, shift: false }
    }

    pub const fn shifted(usage: u8) -> Self {
        Self { usage, shift: true }
    }

    pub const fn is_modifier(&self) -> bool {
        self.usage >= USAGE_MODIFIER_FIRST && self.usage <= USAGE_MODIFIER_LAST
    }

    /// The bit of the modifier byte of a keyboard report that
    /// represents this key, if it is a modifier.
    pub const fn modifier_bit(&self) -> Option<u8> {
        if self.is_modifier() {
            Some(1 << (self.usage - USAGE_MODIFIER_FIRST))
        } else {
            None
        }
    }
}

impl Key {
    pub const LEFT_CTRL: Key = Key::Usage(0xe0);
    pub const LEFT_SHIFT: Key = Key::Usage(0xe1);
    pub const LEFT_ALT: Key = Key::Usage(0xe2);
    pub const LEFT_GUI: Key = Key::Usage(0xe3);
    pub const RIGHT_CTRL: Key = Key::Usage(0xe4);
    pub const RIGHT_SHIFT: Key = Key::Usage(0xe5);
    pub const RIGHT_ALT: Key = Key::Usage(0xe6);
    pub const RIGHT_GUI: Key = Key::Usage(0xe7);

    pub const RETURN: Key = Key::Usage(0x28);
    pub const ESCAPE: Key = Key::Usage(0x29);
    pub const BACKSPACE: Key = Key::Usage(0x2a);
    pub const TAB: Key = Key::Usage(0x2b);
    pub const SPACE: Key = Key::Usage(0x2c);
    pub const DELETE: Key = Key::Usage(0x4c);
    pub const PAGE_UP: Key = Key::Usage(0x4b);
    pub const PAGE_DOWN: Key = Key::Usage(0x4e);
    pub const RIGHT_ARROW: Key = Key::Usage(0x4f);
    pub const LEFT_ARROW: Key = Key::Usage(0x50);
    pub const DOWN_ARROW: Key = Key::Usage(0x51);
    pub const UP_ARROW: Key = Key::Usage(0x52);

    /// Resolves the key into a keyboard usage. Returns [`None`] for
    /// characters that cannot be typed with a US layout.
    pub const fn resolve(self) -> Option<KeyCode> {
        match self {
            Key::Usage(usage) => Some(KeyCode::plain(usage)),
            Key::Char(c) => ascii_key_code(c),
        }
    }
}

impl From<char> for Key {
    fn from(value: char) -> Self {
        Key::Char(value)
    }
}

impl From<KeyboardUsage> for Key {
    fn from(value: KeyboardUsage) -> Self {
        Key::Usage(value as u8)
    }
}

const fn ascii_key_code(c: char) -> Option<KeyCode> {
    let code = match c {
        'a'..='z' => KeyCode::plain(0x04 + (c as u8 - b'a')),
        'A'..='Z' => KeyCode::shifted(0x04 + (c as u8 - b'A')),
        '1'..='9' => KeyCode::plain(0x1e + (c as u8 - b'1')),
        '0' => KeyCode::plain(0x27),
        '!' => KeyCode::shifted(0x1e),
        '@' => KeyCode::shifted(0x1f),
        '#' => KeyCode::shifted(0x20),
        '$' => KeyCode::shifted(0x21),
        '%' => KeyCode::shifted(0x22),
        '^' => KeyCode::shifted(0x23),
        '&' => KeyCode::shifted(0x24),
        '*' => KeyCode::shifted(0x25),
        '(' => KeyCode::shifted(0x26),
        ')' => KeyCode::shifted(0x27),
        '\n' => KeyCode::plain(0x28),
        '\x1b' => KeyCode::plain(0x29),
        '\x08' => KeyCode::plain(0x2a),
        '\t' => KeyCode::plain(0x2b),
        ' ' => KeyCode::plain(0x2c),
        '-' => KeyCode::plain(0x2d),
        '_' => KeyCode::shifted(0x2d),
        '=' => KeyCode::plain(0x2e),
        '+' => KeyCode::shifted(0x2e),
        '[' => KeyCode::plain(0x2f),
        '{' => KeyCode::shifted(0x2f),
        ']' => KeyCode::plain(0x30),
        '}' => KeyCode::shifted(0x30),
        '\\' => KeyCode::plain(0x31),
        '|' => KeyCode::shifted(0x31),
        ';' => KeyCode::plain(0x33),
        ':' => KeyCode::shifted(0x33),
        '\'' => KeyCode::plain(0x34),
        '"' => KeyCode::shifted(0x34),
        '`' => KeyCode::plain(0x35),
        '~' => KeyCode::shifted(0x35),
        ',' => KeyCode::plain(0x36),
        '<' => KeyCode::shifted(0x36),
        '.' => KeyCode::plain(0x37),
        '>' => KeyCode::shifted(0x37),
        '/' => KeyCode::plain(0x38),
        '?' => KeyCode::shifted(0x38),
        _ => return None,
    };
    Some(code)
}

/// A usage of the HID consumer page (media keys, volume...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConsumerCode(u16);

impl ConsumerCode {
    pub const NEXT_TRACK: ConsumerCode = ConsumerCode(0xb5);
    pub const PREV_TRACK: ConsumerCode = ConsumerCode(0xb6);
    pub const STOP: ConsumerCode = ConsumerCode(0xb7);
    pub const PLAY_PAUSE: ConsumerCode = ConsumerCode(0xcd);
    pub const MUTE: ConsumerCode = ConsumerCode(0xe2);
    pub const VOLUME_UP: ConsumerCode = ConsumerCode(0xe9);
    pub const VOLUME_DOWN: ConsumerCode = ConsumerCode(0xea);

    pub const fn new(usage: u16) -> Self {
        Self(usage)
    }

    pub const fn usage(self) -> u16 {
        self.0
    }
}

impl From<MediaKey> for ConsumerCode {
    fn from(value: MediaKey) -> Self {
        ConsumerCode(value as u16)
    }
}

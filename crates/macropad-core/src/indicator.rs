use macropad_common::dev_warn;
use macropad_common::util::BoundedIndex;
use smart_leds::{RGB8, SmartLedsWrite};

/// The brightness levels of `N` indicator channels, each of them in
/// `[0, MAX]`.
///
/// A channel only goes to `MAX` when it is activated, and otherwise
/// loses exactly one level on every call to [`IndicatorChannels::decay`]
/// until it reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndicatorChannels<const N: usize, const MAX: u8> {
    levels: [u8; N],
}

impl<const N: usize, const MAX: u8> IndicatorChannels<N, MAX> {
    /// Every channel at `MAX`. Used at power-on, so the indicators
    /// fade out right after boot.
    pub const fn lit() -> Self {
        Self { levels: [MAX; N] }
    }

    pub const fn dark() -> Self {
        Self { levels: [0; N] }
    }

    pub fn activate(&mut self, channel: BoundedIndex<N>) {
        self.levels[channel] = MAX;
    }

    pub fn decay(&mut self) {
        for level in self.levels.iter_mut() {
            *level = level.saturating_sub(1);
        }
    }

    pub fn level(&self, channel: BoundedIndex<N>) -> u8 {
        self.levels[channel]
    }

    pub fn levels(&self) -> &[u8; N] {
        &self.levels
    }

    pub fn is_dark(&self) -> bool {
        self.levels.iter().all(|l| *l == 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelColor {
    Red,
    Green,
    Blue,
    White,
}

impl ChannelColor {
    pub const fn scale(self, level: u8) -> RGB8 {
        match self {
            ChannelColor::Red => RGB8 { r: level, g: 0, b: 0 },
            ChannelColor::Green => RGB8 { r: 0, g: level, b: 0 },
            ChannelColor::Blue => RGB8 { r: 0, g: 0, b: level },
            ChannelColor::White => RGB8 { r: level, g: level, b: level },
        }
    }
}

/// A chain of `N` addressable pixels, one per indicator channel.
///
/// Every frame is written inside a critical section, since the pixels
/// are timing sensitive and the transmission must not be preempted.
pub struct IndicatorStrip<W, const N: usize, const MAX: u8>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    writer: W,
    palette: [ChannelColor; N],
}

impl<W, const N: usize, const MAX: u8> IndicatorStrip<W, N, MAX>
where
    W: SmartLedsWrite<Color = RGB8>,
{
    pub const fn new(writer: W, palette: [ChannelColor; N]) -> Self {
        Self { writer, palette }
    }

    pub fn render(&mut self, channels: &IndicatorChannels<N, MAX>) {
        let levels = channels.levels();
        let frame: [RGB8; N] = core::array::from_fn(|i| self.palette[i].scale(levels[i]));
        self.write(frame);
    }

    /// Renders every pixel white at `MAX`, regardless of the palette.
    pub fn render_full(&mut self) {
        self.write([ChannelColor::White.scale(MAX); N]);
    }

    fn write(&mut self, frame: [RGB8; N]) {
        let writer = &mut self.writer;
        let result = critical_section::with(|_cs| writer.write(frame.iter().copied()));
        if result.is_err() {
            dev_warn!("Unable to write indicator frame");
        }
    }
}

//! Test doubles for the hardware collaborators of the control loop.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use smart_leds::{RGB8, SmartLedsWrite};

use crate::boot::{BootGate, Bootloader, NormalBoot};
use crate::control::Watchdog;
use crate::hid::HidTransport;
use crate::indicator::{ChannelColor, IndicatorStrip};
use crate::input::RawInput;
use crate::keys::{ConsumerCode, Key};

/// A raw input that replays a script of levels, one per read. Once the
/// script is exhausted, the last level is held forever.
pub struct ScriptedInput {
    script: VecDeque<bool>,
    last: bool,
    reads: usize,
}

impl ScriptedInput {
    pub fn new(script: &[bool]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            last: false,
            reads: 0,
        }
    }

    pub fn idle() -> Self {
        Self::new(&[])
    }

    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl RawInput for ScriptedInput {
    fn is_asserted(&mut self) -> bool {
        self.reads += 1;
        if let Some(level) = self.script.pop_front() {
            self.last = level;
        }
        self.last
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HidEvent {
    Press(Key),
    Release(Key),
    PressConsumer(u16),
    ReleaseConsumer(u16),
}

/// A side effect observed by one of the doubles, in the order it
/// happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trace {
    Hid(HidEvent),
    Frame(Vec<RGB8>),
    DelayNs(u32),
}

impl Trace {
    pub const fn delay_ms(ms: u32) -> Self {
        Trace::DelayNs(ms * 1_000_000)
    }
}

/// A record of side effects shared by several doubles, so that their
/// relative order can be checked.
#[derive(Clone, Default)]
pub struct Timeline {
    traces: Rc<RefCell<Vec<Trace>>>,
}

impl Timeline {
    pub fn traces(&self) -> Vec<Trace> {
        self.traces.borrow().clone()
    }

    fn push(&self, trace: Trace) {
        self.traces.borrow_mut().push(trace);
    }
}

/// A HID transport that records every primitive operation. Clones
/// share the same record.
#[derive(Clone, Default)]
pub struct RecordingHid {
    events: Rc<RefCell<Vec<HidEvent>>>,
    timeline: Timeline,
}

impl RecordingHid {
    pub fn with_timeline(timeline: &Timeline) -> Self {
        Self {
            events: Default::default(),
            timeline: timeline.clone(),
        }
    }

    pub fn events(&self) -> Vec<HidEvent> {
        self.events.borrow().clone()
    }

    fn record(&self, event: HidEvent) {
        self.timeline.push(Trace::Hid(event.clone()));
        self.events.borrow_mut().push(event);
    }

    /// Reconstructs the text typed so far from the recorded presses,
    /// ignoring modifiers.
    pub fn typed_text(&self) -> String {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                HidEvent::Press(Key::Char(c)) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

impl HidTransport for RecordingHid {
    fn press(&mut self, key: Key) {
        self.record(HidEvent::Press(key));
    }

    fn release(&mut self, key: Key) {
        self.record(HidEvent::Release(key));
    }

    fn press_consumer(&mut self, code: ConsumerCode) {
        self.record(HidEvent::PressConsumer(code.usage()));
    }

    fn release_consumer(&mut self, code: ConsumerCode) {
        self.record(HidEvent::ReleaseConsumer(code.usage()));
    }
}

/// A delay that returns immediately, accumulating the time it was
/// asked to wait.
#[derive(Clone, Default)]
pub struct CountingDelay {
    nanos: Rc<Cell<u64>>,
    timeline: Timeline,
}

impl CountingDelay {
    pub fn with_timeline(timeline: &Timeline) -> Self {
        Self {
            nanos: Default::default(),
            timeline: timeline.clone(),
        }
    }

    pub fn total_millis(&self) -> u64 {
        self.nanos.get() / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.timeline.push(Trace::DelayNs(ns));
        self.nanos.set(self.nanos.get() + ns as u64);
    }
}

#[derive(Clone, Default)]
pub struct CountingWatchdog {
    started: Rc<Cell<bool>>,
    feeds: Rc<Cell<u32>>,
}

impl CountingWatchdog {
    pub fn started(&self) -> bool {
        self.started.get()
    }

    pub fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}

impl Watchdog for CountingWatchdog {
    fn start(&mut self) {
        self.started.set(true);
    }

    fn feed(&mut self) {
        self.feeds.set(self.feeds.get() + 1);
    }
}

/// A pixel writer that keeps every frame it was asked to transmit.
#[derive(Clone, Default)]
pub struct RecordingPixels {
    frames: Rc<RefCell<Vec<Vec<RGB8>>>>,
    timeline: Timeline,
}

impl RecordingPixels {
    pub fn with_timeline(timeline: &Timeline) -> Self {
        Self {
            frames: Default::default(),
            timeline: timeline.clone(),
        }
    }

    pub fn frames(&self) -> Vec<Vec<RGB8>> {
        self.frames.borrow().clone()
    }

    pub fn last_frame(&self) -> Option<Vec<RGB8>> {
        self.frames.borrow().last().cloned()
    }
}

impl SmartLedsWrite for RecordingPixels {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        let frame: Vec<RGB8> = iterator.into_iter().map(Into::into).collect();
        self.timeline.push(Trace::Frame(frame.clone()));
        self.frames.borrow_mut().push(frame);
        Ok(())
    }
}

struct UnreachableBootloader;

impl Bootloader for UnreachableBootloader {
    fn enter(&mut self) -> ! {
        panic!("unexpected bootloader entry");
    }
}

/// Passes the boot gate with the boot key released.
pub fn normal_boot() -> NormalBoot {
    let mut strip = IndicatorStrip::<_, 1, 1>::new(RecordingPixels::default(), [ChannelColor::White]);
    BootGate::sample(&mut ScriptedInput::idle()).resolve(&mut strip, &mut UnreachableBootloader)
}

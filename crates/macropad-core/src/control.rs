use embedded_hal::delay::DelayNs;
use macropad_common::{Transition, dev_debug, dev_info};
use smart_leds::{RGB8, SmartLedsWrite};

use crate::action::{ActionContext, Binding, Bindings, perform};
use crate::boot::NormalBoot;
use crate::encoder::{DetentWait, RotaryEncoder, Rotation};
use crate::hid::HidTransport;
use crate::indicator::{IndicatorChannels, IndicatorStrip};
use crate::input::{DebouncedInput, RawInput};

/// A liveness guard that resets the device unless it is fed
/// periodically.
pub trait Watchdog {
    fn start(&mut self);
    fn feed(&mut self);
}

/// What happened during a single iteration of the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Iteration<const KEYS: usize> {
    pub keys: [Transition; KEYS],
    pub encoder_switch: Transition,
    pub rotation: Option<Rotation>,
}

/// The fixed-period loop that drives the whole device.
///
/// Every iteration samples and classifies the keys and the encoder
/// switch, in that order, dispatches the bound actions in that same
/// order, resolves any encoder rotation, renders and decays the
/// indicators, sleeps for the loop period and finally feeds the
/// watchdog.
pub struct ControlLoop<
    KeyIn,
    EncA,
    EncB,
    EncSw,
    Wait,
    Hid,
    Delay,
    Wdg,
    Pixels,
    const KEYS: usize,
    const CHANNELS: usize,
    const MAX: u8,
> where
    KeyIn: RawInput,
    EncA: RawInput,
    EncB: RawInput,
    EncSw: RawInput,
    Wait: DetentWait,
    Hid: HidTransport,
    Delay: DelayNs,
    Wdg: Watchdog,
    Pixels: SmartLedsWrite<Color = RGB8>,
{
    keys: [DebouncedInput<KeyIn>; KEYS],
    encoder: RotaryEncoder<EncA, EncB, EncSw, Wait>,
    bindings: &'static Bindings<KEYS, CHANNELS>,
    channels: IndicatorChannels<CHANNELS, MAX>,
    strip: IndicatorStrip<Pixels, CHANNELS, MAX>,
    hid: Hid,
    delay: Delay,
    watchdog: Wdg,
    context: ActionContext,
    period_ms: u32,
}

impl<
    KeyIn,
    EncA,
    EncB,
    EncSw,
    Wait,
    Hid,
    Delay,
    Wdg,
    Pixels,
    const KEYS: usize,
    const CHANNELS: usize,
    const MAX: u8,
> ControlLoop<KeyIn, EncA, EncB, EncSw, Wait, Hid, Delay, Wdg, Pixels, KEYS, CHANNELS, MAX>
where
    KeyIn: RawInput,
    EncA: RawInput,
    EncB: RawInput,
    EncSw: RawInput,
    Wait: DetentWait,
    Hid: HidTransport,
    Delay: DelayNs,
    Wdg: Watchdog,
    Pixels: SmartLedsWrite<Color = RGB8>,
{
    /// Builds the loop and starts the watchdog. From this point on,
    /// [`ControlLoop::step`] must be called often enough to keep it
    /// fed.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        keys: [KeyIn; KEYS],
        encoder: RotaryEncoder<EncA, EncB, EncSw, Wait>,
        bindings: &'static Bindings<KEYS, CHANNELS>,
        strip: IndicatorStrip<Pixels, CHANNELS, MAX>,
        hid: Hid,
        delay: Delay,
        mut watchdog: Wdg,
        period_ms: u32,
        _boot: NormalBoot,
    ) -> Self {
        dev_info!("Starting control loop: {} keys, {} ms period", KEYS, period_ms);
        watchdog.start();

        Self {
            keys: keys.map(DebouncedInput::new),
            encoder,
            bindings,
            channels: IndicatorChannels::lit(),
            strip,
            hid,
            delay,
            watchdog,
            context: ActionContext::new(),
            period_ms,
        }
    }

    pub fn step(&mut self) -> Iteration<KEYS> {
        let inputs = &mut self.keys;
        let keys: [Transition; KEYS] = core::array::from_fn(|i| inputs[i].classify());
        let encoder_switch = self.encoder.classify_switch();

        let bindings = self.bindings;
        for (i, (binding, transition)) in bindings.keys.iter().zip(keys).enumerate() {
            if transition.is_edge() {
                dev_debug!("Key {}: {:?}", i + 1, transition);
            }
            self.dispatch(binding, transition);
        }

        if encoder_switch.is_edge() {
            dev_debug!("Encoder switch: {:?}", encoder_switch);
        }
        self.dispatch(&bindings.encoder_switch, encoder_switch);

        let hid = &mut self.hid;
        let delay = &mut self.delay;
        let context = &mut self.context;
        let rotation = self
            .encoder
            .poll_rotation(|rotation| perform(bindings.rotation(rotation), hid, delay, context));

        self.strip.render(&self.channels);
        self.channels.decay();

        self.delay.delay_ms(self.period_ms);
        self.watchdog.feed();

        Iteration {
            keys,
            encoder_switch,
            rotation,
        }
    }

    fn dispatch(&mut self, binding: &Binding<CHANNELS>, transition: Transition) {
        if let Some(channel) = binding.indicator.activation(transition) {
            self.channels.activate(channel);
            if transition == Transition::PressedEdge {
                self.strip.render(&self.channels);
            }
        }

        perform(binding.actions_for(transition), &mut self.hid, &mut self.delay, &mut self.context);
    }

    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    pub fn hid(&self) -> &Hid {
        &self.hid
    }

    pub fn channels(&self) -> &IndicatorChannels<CHANNELS, MAX> {
        &self.channels
    }

    pub fn context(&self) -> &ActionContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::boxed::Box;
    use std::vec::Vec;

    use macropad_common::Transition;
    use macropad_common::util::BoundedIndex;

    use super::ControlLoop;
    use crate::action::{Action, Axis, Binding, Bindings, IndicatorBinding};
    use crate::encoder::{RotaryEncoder, Rotation, SpinWait};
    use crate::indicator::{ChannelColor, IndicatorStrip};
    use crate::keys::{ConsumerCode, Key};
    use crate::testing::{
        CountingDelay, CountingWatchdog, HidEvent, RecordingHid, RecordingPixels, ScriptedInput, Timeline, Trace,
        normal_boot,
    };

    const MAX: u8 = 127;
    const PERIOD_MS: u32 = 5;
    const PALETTE: [ChannelColor; 3] = [ChannelColor::Red, ChannelColor::Green, ChannelColor::Blue];

    const CH0: BoundedIndex<3> = BoundedIndex::from_const::<0>();
    const CH1: BoundedIndex<3> = BoundedIndex::from_const::<1>();

    const TYPE_BANG: &[Action] = &[Action::Tap(Key::Char('!'))];
    const TYPE_A: &[Action] = &[Action::Tap(Key::Char('a'))];
    const TYPE_B: &[Action] = &[Action::Tap(Key::Char('b'))];
    const TYPE_R: &[Action] = &[Action::Tap(Key::Char('r'))];
    const TYPE_S: &[Action] = &[Action::Tap(Key::Char('s'))];
    const VOLUME_UP: &[Action] = &[Action::TapConsumer(ConsumerCode::VOLUME_UP)];
    const VOLUME_DOWN: &[Action] = &[Action::TapConsumer(ConsumerCode::VOLUME_DOWN)];

    type TestLoop = ControlLoop<
        ScriptedInput,
        ScriptedInput,
        ScriptedInput,
        ScriptedInput,
        SpinWait,
        RecordingHid,
        CountingDelay,
        CountingWatchdog,
        RecordingPixels,
        3,
        3,
        MAX,
    >;

    struct Harness {
        control: TestLoop,
        hid: RecordingHid,
        delay: CountingDelay,
        watchdog: CountingWatchdog,
        pixels: RecordingPixels,
    }

    struct Scripts<'a> {
        keys: [&'a [bool]; 3],
        switch: &'a [bool],
        phase_a: &'a [bool],
        phase_b: &'a [bool],
    }

    impl Default for Scripts<'_> {
        fn default() -> Self {
            Self {
                keys: [&[], &[], &[]],
                switch: &[],
                phase_a: &[],
                phase_b: &[],
            }
        }
    }

    fn bindings(keys: [Binding<3>; 3]) -> Bindings<3, 3> {
        Bindings {
            keys,
            encoder_switch: Binding::NONE,
            rotate_cw: &[],
            rotate_ccw: &[],
        }
    }

    fn harness(bindings: Bindings<3, 3>, scripts: Scripts<'_>) -> Harness {
        harness_with(bindings, scripts, &Timeline::default())
    }

    /// Builds a loop whose HID, delay and pixel doubles all report to
    /// `timeline`.
    fn harness_with(bindings: Bindings<3, 3>, scripts: Scripts<'_>, timeline: &Timeline) -> Harness {
        let hid = RecordingHid::with_timeline(timeline);
        let delay = CountingDelay::with_timeline(timeline);
        let watchdog = CountingWatchdog::default();
        let pixels = RecordingPixels::with_timeline(timeline);

        let control = ControlLoop::start(
            scripts.keys.map(ScriptedInput::new),
            RotaryEncoder::new(
                ScriptedInput::new(scripts.phase_a),
                ScriptedInput::new(scripts.phase_b),
                ScriptedInput::new(scripts.switch),
            ),
            Box::leak(Box::new(bindings)),
            IndicatorStrip::new(pixels.clone(), PALETTE),
            hid.clone(),
            delay.clone(),
            watchdog.clone(),
            PERIOD_MS,
            normal_boot(),
        );

        Harness {
            control,
            hid,
            delay,
            watchdog,
            pixels,
        }
    }

    #[test]
    fn test_single_press_scenario() {
        let keys = [
            Binding::new().on_press(TYPE_BANG).indicator(IndicatorBinding::FlashOnPress(CH0)),
            Binding::NONE,
            Binding::NONE,
        ];
        // Let the power-on fade finish before pressing, so the levels
        // below can only come from the press.
        let idle = MAX as usize + 20;
        let mut script = std::vec![false; idle];
        script.extend([true, true, false]);
        let mut h = harness(
            bindings(keys),
            Scripts {
                keys: [&script, &[], &[]],
                ..Default::default()
            },
        );

        for _ in 0..idle {
            h.control.step();
        }
        assert!(h.control.channels().is_dark());
        assert_eq!(h.pixels.last_frame().unwrap()[0].r, 0);
        assert!(h.hid.events().is_empty());

        let mut levels = Vec::new();
        for _ in 0..3 {
            h.control.step();
            levels.push(h.pixels.last_frame().unwrap()[0].r);
        }

        assert_eq!(levels, [MAX, MAX - 1, MAX - 2]);
        assert_eq!(
            h.hid.events(),
            [HidEvent::Press(Key::Char('!')), HidEvent::Release(Key::Char('!'))]
        );
    }

    #[test]
    fn test_action_fires_at_first_iteration() {
        let keys = [Binding::new().on_press(TYPE_BANG), Binding::NONE, Binding::NONE];
        let mut h = harness(
            bindings(keys),
            Scripts {
                keys: [&[true, true, false], &[], &[]],
                ..Default::default()
            },
        );

        let iteration = h.control.step();
        assert_eq!(iteration.keys[0], Transition::PressedEdge);
        assert_eq!(h.hid.typed_text(), "!");

        h.control.step();
        h.control.step();
        assert_eq!(h.hid.typed_text(), "!");
    }

    #[test]
    fn test_press_and_release_fire_exactly_once() {
        for held in 1..12 {
            let mut script = std::vec![true; held];
            script.extend([false; 4]);

            let keys = [Binding::new().on_press(TYPE_A).on_release(TYPE_B), Binding::NONE, Binding::NONE];
            let mut h = harness(
                bindings(keys),
                Scripts {
                    keys: [&script, &[], &[]],
                    ..Default::default()
                },
            );

            for _ in 0..script.len() {
                h.control.step();
            }
            assert_eq!(h.hid.typed_text(), "ab", "held for {} iterations", held);
        }
    }

    #[test]
    fn test_dispatch_order_follows_key_order() {
        let keys = [Binding::new().on_press(TYPE_A), Binding::new().on_press(TYPE_B), Binding::new().on_press(TYPE_S)];
        let mut h = harness(
            bindings(keys),
            Scripts {
                // Key 3 and key 2 change together, then key 1.
                keys: [&[false, true], &[true], &[true]],
                ..Default::default()
            },
        );

        h.control.step();
        h.control.step();
        assert_eq!(h.hid.typed_text(), "bsa");

        let keys = [Binding::new().on_press(TYPE_A), Binding::new().on_press(TYPE_B), Binding::NONE];
        let mut h = harness(
            bindings(keys),
            Scripts {
                keys: [&[true], &[true], &[]],
                ..Default::default()
            },
        );
        h.control.step();
        assert_eq!(h.hid.typed_text(), "ab");
    }

    #[test]
    fn test_hold_fires_every_iteration_and_rearms_indicator() {
        const HOLD: &[Action] = &[Action::Tap(Key::Char('h'))];
        let keys = [
            Binding::NONE,
            Binding::new().on_hold(HOLD).indicator(IndicatorBinding::LitWhileHeld(CH1)),
            Binding::NONE,
        ];
        let mut h = harness(
            bindings(keys),
            Scripts {
                keys: [&[], &[true, true, true, true, false], &[]],
                ..Default::default()
            },
        );

        let mut levels = Vec::new();
        for _ in 0..6 {
            h.control.step();
            levels.push(h.pixels.last_frame().unwrap()[1].g);
        }

        assert_eq!(h.hid.typed_text(), "hhh");
        assert_eq!(levels, [MAX, MAX, MAX, MAX, MAX - 1, MAX - 2]);
    }

    #[test]
    fn test_pressed_edge_renders_immediately() {
        let keys = [
            Binding::new().indicator(IndicatorBinding::FlashOnPress(CH0)),
            Binding::new().on_press(TYPE_B),
            Binding::NONE,
        ];
        let mut h = harness(
            bindings(keys),
            Scripts {
                keys: [&[true], &[true], &[]],
                ..Default::default()
            },
        );

        h.control.step();
        // One frame right after the edge of key 1, one at the end of
        // the iteration. Key 2 has no indicator.
        assert_eq!(h.pixels.frames().len(), 2);
    }

    #[test]
    fn test_pressed_edge_frame_precedes_bound_actions() {
        const SLOW: &[Action] = &[Action::Delay(500), Action::Tap(Key::Char('t'))];
        let keys = [
            Binding::new().on_press(SLOW).indicator(IndicatorBinding::FlashOnPress(CH0)),
            Binding::NONE,
            Binding::NONE,
        ];
        let timeline = Timeline::default();
        let mut h = harness_with(
            bindings(keys),
            Scripts {
                keys: [&[false, false, true], &[], &[]],
                ..Default::default()
            },
            &timeline,
        );

        h.control.step();
        h.control.step();
        let before = timeline.traces().len();
        h.control.step();

        let traces = timeline.traces().split_off(before);
        assert_eq!(traces.len(), 6, "{:?}", traces);
        match &traces[0] {
            Trace::Frame(frame) => assert_eq!(frame[0].r, MAX),
            other => panic!("expected a frame first, got {:?}", other),
        }
        assert_eq!(
            traces[1..4],
            [
                Trace::delay_ms(500),
                Trace::Hid(HidEvent::Press(Key::Char('t'))),
                Trace::Hid(HidEvent::Release(Key::Char('t'))),
            ]
        );
        assert!(matches!(traces[4], Trace::Frame(_)));
        assert_eq!(traces[5], Trace::delay_ms(PERIOD_MS));
    }

    #[test]
    fn test_power_on_fade() {
        let mut h = harness(bindings([Binding::NONE; 3]), Scripts::default());
        h.control.step();
        assert_eq!(h.pixels.last_frame().unwrap()[2].b, MAX);
        h.control.step();
        assert_eq!(h.pixels.last_frame().unwrap()[2].b, MAX - 1);

        for _ in 0..MAX {
            h.control.step();
        }
        assert!(h.control.channels().is_dark());
    }

    #[test]
    fn test_encoder_switch_dispatched_after_keys() {
        let mut table = bindings([Binding::new().on_press(TYPE_A), Binding::NONE, Binding::NONE]);
        table.encoder_switch = Binding::new().on_press(TYPE_S);
        let mut h = harness(
            table,
            Scripts {
                keys: [&[true], &[], &[]],
                switch: &[true],
                ..Default::default()
            },
        );

        let iteration = h.control.step();
        assert_eq!(iteration.encoder_switch, Transition::PressedEdge);
        assert_eq!(h.hid.typed_text(), "as");
    }

    #[test]
    fn test_rotation_fires_once_per_detent() {
        let mut table = bindings([Binding::new().on_press(TYPE_R), Binding::NONE, Binding::NONE]);
        table.rotate_cw = VOLUME_UP;
        table.rotate_ccw = VOLUME_DOWN;
        let mut h = harness(
            table,
            Scripts {
                keys: [&[true], &[], &[]],
                phase_a: &[true, true, true, false, false, true, false],
                phase_b: &[false, true],
                ..Default::default()
            },
        );

        let rotations: Vec<_> = (0..4).map(|_| h.control.step().rotation).collect();
        assert_eq!(rotations, [Some(Rotation::Clockwise), None, Some(Rotation::CounterClockwise), None]);
        assert_eq!(
            h.hid.events(),
            [
                HidEvent::Press(Key::Char('r')),
                HidEvent::Release(Key::Char('r')),
                HidEvent::PressConsumer(0xe9),
                HidEvent::ReleaseConsumer(0xe9),
                HidEvent::PressConsumer(0xea),
                HidEvent::ReleaseConsumer(0xea),
            ]
        );
    }

    #[test]
    fn test_cycle_axis_state_owned_by_loop() {
        const CYCLE: &[Action] = &[Action::CycleAxis(&[])];
        let mut table = bindings([Binding::NONE; 3]);
        table.encoder_switch = Binding::new().on_press(CYCLE);
        let mut h = harness(
            table,
            Scripts {
                switch: &[true, false, true, false, true, false, true],
                ..Default::default()
            },
        );

        for _ in 0..7 {
            h.control.step();
        }
        assert_eq!(h.hid.typed_text(), "yzxy");
        assert_eq!(h.control.context().axis(), Axis::Y);
    }

    #[test]
    fn test_watchdog_started_and_fed_every_iteration() {
        let mut h = harness(bindings([Binding::NONE; 3]), Scripts::default());
        assert!(h.watchdog.started());
        assert_eq!(h.watchdog.feeds(), 0);

        for _ in 0..10 {
            h.control.step();
        }
        assert_eq!(h.watchdog.feeds(), 10);
    }

    #[test]
    fn test_loop_paced_by_period_and_action_delays() {
        const SLOW: &[Action] = &[Action::Delay(500), Action::Tap(Key::Char('t'))];
        let keys = [Binding::new().on_press(SLOW), Binding::NONE, Binding::NONE];
        let mut h = harness(
            bindings(keys),
            Scripts {
                keys: [&[true], &[], &[]],
                ..Default::default()
            },
        );

        for _ in 0..4 {
            h.control.step();
        }
        assert_eq!(h.delay.total_millis(), 500 + 4 * PERIOD_MS as u64);
        assert_eq!(h.hid.typed_text(), "t");
    }

    #[test]
    fn test_steady_released_has_no_side_effects() {
        let keys = [Binding::new().on_release(TYPE_B), Binding::NONE, Binding::NONE];
        let mut h = harness(bindings(keys), Scripts::default());

        let iteration = h.control.step();
        assert_eq!(iteration.keys, [Transition::SteadyReleased; 3]);
        assert!(h.hid.events().is_empty());
        assert!(h.control.hid().events().is_empty());
    }
}

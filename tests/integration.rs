// End-to-end: raw bytes through framing, dispatch, and motion ticks

use std::time::Duration;

use navscope::config::{AxesConfig, AxisConfig, MotionSection};
use navscope::motion::{AxisId, LimitBreach, MotionController, StepCommand};
use navscope::protocol::{Dispatcher, Framing, Tokenizer};

const DT: Duration = Duration::from_millis(1);

/// The host wiring without hardware: one tokenizer per command link, a
/// dispatcher, the motion controller, and a hand-stepped clock.
struct Rig {
    turret_rx: Tokenizer,
    focus_rx: Tokenizer,
    dispatcher: Dispatcher,
    motion: MotionController,
    now: Duration,
    steps: Vec<StepCommand>,
    breaches: Vec<LimitBreach>,
}

impl Rig {
    fn new() -> Self {
        let axes = AxesConfig {
            azimuth: AxisConfig {
                max_speed: 200.0,
                max_accel: 400.0,
                limit_down: None,
                limit_up: None,
            },
            tilt: AxisConfig {
                max_speed: 200.0,
                max_accel: 400.0,
                limit_down: Some(-100),
                limit_up: Some(100),
            },
            focus: AxisConfig {
                max_speed: 100.0,
                max_accel: 400.0,
                limit_down: None,
                limit_up: None,
            },
        };
        let mut motion = MotionController::new(&axes).unwrap();
        motion.tick(Duration::ZERO); // arm the profilers
        Self {
            turret_rx: Tokenizer::new(Framing::Lx200),
            focus_rx: Tokenizer::new(Framing::FocusSign),
            dispatcher: Dispatcher::new(&MotionSection {
                slew_distance: 10_000,
                focus_increment: 50,
            }),
            motion,
            now: Duration::ZERO,
            steps: Vec::new(),
            breaches: Vec::new(),
        }
    }

    fn turret_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(token) = self.turret_rx.feed(byte) {
                self.dispatcher.dispatch(&token, &mut self.motion);
            }
        }
    }

    fn focus_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(token) = self.focus_rx.feed(byte) {
                self.dispatcher.dispatch(&token, &mut self.motion);
            }
        }
    }

    fn tick(&mut self) {
        self.now += DT;
        let outcome = self.motion.tick(self.now);
        self.steps.extend(outcome.steps);
        self.breaches.extend(outcome.breaches);
    }

    fn run_to_rest(&mut self, max_ticks: usize) {
        for _ in 0..max_ticks {
            self.tick();
            if self.motion.all_at_rest() {
                return;
            }
        }
        panic!("mount did not come to rest");
    }

    fn steps_for(&self, axis: AxisId) -> usize {
        self.steps.iter().filter(|s| s.axis == axis).count()
    }
}

#[test]
fn focus_command_moves_exactly_one_increment() {
    let mut rig = Rig::new();
    rig.focus_bytes(b"F+");
    rig.run_to_rest(10_000);

    assert_eq!(rig.motion.axis(AxisId::Focus).position(), 50);
    assert_eq!(rig.steps_for(AxisId::Focus), 50);
    assert_eq!(rig.steps_for(AxisId::Azimuth), 0);
    assert!(rig.breaches.is_empty());
}

#[test]
fn slew_then_stop_comes_to_controlled_rest() {
    let mut rig = Rig::new();
    rig.turret_bytes(b":Me#");

    // Let the azimuth reach cruise, then stop, split across two reads to
    // mimic arbitrary delivery granularity.
    for _ in 0..1_000 {
        rig.tick();
    }
    assert!(rig.motion.axis(AxisId::Azimuth).velocity() > 0.0);
    rig.turret_bytes(b":Q");
    rig.tick();
    rig.turret_bytes(b"#");

    rig.run_to_rest(10_000);
    let azimuth = rig.motion.axis(AxisId::Azimuth);
    assert_eq!(azimuth.position(), azimuth.target());
    assert!(azimuth.position() > 0);
    assert!(rig.breaches.is_empty());

    // Nothing moves afterwards.
    let settled = azimuth.position();
    for _ in 0..200 {
        rig.tick();
    }
    assert_eq!(rig.motion.axis(AxisId::Azimuth).position(), settled);
}

#[test]
fn tilt_slew_breaches_once_and_parks_near_the_limit() {
    let mut rig = Rig::new();
    rig.turret_bytes(b":Mn#");
    rig.run_to_rest(30_000);

    assert_eq!(rig.breaches.len(), 1);
    assert_eq!(rig.breaches[0].axis, AxisId::Tilt);

    let tilt = rig.motion.axis(AxisId::Tilt);
    assert!(tilt.position() > 100);
    assert!(tilt.position() <= 160);

    // Tilting up again from past the bound is refused outright.
    let parked = tilt.position();
    rig.turret_bytes(b":Mn#");
    rig.run_to_rest(1_000);
    assert_eq!(rig.motion.axis(AxisId::Tilt).position(), parked);
    assert_eq!(rig.breaches.len(), 1);

    // Tilting back down is accepted immediately.
    rig.turret_bytes(b":Ms#");
    rig.run_to_rest(30_000);
    let tilt = rig.motion.axis(AxisId::Tilt);
    assert!(tilt.position() < parked);
    // It runs to the lower bound and breaches there, once.
    assert_eq!(rig.breaches.len(), 2);
    assert!(tilt.position() >= -160);
}

#[test]
fn interleaved_links_stay_independent() {
    let mut rig = Rig::new();
    rig.turret_bytes(b":Me");
    rig.focus_bytes(b"F");
    rig.turret_bytes(b"#");
    rig.focus_bytes(b"+");

    for _ in 0..500 {
        rig.tick();
    }
    assert!(rig.motion.axis(AxisId::Azimuth).velocity() > 0.0);
    assert!(rig.steps_for(AxisId::Focus) > 0);

    rig.turret_bytes(b":Q#");
    rig.run_to_rest(10_000);
    assert_eq!(rig.motion.axis(AxisId::Focus).position(), 50);
    assert!(rig.motion.axis(AxisId::Azimuth).position() > 0);
}

#[test]
fn line_noise_between_commands_is_harmless() {
    let mut rig = Rig::new();
    rig.turret_bytes(b"\x00\xfface:Qx#\x07:Me#");

    for _ in 0..1_000 {
        rig.tick();
    }
    // ":Qx#" matches nothing; ":Me#" slews azimuth.
    assert!(rig.motion.axis(AxisId::Azimuth).position() > 0);
}

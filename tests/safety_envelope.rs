// Soft-limit envelope behavior: forced deceleration, one event per
// breach, and recovery toward the permitted direction

use std::time::Duration;

use navscope::motion::{
    Axis, AxisId, AxisLimits, LimitBreach, LimitSide, MotionProfiler, SafetyEnvelope,
};

const DT: Duration = Duration::from_millis(1);

fn tilt_axis() -> Axis {
    Axis::new(
        AxisId::Tilt,
        200.0,
        400.0,
        AxisLimits {
            lower: Some(-100),
            upper: Some(100),
        },
    )
    .unwrap()
}

struct Sim {
    profiler: MotionProfiler,
    envelope: SafetyEnvelope,
    now: Duration,
}

impl Sim {
    fn new(axis: &mut Axis) -> Self {
        let mut profiler = MotionProfiler::new();
        let now = Duration::ZERO;
        profiler.advance(axis, now);
        Self {
            profiler,
            envelope: SafetyEnvelope::new(),
            now,
        }
    }

    /// One control tick: advance, then check.
    fn tick(&mut self, axis: &mut Axis) -> Option<LimitBreach> {
        self.now += DT;
        self.profiler.advance(axis, self.now);
        self.envelope.check(axis)
    }

    fn run_to_rest(&mut self, axis: &mut Axis, max_ticks: usize) -> Vec<LimitBreach> {
        let mut breaches = Vec::new();
        for _ in 0..max_ticks {
            if let Some(breach) = self.tick(axis) {
                breaches.push(breach);
            }
            if axis.is_at_rest() {
                return breaches;
            }
        }
        panic!("axis did not come to rest (position {})", axis.position());
    }
}

#[test]
fn outward_breach_forces_controlled_stop_with_single_event() {
    let mut axis = tilt_axis();
    let mut sim = Sim::new(&mut axis);
    axis.move_to(10_000);

    let breaches = sim.run_to_rest(&mut axis, 30_000);

    assert_eq!(breaches.len(), 1, "breach must be reported exactly once");
    assert_eq!(breaches[0].axis, AxisId::Tilt);
    assert_eq!(breaches[0].side, LimitSide::Upper);
    assert_eq!(breaches[0].limit, 100);

    assert_eq!(axis.velocity(), 0.0);
    // Past the bound by no more than the one-tick detection lag plus the
    // braking distance from cruise speed.
    assert!(axis.position() > 100);
    assert!(
        axis.position() <= 100 + 60,
        "overshoot too large: {}",
        axis.position()
    );
}

#[test]
fn lower_breach_is_symmetric() {
    let mut axis = tilt_axis();
    let mut sim = Sim::new(&mut axis);
    axis.move_to(-10_000);

    let breaches = sim.run_to_rest(&mut axis, 30_000);
    assert_eq!(breaches.len(), 1);
    assert_eq!(breaches[0].side, LimitSide::Lower);
    assert!(axis.position() < -100);
    assert!(axis.position() >= -100 - 60);
}

#[test]
fn unlimited_axis_never_breaches() {
    let mut axis = Axis::new(AxisId::Azimuth, 200.0, 400.0, AxisLimits::default()).unwrap();
    let mut sim = Sim::new(&mut axis);
    axis.move_to(500);

    let breaches = sim.run_to_rest(&mut axis, 30_000);
    assert!(breaches.is_empty());
    assert_eq!(axis.position(), 500);
}

#[test]
fn inward_motion_after_breach_is_clean() {
    let mut axis = tilt_axis();
    let mut sim = Sim::new(&mut axis);
    axis.move_to(10_000);
    let breaches = sim.run_to_rest(&mut axis, 30_000);
    assert_eq!(breaches.len(), 1);

    // Command motion back toward the envelope; no further events.
    axis.move_to(50);
    let breaches = sim.run_to_rest(&mut axis, 30_000);
    assert!(breaches.is_empty());
    assert_eq!(axis.position(), 50);
}

#[test]
fn latch_rearms_for_a_new_breach() {
    let mut axis = tilt_axis();
    let mut sim = Sim::new(&mut axis);
    axis.move_to(10_000);
    assert_eq!(sim.run_to_rest(&mut axis, 30_000).len(), 1);

    let parked = axis.position();

    // Still past the bound; a fresh outward command is a new breach and
    // is caught again, one event, barely any extra travel.
    axis.move_relative(100);
    let breaches = sim.run_to_rest(&mut axis, 30_000);
    assert_eq!(breaches.len(), 1);
    assert_eq!(breaches[0].side, LimitSide::Upper);
    assert!(axis.position() <= parked + 3);
}

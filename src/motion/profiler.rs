//! Acceleration-limited step timing.
//!
//! Converts the gap between an axis position and its target into a
//! trapezoidal velocity profile: linear acceleration, constant cruise,
//! linear deceleration, converging exactly on the target. The braking
//! constraint `v^2 = 2 * a * d` gives the permitted speed at distance `d`
//! from the target; velocity slews toward that bound at the configured
//! acceleration and steps are released whenever enough wall-clock time has
//! accumulated for one step at the instantaneous speed.

use std::time::Duration;

use super::{Axis, StepDirection};

/// Longest time slice a single tick may integrate, in seconds. A stalled
/// host catches up as one bounded slice instead of one huge velocity jump.
pub const MAX_TICK_DT: f64 = 0.05;

/// Per-axis step timing state. Call [`MotionProfiler::advance`] once per
/// control-loop tick; each call emits at most one step pulse.
#[derive(Debug, Default)]
pub struct MotionProfiler {
    last_tick: Option<Duration>,
    step_accum: f64,
}

impl MotionProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the axis by one tick of wall-clock time.
    ///
    /// The first call only arms the internal clock. While the axis is at
    /// rest this is a no-op until a new target is assigned.
    pub fn advance(&mut self, axis: &mut Axis, now: Duration) -> Option<StepDirection> {
        let dt = match self.last_tick.replace(now) {
            None => return None,
            Some(prev) => now
                .checked_sub(prev)
                .unwrap_or_default()
                .as_secs_f64()
                .min(MAX_TICK_DT),
        };

        if axis.is_at_rest() {
            self.step_accum = 0.0;
            return None;
        }
        if dt <= 0.0 {
            return None;
        }

        // A mid-motion retarget takes effect here: a target the motion
        // has already passed (or sits on) is replaced by the stop point.
        axis.clamp_target_to_stop_point();

        let to_go = axis.distance_to_go();
        let braking_bound = (2.0 * axis.acceleration() * to_go.unsigned_abs() as f64).sqrt();
        let desired = braking_bound.min(axis.max_speed()) * to_go.signum() as f64;

        let dv = axis.acceleration() * dt;
        let previous = axis.velocity();
        let velocity = if previous < desired {
            (previous + dv).min(desired)
        } else {
            (previous - dv).max(desired)
        };
        axis.set_velocity(velocity);

        if previous != 0.0 && velocity != 0.0 && previous.signum() != velocity.signum() {
            // Direction reversal discards any partial step.
            self.step_accum = 0.0;
        }

        self.step_accum += velocity.abs() * dt;
        if self.step_accum < 1.0 || velocity == 0.0 {
            return None;
        }
        // Carry at most one step of backlog so a stall cannot burst.
        self.step_accum = (self.step_accum - 1.0).min(1.0);

        let direction = if velocity > 0.0 {
            StepDirection::Forward
        } else {
            StepDirection::Backward
        };
        axis.apply_step(direction);

        if axis.distance_to_go() == 0 && axis.stopping_distance() <= 2 {
            // End of the ramp; the residual sub-step velocity is dropped.
            // Landing hot instead (target retargeted inside the braking
            // distance) leaves velocity alone, and the next tick clamps
            // the target out to the reachable stop point.
            axis.set_velocity(0.0);
            self.step_accum = 0.0;
        }

        Some(direction)
    }
}

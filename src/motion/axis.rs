use super::{AxisId, MotionError, StepDirection};

/// Soft travel bounds for one axis, in steps.
///
/// `None` on a side means unbounded travel in that direction; the azimuth
/// axis rotates continuously and carries no bounds at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisLimits {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

/// State of one stepper axis.
///
/// `position` is only ever advanced by the profiler, one step at a time;
/// `target` is written by the command dispatcher, the safety envelope, or
/// the profiler's reachable-target clamp. Speed and acceleration are fixed
/// at construction.
#[derive(Debug, Clone)]
pub struct Axis {
    id: AxisId,
    position: i64,
    target: i64,
    velocity: f64,
    max_speed: f64,
    acceleration: f64,
    limits: AxisLimits,
}

impl Axis {
    pub fn new(
        id: AxisId,
        max_speed: f64,
        acceleration: f64,
        limits: AxisLimits,
    ) -> Result<Self, MotionError> {
        if !max_speed.is_finite() || max_speed <= 0.0 {
            return Err(MotionError::InvalidParameters {
                axis: id,
                reason: format!("max speed must be positive, got {max_speed}"),
            });
        }
        if !acceleration.is_finite() || acceleration <= 0.0 {
            return Err(MotionError::InvalidParameters {
                axis: id,
                reason: format!("acceleration must be positive, got {acceleration}"),
            });
        }
        if let (Some(lower), Some(upper)) = (limits.lower, limits.upper) {
            if lower >= upper {
                return Err(MotionError::InvalidParameters {
                    axis: id,
                    reason: format!("lower limit {lower} is not below upper limit {upper}"),
                });
            }
        }
        Ok(Self {
            id,
            position: 0,
            target: 0,
            velocity: 0.0,
            max_speed,
            acceleration,
            limits,
        })
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    /// Signed speed in steps per second.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn limits(&self) -> AxisLimits {
        self.limits
    }

    pub fn distance_to_go(&self) -> i64 {
        self.target - self.position
    }

    pub fn is_at_rest(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }

    /// Steps needed to brake from the current velocity to zero.
    pub fn stopping_distance(&self) -> i64 {
        // Nudge below the ceil so a velocity sitting exactly on the
        // v^2 = 2ad braking curve does not round up an extra step.
        let steps = (self.velocity * self.velocity) / (2.0 * self.acceleration);
        (steps - 1e-9).ceil() as i64
    }

    /// The nearest position at which the axis can come to rest.
    pub fn stop_point(&self) -> i64 {
        if self.velocity > 0.0 {
            self.position.saturating_add(self.stopping_distance())
        } else if self.velocity < 0.0 {
            self.position.saturating_sub(self.stopping_distance())
        } else {
            self.position
        }
    }

    /// Redefine the current location, e.g. after manually positioning the
    /// mount. The axis is left at rest there; steppers are open loop, so
    /// this is the only way position and reality get re-synced.
    pub fn set_current_position(&mut self, position: i64) {
        self.position = position;
        self.target = position;
        self.velocity = 0.0;
    }

    /// Retarget to an absolute position.
    pub fn move_to(&mut self, target: i64) {
        self.target = target;
    }

    /// Retarget relative to the current position.
    pub fn move_relative(&mut self, delta: i64) {
        self.target = self.position.saturating_add(delta);
    }

    /// Controlled stop: decelerate to zero as soon as physically possible,
    /// never instantaneously.
    pub fn request_stop(&mut self) {
        self.target = self.stop_point();
    }

    /// True when a move toward the upper bound may start.
    pub fn clear_of_upper(&self) -> bool {
        self.limits.upper.is_none_or(|limit| self.position < limit)
    }

    /// True when a move toward the lower bound may start.
    pub fn clear_of_lower(&self) -> bool {
        self.limits.lower.is_none_or(|limit| self.position > limit)
    }

    /// When motion is carrying the axis away from (or has just met) its
    /// target, replace the target with the stop point. Convergence stays
    /// monotonic: the axis brakes to the earliest reachable rest position
    /// instead of flying past and re-approaching.
    pub(crate) fn clamp_target_to_stop_point(&mut self) {
        let to_go = self.target - self.position;
        let receding = if self.velocity > 0.0 {
            to_go <= 0
        } else if self.velocity < 0.0 {
            to_go >= 0
        } else {
            false
        };
        if receding {
            self.target = self.stop_point();
        }
    }

    pub(crate) fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    pub(crate) fn apply_step(&mut self, direction: StepDirection) {
        self.position = match direction {
            StepDirection::Forward => self.position.saturating_add(1),
            StepDirection::Backward => self.position.saturating_sub(1),
        };
    }
}

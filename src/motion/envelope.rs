//! Soft-limit watchdog.
//!
//! Runs after every profiler tick and reacts when an axis has crossed a
//! configured travel bound while still moving outward: the axis gets a
//! controlled-stop request and a single breach event is reported. The
//! envelope reacts one tick late by nature; the invariant is that travel
//! is back inside the bound within one deceleration trajectory and no
//! further outward motion happens once a bound is reached.

use std::fmt;

use super::{Axis, AxisId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitSide {
    Lower,
    Upper,
}

/// A soft-limit crossing, reported once per breach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitBreach {
    pub axis: AxisId,
    pub side: LimitSide,
    pub position: i64,
    pub limit: i64,
}

impl fmt::Display for LimitBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            LimitSide::Lower => "lower",
            LimitSide::Upper => "upper",
        };
        write!(
            f,
            "Error: {} {} travel limit reached at {} (limit {})",
            self.axis, side, self.position, self.limit
        )
    }
}

/// Per-axis limit monitor with an edge latch so a breach is reported
/// exactly once, not on every tick of the deceleration that follows.
#[derive(Debug, Default)]
pub struct SafetyEnvelope {
    breached: Option<LimitSide>,
}

impl SafetyEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the axis after a profiler tick and force a controlled stop
    /// if it is outside a bound and still moving outward.
    pub fn check(&mut self, axis: &mut Axis) -> Option<LimitBreach> {
        let limits = axis.limits();

        if let Some(upper) = limits.upper {
            if axis.position() > upper && axis.velocity() > 0.0 {
                // Pull the target in only when it still lies beyond the
                // stop point; re-issuing the stop every tick would chase
                // the moving stop point outward.
                if axis.target() > axis.stop_point() {
                    axis.request_stop();
                }
                return self.latch(axis, LimitSide::Upper, upper);
            }
        }
        if let Some(lower) = limits.lower {
            if axis.position() < lower && axis.velocity() < 0.0 {
                if axis.target() < axis.stop_point() {
                    axis.request_stop();
                }
                return self.latch(axis, LimitSide::Lower, lower);
            }
        }

        // Back inside the envelope, or no longer moving outward.
        self.breached = None;
        None
    }

    fn latch(&mut self, axis: &Axis, side: LimitSide, limit: i64) -> Option<LimitBreach> {
        if self.breached == Some(side) {
            return None;
        }
        self.breached = Some(side);
        Some(LimitBreach {
            axis: axis.id(),
            side,
            position: axis.position(),
            limit,
        })
    }
}

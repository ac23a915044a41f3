//! Bundles the mount's axes with their profilers and envelopes and ticks
//! them as one unit. Axes are fully independent; there is no cross-axis
//! coordination.

use std::time::Duration;

use crate::config::AxesConfig;

use super::{
    Axis, AxisId, AxisLimits, LimitBreach, MotionError, MotionProfiler, SafetyEnvelope,
    StepCommand, StepDirection,
};

struct AxisChannel {
    axis: Axis,
    profiler: MotionProfiler,
    envelope: SafetyEnvelope,
}

impl AxisChannel {
    fn new(axis: Axis) -> Self {
        Self {
            axis,
            profiler: MotionProfiler::new(),
            envelope: SafetyEnvelope::new(),
        }
    }

    fn tick(&mut self, now: Duration) -> (Option<StepDirection>, Option<LimitBreach>) {
        let pulse = self.profiler.advance(&mut self.axis, now);
        let breach = self.envelope.check(&mut self.axis);
        (pulse, breach)
    }
}

/// Everything produced by one control-loop tick across all axes.
#[derive(Debug, Default)]
pub struct TickOutcome {
    pub steps: Vec<StepCommand>,
    pub breaches: Vec<LimitBreach>,
}

pub struct MotionController {
    channels: [AxisChannel; 3],
}

impl MotionController {
    pub fn new(axes: &AxesConfig) -> Result<Self, MotionError> {
        let azimuth = Axis::new(
            AxisId::Azimuth,
            axes.azimuth.max_speed,
            axes.azimuth.max_accel,
            AxisLimits {
                lower: axes.azimuth.limit_down,
                upper: axes.azimuth.limit_up,
            },
        )?;
        let tilt = Axis::new(
            AxisId::Tilt,
            axes.tilt.max_speed,
            axes.tilt.max_accel,
            AxisLimits {
                lower: axes.tilt.limit_down,
                upper: axes.tilt.limit_up,
            },
        )?;
        let focus = Axis::new(
            AxisId::Focus,
            axes.focus.max_speed,
            axes.focus.max_accel,
            AxisLimits {
                lower: axes.focus.limit_down,
                upper: axes.focus.limit_up,
            },
        )?;
        Ok(Self {
            channels: [
                AxisChannel::new(azimuth),
                AxisChannel::new(tilt),
                AxisChannel::new(focus),
            ],
        })
    }

    pub fn axis(&self, id: AxisId) -> &Axis {
        &self.channels[id.index()].axis
    }

    pub fn axis_mut(&mut self, id: AxisId) -> &mut Axis {
        &mut self.channels[id.index()].axis
    }

    /// Advance every axis one step tick and run its limit check.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        for id in AxisId::ALL {
            let channel = &mut self.channels[id.index()];
            let (pulse, breach) = channel.tick(now);
            if let Some(direction) = pulse {
                outcome.steps.push(StepCommand {
                    axis: id,
                    direction,
                });
            }
            if let Some(breach) = breach {
                outcome.breaches.push(breach);
            }
        }
        outcome
    }

    /// Controlled stop of the turret pair (azimuth and tilt).
    pub fn stop_turret(&mut self) {
        self.axis_mut(AxisId::Azimuth).request_stop();
        self.axis_mut(AxisId::Tilt).request_stop();
    }

    /// Controlled stop of every axis, used at shutdown.
    pub fn stop_all(&mut self) {
        for id in AxisId::ALL {
            self.axis_mut(id).request_stop();
        }
    }

    pub fn all_at_rest(&self) -> bool {
        self.channels.iter().all(|c| c.axis.is_at_rest())
    }
}

// Motion core: axis state, step-timing profiler, soft-limit envelope

pub mod axis;
pub mod controller;
pub mod envelope;
pub mod profiler;

pub use axis::{Axis, AxisLimits};
pub use controller::{MotionController, TickOutcome};
pub use envelope::{LimitBreach, LimitSide, SafetyEnvelope};
pub use profiler::MotionProfiler;

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("Invalid parameters for {axis} axis: {reason}")]
    InvalidParameters { axis: AxisId, reason: String },
    #[error("Other: {0}")]
    Other(String),
}

/// The three independently controlled motors of the mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisId {
    Azimuth,
    Tilt,
    Focus,
}

impl AxisId {
    pub const ALL: [AxisId; 3] = [AxisId::Azimuth, AxisId::Tilt, AxisId::Focus];

    pub fn index(self) -> usize {
        match self {
            AxisId::Azimuth => 0,
            AxisId::Tilt => 1,
            AxisId::Focus => 2,
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisId::Azimuth => "azimuth",
            AxisId::Tilt => "tilt",
            AxisId::Focus => "focus",
        };
        f.write_str(name)
    }
}

/// Direction of a single step pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Forward,
    Backward,
}

/// One physical step, ready to hand to the step/direction output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCommand {
    pub axis: AxisId,
    pub direction: StepDirection,
}

impl StepCommand {
    /// Wire form understood by the driver link, e.g. `step tilt 1`.
    pub fn to_wire(&self) -> String {
        let dir = match self.direction {
            StepDirection::Forward => 1,
            StepDirection::Backward => 0,
        };
        format!("step {} {}", self.axis, dir)
    }
}

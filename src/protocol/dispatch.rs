//! Maps completed command tokens onto axis target mutations.
//!
//! Every move is pre-checked against the soft limit in its direction
//! before it starts. This is independent of the safety envelope's
//! post-check: the pre-check stops new motion from being commanded past a
//! bound, the envelope catches motion already in flight.

use crate::config::MotionSection;
use crate::motion::{AxisId, MotionController};

use super::Command;

pub struct Dispatcher {
    slew_distance: i64,
    focus_increment: i64,
}

impl Dispatcher {
    pub fn new(motion: &MotionSection) -> Self {
        Self {
            slew_distance: motion.slew_distance,
            focus_increment: motion.focus_increment,
        }
    }

    /// Execute the command carried by `token`, if any.
    ///
    /// Returns the matched command, or `None` for unrecognized tokens,
    /// which are ignored without error so noise and partial frames cannot
    /// destabilize a running mount.
    pub fn dispatch(&self, token: &str, motion: &mut MotionController) -> Option<Command> {
        let command = Command::match_token(token)?;
        match command {
            Command::TiltUp => self.slew(motion, AxisId::Tilt, self.slew_distance),
            Command::TiltDown => self.slew(motion, AxisId::Tilt, -self.slew_distance),
            Command::PanEast => self.slew(motion, AxisId::Azimuth, self.slew_distance),
            Command::PanWest => self.slew(motion, AxisId::Azimuth, -self.slew_distance),
            Command::Stop => motion.stop_turret(),
            Command::FocusIn => self.slew(motion, AxisId::Focus, self.focus_increment),
            Command::FocusOut => self.slew(motion, AxisId::Focus, -self.focus_increment),
        }
        Some(command)
    }

    fn slew(&self, motion: &mut MotionController, id: AxisId, delta: i64) {
        let axis = motion.axis_mut(id);
        let clear = if delta >= 0 {
            axis.clear_of_upper()
        } else {
            axis.clear_of_lower()
        };
        if !clear {
            tracing::debug!("Refusing {} move, axis at travel limit", id);
            return;
        }
        axis.move_relative(delta);
    }
}

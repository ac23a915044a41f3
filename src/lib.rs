// navscope: host-side stepper control for a motorized optical mount

pub mod config;
pub mod hardware;
pub mod motion;
pub mod mount;
pub mod protocol;
pub mod scheduler;

// --- Common re-exports ---

pub use config::{Config, load_config};
pub use motion::{AxisId, MotionController, MotionError, StepCommand, StepDirection};
pub use mount::{Mount, MountError, MountState};
pub use protocol::{Command, Framing, Tokenizer};

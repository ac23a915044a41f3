// Mount configuration: serial links, per-axis motion constants, travel
// limits. Defaults reproduce the shipped firmware tuning so an empty file
// is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mount: MountSection,

    #[serde(default = "default_turret_link")]
    pub turret: LinkConfig,

    #[serde(default = "default_focus_link")]
    pub focus: LinkConfig,

    #[serde(default)]
    pub step_link: StepLinkConfig,

    #[serde(default)]
    pub axes: AxesConfig,

    #[serde(default)]
    pub motion: MotionSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount: MountSection::default(),
            turret: default_turret_link(),
            focus: default_focus_link(),
            step_link: StepLinkConfig::default(),
            axes: AxesConfig::default(),
            motion: MotionSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MountSection {
    #[serde(default = "default_mount_name")]
    pub name: String,
}

impl Default for MountSection {
    fn default() -> Self {
        Self {
            name: default_mount_name(),
        }
    }
}

/// One serial command link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    pub port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl LinkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Optional link to the step/direction driver board. Without a port the
/// host counts steps in simulation instead of pulsing hardware.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepLinkConfig {
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_step_link_baud")]
    pub baud: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for StepLinkConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: default_step_link_baud(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl StepLinkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Speed, acceleration, and soft travel limits for one axis.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxisConfig {
    /// Peak speed in steps per second.
    pub max_speed: f64,
    /// Acceleration and deceleration bound in steps per second squared.
    pub max_accel: f64,
    /// Soft limit in the negative direction, steps. Absent means
    /// unbounded travel.
    #[serde(default)]
    pub limit_down: Option<i64>,
    /// Soft limit in the positive direction, steps.
    #[serde(default)]
    pub limit_up: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AxesConfig {
    #[serde(default = "default_azimuth_axis")]
    pub azimuth: AxisConfig,
    #[serde(default = "default_tilt_axis")]
    pub tilt: AxisConfig,
    #[serde(default = "default_focus_axis")]
    pub focus: AxisConfig,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            azimuth: default_azimuth_axis(),
            tilt: default_tilt_axis(),
            focus: default_focus_axis(),
        }
    }
}

/// Motion constants shared by the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotionSection {
    /// Relative distance of a slew command, a generic far-away point that
    /// keeps the axis moving until stopped or limited.
    #[serde(default = "default_slew_distance")]
    pub slew_distance: i64,
    /// Steps moved per focus command. Smaller is finer focus.
    #[serde(default = "default_focus_increment")]
    pub focus_increment: i64,
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            slew_distance: default_slew_distance(),
            focus_increment: default_focus_increment(),
        }
    }
}

fn default_mount_name() -> String {
    "NavyScope mount".to_string()
}

fn default_baud() -> u32 {
    9600
}

fn default_step_link_baud() -> u32 {
    115_200
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_turret_link() -> LinkConfig {
    LinkConfig {
        port: "/dev/ttyUSB0".to_string(),
        baud: default_baud(),
        connect_timeout_ms: default_connect_timeout_ms(),
    }
}

fn default_focus_link() -> LinkConfig {
    LinkConfig {
        port: "/dev/ttyUSB1".to_string(),
        baud: default_baud(),
        connect_timeout_ms: default_connect_timeout_ms(),
    }
}

fn default_azimuth_axis() -> AxisConfig {
    AxisConfig {
        max_speed: 3000.0,
        max_accel: 1000.0,
        limit_down: None,
        limit_up: None,
    }
}

fn default_tilt_axis() -> AxisConfig {
    AxisConfig {
        max_speed: 3000.0,
        max_accel: 1000.0,
        limit_down: Some(-2000),
        limit_up: Some(5000),
    }
}

fn default_focus_axis() -> AxisConfig {
    AxisConfig {
        max_speed: 1000.0,
        max_accel: 500.0,
        limit_down: None,
        limit_up: None,
    }
}

fn default_slew_distance() -> i64 {
    500_000
}

fn default_focus_increment() -> i64 {
    50
}

/// Load and parse a TOML configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config = toml::from_str(&raw)?;
    Ok(config)
}

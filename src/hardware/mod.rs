// Thin I/O layer: serial command links in, step pulses and diagnostics
// out. Nothing in here owns motion state.

pub mod serial;

pub use serial::CommandPort;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serial2_tokio::SerialPort;
use thiserror::Error;

use crate::config::Config;
use crate::motion::{AxisId, StepCommand};
use crate::protocol::Framing;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("Serial port error: {0}")]
    Serial(#[from] std::io::Error),
    #[error("Connection to {port} timed out after {timeout:?}")]
    ConnectTimeout { port: String, timeout: Duration },
}

/// Step/direction output sink. One call per physical step; the driver
/// board is responsible for holding the pulse high long enough for the
/// stepper driver it fronts.
#[async_trait]
pub trait StepDriver: Send {
    async fn pulse(&mut self, command: StepCommand) -> Result<(), HardwareError>;
    async fn shutdown(&mut self) -> Result<(), HardwareError>;
}

/// Sends step pulses as text lines over a dedicated serial link.
pub struct SerialStepDriver {
    port: Arc<SerialPort>,
}

impl SerialStepDriver {
    pub async fn connect(path: &str, baud: u32, window: Duration) -> Result<Self, HardwareError> {
        let port = serial::open_port(path, baud, window).await?;
        Ok(Self { port })
    }
}

#[async_trait]
impl StepDriver for SerialStepDriver {
    async fn pulse(&mut self, command: StepCommand) -> Result<(), HardwareError> {
        let line = format!("{}\n", command.to_wire());
        self.port.write(line.as_bytes()).await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), HardwareError> {
        // Drop motor power on the way out, mirroring an enable-pin gate.
        self.port.write(b"disable\n").await?;
        Ok(())
    }
}

/// Counts steps instead of pulsing hardware. Used when no step link is
/// configured so the host can run headless.
#[derive(Debug, Default)]
pub struct SimulatedStepDriver {
    steps: [u64; 3],
}

impl SimulatedStepDriver {
    pub fn steps_for(&self, axis: AxisId) -> u64 {
        self.steps[axis.index()]
    }
}

#[async_trait]
impl StepDriver for SimulatedStepDriver {
    async fn pulse(&mut self, command: StepCommand) -> Result<(), HardwareError> {
        self.steps[command.axis.index()] += 1;
        tracing::trace!("Simulated {}", command.to_wire());
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), HardwareError> {
        Ok(())
    }
}

/// Owns every serial link of the mount: the two command ports and the
/// step driver link.
pub struct HardwareManager {
    config: Config,
    turret: Option<CommandPort>,
    focus: Option<CommandPort>,
    steps: Option<Box<dyn StepDriver>>,
}

impl HardwareManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            turret: None,
            focus: None,
            steps: None,
        }
    }

    /// Connect every link, each within its configured timeout window.
    pub async fn initialize(&mut self) -> Result<(), HardwareError> {
        tracing::info!(
            "Connecting turret command port {} @ {} baud",
            self.config.turret.port,
            self.config.turret.baud
        );
        self.turret = Some(CommandPort::connect("turret", &self.config.turret, Framing::Lx200).await?);

        tracing::info!(
            "Connecting focus command port {} @ {} baud",
            self.config.focus.port,
            self.config.focus.baud
        );
        self.focus =
            Some(CommandPort::connect("focus", &self.config.focus, Framing::FocusSign).await?);

        self.steps = Some(match &self.config.step_link.port {
            Some(path) => {
                tracing::info!(
                    "Connecting step link {} @ {} baud",
                    path,
                    self.config.step_link.baud
                );
                Box::new(
                    SerialStepDriver::connect(
                        path,
                        self.config.step_link.baud,
                        self.config.step_link.connect_timeout(),
                    )
                    .await?,
                )
            }
            None => {
                tracing::info!("No step link configured, counting steps in simulation");
                Box::new(SimulatedStepDriver::default()) as Box<dyn StepDriver>
            }
        });

        // Ready banners for whoever is on the other end of each link.
        self.notify(AxisId::Tilt, "System Ready: Turret & Tilt Online")
            .await;
        self.notify(AxisId::Focus, "NavyScope Focus System: READY")
            .await;

        Ok(())
    }

    /// Drain one completed token, turret port first. Never blocks.
    pub fn poll_token(&mut self) -> Option<String> {
        if let Some(port) = self.turret.as_mut() {
            if let Some(token) = port.try_next() {
                return Some(token);
            }
        }
        if let Some(port) = self.focus.as_mut() {
            if let Some(token) = port.try_next() {
                return Some(token);
            }
        }
        None
    }

    pub async fn pulse(&mut self, command: StepCommand) -> Result<(), HardwareError> {
        match self.steps.as_mut() {
            Some(driver) => driver.pulse(command).await,
            None => Ok(()),
        }
    }

    /// Fire-and-forget diagnostic line to the port that commands the
    /// given axis.
    pub async fn notify(&self, axis: AxisId, line: &str) {
        let port = match axis {
            AxisId::Focus => self.focus.as_ref(),
            _ => self.turret.as_ref(),
        };
        if let Some(port) = port {
            port.notify(line).await;
        }
    }

    pub async fn shutdown(&mut self) -> Result<(), HardwareError> {
        tracing::info!("Shutting down hardware links");
        if let Some(port) = self.turret.take() {
            port.close();
        }
        if let Some(port) = self.focus.take() {
            port.close();
        }
        if let Some(mut driver) = self.steps.take() {
            driver.shutdown().await?;
        }
        Ok(())
    }
}

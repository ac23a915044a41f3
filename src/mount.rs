// Mount: ties the command links, dispatcher, and motion core into one
// cooperative control loop.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::hardware::{HardwareError, HardwareManager};
use crate::motion::{AxisId, MotionController, MotionError};
use crate::protocol::Dispatcher;
use crate::scheduler::{Clock, OsClock};

#[derive(Debug, Error)]
pub enum MountError {
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),
    #[error("Motion error: {0}")]
    Motion(#[from] MotionError),
    #[error("Other: {0}")]
    Other(String),
}

/// Control loop period. The profiler times steps against the wall clock,
/// so the tick rate only has to exceed the fastest configured step rate.
const TICK_PERIOD: Duration = Duration::from_micros(200);

/// Shared-state refresh cadence, in ticks.
const STATE_REFRESH_TICKS: u64 = 250;

/// Snapshot of the mount for observers, refreshed by the control loop.
#[derive(Debug, Clone, Default)]
pub struct MountState {
    pub ready: bool,
    /// Azimuth, tilt, focus positions in steps.
    pub positions: [i64; 3],
    /// Azimuth, tilt, focus velocities in steps per second.
    pub velocities: [f64; 3],
    pub moving: bool,
}

pub struct Mount {
    config: Config,
    state: Arc<RwLock<MountState>>,
    motion: MotionController,
    dispatcher: Dispatcher,
    hardware: HardwareManager,
    clock: Box<dyn Clock>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Mount {
    pub fn new(config: Config) -> Result<Self, MountError> {
        let motion = MotionController::new(&config.axes)?;
        let dispatcher = Dispatcher::new(&config.motion);
        let hardware = HardwareManager::new(config.clone());
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            config,
            state: Arc::new(RwLock::new(MountState::default())),
            motion,
            dispatcher,
            hardware,
            clock: Box::new(OsClock::new()),
            shutdown_tx,
        })
    }

    /// Sender half of the shutdown signal; any subscriber-side send stops
    /// the control loop after the current tick.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn state_handle(&self) -> Arc<RwLock<MountState>> {
        self.state.clone()
    }

    /// Connect all hardware links and mark the mount ready.
    pub async fn start(&mut self) -> Result<(), MountError> {
        tracing::info!("Starting mount '{}'", self.config.mount.name);
        self.hardware.initialize().await?;
        {
            let mut state = self.state.write().await;
            state.ready = true;
        }
        tracing::info!("Mount ready");
        Ok(())
    }

    /// Run the control loop until shutdown is signalled.
    pub async fn run(&mut self) -> Result<(), MountError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(TICK_PERIOD);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut ticks: u64 = 0;
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Control loop shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.step_once().await;
                    ticks += 1;
                    if ticks % STATE_REFRESH_TICKS == 0 {
                        self.refresh_state().await;
                    }
                }
            }
        }
        self.motion.stop_all();
        self.hardware.shutdown().await?;
        Ok(())
    }

    /// One tick: dispatch pending tokens, advance every axis, forward
    /// pulses and breach diagnostics. Nothing in here is fatal; the loop
    /// must stay live through any single command or limit event.
    async fn step_once(&mut self) {
        while let Some(token) = self.hardware.poll_token() {
            match self.dispatcher.dispatch(&token, &mut self.motion) {
                Some(command) => tracing::debug!("Dispatched {:?}", command),
                None => tracing::trace!("Ignoring token {:?}", token),
            }
        }

        let outcome = self.motion.tick(self.clock.elapsed());
        for step in outcome.steps {
            if let Err(e) = self.hardware.pulse(step).await {
                tracing::error!("Step output failed on {}: {}", step.axis, e);
            }
        }
        for breach in outcome.breaches {
            tracing::warn!("{}", breach);
            self.hardware.notify(breach.axis, &breach.to_string()).await;
        }
    }

    async fn refresh_state(&mut self) {
        let mut state = self.state.write().await;
        for id in AxisId::ALL {
            let axis = self.motion.axis(id);
            state.positions[id.index()] = axis.position();
            state.velocities[id.index()] = axis.velocity();
        }
        state.moving = !self.motion.all_at_rest();
    }
}

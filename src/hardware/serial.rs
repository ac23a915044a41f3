//! Serial command link: bounded connect, reader task, token queue.
//!
//! Each port gets its own reader task running the tokenizer; completed
//! tokens cross to the control loop through a bounded channel, so the
//! byte-receiving path and the dispatch path never share mutable state.

use std::sync::Arc;
use std::time::Duration;

use serial2_tokio::SerialPort;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::LinkConfig;
use crate::protocol::{Framing, Tokenizer};

use super::HardwareError;

/// Completed tokens buffered between the reader task and the control
/// loop. Commands are single keystrokes from a human, so a shallow queue
/// is plenty; when it overflows the oldest intent is stale anyway and the
/// newest tokens are dropped with a warning.
const TOKEN_QUEUE_DEPTH: usize = 32;

/// Open a port, retrying until the window closes.
///
/// Startup is the only place the host waits on hardware, and the wait is
/// bounded: a missing device yields `ConnectTimeout` instead of an
/// indefinite spin.
pub(crate) async fn open_port(
    path: &str,
    baud: u32,
    window: Duration,
) -> Result<Arc<SerialPort>, HardwareError> {
    let deadline = tokio::time::Instant::now() + window;
    loop {
        match SerialPort::open(path, baud) {
            Ok(port) => return Ok(Arc::new(port)),
            Err(e) => {
                if tokio::time::Instant::now() >= deadline {
                    tracing::error!("Giving up on {}: {}", path, e);
                    return Err(HardwareError::ConnectTimeout {
                        port: path.to_string(),
                        timeout: window,
                    });
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

/// One command input link with its reader task.
pub struct CommandPort {
    label: &'static str,
    port: Arc<SerialPort>,
    tokens: mpsc::Receiver<String>,
    reader: JoinHandle<()>,
}

impl CommandPort {
    pub async fn connect(
        label: &'static str,
        config: &LinkConfig,
        framing: Framing,
    ) -> Result<Self, HardwareError> {
        let port = open_port(&config.port, config.baud, config.connect_timeout()).await?;
        let (tx, rx) = mpsc::channel(TOKEN_QUEUE_DEPTH);
        let reader = tokio::spawn(read_loop(label, port.clone(), framing, tx));
        Ok(Self {
            label,
            port,
            tokens: rx,
            reader,
        })
    }

    /// Next completed token, if any. Never blocks.
    pub fn try_next(&mut self) -> Option<String> {
        self.tokens.try_recv().ok()
    }

    /// Write a diagnostic line back out the link. Fire-and-forget: a
    /// failed write is logged and swallowed, diagnostics must never stall
    /// motion.
    pub async fn notify(&self, line: &str) {
        let framed = format!("{line}\r\n");
        if let Err(e) = self.port.write(framed.as_bytes()).await {
            tracing::debug!("{} notify failed: {}", self.label, e);
        }
    }

    pub fn close(self) {
        self.reader.abort();
    }
}

async fn read_loop(
    label: &'static str,
    port: Arc<SerialPort>,
    framing: Framing,
    tx: mpsc::Sender<String>,
) {
    let mut tokenizer = Tokenizer::new(framing);
    let mut buf = [0u8; 256];
    loop {
        match port.read(&mut buf).await {
            Ok(0) => {
                tracing::info!("{} command stream closed", label);
                break;
            }
            Ok(n) => {
                for &byte in &buf[..n] {
                    if let Some(token) = tokenizer.feed(byte) {
                        tracing::debug!("{} RX {:?}", label, token);
                        if tx.try_send(token).is_err() {
                            tracing::warn!("{} token queue full, dropping command", label);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("{} serial read error: {}", label, e);
                break;
            }
        }
    }
}

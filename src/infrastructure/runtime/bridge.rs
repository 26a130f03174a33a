//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI owns the terminal on the main thread; every network or timed
//! operation runs on a worker thread with its own Tokio runtime. All
//! traffic is tagged with the dashboard session id it belongs to.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::error;

use crate::core::InspectRequest;
use crate::domain::Alert;
use crate::infrastructure::api::AnalyticsApi;
use crate::infrastructure::runtime::worker::run_async_worker;
use crate::modules::PriceQuote;
use crate::store::{DataSource, Dataset};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Load dataset and alerts, then start the periodic refresh
    OpenSession { session: u64 },
    /// Abort everything still running for the session
    CloseSession { session: u64 },
    /// Query the risk or fund-tracing service
    Inspect {
        session: u64,
        request: InspectRequest,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    DatasetReady {
        session: u64,
        dataset: Dataset,
    },
    DatasetFailed {
        session: u64,
        message: String,
    },
    /// Alert feed for the session; empty when the feed failed
    AlertsReady {
        session: u64,
        alerts: Vec<Alert>,
    },
    PricesReady {
        session: u64,
        quotes: BTreeMap<String, PriceQuote>,
    },
    NetworkReady {
        session: u64,
        analysis: serde_json::Value,
    },
    ReportReady {
        session: u64,
        request: InspectRequest,
        report: serde_json::Value,
    },
    /// Error occurred; `None` when not tied to a session
    Error {
        session: Option<u64>,
        message: String,
    },
}

impl RuntimeEvent {
    pub fn session(&self) -> Option<u64> {
        match self {
            RuntimeEvent::DatasetReady { session, .. }
            | RuntimeEvent::DatasetFailed { session, .. }
            | RuntimeEvent::AlertsReady { session, .. }
            | RuntimeEvent::PricesReady { session, .. }
            | RuntimeEvent::NetworkReady { session, .. }
            | RuntimeEvent::ReportReady { session, .. } => Some(*session),
            RuntimeEvent::Error { session, .. } => *session,
        }
    }
}

/// Everything the worker needs to serve sessions
#[derive(Clone)]
pub struct WorkerConfig {
    pub source: Arc<dyn DataSource>,
    pub api: Arc<dyn AnalyticsApi>,
    pub refresh_interval: Duration,
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    pub fn new(config: WorkerConfig) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        // Spawn the worker thread with its own Tokio runtime
        thread::Builder::new()
            .name("chainaudit-worker".to_string())
            .spawn(move || {
                let rt = match Runtime::new() {
                    Ok(rt) => rt,
                    Err(err) => {
                        error!(error = %err, "failed to start tokio runtime");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            session: None,
                            message: format!("Failed to start runtime: {err}"),
                        });
                        return;
                    }
                };
                rt.block_on(async {
                    if let Err(err) = run_async_worker(config, cmd_rx, evt_tx.clone()).await {
                        error!(error = %format!("{err:#}"), "runtime worker exited");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            session: None,
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        self.evt_rx.try_iter().collect()
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}

//! Async worker - runs in Tokio runtime and serves dashboard sessions

use std::future::Future;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::InspectRequest;
use crate::infrastructure::api::AnalyticsApi;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent, WorkerConfig};
use crate::store::DataSource;

/// Tasks owned by one session. Dropping the set aborts them all.
struct SessionTasks {
    session: u64,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionTasks {
    fn new(session: u64) -> Self {
        Self {
            session,
            tasks: Vec::new(),
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push(tokio::spawn(task));
    }

    fn reap(&mut self) {
        self.tasks.retain(|task| !task.is_finished());
    }
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Run the async worker loop
pub async fn run_async_worker(
    config: WorkerConfig,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let mut active: Option<SessionTasks> = None;

    loop {
        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };

            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::OpenSession { session } => {
                    // Replacing the previous set aborts whatever it still runs
                    let mut tasks = SessionTasks::new(session);
                    info!(session, source = %config.source.describe(), "session opened");
                    tasks.spawn(load_session(
                        session,
                        Arc::clone(&config.source),
                        Arc::clone(&config.api),
                        evt_tx.clone(),
                    ));
                    tasks.spawn(refresh_loop(
                        session,
                        Arc::clone(&config.api),
                        config.refresh_interval,
                        evt_tx.clone(),
                    ));
                    active = Some(tasks);
                }

                RuntimeCommand::CloseSession { session } => {
                    if active.as_ref().is_some_and(|tasks| tasks.session == session) {
                        info!(session, "session closed");
                        active = None;
                    }
                }

                RuntimeCommand::Inspect { session, request } => match active.as_mut() {
                    Some(tasks) if tasks.session == session => {
                        tasks.spawn(inspect(
                            session,
                            request,
                            Arc::clone(&config.api),
                            evt_tx.clone(),
                        ));
                    }
                    _ => debug!(session, "inspect for inactive session ignored"),
                },
            }
        }

        if let Some(tasks) = active.as_mut() {
            tasks.reap();
        }

        // Small yield to prevent busy loop
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// One-shot load of dataset and alert feed
async fn load_session(
    session: u64,
    source: Arc<dyn DataSource>,
    api: Arc<dyn AnalyticsApi>,
    evt_tx: Sender<RuntimeEvent>,
) {
    let (dataset, alerts) = futures::join!(source.load(), api.alerts());

    let event = match dataset {
        Ok(dataset) => {
            info!(
                session,
                nodes = dataset.nodes.len(),
                transactions = dataset.transactions.len(),
                "dataset loaded"
            );
            RuntimeEvent::DatasetReady { session, dataset }
        }
        Err(err) => {
            let message = format!("{err:#}");
            warn!(session, error = %message, "dataset load failed");
            RuntimeEvent::DatasetFailed { session, message }
        }
    };
    let _ = evt_tx.send(event);

    let alerts = alerts.unwrap_or_else(|err| {
        warn!(session, error = %err, "alert feed unavailable");
        Vec::new()
    });
    let _ = evt_tx.send(RuntimeEvent::AlertsReady { session, alerts });
}

/// Periodic prices and network metrics; failures keep last-known state
async fn refresh_loop(
    session: u64,
    api: Arc<dyn AnalyticsApi>,
    period: Duration,
    evt_tx: Sender<RuntimeEvent>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let (prices, network) = futures::join!(api.prices(), api.network_analysis());

        match prices {
            Ok(quotes) => {
                if evt_tx
                    .send(RuntimeEvent::PricesReady { session, quotes })
                    .is_err()
                {
                    return;
                }
            }
            Err(err) => warn!(session, error = %err, "price refresh failed"),
        }

        match network {
            Ok(analysis) => {
                if evt_tx
                    .send(RuntimeEvent::NetworkReady { session, analysis })
                    .is_err()
                {
                    return;
                }
            }
            Err(err) => warn!(session, error = %err, "network analysis refresh failed"),
        }
    }
}

async fn inspect(
    session: u64,
    request: InspectRequest,
    api: Arc<dyn AnalyticsApi>,
    evt_tx: Sender<RuntimeEvent>,
) {
    let event = match api.inspect(&request).await {
        Ok(report) => RuntimeEvent::ReportReady {
            session,
            request,
            report,
        },
        Err(err) => {
            warn!(session, address = request.address(), error = %err, "inspect failed");
            RuntimeEvent::Error {
                session: Some(session),
                message: format!("{} failed: {}", request.label(), err),
            }
        }
    };
    let _ = evt_tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::domain::{Alert, Severity};
    use crate::error::ApiError;
    use crate::modules::PriceQuote;
    use crate::store::LocalGenerator;

    #[derive(Default)]
    struct StubApi {
        price_calls: AtomicUsize,
    }

    #[async_trait]
    impl AnalyticsApi for StubApi {
        async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
            Ok(vec![Alert {
                id: "alert_1".to_string(),
                severity: Severity::High,
                kind: "rapid_transactions".to_string(),
                title: "Rapid activity".to_string(),
                description: String::new(),
                timestamp: 0,
                data: None,
            }])
        }

        async fn prices(&self) -> Result<BTreeMap<String, PriceQuote>, ApiError> {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            let mut quotes = BTreeMap::new();
            quotes.insert(
                "ethereum".to_string(),
                PriceQuote {
                    price: 2650.0,
                    change_24h: 1.0,
                    volume_24h: 0.0,
                    market_cap: 0.0,
                },
            );
            Ok(quotes)
        }

        async fn network_analysis(&self) -> Result<Value, ApiError> {
            Err(ApiError::Status {
                url: "http://stub/api/network-analysis".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            })
        }

        async fn inspect(&self, request: &InspectRequest) -> Result<Value, ApiError> {
            Ok(json!({ "address": request.address(), "risk_score": 0.42 }))
        }
    }

    struct Harness {
        cmd_tx: mpsc::Sender<RuntimeCommand>,
        evt_rx: mpsc::Receiver<RuntimeEvent>,
        api: Arc<StubApi>,
        worker: JoinHandle<Result<()>>,
    }

    impl Harness {
        fn start() -> Self {
            let api = Arc::new(StubApi::default());
            let config = WorkerConfig {
                source: Arc::new(LocalGenerator::new(Duration::from_millis(800))),
                api: api.clone(),
                refresh_interval: Duration::from_secs(10),
            };
            let (cmd_tx, cmd_rx) = mpsc::channel();
            let (evt_tx, evt_rx) = mpsc::channel();
            let worker = tokio::spawn(run_async_worker(config, cmd_rx, evt_tx));
            Self {
                cmd_tx,
                evt_rx,
                api,
                worker,
            }
        }

        fn send(&self, cmd: RuntimeCommand) {
            self.cmd_tx.send(cmd).unwrap();
        }

        fn drain(&self) -> Vec<RuntimeEvent> {
            self.evt_rx.try_iter().collect()
        }

        async fn shutdown(self) {
            self.send(RuntimeCommand::Shutdown);
            self.worker.await.unwrap().unwrap();
        }
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_session_loads_dataset_and_alerts() {
        let harness = Harness::start();
        harness.send(RuntimeCommand::OpenSession { session: 1 });
        advance(2).await;

        let events = harness.drain();
        assert!(events.iter().all(|evt| evt.session() == Some(1)));
        assert!(events.iter().any(|evt| matches!(
            evt,
            RuntimeEvent::DatasetReady { dataset, .. } if dataset.nodes.len() == 8
        )));
        assert!(events.iter().any(|evt| matches!(
            evt,
            RuntimeEvent::AlertsReady { alerts, .. } if alerts.len() == 1
        )));
        assert!(events
            .iter()
            .any(|evt| matches!(evt, RuntimeEvent::PricesReady { .. })));
        // failed network refresh sends nothing
        assert!(!events
            .iter()
            .any(|evt| matches!(evt, RuntimeEvent::NetworkReady { .. })));

        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_before_load_completes_discards_everything() {
        let harness = Harness::start();
        harness.send(RuntimeCommand::OpenSession { session: 1 });
        harness.send(RuntimeCommand::CloseSession { session: 1 });
        advance(5).await;

        assert!(harness.drain().is_empty());
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_stops_after_close() {
        let harness = Harness::start();
        harness.send(RuntimeCommand::OpenSession { session: 1 });
        advance(25).await;
        let ticks = harness.api.price_calls.load(Ordering::SeqCst);
        assert!(ticks >= 2);

        harness.send(RuntimeCommand::CloseSession { session: 1 });
        advance(1).await;
        let after_close = harness.api.price_calls.load(Ordering::SeqCst);
        advance(60).await;
        assert_eq!(harness.api.price_calls.load(Ordering::SeqCst), after_close);

        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_replaces_previous_session() {
        let harness = Harness::start();
        harness.send(RuntimeCommand::OpenSession { session: 1 });
        harness.send(RuntimeCommand::OpenSession { session: 2 });
        advance(2).await;

        let events = harness.drain();
        assert!(!events.is_empty());
        assert!(events.iter().all(|evt| evt.session() == Some(2)));
        harness.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_inspect_reports_for_active_session_only() {
        let harness = Harness::start();
        harness.send(RuntimeCommand::OpenSession { session: 3 });
        harness.send(RuntimeCommand::Inspect {
            session: 2,
            request: InspectRequest::Risk {
                address: "0x112233".to_string(),
            },
        });
        harness.send(RuntimeCommand::Inspect {
            session: 3,
            request: InspectRequest::Trace {
                address: "0x112233".to_string(),
                depth: 3,
            },
        });
        advance(2).await;

        let reports: Vec<_> = harness
            .drain()
            .into_iter()
            .filter_map(|evt| match evt {
                RuntimeEvent::ReportReady {
                    session,
                    request,
                    report,
                } => Some((session, request, report)),
                _ => None,
            })
            .collect();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, 3);
        assert_eq!(reports[0].1.label(), "Fund tracing");
        assert_eq!(reports[0].2["address"], "0x112233");

        harness.shutdown().await;
    }
}

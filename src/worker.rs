// Push-mode worker: one collection cycle per tick, written to the push sink.
// Runs independently of the pull endpoint; the two share only read-only state.

use crate::collector::{Collector, Snapshot};
use crate::push::PushSink;
use std::sync::Arc;
use tokio::time::{Duration, interval};
use tracing::Instrument;

pub struct WorkerDeps {
    pub collector: Arc<Collector>,
    pub sink: Arc<dyn PushSink>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

pub struct WorkerConfig {
    pub interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        collector,
        sink,
        mut shutdown_rx,
    } = deps;

    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "push_worker",
        interval_secs = config.interval_secs
    );

    tokio::spawn(
        async move {
            let mut tick = interval(Duration::from_secs(config.interval_secs));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        push_once(&collector, sink.as_ref()).await;
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Push worker shutting down");
                        break;
                    }
                }
            }
        }
        .instrument(worker_span),
    )
}

/// Runs one cycle and writes whatever datasets succeeded. Failed datasets
/// are logged and skipped; the next tick retries.
pub async fn push_once(collector: &Collector, sink: &dyn PushSink) -> usize {
    let snapshot = collector.collect().await;
    log_failures(&snapshot);

    let points = snapshot.points(chrono::Utc::now());
    let n = points.len();
    match sink.write_points(&points).await {
        Ok(()) => {
            tracing::debug!(operation = "write_points", points_count = n, "Points pushed");
            n
        }
        Err(e) => {
            tracing::warn!(error = %e, operation = "write_points", "push failed");
            0
        }
    }
}

fn log_failures(snapshot: &Snapshot) {
    let datasets = [
        snapshot.sessions.as_ref().err(),
        snapshot.process_io.as_ref().err(),
        snapshot.process_mem_cpu.as_ref().err(),
    ];
    for err in datasets.into_iter().flatten() {
        tracing::warn!(error = %err, operation = "collect", "dataset skipped");
    }
}

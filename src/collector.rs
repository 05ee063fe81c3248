// One collection cycle: sessions, process I/O, process CPU/memory

use std::sync::Arc;

use crate::attribution::Attributor;
use crate::error::{CollectError, Result};
use crate::models::{HostIdentity, MetricRecord, SessionTable};
use crate::render::{Point, build_points, render_exposition};
use crate::sample_repo::{SampleSource, parse_sessions};

/// Result of one cycle. Each dataset succeeds or fails on its own.
#[derive(Debug)]
pub struct Snapshot {
    pub host: Arc<HostIdentity>,
    pub sessions: Result<SessionTable>,
    pub process_io: Result<Vec<MetricRecord>>,
    pub process_mem_cpu: Result<Vec<MetricRecord>>,
}

impl Snapshot {
    /// First dataset that failed outright, in collection order.
    pub fn first_failure(&self) -> Option<&CollectError> {
        self.sessions
            .as_ref()
            .err()
            .or_else(|| self.process_io.as_ref().err())
            .or_else(|| self.process_mem_cpu.as_ref().err())
    }

    /// Records of the datasets that succeeded, I/O first.
    pub fn records(&self) -> Vec<MetricRecord> {
        let mut records = Vec::new();
        for dataset in [&self.process_io, &self.process_mem_cpu] {
            if let Ok(r) = dataset {
                records.extend(r.iter().cloned());
            }
        }
        records
    }

    /// Exposition text, or the first dataset failure.
    pub fn render(&self) -> std::result::Result<String, &CollectError> {
        if let Some(err) = self.first_failure() {
            return Err(err);
        }
        let empty = SessionTable::default();
        let sessions = self.sessions.as_ref().unwrap_or(&empty);
        Ok(render_exposition(&self.host, sessions, &self.records()))
    }

    /// Push points for every dataset that succeeded.
    pub fn points(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<Point> {
        build_points(&self.host, self.sessions.as_ref().ok(), &self.records(), now)
    }
}

/// Drives a cycle. Holds only read-only state, so the pull endpoint and the
/// push worker can run cycles concurrently.
pub struct Collector {
    host: Arc<HostIdentity>,
    source: Arc<dyn SampleSource>,
    attributor: Arc<Attributor>,
}

impl Collector {
    pub fn new(
        host: Arc<HostIdentity>,
        source: Arc<dyn SampleSource>,
        attributor: Arc<Attributor>,
    ) -> Self {
        Self {
            host,
            source,
            attributor,
        }
    }

    pub fn host(&self) -> &Arc<HostIdentity> {
        &self.host
    }

    pub async fn collect(&self) -> Snapshot {
        let sessions = self.source.sessions().await.map(|text| parse_sessions(&text));

        let process_io = match self.source.process_io().await {
            Ok(text) => Ok(self.attributor.attribute_io(&self.host, &text).await),
            Err(e) => Err(e),
        };

        let process_mem_cpu = match self.source.process_mem_cpu().await {
            Ok(text) => Ok(self.attributor.attribute_mem_cpu(&self.host, &text).await),
            Err(e) => Err(e),
        };

        let snapshot = Snapshot {
            host: self.host.clone(),
            sessions,
            process_io,
            process_mem_cpu,
        };
        tracing::debug!(
            operation = "collect",
            sessions_ok = snapshot.sessions.is_ok(),
            process_io_ok = snapshot.process_io.is_ok(),
            process_mem_cpu_ok = snapshot.process_mem_cpu.is_ok(),
            "collection cycle finished"
        );
        snapshot
    }
}

// Shared test helpers: in-memory collaborators

#![allow(dead_code)]

use async_trait::async_trait;
use logged_users_exporter::attribution::Attributor;
use logged_users_exporter::cgroup_repo::{CgroupResolver, CgroupSource};
use logged_users_exporter::collector::Collector;
use logged_users_exporter::docker_repo::{ContainerInspector, ContainerNameResolver};
use logged_users_exporter::error::{CollectError, Dataset, Result};
use logged_users_exporter::models::HostIdentity;
use logged_users_exporter::push::{PushError, PushSink};
use logged_users_exporter::render::Point;
use logged_users_exporter::sample_repo::SampleSource;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const W_OUTPUT: &str = "\
 10:00:01 up 3 days,  2:01,  1 user,  load average: 0.00, 0.01, 0.05
USER     TTY      FROM             LOGIN@   IDLE   JCPU   PCPU WHAT
alice    pts/0    10.0.0.5         09:58    1.00s  0.10s  0.00s vim \"notes.txt\"";

pub fn host() -> HostIdentity {
    HostIdentity::new("web1", "linux", "6.8.0")
}

pub fn unavailable(dataset: Dataset) -> CollectError {
    CollectError::SourceUnavailable {
        dataset,
        reason: "exit status: 1".into(),
    }
}

/// Raw sample text fixed per dataset.
pub struct FakeSource {
    pub sessions: Result<String>,
    pub process_io: Result<String>,
    pub process_mem_cpu: Result<String>,
}

impl FakeSource {
    pub fn new(sessions: &str, process_io: &str, process_mem_cpu: &str) -> Self {
        Self {
            sessions: Ok(sessions.into()),
            process_io: Ok(process_io.into()),
            process_mem_cpu: Ok(process_mem_cpu.into()),
        }
    }
}

#[async_trait]
impl SampleSource for FakeSource {
    async fn sessions(&self) -> Result<String> {
        self.sessions.clone()
    }

    async fn process_io(&self) -> Result<String> {
        self.process_io.clone()
    }

    async fn process_mem_cpu(&self) -> Result<String> {
        self.process_mem_cpu.clone()
    }
}

/// Cgroup records keyed by pid; unknown pids are `NotFound`.
#[derive(Default)]
pub struct FakeCgroups(pub HashMap<u32, String>);

impl FakeCgroups {
    pub fn with(mut self, pid: u32, record: &str) -> Self {
        self.0.insert(pid, record.into());
        self
    }
}

#[async_trait]
impl CgroupSource for FakeCgroups {
    async fn read(&self, pid: u32) -> Result<String> {
        self.0.get(&pid).cloned().ok_or(CollectError::NotFound {
            pid,
            reason: "process exited".into(),
        })
    }
}

/// Container names keyed by id; unknown ids fail the lookup.
#[derive(Default)]
pub struct FakeInspector {
    pub names: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeInspector {
    pub fn with(mut self, id: &str, name: &str) -> Self {
        self.names.insert(id.into(), name.into());
        self
    }
}

#[async_trait]
impl ContainerInspector for FakeInspector {
    async fn container_name(&self, container_id: &str) -> Result<String> {
        self.calls.lock().unwrap().push(container_id.to_string());
        self.names
            .get(container_id)
            .cloned()
            .ok_or_else(|| CollectError::LookupFailed {
                container_id: container_id.to_string(),
                reason: "No such container".into(),
            })
    }
}

/// Keeps every batch it is handed.
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<Vec<Point>>>,
    pub fail: bool,
}

#[async_trait]
impl PushSink for RecordingSink {
    async fn write_points(&self, points: &[Point]) -> std::result::Result<(), PushError> {
        self.batches.lock().unwrap().push(points.to_vec());
        if self.fail {
            return Err(PushError::Rejected {
                status: reqwest::StatusCode::UNAUTHORIZED,
                body: "unauthorized".into(),
            });
        }
        Ok(())
    }
}

pub fn attributor(cgroups: FakeCgroups, inspector: Arc<FakeInspector>) -> Attributor {
    Attributor::new(
        CgroupResolver::new(Arc::new(cgroups)),
        ContainerNameResolver::new(inspector, Duration::from_secs(1)),
        4,
    )
}

pub fn collector(source: FakeSource, cgroups: FakeCgroups, inspector: FakeInspector) -> Collector {
    Collector::new(
        Arc::new(host()),
        Arc::new(source),
        Arc::new(attributor(cgroups, Arc::new(inspector))),
    )
}

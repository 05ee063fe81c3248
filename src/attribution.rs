// Joins process rows with the container that owns them

use crate::cgroup_repo::CgroupResolver;
use crate::docker_repo::ContainerNameResolver;
use crate::error::Dataset;
use crate::models::{ContainerIdentity, HostIdentity, MetricRecord, ProcessSample};
use crate::sample_repo::{ProcessRow, parse_io_row, parse_mem_cpu_row, rows};
use futures_util::{StreamExt, stream};

/// Attribution never fails: every lookup error degrades the one record it
/// belongs to and the rest of the dataset is unaffected.
pub struct Attributor {
    cgroups: CgroupResolver,
    names: ContainerNameResolver,
    max_concurrent: usize,
}

impl Attributor {
    /// `max_concurrent` bounds in-flight lookups per dataset; output order
    /// always matches input order.
    pub fn new(cgroups: CgroupResolver, names: ContainerNameResolver, max_concurrent: usize) -> Self {
        Self {
            cgroups,
            names,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Container owning `pid`. Cgroup failures and host processes give the
    /// no-container pair; a failed name lookup keeps the id with an empty name.
    pub async fn container_for(&self, pid: u32) -> ContainerIdentity {
        let container_id = match self.cgroups.container_id(pid).await {
            Ok(Some(id)) => id,
            Ok(None) => return ContainerIdentity::none(),
            Err(e) => {
                tracing::debug!(pid, error = %e, "cgroup lookup failed");
                return ContainerIdentity::none();
            }
        };
        let name = match self.names.resolve_name(&container_id).await {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!(pid, container_id = %container_id, error = %e, "container name lookup failed");
                String::new()
            }
        };
        ContainerIdentity::new(container_id, name)
    }

    pub async fn attribute(&self, host: &HostIdentity, row: ProcessRow) -> MetricRecord {
        let container = self.container_for(row.pid).await;
        MetricRecord {
            hostname: host.hostname.clone(),
            os_distro: host.os.clone(),
            os_version: host.os_version.clone(),
            sample: ProcessSample {
                pid: row.pid,
                user: row.user,
                command: row.command,
                metrics: row.metrics,
            },
            container,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Attributes every well-formed I/O row.
    pub async fn attribute_io(&self, host: &HostIdentity, text: &str) -> Vec<MetricRecord> {
        let parsed = parse_rows(Dataset::ProcessIo, text, parse_io_row);
        self.attribute_all(host, parsed).await
    }

    /// Attributes every well-formed CPU/memory row whose command is not
    /// excluded.
    pub async fn attribute_mem_cpu(&self, host: &HostIdentity, text: &str) -> Vec<MetricRecord> {
        let parsed = parse_rows(Dataset::ProcessMemCpu, text, parse_mem_cpu_row)
            .into_iter()
            .filter(|row| !ProcessSample::is_excluded_command(&row.command))
            .collect();
        self.attribute_all(host, parsed).await
    }

    async fn attribute_all(&self, host: &HostIdentity, parsed: Vec<ProcessRow>) -> Vec<MetricRecord> {
        stream::iter(parsed)
            .map(|row| self.attribute(host, row))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }
}

fn parse_rows(
    dataset: Dataset,
    text: &str,
    parse: fn(&str) -> crate::error::Result<ProcessRow>,
) -> Vec<ProcessRow> {
    rows(text)
        .filter_map(|line| match parse(line) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::debug!(dataset = %dataset, error = %e, "dropping row");
                None
            }
        })
        .collect()
}

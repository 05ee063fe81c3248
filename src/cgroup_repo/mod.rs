// Cgroup membership lookup for a pid

mod parse;

pub use parse::{CgroupMembership, container_id_from_path};

use crate::error::{CollectError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Supplies the raw cgroup record of a process.
#[async_trait]
pub trait CgroupSource: Send + Sync {
    /// Returns the record text, or `NotFound` when the process has no
    /// readable record (it may have exited since enumeration).
    async fn read(&self, pid: u32) -> Result<String>;
}

/// Reads `<proc_root>/<pid>/cgroup`.
pub struct ProcCgroupSource {
    proc_root: PathBuf,
}

impl ProcCgroupSource {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }
}

impl Default for ProcCgroupSource {
    fn default() -> Self {
        Self::new("/proc")
    }
}

#[async_trait]
impl CgroupSource for ProcCgroupSource {
    async fn read(&self, pid: u32) -> Result<String> {
        let path = self.proc_root.join(pid.to_string()).join("cgroup");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CollectError::NotFound {
                pid,
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

/// Resolves a pid to its cgroup membership and container id.
#[derive(Clone)]
pub struct CgroupResolver {
    source: Arc<dyn CgroupSource>,
}

impl CgroupResolver {
    pub fn new(source: Arc<dyn CgroupSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, pid: u32) -> Result<CgroupMembership> {
        let content = self.source.read(pid).await?;
        parse::select_membership(&content).ok_or_else(|| CollectError::NotFound {
            pid,
            reason: "no usable cgroup line".into(),
        })
    }

    /// Container id owning `pid`; `None` for host/system processes.
    pub async fn container_id(&self, pid: u32) -> Result<Option<String>> {
        let membership = self.resolve(pid).await?;
        let id = container_id_from_path(&membership.path);
        tracing::debug!(
            pid,
            hierarchy_id = %membership.hierarchy_id,
            subsystem = %membership.subsystem,
            cgroup_path = %membership.path,
            container_id = id.as_deref().unwrap_or(""),
            "cgroup resolved"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn proc_source_reads_fixture_tree() {
        let dir = tempfile::TempDir::new().unwrap();
        let pid_dir = dir.path().join("42");
        std::fs::create_dir_all(&pid_dir).unwrap();
        std::fs::write(pid_dir.join("cgroup"), "0::/docker/abc123\n").unwrap();

        let resolver = CgroupResolver::new(Arc::new(ProcCgroupSource::new(dir.path())));
        let membership = resolver.resolve(42).await.unwrap();
        assert_eq!(membership.path, "/docker/abc123");
        assert_eq!(
            resolver.container_id(42).await.unwrap().as_deref(),
            Some("abc123")
        );
    }

    #[tokio::test]
    async fn missing_pid_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let resolver = CgroupResolver::new(Arc::new(ProcCgroupSource::new(dir.path())));
        let err = resolver.resolve(7).await.unwrap_err();
        assert!(matches!(err, CollectError::NotFound { pid: 7, .. }));
        assert!(!err.is_cycle_fatal());
    }

    #[tokio::test]
    async fn empty_record_is_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let pid_dir = dir.path().join("9");
        std::fs::create_dir_all(&pid_dir).unwrap();
        std::fs::write(pid_dir.join("cgroup"), "").unwrap();

        let resolver = CgroupResolver::new(Arc::new(ProcCgroupSource::new(dir.path())));
        assert!(matches!(
            resolver.resolve(9).await,
            Err(CollectError::NotFound { pid: 9, .. })
        ));
    }
}

// Container name lookup via the Docker Engine API (bollard)

use crate::error::{CollectError, Result};
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::InspectContainerOptions;
use std::sync::Arc;
use std::time::Duration;

/// Answers "what is this container called" for a container id.
#[async_trait]
pub trait ContainerInspector: Send + Sync {
    async fn container_name(&self, container_id: &str) -> Result<String>;
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    /// Does not talk to the daemon yet; an absent daemon shows up later as
    /// per-record `LookupFailed`.
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerInspector for DockerRepo {
    async fn container_name(&self, container_id: &str) -> Result<String> {
        let inspected = self
            .docker
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| CollectError::LookupFailed {
                container_id: container_id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(inspected.name.unwrap_or_default())
    }
}

/// Resolves container ids to names. No caching: every call is a fresh lookup.
#[derive(Clone)]
pub struct ContainerNameResolver {
    inspector: Arc<dyn ContainerInspector>,
    timeout: Duration,
}

impl ContainerNameResolver {
    pub fn new(inspector: Arc<dyn ContainerInspector>, timeout: Duration) -> Self {
        Self { inspector, timeout }
    }

    /// Empty id is a no-op returning an empty name. A hung lookup past the
    /// timeout is reported as `LookupFailed`.
    pub async fn resolve_name(&self, container_id: &str) -> Result<String> {
        if container_id.is_empty() {
            return Ok(String::new());
        }
        let raw = tokio::time::timeout(self.timeout, self.inspector.container_name(container_id))
            .await
            .map_err(|_| CollectError::LookupFailed {
                container_id: container_id.to_string(),
                reason: format!("timed out after {:?}", self.timeout),
            })??;
        Ok(clean_name(&raw))
    }
}

/// Strips quote/newline artifacts and the leading `/` Docker puts on names.
fn clean_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c == '\'' || c == '"' || c.is_whitespace())
        .trim_start_matches('/')
        .to_string()
}

// Container identity and joined metric record

use chrono::{DateTime, Utc};

use super::ProcessSample;

/// Value used for both id and name when a process has no container.
pub const NO_CONTAINER: &str = "0 N/A";

/// Container that owns a process. Either both fields are [`NO_CONTAINER`] or
/// `id` is a real container id (and `name` is the resolved name, possibly
/// empty when the lookup failed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerIdentity {
    pub id: String,
    pub name: String,
}

impl ContainerIdentity {
    pub fn none() -> Self {
        Self {
            id: NO_CONTAINER.into(),
            name: NO_CONTAINER.into(),
        }
    }

    /// Empty `id` means host-owned and collapses to [`ContainerIdentity::none`].
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            return Self::none();
        }
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn is_attributed(&self) -> bool {
        self.id != NO_CONTAINER
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub hostname: String,
    pub os_distro: String,
    pub os_version: String,
    pub sample: ProcessSample,
    pub container: ContainerIdentity,
    pub timestamp: DateTime<Utc>,
}

// Collection error taxonomy

use std::fmt;

/// Which raw dataset a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Sessions,
    ProcessIo,
    ProcessMemCpu,
}

impl Dataset {
    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Sessions => "sessions",
            Dataset::ProcessIo => "process_io",
            Dataset::ProcessMemCpu => "process_mem_cpu",
        }
    }

    /// Operator-facing message used when the whole dataset failed.
    pub fn failure_message(self) -> &'static str {
        match self {
            Dataset::Sessions => "Error fetching logged-in users",
            Dataset::ProcessIo => "Error fetching process",
            Dataset::ProcessMemCpu => "Error fetching process with mem and cpu",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only `SourceUnavailable` fails a cycle; the rest are record-local and
/// degrade a single record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectError {
    #[error("{dataset} source unavailable: {reason}")]
    SourceUnavailable { dataset: Dataset, reason: String },

    #[error("no cgroup record for pid {pid}: {reason}")]
    NotFound { pid: u32, reason: String },

    #[error("container name lookup failed for {container_id}: {reason}")]
    LookupFailed {
        container_id: String,
        reason: String,
    },

    #[error("malformed {dataset} row ({reason}): {line:?}")]
    MalformedRow {
        dataset: Dataset,
        line: String,
        reason: String,
    },
}

impl CollectError {
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(self, CollectError::SourceUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, CollectError>;

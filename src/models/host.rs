// Static host identity

use serde::{Deserialize, Serialize};

/// Resolved once at startup and shared read-only between the pull endpoint
/// and the push worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostIdentity {
    pub hostname: String,
    /// Lowercased OS family without spaces (`linux`, `macos`, `windows`).
    pub os: String,
    /// Lowercased OS/kernel version without spaces.
    pub os_version: String,
}

impl HostIdentity {
    /// Builds an identity, normalizing `os` and `os_version` the way they are
    /// reported as tags (lowercase, no spaces).
    pub fn new(hostname: impl Into<String>, os: &str, os_version: &str) -> Self {
        Self {
            hostname: hostname.into(),
            os: normalize(os),
            os_version: normalize(os_version),
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase()
}

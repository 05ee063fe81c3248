// Host identity via sysinfo

use crate::models::HostIdentity;
use sysinfo::System;
use tracing::instrument;

const UNKNOWN_HOSTNAME: &str = "unknown";

/// Resolves hostname and OS family/version. Runs on a blocking thread since
/// sysinfo reads files and calls uname.
#[instrument(fields(repo = "host", operation = "get_host_identity"))]
pub async fn get_host_identity() -> anyhow::Result<HostIdentity> {
    tokio::task::spawn_blocking(|| -> anyhow::Result<HostIdentity> {
        let hostname = System::host_name().unwrap_or_else(|| {
            tracing::warn!("hostname unavailable, using {:?}", UNKNOWN_HOSTNAME);
            UNKNOWN_HOSTNAME.into()
        });
        let (os, os_version) = os_info(
            std::env::consts::OS,
            System::kernel_version(),
            System::os_version(),
        )?;
        Ok(HostIdentity::new(hostname.trim(), os, &os_version))
    })
    .await
    .map_err(|e| anyhow::anyhow!("host identity task join: {}", e))?
}

/// Linux reports the kernel release, macOS the product version, Windows
/// nothing.
fn os_info(
    family: &str,
    kernel_version: Option<String>,
    os_version: Option<String>,
) -> anyhow::Result<(&'static str, String)> {
    match family {
        "linux" => Ok(("linux", kernel_version.unwrap_or_default())),
        "macos" => Ok(("macOS", os_version.unwrap_or_default())),
        "windows" => Ok(("Windows", "N/A".into())),
        other => anyhow::bail!("unsupported OS: {}", other),
    }
}

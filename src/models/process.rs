// Per-process resource samples

/// Numeric payload of a process row. Exactly one shape is populated per row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleMetrics {
    /// I/O row where the source could not report swap/io shares.
    Io { read_kbps: f64, write_kbps: f64 },
    /// I/O row with swap-in and io-wait percentages.
    IoExtended {
        read_kbps: f64,
        write_kbps: f64,
        swapin_pct: f64,
        io_pct: f64,
    },
    /// CPU/memory row.
    MemCpu { cpu_percent: f64, vsz: f64, rss: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub user: String,
    pub command: String,
    pub metrics: SampleMetrics,
}

impl ProcessSample {
    /// Kernel threads and path-only names (`[kworker/0:1]`, `/sbin/init`,
    /// `<defunct>`) carry no useful ownership signal.
    pub fn is_excluded_command(command: &str) -> bool {
        command.starts_with(['[', '/', '<', '>'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_commands() {
        assert!(ProcessSample::is_excluded_command("[kworker/0:1]"));
        assert!(ProcessSample::is_excluded_command("/usr/lib/systemd/systemd"));
        assert!(ProcessSample::is_excluded_command("<defunct>"));
        assert!(ProcessSample::is_excluded_command(">weird"));
        assert!(!ProcessSample::is_excluded_command("bash -c foo"));
        assert!(!ProcessSample::is_excluded_command(""));
    }
}

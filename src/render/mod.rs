// Metric rendering: exposition text (pull) and points (push)

mod exposition;
mod points;

pub use exposition::render_exposition;
pub use points::{FieldValue, Point, build_points};

use crate::models::{HostIdentity, MetricRecord, SampleMetrics, SessionRecord};

/// Ordered tag set of one metric line.
pub type Tags = Vec<(&'static str, String)>;

fn host_tags(hostname: &str, os: &str, os_version: &str) -> Tags {
    vec![
        ("hostname", hostname.to_string()),
        ("os", os.to_string()),
        ("os_version", os_version.to_string()),
    ]
}

pub(crate) fn session_count_tags(host: &HostIdentity) -> Tags {
    host_tags(&host.hostname, &host.os, &host.os_version)
}

pub(crate) fn session_tags(host: &HostIdentity, session: &SessionRecord) -> Tags {
    let mut tags = session_count_tags(host);
    tags.extend([
        ("user", session.user.clone()),
        ("tty", session.tty.clone()),
        ("from", session.from.clone()),
        ("when", session.when.clone()),
        ("idle", session.idle_time.clone()),
        ("jcpu", session.jcpu_time.clone()),
        ("pcpu", session.pcpu_time.clone()),
        ("what", session.command.clone()),
    ]);
    tags
}

/// Extended I/O rows carry their swap/io shares as tags and only name the
/// container when one was attributed; every other row always carries the
/// container pair (no-container sentinel included).
pub(crate) fn record_tags(record: &MetricRecord) -> Tags {
    let mut tags = host_tags(&record.hostname, &record.os_distro, &record.os_version);
    tags.extend([
        ("process_id", record.sample.pid.to_string()),
        ("username", record.sample.user.clone()),
        ("command", record.sample.command.clone()),
    ]);
    let with_container = match record.sample.metrics {
        SampleMetrics::IoExtended {
            swapin_pct, io_pct, ..
        } => {
            tags.push(("swapin", format_value(swapin_pct)));
            tags.push(("io", format_value(io_pct)));
            record.container.is_attributed()
        }
        SampleMetrics::Io { .. } | SampleMetrics::MemCpu { .. } => true,
    };
    if with_container {
        tags.push(("container_name", record.container.name.clone()));
        tags.push(("container_id", record.container.id.clone()));
    }
    tags
}

/// Shortest round-trip form, with `.0` kept on integral values.
pub(crate) fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

// Prometheus text exposition

use std::fmt::Write;

use super::{Tags, format_value, record_tags, session_count_tags, session_tags};
use crate::models::{HostIdentity, MetricRecord, SampleMetrics, SessionTable};

struct ProcessFamily {
    name: &'static str,
    help: &'static str,
    value: fn(&SampleMetrics) -> Option<f64>,
}

const PROCESS_FAMILIES: &[ProcessFamily] = &[
    ProcessFamily {
        name: "process_read_in_KB",
        help: "Per-process disk read rate in KB/s.",
        value: read_kbps,
    },
    ProcessFamily {
        name: "process_write_in_KB",
        help: "Per-process disk write rate in KB/s.",
        value: write_kbps,
    },
    ProcessFamily {
        name: "process_swapin_percent",
        help: "Per-process share of time spent swapping in.",
        value: swapin_pct,
    },
    ProcessFamily {
        name: "process_io_percent",
        help: "Per-process share of time spent waiting on I/O.",
        value: io_pct,
    },
    ProcessFamily {
        name: "process_cpu_percent",
        help: "Per-process CPU usage in percent.",
        value: cpu_percent,
    },
    ProcessFamily {
        name: "process_vsz",
        help: "Per-process virtual memory size in KiB.",
        value: vsz,
    },
    ProcessFamily {
        name: "process_rss",
        help: "Per-process resident set size in KiB.",
        value: rss,
    },
];

fn read_kbps(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::Io { read_kbps, .. } | SampleMetrics::IoExtended { read_kbps, .. } => {
            Some(read_kbps)
        }
        SampleMetrics::MemCpu { .. } => None,
    }
}

fn write_kbps(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::Io { write_kbps, .. } | SampleMetrics::IoExtended { write_kbps, .. } => {
            Some(write_kbps)
        }
        SampleMetrics::MemCpu { .. } => None,
    }
}

fn swapin_pct(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::IoExtended { swapin_pct, .. } => Some(swapin_pct),
        _ => None,
    }
}

fn io_pct(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::IoExtended { io_pct, .. } => Some(io_pct),
        _ => None,
    }
}

fn cpu_percent(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::MemCpu { cpu_percent, .. } => Some(cpu_percent),
        _ => None,
    }
}

fn vsz(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::MemCpu { vsz, .. } => Some(vsz),
        _ => None,
    }
}

fn rss(m: &SampleMetrics) -> Option<f64> {
    match *m {
        SampleMetrics::MemCpu { rss, .. } => Some(rss),
        _ => None,
    }
}

/// Renders sessions followed by process records. Deterministic: families
/// appear in a fixed order and lines within a family follow input order.
pub fn render_exposition(
    host: &HostIdentity,
    sessions: &SessionTable,
    records: &[MetricRecord],
) -> String {
    let mut out = String::new();

    header(
        &mut out,
        "logged_in_users",
        "Number of currently logged-in users.",
    );
    line(
        &mut out,
        "logged_in_users",
        &session_count_tags(host),
        &sessions.user_count.to_string(),
    );

    header(&mut out, "logged_in_user", "List of currently logged-in users.");
    for session in &sessions.sessions {
        line(&mut out, "logged_in_user", &session_tags(host, session), "1");
    }

    for family in PROCESS_FAMILIES {
        let mut lines = records
            .iter()
            .filter_map(|r| (family.value)(&r.sample.metrics).map(|v| (r, v)))
            .peekable();
        if lines.peek().is_none() {
            continue;
        }
        header(&mut out, family.name, family.help);
        for (record, value) in lines {
            line(&mut out, family.name, &record_tags(record), &format_value(value));
        }
    }

    out
}

fn header(out: &mut String, name: &str, help: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} gauge", name);
}

fn line(out: &mut String, name: &str, tags: &Tags, value: &str) {
    out.push_str(name);
    out.push('{');
    for (i, (key, val)) in tags.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(key);
        out.push_str("=\"");
        escape_label_value(out, val);
        out.push('"');
    }
    out.push_str("} ");
    out.push_str(value);
    out.push('\n');
}

fn escape_label_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}

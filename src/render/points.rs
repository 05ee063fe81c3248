// Push points and InfluxDB line protocol encoding

use chrono::{DateTime, Utc};

use super::{Tags, record_tags, session_count_tags, session_tags};
use crate::models::{HostIdentity, MetricRecord, SampleMetrics, SessionTable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

/// One timestamped data point for the push sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: &'static str,
    pub tags: Tags,
    pub fields: Vec<(&'static str, FieldValue)>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    /// Encodes the point as one line-protocol line (no trailing newline).
    /// Tags with empty values are left out; line protocol has no empty tags.
    pub fn to_line_protocol(&self) -> String {
        let mut line = String::new();
        escape(&mut line, self.measurement, &[',', ' ']);
        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            escape(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape(&mut line, value, &[',', '=', ' ']);
        }
        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            escape(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            match value {
                FieldValue::Float(v) => line.push_str(&v.to_string()),
                FieldValue::Integer(v) => {
                    line.push_str(&v.to_string());
                    line.push('i');
                }
            }
        }
        line.push(' ');
        line.push_str(&self.timestamp.timestamp_nanos_opt().unwrap_or(0).to_string());
        line
    }
}

fn escape(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Builds the push points for one cycle. Either dataset may be empty when
/// its source failed.
pub fn build_points(
    host: &HostIdentity,
    sessions: Option<&SessionTable>,
    records: &[MetricRecord],
    now: DateTime<Utc>,
) -> Vec<Point> {
    let mut points = Vec::new();

    if let Some(sessions) = sessions {
        points.push(Point {
            measurement: "logged_in_users",
            tags: session_count_tags(host),
            fields: vec![("number_of_users", FieldValue::Integer(sessions.user_count))],
            timestamp: now,
        });
        for session in &sessions.sessions {
            points.push(Point {
                measurement: "logged_in_user",
                tags: session_tags(host, session),
                fields: vec![("logged_in", FieldValue::Integer(1))],
                timestamp: now,
            });
        }
    }

    for record in records {
        let (measurement, fields) = match record.sample.metrics {
            SampleMetrics::Io {
                read_kbps,
                write_kbps,
            } => (
                "process_read_write_in_KB",
                vec![
                    ("read", FieldValue::Float(read_kbps)),
                    ("write", FieldValue::Float(write_kbps)),
                ],
            ),
            SampleMetrics::IoExtended {
                read_kbps,
                write_kbps,
                swapin_pct,
                io_pct,
            } => (
                "process_read_write_in_KB",
                vec![
                    ("read", FieldValue::Float(read_kbps)),
                    ("write", FieldValue::Float(write_kbps)),
                    ("swapin", FieldValue::Float(swapin_pct)),
                    ("io", FieldValue::Float(io_pct)),
                ],
            ),
            SampleMetrics::MemCpu {
                cpu_percent,
                vsz,
                rss,
            } => (
                "process_mem_cpu",
                vec![
                    ("cpu_percent", FieldValue::Float(cpu_percent)),
                    ("vsz", FieldValue::Float(vsz)),
                    ("rss", FieldValue::Float(rss)),
                ],
            ),
        };
        points.push(Point {
            measurement,
            tags: record_tags(record),
            fields,
            timestamp: record.timestamp,
        });
    }

    points
}

// Row parsers for the raw sample text

use crate::error::{CollectError, Dataset, Result};
use crate::models::{SampleMetrics, SessionRecord, SessionTable};

/// Number of header lines the session listing starts with.
const SESSION_HEADER_LINES: usize = 2;

/// Marker the I/O source prints in the swap-in column when it cannot
/// account swap/io shares.
const IO_UNAVAILABLE: &str = "?unavailable?";

/// A process row before attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub user: String,
    pub command: String,
    pub metrics: SampleMetrics,
}

/// Parses the session listing. `user_count` is the raw line count minus the
/// two header lines, so a one-line listing reports `-1`. Malformed rows are
/// dropped but still counted.
pub fn parse_sessions(text: &str) -> SessionTable {
    let text = text.trim();
    if text.is_empty() {
        return SessionTable::default();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let user_count = lines.len() as i64 - SESSION_HEADER_LINES as i64;

    let sessions = lines
        .iter()
        .skip(SESSION_HEADER_LINES)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_session_row(line) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!(error = %e, "dropping session row");
                None
            }
        })
        .collect();

    SessionTable {
        user_count,
        sessions,
    }
}

fn parse_session_row(line: &str) -> Result<SessionRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 7 {
        return Err(malformed(Dataset::Sessions, line, "expected at least 7 fields"));
    }
    Ok(SessionRecord {
        user: fields[0].to_string(),
        tty: fields[1].to_string(),
        from: fields[2].to_string(),
        when: fields[3].to_string(),
        idle_time: fields[4].to_string(),
        jcpu_time: fields[5].to_string(),
        pcpu_time: fields[6].to_string(),
        command: fields[7..].join(" "),
    })
}

/// Splits raw process text into non-blank rows.
pub fn rows(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// Parses one I/O row:
/// `pid prio user read K/s write K/s swapin % io % command...` or, when the
/// source cannot report shares, `pid prio user read K/s write K/s ?unavailable? command...`.
pub fn parse_io_row(line: &str) -> Result<ProcessRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return Err(malformed(Dataset::ProcessIo, line, "expected at least 8 fields"));
    }
    let pid = parse_pid(Dataset::ProcessIo, line, fields[0])?;
    let read_kbps = number(fields[3]);
    let write_kbps = number(fields[5]);

    let (metrics, command) = if fields[7] == IO_UNAVAILABLE {
        (
            SampleMetrics::Io {
                read_kbps,
                write_kbps,
            },
            fields[8..].join(" "),
        )
    } else {
        if fields.len() < 11 {
            return Err(malformed(
                Dataset::ProcessIo,
                line,
                "expected at least 11 fields with swap/io columns",
            ));
        }
        (
            SampleMetrics::IoExtended {
                read_kbps,
                write_kbps,
                swapin_pct: number(fields[7]),
                io_pct: number(fields[9]),
            },
            fields[11..].join(" "),
        )
    };

    Ok(ProcessRow {
        pid,
        user: fields[2].to_string(),
        command,
        metrics,
    })
}

/// Parses one resource row: `user pid cpu% vsz rss command...`.
pub fn parse_mem_cpu_row(line: &str) -> Result<ProcessRow> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(malformed(
            Dataset::ProcessMemCpu,
            line,
            "expected at least 5 fields",
        ));
    }
    let pid = parse_pid(Dataset::ProcessMemCpu, line, fields[1])?;
    Ok(ProcessRow {
        pid,
        user: fields[0].to_string(),
        command: fields[5..].join(" "),
        metrics: SampleMetrics::MemCpu {
            cpu_percent: number(fields[2]),
            vsz: number(fields[3]),
            rss: number(fields[4]),
        },
    })
}

fn parse_pid(dataset: Dataset, line: &str, field: &str) -> Result<u32> {
    field
        .parse()
        .map_err(|_| malformed(dataset, line, "pid is not a number"))
}

/// Unparsable (or non-finite) values count as zero; the row itself is kept.
fn number(field: &str) -> f64 {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn malformed(dataset: Dataset, line: &str, reason: &str) -> CollectError {
    CollectError::MalformedRow {
        dataset,
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

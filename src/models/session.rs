// Logged-in session rows

/// One row of the session listing. Every column is kept as reported; no
/// times are parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user: String,
    pub tty: String,
    pub from: String,
    pub when: String,
    pub idle_time: String,
    pub jcpu_time: String,
    pub pcpu_time: String,
    pub command: String,
}

/// Parsed session listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTable {
    /// Raw line count minus the two header lines. Goes negative when the
    /// listing has fewer than two lines; kept as-is on purpose.
    pub user_count: i64,
    pub sessions: Vec<SessionRecord>,
}

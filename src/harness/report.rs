//! Per-scenario report entries and the sinks they flow into.
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pass,
    Fail,
    Skipped,
    NotRun,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Pass => "PASS",
            EntryStatus::Fail => "FAIL",
            EntryStatus::Skipped => "SKIPPED",
            EntryStatus::NotRun => "NOT RUN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub scenario: String,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub attempts: u32,
    pub elapsed_ms: u128,
}

impl ReportEntry {
    pub fn not_attempted(scenario: &str, status: EntryStatus, diagnostic: String) -> Self {
        ReportEntry {
            scenario: scenario.to_string(),
            status,
            diagnostic: Some(diagnostic),
            detail: None,
            attempts: 0,
            elapsed_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub skipped: usize,
    pub not_run: usize,
}

/// Ordered entries for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub counts: StatusCounts,
    pub entries: Vec<ReportEntry>,
}

impl RunReport {
    pub fn push(&mut self, entry: ReportEntry) {
        match entry.status {
            EntryStatus::Pass => self.counts.pass += 1,
            EntryStatus::Fail => self.counts.fail += 1,
            EntryStatus::Skipped => self.counts.skipped += 1,
            EntryStatus::NotRun => self.counts.not_run += 1,
        }
        self.entries.push(entry);
    }

    pub fn has_failures(&self) -> bool {
        self.counts.fail > 0
    }

    pub fn entry(&self, scenario: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|entry| entry.scenario == scenario)
    }
}

/// Receives entries in execution order as the run progresses.
pub trait ReportSink {
    fn record(&mut self, entry: &ReportEntry);
}

/// One line per scenario on the wrapped writer.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn record(&mut self, entry: &ReportEntry) {
        let mut line = format!("{:<8} {}", entry.status.as_str(), entry.scenario);
        if entry.attempts > 1 {
            line.push_str(&format!(" (attempts: {})", entry.attempts));
        }
        if let Some(text) = entry.diagnostic.as_ref().or(entry.detail.as_ref()) {
            line.push_str(": ");
            line.push_str(text);
        }
        // Console output is best effort; the JSON report carries the record.
        let _ = writeln!(self.out, "{line}");
    }
}

#[cfg(test)]
pub struct CollectingSink {
    pub entries: Vec<ReportEntry>,
}

#[cfg(test)]
impl ReportSink for CollectingSink {
    fn record(&mut self, entry: &ReportEntry) {
        self.entries.push(entry.clone());
    }
}

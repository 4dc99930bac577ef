//! Outcome of one import run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use sepolgraph_graph::GraphSummary;

/// A relationship row that was not written.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedRelationship {
    pub line: u64,
    pub subject: Option<String>,
    pub object: Option<String>,
    pub reason: String,
}

/// Counts and skips for a completed import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub data_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub subjects: usize,
    pub objects: usize,
    pub classes: usize,
    /// Relationship rows read from the CSV.
    pub relationships: usize,
    pub relationships_written: usize,
    pub skipped: Vec<SkippedRelationship>,
    /// Store-side counts after the import, if they could be queried.
    pub graph: Option<GraphSummary>,
}

impl ImportReport {
    /// True when every relationship row was written.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

//! Error types for the sepolgraph-import crate.

use std::path::PathBuf;

use thiserror::Error;

use sepolgraph_core::{CoreError, RecordKind};
use sepolgraph_graph::GraphError;

/// Errors from reading a CSV file.
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to read CSV file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error("{}:{line}: missing required column '{column}'", .path.display())]
    MissingColumn {
        path: PathBuf,
        line: u64,
        column: &'static str,
    },

    #[error("Neo4j connection failed: {0}")]
    Connection(#[source] GraphError),

    #[error("Schema setup failed: {0}")]
    Schema(#[source] GraphError),

    #[error("Failed to write {kind} records: {source}")]
    Write {
        kind: RecordKind,
        #[source]
        source: GraphError,
    },

    #[error(transparent)]
    Config(#[from] CoreError),
}

impl ImportError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportError::Config(_) => 2,
            ImportError::Csv(CsvError::FileNotFound { .. }) => 3,
            ImportError::Csv(CsvError::Read { .. }) | ImportError::MissingColumn { .. } => 4,
            ImportError::Connection(_) => 5,
            ImportError::Schema(_) | ImportError::Write { .. } => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_kind() {
        let not_found = ImportError::Csv(CsvError::FileNotFound {
            path: PathBuf::from("objects.csv"),
        });
        let missing = ImportError::MissingColumn {
            path: PathBuf::from("subjects.csv"),
            line: 2,
            column: "name",
        };
        let connection = ImportError::Connection(GraphError::Connection("refused".into()));
        let write = ImportError::Write {
            kind: RecordKind::Subject,
            source: GraphError::Connection("reset".into()),
        };

        assert_eq!(not_found.exit_code(), 3);
        assert_eq!(missing.exit_code(), 4);
        assert_eq!(connection.exit_code(), 5);
        assert_eq!(write.exit_code(), 6);
    }

    #[test]
    fn test_missing_column_message() {
        let err = ImportError::MissingColumn {
            path: PathBuf::from("data/subjects.csv"),
            line: 3,
            column: "name",
        };
        assert_eq!(
            err.to_string(),
            "data/subjects.csv:3: missing required column 'name'"
        );
    }
}

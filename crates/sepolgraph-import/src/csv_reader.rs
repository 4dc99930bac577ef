//! CSV parsing with list-column normalization.
//!
//! Every row becomes a [`Record`]: a mapping from header name to value.
//! The list columns (`attributes`, `permissions`, `conditions`) are split on
//! commas into ordered string lists; every other column is kept verbatim.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::CsvError;

/// Columns holding comma-separated lists.
pub const LIST_COLUMNS: [&str; 3] = ["attributes", "permissions", "conditions"];

/// Literal marker for an empty list.
pub const EMPTY_LIST_MARKER: &str = "[]";

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    List(Vec<String>),
}

/// One CSV row keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    line: u64,
    fields: BTreeMap<String, Field>,
}

impl Record {
    /// Line in the source file this row was read from (1-based).
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, column: &str) -> Option<&Field> {
        self.fields.get(column)
    }

    /// Value of a text column; `None` if the column is absent or a list.
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.fields.get(column)? {
            Field::Text(value) => Some(value),
            Field::List(_) => None,
        }
    }

    /// Value of a list column; `None` if the column is absent or text.
    pub fn list(&self, column: &str) -> Option<&[String]> {
        match self.fields.get(column)? {
            Field::List(items) => Some(items),
            Field::Text(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Read a headered CSV file into records, preserving row order.
///
/// A header-only file yields an empty vector. A row shorter than the header
/// yields a record without the trailing columns; a row longer than the
/// header is a read failure. Errors are logged with the file path before
/// being returned.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>, CsvError> {
    let path = path.as_ref();

    if !path.is_file() {
        tracing::error!(path = %path.display(), "CSV file not found");
        return Err(CsvError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    read_existing(path).map_err(|source| {
        tracing::error!(path = %path.display(), error = %source, "Failed to read CSV file");
        CsvError::Read {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn read_existing(path: &Path) -> Result<Vec<Record>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        if row.len() > headers.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {line}: record has {} fields, but the header has {}",
                    row.len(),
                    headers.len()
                ),
            )
            .into());
        }
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), parse_field(column, value)))
            .collect();
        records.push(Record { line, fields });
    }

    tracing::debug!(path = %path.display(), count = records.len(), "Read CSV file");
    Ok(records)
}

fn parse_field(column: &str, value: &str) -> Field {
    if LIST_COLUMNS.contains(&column) {
        Field::List(parse_list(value))
    } else {
        Field::Text(value.to_string())
    }
}

/// Split a list cell on commas and trim each item.
///
/// Empty items and duplicates are kept.
pub fn parse_list(value: &str) -> Vec<String> {
    if value.is_empty() || value == EMPTY_LIST_MARKER {
        return Vec::new();
    }
    value.split(',').map(|item| item.trim().to_string()).collect()
}

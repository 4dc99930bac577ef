//! Conversion from parsed CSV records to typed policy entities.
//!
//! Identity columns are required. Any other column absent from the file is
//! carried as `None` rather than synthesized.

use sepolgraph_core::{Allows, Class, Object, RecordKind, Subject};

use crate::csv_reader::Record;

/// Builds a typed entity from one CSV record.
pub trait FromRecord: Sized {
    const KIND: RecordKind;

    /// Convert a record; on failure returns the missing required column.
    fn from_record(record: &Record) -> Result<Self, &'static str>;
}

impl FromRecord for Subject {
    const KIND: RecordKind = RecordKind::Subject;

    fn from_record(record: &Record) -> Result<Self, &'static str> {
        Ok(Subject {
            name: required(record, "name")?,
            kind: text(record, "type"),
            domain: text(record, "domain"),
            attributes: list(record, "attributes"),
        })
    }
}

impl FromRecord for Object {
    const KIND: RecordKind = RecordKind::Object;

    fn from_record(record: &Record) -> Result<Self, &'static str> {
        Ok(Object {
            name: required(record, "name")?,
            kind: text(record, "type"),
            class: text(record, "class"),
            attributes: list(record, "attributes"),
        })
    }
}

impl FromRecord for Class {
    const KIND: RecordKind = RecordKind::Class;

    fn from_record(record: &Record) -> Result<Self, &'static str> {
        Ok(Class {
            name: required(record, "name")?,
            permissions: list(record, "permissions"),
            description: text(record, "description"),
        })
    }
}

impl FromRecord for Allows {
    const KIND: RecordKind = RecordKind::Relationship;

    fn from_record(record: &Record) -> Result<Self, &'static str> {
        Ok(Allows {
            subject: required(record, "subject_name")?,
            object: required(record, "object_name")?,
            permissions: list(record, "permissions"),
            conditions: list(record, "conditions"),
        })
    }
}

fn required(record: &Record, column: &'static str) -> Result<String, &'static str> {
    record.text(column).map(str::to_string).ok_or(column)
}

fn text(record: &Record, column: &str) -> Option<String> {
    record.text(column).map(str::to_string)
}

fn list(record: &Record, column: &str) -> Option<Vec<String>> {
    record.list(column).map(<[String]>::to_vec)
}

//! Core domain types for the SELinux policy graph.
//!
//! Nodes are identified by `name`. Non-key attributes are optional: a column
//! missing from the source file is carried as `None` and written as `null`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Node Types ────────────────────────────────────────────────────

/// A process or role principal (SELinux domain).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub domain: Option<String>,
    pub attributes: Option<Vec<String>>,
}

/// A resource governed by the policy (file, directory, socket, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Object {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub class: Option<String>,
    pub attributes: Option<Vec<String>>,
}

/// The permission vocabulary of a resource type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub permissions: Option<Vec<String>>,
    pub description: Option<String>,
}

// ── Edge Types ────────────────────────────────────────────────────

/// A granted access rule: `(Subject)-[:ALLOWS]->(Object)`.
///
/// Identified by the (subject, object) name pair; at most one ALLOWS edge
/// exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Allows {
    pub subject: String,
    pub object: String,
    pub permissions: Option<Vec<String>>,
    pub conditions: Option<Vec<String>>,
}

// ── Record Kinds ──────────────────────────────────────────────────

/// The four record kinds of an import run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Subject,
    Object,
    Class,
    Relationship,
}

impl RecordKind {
    /// Plural noun used in progress messages.
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Subject => "subjects",
            RecordKind::Object => "objects",
            RecordKind::Class => "classes",
            RecordKind::Relationship => "relationships",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Subject => "subject",
            RecordKind::Object => "object",
            RecordKind::Class => "class",
            RecordKind::Relationship => "relationship",
        };
        f.write_str(s)
    }
}

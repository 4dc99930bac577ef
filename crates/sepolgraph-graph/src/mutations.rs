//! Write operations for the policy graph.
//!
//! All mutations use MERGE (upsert) semantics so re-importing the same CSV
//! state is idempotent. Nodes are identified by `name`; ALLOWS edges by
//! their (subject, object) endpoints.

use neo4rs::{query, BoltMap, BoltNull, BoltType};

use sepolgraph_core::{Allows, Class, Object, Subject};

use crate::client::{GraphClient, GraphError};
use crate::store::Endpoint;

const UPSERT_SUBJECTS: &str = "UNWIND $rows AS row
     MERGE (s:Subject {name: row.name})
     SET s.type = row.type,
         s.domain = row.domain,
         s.attributes = row.attributes";

const UPSERT_OBJECTS: &str = "UNWIND $rows AS row
     MERGE (o:Object {name: row.name})
     SET o.type = row.type,
         o.class = row.class,
         o.attributes = row.attributes";

const UPSERT_CLASSES: &str = "UNWIND $rows AS row
     MERGE (c:Class {name: row.name})
     SET c.permissions = row.permissions,
         c.description = row.description";

// OPTIONAL MATCH keeps one result row even when an endpoint is absent, so the
// caller learns which side is missing instead of getting an empty result.
const UPSERT_ALLOWS: &str = "OPTIONAL MATCH (s:Subject {name: $subject_name})
     OPTIONAL MATCH (o:Object {name: $object_name})
     FOREACH (_ IN CASE WHEN s IS NOT NULL AND o IS NOT NULL THEN [1] ELSE [] END |
       MERGE (s)-[r:ALLOWS]->(o)
       SET r.permissions = $permissions,
           r.conditions = $conditions)
     RETURN s IS NOT NULL AS subject_found, o IS NOT NULL AS object_found";

impl GraphClient {
    // ── Node Upserts ─────────────────────────────────────────────

    /// Upsert all subjects in a single statement.
    pub async fn upsert_subject_batch(&self, subjects: &[Subject]) -> Result<(), GraphError> {
        let rows: Vec<BoltType> = subjects
            .iter()
            .map(|s| {
                row([
                    ("name", s.name.clone().into()),
                    ("type", opt(s.kind.clone())),
                    ("domain", opt(s.domain.clone())),
                    ("attributes", opt(s.attributes.clone())),
                ])
            })
            .collect();

        self.run(query(UPSERT_SUBJECTS).param("rows", rows)).await
    }

    /// Upsert all objects in a single statement.
    pub async fn upsert_object_batch(&self, objects: &[Object]) -> Result<(), GraphError> {
        let rows: Vec<BoltType> = objects
            .iter()
            .map(|o| {
                row([
                    ("name", o.name.clone().into()),
                    ("type", opt(o.kind.clone())),
                    ("class", opt(o.class.clone())),
                    ("attributes", opt(o.attributes.clone())),
                ])
            })
            .collect();

        self.run(query(UPSERT_OBJECTS).param("rows", rows)).await
    }

    /// Upsert all classes in a single statement.
    pub async fn upsert_class_batch(&self, classes: &[Class]) -> Result<(), GraphError> {
        let rows: Vec<BoltType> = classes
            .iter()
            .map(|c| {
                row([
                    ("name", c.name.clone().into()),
                    ("permissions", opt(c.permissions.clone())),
                    ("description", opt(c.description.clone())),
                ])
            })
            .collect();

        self.run(query(UPSERT_CLASSES).param("rows", rows)).await
    }

    // ── Edge Upserts ─────────────────────────────────────────────

    /// Upsert one ALLOWS edge between existing Subject and Object nodes.
    ///
    /// Returns [`GraphError::MissingEndpoint`] without writing anything when
    /// either node is absent.
    pub async fn upsert_allows_edge(&self, allows: &Allows) -> Result<(), GraphError> {
        let q = query(UPSERT_ALLOWS)
            .param("subject_name", allows.subject.clone())
            .param("object_name", allows.object.clone())
            .param("permissions", opt(allows.permissions.clone()))
            .param("conditions", opt(allows.conditions.clone()));

        let (subject_found, object_found) = match self.query_one(q).await? {
            Some(row) => (found(&row, "subject_found")?, found(&row, "object_found")?),
            None => (false, false),
        };

        match Endpoint::missing(subject_found, object_found) {
            Some(missing) => Err(GraphError::MissingEndpoint {
                subject: allows.subject.clone(),
                object: allows.object.clone(),
                missing,
            }),
            None => Ok(()),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Read an endpoint flag from the ALLOWS upsert result.
fn found(row: &neo4rs::Row, key: &str) -> Result<bool, GraphError> {
    row.get::<bool>(key)
        .map_err(|e| GraphError::Serialization(format!("Failed to read column {key}: {e}")))
}

/// Build an UNWIND row map.
fn row<const N: usize>(fields: [(&str, BoltType); N]) -> BoltType {
    let mut map = BoltMap::new();
    for (key, value) in fields {
        map.put(key.into(), value);
    }
    BoltType::Map(map)
}

/// Absent attributes are written as `null`, which removes the property.
fn opt<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    value.map(Into::into).unwrap_or(BoltType::Null(BoltNull))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltList, Row};

    fn endpoint_row(subject_found: BoltType, object_found: BoltType) -> Row {
        let fields = BoltList::from(vec![
            BoltType::from("subject_found"),
            BoltType::from("object_found"),
        ]);
        Row::new(fields, BoltList::from(vec![subject_found, object_found]))
    }

    #[test]
    fn test_found_reads_endpoint_flags() {
        let row = endpoint_row(BoltType::from(true), BoltType::from(false));
        assert!(found(&row, "subject_found").unwrap());
        assert!(!found(&row, "object_found").unwrap());
    }

    #[test]
    fn test_undecodable_flag_is_serialization_error() {
        let row = endpoint_row(BoltType::from("yes"), BoltType::from(true));
        let err = found(&row, "subject_found").unwrap_err();
        assert!(matches!(err, GraphError::Serialization(_)));

        let err = found(&row, "missing_column").unwrap_err();
        assert!(matches!(err, GraphError::Serialization(_)));
    }
}

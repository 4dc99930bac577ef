//! Read operations for the policy graph.

use neo4rs::{query, Row};
use serde::{Deserialize, Serialize};

use sepolgraph_core::{Allows, Class, Object, Subject};

use crate::client::{GraphClient, GraphError};

/// Node and edge counts after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub subjects: i64,
    pub objects: i64,
    pub classes: i64,
    pub allows: i64,
}

impl GraphClient {
    // ── Counts ───────────────────────────────────────────────────

    /// Count all nodes with a label.
    pub async fn count_nodes(&self, label: &str) -> Result<i64, GraphError> {
        let cypher = format!("MATCH (n:{label}) RETURN count(n) AS cnt");
        self.count(&cypher).await
    }

    /// Count all ALLOWS edges.
    pub async fn count_allows(&self) -> Result<i64, GraphError> {
        self.count("MATCH (:Subject)-[r:ALLOWS]->(:Object) RETURN count(r) AS cnt")
            .await
    }

    /// Node and edge counts for the whole policy graph.
    pub async fn graph_summary(&self) -> Result<GraphSummary, GraphError> {
        Ok(GraphSummary {
            subjects: self.count_nodes("Subject").await?,
            objects: self.count_nodes("Object").await?,
            classes: self.count_nodes("Class").await?,
            allows: self.count_allows().await?,
        })
    }

    async fn count(&self, cypher: &str) -> Result<i64, GraphError> {
        match self.query_one(query(cypher)).await? {
            Some(row) => field(&row, "cnt"),
            None => Ok(0),
        }
    }

    // ── Single Lookups ───────────────────────────────────────────

    /// Get a Subject by name.
    pub async fn get_subject(&self, name: &str) -> Result<Option<Subject>, GraphError> {
        let q = query(
            "MATCH (n:Subject {name: $name})
             RETURN n.name AS name, n.type AS type, n.domain AS domain,
                    n.attributes AS attributes",
        )
        .param("name", name.to_string());

        self.query_one(q)
            .await?
            .map(|row| -> Result<Subject, GraphError> {
                Ok(Subject {
                    name: field(&row, "name")?,
                    kind: field(&row, "type")?,
                    domain: field(&row, "domain")?,
                    attributes: field(&row, "attributes")?,
                })
            })
            .transpose()
    }

    /// Get an Object by name.
    pub async fn get_object(&self, name: &str) -> Result<Option<Object>, GraphError> {
        let q = query(
            "MATCH (n:Object {name: $name})
             RETURN n.name AS name, n.type AS type, n.class AS class,
                    n.attributes AS attributes",
        )
        .param("name", name.to_string());

        self.query_one(q)
            .await?
            .map(|row| -> Result<Object, GraphError> {
                Ok(Object {
                    name: field(&row, "name")?,
                    kind: field(&row, "type")?,
                    class: field(&row, "class")?,
                    attributes: field(&row, "attributes")?,
                })
            })
            .transpose()
    }

    /// Get a Class by name.
    pub async fn get_class(&self, name: &str) -> Result<Option<Class>, GraphError> {
        let q = query(
            "MATCH (n:Class {name: $name})
             RETURN n.name AS name, n.permissions AS permissions,
                    n.description AS description",
        )
        .param("name", name.to_string());

        self.query_one(q)
            .await?
            .map(|row| -> Result<Class, GraphError> {
                Ok(Class {
                    name: field(&row, "name")?,
                    permissions: field(&row, "permissions")?,
                    description: field(&row, "description")?,
                })
            })
            .transpose()
    }

    /// Get the ALLOWS edge between a subject and an object.
    pub async fn get_allows(
        &self,
        subject: &str,
        object: &str,
    ) -> Result<Option<Allows>, GraphError> {
        let q = query(
            "MATCH (:Subject {name: $subject})-[r:ALLOWS]->(:Object {name: $object})
             RETURN r.permissions AS permissions, r.conditions AS conditions",
        )
        .param("subject", subject.to_string())
        .param("object", object.to_string());

        self.query_one(q)
            .await?
            .map(|row| -> Result<Allows, GraphError> {
                Ok(Allows {
                    subject: subject.to_string(),
                    object: object.to_string(),
                    permissions: field(&row, "permissions")?,
                    conditions: field(&row, "conditions")?,
                })
            })
            .transpose()
    }
}

fn field<T: serde::de::DeserializeOwned>(row: &Row, key: &str) -> Result<T, GraphError> {
    row.get::<T>(key)
        .map_err(|e| GraphError::Serialization(format!("Failed to read column {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::{BoltList, BoltType};

    fn count_row(value: BoltType) -> Row {
        Row::new(
            BoltList::from(vec![BoltType::from("cnt")]),
            BoltList::from(vec![value]),
        )
    }

    #[test]
    fn test_field_reads_count() {
        let row = count_row(BoltType::from(3_i64));
        assert_eq!(field::<i64>(&row, "cnt").unwrap(), 3);
    }

    #[test]
    fn test_field_rejects_non_integer_count() {
        let row = count_row(BoltType::from("three"));
        let err = field::<i64>(&row, "cnt").unwrap_err();
        assert!(matches!(err, GraphError::Serialization(_)));
    }
}

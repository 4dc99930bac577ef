//! Neo4j schema initialization (constraints and indexes).
//!
//! Safe to run on every import: all statements use `IF NOT EXISTS`.

use neo4rs::Query;

use crate::client::{GraphClient, GraphError};

/// Uniqueness constraints on node identity.
pub const CONSTRAINT_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT subject_name IF NOT EXISTS FOR (s:Subject) REQUIRE s.name IS UNIQUE",
    "CREATE CONSTRAINT object_name IF NOT EXISTS FOR (o:Object) REQUIRE o.name IS UNIQUE",
    "CREATE CONSTRAINT class_name IF NOT EXISTS FOR (c:Class) REQUIRE c.name IS UNIQUE",
];

/// Lookup indexes for the common query filters.
pub const INDEX_STATEMENTS: &[&str] = &[
    "CREATE INDEX subject_type IF NOT EXISTS FOR (s:Subject) ON (s.type)",
    "CREATE INDEX object_type IF NOT EXISTS FOR (o:Object) ON (o.type)",
    "CREATE INDEX object_class IF NOT EXISTS FOR (o:Object) ON (o.class)",
];

impl GraphClient {
    /// Create uniqueness constraints on Subject, Object and Class names.
    pub async fn create_constraints(&self) -> Result<(), GraphError> {
        self.run_schema(CONSTRAINT_STATEMENTS).await?;
        tracing::info!(count = CONSTRAINT_STATEMENTS.len(), "Constraints created");
        Ok(())
    }

    /// Create lookup indexes.
    pub async fn create_indexes(&self) -> Result<(), GraphError> {
        self.run_schema(INDEX_STATEMENTS).await?;
        tracing::info!(count = INDEX_STATEMENTS.len(), "Indexes created");
        Ok(())
    }

    async fn run_schema(&self, statements: &[&str]) -> Result<(), GraphError> {
        for statement in statements {
            if let Err(e) = self.run(Query::new(statement.to_string())).await {
                tracing::error!(statement, error = %e, "Schema statement failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

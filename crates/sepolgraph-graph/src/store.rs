//! The store capability the import pipeline writes through.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use sepolgraph_core::{Allows, Class, Object, Subject};

use crate::client::{GraphClient, GraphError};
use crate::queries::GraphSummary;

/// Which side of an ALLOWS edge was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Subject,
    Object,
    Both,
}

impl Endpoint {
    /// `None` when both endpoints were found.
    pub fn missing(subject_found: bool, object_found: bool) -> Option<Self> {
        match (subject_found, object_found) {
            (true, true) => None,
            (false, true) => Some(Endpoint::Subject),
            (true, false) => Some(Endpoint::Object),
            (false, false) => Some(Endpoint::Both),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Subject => f.write_str("subject"),
            Endpoint::Object => f.write_str("object"),
            Endpoint::Both => f.write_str("subject and object"),
        }
    }
}

/// A graph store that accepts merge-by-identity upserts of policy records.
///
/// Node upserts locate-or-create by `name` and overwrite every non-key
/// attribute. Edge upserts require both endpoints to exist already.
/// The store is owned by one import run and released exactly once via
/// [`PolicyStore::close`].
#[async_trait]
pub trait PolicyStore: Send + Sync + Sized {
    /// Create uniqueness constraints on node identity.
    async fn create_constraints(&self) -> Result<(), GraphError>;

    /// Create lookup indexes.
    async fn create_indexes(&self) -> Result<(), GraphError>;

    /// Upsert all subjects as one batch.
    async fn upsert_subjects(&self, subjects: &[Subject]) -> Result<(), GraphError>;

    /// Upsert all objects as one batch.
    async fn upsert_objects(&self, objects: &[Object]) -> Result<(), GraphError>;

    /// Upsert all classes as one batch.
    async fn upsert_classes(&self, classes: &[Class]) -> Result<(), GraphError>;

    /// Upsert a single ALLOWS edge.
    ///
    /// Fails with [`GraphError::MissingEndpoint`] if either node is absent.
    async fn upsert_allows(&self, allows: &Allows) -> Result<(), GraphError>;

    /// Current node and edge counts.
    async fn summary(&self) -> Result<GraphSummary, GraphError>;

    /// Release the underlying connection.
    async fn close(self);
}

#[async_trait]
impl PolicyStore for GraphClient {
    async fn create_constraints(&self) -> Result<(), GraphError> {
        GraphClient::create_constraints(self).await
    }

    async fn create_indexes(&self) -> Result<(), GraphError> {
        GraphClient::create_indexes(self).await
    }

    async fn upsert_subjects(&self, subjects: &[Subject]) -> Result<(), GraphError> {
        self.upsert_subject_batch(subjects).await
    }

    async fn upsert_objects(&self, objects: &[Object]) -> Result<(), GraphError> {
        self.upsert_object_batch(objects).await
    }

    async fn upsert_classes(&self, classes: &[Class]) -> Result<(), GraphError> {
        self.upsert_class_batch(classes).await
    }

    async fn upsert_allows(&self, allows: &Allows) -> Result<(), GraphError> {
        self.upsert_allows_edge(allows).await
    }

    async fn summary(&self) -> Result<GraphSummary, GraphError> {
        self.graph_summary().await
    }

    async fn close(self) {
        self.shutdown();
    }
}

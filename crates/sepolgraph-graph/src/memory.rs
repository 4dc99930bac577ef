//! In-process policy store with the same merge semantics as Neo4j.
//!
//! Backs `--dry-run` imports and the loader tests. Cloning yields another
//! handle to the same state, the way two connections share one database, so
//! a caller can keep a handle for inspection after handing one to the loader.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sepolgraph_core::{Allows, Class, Object, RecordKind, Subject};

use crate::client::GraphError;
use crate::queries::GraphSummary;
use crate::store::{Endpoint, PolicyStore};

#[derive(Debug, Default)]
struct State {
    subjects: BTreeMap<String, Subject>,
    objects: BTreeMap<String, Object>,
    classes: BTreeMap<String, Class>,
    allows: BTreeMap<(String, String), Allows>,
    schema_created: bool,
    writes: usize,
    closes: usize,
    failing: HashSet<RecordKind>,
}

impl State {
    fn check(&self, kind: RecordKind) -> Result<(), GraphError> {
        if self.failing.contains(&kind) {
            return Err(GraphError::Connection(format!(
                "memory store rejected {kind} write"
            )));
        }
        Ok(())
    }
}

/// A [`PolicyStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write of `kind` fail with a connection error.
    pub async fn fail_on(&self, kind: RecordKind) {
        self.state.lock().await.failing.insert(kind);
    }

    pub async fn subject(&self, name: &str) -> Option<Subject> {
        self.state.lock().await.subjects.get(name).cloned()
    }

    pub async fn object(&self, name: &str) -> Option<Object> {
        self.state.lock().await.objects.get(name).cloned()
    }

    pub async fn class(&self, name: &str) -> Option<Class> {
        self.state.lock().await.classes.get(name).cloned()
    }

    pub async fn allows(&self, subject: &str, object: &str) -> Option<Allows> {
        self.state
            .lock()
            .await
            .allows
            .get(&(subject.to_string(), object.to_string()))
            .cloned()
    }

    /// Number of successful record writes (batches count once).
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    pub async fn schema_created(&self) -> bool {
        self.state.lock().await.schema_created
    }

    /// Number of handles released with [`PolicyStore::close`].
    pub async fn close_count(&self) -> usize {
        self.state.lock().await.closes
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn create_constraints(&self) -> Result<(), GraphError> {
        let mut state = self.state.lock().await;
        state.schema_created = true;
        Ok(())
    }

    async fn create_indexes(&self) -> Result<(), GraphError> {
        Ok(())
    }

    async fn upsert_subjects(&self, subjects: &[Subject]) -> Result<(), GraphError> {
        let mut state = self.state.lock().await;
        state.check(RecordKind::Subject)?;
        for subject in subjects {
            state.subjects.insert(subject.name.clone(), subject.clone());
        }
        state.writes += 1;
        Ok(())
    }

    async fn upsert_objects(&self, objects: &[Object]) -> Result<(), GraphError> {
        let mut state = self.state.lock().await;
        state.check(RecordKind::Object)?;
        for object in objects {
            state.objects.insert(object.name.clone(), object.clone());
        }
        state.writes += 1;
        Ok(())
    }

    async fn upsert_classes(&self, classes: &[Class]) -> Result<(), GraphError> {
        let mut state = self.state.lock().await;
        state.check(RecordKind::Class)?;
        for class in classes {
            state.classes.insert(class.name.clone(), class.clone());
        }
        state.writes += 1;
        Ok(())
    }

    async fn upsert_allows(&self, allows: &Allows) -> Result<(), GraphError> {
        let mut state = self.state.lock().await;
        state.check(RecordKind::Relationship)?;

        let subject_found = state.subjects.contains_key(&allows.subject);
        let object_found = state.objects.contains_key(&allows.object);
        if let Some(missing) = Endpoint::missing(subject_found, object_found) {
            return Err(GraphError::MissingEndpoint {
                subject: allows.subject.clone(),
                object: allows.object.clone(),
                missing,
            });
        }

        let key = (allows.subject.clone(), allows.object.clone());
        state.allows.insert(key, allows.clone());
        state.writes += 1;
        Ok(())
    }

    async fn summary(&self) -> Result<GraphSummary, GraphError> {
        let state = self.state.lock().await;
        Ok(GraphSummary {
            subjects: state.subjects.len() as i64,
            objects: state.objects.len() as i64,
            classes: state.classes.len() as i64,
            allows: state.allows.len() as i64,
        })
    }

    async fn close(self) {
        self.state.lock().await.closes += 1;
        tracing::debug!("Memory store handle closed");
    }
}

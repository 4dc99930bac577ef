//! sepolgraph-graph — Neo4j store for the SELinux policy graph.
//!
//! This crate is the single mutation point for the policy graph. All writes
//! flow through the [`PolicyStore`] trait, implemented by the Neo4j
//! [`GraphClient`] and by the in-process [`MemoryStore`].

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use memory::MemoryStore;
pub use queries::GraphSummary;
pub use store::{Endpoint, PolicyStore};

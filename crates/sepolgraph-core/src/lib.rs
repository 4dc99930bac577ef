//! sepolgraph-core: Shared types, configuration, and error handling for sepolgraph.
//!
//! This crate provides the foundational types used across all sepolgraph components:
//! - Node types (Subject, Object, Class) for the policy graph
//! - The ALLOWS relationship between subjects and objects
//! - Layered configuration (file, environment, defaults)
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{ImportSettings, Neo4jSettings, Settings};
pub use error::CoreError;
pub use types::{Allows, Class, Object, RecordKind, Subject};

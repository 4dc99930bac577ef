//! Configuration management for sepolgraph.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (SEPOLGRAPH_ prefix, `__` separator)
//! 2. Config file (sepolgraph.toml)
//! 3. Defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::CoreError;

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "SEPOLGRAPH";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub import: ImportSettings,
}

/// Neo4j connection settings (`[neo4j]` section).
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Import settings (`[import]` section).
///
/// The data directory is explicit so the loader can run against any
/// fixture directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportSettings {
    /// Directory holding the four CSV files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_subjects_file")]
    pub subjects_file: String,

    #[serde(default = "default_objects_file")]
    pub objects_file: String,

    #[serde(default = "default_classes_file")]
    pub classes_file: String,

    #[serde(default = "default_relationships_file")]
    pub relationships_file: String,

    /// Create uniqueness constraints and indexes before writing.
    #[serde(default = "default_true")]
    pub create_schema: bool,
}

impl ImportSettings {
    /// Settings rooted at `data_dir` with default file names.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn subjects_path(&self) -> PathBuf {
        self.data_dir.join(&self.subjects_file)
    }

    pub fn objects_path(&self) -> PathBuf {
        self.data_dir.join(&self.objects_file)
    }

    pub fn classes_path(&self) -> PathBuf {
        self.data_dir.join(&self.classes_file)
    }

    pub fn relationships_path(&self) -> PathBuf {
        self.data_dir.join(&self.relationships_file)
    }
}

impl Settings {
    /// Load settings from `<file_prefix>.toml` (optional) and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        tracing::debug!(
            uri = %settings.neo4j.uri,
            data_dir = %settings.import.data_dir.display(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Override the data directory (e.g. from a CLI flag).
    pub fn with_data_dir(mut self, data_dir: Option<&Path>) -> Self {
        if let Some(dir) = data_dir {
            self.import.data_dir = dir.to_path_buf();
        }
        self
    }
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_password() -> String {
    "selinux123".to_string()
}

fn default_max_connections() -> u32 {
    4
}

fn default_fetch_size() -> usize {
    256
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_subjects_file() -> String {
    "subjects.csv".to_string()
}

fn default_objects_file() -> String {
    "objects.csv".to_string()
}

fn default_classes_file() -> String {
    "classes.csv".to_string()
}

fn default_relationships_file() -> String {
    "relationships.csv".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: default_password(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            subjects_file: default_subjects_file(),
            objects_file: default_objects_file(),
            classes_file: default_classes_file(),
            relationships_file: default_relationships_file(),
            create_schema: default_true(),
        }
    }
}

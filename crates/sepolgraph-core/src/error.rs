use thiserror::Error;

/// Top-level error type for shared sepolgraph concerns.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

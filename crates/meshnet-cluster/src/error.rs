//! Error types for meshnet-cluster.

use thiserror::Error;

/// Result type for cluster operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while forming clusters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The formation request cannot produce a cluster
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value could not be read
    #[error("Config error: {0}")]
    Config(String),
}

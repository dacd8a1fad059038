//! Error types for the bootstrap pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bootstrap operations
pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Error type for bootstrap operations
///
/// Every variant aborts the whole generation pass. Artifacts produced before
/// the failure are discarded by the pipeline.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// No translation unit matched the requested file pattern
    #[error("translation unit not found: {0}")]
    UnitNotFound(String),

    /// A required class is missing from the declaration graph
    #[error("class '{name}' not found in {scope}")]
    ClassNotFound { scope: String, name: String },

    /// A required enumeration is missing from the declaration graph
    #[error("enum '{name}' not found in {scope}")]
    EnumNotFound { scope: String, name: String },

    /// An enum-valued member needs a first enumerator but the enum has none
    #[error("enum '{0}' has no items")]
    EmptyEnum(String),

    /// The declaration graph is structurally broken (dangling ids, base cycles)
    #[error("invalid declaration graph: {0}")]
    InvalidGraph(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading or writing an artifact failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl BootstrapError {
    /// Returns a stable numeric code for the error kind
    pub fn error_code(&self) -> u32 {
        match self {
            BootstrapError::UnitNotFound(_) => 1,
            BootstrapError::ClassNotFound { .. } => 2,
            BootstrapError::EnumNotFound { .. } => 3,
            BootstrapError::EmptyEnum(_) => 4,
            BootstrapError::InvalidGraph(_) => 5,
            BootstrapError::Config(_) => 6,
            BootstrapError::Io { .. } => 7,
            BootstrapError::Serialization(_) => 8,
        }
    }

    /// Whether the error comes from a failed lookup of a required anchor
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            BootstrapError::UnitNotFound(_)
                | BootstrapError::ClassNotFound { .. }
                | BootstrapError::EnumNotFound { .. }
        )
    }

    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BootstrapError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for BootstrapError {
    fn from(err: serde_json::Error) -> Self {
        BootstrapError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BootstrapError {
    fn from(err: toml::de::Error) -> Self {
        BootstrapError::Config(err.to_string())
    }
}

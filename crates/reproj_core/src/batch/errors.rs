//! Error types for a batch run.
//!
//! These are the fatal tier: any of them stops the run before a summary is
//! produced. Per-file engine failures never surface here; they become
//! `FileOutcome::Failed` entries instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;
use crate::models::{DatasetKind, SpatialRefError};

/// Fatal batch error.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Configuration rejected at construction.
    #[error("Invalid batch configuration: {0}")]
    InvalidConfig(String),

    /// Target coordinate system could not be read.
    #[error("Invalid target coordinate system: {0}")]
    InvalidTarget(#[from] SpatialRefError),

    /// Input folder is missing.
    #[error("Input folder not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input path exists but is not a folder.
    #[error("Input path is not a folder: {}", .0.display())]
    InputNotADirectory(PathBuf),

    /// Output folder could not be created.
    #[error("Failed to create output folder {}: {source}", .path.display())]
    OutputSetup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Listing datasets failed.
    #[error("Failed to list {kind} datasets: {source}")]
    Enumeration {
        kind: DatasetKind,
        #[source]
        source: EngineError,
    },

    /// The engine failed in a way that affects every remaining file.
    #[error("{kind} '{name}' stopped the run: {source}")]
    Engine {
        name: String,
        kind: DatasetKind,
        #[source]
        source: EngineError,
    },
}

impl BatchError {
    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an enumeration error.
    pub fn enumeration(kind: DatasetKind, source: EngineError) -> Self {
        Self::Enumeration { kind, source }
    }

    /// Create an engine error for a dataset.
    pub fn engine(name: impl Into<String>, kind: DatasetKind, source: EngineError) -> Self {
        Self::Engine {
            name: name.into(),
            kind,
            source,
        }
    }
}

/// Result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

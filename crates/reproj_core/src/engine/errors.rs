//! Error types for GIS engine operations.
//!
//! Only [`EngineError::Execution`] is recoverable: the tool ran and
//! reported that it could not process one dataset. Everything else means
//! the engine itself is unusable and the batch should stop.

use std::io;

use thiserror::Error;

/// Error from a GIS engine call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine ran and reported a failure for this dataset.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    Execution {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The engine could not be started at all.
    #[error("{tool} could not be started: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Engine output could not be understood.
    #[error("Failed to parse {what}: {message}")]
    Parse { what: String, message: String },
}

impl EngineError {
    /// Create an execution error.
    pub fn execution(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    /// Create a tool unavailable error.
    pub fn tool_unavailable(tool: impl Into<String>, source: io::Error) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            source,
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Whether the batch may record this as a per-file failure and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngineError::Execution { .. })
    }

    /// The engine's own diagnostic text.
    ///
    /// For execution failures this is the tool's message without the
    /// exit-code wrapper; otherwise the full error.
    pub fn diagnostic(&self) -> String {
        match self {
            EngineError::Execution { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

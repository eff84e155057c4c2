//! Error types for the gantry library.
//!
//! The streaming core (parser, session, applier, resolver, propagator) never
//! fails on the shape of its input: malformed lines are skipped and missing
//! dependencies are re-queued. Errors only surface at the boundaries, i.e.
//! JSON persistence, configuration and the engine's drain guard.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all gantry operations.
#[derive(Error, Debug)]
pub enum GanttError {
    /// Task or milestone not found for the given ID
    #[error("Task with ID '{id}' not found")]
    TaskNotFound { id: String },
    /// Section not found for the given name
    #[error("Section '{name}' not found")]
    SectionNotFound { name: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// A drain of the action queue is already running
    #[error("Action queue is already being drained")]
    DrainInProgress,
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> GanttError {
        GanttError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl GanttError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }
}

/// Result type alias for gantry operations
pub type Result<T> = std::result::Result<T, GanttError>;

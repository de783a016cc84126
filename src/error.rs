//! Error types for pgmeta
//!
//! This module defines all error types produced while dispatching and
//! answering meta-commands.

use std::time::Duration;
use thiserror::Error;

/// Boxed driver error carried by [`Error::QueryExecution`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for pgmeta
#[derive(Error, Debug)]
pub enum Error {
    // ========== Dispatch Errors ==========
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command {command} failed: {source}")]
    CommandExecution {
        command: String,
        #[source]
        source: Box<Error>,
    },

    // ========== Pattern Errors ==========
    #[error("Pattern error: unterminated quoted identifier in '{0}'")]
    PatternCompileAmbiguity(String),

    #[error("Pattern error: '{pattern}' is not a valid expression: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // ========== Catalog Errors ==========
    #[error("Did not find any relation named {0}")]
    ObjectNotFound(String),

    // ========== Query Errors ==========
    #[error("Query error in {label}: {source}")]
    QueryExecution {
        label: String,
        #[source]
        source: BoxError,
    },

    #[error("Query error in {label}: column {column} is not {expected}")]
    Decode {
        label: String,
        column: usize,
        expected: &'static str,
    },

    #[error("Query cancelled")]
    Cancelled,

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    // ========== Configuration Errors ==========
    #[error("Config error: {0}")]
    Config(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a driver error for the query named `label`
    pub fn query(label: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::QueryExecution {
            label: label.into(),
            source: source.into(),
        }
    }

    /// True when the input was recognized as a meta-command even though it failed
    pub fn is_special_command(&self) -> bool {
        matches!(
            self,
            Error::UnknownCommand(_) | Error::CommandExecution { .. }
        )
    }

    /// Innermost error, looking through [`Error::CommandExecution`]
    pub fn root(&self) -> &Error {
        match self {
            Error::CommandExecution { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for pgmeta operations
pub type Result<T> = std::result::Result<T, Error>;

//! Common error types for VMC
//!
//! Rule-based rejections (timeout limit, substitution limit, player not on
//! court) are NOT errors; they travel as [`crate::rules::RuleRejection`]
//! inside a successful [`crate::rules::Outcome`].

use thiserror::Error;

/// Common result type for VMC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across VMC crates
#[derive(Error, Debug)]
pub enum Error {
    /// Match code does not resolve to a stored document
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation is not valid for the current match state
    /// (negative score, tied set completion, finished match, missing set)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller passed an argument outside its domain (position index, code format)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Stored document changed since it was read, or the code is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Another update for the same match is still in flight
    #[error("Busy: {0}")]
    Busy(String),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Document (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::InvalidState(_) => "invalid_state",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Conflict(_) => "conflict",
            Error::Busy(_) => "busy",
            #[cfg(feature = "sqlx")]
            Error::Database(_) => "database",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
            Error::Config(_) => "config",
        }
    }
}

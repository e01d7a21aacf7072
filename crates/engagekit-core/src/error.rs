//! Error types for EngageKit
//!
//! This module defines all error types that can occur in the engagement
//! engine. We use the `thiserror` crate to make error definitions concise
//! and ergonomic.
//!
//! ## Design Philosophy
//!
//! - Errors should be descriptive and actionable
//! - Use strongly-typed errors (not just strings)
//! - Failures never abort the engine: a storage error fails the engine
//!   closed, a configuration error invalidates one feature

use thiserror::Error;

/// Result type alias for operations that can fail
///
/// Instead of writing `Result<T, Error>` everywhere, we can just write
/// `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors that can occur in EngageKit
///
/// Each variant represents a different category of error with relevant
/// context. The `#[error(...)]` attribute defines the display message.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage backend error (event store load or write)
    ///
    /// This is a catch-all for errors from the underlying storage layer.
    /// We wrap the original error to preserve context. A load error drives
    /// the engine into its fail-closed state.
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// Serialization/deserialization error
    ///
    /// Occurs when reading or writing the persisted event file.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid per-feature rule text
    ///
    /// The offending feature is marked invalid; every other feature loads
    /// independently.
    #[error("Invalid rule for feature '{feature}': {reason}")]
    InvalidRule { feature: String, reason: String },

    /// Invalid input from the host application
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error - this should rarely happen
    ///
    /// Used for unexpected errors that indicate a bug in our code.
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper implementations to make error creation more ergonomic

impl Error {
    /// Creates an InvalidRule error
    pub fn invalid_rule(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidInput error from a string
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates an Internal error from a string
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

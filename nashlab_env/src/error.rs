//! Error types for the nashlab simulator contract.

use thiserror::Error;

/// Errors that can occur at the simulator boundary.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// A configuration value has the wrong type or violates the caller contract
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// No simulator is registered under the requested id
    #[error("Unknown game: {0}")]
    UnknownGame(String),

    /// Result serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArenaError {
    /// Creates an invalid-parameter error.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown-game error.
    pub fn unknown_game(id: impl std::fmt::Display) -> Self {
        Self::UnknownGame(id.to_string())
    }
}

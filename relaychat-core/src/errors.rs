//! errors.rs - Custom error types for the relaychat-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `relaychat-core` library.
///
/// Marked `#[non_exhaustive]` so new variants can be added without a breaking change.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Failed to compile pattern for word rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Invalid sound key '{0}': {1}")]
    InvalidSoundKey(String, &'static str),

    #[error("Failed to dispatch notification to '{0}': {1}")]
    NotificationFailed(String, String),

    #[error("Configuration is invalid: {0}")]
    InvalidConfig(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}

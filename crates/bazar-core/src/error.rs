// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Bazar marketplace core.

use thiserror::Error;

/// The primary error type used across the Bazar workspace.
///
/// Entity-not-found is deliberately NOT an error variant: status-update
/// pipelines report it as a tagged outcome so callers can tell "nothing to
/// update" apart from real failures.
#[derive(Debug, Error)]
pub enum BazarError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Gateway/channel errors (bind failure, transport error, fan-out failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Token authentication failures (missing, malformed, bad signature, no subject).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

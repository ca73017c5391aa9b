//! Error types for Draftboard operations.
//!
//! This module provides the main error type [`DraftboardError`] which wraps
//! the error conditions a host can hit while feeding a canvas. Layout
//! failures are not among them: the layout engine recovers those itself.

use std::io;

use thiserror::Error;

/// The main error type for Draftboard operations.
///
/// # Diagnostic Variants
///
/// The `Payload` variant keeps the offending payload text next to the JSON
/// error so hosts can point at the exact line and column. Every payload
/// decoding failure surfaces through it.
#[derive(Debug, Error)]
pub enum DraftboardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed graph payload: {err}")]
    Payload { err: serde_json::Error, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DraftboardError {
    /// Create a new `Payload` error with the associated payload text.
    pub fn new_payload_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Payload {
            err,
            src: src.into(),
        }
    }
}

//! Error types for ripple.
//!
//! This module provides a unified error type [`RippleError`] for all ripple
//! operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! Errors are organized into the following categories:
//!
//! - **Malformed input**: unparseable aspect payloads or entity URNs; fatal to
//!   the single event, never to the pipeline
//! - **Transport**: graph or HTTP API failures; treated as "no propagation
//!   this round"
//! - **Configuration**: invalid settings detected at construction time
//! - **Contract**: an event of an unexpected kind reached a handler

use thiserror::Error;

/// Main error type for ripple operations.
#[derive(Error, Debug)]
pub enum RippleError {
    // Malformed input
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse urn: {0}")]
    UrnParse(String),

    // Transport and API errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Contract errors
    #[error("Contract violation: {0}")]
    ContractViolation(String),
}

impl RippleError {
    /// Check if the error is a transport-level failure, i.e. one that means
    /// "no propagation this round" rather than a bad event.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RippleError::Network(_) | RippleError::Transport(_) | RippleError::Deserialization(_)
        )
    }
}

/// Result type alias for ripple operations.
pub type Result<T> = std::result::Result<T, RippleError>;

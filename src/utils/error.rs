//! Error types for the stockpoll poller
//!
//! This module defines the transport and payload error types used throughout the application.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL or header
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Check if retrying on a later cycle may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while extracting data from a payload
#[derive(Error, Debug)]
pub enum ParseError {
    /// Expected marker substring absent from the payload
    #[error("Marker not found in payload: {marker}")]
    MarkerNotFound { marker: String },

    /// Embedded or API JSON could not be decoded
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field was missing from the payload
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL does not belong to any supported store
    #[error("Unsupported store URL: {0}")]
    UnsupportedSource(String),

    /// Numeric product key could not be found in a Tiki URL
    #[error("Failed to extract product key from URL: {0}")]
    ProductKeyNotFound(String),
}

impl ParseError {
    /// Shorthand for a missing marker
    pub fn marker(marker: impl Into<String>) -> Self {
        Self::MarkerNotFound {
            marker: marker.into(),
        }
    }
}

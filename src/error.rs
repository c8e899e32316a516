//! Unified error handling for the stockpoll crate
//!
//! This module provides a unified error type that consolidates the transport
//! and payload errors into a single `Error` enum, while keeping the
//! domain-specific errors usable on their own. Scheduler failures wrap this
//! type rather than the other way round.
//!
//! # Architecture
//!
//! - [`StockpollErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::scheduler::error::SchedulerError;
pub use crate::utils::error::{FetchError, ParseError};

/// Common trait for stockpoll error types
pub trait StockpollErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later poll may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Parsing and data extraction errors
    Parsing,
}

impl ErrorCategory {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
        }
    }
}

/// Unified error type for the stockpoll crate
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failures
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Malformed payloads
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl StockpollErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) => ErrorCategory::Parsing,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug)]
pub enum SchedulerError {
    /// An event action failed and unwound the run loop
    ActionFailed {
        label: String,
        source: Box<crate::error::Error>,
    },

    /// Run loop entered while already running
    AlreadyRunning,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionFailed { label, source } => {
                write!(f, "Event '{}' failed: {}", label, source)
            }
            Self::AlreadyRunning => write!(f, "Scheduler is already running"),
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ActionFailed { source, .. } => Some(source.as_ref()),
            Self::AlreadyRunning => None,
        }
    }
}

impl SchedulerError {
    /// Wrap an action failure
    pub fn action_failed(label: impl Into<String>, source: crate::error::Error) -> Self {
        Self::ActionFailed {
            label: label.into(),
            source: Box::new(source),
        }
    }
}

//! Error types for the EMS tracker.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, EmsTrackerError>;

/// Error type for tracker configuration and lookups
#[derive(Error, Debug)]
pub enum EmsTrackerError {
    /// A configuration value was rejected
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A tracking lookup failed (transport, malformed XML or an API error code)
    #[error("Track failed: {message}")]
    Track { message: String },
}

impl EmsTrackerError {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new tracking failure
    pub fn track(message: impl Into<String>) -> Self {
        Self::Track {
            message: message.into(),
        }
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            EmsTrackerError::InvalidArgument { message } | EmsTrackerError::Track { message } => {
                message
            }
        }
    }

    /// Check if this error was raised while configuring the tracker
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, EmsTrackerError::InvalidArgument { .. })
    }

    /// Check if this error was raised by a tracking lookup
    pub fn is_track_failure(&self) -> bool {
        matches!(self, EmsTrackerError::Track { .. })
    }
}

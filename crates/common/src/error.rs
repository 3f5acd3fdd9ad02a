//! Error types shared across ReelKit crates.

/// Top-level error type for ReelKit operations.
#[derive(Debug, thiserror::Error)]
pub enum ReelkitError {
    #[error("Source denied: {message}")]
    SourceDenied { message: String },

    #[error("No supported recording format: {message}")]
    NoSupportedFormat { message: String },

    #[error("No active session: {message}")]
    NoActiveSession { message: String },

    #[error("Session already active: {message}")]
    SessionAlreadyActive { message: String },

    #[error("Finalization error: {message}")]
    Finalization { message: String },

    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelkitError.
pub type ReelkitResult<T> = Result<T, ReelkitError>;

impl ReelkitError {
    pub fn source_denied(msg: impl Into<String>) -> Self {
        Self::SourceDenied {
            message: msg.into(),
        }
    }

    pub fn no_supported_format(msg: impl Into<String>) -> Self {
        Self::NoSupportedFormat {
            message: msg.into(),
        }
    }

    pub fn no_active_session(msg: impl Into<String>) -> Self {
        Self::NoActiveSession {
            message: msg.into(),
        }
    }

    pub fn session_already_active(msg: impl Into<String>) -> Self {
        Self::SessionAlreadyActive {
            message: msg.into(),
        }
    }

    pub fn finalization(msg: impl Into<String>) -> Self {
        Self::Finalization {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

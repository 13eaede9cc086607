//! Error types used throughout the client library

use thiserror::Error;

/// Coarse classification of [`RaitoError`] for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed configuration or failed tenant resolution
    Config,
    /// Identity provider rejected or could not complete authentication
    Authentication,
    /// Network failure reaching the identity provider or the API
    Transport,
    /// A list stream was terminated by its page loader or edge mapper
    Pagination,
    /// The remote API answered with a typed error variant
    Remote,
    /// Anything else the client could not interpret
    Client,
}

/// Main error type for the Raito client
#[derive(Error, Debug)]
pub enum RaitoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error calling {url:?}: {message}")]
    Transport { url: String, message: String },

    #[error("Page load failed: {0}")]
    PageLoad(#[source] Box<RaitoError>),

    #[error("Edge mapping failed: {0}")]
    Mapping(#[source] Box<RaitoError>),

    #[error("not able to find object {object_type:?} with id {id:?}: {message}")]
    NotFound { object_type: String, id: String, message: String },

    #[error("permission denied for {operation}: {message}")]
    PermissionDenied { operation: String, message: String },

    #[error("{object_type:?} already exists: {message}")]
    AlreadyExists { object_type: String, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid email address {email:?}: {message}")]
    InvalidEmail { email: String, message: String },

    #[error("client error: {0}")]
    Client(String),
}

impl RaitoError {
    /// Build a transport error carrying the target URL.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport { url: url.into(), message: message.into() }
    }

    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Config,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::PageLoad(_) | Self::Mapping(_) => ErrorCategory::Pagination,
            Self::NotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::AlreadyExists { .. }
            | Self::InvalidInput(_)
            | Self::InvalidEmail { .. } => ErrorCategory::Remote,
            Self::Client(_) => ErrorCategory::Client,
        }
    }

    /// Unwrap pagination wrappers down to the error the loader or mapper
    /// actually returned.
    #[must_use]
    pub fn root_cause(&self) -> &RaitoError {
        match self {
            Self::PageLoad(inner) | Self::Mapping(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Whether the remote API reported the object as missing
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), Self::NotFound { .. })
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, RaitoError>;

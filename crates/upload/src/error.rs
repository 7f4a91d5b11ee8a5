//! Error types for the upload client

use thiserror::Error;

/// Result type alias for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    /// Transport failure (connect, TLS, timeout, body)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The endpoint answered with a non-success status
    #[error("Upload rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, or a placeholder when unreadable
        message: String,
    },
}

impl UploadError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create a rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// HTTP status for rejections
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Config(_) | Self::MissingEnvVar(_) => None,
        }
    }

    /// Whether the request never got a response
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if (400..500).contains(status))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let err = UploadError::rejected(401, "bad token");
        assert_eq!(err.status(), Some(401));
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(!err.is_transport());

        let err = UploadError::rejected(503, "down");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_display() {
        let err = UploadError::rejected(413, "too large");
        assert_eq!(err.to_string(), "Upload rejected (413): too large");
        assert_eq!(UploadError::config("x").status(), None);
    }
}

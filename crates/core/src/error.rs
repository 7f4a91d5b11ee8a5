//! Errors with context and recovery suggestions
//!
//! Every error carries an [`ErrorCode`]. Configuration codes live in the
//! 3xxx range so the binary can map them to their own exit code.

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorCode {
    // Input errors (2xxx)
    FileNotFound = 2001,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    InvalidConfigValue = 3004,
}

impl ErrorCode {
    /// Get the numeric code
    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether the error comes from configuration loading or validation
    #[must_use]
    pub fn is_config(&self) -> bool {
        self.code.code() / 1000 == 3
    }

    /// A path given on the command line does not exist
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("No such file or directory: {}", path.as_ref().display()),
        )
        .with_suggestion("Pass image files or directories that contain them")
    }

    /// Generic configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Explicitly requested configuration file does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create an .image-intake.toml file or use --config to specify a path")
    }

    /// A configuration value is out of range
    pub fn invalid_config_value(key: &str, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidConfigValue,
            format!("Invalid value for {key}: {}", reason.into()),
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const CONFIG_ERROR: i32 = 3;
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::ConfigParseError.to_string(), "E3002");
    }

    #[test]
    fn test_missing_file_is_not_a_config_error() {
        let err = Error::file_not_found("/photos/cat.png");

        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(err.suggestion.is_some());
        assert!(!err.is_config());
        assert!(err.to_string().contains("/photos/cat.png"));
    }

    #[test]
    fn test_config_errors_are_flagged() {
        assert!(Error::config("bad threshold").is_config());
        assert!(Error::config_not_found("x.toml").is_config());
        assert!(Error::invalid_config_value("upload.endpoint", "empty").is_config());
    }

    #[test]
    fn test_context_is_displayed() {
        let result: Result<()> = Err(Error::config("bad threshold"));
        let err = result.context("While loading configuration").unwrap_err();

        let text = err.to_string();
        assert!(text.starts_with("[E3000] bad threshold"));
        assert!(text.contains("Context: While loading configuration"));
    }
}

//! Configuration for the upload client
//!
//! Built from the shared settings file, from environment variables, or with
//! the builder methods.

use crate::error::{UploadError, UploadResult};
use intake_core::config::{DEFAULT_UPLOAD_URL, ENV_UPLOAD_TOKEN, ENV_UPLOAD_URL, UploadSettings};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Multipart field carrying the image bytes
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the type tag
pub const TYPE_FIELD: &str = "type";

/// Type tag sent with every upload
pub const TYPE_TAG: &str = "img";

/// Upload client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Full URL the multipart body is posted to
    pub endpoint: String,
    /// Bearer token, sent as `Authorization: Bearer <token>`
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPLOAD_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<&UploadSettings> for UploadConfig {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            token: settings.token.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl UploadConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `IMAGE_INTAKE_UPLOAD_URL`: endpoint (optional, defaults to the
    ///   built-in endpoint)
    /// - `IMAGE_INTAKE_UPLOAD_TOKEN`: bearer token (required)
    /// - `IMAGE_INTAKE_UPLOAD_TIMEOUT_SECS`: request timeout in seconds
    pub fn from_env() -> UploadResult<Self> {
        let endpoint = env::var(ENV_UPLOAD_URL).unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string());
        let token = env::var(ENV_UPLOAD_TOKEN).map_err(|_| UploadError::missing_env(ENV_UPLOAD_TOKEN))?;
        let timeout = env::var("IMAGE_INTAKE_UPLOAD_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map_or(Duration::from_secs(30), Duration::from_secs);

        Ok(Self {
            endpoint,
            token: Some(token),
            timeout,
        })
    }

    /// Builder-style method to set the endpoint
    #[must_use]
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    /// Builder-style method to set the bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> UploadResult<()> {
        if self.endpoint.is_empty() {
            return Err(UploadError::config("endpoint cannot be empty"));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(UploadError::config("endpoint must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(UploadError::config("timeout cannot be zero"));
        }

        if self.token.as_deref().is_some_and(str::is_empty) {
            return Err(UploadError::config("token cannot be empty"));
        }

        Ok(())
    }
}

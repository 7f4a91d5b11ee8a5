//! Upload client implementation

use crate::config::{FILE_FIELD, TYPE_FIELD, TYPE_TAG, UploadConfig};
use crate::error::{UploadError, UploadResult};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Outcome of an accepted upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    /// HTTP status returned by the endpoint
    pub status: u16,
    /// Correlation id sent with the request
    pub request_id: String,
    /// Response body, `null` when it was not JSON
    pub body: serde_json::Value,
    /// Wall time of the request
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Multipart upload client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct UploadClient {
    inner: Client,
    config: Arc<UploadConfig>,
}

impl UploadClient {
    /// Create a client configured from environment variables
    pub fn new() -> UploadResult<Self> {
        Self::with_config(UploadConfig::from_env()?)
    }

    /// Create a client with specific configuration
    pub fn with_config(config: UploadConfig) -> UploadResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("image-intake/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(ref token) = config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| UploadError::config("token contains characters not allowed in a header"))?;
            default_headers.insert(AUTHORIZATION, value);
        }

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Get the endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Post one encoded image as `multipart/form-data`.
    ///
    /// The body has a `file` part carrying `bytes` under `file_name` with
    /// `mime` as its content type, and a `type` part with the value `img`.
    /// Any 2xx status is success; everything else is an
    /// [`UploadError::Rejected`].
    #[instrument(skip(self, bytes), fields(size = bytes.len(), request_id))]
    pub async fn upload(&self, file_name: &str, mime: &str, bytes: Vec<u8>) -> UploadResult<UploadReceipt> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(TYPE_FIELD, TYPE_TAG);

        debug!(endpoint = %self.config.endpoint, "Sending upload");
        let start = Instant::now();

        let response = self
            .inner
            .post(&self.config.endpoint)
            .header(X_REQUEST_ID, &request_id)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "Upload request failed"))?;

        let status = response.status();
        let elapsed = start.elapsed();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), elapsed_ms = elapsed.as_millis(), "Upload rejected");
            return Err(UploadError::rejected(status.as_u16(), message));
        }

        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);

        info!(status = status.as_u16(), elapsed_ms = elapsed.as_millis(), "Upload accepted");

        Ok(UploadReceipt {
            status: status.as_u16(),
            request_id,
            body,
            elapsed,
        })
    }
}

impl std::fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadClient")
            .field("endpoint", &self.config.endpoint)
            .field("has_token", &self.config.token.is_some())
            .finish_non_exhaustive()
    }
}

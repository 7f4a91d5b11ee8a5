//! Error types for the intake pipeline

use intake_image::ImageError;
use intake_upload::UploadError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, WidgetError>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum WidgetError {
    /// The bytes are not a decodable image
    #[error("Failed to decode {file}: {reason}")]
    DecodeFailure {
        /// File name
        file: String,
        /// Decoder message
        reason: String,
    },

    /// The decoder did not finish in time
    #[error("Decoding {file} timed out after {}s", timeout.as_secs_f32())]
    DecodeTimeout {
        /// File name
        file: String,
        /// Configured limit
        timeout: Duration,
    },

    /// Encoding or quality errors
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Writing the artifact to disk failed
    #[error("Failed to save {}: {source}", path.display())]
    Save {
        /// Target path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Sending the artifact failed
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A newer selection replaced this batch
    #[error("Batch {0} was superseded")]
    Superseded(u64),

    /// A background task panicked or was aborted
    #[error("Background task failed: {0}")]
    Task(String),

    /// Settings the pipeline cannot run with
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WidgetError {
    /// Whether the file itself could not be turned into a bitmap
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        match self {
            Self::DecodeFailure { .. } | Self::DecodeTimeout { .. } => true,
            Self::Image(e) => e.is_decode_failure(),
            _ => false,
        }
    }
}

impl From<tokio::task::JoinError> for WidgetError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

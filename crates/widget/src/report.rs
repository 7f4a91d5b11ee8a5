//! What a finished batch produced.

use intake_image::{Attempt, Classification, Dimensions, Preview, Quality, ThresholdStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Result of one batch, one entry per selected file in selection order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: u64,
    /// A newer selection replaced this batch before it finished
    pub superseded: bool,
    pub dimensions: HashMap<String, Dimensions>,
    pub files: Vec<FileReport>,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl BatchReport {
    /// Files that produced an artifact.
    pub fn encoded_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Encoded { .. }))
    }

    /// Files outside the accepted set.
    pub fn rejected_count(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Rejected))
    }

    /// Files that failed to decode, encode or save.
    pub fn failed_count(&self) -> usize {
        self.count(FileOutcome::is_failure)
    }

    /// Whether any file failed to decode, encode or save.
    ///
    /// Upload failures do not count.
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| predicate(&f.outcome)).count()
    }
}

/// Result for one selected file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    pub size_bytes: usize,
    pub classification: Classification,
    /// Probed dimensions, for probe-eligible files that decoded
    pub dimensions: Option<Dimensions>,
    pub outcome: FileOutcome,
}

/// What happened to one file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Declared type outside the accepted set
    Rejected,
    /// Re-encoded and handed to the sinks
    Encoded {
        download_name: String,
        quality: Quality,
        size_bytes: usize,
        status: ThresholdStatus,
        attempts: Vec<Attempt>,
        #[serde(skip_serializing_if = "Option::is_none")]
        preview: Option<Preview>,
        saved: SaveOutcome,
        upload: UploadOutcome,
    },
    /// The bytes could not be decoded in time or at all
    DecodeFailed { reason: String },
    /// Encoding failed for another reason
    Failed { reason: String },
    /// A newer selection replaced the batch; sinks were skipped
    Superseded,
}

impl FileOutcome {
    /// Decode, encode or save failure.
    pub fn is_failure(&self) -> bool {
        match self {
            Self::DecodeFailed { .. } | Self::Failed { .. } => true,
            Self::Encoded { saved, .. } => matches!(saved, SaveOutcome::Failed { .. }),
            Self::Rejected | Self::Superseded => false,
        }
    }
}

/// Local save result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { path: PathBuf },
    Failed { error: String },
}

/// Upload result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded {
        status: u16,
        request_id: String,
        body: serde_json::Value,
    },
    Failed { status: Option<u16>, error: String },
    /// Uploads are disabled
    Skipped,
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

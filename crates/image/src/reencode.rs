//! Size-constrained JPEG re-encoding.
//!
//! The quality search walks a [`QualitySchedule`] from 1.0 downwards and stops
//! at the first attempt whose output fits under the byte threshold. When the
//! floor is reached first, the lowest-quality attempt is returned flagged
//! [`ThresholdStatus::NotMet`]. The number of attempts is bounded by the
//! schedule, so the search always terminates.

use crate::encode::{JpegSurfaceEncoder, SurfaceEncoder};
use crate::quality::{Quality, QualitySchedule};
use crate::surface::Surface;
use crate::{ImageError, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Default size threshold: 1 MiB.
pub const DEFAULT_THRESHOLD_BYTES: usize = 1024 * 1024;

/// Whether the final artifact fits under the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStatus {
    /// Output size <= threshold
    Met,
    /// The floor was reached while still over the threshold
    NotMet,
    /// The caller ended the search before the threshold or the floor
    Stopped,
}

/// One serialization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attempt {
    /// Quality the surface was encoded at
    pub quality: Quality,
    /// Output size in bytes
    pub size_bytes: usize,
}

/// The bytes produced by the last attempt of a search.
#[derive(Debug, Clone, Serialize)]
pub struct EncodedArtifact {
    #[serde(skip)]
    bytes: Vec<u8>,
    mime_type: &'static str,
    quality: Quality,
    status: ThresholdStatus,
    attempts: Vec<Attempt>,
}

impl EncodedArtifact {
    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact and take its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// MIME type of the bytes.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Quality of the final attempt.
    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Whether the threshold was met.
    pub fn status(&self) -> ThresholdStatus {
        self.status
    }

    /// Shorthand for `status() == ThresholdStatus::Met`.
    pub fn threshold_met(&self) -> bool {
        self.status == ThresholdStatus::Met
    }

    /// Every attempt in the order it was made.
    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }
}

/// Runs the quality search with a given encoder.
#[derive(Debug, Clone)]
pub struct Reencoder<E = JpegSurfaceEncoder> {
    encoder: E,
    schedule: QualitySchedule,
    threshold_bytes: usize,
}

impl Default for Reencoder<JpegSurfaceEncoder> {
    fn default() -> Self {
        Self::new(JpegSurfaceEncoder)
    }
}

impl<E: SurfaceEncoder> Reencoder<E> {
    /// A re-encoder with the default schedule and 1 MiB threshold.
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            schedule: QualitySchedule::default(),
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
        }
    }

    /// Use a different quality schedule.
    #[must_use]
    pub fn with_schedule(mut self, schedule: QualitySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Use a different size threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold_bytes: usize) -> Self {
        self.threshold_bytes = threshold_bytes;
        self
    }

    /// The configured threshold in bytes.
    pub fn threshold_bytes(&self) -> usize {
        self.threshold_bytes
    }

    /// The configured schedule.
    pub fn schedule(&self) -> &QualitySchedule {
        &self.schedule
    }

    /// Search for the highest quality whose output fits under the threshold.
    pub fn reencode(&self, surface: &Surface) -> Result<EncodedArtifact> {
        self.reencode_while(surface, || true)
    }

    /// Like [`Reencoder::reencode`], checking `keep_going` before each attempt
    /// after the first. A stopped search returns its last attempt as
    /// [`ThresholdStatus::Stopped`].
    pub fn reencode_while(
        &self,
        surface: &Surface,
        mut keep_going: impl FnMut() -> bool,
    ) -> Result<EncodedArtifact> {
        let mut attempts = Vec::new();
        let mut last: Option<(Quality, Vec<u8>)> = None;

        for quality in self.schedule.levels() {
            if last.is_some() && !keep_going() {
                let (quality, bytes) = last.ok_or(ImageError::Cancelled)?;
                debug!(quality = %quality, "Quality search stopped early");
                return Ok(self.artifact(bytes, quality, ThresholdStatus::Stopped, attempts));
            }

            let bytes = self.encoder.encode(surface, quality)?;
            let size_bytes = bytes.len();
            attempts.push(Attempt { quality, size_bytes });
            debug!(
                quality = %quality,
                size_bytes,
                threshold_bytes = self.threshold_bytes,
                "Encoded attempt"
            );

            if size_bytes <= self.threshold_bytes {
                return Ok(self.artifact(bytes, quality, ThresholdStatus::Met, attempts));
            }
            last = Some((quality, bytes));
        }

        let (quality, bytes) = last.ok_or(ImageError::Cancelled)?;
        warn!(
            quality = %quality,
            size_bytes = bytes.len(),
            threshold_bytes = self.threshold_bytes,
            "Could not meet size threshold, keeping lowest-quality attempt"
        );
        Ok(self.artifact(bytes, quality, ThresholdStatus::NotMet, attempts))
    }

    fn artifact(
        &self,
        bytes: Vec<u8>,
        quality: Quality,
        status: ThresholdStatus,
        attempts: Vec<Attempt>,
    ) -> EncodedArtifact {
        EncodedArtifact {
            bytes,
            mime_type: self.encoder.mime_type(),
            quality,
            status,
            attempts,
        }
    }
}

/// File name a saved artifact gets: the original name with its extension
/// replaced by `.jpeg`.
///
/// ```
/// use intake_image::download_name;
///
/// assert_eq!(download_name("holiday.webp"), "holiday.jpeg");
/// assert_eq!(download_name("archive.tar.png"), "archive.tar.jpeg");
/// assert_eq!(download_name("README"), "README.jpeg");
/// ```
pub fn download_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());

    format!("{stem}.jpeg")
}

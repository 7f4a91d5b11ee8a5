//! Dimension probing off the async executor.

use crate::error::{Result, WidgetError};
use image::DynamicImage;
use intake_image::{Dimensions, ImageDecoder, SelectedFile};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Default limit for one decode.
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs an [`ImageDecoder`] on the blocking pool with a time limit.
///
/// A timed-out decode keeps its blocking thread until the codec returns;
/// only the caller stops waiting.
#[derive(Clone)]
pub struct BlockingDecoder {
    decoder: Arc<dyn ImageDecoder>,
    timeout: Duration,
}

impl BlockingDecoder {
    /// Wrap a decoder with a per-call time limit.
    pub fn new(decoder: Arc<dyn ImageDecoder>, timeout: Duration) -> Self {
        Self { decoder, timeout }
    }

    /// The per-call time limit.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Decode a file into a bitmap.
    pub async fn decode(&self, file: &SelectedFile) -> Result<DynamicImage> {
        let decoder = Arc::clone(&self.decoder);
        let data = file.shared_data();
        self.run(file, move || decoder.decode(&data)).await
    }

    /// Pixel dimensions of a file.
    pub async fn dimensions(&self, file: &SelectedFile) -> Result<Dimensions> {
        let decoder = Arc::clone(&self.decoder);
        let data = file.shared_data();
        self.run(file, move || decoder.probe_dimensions(&data)).await
    }

    async fn run<T: Send + 'static>(
        &self,
        file: &SelectedFile,
        job: impl FnOnce() -> intake_image::Result<T> + Send + 'static,
    ) -> Result<T> {
        let handle = tokio::task::spawn_blocking(job);

        match tokio::time::timeout(self.timeout, handle).await {
            Err(_) => Err(WidgetError::DecodeTimeout {
                file: file.name().to_string(),
                timeout: self.timeout,
            }),
            Ok(joined) => joined?.map_err(|e| {
                if e.is_decode_failure() {
                    WidgetError::DecodeFailure {
                        file: file.name().to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    WidgetError::Image(e)
                }
            }),
        }
    }
}

impl std::fmt::Debug for BlockingDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingDecoder")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Probed dimensions of one batch, keyed by file name.
///
/// Entries are only ever added. When two files share a name, the probe that
/// finishes last wins.
#[derive(Debug, Clone, Default)]
pub struct DimensionResults {
    inner: Arc<RwLock<HashMap<String, Dimensions>>>,
}

impl DimensionResults {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one result.
    pub fn insert(&self, name: impl Into<String>, dimensions: Dimensions) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), dimensions);
    }

    /// Dimensions recorded for `name`.
    pub fn get(&self, name: &str) -> Option<Dimensions> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    /// Number of recorded files.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> HashMap<String, Dimensions> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Serialize for DimensionResults {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

/// Probes dimensions of probe-eligible files.
#[derive(Debug, Clone)]
pub struct DimensionProber {
    decoder: BlockingDecoder,
}

impl DimensionProber {
    /// A prober using `decoder`.
    pub fn new(decoder: BlockingDecoder) -> Self {
        Self { decoder }
    }

    /// Decode `file` and report its intrinsic width and height.
    pub async fn probe_dimensions(&self, file: &SelectedFile) -> Result<Dimensions> {
        let dimensions = self.decoder.dimensions(file).await?;
        debug!(file = %file.name(), %dimensions, "Probed dimensions");
        Ok(dimensions)
    }

    /// Probe `file` and merge the result into `results`.
    ///
    /// Failures are logged and leave the map untouched.
    pub async fn probe_into(&self, file: &SelectedFile, results: &DimensionResults) {
        match self.probe_dimensions(file).await {
            Ok(dimensions) => results.insert(file.name(), dimensions),
            Err(e) => warn!(file = %file.name(), error = %e, "Dimension probe failed"),
        }
    }
}

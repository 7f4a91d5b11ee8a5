//! The one-shot batch pipeline.
//!
//! A selection runs exactly once: classify every file, probe the
//! probe-eligible ones in the background, re-encode each accepted file and
//! hand the result to both sinks. Probing and re-encoding run independently
//! of each other.

use crate::error::{Result, WidgetError};
use crate::probe::{BlockingDecoder, DEFAULT_DECODE_TIMEOUT, DimensionProber, DimensionResults};
use crate::reencode::FileReencoder;
use crate::report::{BatchReport, FileOutcome, FileReport, SaveOutcome, UploadOutcome};
use crate::sink::{SaveSink, UploadSink};
use crate::token::{BatchSequence, BatchToken};
use intake_core::config::ConfigSchema;
use intake_image::{
    CodecDecoder, DEFAULT_THRESHOLD_BYTES, ImageDecoder, JpegSurfaceEncoder, QualitySchedule,
    Reencoder, SelectedFile, SurfaceEncoder, classify, download_name,
};
use intake_telemetry::{metrics, names};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Largest acceptable artifact in bytes
    pub threshold_bytes: usize,
    /// Quality levels to try
    pub schedule: QualitySchedule,
    /// Limit for one decode
    pub decode_timeout: Duration,
    /// Re-encodes running at the same time
    pub max_concurrency: usize,
    /// Render a thumbnail of this height for every encoded file
    pub preview_height: Option<u32>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            schedule: QualitySchedule::default(),
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
            max_concurrency: 4,
            preview_height: None,
        }
    }
}

impl WidgetConfig {
    /// Settings from a loaded configuration file.
    pub fn from_schema(schema: &ConfigSchema) -> Result<Self> {
        let schedule = QualitySchedule::new(schema.reencode.quality_step, schema.reencode.min_quality)?;
        Ok(Self {
            threshold_bytes: schema.reencode.threshold_bytes,
            schedule,
            decode_timeout: Duration::from_secs(schema.probe.decode_timeout_secs),
            max_concurrency: schema.reencode.max_concurrency,
            preview_height: None,
        })
    }

    /// Render thumbnails of the given height.
    #[must_use]
    pub fn with_preview(mut self, height: u32) -> Self {
        self.preview_height = Some(height);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.threshold_bytes == 0 {
            return Err(WidgetError::Config("threshold must be greater than zero".into()));
        }
        if self.max_concurrency == 0 {
            return Err(WidgetError::Config("max_concurrency must be at least 1".into()));
        }
        Ok(())
    }
}

/// Image intake pipeline bound to a save sink and an optional upload sink.
///
/// Cheap to clone. Each [`IntakeWidget::select`] supersedes the previous
/// batch.
pub struct IntakeWidget<S, U, E = JpegSurfaceEncoder> {
    shared: Arc<Shared<S, U, E>>,
}

struct Shared<S, U, E> {
    prober: DimensionProber,
    reencoder: FileReencoder<E>,
    save: S,
    upload: Option<U>,
    semaphore: Semaphore,
    batches: BatchSequence,
    preview_height: Option<u32>,
}

impl<S, U, E> Clone for IntakeWidget<S, U, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, U> IntakeWidget<S, U, JpegSurfaceEncoder>
where
    S: SaveSink + 'static,
    U: UploadSink + 'static,
{
    /// A pipeline with the built-in codecs.
    ///
    /// Pass `None` for `upload` to only save locally.
    pub fn new(config: WidgetConfig, save: S, upload: Option<U>) -> Result<Self> {
        Self::with_codecs(config, Arc::new(CodecDecoder), JpegSurfaceEncoder, save, upload)
    }
}

impl<S, U, E> IntakeWidget<S, U, E>
where
    S: SaveSink + 'static,
    U: UploadSink + 'static,
    E: SurfaceEncoder + Clone + 'static,
{
    /// A pipeline with an injected decoder and encoder.
    pub fn with_codecs(
        config: WidgetConfig,
        decoder: Arc<dyn ImageDecoder>,
        encoder: E,
        save: S,
        upload: Option<U>,
    ) -> Result<Self> {
        config.validate()?;

        let decoder = BlockingDecoder::new(decoder, config.decode_timeout);
        let reencoder = Reencoder::new(encoder)
            .with_schedule(config.schedule)
            .with_threshold(config.threshold_bytes);

        Ok(Self {
            shared: Arc::new(Shared {
                prober: DimensionProber::new(decoder.clone()),
                reencoder: FileReencoder::new(decoder, reencoder),
                save,
                upload,
                semaphore: Semaphore::new(config.max_concurrency),
                batches: BatchSequence::new(),
                preview_height: config.preview_height,
            }),
        })
    }

    /// The dimension prober used by batches.
    pub fn prober(&self) -> &DimensionProber {
        &self.shared.prober
    }

    /// The re-encoder used by batches.
    pub fn reencoder(&self) -> &FileReencoder<E> {
        &self.shared.reencoder
    }

    /// Supersede the running batch, if any.
    pub fn cancel(&self) {
        self.shared.batches.cancel_current();
    }

    /// Start processing a selection.
    ///
    /// Must be called inside a Tokio runtime. Work starts immediately; the
    /// returned handle observes and collects it.
    pub fn select(&self, files: Vec<SelectedFile>) -> BatchHandle {
        let token = self.shared.batches.next();
        let dimensions = DimensionResults::new();
        let span = info_span!("batch", batch_id = token.id(), files = files.len());
        let started = Instant::now();

        info!(parent: &span, "Selection received");

        let mut probes = Vec::new();
        let mut entries = Vec::with_capacity(files.len());

        for file in files {
            let classification = classify(&file);

            if classification.probe_eligible {
                let shared = Arc::clone(&self.shared);
                let (file, dimensions) = (file.clone(), dimensions.clone());
                probes.push(tokio::spawn(
                    async move { shared.prober.probe_into(&file, &dimensions).await }
                        .instrument(span.clone()),
                ));
            }

            let entry = if classification.accepted {
                let shared = Arc::clone(&self.shared);
                let token = token.clone();
                let name = file.name().to_string();
                let size = file.size();
                Entry::Running {
                    name,
                    size,
                    classification,
                    handle: tokio::spawn(
                        async move { shared.process(file, token).await }.instrument(span.clone()),
                    ),
                }
            } else {
                debug!(parent: &span, file = %file.name(), content_type = %file.content_type(), "Not an accepted type");
                Entry::Done(FileReport {
                    name: file.name().to_string(),
                    size_bytes: file.size(),
                    classification,
                    dimensions: None,
                    outcome: FileOutcome::Rejected,
                })
            };
            entries.push(entry);
        }

        BatchHandle {
            token,
            dimensions,
            probes,
            entries,
            started,
        }
    }
}

impl<S, U, E> Shared<S, U, E>
where
    S: SaveSink,
    U: UploadSink,
    E: SurfaceEncoder + Clone + 'static,
{
    async fn process(&self, file: SelectedFile, token: BatchToken) -> FileOutcome {
        let Ok(_permit) = self.semaphore.acquire().await else {
            return FileOutcome::Failed {
                reason: "pipeline closed".into(),
            };
        };
        if !token.is_current() {
            return FileOutcome::Superseded;
        }

        let encoded = match self
            .reencoder
            .reencode_in_batch(&file, &token, self.preview_height)
            .await
        {
            Ok(encoded) => encoded,
            Err(e) if e.is_decode_error() => {
                metrics().increment(names::DECODE_FAILURE);
                warn!(file = %file.name(), error = %e, "Could not decode file");
                return FileOutcome::DecodeFailed {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                warn!(file = %file.name(), error = %e, "Re-encode failed");
                return FileOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        if !token.is_current() {
            debug!(file = %file.name(), "Batch superseded, skipping sinks");
            return FileOutcome::Superseded;
        }

        let artifact = encoded.artifact;
        let name = download_name(file.name());

        // The upload never holds back the save: both are polled together.
        let (saved, uploaded) = tokio::join!(
            self.save.save(file.name(), &artifact),
            self.upload_artifact(&name, &artifact),
        );

        let saved = match saved {
            Ok(path) => SaveOutcome::Saved { path },
            Err(e) => {
                warn!(file = %file.name(), error = %e, "Local save failed");
                SaveOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        FileOutcome::Encoded {
            download_name: name,
            quality: artifact.quality(),
            size_bytes: artifact.size(),
            status: artifact.status(),
            attempts: artifact.attempts().to_vec(),
            preview: encoded.preview,
            saved,
            upload: uploaded,
        }
    }

    async fn upload_artifact(&self, name: &str, artifact: &intake_image::EncodedArtifact) -> UploadOutcome {
        let Some(upload) = &self.upload else {
            return UploadOutcome::Skipped;
        };

        match upload.upload(name, artifact).await {
            Ok(receipt) => {
                metrics().increment(names::UPLOAD_SUCCESS);
                UploadOutcome::Uploaded {
                    status: receipt.status,
                    request_id: receipt.request_id,
                    body: receipt.body,
                }
            }
            Err(e) => {
                metrics().increment(names::UPLOAD_FAILURE);
                warn!(file = %name, error = %e, "Upload failed");
                UploadOutcome::Failed {
                    status: e.status(),
                    error: e.to_string(),
                }
            }
        }
    }
}

enum Entry {
    Running {
        name: String,
        size: usize,
        classification: intake_image::Classification,
        handle: JoinHandle<FileOutcome>,
    },
    Done(FileReport),
}

/// A running batch.
pub struct BatchHandle {
    token: BatchToken,
    dimensions: DimensionResults,
    probes: Vec<JoinHandle<()>>,
    entries: Vec<Entry>,
    started: Instant,
}

impl BatchHandle {
    /// Generation number of this batch.
    pub fn id(&self) -> u64 {
        self.token.id()
    }

    /// False once a newer selection replaced this batch.
    pub fn is_current(&self) -> bool {
        self.token.is_current()
    }

    /// Live view of the dimensions probed so far.
    pub fn dimensions(&self) -> &DimensionResults {
        &self.dimensions
    }

    /// Wait for every probe and re-encode and collect one report per file,
    /// in selection order.
    pub async fn join(self) -> BatchReport {
        self.join_with(|_| {}).await
    }

    /// Like [`BatchHandle::join`], calling `on_file` as each report is
    /// collected.
    pub async fn join_with(self, mut on_file: impl FnMut(&FileReport)) -> BatchReport {
        for probe in self.probes {
            if let Err(e) = probe.await {
                warn!(error = %e, "Probe task failed");
            }
        }

        let mut files = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            let report = match entry {
                Entry::Done(report) => report,
                Entry::Running {
                    name,
                    size,
                    classification,
                    handle,
                } => {
                    let outcome = handle.await.unwrap_or_else(|e| FileOutcome::Failed {
                        reason: WidgetError::from(e).to_string(),
                    });
                    FileReport {
                        dimensions: self.dimensions.get(&name),
                        name,
                        size_bytes: size,
                        classification,
                        outcome,
                    }
                }
            };
            on_file(&report);
            files.push(report);
        }

        let report = BatchReport {
            batch_id: self.token.id(),
            superseded: !self.token.is_current(),
            dimensions: self.dimensions.snapshot(),
            files,
            elapsed: self.started.elapsed(),
        };
        info!(
            batch_id = report.batch_id,
            encoded = report.encoded_count(),
            rejected = report.rejected_count(),
            failed = report.failed_count(),
            "Batch finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LocalSaveSink;
    use crate::testing::{ScriptedDecoder, png, webp};
    use intake_image::{Dimensions, EncodedArtifact, ThresholdStatus};
    use intake_upload::{UploadError, UploadReceipt, UploadResult};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records sink calls in completion order.
    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    struct RecordingSave(Arc<Recorder>);

    impl SaveSink for RecordingSave {
        async fn save(&self, original_name: &str, _artifact: &EncodedArtifact) -> Result<PathBuf> {
            self.0.push(format!("save:{original_name}"));
            Ok(PathBuf::from(download_name(original_name)))
        }
    }

    /// Fails every upload after a delay.
    struct FailingUpload(Arc<Recorder>, Duration);

    impl UploadSink for FailingUpload {
        async fn upload(&self, name: &str, _artifact: &EncodedArtifact) -> UploadResult<UploadReceipt> {
            tokio::time::sleep(self.1).await;
            self.0.push(format!("upload:{name}"));
            Err(UploadError::rejected(503, "unavailable"))
        }
    }

    /// Accepts every upload.
    struct AcceptingUpload(Arc<Recorder>);

    impl UploadSink for AcceptingUpload {
        async fn upload(&self, name: &str, _artifact: &EncodedArtifact) -> UploadResult<UploadReceipt> {
            self.0.push(format!("upload:{name}"));
            Ok(UploadReceipt {
                status: 200,
                request_id: "req-1".into(),
                body: serde_json::Value::Null,
                elapsed: Duration::ZERO,
            })
        }
    }

    fn widget<U: UploadSink + 'static>(
        recorder: &Arc<Recorder>,
        upload: Option<U>,
    ) -> IntakeWidget<RecordingSave, U> {
        IntakeWidget::with_codecs(
            WidgetConfig::default(),
            Arc::new(ScriptedDecoder),
            JpegSurfaceEncoder,
            RecordingSave(Arc::clone(recorder)),
            upload,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_batch_classifies_probes_and_encodes() {
        let recorder = Arc::new(Recorder::default());
        let widget = widget(&recorder, Some(AcceptingUpload(Arc::clone(&recorder))));

        let report = widget
            .select(vec![
                webp("a.webp", "40x30"),
                png("b.png", "10x10"),
                SelectedFile::new("notes.txt", "text/plain", b"hello".to_vec()),
            ])
            .join()
            .await;

        assert_eq!(report.files.len(), 3);
        assert_eq!(report.dimensions.len(), 1);
        assert_eq!(report.files[0].dimensions, Some(Dimensions::new(40, 30)));
        assert_eq!(report.files[1].dimensions, None);
        assert!(matches!(report.files[2].outcome, FileOutcome::Rejected));
        assert_eq!(report.encoded_count(), 2);
        assert_eq!(report.rejected_count(), 1);
        assert!(!report.has_failures());

        match &report.files[0].outcome {
            FileOutcome::Encoded {
                download_name,
                status,
                upload,
                ..
            } => {
                assert_eq!(download_name, "a.jpeg");
                assert_eq!(*status, ThresholdStatus::Met);
                assert!(matches!(upload, UploadOutcome::Uploaded { status: 200, .. }));
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        let mut events = recorder.events();
        events.sort();
        assert_eq!(events, ["save:a.webp", "save:b.png", "upload:a.jpeg", "upload:b.jpeg"]);
    }

    #[tokio::test]
    async fn test_upload_failure_does_not_block_save() {
        let recorder = Arc::new(Recorder::default());
        let upload = FailingUpload(Arc::clone(&recorder), Duration::from_millis(200));
        let widget = widget(&recorder, Some(upload));

        let report = widget.select(vec![png("cat.png", "16x16")]).join().await;

        assert_eq!(recorder.events(), ["save:cat.png", "upload:cat.jpeg"]);
        match &report.files[0].outcome {
            FileOutcome::Encoded { saved, upload, .. } => {
                assert!(matches!(saved, SaveOutcome::Saved { .. }));
                assert!(matches!(upload, UploadOutcome::Failed { status: Some(503), .. }));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_refused_upload_still_saves_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let client = intake_upload::UploadClient::with_config(
            intake_upload::UploadConfig::default()
                .with_endpoint("http://127.0.0.1:1/v1/upload")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let widget = IntakeWidget::with_codecs(
            WidgetConfig::default(),
            Arc::new(ScriptedDecoder),
            JpegSurfaceEncoder,
            LocalSaveSink::new(dir.path()),
            Some(client),
        )
        .unwrap();

        let report = widget.select(vec![png("dog.png", "12x12")]).join().await;

        assert!(dir.path().join("dog.jpeg").exists());
        match &report.files[0].outcome {
            FileOutcome::Encoded { upload, .. } => {
                assert!(matches!(upload, UploadOutcome::Failed { status: None, .. }));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_superseded_batch_skips_sinks() {
        let recorder = Arc::new(Recorder::default());
        let widget = widget(&recorder, Some(AcceptingUpload(Arc::clone(&recorder))));

        let first = widget.select(vec![png("old.png", "16x16@300")]);
        let second = widget.select(vec![png("new.png", "16x16")]);
        assert!(!first.is_current());
        assert!(second.is_current());

        let first = first.join().await;
        let second = second.join().await;

        assert!(first.superseded);
        assert!(matches!(first.files[0].outcome, FileOutcome::Superseded));
        assert_eq!(second.encoded_count(), 1);

        let mut events = recorder.events();
        events.sort();
        assert_eq!(events, ["save:new.png", "upload:new.jpeg"]);
    }

    #[tokio::test]
    async fn test_superseded_probe_writes_only_its_own_map() {
        let recorder = Arc::new(Recorder::default());
        let widget = widget::<AcceptingUpload>(&recorder, None);

        let first = widget.select(vec![webp("x.webp", "5x6@100")]);
        let second = widget.select(vec![webp("y.webp", "7x8")]);

        let first = first.join().await;
        let second = second.join().await;

        assert_eq!(first.dimensions.len(), 1);
        assert!(first.dimensions.contains_key("x.webp"));
        assert_eq!(second.dimensions.len(), 1);
        assert!(second.dimensions.contains_key("y.webp"));
    }

    #[tokio::test]
    async fn test_decode_failure_reported() {
        let recorder = Arc::new(Recorder::default());
        let widget = widget::<AcceptingUpload>(&recorder, None);

        let report = widget.select(vec![png("broken.png", "garbage")]).join().await;

        assert!(matches!(report.files[0].outcome, FileOutcome::DecodeFailed { .. }));
        assert!(report.has_failures());
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn test_no_upload_sink_skips_upload() {
        let recorder = Arc::new(Recorder::default());
        let widget = widget::<AcceptingUpload>(&recorder, None);

        let report = widget.select(vec![png("a.png", "8x8")]).join().await;
        match &report.files[0].outcome {
            FileOutcome::Encoded { upload, .. } => assert!(matches!(upload, UploadOutcome::Skipped)),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(recorder.events(), ["save:a.png"]);
    }

    #[test]
    fn test_config_from_schema() {
        let mut schema = ConfigSchema::default();
        schema.reencode.threshold_bytes = 2048;
        schema.reencode.quality_step = 0.2;
        schema.probe.decode_timeout_secs = 3;

        let config = WidgetConfig::from_schema(&schema).unwrap();
        assert_eq!(config.threshold_bytes, 2048);
        assert_eq!(config.schedule.max_attempts(), 5);
        assert_eq!(config.decode_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = WidgetConfig {
            max_concurrency: 0,
            ..WidgetConfig::default()
        };
        assert!(matches!(config.validate(), Err(WidgetError::Config(_))));
    }
}

//! Decode, draw and run the quality search for one file.

use crate::error::Result;
use crate::probe::BlockingDecoder;
use crate::token::BatchToken;
use image::DynamicImage;
use intake_image::{
    EncodedArtifact, JpegSurfaceEncoder, Preview, Reencoder, SelectedFile, Surface, SurfaceEncoder,
    ThresholdStatus, render_preview,
};
use intake_telemetry::{Timer, metrics, names};
use tracing::{debug, info, warn};

/// Async front of [`Reencoder`]: decodes with a time limit and runs the
/// search on the blocking pool.
#[derive(Debug, Clone)]
pub struct FileReencoder<E = JpegSurfaceEncoder> {
    decoder: BlockingDecoder,
    reencoder: Reencoder<E>,
}

/// Output of one re-encode inside a batch.
#[derive(Debug)]
pub(crate) struct Encoded {
    pub artifact: EncodedArtifact,
    pub preview: Option<Preview>,
}

impl<E> FileReencoder<E>
where
    E: SurfaceEncoder + Clone + 'static,
{
    /// Combine a decoder and a configured search.
    pub fn new(decoder: BlockingDecoder, reencoder: Reencoder<E>) -> Self {
        Self { decoder, reencoder }
    }

    /// The configured search.
    pub fn reencoder(&self) -> &Reencoder<E> {
        &self.reencoder
    }

    /// Re-encode `file` to JPEG, searching for the highest quality whose
    /// output is at most `threshold_bytes`.
    ///
    /// An unreachable threshold is not an error: the lowest-quality attempt
    /// comes back flagged [`ThresholdStatus::NotMet`].
    pub async fn reencode(&self, file: &SelectedFile, threshold_bytes: usize) -> Result<EncodedArtifact> {
        let image = self.decoder.decode(file).await?;
        let reencoder = self.reencoder.clone().with_threshold(threshold_bytes);

        let artifact =
            tokio::task::spawn_blocking(move || search(&reencoder, &image, || true)).await??;
        record(file, &artifact);
        Ok(artifact)
    }

    /// Re-encode inside a batch: stops between attempts once `token` is
    /// superseded and optionally renders a thumbnail from the same bitmap.
    pub(crate) async fn reencode_in_batch(
        &self,
        file: &SelectedFile,
        token: &BatchToken,
        preview_height: Option<u32>,
    ) -> Result<Encoded> {
        let image = self.decoder.decode(file).await?;
        let reencoder = self.reencoder.clone();
        let token = token.clone();

        let (artifact, preview) = tokio::task::spawn_blocking(move || {
            let preview = preview_height.and_then(|height| match render_preview(&image, height) {
                Ok(preview) => Some(preview),
                Err(e) => {
                    warn!(error = %e, "Preview rendering failed");
                    None
                }
            });
            search(&reencoder, &image, || token.is_current()).map(|artifact| (artifact, preview))
        })
        .await??;

        if artifact.status() == ThresholdStatus::Stopped {
            debug!(file = %file.name(), "Batch superseded during quality search");
        } else {
            record(file, &artifact);
        }
        Ok(Encoded { artifact, preview })
    }
}

fn search<E: SurfaceEncoder>(
    reencoder: &Reencoder<E>,
    image: &DynamicImage,
    keep_going: impl FnMut() -> bool,
) -> intake_image::Result<EncodedArtifact> {
    let _timer = Timer::start(names::REENCODE_DURATION);
    let surface = Surface::from_image(image);
    reencoder.reencode_while(&surface, keep_going)
}

fn record(file: &SelectedFile, artifact: &EncodedArtifact) {
    metrics().increment_by(names::REENCODE_ATTEMPTS, artifact.attempts().len() as u64);
    if artifact.status() == ThresholdStatus::NotMet {
        metrics().increment(names::REENCODE_THRESHOLD_NOT_MET);
    }

    info!(
        file = %file.name(),
        quality = %artifact.quality(),
        size_bytes = artifact.size(),
        attempts = artifact.attempts().len(),
        status = ?artifact.status(),
        "Re-encoded"
    );
}

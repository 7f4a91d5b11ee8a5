//! Where finished artifacts go.

use crate::error::{Result, WidgetError};
use intake_image::{EncodedArtifact, download_name};
use intake_upload::{UploadClient, UploadReceipt, UploadResult};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores an artifact locally under its download name.
pub trait SaveSink: Send + Sync {
    /// Save `artifact`, produced from the file called `original_name`.
    fn save(
        &self,
        original_name: &str,
        artifact: &EncodedArtifact,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Sends an artifact to a remote endpoint.
pub trait UploadSink: Send + Sync {
    /// Upload `artifact` under the file name `download_name`.
    fn upload(
        &self,
        download_name: &str,
        artifact: &EncodedArtifact,
    ) -> impl Future<Output = UploadResult<UploadReceipt>> + Send;
}

/// Writes artifacts into a directory as `<stem>.jpeg`.
#[derive(Debug, Clone)]
pub struct LocalSaveSink {
    dir: PathBuf,
}

impl LocalSaveSink {
    /// Save into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveSink for LocalSaveSink {
    async fn save(&self, original_name: &str, artifact: &EncodedArtifact) -> Result<PathBuf> {
        let path = self.dir.join(download_name(original_name));
        let to_save_error = |source| WidgetError::Save {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(to_save_error)?;
        tokio::fs::write(&path, artifact.bytes()).await.map_err(to_save_error)?;

        debug!(path = %path.display(), size_bytes = artifact.size(), "Saved artifact");
        Ok(path)
    }
}

impl UploadSink for UploadClient {
    fn upload(
        &self,
        download_name: &str,
        artifact: &EncodedArtifact,
    ) -> impl Future<Output = UploadResult<UploadReceipt>> + Send {
        UploadClient::upload(self, download_name, artifact.mime_type(), artifact.bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_image::{JpegSurfaceEncoder, Reencoder, Surface};
    use image::DynamicImage;

    fn artifact() -> EncodedArtifact {
        Reencoder::new(JpegSurfaceEncoder)
            .reencode(&Surface::from_image(&DynamicImage::new_rgb8(8, 8)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_save_writes_jpeg_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSaveSink::new(dir.path().join("nested"));
        let artifact = artifact();

        let path = sink.save("holiday.webp", &artifact).await.unwrap();

        assert_eq!(path, dir.path().join("nested").join("holiday.jpeg"));
        assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes());
    }

    #[tokio::test]
    async fn test_local_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSaveSink::new(dir.path());
        std::fs::write(dir.path().join("a.jpeg"), b"old").unwrap();

        let path = sink.save("a.png", &artifact()).await.unwrap();
        assert_ne!(std::fs::read(path).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_local_save_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let err = LocalSaveSink::new(&blocker)
            .save("a.png", &artifact())
            .await
            .unwrap_err();
        assert!(matches!(err, WidgetError::Save { .. }));
    }
}

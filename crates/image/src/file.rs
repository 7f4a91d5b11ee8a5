//! Selected files as handed over by the caller.

use crate::Result;
use crate::classify::content_type_for_path;
use crate::detect::{ImageFormat, detect_format};
use std::path::Path;
use std::sync::Arc;

/// One file from a selection: a display name, a declared content type and
/// the raw bytes.
///
/// The bytes are shared, so cloning a `SelectedFile` to hand it to a probe
/// and a re-encode task does not copy the image.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    content_type: String,
    data: Arc<[u8]>,
}

impl SelectedFile {
    /// Create a file from its parts.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk; the declared type comes from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, content_type_for_path(path), data))
    }

    /// Display name (file name without directories).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type, possibly empty.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the raw bytes.
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Format sniffed from the content, independent of the declared type.
    pub fn sniffed_format(&self) -> Option<ImageFormat> {
        detect_format(&self.data).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_path_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday.webp");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"RIFF\x00\x00\x00\x00WEBPVP8 ").unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "holiday.webp");
        assert_eq!(file.content_type(), "image/webp");
        assert_eq!(file.size(), 16);
        assert_eq!(file.sniffed_format(), Some(ImageFormat::WebP));
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = SelectedFile::from_path(Path::new("/definitely/not/here.png"));
        assert!(result.is_err());
    }

    #[test]
    fn test_clone_shares_bytes() {
        let file = SelectedFile::new("a.png", "image/png", vec![1u8, 2, 3]);
        let copy = file.clone();
        assert!(Arc::ptr_eq(&file.shared_data(), &copy.shared_data()));
    }
}

//! Turning command line paths into a selection.

use anyhow::{Context, Result};
use intake_image::{SelectedFile, content_type_for_path};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Expand `paths` into selected files.
///
/// Files are taken as given, whatever their type. Directories are walked
/// recursively and contribute only files with a known image extension, in
/// name order.
pub fn collect(paths: &[PathBuf]) -> Result<Vec<SelectedFile>> {
    expand(paths)?
        .iter()
        .map(|path| {
            SelectedFile::from_path(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let entries = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| !content_type_for_path(e.path()).is_empty())
                .map(walkdir::DirEntry::into_path);
            files.extend(entries);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(intake_core::Error::file_not_found(path).into());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_keep_image_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.webp"), b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.jpg"), b"x").unwrap();

        let files = collect(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files.iter().map(SelectedFile::name).collect();
        assert_eq!(names, ["a.png", "b.webp", "c.jpg"]);
    }

    #[test]
    fn test_explicit_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"x").unwrap();

        let files = collect(&[notes]).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content_type(), "");
    }

    #[test]
    fn test_missing_path_is_error() {
        let err = collect(&[PathBuf::from("/no/such/image.png")]).unwrap_err();
        let err = err.downcast_ref::<intake_core::Error>().unwrap();

        assert_eq!(err.code, intake_core::ErrorCode::FileNotFound);
        assert!(!err.is_config());
    }
}

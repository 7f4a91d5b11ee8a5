//! Content-type classification of selected files.
//!
//! Classification is derived from the declared content type only and is
//! recomputed on every call.

use crate::SelectedFile;
use crate::detect::ImageFormat;
use serde::Serialize;
use std::path::Path;

/// Declared content types the intake accepts.
pub const ACCEPTED_TYPES: [&str; 5] = [
    "image/jpg",
    "image/jpeg",
    "image/png",
    "image/bmp",
    "image/webp",
];

/// The single content type whose dimensions are probed.
pub const PROBE_ELIGIBLE_TYPE: &str = "image/webp";

/// Extensions advertised to the user when choosing files.
pub const ACCEPTED_EXTENSIONS: &str = ".jpg, .jpeg, .png, .bmp, .webp";

/// Both classification flags for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Declared type is in [`ACCEPTED_TYPES`]
    pub accepted: bool,
    /// Declared type equals [`PROBE_ELIGIBLE_TYPE`]
    pub probe_eligible: bool,
}

/// True iff the file's declared content type is in the accepted set.
pub fn is_accepted_type(file: &SelectedFile) -> bool {
    ACCEPTED_TYPES.contains(&file.content_type())
}

/// True iff the file's declared content type is the probe-eligible type.
pub fn is_probe_eligible(file: &SelectedFile) -> bool {
    file.content_type() == PROBE_ELIGIBLE_TYPE
}

/// Classify a file against both sets.
pub fn classify(file: &SelectedFile) -> Classification {
    Classification {
        accepted: is_accepted_type(file),
        probe_eligible: is_probe_eligible(file),
    }
}

/// Declared content type for a path, derived from its extension.
///
/// Unknown or missing extensions yield an empty string, which classifies as
/// neither accepted nor probe-eligible.
pub fn content_type_for_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .map_or("", |format| format.mime_type())
}

//! Image handling for image-intake.
//!
//! This crate provides:
//! - Content-type classification against the accepted and probe-eligible sets
//! - Format detection from magic bytes
//! - Decoding and dimension probing behind an injectable decoder
//! - A drawing surface and the size-constrained JPEG quality search
//! - Thumbnail previews as data URLs

#![warn(missing_docs)]

mod alpha;
pub mod classify;
mod decode;
mod detect;
mod dimensions;
mod encode;
mod error;
mod file;
pub mod preview;
pub mod quality;
mod reencode;
mod surface;

pub use alpha::{flatten_onto, has_alpha_channel};
pub use classify::{
    ACCEPTED_EXTENSIONS, ACCEPTED_TYPES, Classification, PROBE_ELIGIBLE_TYPE, classify,
    content_type_for_path, is_accepted_type, is_probe_eligible,
};
pub use decode::{CodecDecoder, ImageDecoder};
pub use detect::{ImageFormat, detect_format};
pub use dimensions::Dimensions;
pub use encode::{JpegSurfaceEncoder, SurfaceEncoder};
pub use error::{ImageError, Result};
pub use file::SelectedFile;
pub use preview::{Preview, render_preview};
pub use quality::{MIN_QUALITY_STEP, Quality, QualitySchedule};
pub use reencode::{
    Attempt, DEFAULT_THRESHOLD_BYTES, EncodedArtifact, Reencoder, ThresholdStatus, download_name,
};
pub use surface::Surface;

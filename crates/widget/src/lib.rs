//! One-shot image intake pipeline.
//!
//! [`IntakeWidget::select`] takes a batch of files and, once per batch:
//! - classifies every file against the accepted types
//! - probes dimensions of probe-eligible files in the background
//! - re-encodes every accepted file to a size-constrained JPEG
//! - saves the artifact locally and uploads it, independently of each other
//!
//! # Example
//!
//! ```rust,no_run
//! use intake_upload::UploadClient;
//! use intake_widget::{IntakeWidget, LocalSaveSink, WidgetConfig};
//! use intake_image::SelectedFile;
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let widget = IntakeWidget::new(
//!     WidgetConfig::default(),
//!     LocalSaveSink::new("out"),
//!     Some(UploadClient::new()?),
//! )?;
//!
//! let batch = widget.select(vec![SelectedFile::from_path(Path::new("cat.webp"))?]);
//! let report = batch.join().await;
//! println!("{} encoded", report.encoded_count());
//! # Ok(())
//! # }
//! ```

mod error;
mod probe;
mod reencode;
mod report;
mod sink;
mod token;
mod widget;

#[cfg(test)]
mod testing;

pub use error::{Result, WidgetError};
pub use probe::{BlockingDecoder, DEFAULT_DECODE_TIMEOUT, DimensionProber, DimensionResults};
pub use reencode::FileReencoder;
pub use report::{BatchReport, FileOutcome, FileReport, SaveOutcome, UploadOutcome};
pub use sink::{LocalSaveSink, SaveSink, UploadSink};
pub use token::{BatchSequence, BatchToken};
pub use widget::{BatchHandle, IntakeWidget, WidgetConfig};

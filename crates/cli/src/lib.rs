//! Terminal output helpers for image-intake
//!
//! - Status lines and headers
//! - Size, duration and count labels
//! - Progress bars for batches

#![warn(missing_docs)]

pub mod output;
pub mod progress;

//! Multipart upload client for re-encoded images
//!
//! Sends one artifact per request as a `multipart/form-data` body with a
//! binary `file` field and a literal `type` field, authenticated with a bearer
//! token passed through verbatim.
//!
//! Uploads are best effort: failures are returned and logged, never retried.
//!
//! # Example
//!
//! ```rust,no_run
//! use intake_upload::{UploadClient, UploadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UploadConfig::default()
//!         .with_endpoint("https://uploads.example.com/v1/upload")
//!         .with_token("static-token");
//!     let client = UploadClient::with_config(config)?;
//!
//!     let jpeg = std::fs::read("holiday.jpeg")?;
//!     let receipt = client.upload("holiday.jpeg", "image/jpeg", jpeg).await?;
//!     println!("uploaded with status {}", receipt.status);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;

pub use client::{UploadClient, UploadReceipt};
pub use config::UploadConfig;
pub use error::{UploadError, UploadResult};

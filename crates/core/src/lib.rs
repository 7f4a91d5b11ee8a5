//! Core utilities for image-intake
//!
//! This crate provides functionality shared by the library crates and the
//! binary:
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Configuration**: TOML-based configuration with environment overrides
//!   and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use intake_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("threshold: {} bytes", config.schema.reencode.threshold_bytes);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result, ResultExt};

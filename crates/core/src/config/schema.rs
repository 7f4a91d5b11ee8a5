//! Configuration schema definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default upload endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://api.image-intake.dev/v1/upload";

/// Smallest accepted `reencode.quality_step`; bounds a search at 100 attempts.
pub const MIN_QUALITY_STEP: f64 = 0.01;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    /// Quality search settings
    #[serde(default)]
    pub reencode: ReencodeConfig,

    /// Dimension probing settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Local save settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Remote upload settings
    #[serde(default)]
    pub upload: UploadSettings,

    /// Log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfigSchema {
    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        self.reencode.validate()?;
        self.probe.validate()?;
        self.upload.validate()
    }
}

/// Quality search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReencodeConfig {
    /// Largest acceptable artifact in bytes
    #[serde(default = "default_threshold_bytes")]
    pub threshold_bytes: usize,

    /// Quality decrement between attempts
    #[serde(default = "default_quality_step")]
    pub quality_step: f64,

    /// Lowest quality tried before giving up on the threshold
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,

    /// Re-encodes allowed to run at the same time
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ReencodeConfig {
    fn default() -> Self {
        Self {
            threshold_bytes: default_threshold_bytes(),
            quality_step: default_quality_step(),
            min_quality: default_min_quality(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl ReencodeConfig {
    fn validate(&self) -> Result<()> {
        if self.threshold_bytes == 0 {
            return Err(Error::invalid_config_value(
                "reencode.threshold_bytes",
                "must be greater than zero",
            ));
        }
        if !(MIN_QUALITY_STEP..=1.0).contains(&self.quality_step) {
            return Err(Error::invalid_config_value(
                "reencode.quality_step",
                format!("{} is outside [{MIN_QUALITY_STEP}, 1]", self.quality_step),
            ));
        }
        if !(self.min_quality > 0.0 && self.min_quality <= 1.0) {
            return Err(Error::invalid_config_value(
                "reencode.min_quality",
                format!("{} is outside (0, 1]", self.min_quality),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(Error::invalid_config_value(
                "reencode.max_concurrency",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_threshold_bytes() -> usize {
    1024 * 1024
}

fn default_quality_step() -> f64 {
    0.1
}

fn default_min_quality() -> f64 {
    0.1
}

fn default_max_concurrency() -> usize {
    4
}

/// Dimension probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Seconds before a decode is abandoned
    #[serde(default = "default_decode_timeout_secs")]
    pub decode_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            decode_timeout_secs: default_decode_timeout_secs(),
        }
    }
}

impl ProbeConfig {
    fn validate(&self) -> Result<()> {
        if self.decode_timeout_secs == 0 {
            return Err(Error::invalid_config_value(
                "probe.decode_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_decode_timeout_secs() -> u64 {
    10
}

/// Local save configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory saved artifacts are written to
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Remote upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Send artifacts to the endpoint
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Full URL of the upload endpoint
    #[serde(default = "default_upload_url")]
    pub endpoint: String,

    /// Bearer token passed through verbatim
    #[serde(default)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_upload_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_upload_url(),
            token: None,
            timeout_secs: default_upload_timeout_secs(),
        }
    }
}

impl UploadSettings {
    fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(Error::invalid_config_value(
                "upload.endpoint",
                "must start with http:// or https://",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_config_value(
                "upload.timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

fn default_upload_timeout_secs() -> u64 {
    30
}

/// Log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

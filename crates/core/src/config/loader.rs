//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Environment variable overriding `upload.endpoint`
pub const ENV_UPLOAD_URL: &str = "IMAGE_INTAKE_UPLOAD_URL";
/// Environment variable overriding `upload.token`
pub const ENV_UPLOAD_TOKEN: &str = "IMAGE_INTAKE_UPLOAD_TOKEN";
/// Environment variable overriding `output.dir`
pub const ENV_OUTPUT_DIR: &str = "IMAGE_INTAKE_OUTPUT_DIR";
/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "IMAGE_INTAKE_LOG";

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, if any
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or the standard locations,
    /// apply environment overrides and validate.
    ///
    /// An explicit path that does not exist is an error; when no path is
    /// given and no file is found, defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with a custom environment lookup.
    pub fn load_with(path: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let mut schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        apply_env_overrides(&mut schema, env);
        schema
            .validate()
            .context("While validating configuration")?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let local = [".image-intake.toml", "image-intake.toml"]
        .into_iter()
        .map(PathBuf::from);
    let user = dirs::config_dir().map(|dir| dir.join("image-intake").join("config.toml"));

    local.chain(user).find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}", path.display())).with_source(e)
    })?;

    toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("Failed to parse config file {}", path.display()))
}

fn apply_env_overrides(schema: &mut ConfigSchema, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env(ENV_UPLOAD_URL) {
        schema.upload.endpoint = url;
    }
    if let Some(token) = env(ENV_UPLOAD_TOKEN) {
        schema.upload.token = Some(token);
    }
    if let Some(dir) = env(ENV_OUTPUT_DIR) {
        schema.output.dir = dir;
    }
    if let Some(level) = env(ENV_LOG_LEVEL) {
        schema.logging.level = level;
    }
}

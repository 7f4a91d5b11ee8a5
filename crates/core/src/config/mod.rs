//! Configuration loading and schema definitions
//!
//! Settings come from a TOML file, then environment variables, then
//! validation.

mod loader;
mod schema;

pub use loader::{Config, ENV_LOG_LEVEL, ENV_OUTPUT_DIR, ENV_UPLOAD_TOKEN, ENV_UPLOAD_URL};
pub use schema::*;

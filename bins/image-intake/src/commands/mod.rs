//! CLI command implementations

pub mod classify;
pub mod probe;
pub mod process;
pub mod reencode;

use intake_core::config::Config;
use intake_widget::BlockingDecoder;
use intake_image::CodecDecoder;
use std::sync::Arc;
use std::time::Duration;

/// Decoder with the configured time limit.
fn decoder(config: &Config) -> BlockingDecoder {
    BlockingDecoder::new(
        Arc::new(CodecDecoder),
        Duration::from_secs(config.schema.probe.decode_timeout_secs),
    )
}

//! Reencode command - quality search on a single file

use anyhow::{Context, Result};
use intake_cli::output::{format_size, not_accepted_message, Status};
use intake_core::config::Config;
use intake_core::error::exit_codes;
use intake_image::{is_accepted_type, EncodedArtifact, QualitySchedule, Reencoder, SelectedFile};
use intake_widget::{FileReencoder, LocalSaveSink, SaveSink};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct JsonReencodeOutput<'a> {
    file: &'a str,
    threshold_bytes: usize,
    saved: &'a Path,
    artifact: &'a EncodedArtifact,
}

/// Run reencode command
pub async fn run(
    path: &Path,
    threshold: Option<usize>,
    out_dir: Option<PathBuf>,
    json: bool,
    config: &Config,
) -> Result<i32> {
    let file = SelectedFile::from_path(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if !is_accepted_type(&file) {
        Status::error(&not_accepted_message(file.name()));
        return Ok(exit_codes::FAILURE);
    }

    let settings = &config.schema.reencode;
    let threshold = threshold.unwrap_or(settings.threshold_bytes);
    if threshold == 0 {
        return Err(intake_core::Error::invalid_config_value("--threshold", "must be greater than zero").into());
    }
    let schedule = QualitySchedule::new(settings.quality_step, settings.min_quality)
        .map_err(|e| intake_core::Error::invalid_config_value("reencode", e.to_string()))?;

    let reencoder = FileReencoder::new(super::decoder(config), Reencoder::default().with_schedule(schedule));
    let artifact = match reencoder.reencode(&file, threshold).await {
        Ok(artifact) => artifact,
        Err(e) => {
            Status::error(&e.to_string());
            return Ok(exit_codes::FAILURE);
        }
    };

    let sink = LocalSaveSink::new(out_dir.unwrap_or_else(|| PathBuf::from(&config.schema.output.dir)));
    let saved = match sink.save(file.name(), &artifact).await {
        Ok(path) => path,
        Err(e) => {
            Status::error(&e.to_string());
            return Ok(exit_codes::FAILURE);
        }
    };

    if json {
        let output = JsonReencodeOutput {
            file: file.name(),
            threshold_bytes: threshold,
            saved: &saved,
            artifact: &artifact,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("{} ({})", file.name(), format_size(file.size() as u64)));
    for attempt in artifact.attempts() {
        let marker = if attempt.size_bytes <= threshold {
            "✓".green().to_string()
        } else {
            "·".dimmed().to_string()
        };
        println!(
            "  {marker} quality {}  {:>10}",
            attempt.quality,
            format_size(attempt.size_bytes as u64)
        );
    }
    println!();

    if artifact.threshold_met() {
        Status::success(&format!(
            "Saved {} at quality {} ({})",
            saved.display(),
            artifact.quality(),
            format_size(artifact.size() as u64)
        ));
    } else {
        Status::warning(&format!(
            "Could not get under {}; saved {} at the lowest quality {} ({})",
            format_size(threshold as u64),
            saved.display(),
            artifact.quality(),
            format_size(artifact.size() as u64)
        ));
    }

    Ok(exit_codes::SUCCESS)
}

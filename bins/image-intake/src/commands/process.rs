//! Process command - the full pipeline over a selection

use crate::input;
use anyhow::Result;
use intake_cli::output::{format_count, format_duration, format_size, not_accepted_message, Status};
use intake_cli::progress;
use intake_core::config::Config;
use intake_core::error::exit_codes;
use intake_image::preview::DEFAULT_PREVIEW_HEIGHT;
use intake_image::ThresholdStatus;
use intake_telemetry::{metrics, MetricsSnapshot};
use intake_upload::{UploadClient, UploadConfig};
use intake_widget::{
    BatchReport, FileOutcome, FileReport, IntakeWidget, LocalSaveSink, SaveOutcome, UploadOutcome,
    WidgetConfig,
};
use serde::Serialize;
use std::path::PathBuf;

/// Flags of the process command
pub struct Options {
    pub out_dir: Option<PathBuf>,
    pub upload: bool,
    pub preview: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct JsonProcessOutput<'a> {
    report: &'a BatchReport,
    metrics: MetricsSnapshot,
}

/// Run process command
pub async fn run(paths: &[PathBuf], options: Options, config: &Config) -> Result<i32> {
    let files = input::collect(paths)?;

    let mut widget_config = WidgetConfig::from_schema(&config.schema)
        .map_err(|e| intake_core::Error::config(e.to_string()))?;
    if options.preview {
        widget_config = widget_config.with_preview(DEFAULT_PREVIEW_HEIGHT);
    }

    let out_dir = options
        .out_dir
        .unwrap_or_else(|| PathBuf::from(&config.schema.output.dir));
    let upload = if options.upload && config.schema.upload.enabled {
        let client = UploadClient::with_config(UploadConfig::from(&config.schema.upload))
            .map_err(|e| intake_core::Error::config(e.to_string()))?;
        Some(client)
    } else {
        None
    };

    let widget = IntakeWidget::new(widget_config, LocalSaveSink::new(&out_dir), upload)
        .map_err(|e| intake_core::Error::config(e.to_string()))?;

    let total = files.len();
    let pb = progress::file_progress(total as u64, options.quiet || options.json);
    let report = widget
        .select(files)
        .join_with(|file| {
            pb.set_message(file.name.clone());
            pb.inc(1);
        })
        .await;

    if report.has_failures() {
        progress::finish_error(&pb, &format_count(report.failed_count(), "failure", "failures"));
    } else {
        progress::finish_success(&pb, &format_count(report.encoded_count(), "file", "files"));
    }

    if options.json {
        let output = JsonProcessOutput {
            report: &report,
            metrics: metrics().snapshot(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
    }

    Ok(if report.has_failures() {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    })
}

fn print_report(report: &BatchReport) {
    if report.files.is_empty() {
        println!("No files currently selected for upload");
        return;
    }

    Status::header(&format!("Batch {}", report.batch_id));

    for file in &report.files {
        print_file(file);
    }

    println!();
    println!(
        "  {} encoded, {} rejected, {} failed in {}",
        report.encoded_count(),
        report.rejected_count(),
        report.failed_count(),
        format_duration(report.elapsed)
    );
}

fn print_file(file: &FileReport) {
    let size = format_size(file.size_bytes as u64);

    match &file.outcome {
        FileOutcome::Rejected => Status::warning(&not_accepted_message(&file.name)),
        FileOutcome::Superseded => Status::info(&format!("{}: skipped, batch superseded", file.name)),
        FileOutcome::DecodeFailed { reason } | FileOutcome::Failed { reason } => Status::error(reason),
        FileOutcome::Encoded {
            download_name,
            quality,
            size_bytes,
            status,
            attempts,
            preview,
            saved,
            upload,
        } => {
            let summary = format!(
                "{} ({size}) -> {download_name} ({}, quality {quality}, {})",
                file.name,
                format_size(*size_bytes as u64),
                format_count(attempts.len(), "attempt", "attempts")
            );
            if *status == ThresholdStatus::Met {
                Status::success(&summary);
            } else {
                Status::warning(&format!("{summary}: size threshold not met"));
            }

            if let Some(dimensions) = file.dimensions {
                println!("    {dimensions}");
            }
            match saved {
                SaveOutcome::Saved { path } => println!("    saved {}", path.display()),
                SaveOutcome::Failed { error } => Status::error(error),
            }
            match upload {
                UploadOutcome::Uploaded { status, .. } => println!("    uploaded ({status})"),
                UploadOutcome::Failed { error, .. } => Status::warning(&format!("upload failed: {error}")),
                UploadOutcome::Skipped => {}
            }
            if let Some(preview) = preview {
                println!("    preview {}", preview.data_url);
            }
        }
    }
}

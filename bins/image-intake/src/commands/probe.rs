//! Probe command - pixel dimensions of selected files

use crate::input;
use anyhow::Result;
use intake_cli::output::{not_accepted_message, Status};
use intake_core::config::Config;
use intake_core::error::exit_codes;
use intake_image::{classify, Dimensions};
use intake_widget::DimensionProber;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct ProbeResult {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run probe command
///
/// Only webp files are probed unless `all` is set. Probes run concurrently;
/// output keeps the selection order.
pub async fn run(paths: &[PathBuf], all: bool, json: bool, config: &Config) -> Result<i32> {
    let files = input::collect(paths)?;
    let prober = DimensionProber::new(super::decoder(config));

    let mut skipped = Vec::new();
    let mut handles = Vec::new();
    for file in files {
        let classification = classify(&file);
        let eligible = classification.probe_eligible || (all && classification.accepted);
        if !eligible {
            skipped.push(file.name().to_string());
            continue;
        }

        let prober = prober.clone();
        handles.push(tokio::spawn(async move {
            let result = prober.probe_dimensions(&file).await;
            (file.name().to_string(), result)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (name, result) = handle.await?;
        results.push(match result {
            Ok(dimensions) => ProbeResult {
                name,
                dimensions: Some(dimensions),
                error: None,
            },
            Err(e) => ProbeResult {
                name,
                dimensions: None,
                error: Some(e.to_string()),
            },
        });
    }

    let failed = results.iter().any(|r| r.error.is_some());

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            match (&result.dimensions, &result.error) {
                (Some(dimensions), _) => println!("{}: {dimensions}", result.name),
                (None, Some(error)) => Status::error(error),
                (None, None) => {}
            }
        }
        for name in &skipped {
            if all {
                Status::warning(&not_accepted_message(name));
            } else {
                Status::info(&format!("{name}: not probed"));
            }
        }
    }

    Ok(if failed {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    })
}

//! Classify command - show how each file would be treated

use crate::input;
use anyhow::Result;
use intake_cli::output::{format_size, not_accepted_message, Status};
use intake_core::error::exit_codes;
use intake_image::{classify, SelectedFile};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct ClassifiedFile<'a> {
    name: &'a str,
    content_type: &'a str,
    size_bytes: usize,
    size: String,
    accepted: bool,
    probe_eligible: bool,
    /// Format found in the bytes, when it can be recognized
    sniffed_type: Option<&'static str>,
}

impl<'a> ClassifiedFile<'a> {
    fn new(file: &'a SelectedFile) -> Self {
        let classification = classify(file);
        Self {
            name: file.name(),
            content_type: file.content_type(),
            size_bytes: file.size(),
            size: format_size(file.size() as u64),
            accepted: classification.accepted,
            probe_eligible: classification.probe_eligible,
            sniffed_type: file.sniffed_format().map(|f| f.mime_type()),
        }
    }

    fn type_mismatch(&self) -> bool {
        self.sniffed_type
            .is_some_and(|sniffed| !self.content_type.is_empty() && sniffed != self.content_type)
    }
}

/// Run classify command
pub fn run(paths: &[PathBuf], json: bool) -> Result<i32> {
    let files = input::collect(paths)?;
    let rows: Vec<_> = files.iter().map(ClassifiedFile::new).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header("Classification");
    for row in &rows {
        if !row.accepted {
            println!("  {} {}", "✗".red(), not_accepted_message(row.name));
            continue;
        }

        let probe = if row.probe_eligible { "probe" } else { "-" };
        println!(
            "  {} {:<32} {:<12} {:>10} {}",
            "✓".green(),
            row.name,
            row.content_type,
            row.size,
            probe.dimmed()
        );
        if row.type_mismatch() {
            Status::warning(&format!(
                "{} is declared {} but looks like {}",
                row.name,
                row.content_type,
                row.sniffed_type.unwrap_or("unknown")
            ));
        }
    }

    let accepted = rows.iter().filter(|r| r.accepted).count();
    println!();
    println!("  {} of {} files accepted", accepted, rows.len());

    Ok(exit_codes::SUCCESS)
}

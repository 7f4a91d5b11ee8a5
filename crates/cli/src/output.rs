//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Status lines go to stderr
//! so that `--json` reports on stdout stay machine-readable.

use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        eprintln!();
        eprintln!("{}", message.bold());
        eprintln!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{mins}m {remaining_secs:.0}s")
    }
}

/// Format a file size the way the upload widget labels it
///
/// One decimal and no space for KB/MB/GB, raw count below 1 KiB:
/// `512bytes`, `1.5KB`, `2.0MB`, `1.1GB`.
pub fn format_size(bytes: u64) -> String {
    let kilobytes = bytes as f64 / 1024.0;
    let megabytes = kilobytes / 1024.0;
    let gigabytes = megabytes / 1024.0;

    if gigabytes >= 1.0 {
        format!("{gigabytes:.1}GB")
    } else if megabytes >= 1.0 {
        format!("{megabytes:.1}MB")
    } else if kilobytes >= 1.0 {
        format!("{kilobytes:.1}KB")
    } else {
        format!("{bytes}bytes")
    }
}

/// Line shown for a file outside the accepted set
pub fn not_accepted_message(name: &str) -> String {
    format!("File name {name}: Not a webp file type.")
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

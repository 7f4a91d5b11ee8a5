//! image-intake: classify, probe, re-encode and upload images.
//!
//! The paths on the command line are the selection. Every accepted image is
//! re-encoded to a JPEG no larger than the configured threshold, saved
//! locally and uploaded.

use clap::{Parser, Subcommand};
use intake_cli::output::Status;
use intake_core::config::Config;
use intake_core::error::exit_codes;
use intake_image::ACCEPTED_EXTENSIONS;
use intake_telemetry::TelemetryConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod input;

use commands::{classify, probe, process, reencode};

#[derive(Parser)]
#[command(name = "image-intake")]
#[command(author, version, about, long_about = None)]
#[command(after_help = format!("Accepted files: {ACCEPTED_EXTENSIONS}"))]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to .image-intake.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which files are accepted and which get their dimensions probed
    Classify {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report pixel dimensions of probe-eligible files
    Probe {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Probe every accepted file, not only webp
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the quality search on one file and save the result
    Reencode {
        /// Image file
        path: PathBuf,

        /// Largest acceptable output in bytes
        #[arg(short, long)]
        threshold: Option<usize>,

        /// Directory the JPEG is written to
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify, probe, re-encode, save and upload a selection
    Process {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory the JPEGs are written to
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Save locally only
        #[arg(long)]
        no_upload: bool,

        /// Include thumbnail data URLs
        #[arg(long)]
        preview: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            return exit_code(exit_codes::CONFIG_ERROR);
        }
    };

    let level = if cli.verbose {
        "debug".to_string()
    } else if cli.quiet {
        "error".to_string()
    } else {
        config.schema.logging.level.clone()
    };
    if let Err(e) = intake_telemetry::init_with_config(&TelemetryConfig::with_level(level)) {
        Status::error(&format!("{e:#}"));
        return exit_code(exit_codes::CONFIG_ERROR);
    }
    tracing::debug!(path = ?config.path, "Configuration loaded");

    let result = match cli.command {
        Commands::Classify { paths, json } => classify::run(&paths, json),
        Commands::Probe { paths, all, json } => probe::run(&paths, all, json, &config).await,
        Commands::Reencode {
            path,
            threshold,
            out_dir,
            json,
        } => reencode::run(&path, threshold, out_dir, json, &config).await,
        Commands::Process {
            paths,
            out_dir,
            no_upload,
            preview,
            json,
        } => {
            let options = process::Options {
                out_dir,
                upload: !no_upload,
                preview,
                json,
                quiet: cli.quiet,
            };
            process::run(&paths, options, &config).await
        }
    };

    match result {
        Ok(code) => exit_code(code),
        Err(e) => {
            Status::error(&format!("{e:#}"));
            let is_config = e
                .downcast_ref::<intake_core::Error>()
                .is_some_and(intake_core::Error::is_config);
            exit_code(if is_config {
                exit_codes::CONFIG_ERROR
            } else {
                exit_codes::FAILURE
            })
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

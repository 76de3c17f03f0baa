//! `fmtconv` CLI: convert a data file between JSON, YAML and XML.
//!
//! ## Usage
//!
//! ```sh
//! # JSON to YAML
//! fmtconv data.json data.yaml
//!
//! # YAML to XML (formats are picked by extension, case-insensitively)
//! fmtconv config.YML config.xml
//!
//! # Quiet, with debug logging on stderr
//! RUST_LOG=debug fmtconv -q in.xml out.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fmtconv_core::{Conversion, ConvertProgress, SUPPORTED_EXTENSIONS};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fmtconv",
    version,
    about = "Convert data files between JSON, YAML and XML",
    after_help = "Supported extensions: .json, .xml, .yml, .yaml"
)]
struct Cli {
    /// Input file; its extension selects the input format
    input: PathBuf,

    /// Output file; its extension selects the output format
    output: PathBuf,

    /// Only report errors
    #[arg(short, long)]
    quiet: bool,

    /// Log each conversion phase to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Validates both extensions before any file is opened.
    let conversion = Conversion::new(&cli.input, &cli.output).with_context(|| {
        format!(
            "Expected input and output files with one of: {}",
            SUPPORTED_EXTENSIONS.join(", ")
        )
    })?;

    if !cli.quiet {
        println!("Input:  {} ({})", cli.input.display(), conversion.input_format());
        println!("Output: {} ({})", cli.output.display(), conversion.output_format());
    }

    let report = conversion
        .run_with_progress(&log_progress)
        .with_context(|| {
            format!(
                "Failed to convert {} to {}",
                cli.input.display(),
                cli.output.display()
            )
        })?;

    if !cli.quiet {
        println!(
            "Converted {} → {} ({} bytes read, {} bytes written)",
            report.input_format, report.output_format, report.bytes_read, report.bytes_written
        );
    }

    Ok(())
}

fn log_progress(progress: &ConvertProgress) {
    tracing::debug!(
        phase = progress.phase.as_str(),
        step = progress.current,
        of = progress.total,
        "{}",
        progress.message.as_deref().unwrap_or("")
    );
}

/// Log to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

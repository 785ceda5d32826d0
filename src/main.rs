//! ACH Builder CLI
//!
//! Reads a CSV entry manifest and writes the rendered ACH file to stdout, or
//! its records as JSON with `--json`.
//!
//! # Usage
//!
//! ```bash
//! ACH_DESTINATION_ROUTING=123456780 ACH_ORIGIN_ROUTING=123456780 \
//! ACH_DESTINATION_NAME="YOUR BANK" ACH_ORIGIN_NAME="YOUR COMPANY" \
//!     cargo run -- entries.csv > payroll.ach
//! cargo run -- --json entries.csv > payroll.json
//! ```
//!
//! # Environment Variables
//!
//! - `ACH_*`: file header settings and build options, see [`FileConfig::from_env`]
//!   and [`BuildOptions::from_env`]
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use ach_builder::{ingest_csv, AchError, BuildOptions, FileBuilder, FileConfig, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let json = args.iter().any(|arg| arg == "--json");
    let input_path = args
        .iter()
        .find(|arg| !arg.starts_with("--"))
        .ok_or(AchError::MissingArgument)?;

    let config = FileConfig::from_env()?;
    let options = BuildOptions::from_env()?;

    let file = File::open(input_path)?;
    let reader = BufReader::new(file);

    let mut builder = FileBuilder::with_options(&config, options)?;
    let report = ingest_csv(&mut builder, reader)?;
    if !report.skipped.is_empty() {
        log::warn!(
            "Skipped {} of {} rows",
            report.skipped.len(),
            report.skipped.len() + report.entries
        );
    }

    let text = if json {
        let mut text = builder.to_json()?;
        text.push('\n');
        text
    } else {
        builder.render()?
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes())?;
    handle.flush()?;

    Ok(())
}

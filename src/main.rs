use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use ris2csv::prompt::{
    prompt_input_path, prompt_output_path, validate_input_path, validate_output_path,
    wait_for_acknowledgement,
};
use ris2csv::{ConvertConfig, Converter, Schema, TrailingRecord};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// Convert RIS bibliographic records into a CSV table.
///
/// Paths that are not given as arguments are asked for interactively.
#[derive(Parser, Debug)]
#[command(name = "ris2csv", version)]
struct Args {
    /// RIS file to convert
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// CSV file to write
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Schema table with one `TAG,Label,ColumnNumber` line per tag
    #[arg(short, long, env = "RIS2CSV_SCHEMA")]
    schema: Option<PathBuf>,
    /// Drop a last record that has no closing ER tag instead of writing it
    #[arg(long)]
    discard_trailing: bool,
    /// Exit on error without waiting for <return>
    #[arg(long)]
    no_pause: bool,
}

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    println!("Welcome to the RIS>CSV Converter.");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            if !args.no_pause {
                let _ = wait_for_acknowledgement(&mut io::stdin().lock(), &mut io::stdout());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    // The schema is checked before anything is asked or written.
    let schema = match &args.schema {
        Some(path) => Schema::from_path(path)
            .with_context(|| format!("failed to load schema table {}", path.display()))?,
        None => Schema::standard(),
    };
    info!(tags = schema.len(), columns = schema.width(), "schema loaded");

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout();

    let ris_path = match &args.input {
        Some(path) => validate_input_path(path)?,
        None => prompt_input_path(&mut stdin, &mut stdout)?,
    };
    let csv_path = match &args.output {
        Some(path) => validate_output_path(path)?,
        None => prompt_output_path(&mut stdin, &mut stdout)?,
    };

    let mut config = ConvertConfig::new();
    config.set_schema(schema);
    if args.discard_trailing {
        config.set_trailing_record(TrailingRecord::Discard);
    }

    let summary = Converter::with_config(config)
        .convert_file(&ris_path, &csv_path)
        .with_context(|| format!("failed to convert {}", ris_path.display()))?;

    let location = csv_path.canonicalize().unwrap_or(csv_path);
    println!("\nConversion process complete.\n");
    println!("Your new file is located here: {}", location.display());
    println!("Records written: {}", summary.records_written);
    if !summary.unknown_tags.is_empty() {
        println!(
            "Skipped {} values with tags not in the schema: {}",
            summary.pairs_skipped,
            summary.unknown_tags.iter().join(", ")
        );
    }

    Ok(())
}

pub mod amounts;
pub mod analyzer;
pub mod cleaner;
pub mod cli;
pub mod columns;
pub mod data;
pub mod dates;
pub mod fields;
pub mod io_utils;
pub mod report;
pub mod synonyms;
pub mod table;

use std::{env, fs::File, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};
use serde::Serialize;

use crate::cleaner::CleaningPolicy;
use crate::cli::{AnalyzeArgs, CleanArgs, Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_refine", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Clean(args) => handle_clean(&args),
        Commands::Analyze(args) => handle_analyze(&args),
    }
}

fn handle_clean(args: &CleanArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    let policy = CleaningPolicy {
        invalid_dates: args.invalid_dates.parse()?,
        invalid_amounts: args.invalid_amounts.parse()?,
        ..CleaningPolicy::default()
    };

    info!("Cleaning '{}'", args.input.display());
    let raw = io_utils::read_table(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading table from {:?}", args.input))?;
    let (cleaned, summary) = cleaner::clean(&raw, &policy)?;

    if let Some(output) = &args.output {
        io_utils::write_table(&cleaned, Some(output), delimiter)
            .with_context(|| format!("Writing cleaned table to {output:?}"))?;
    }
    if let Some(path) = &args.summary {
        write_json(&summary, path).with_context(|| format!("Writing summary to {path:?}"))?;
    }

    table::print_table(&report::key_value_headers(), &report::summary_rows(&summary));
    info!(
        "Cleaned {} row(s) into {} row(s) with {} warning(s)",
        summary.rows_before,
        summary.rows_after,
        summary.warnings.len()
    );
    Ok(())
}

fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    info!("Analyzing '{}'", args.input.display());
    let raw = io_utils::read_table(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading table from {:?}", args.input))?;
    let (cleaned, result) = analyzer::analyze(&raw);

    if let Some(output) = &args.output {
        io_utils::write_table(&cleaned, Some(output), delimiter)
            .with_context(|| format!("Writing cleaned table to {output:?}"))?;
    }
    if let Some(path) = &args.report {
        write_json(&result, path).with_context(|| format!("Writing report to {path:?}"))?;
    }

    table::print_table(&report::key_value_headers(), &report::analysis_rows(&result));
    if !result.numeric_summary.is_empty() {
        table::print_table(
            &report::numeric_summary_headers(),
            &report::numeric_summary_rows(&result),
        );
    }
    info!(
        "Analyzed {} row(s) across {} column(s)",
        result.rows, result.cols
    );
    Ok(())
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating file {path:?}"))?;
    serde_json::to_writer_pretty(file, value).context("Writing JSON")?;
    Ok(())
}

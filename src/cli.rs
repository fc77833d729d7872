use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Normalize messy tabular exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean a sales export into the canonical eight-column schema
    Clean(CleanArgs),
    /// Analyze a table of unknown schema and infer column roles
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file for the cleaned table (stdout if '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write the cleaning summary as JSON to this path
    #[arg(long = "summary")]
    pub summary: Option<PathBuf>,
    /// Rows with unparseable dates: 'drop' or 'keep'
    #[arg(long = "invalid-dates", default_value = "drop")]
    pub invalid_dates: String,
    /// Unparseable amounts: 'drop', 'zero', or 'keep'
    #[arg(long = "invalid-amounts", default_value = "keep")]
    pub invalid_amounts: String,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output CSV file for the cleaned table (stdout if '-')
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write the analysis result as JSON to this path
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" => Ok(b'\t'),
        value if value.len() == 1 => Ok(value.as_bytes()[0]),
        other => Err(format!("Unsupported delimiter '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_parsing_accepts_named_tab() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("comma").is_err());
    }

    #[test]
    fn clean_command_parses_policies() {
        let cli = Cli::try_parse_from([
            "csv-refine",
            "clean",
            "-i",
            "orders.csv",
            "--invalid-dates",
            "keep",
            "--invalid-amounts",
            "zero",
        ])
        .unwrap();
        match cli.command {
            Commands::Clean(args) => {
                assert_eq!(args.invalid_dates, "keep");
                assert_eq!(args.invalid_amounts, "zero");
            }
            other => panic!("expected clean command, got {other:?}"),
        }
    }
}

//! CSV loading and writing for the cleaning pipelines.
//!
//! The core operates on in-memory [`Table`] values; this module is the thin
//! upstream/downstream adapter: extension-based delimiter detection
//! (`.tsv` → tab), input decoding via `encoding_rs` (UTF-8 default), and the
//! `-` path convention for stdin/stdout. Loaded cells are `Text`, with empty
//! fields mapped to `Null`; output is always UTF-8.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::data::Cell;
use crate::table::Table;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Reads a CSV file (or stdin via `-`) into an untyped [`Table`]. The first
/// record is the header row; short records are padded with missing cells so
/// the table stays rectangular.
pub fn read_table(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Table> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut reader = open_csv_reader(reader, delimiter);

    let headers = reader
        .byte_headers()
        .context("Reading header row")?
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let mut row = Vec::with_capacity(headers.len());
        for field in record.iter().take(headers.len()) {
            let text = decode_bytes(field, encoding)
                .with_context(|| format!("Decoding row {}", row_idx + 2))?;
            row.push(if text.is_empty() {
                Cell::Null
            } else {
                Cell::Text(text)
            });
        }
        row.resize(headers.len(), Cell::Null);
        rows.push(row);
    }
    Table::new(headers, rows)
}

/// Writes a table as UTF-8 CSV to `path`, or stdout when `path` is `None`
/// or `-`. Null cells are written as empty fields.
pub fn write_table(table: &Table, path: Option<&Path>, delimiter: u8) -> Result<()> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    let mut writer = builder.from_writer(writer);

    writer
        .write_record(table.columns())
        .context("Writing header row")?;
    for row in table.rows() {
        let record = row.iter().map(Cell::as_display).collect::<Vec<_>>();
        writer.write_record(&record).context("Writing data row")?;
    }
    writer.flush().context("Flushing CSV output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_resolution_prefers_override_then_extension() {
        assert_eq!(
            resolve_input_delimiter(Path::new("data.tsv"), None),
            DEFAULT_TSV_DELIMITER
        );
        assert_eq!(
            resolve_input_delimiter(Path::new("data.csv"), None),
            DEFAULT_CSV_DELIMITER
        );
        assert_eq!(resolve_input_delimiter(Path::new("data.tsv"), Some(b';')), b';');
    }

    #[test]
    fn unknown_encoding_label_is_an_error() {
        assert!(resolve_encoding(Some("definitely-not-real")).is_err());
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
    }

    #[test]
    fn short_rows_pad_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.csv");
        std::fs::write(&path, "a,b,c\n1,2\n").unwrap();
        let table = read_table(&path, b',', UTF_8).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell(0, 2), &Cell::Null);
    }

    #[test]
    fn empty_fields_load_as_null_and_write_back_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.csv");
        std::fs::write(&path, "a,b\nx,\n").unwrap();
        let table = read_table(&path, b',', UTF_8).unwrap();
        assert_eq!(table.cell(0, 1), &Cell::Null);

        let out = dir.path().join("out.csv");
        write_table(&table, Some(&out), b',').unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("\"a\",\"b\""));
        assert!(written.contains("\"x\",\"\""));
    }
}

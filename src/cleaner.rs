//! Canonical sales-schema cleaning pipeline.
//!
//! [`clean`] maps an arbitrary raw table onto the fixed eight-field sales
//! schema: resolve header synonyms, coalesce duplicate sources, parse
//! locale-ambiguous dates and amounts, normalize text and payment status,
//! drop empty and duplicate rows, and account for every change in a
//! [`CleaningSummary`]. Failure is fatal for the whole call; per-value parse
//! failures are counted and handled by policy, never raised.

use std::collections::HashSet;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amounts;
use crate::data::Cell;
use crate::dates;
use crate::fields;
use crate::synonyms::{CanonicalField, SynonymTable, resolve_columns};
use crate::table::Table;

#[derive(Debug, Error)]
pub enum CleaningError {
    #[error("Input is not a valid table: {0}")]
    NotATable(String),
    #[error("The input table has no rows")]
    EmptyInput,
    #[error("Missing required column: {field} (e.g. {hint})")]
    MissingRequiredColumn {
        field: &'static str,
        hint: &'static str,
    },
    #[error("Invalid {axis} policy value '{value}'")]
    InvalidPolicyValue { axis: &'static str, value: String },
}

/// What to do with rows whose date fails both parsing passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidDatePolicy {
    #[default]
    Drop,
    Keep,
}

impl FromStr for InvalidDatePolicy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(InvalidDatePolicy::Drop),
            "keep" => Ok(InvalidDatePolicy::Keep),
            other => Err(CleaningError::InvalidPolicyValue {
                axis: "invalid-date",
                value: other.to_string(),
            }),
        }
    }
}

/// What to do with amount values that fail the decision-tree parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidAmountPolicy {
    Drop,
    Zero,
    #[default]
    KeepNull,
}

impl FromStr for InvalidAmountPolicy {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(InvalidAmountPolicy::Drop),
            "zero" => Ok(InvalidAmountPolicy::Zero),
            "keep" | "keep_null" => Ok(InvalidAmountPolicy::KeepNull),
            other => Err(CleaningError::InvalidPolicyValue {
                axis: "invalid-amount",
                value: other.to_string(),
            }),
        }
    }
}

/// Fill values for missing text fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDefaults {
    pub customer: String,
    pub product: String,
    pub category: String,
    pub payment_status: String,
    pub city: String,
    pub country: String,
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            customer: "Anonymous".to_string(),
            product: "Unknown".to_string(),
            category: "Unknown".to_string(),
            payment_status: "Unknown".to_string(),
            city: "Unknown".to_string(),
            country: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningPolicy {
    pub invalid_dates: InvalidDatePolicy,
    pub invalid_amounts: InvalidAmountPolicy,
    pub defaults: TextDefaults,
}

/// Machine-readable account of everything the pipeline changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub empty_rows_dropped: usize,
    pub duplicates_removed: usize,
    pub invalid_dates: usize,
    pub invalid_amounts: usize,
    pub filled_customer: usize,
    pub filled_product: usize,
    pub filled_category: usize,
    pub warnings: Vec<String>,
}

/// Cleans `raw` against the builtin synonym vocabulary.
pub fn clean(raw: &Table, policy: &CleaningPolicy) -> Result<(Table, CleaningSummary), CleaningError> {
    clean_with(raw, policy, SynonymTable::builtin())
}

/// Cleans `raw` against an explicit vocabulary.
pub fn clean_with(
    raw: &Table,
    policy: &CleaningPolicy,
    synonyms: &SynonymTable,
) -> Result<(Table, CleaningSummary), CleaningError> {
    if raw.column_count() == 0 {
        return Err(CleaningError::NotATable(
            "the table defines no columns".to_string(),
        ));
    }
    let rows_before = raw.row_count();
    if rows_before == 0 {
        return Err(CleaningError::EmptyInput);
    }

    let mut warnings = Vec::new();

    let populated = raw.retain_rows(|row| !Table::is_row_empty(row));
    let empty_rows_dropped = rows_before - populated.row_count();

    let resolved = resolve_columns(populated.columns(), synonyms);
    for field in CanonicalField::ALL {
        if field.is_required() && resolved.sources_for(field).is_empty() {
            return Err(CleaningError::MissingRequiredColumn {
                field: field.as_str(),
                hint: field.spelling_hint(),
            });
        }
    }

    let mut out = assemble_canonical(&populated, &resolved, &mut warnings);
    debug!(
        "Resolved {} canonical field(s), {} passthrough column(s)",
        CanonicalField::ALL.len(),
        resolved.passthrough.len()
    );

    // Dates, then the date policy.
    let date_idx = 0;
    let parsed_dates = dates::parse_date_column(&out.column_values(date_idx));
    out = out.with_column_values(date_idx, parsed_dates);
    let invalid_dates = count_nulls(&out, date_idx);
    if invalid_dates > 0 && policy.invalid_dates == InvalidDatePolicy::Drop {
        out = out.retain_rows(|row| !row[date_idx].is_null());
    }

    // Amounts, then the amount policy.
    let amount_idx = 4;
    let parsed_amounts = amounts::parse_amount_column(&out.column_values(amount_idx));
    out = out.with_column_values(amount_idx, parsed_amounts);
    let invalid_amounts = count_nulls(&out, amount_idx);
    if invalid_amounts > 0 {
        match policy.invalid_amounts {
            InvalidAmountPolicy::Drop => {
                out = out.retain_rows(|row| !row[amount_idx].is_null());
            }
            InvalidAmountPolicy::Zero => {
                let filled = out
                    .column_values(amount_idx)
                    .into_iter()
                    .map(|cell| if cell.is_null() { Cell::Number(0.0) } else { cell })
                    .collect();
                out = out.with_column_values(amount_idx, filled);
            }
            InvalidAmountPolicy::KeepNull => {}
        }
    }

    // Text fields. Fill counts are reported for customer/product/category.
    let (customer, filled_customer) =
        fields::clean_text_column(&out.column_values(1), &policy.defaults.customer);
    out = out.with_column_values(1, customer);
    let (product, filled_product) =
        fields::clean_text_column(&out.column_values(2), &policy.defaults.product);
    out = out.with_column_values(2, product);
    let (category, filled_category) =
        fields::clean_text_column(&out.column_values(3), &policy.defaults.category);
    out = out.with_column_values(3, category);
    let (city, _) = fields::clean_text_column(&out.column_values(6), &policy.defaults.city);
    out = out.with_column_values(6, city);
    let (country, _) = fields::clean_text_column(&out.column_values(7), &policy.defaults.country);
    out = out.with_column_values(7, country);

    let status =
        fields::normalize_payment_column(&out.column_values(5), &policy.defaults.payment_status);
    out = out.with_column_values(5, status);

    // Exact duplicates, detected after normalization so formatting noise in
    // the raw input cannot mask them.
    let before_dedupe = out.row_count();
    out = dedupe_rows(&out);
    let duplicates_removed = before_dedupe - out.row_count();

    let rows_after = out.row_count();
    let summary = CleaningSummary {
        rows_before,
        rows_after,
        empty_rows_dropped,
        duplicates_removed,
        invalid_dates,
        invalid_amounts,
        filled_customer,
        filled_product,
        filled_category,
        warnings,
    };
    Ok((out, summary))
}

/// Builds the canonical table: eight fixed fields first, coalesced from their
/// source columns, then passthrough columns in original order.
fn assemble_canonical(
    input: &Table,
    resolved: &crate::synonyms::ResolvedColumns,
    warnings: &mut Vec<String>,
) -> Table {
    let mut columns = Vec::with_capacity(CanonicalField::ALL.len() + resolved.passthrough.len());
    let mut field_sources = Vec::new();
    for field in CanonicalField::ALL {
        let sources = resolved.sources_for(field);
        columns.push(field.as_str().to_string());
        field_sources.push(sources.to_vec());
        if sources.len() > 1 {
            let names = sources
                .iter()
                .map(|&idx| input.columns()[idx].clone())
                .collect::<Vec<_>>();
            warnings.push(format!(
                "Merged {} columns into '{}': {:?}",
                sources.len(),
                field.as_str(),
                names
            ));
        }
    }
    for &idx in &resolved.passthrough {
        columns.push(input.columns()[idx].clone());
    }

    let rows = input
        .rows()
        .iter()
        .map(|row| {
            let mut out_row = Vec::with_capacity(columns.len());
            for sources in &field_sources {
                out_row.push(coalesce_cell(row, sources));
            }
            for &idx in &resolved.passthrough {
                out_row.push(row[idx].clone());
            }
            out_row
        })
        .collect::<Vec<_>>();

    Table::new(columns, rows).expect("canonical rows match canonical header width")
}

/// First non-null wins, scanning source columns left to right.
fn coalesce_cell(row: &[Cell], sources: &[usize]) -> Cell {
    sources
        .iter()
        .map(|&idx| &row[idx])
        .find(|cell| !cell.is_null())
        .cloned()
        .unwrap_or(Cell::Null)
}

fn count_nulls(table: &Table, column: usize) -> usize {
    table
        .rows()
        .iter()
        .filter(|row| row[column].is_null())
        .count()
}

fn dedupe_rows(table: &Table) -> Table {
    let mut seen: HashSet<Vec<Cell>> = HashSet::new();
    table.retain_rows(|row| seen.insert(row.to_vec()))
}

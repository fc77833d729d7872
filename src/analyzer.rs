//! Schema-agnostic table analysis.
//!
//! Fallback pipeline for tables with no known schema: normalize headers,
//! infer which column holds dates and which columns are numeric from parse
//! success rates, pick a primary metric, and produce descriptive statistics,
//! top value counts, and a daily aggregate. This pipeline never fails — for
//! garbage input it returns an empty result whose notes explain why.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::columns::{normalize_column_name, uniquify_columns};
use crate::data::Cell;
use crate::dates::parse_date_lenient;
use crate::table::Table;

/// Candidate columns whose names contain one of these are probed for dates
/// first.
const DATE_NAME_HINTS: &[&str] = &["date", "time", "day"];

/// At most this many candidate columns are probed for dates.
const DATE_SCAN_LIMIT: usize = 15;

/// Minimum fraction of values that must parse as dates to accept a column.
const DATE_SUCCESS_THRESHOLD: f64 = 0.20;

/// Minimum fraction of non-missing values that must coerce numerically.
const NUMERIC_SUCCESS_THRESHOLD: f64 = 0.70;

/// Metric-name fragments preferred when picking the primary numeric column.
const METRIC_NAME_PRIORITY: &[&str] = &[
    "amount",
    "revenue",
    "total",
    "price",
    "views",
    "watch_time",
    "impressions",
    "ctr",
];

const TOP_CATEGORY_COLUMNS: usize = 3;
const TOP_CATEGORY_VALUES: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCategory {
    pub column: String,
    pub values: Vec<ValueCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericAnalysisResult {
    pub rows: usize,
    pub cols: usize,
    pub missing_cells: usize,
    pub missing_pct: f64,
    pub duplicate_rows: usize,
    pub date_col: Option<String>,
    pub primary_numeric_col: Option<String>,
    pub numeric_summary: Vec<NumericSummary>,
    pub top_categories: Vec<TopCategory>,
    pub daily_trend: Vec<DailyPoint>,
    pub notes: Vec<String>,
}

impl GenericAnalysisResult {
    fn empty_with_note(note: &str) -> Self {
        Self {
            rows: 0,
            cols: 0,
            missing_cells: 0,
            missing_pct: 0.0,
            duplicate_rows: 0,
            date_col: None,
            primary_numeric_col: None,
            numeric_summary: Vec::new(),
            top_categories: Vec::new(),
            daily_trend: Vec::new(),
            notes: vec![note.to_string()],
        }
    }
}

/// Analyzes a table of unknown schema. Infallible: degraded results with
/// explanatory notes are the designed outcome for unusable input.
pub fn analyze(raw: &Table) -> (Table, GenericAnalysisResult) {
    let cleaned = basic_clean(raw);
    if cleaned.is_empty() {
        return (
            Table::empty(),
            GenericAnalysisResult::empty_with_note("Empty file after cleaning (no rows)."),
        );
    }

    let before_dedupe = cleaned.row_count();
    let mut seen = std::collections::HashSet::new();
    let table = cleaned.retain_rows(|row| seen.insert(row.to_vec()));
    let duplicate_rows = before_dedupe - table.row_count();

    let rows = table.row_count();
    let cols = table.column_count();
    let missing_cells = table
        .rows()
        .iter()
        .flat_map(|row| row.iter())
        .filter(|cell| cell.is_null())
        .count();
    let missing_pct = missing_cells as f64 / (rows * cols).max(1) as f64;

    let mut notes = Vec::new();
    if duplicate_rows > 0 {
        notes.push(format!("Removed {duplicate_rows} duplicate rows."));
    }
    if missing_pct > 0.1 {
        notes.push(format!(
            "High missingness detected: {:.1}% of cells are missing.",
            missing_pct * 100.0
        ));
    }

    let date_col = infer_date_column(&table);
    let (table, numeric_cols) = infer_numeric_columns(table);
    let primary_numeric_col = pick_primary_metric(&table, &numeric_cols);
    debug!(
        "Inferred date column {:?}, {} numeric column(s), primary metric {:?}",
        date_col,
        numeric_cols.len(),
        primary_numeric_col
    );

    let numeric_summary = numeric_cols
        .iter()
        .filter_map(|&idx| summarize_numeric(&table, idx))
        .collect::<Vec<_>>();
    if numeric_cols.is_empty() {
        notes.push("No numeric columns detected (or numeric-like).".to_string());
    }

    let top_categories = top_categories(&table, &numeric_cols);

    let daily_trend = match (&date_col, &primary_numeric_col) {
        (Some(date_name), Some(metric_name)) => {
            let trend = daily_trend(&table, date_name, metric_name);
            if trend.is_empty() {
                notes.push(
                    "Date column found, but no valid parsed dates for trend chart.".to_string(),
                );
            }
            trend
        }
        _ => {
            notes.push("Trend chart skipped (missing date column or numeric metric).".to_string());
            Vec::new()
        }
    };

    let result = GenericAnalysisResult {
        rows,
        cols,
        missing_cells,
        missing_pct,
        duplicate_rows,
        date_col,
        primary_numeric_col,
        numeric_summary,
        top_categories,
        daily_trend,
        notes,
    };
    (table, result)
}

/// Normalizes headers (with uniqueness suffixes), drops all-missing rows, and
/// trims text cells. Blank text becomes missing.
fn basic_clean(raw: &Table) -> Table {
    if raw.column_count() == 0 || raw.row_count() == 0 {
        return Table::empty();
    }
    let tokens = raw
        .columns()
        .iter()
        .map(|name| normalize_column_name(name))
        .collect::<Vec<_>>();
    let columns = uniquify_columns(&tokens);
    let rows = raw
        .rows()
        .iter()
        .filter(|row| !Table::is_row_empty(row))
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Text(s) => {
                        let trimmed = s.trim();
                        if trimmed.is_empty() {
                            Cell::Null
                        } else {
                            Cell::Text(trimmed.to_string())
                        }
                    }
                    other => other.clone(),
                })
                .collect()
        })
        .collect::<Vec<Vec<Cell>>>();
    Table::new(columns, rows).expect("cleaned rows keep input width")
}

/// Picks the column with the highest date-parse success fraction, probing
/// name-hinted candidates first and at most [`DATE_SCAN_LIMIT`] in total.
/// Accepts only if the winner reaches [`DATE_SUCCESS_THRESHOLD`].
pub fn infer_date_column(table: &Table) -> Option<String> {
    if table.is_empty() {
        return None;
    }
    let hinted = (0..table.column_count())
        .filter(|&idx| {
            let name = &table.columns()[idx];
            DATE_NAME_HINTS.iter().any(|hint| name.contains(hint))
        })
        .collect::<Vec<_>>();
    let rest = (0..table.column_count()).filter(|idx| !hinted.contains(idx));
    let candidates = hinted
        .iter()
        .copied()
        .chain(rest)
        .take(DATE_SCAN_LIMIT)
        .collect::<Vec<_>>();

    let mut best: Option<(usize, f64)> = None;
    for idx in candidates {
        let values = table.column_values(idx);
        if values.iter().any(|c| c.as_date().is_some())
            && values
                .iter()
                .all(|c| c.is_null() || c.as_date().is_some())
        {
            // Already typed as dates: accepted outright.
            return Some(table.columns()[idx].clone());
        }
        let parsed = values
            .iter()
            .filter(|cell| match cell {
                Cell::Text(s) => parse_date_lenient(s).is_some(),
                Cell::Date(_) => true,
                _ => false,
            })
            .count();
        let success = parsed as f64 / values.len().max(1) as f64;
        if best.is_none_or(|(_, best_success)| success > best_success) {
            best = Some((idx, success));
        }
    }

    best.filter(|&(_, success)| success >= DATE_SUCCESS_THRESHOLD)
        .map(|(idx, _)| table.columns()[idx].clone())
}

/// Coerces text columns to numbers where at least
/// [`NUMERIC_SUCCESS_THRESHOLD`] of non-missing values parse after stripping
/// thousands separators and currency markers. Accepted columns are replaced
/// in place with their coerced values; returns the (possibly updated) table
/// and the indices of all numeric columns.
pub fn infer_numeric_columns(table: Table) -> (Table, Vec<usize>) {
    let mut table = table;
    let mut numeric_cols = Vec::new();
    for idx in 0..table.column_count() {
        let values = table.column_values(idx);
        let non_missing = values.iter().filter(|c| !c.is_null()).count();
        if non_missing == 0 {
            continue;
        }
        if values
            .iter()
            .all(|c| c.is_null() || c.as_number().is_some())
        {
            numeric_cols.push(idx);
            continue;
        }
        let coerced = values
            .iter()
            .map(|cell| match cell {
                Cell::Number(n) => Some(*n),
                Cell::Text(s) => coerce_numeric(s),
                _ => None,
            })
            .collect::<Vec<_>>();
        let successes = coerced.iter().filter(|v| v.is_some()).count();
        if successes as f64 / non_missing as f64 >= NUMERIC_SUCCESS_THRESHOLD {
            let cells = coerced
                .into_iter()
                .map(|v| v.map_or(Cell::Null, Cell::Number))
                .collect();
            table = table.with_column_values(idx, cells);
            numeric_cols.push(idx);
        }
    }
    (table, numeric_cols)
}

/// Best-effort numeric coercion for strings like `"1,234"`, `"$5.20"`,
/// `"(2.9)"`, `"12 TL"`.
fn coerce_numeric(raw: &str) -> Option<f64> {
    let mut s = raw.trim().to_lowercase();
    for marker in ["tl", "usd"] {
        s = s.replace(marker, "");
    }
    let s = s
        .replace(',', "")
        .replace(['$', '€', '₺'], "")
        .replace('(', "-")
        .replace(')', "");
    s.trim().parse::<f64>().ok()
}

/// Prefers metric-sounding names, then the numeric column with the most
/// non-missing values.
pub fn pick_primary_metric(table: &Table, numeric_cols: &[usize]) -> Option<String> {
    if numeric_cols.is_empty() {
        return None;
    }
    for fragment in METRIC_NAME_PRIORITY {
        for &idx in numeric_cols {
            if table.columns()[idx].contains(fragment) {
                return Some(table.columns()[idx].clone());
            }
        }
    }
    let best = numeric_cols
        .iter()
        .copied()
        .max_by_key(|&idx| {
            table
                .column_values(idx)
                .iter()
                .filter(|c| !c.is_null())
                .count()
        })?;
    Some(table.columns()[best].clone())
}

fn summarize_numeric(table: &Table, idx: usize) -> Option<NumericSummary> {
    let values = table
        .column_values(idx)
        .iter()
        .filter_map(Cell::as_number)
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    let std_dev = if count >= 2 {
        let sum_squares: f64 = values.iter().map(|v| v * v).sum();
        let variance = (sum_squares - count as f64 * mean * mean) / (count as f64 - 1.0);
        Some(variance.max(0.0).sqrt())
    } else {
        None
    };
    Some(NumericSummary {
        column: table.columns()[idx].clone(),
        count,
        min,
        max,
        mean,
        median,
        std_dev,
    })
}

/// Top value counts for up to the first [`TOP_CATEGORY_COLUMNS`] text
/// columns. Missing values count under `"Unknown"`.
fn top_categories(table: &Table, numeric_cols: &[usize]) -> Vec<TopCategory> {
    (0..table.column_count())
        .filter(|idx| !numeric_cols.contains(idx))
        .filter(|&idx| {
            table
                .rows()
                .iter()
                .any(|row| matches!(row[idx], Cell::Text(_)))
        })
        .take(TOP_CATEGORY_COLUMNS)
        .map(|idx| {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for row in table.rows() {
                let value = match &row[idx] {
                    Cell::Null => "Unknown".to_string(),
                    cell => cell.as_display(),
                };
                *counts.entry(value).or_insert(0) += 1;
            }
            let values = counts
                .into_iter()
                .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
                .take(TOP_CATEGORY_VALUES)
                .map(|(value, count)| ValueCount { value, count })
                .collect();
            TopCategory {
                column: table.columns()[idx].clone(),
                values,
            }
        })
        .collect()
}

/// Groups the primary metric by calendar day. Rows whose date cell fails to
/// parse are excluded; null metric values count as zero.
fn daily_trend(table: &Table, date_col: &str, metric_col: &str) -> Vec<DailyPoint> {
    let (Some(date_idx), Some(metric_idx)) =
        (table.column_index(date_col), table.column_index(metric_col))
    else {
        return Vec::new();
    };
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in table.rows() {
        let day = match &row[date_idx] {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date_lenient(s),
            _ => None,
        };
        let Some(day) = day else { continue };
        let value = row[metric_idx].as_number().unwrap_or(0.0);
        *by_day.entry(day).or_insert(0.0) += value;
    }
    by_day
        .into_iter()
        .map(|(day, value)| DailyPoint { day, value })
        .collect()
}

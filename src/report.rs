//! Flattening summaries into display rows.
//!
//! Downstream presentation treats both summary types as flat key→value
//! tables; optional fields render as empty or zero rather than erroring.

use crate::analyzer::GenericAnalysisResult;
use crate::cleaner::CleaningSummary;

pub fn key_value_headers() -> Vec<String> {
    vec!["key".to_string(), "value".to_string()]
}

/// Flattens a [`CleaningSummary`] into key→value rows. Warnings become one
/// numbered row each.
pub fn summary_rows(summary: &CleaningSummary) -> Vec<Vec<String>> {
    let mut rows = vec![
        pair("rows_before", summary.rows_before),
        pair("rows_after", summary.rows_after),
        pair("empty_rows_dropped", summary.empty_rows_dropped),
        pair("duplicates_removed", summary.duplicates_removed),
        pair("invalid_dates", summary.invalid_dates),
        pair("invalid_amounts", summary.invalid_amounts),
        pair("filled_customer", summary.filled_customer),
        pair("filled_product", summary.filled_product),
        pair("filled_category", summary.filled_category),
    ];
    for (idx, warning) in summary.warnings.iter().enumerate() {
        rows.push(vec![format!("warning_{}", idx + 1), warning.clone()]);
    }
    rows
}

/// Flattens a [`GenericAnalysisResult`] into key→value rows.
pub fn analysis_rows(result: &GenericAnalysisResult) -> Vec<Vec<String>> {
    let mut rows = vec![
        pair("rows", result.rows),
        pair("cols", result.cols),
        pair("missing_cells", result.missing_cells),
        vec![
            "missing_pct".to_string(),
            format!("{:.1}%", result.missing_pct * 100.0),
        ],
        pair("duplicate_rows", result.duplicate_rows),
        vec![
            "date_col".to_string(),
            result.date_col.clone().unwrap_or_default(),
        ],
        vec![
            "primary_numeric_col".to_string(),
            result.primary_numeric_col.clone().unwrap_or_default(),
        ],
    ];
    for (idx, note) in result.notes.iter().enumerate() {
        rows.push(vec![format!("note_{}", idx + 1), note.clone()]);
    }
    rows
}

/// Per-column statistics rows for the analysis report table.
pub fn numeric_summary_rows(result: &GenericAnalysisResult) -> Vec<Vec<String>> {
    result
        .numeric_summary
        .iter()
        .map(|stats| {
            vec![
                stats.column.clone(),
                stats.count.to_string(),
                format_stat(stats.min),
                format_stat(stats.max),
                format_stat(stats.mean),
                format_stat(stats.median),
                stats.std_dev.map(format_stat).unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn numeric_summary_headers() -> Vec<String> {
    ["column", "count", "min", "max", "mean", "median", "std_dev"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn pair(key: &str, value: usize) -> Vec<String> {
    vec![key.to_string(), value.to_string()]
}

fn format_stat(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

//! Text field and payment status normalization.

use crate::data::Cell;

/// Trims text cells, treats blank values as missing, and fills missing values
/// with `default`. Returns the filled column and the missing count.
pub fn clean_text_column(values: &[Cell], default: &str) -> (Vec<Cell>, usize) {
    let mut missing = 0usize;
    let cleaned = values
        .iter()
        .map(|cell| match cell {
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    missing += 1;
                    Cell::Text(default.to_string())
                } else {
                    Cell::Text(trimmed.to_string())
                }
            }
            Cell::Number(n) => Cell::Text(crate::data::format_number(*n)),
            Cell::Date(d) => Cell::Text(d.format("%Y-%m-%d").to_string()),
            Cell::Null => {
                missing += 1;
                Cell::Text(default.to_string())
            }
        })
        .collect();
    (cleaned, missing)
}

const PAID_TOKENS: &[&str] = &["paid", "yes", "y", "true", "1"];
const UNPAID_TOKENS: &[&str] = &["unpaid", "no", "n", "false", "0", "pending"];

/// Maps one raw status value onto the 3-valued vocabulary. Total.
pub fn normalize_payment_value(cell: &Cell, default: &str) -> String {
    let token = match cell {
        Cell::Text(s) => s.trim().to_lowercase(),
        Cell::Number(n) => crate::data::format_number(*n),
        Cell::Date(_) | Cell::Null => String::new(),
    };
    if token.is_empty() {
        default.to_string()
    } else if PAID_TOKENS.contains(&token.as_str()) {
        "Paid".to_string()
    } else if UNPAID_TOKENS.contains(&token.as_str()) {
        "Unpaid".to_string()
    } else {
        default.to_string()
    }
}

pub fn normalize_payment_column(values: &[Cell], default: &str) -> Vec<Cell> {
    values
        .iter()
        .map(|cell| Cell::Text(normalize_payment_value(cell, default)))
        .collect()
}

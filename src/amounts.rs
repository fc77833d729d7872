//! Locale-ambiguous amount parsing.
//!
//! Amount cells arrive as `$1,234.56`, `1.234,56 TL`, `(250)`, `N/A`, or
//! already-numeric values. [`parse_amount`] is a total decision tree: every
//! input yields either a float or `None`, never an error. Separator
//! disambiguation follows the rightmost-separator rule, and a lone comma group
//! with a two-digit tail is read as a decimal comma.

use crate::data::Cell;

/// Tokens that mean "no amount" rather than a malformed one.
const BAD_TOKENS: &[&str] = &["", "n/a", "na", "none", "nan", "—", "-", "free"];

/// Parses one amount string into a nullable float.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if BAD_TOKENS.contains(&lowered.as_str()) {
        return None;
    }

    let negative = trimmed.contains('(') && trimmed.contains(')');
    let stripped = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect::<String>();

    let mut s = disambiguate_separators(&stripped);

    while s.contains("--") {
        s = s.replace("--", "-");
    }
    if s.matches('-').count() > 1 {
        // Compatibility behavior: a malformed multi-minus value keeps its
        // magnitude instead of failing.
        s = s.replace('-', "");
    }
    if negative && !s.starts_with('-') {
        s.insert(0, '-');
    }

    s.parse::<f64>().ok()
}

fn disambiguate_separators(s: &str) -> String {
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');
    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            if comma > dot {
                // European style: dots group thousands, comma is decimal.
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (Some(_), None) => {
            let groups = s.split(',').collect::<Vec<_>>();
            if groups.last().is_some_and(|tail| tail.len() == 2) {
                let (head, tail) = groups.split_at(groups.len() - 1);
                format!("{}.{}", head.concat(), tail[0])
            } else {
                s.replace(',', "")
            }
        }
        _ => s.to_string(),
    }
}

/// Parses one amount cell: numbers cast directly, text goes through the
/// decision tree, anything else is missing.
pub fn parse_amount_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => parse_amount(s),
        _ => None,
    }
}

/// Parses a whole amount column into `Number`-or-`Null` cells.
pub fn parse_amount_column(values: &[Cell]) -> Vec<Cell> {
    values
        .iter()
        .map(|cell| parse_amount_cell(cell).map_or(Cell::Null, Cell::Number))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn currency_symbols_and_thousands_strip() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("1 234,56 €"), Some(1234.56));
        assert_eq!(parse_amount("  42 USD "), Some(42.0));
    }

    #[test]
    fn european_separator_order_resolves() {
        assert_eq!(parse_amount("1.234,56 TL"), Some(1234.56));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
    }

    #[test]
    fn lone_comma_is_decimal_only_with_two_digit_tail() {
        assert_eq!(parse_amount("12,34"), Some(12.34));
        assert_eq!(parse_amount("1,234"), Some(1234.0));
        assert_eq!(parse_amount("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn parentheses_mark_negative() {
        assert_eq!(parse_amount("(250)"), Some(-250.0));
        assert_eq!(parse_amount("($1,000.50)"), Some(-1000.5));
        assert_eq!(parse_amount("(-250)"), Some(-250.0));
    }

    #[test]
    fn bad_tokens_are_null() {
        for token in ["N/A", "na", "none", "NaN", "—", "-", "free", "", "   "] {
            assert_eq!(parse_amount(token), None, "token {token:?}");
        }
    }

    #[test]
    fn multiple_minus_signs_keep_magnitude() {
        // Preserved quirk; the stricter alternative would return None.
        assert_eq!(parse_amount("-5-5"), Some(55.0));
        assert_eq!(parse_amount("--12"), Some(-12.0));
    }

    #[test]
    fn numeric_cells_cast_directly() {
        assert_eq!(parse_amount_cell(&Cell::Number(9.5)), Some(9.5));
        assert_eq!(parse_amount_cell(&Cell::Number(f64::NAN)), None);
        assert_eq!(parse_amount_cell(&Cell::Null), None);
    }

    #[test]
    fn unparseable_text_is_null() {
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("..,"), None);
    }

    proptest! {
        #[test]
        fn parse_amount_is_total(input in ".{0,40}") {
            // Must never panic, whatever the text.
            let _ = parse_amount(&input);
        }

        #[test]
        fn plain_floats_round_trip(value in -1_000_000.0f64..1_000_000.0) {
            let text = format!("{value:.2}");
            let parsed = parse_amount(&text).unwrap();
            prop_assert!((parsed - text.parse::<f64>().unwrap()).abs() < 1e-9);
        }
    }
}

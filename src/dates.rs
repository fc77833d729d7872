//! Two-pass locale-ambiguous date parsing.
//!
//! A value like `03/04/2026` is valid under both month-first and day-first
//! conventions; a single format family cannot recover a column that mixes
//! them. Pass 1 parses every value under month-first formats; pass 2 retries
//! only the failures under day-first formats, so `01/15/2026` and
//! `15/01/2026` both resolve without locale configuration.

use chrono::{NaiveDate, NaiveDateTime};

use crate::data::Cell;

/// Formats tried in pass 1. Unambiguous formats (ISO, textual month) live
/// here so they resolve on the first pass.
const MONTH_FIRST_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Formats tried in pass 2, for values the month-first family rejected.
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

const DATETIME_SUFFIXES: &[&str] = &[" %H:%M:%S", " %H:%M", "T%H:%M:%S", "T%H:%M"];

fn parse_with_formats(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    for fmt in formats {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Some(parsed);
        }
        for suffix in DATETIME_SUFFIXES {
            let fmt_with_time = format!("{fmt}{suffix}");
            if let Ok(parsed) = NaiveDateTime::parse_from_str(value, &fmt_with_time) {
                return Some(parsed.date());
            }
        }
    }
    None
}

/// Parses one date-like value assuming month-first day/month order.
pub fn parse_date_month_first(value: &str) -> Option<NaiveDate> {
    parse_with_formats(value.trim(), MONTH_FIRST_FORMATS)
}

/// Parses one date-like value assuming day-first day/month order.
pub fn parse_date_day_first(value: &str) -> Option<NaiveDate> {
    parse_with_formats(value.trim(), DAY_FIRST_FORMATS)
}

/// Locale-tolerant single-value parse: month-first, then day-first.
pub fn parse_date_lenient(value: &str) -> Option<NaiveDate> {
    parse_date_month_first(value).or_else(|| parse_date_day_first(value))
}

fn cell_date(cell: &Cell, day_first: bool) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) if !s.trim().is_empty() => {
            if day_first {
                parse_date_day_first(s)
            } else {
                parse_date_month_first(s)
            }
        }
        _ => None,
    }
}

/// Parses a whole column with the two-pass fallback. Values unparsed after
/// both passes come back as `Cell::Null`.
pub fn parse_date_column(values: &[Cell]) -> Vec<Cell> {
    let mut parsed = values
        .iter()
        .map(|cell| cell_date(cell, false))
        .collect::<Vec<_>>();
    for (slot, cell) in parsed.iter_mut().zip(values) {
        if slot.is_none() {
            *slot = cell_date(cell, true);
        }
    }
    parsed
        .into_iter()
        .map(|date| date.map_or(Cell::Null, Cell::Date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn both_ambiguity_orders_are_recoverable() {
        let column = vec![Cell::from("01/15/2026"), Cell::from("15/01/2026")];
        let parsed = parse_date_column(&column);
        assert_eq!(parsed[0], Cell::Date(ymd(2026, 1, 15)));
        assert_eq!(parsed[1], Cell::Date(ymd(2026, 1, 15)));
    }

    #[test]
    fn month_first_wins_when_both_orders_fit() {
        // 03/04 is valid either way; pass 1 must decide.
        assert_eq!(parse_date_lenient("03/04/2026"), Some(ymd(2026, 4, 3)));
    }

    #[test]
    fn unparseable_values_become_null() {
        let column = vec![Cell::from("32/13/2026"), Cell::from("not-a-date")];
        let parsed = parse_date_column(&column);
        assert_eq!(parsed, vec![Cell::Null, Cell::Null]);
    }

    #[test]
    fn iso_and_textual_formats_parse_on_pass_one() {
        assert_eq!(parse_date_month_first("2026-02-01"), Some(ymd(2026, 2, 1)));
        assert_eq!(
            parse_date_month_first("Feb 01, 2026"),
            Some(ymd(2026, 2, 1))
        );
        assert_eq!(parse_date_month_first("1 February 2026"), Some(ymd(2026, 2, 1)));
    }

    #[test]
    fn datetime_values_truncate_to_date() {
        assert_eq!(
            parse_date_lenient("2026-03-05 14:30:00"),
            Some(ymd(2026, 3, 5))
        );
        assert_eq!(parse_date_lenient("2026-03-05T14:30"), Some(ymd(2026, 3, 5)));
    }

    #[test]
    fn already_typed_dates_pass_through() {
        let column = vec![Cell::Date(ymd(2026, 6, 7)), Cell::Number(42.0), Cell::Null];
        let parsed = parse_date_column(&column);
        assert_eq!(parsed[0], Cell::Date(ymd(2026, 6, 7)));
        assert_eq!(parsed[1], Cell::Null);
        assert_eq!(parsed[2], Cell::Null);
    }
}

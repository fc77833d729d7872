use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single untyped table cell.
///
/// Raw input tables carry only `Text`, `Number`, and `Null`; the cleaning
/// pipelines additionally produce `Date` cells. Equality and hashing are total
/// (floats compare by bit pattern) so exact-duplicate rows can be detected
/// after normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Display form used for CSV output and rendered tables. `Null` is empty.
    pub fn as_display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => format_number(*n),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Null => String::new(),
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Number(a), Cell::Number(b)) => a.to_bits() == b.to_bits(),
            (Cell::Date(a), Cell::Date(b)) => a == b,
            (Cell::Null, Cell::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Cell::Text(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            Cell::Number(n) => {
                1u8.hash(state);
                n.to_bits().hash(state);
            }
            Cell::Date(d) => {
                2u8.hash(state);
                d.hash(state);
            }
            Cell::Null => 3u8.hash(state),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_displays_as_empty() {
        assert_eq!(Cell::Null.as_display(), "");
    }

    #[test]
    fn numbers_display_without_trailing_fraction() {
        assert_eq!(Cell::Number(10.0).as_display(), "10");
        assert_eq!(Cell::Number(10.5).as_display(), "10.5");
    }

    #[test]
    fn equality_is_total_over_floats() {
        assert_eq!(Cell::Number(1.25), Cell::Number(1.25));
        assert_ne!(Cell::Number(1.25), Cell::Number(1.26));
        assert_eq!(Cell::Number(f64::NAN), Cell::Number(f64::NAN));
    }

    #[test]
    fn heterogeneous_cells_never_compare_equal() {
        assert_ne!(Cell::Text("1".into()), Cell::Number(1.0));
        assert_ne!(Cell::Null, Cell::Text(String::new()));
    }
}

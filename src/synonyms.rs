//! Canonical sales schema and header synonym resolution.
//!
//! The cleaning pipeline targets a fixed eight-column vocabulary. A
//! [`SynonymTable`] maps normalized header tokens onto those fields; whatever
//! does not resolve is kept as a passthrough column. The builtin vocabulary is
//! frozen at first use, but resolution takes the table as a parameter so tests
//! (and embedders with their own exports) can substitute one.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::columns::normalize_column_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    OrderDate,
    CustomerName,
    Product,
    Category,
    Amount,
    PaymentStatus,
    City,
    Country,
}

impl CanonicalField {
    /// All canonical fields, in canonical output order.
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::OrderDate,
        CanonicalField::CustomerName,
        CanonicalField::Product,
        CanonicalField::Category,
        CanonicalField::Amount,
        CanonicalField::PaymentStatus,
        CanonicalField::City,
        CanonicalField::Country,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::OrderDate => "order_date",
            CanonicalField::CustomerName => "customer_name",
            CanonicalField::Product => "product",
            CanonicalField::Category => "category",
            CanonicalField::Amount => "amount",
            CanonicalField::PaymentStatus => "payment_status",
            CanonicalField::City => "city",
            CanonicalField::Country => "country",
        }
    }

    /// Fields the canonical pipeline cannot proceed without.
    pub fn is_required(&self) -> bool {
        matches!(self, CanonicalField::OrderDate | CanonicalField::Amount)
    }

    /// Example spellings quoted in the missing-column error message.
    pub fn spelling_hint(&self) -> &'static str {
        match self {
            CanonicalField::OrderDate => "'Order Date' / 'date' / 'orderDate'",
            CanonicalField::Amount => "'Amount' / 'total' / 'price'",
            _ => "",
        }
    }
}

/// Frozen mapping from normalized header token to canonical field.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: HashMap<String, CanonicalField>,
}

impl SynonymTable {
    /// Builds a vocabulary from `(token, field)` pairs. A token naming two
    /// different fields is a configuration bug and panics at construction.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, CanonicalField)>,
    {
        let mut entries = HashMap::new();
        for (token, field) in pairs {
            if let Some(existing) = entries.insert(token.to_string(), field)
                && existing != field
            {
                panic!("Synonym token '{token}' maps to both {existing:?} and {field:?}");
            }
        }
        Self { entries }
    }

    /// The process-wide builtin vocabulary, initialized once.
    pub fn builtin() -> &'static SynonymTable {
        static BUILTIN: OnceLock<SynonymTable> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            use CanonicalField::*;
            SynonymTable::from_pairs([
                ("order_date", OrderDate),
                ("orderdate", OrderDate),
                ("date", OrderDate),
                ("created_at", OrderDate),
                ("createdat", OrderDate),
                ("customer_name", CustomerName),
                ("customer", CustomerName),
                ("client", CustomerName),
                ("product", Product),
                ("product_name", Product),
                ("item", Product),
                ("category", Category),
                ("category_name", Category),
                ("cat", Category),
                ("amount", Amount),
                ("total", Amount),
                ("price", Amount),
                ("payment_status", PaymentStatus),
                ("payment", PaymentStatus),
                ("status", PaymentStatus),
                ("city", City),
                ("city_name", City),
                ("town", City),
                ("country", Country),
                ("country_name", Country),
            ])
        })
    }

    pub fn lookup(&self, token: &str) -> Option<CanonicalField> {
        self.entries.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of resolving one header list against a vocabulary.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    /// Source column indices per canonical field, in input order.
    pub sources: HashMap<CanonicalField, Vec<usize>>,
    /// Indices of columns that resolved to no field, in input order.
    pub passthrough: Vec<usize>,
}

impl ResolvedColumns {
    pub fn sources_for(&self, field: CanonicalField) -> &[usize] {
        self.sources.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Normalizes each header and groups columns by the canonical field their
/// token resolves to. Unresolved columns become passthrough.
pub fn resolve_columns(headers: &[String], synonyms: &SynonymTable) -> ResolvedColumns {
    let mut sources: HashMap<CanonicalField, Vec<usize>> = HashMap::new();
    let mut passthrough = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let token = normalize_column_name(header);
        match synonyms.lookup(&token) {
            Some(field) => sources.entry(field).or_default().push(idx),
            None => passthrough.push(idx),
        }
    }
    ResolvedColumns {
        sources,
        passthrough,
    }
}

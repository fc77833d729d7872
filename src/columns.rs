//! Column label normalization.
//!
//! Raw exports spell the same header a dozen ways (`"Order Date"`,
//! `"order-date"`, `" ORDER_DATE  "`). [`normalize_column_name`] reduces every
//! spelling to one comparable token; [`uniquify_columns`] disambiguates
//! collisions for the schema-agnostic pipeline, where duplicate labels must
//! stay addressable.

use std::collections::HashMap;

/// Canonicalizes a raw column label to a comparable token: lowercase, any run
/// of non-alphanumeric characters collapsed to a single underscore, leading
/// and trailing underscores stripped. Total: garbage input yields `""`.
pub fn normalize_column_name(name: &str) -> String {
    let mut token = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !token.is_empty() {
                token.push('_');
            }
            pending_separator = false;
            token.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    token
}

/// Appends `_1`, `_2`, ... to repeated tokens in order of appearance.
pub fn uniquify_columns(tokens: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut unique = Vec::with_capacity(tokens.len());
    for token in tokens {
        match seen.get_mut(token.as_str()) {
            None => {
                seen.insert(token, 0);
                unique.push(token.clone());
            }
            Some(count) => {
                *count += 1;
                unique.push(format!("{token}_{count}"));
            }
        }
    }
    unique
}

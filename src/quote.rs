//! Identifier quoting for rendered Cypher.

use crate::config;

/// Wrap `value` in `mark`, doubling any embedded occurrence of the mark.
///
/// # Arguments
/// * `mark` - The quote mark ('`' for backtick-quoted identifiers)
/// * `value` - The identifier to quote
pub fn quote_with(mark: &str, value: &str) -> String {
    let mut result = String::with_capacity(value.len() + mark.len() * 2);
    result.push_str(mark);
    if mark.is_empty() {
        result.push_str(value);
    } else {
        result.push_str(&value.replace(mark, &format!("{mark}{mark}")));
    }
    result.push_str(mark);
    result
}

/// Quote a node label or relationship type with the configured mark.
#[inline]
pub fn quote_label(value: &str) -> String {
    quote_with(&config::quotes().label, value)
}

/// Quote a property name with the configured mark.
#[inline]
pub fn quote_property(value: &str) -> String {
    quote_with(&config::quotes().property, value)
}

/// Quote a map-literal key with the configured mark.
#[inline]
pub fn quote_map_key(value: &str) -> String {
    quote_with(&config::quotes().map_key, value)
}

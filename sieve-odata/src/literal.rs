//! OData literal rendering

use chrono::{DateTime, Utc};
use sieve_core::FilterValue;

/// Format of UTC date literals, `yyyy-MM-ddTHH:mm:ss.ffffffZ`.
pub const UTC_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Render a UTC instant as an OData date literal.
pub fn format_utc(value: DateTime<Utc>) -> String {
    value.format(UTC_DATE_TIME_FORMAT).to_string()
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Unquoted text of a scalar value.
///
/// Lists, date filters and null have no scalar text.
pub fn raw_value(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::String(s) | FilterValue::Enum(s) => Some(s.clone()),
        FilterValue::Bool(b) => Some(b.to_string()),
        FilterValue::Integer(n) => Some(n.to_string()),
        FilterValue::Decimal(n) => Some(n.to_string()),
        FilterValue::Guid(g) => Some(g.to_string()),
        FilterValue::DateTime(d) => Some(format_utc(*d)),
        FilterValue::DateTimeOffset(d) => Some(format_utc(d.with_timezone(&Utc))),
        FilterValue::Null | FilterValue::DateFilter(_) | FilterValue::List(_) => None,
    }
}

/// Literal of one list item: strings and enum names quoted, everything else raw.
pub fn item_literal(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::String(s) | FilterValue::Enum(s) => Some(quote(s)),
        other => raw_value(other),
    }
}

/// Literal of one list item, lowercased first when `ignore_case` is set.
pub fn string_literal(value: &FilterValue, ignore_case: bool) -> Option<String> {
    match value {
        FilterValue::String(s) | FilterValue::Enum(s) if ignore_case => Some(quote(&s.to_lowercase())),
        other => item_literal(other),
    }
}

/// Parenthesised, comma-separated list of the items' literals.
///
/// Items without a literal are skipped; `None` when nothing remains.
pub fn list_literal(items: &[FilterValue], render: impl Fn(&FilterValue) -> Option<String>) -> Option<String> {
    let rendered: Vec<String> = items.iter().filter_map(render).collect();
    if rendered.is_empty() {
        return None;
    }
    Some(format!("({})", rendered.join(",")))
}

// =============================================================================
// TESTS
// =============================================================================

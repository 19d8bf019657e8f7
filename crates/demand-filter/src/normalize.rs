//! Type normalization for raw demands.
//!
//! Demands usually come from query strings or form posts, so numeric values
//! arrive as strings. [`normalize`] walks the raw tree and turns every leaf
//! `value` that looks numeric into an integer.
//!
//! A node counts as a leaf only if it holds a *truthy* `value`. A leaf whose
//! value is falsy (`0`, `"0"`, `""`, `null`, `false`, empty list or mapping)
//! is walked as if it were an internal node, which leaves it untouched. This
//! is a known quirk of the demand format and is kept as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as Json;

use crate::demand::{RawDemand, VALUE_KEY};

static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?\s*$")
        .expect("numeric pattern is valid")
});

/// Returns `true` if `s` reads as a decimal number.
///
/// Surrounding whitespace, a sign, a fraction and an exponent are allowed;
/// hex, `inf` and `NaN` are not.
pub fn is_numeric_string(s: &str) -> bool {
    NUMERIC.is_match(s)
}

/// Parses a numeric string into an integer.
///
/// Fractions truncate toward zero and out-of-range values saturate.
/// Returns `None` for strings [`is_numeric_string`] rejects.
pub fn parse_integer(s: &str) -> Option<i64> {
    if !is_numeric_string(s) {
        return None;
    }
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64)
}

/// Normalizes a raw demand value and returns it.
pub fn normalize(mut demand: Json) -> Json {
    normalize_in_place(&mut demand);
    demand
}

/// Normalizes a top-level demand mapping in place.
pub fn normalize_demand(demand: &mut RawDemand) {
    for child in demand.values_mut() {
        normalize_child(child);
    }
}

/// Normalizes any node in place. Scalars have no children and are left alone.
pub fn normalize_in_place(node: &mut Json) {
    match node {
        Json::Object(map) => normalize_demand(map),
        Json::Array(items) => {
            for child in items.iter_mut() {
                normalize_child(child);
            }
        }
        _ => {}
    }
}

fn normalize_child(child: &mut Json) {
    let leaf_value = child
        .as_object_mut()
        .and_then(|map| map.get_mut(VALUE_KEY))
        .filter(|value| is_truthy(value));

    if let Some(value) = leaf_value {
        if let Some(n) = value.as_str().and_then(parse_integer) {
            *value = Json::from(n);
        }
        return;
    }

    normalize_in_place(child);
}

/// Loose truthiness of a JSON value.
pub(crate) fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !(s.is_empty() || s == "0"),
        Json::Array(items) => !items.is_empty(),
        Json::Object(map) => !map.is_empty(),
    }
}

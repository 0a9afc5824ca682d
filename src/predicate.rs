//! Type predicates.
//!
//! Boundary semantics follow the loosely-typed object model the merge
//! engine targets: dates, regexes, and promises are object-typed values,
//! so `is_plain_object` accepts them; arrays and callables are not.

use crate::value::Value;

/// True when `value` is object-like but neither null nor an array.
///
/// Dates, regexes, and promise-like values count as object-like.
pub fn is_plain_object(value: &Value) -> bool {
    matches!(
        value,
        Value::Object(_) | Value::Date(_) | Value::Regex(_) | Value::Promise(_)
    )
}

/// True only for regex-like values; a plain object shaped like a regex
/// does not qualify.
pub fn is_regex_like(value: &Value) -> bool {
    matches!(value, Value::Regex(_))
}

/// True only for values exposing a callable `then`.
pub fn is_promise_like(value: &Value) -> bool {
    matches!(value, Value::Promise(_))
}

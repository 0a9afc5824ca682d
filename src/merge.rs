//! Deep-merge engine.
//!
//! Combines a source value into a destination value with one fixed policy:
//! - Objects: merge by key (recursive); destination-only keys survive
//! - Arrays: merge by index (recursive); destination elements beyond the
//!   source length survive
//! - Dates and regexes: replaced wholesale by a fresh copy
//! - Any other defined source: source wins
//! - Undefined source: destination survives

use std::collections::BTreeMap;

use crate::value::Value;

/// Deep-merge `source` into `destination`, returning the merged value.
///
/// `destination` is consumed and the merged value is always the return
/// value; there is no in-place variant. `source` is never mutated, and no
/// container, date, or regex node of the result aliases `source` - those
/// are fresh copies, so mutating `source` afterwards cannot be observed
/// through the result. Callable and thenable handles are the exception:
/// the handle is cloned and the referent shared.
///
/// Dispatch order per node: date, regex, array, object, defined scalar or
/// handle, undefined. The original formulation also guarded against
/// merging a value into itself; under move semantics `destination` can
/// never alias `source`, so that guard is subsumed and `extend(v.clone(),
/// &v)` is simply a structural no-op.
///
/// Total over all inputs: never fails, never panics.
pub fn extend(destination: Value, source: &Value) -> Value {
    match source {
        // Dates and regexes are replaced wholesale, never merged
        // field-by-field. The regex copy keeps the match cursor.
        Value::Date(instant) => Value::Date(*instant),
        Value::Regex(re) => Value::Regex(re.replicate()),

        // A non-array destination is discarded and rebuilt empty.
        Value::Array(items) => {
            let mut merged = match destination {
                Value::Array(existing) => existing,
                _ => Vec::with_capacity(items.len()),
            };
            for (index, item) in items.iter().enumerate() {
                if index < merged.len() {
                    let slot = merged[index].take();
                    merged[index] = extend(slot, item);
                } else {
                    merged.push(extend(Value::Undefined, item));
                }
            }
            Value::Array(merged)
        }

        // A non-object destination (arrays included) is discarded and
        // rebuilt empty; destination-only keys are preserved untouched.
        Value::Object(entries) => {
            let mut merged = match destination {
                Value::Object(existing) => existing,
                _ => BTreeMap::new(),
            };
            for (key, entry) in entries {
                let slot = merged.remove(key).unwrap_or(Value::Undefined);
                merged.insert(key.clone(), extend(slot, entry));
            }
            Value::Object(merged)
        }

        // An undefined source leaves the destination untouched.
        Value::Undefined => destination,

        // Scalars, null, and shared handles replace the destination
        // wholesale. Handles share their referent.
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FuncValue, RegexFlags, RegexValue};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn val(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_self_merge_is_noop() {
        let value = val(json!({
            "id": 42,
            "tags": ["a", "b"],
            "nested": {"on": true}
        }));
        assert_eq!(extend(value.clone(), &value), value);

        let scalar = val(json!("foo"));
        assert_eq!(extend(scalar.clone(), &scalar), scalar);
    }

    #[test]
    fn test_override_and_preserve() {
        let destination = val(json!({"foo": "bar", "baz": "qux"}));
        let source = val(json!({"foo": "quux", "quuux": "corge"}));

        let merged = extend(destination, &source);
        assert_eq!(
            merged,
            val(json!({"foo": "quux", "baz": "qux", "quuux": "corge"}))
        );
    }

    #[test]
    fn test_result_is_independent_of_source() {
        let source = val(json!({"id": 42, "foo": "bar", "baz": {"qux": "quux"}}));
        let merged = extend(val(json!({})), &source);

        // Mutate the source after the merge.
        let mut source = source;
        if let Value::Object(map) = &mut source {
            map.insert("id".to_string(), val(json!(43)));
            map.insert("foo".to_string(), val(json!("changed")));
            map.insert("baz".to_string(), val(json!({"qux": "changed"})));
        }

        assert_eq!(merged.get("id").unwrap().as_f64(), Some(42.0));
        assert_eq!(merged.get("foo").unwrap().as_str(), Some("bar"));
        assert_eq!(
            merged.get("baz").unwrap().get("qux").unwrap().as_str(),
            Some("quux")
        );
    }

    #[test]
    fn test_scalar_to_object_promotion() {
        let destination = val(json!({"foo": ""}));
        let source = val(json!({"id": 42, "foo": {"bar": "baz"}}));

        let merged = extend(destination, &source);
        assert_eq!(merged.get("id").unwrap().as_f64(), Some(42.0));
        assert_eq!(merged.get("foo"), Some(&val(json!({"bar": "baz"}))));
        assert!(merged.get("foo").unwrap().as_object().is_some());
    }

    #[test]
    fn test_scalar_to_array_promotion() {
        let destination = val(json!({"foo": ""}));
        let source = val(json!({"id": 42, "foo": ["bar"]}));

        let merged = extend(destination, &source);
        assert_eq!(merged.get("id").unwrap().as_f64(), Some(42.0));
        assert_eq!(merged.get("foo"), Some(&val(json!(["bar"]))));
    }

    #[test]
    fn test_array_and_object_reinitialize_both_directions() {
        // Object smashed to array: prior keys are discarded.
        let merged = extend(
            val(json!({"foo": {"bar": "baz"}})),
            &val(json!({"foo": ["qux"]})),
        );
        assert_eq!(merged.get("foo"), Some(&val(json!(["qux"]))));

        // Array smashed to object: prior elements are discarded.
        let merged = extend(
            val(json!({"foo": ["qux"]})),
            &val(json!({"foo": {"bar": "baz"}})),
        );
        assert_eq!(merged.get("foo"), Some(&val(json!({"bar": "baz"}))));
    }

    #[test]
    fn test_destination_array_tail_is_preserved() {
        let merged = extend(val(json!([1, 2, 3])), &val(json!([9])));
        assert_eq!(merged, val(json!([9, 2, 3])));
    }

    #[test]
    fn test_date_replaced_by_fresh_copy() {
        let instant = Utc.with_ymd_and_hms(2015, 3, 31, 12, 0, 0).unwrap();
        let mut source = val(json!({}));
        if let Value::Object(map) = &mut source {
            map.insert("date".to_string(), Value::Date(instant));
        }

        let merged = extend(val(json!({"date": "stale"})), &source);
        assert_eq!(merged.get("date").unwrap().as_date(), Some(instant));
    }

    #[test]
    fn test_regex_replaced_with_flags_and_cursor() {
        let mut re = RegexValue::new("foobar", RegexFlags::parse("g").unwrap()).unwrap();
        re.set_last_index(3);
        let mut source = val(json!({}));
        if let Value::Object(map) = &mut source {
            map.insert("regexp".to_string(), Value::Regex(re.clone()));
        }

        let merged = extend(val(json!({"regexp": 1})), &source);
        let copied = merged.get("regexp").unwrap().as_regex().unwrap();
        assert_eq!(copied.pattern(), "foobar");
        assert_eq!(copied.flags(), RegexFlags::parse("g").unwrap());
        assert_eq!(copied.last_index(), 3);
        assert_eq!(copied, &re);
    }

    #[test]
    fn test_null_overrides() {
        let merged = extend(val(json!({"value": 100})), &val(json!({"value": null})));
        assert_eq!(merged.get("value"), Some(&Value::Null));
    }

    #[test]
    fn test_undefined_source_keeps_destination() {
        let destination = val(json!({"keep": "me"}));
        let merged = extend(destination.clone(), &Value::Undefined);
        assert_eq!(merged, destination);

        // An undefined entry inside an object behaves the same per key.
        let mut source = val(json!({}));
        if let Value::Object(map) = &mut source {
            map.insert("keep".to_string(), Value::Undefined);
        }
        let merged = extend(val(json!({"keep": "me"})), &source);
        assert_eq!(merged.get("keep").unwrap().as_str(), Some("me"));
    }

    #[test]
    fn test_handles_are_shared_not_copied() {
        let func = FuncValue::new(|_| Value::Null);
        let mut source = val(json!({}));
        if let Value::Object(map) = &mut source {
            map.insert("hook".to_string(), Value::Func(func.clone()));
        }

        let merged = extend(val(json!({"hook": "old"})), &source);
        assert_eq!(merged.get("hook"), Some(&Value::Func(func)));
    }

    #[test]
    fn test_promotion_from_bare_scalar_destination() {
        // A scalar destination and a container source yield a new container.
        let merged = extend(val(json!("scalar")), &val(json!({"a": 1})));
        assert_eq!(merged, val(json!({"a": 1})));

        let merged = extend(Value::Null, &val(json!([1, 2])));
        assert_eq!(merged, val(json!([1, 2])));
    }

    #[test]
    fn test_nested_recursive_merge() {
        let destination = val(json!({
            "level1": {"level2": {"a": 1, "b": 2}}
        }));
        let source = val(json!({
            "level1": {"level2": {"b": 3, "c": 4}}
        }));

        let merged = extend(destination, &source);
        let level2 = merged.get("level1").unwrap().get("level2").unwrap();
        assert_eq!(level2.get("a").unwrap().as_f64(), Some(1.0));
        assert_eq!(level2.get("b").unwrap().as_f64(), Some(3.0));
        assert_eq!(level2.get("c").unwrap().as_f64(), Some(4.0));
    }
}

//! Dynamic value model.
//!
//! `Value` is a closed tagged enum covering every shape the merge engine
//! distinguishes: scalars, containers, dates, regexes, and shared callable
//! or thenable handles. Conversions to and from `serde_json::Value` make
//! it easy to feed JSON-shaped configuration data through the merge.

mod callable;
mod regex;

pub use callable::{FuncValue, PromiseValue, Settled, Thenable};
pub use regex::{RegexFlags, RegexValue};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::{Error as _, Serialize, Serializer};

use crate::error::ValueError;

/// A dynamically typed value.
///
/// Containers, dates, and regexes are owned and deep-copied by the merge
/// engine; `Func` and `Promise` are cheap-to-clone handles whose referent
/// is shared rather than copied.
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent value: a missing key, or an explicitly undefined slot.
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Keyed mapping.
    Object(BTreeMap<String, Value>),
    /// Date-like value carrying an instant.
    Date(DateTime<Utc>),
    /// Regex-like value: pattern, flags, and match-position cursor.
    Regex(RegexValue),
    /// Shared callable handle, assigned by reference on merge.
    Func(FuncValue),
    /// Shared thenable handle, assigned by reference on merge.
    Promise(PromiseValue),
}

impl Value {
    /// Short name of this value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Date(_) => "date",
            Value::Regex(_) => "regex",
            Value::Func(_) => "function",
            Value::Promise(_) => "promise",
        }
    }

    /// True unless the value is `Undefined`.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// Object member lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Array element lookup.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Replace this slot with `Undefined`, returning the prior value.
    pub fn take(&mut self) -> Value {
        std::mem::replace(self, Value::Undefined)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(instant) => Some(*instant),
            _ => None,
        }
    }

    pub fn as_regex(&self) -> Option<&RegexValue> {
        match self {
            Value::Regex(re) => Some(re),
            _ => None,
        }
    }
}

/// Structural equality for scalars, containers, dates, and regexes;
/// handle identity for `Func` and `Promise`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Regex(a), Value::Regex(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Promise(a), Value::Promise(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(instant: DateTime<Utc>) -> Self {
        Value::Date(instant)
    }
}

impl From<RegexValue> for Value {
    fn from(re: RegexValue) -> Self {
        Value::Regex(re)
    }
}

impl From<FuncValue> for Value {
    fn from(func: FuncValue) -> Self {
        Value::Func(func)
    }
}

impl From<PromiseValue> for Value {
    fn from(promise: PromiseValue) -> Self {
        Value::Promise(promise)
    }
}

// JSON distinguishes integer from float numbers; every number here is an
// f64, so integral values convert back as integers to keep round-trips
// exact.
fn number_to_json(n: f64) -> Option<serde_json::Number> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, entry)| (key, Value::from(entry)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = ValueError;

    /// Dates render as RFC 3339 strings, regexes as `/pattern/flags`.
    /// `Undefined`, `Func`, `Promise`, and non-finite numbers have no
    /// JSON form.
    fn try_from(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok((*b).into()),
            Value::Number(n) => number_to_json(*n)
                .map(serde_json::Value::Number)
                .ok_or(ValueError::NotRepresentable("non-finite number")),
            Value::String(s) => Ok(s.clone().into()),
            Value::Array(items) => items
                .iter()
                .map(serde_json::Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(serde_json::Value::Array),
            Value::Object(map) => map
                .iter()
                .map(|(key, entry)| Ok((key.clone(), serde_json::Value::try_from(entry)?)))
                .collect::<Result<serde_json::Map<_, _>, ValueError>>()
                .map(serde_json::Value::Object),
            Value::Date(instant) => Ok(instant.to_rfc3339().into()),
            Value::Regex(re) => Ok(re.to_string().into()),
            Value::Undefined | Value::Func(_) | Value::Promise(_) => {
                Err(ValueError::NotRepresentable(value.kind()))
            }
        }
    }
}

/// JSON-style rendering; kinds without a JSON form render as a bracketed
/// placeholder.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (index, (key, entry)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{entry}")?;
                }
                f.write_str("}")
            }
            Value::Date(instant) => write!(f, "{}", instant.to_rfc3339()),
            Value::Regex(re) => write!(f, "{re}"),
            Value::Func(_) => f.write_str("[function]"),
            Value::Promise(_) => f.write_str("[promise]"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => match number_to_json(*n) {
                Some(num) => num.serialize(serializer),
                None => serializer.serialize_f64(*n),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => items.serialize(serializer),
            Value::Object(map) => map.serialize(serializer),
            Value::Date(instant) => serializer.serialize_str(&instant.to_rfc3339()),
            Value::Regex(re) => serializer.serialize_str(&re.to_string()),
            Value::Func(_) | Value::Promise(_) => Err(S::Error::custom(format!(
                "`{}` values have no serialized form",
                self.kind()
            ))),
        }
    }
}

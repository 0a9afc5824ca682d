//! valmerge - deep-merge engine and type predicates for dynamic values.
//!
//! This crate models loosely-typed, configuration-like data as a closed
//! `Value` enum and provides a single fixed-policy deep merge (`extend`)
//! over it, plus the three classifiers the merge policy is built on.

pub mod error;
pub mod merge;
pub mod predicate;
pub mod value;

pub use error::ValueError;
pub use merge::extend;
pub use predicate::{is_plain_object, is_promise_like, is_regex_like};
pub use value::{FuncValue, PromiseValue, RegexFlags, RegexValue, Settled, Thenable, Value};

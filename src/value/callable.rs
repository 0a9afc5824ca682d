//! Shared callable and thenable handles.
//!
//! Functions and promise-like values are opaque to the merge engine: they
//! are assigned by reference, never deep-copied. Both are cheap-to-clone
//! `Rc` handles compared by identity, not structure.

use std::fmt;
use std::rc::Rc;

use super::Value;

/// Shared callable value.
#[derive(Clone)]
pub struct FuncValue(Rc<dyn Fn(&[Value]) -> Value>);

impl FuncValue {
    pub fn new(func: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(func))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// True when both handles point at the same callable.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FuncValue(..)")
    }
}

/// A deferred value exposing a callable `then`.
pub trait Thenable {
    /// Register interest in the settled value. Implementations decide
    /// whether the callback runs immediately or later.
    fn then<'a>(&self, on_settled: Box<dyn FnOnce(&Value) + 'a>);
}

/// Shared thenable value.
#[derive(Clone)]
pub struct PromiseValue(Rc<dyn Thenable>);

impl PromiseValue {
    pub fn new(thenable: impl Thenable + 'static) -> Self {
        Self(Rc::new(thenable))
    }

    pub fn then<'a>(&self, on_settled: Box<dyn FnOnce(&Value) + 'a>) {
        self.0.then(on_settled);
    }

    /// True when both handles point at the same thenable.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for PromiseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PromiseValue(..)")
    }
}

/// Thenable that already holds its value; callbacks run immediately.
pub struct Settled(Value);

impl Settled {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }
}

impl Thenable for Settled {
    fn then<'a>(&self, on_settled: Box<dyn FnOnce(&Value) + 'a>) {
        on_settled(&self.0);
    }
}

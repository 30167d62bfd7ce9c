//! Per-document global scope.
//!
//! Every document owns one `Window`. Scripts evaluated for that document
//! write their globals here, and host code (for example the resource loader)
//! reads them back by name.

use crate::values::JSValue;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Named global variables of a single browsing context.
#[derive(Clone, Debug, Default)]
pub struct GlobalScope {
    vars: HashMap<String, JSValue>,
}

impl GlobalScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `name`, or `undefined` when it was never assigned.
    pub fn get(&self, name: &str) -> JSValue {
        self.vars.get(name).cloned().unwrap_or_default()
    }

    /// Assign a global, returning the previous value if any.
    pub fn set(&mut self, name: &str, value: JSValue) -> Option<JSValue> {
        self.vars.insert(name.to_owned(), value)
    }

    /// Whether `name` has been assigned.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Delete a global.
    pub fn remove(&mut self, name: &str) -> Option<JSValue> {
        self.vars.remove(name)
    }

    /// Names of all assigned globals, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Shared handle to a document's global scope.
///
/// Cloning the handle shares the scope. A poisoned lock is recovered rather
/// than propagated; the scope holds plain data and stays consistent.
#[derive(Clone, Debug, Default)]
pub struct Window {
    inner: Arc<RwLock<GlobalScope>>,
}

impl Window {
    /// Create a window with an empty global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `reader` with shared access to the scope.
    pub fn with<R>(&self, reader: impl FnOnce(&GlobalScope) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        reader(&guard)
    }

    /// Run `writer` with exclusive access to the scope.
    pub fn with_mut<R>(&self, writer: impl FnOnce(&mut GlobalScope) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        writer(&mut guard)
    }

    /// Current value of the global `name`.
    pub fn get(&self, name: &str) -> JSValue {
        self.with(|scope| scope.get(name))
    }

    /// Assign the global `name`.
    pub fn set(&self, name: &str, value: JSValue) {
        self.with_mut(|scope| scope.set(name, value));
    }

    /// Whether two handles point at the same scope.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

//! What a successful load resolves with.

use js::{GlobalScope, JSValue, Window};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Computes a fulfillment value from the container's global scope.
pub type Extractor = Arc<dyn Fn(&GlobalScope) -> JSValue + Send + Sync>;

/// How to derive the value a load resolves with, read when `load` fires.
#[derive(Clone, Default)]
pub enum FulfillmentSpec {
    /// Resolve with `undefined`.
    #[default]
    None,
    /// Resolve with the value of one global.
    Global(String),
    /// Resolve with an array of global values, in name order.
    Globals(Vec<String>),
    /// Resolve with whatever the function returns.
    Extractor(Extractor),
}

impl FulfillmentSpec {
    pub fn global(name: impl Into<String>) -> Self {
        Self::Global(name.into())
    }

    pub fn globals<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Globals(names.into_iter().map(Into::into).collect())
    }

    pub fn extractor(extract: impl Fn(&GlobalScope) -> JSValue + Send + Sync + 'static) -> Self {
        Self::Extractor(Arc::new(extract))
    }

    /// Compute the fulfillment value against `window` as it is now.
    pub fn resolve(&self, window: &Window) -> JSValue {
        window.with(|scope| match self {
            Self::None => JSValue::Undefined,
            Self::Global(name) => scope.get(name),
            Self::Globals(names) => {
                JSValue::Array(names.iter().map(|name| scope.get(name)).collect())
            }
            Self::Extractor(extract) => extract(scope),
        })
    }
}

impl Debug for FulfillmentSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => f.write_str("None"),
            Self::Global(name) => f.debug_tuple("Global").field(name).finish(),
            Self::Globals(names) => f.debug_tuple("Globals").field(names).finish(),
            Self::Extractor(_) => f.write_str("Extractor(..)"),
        }
    }
}

impl From<&str> for FulfillmentSpec {
    fn from(name: &str) -> Self {
        Self::global(name)
    }
}

impl From<String> for FulfillmentSpec {
    fn from(name: String) -> Self {
        Self::Global(name)
    }
}

impl From<Vec<String>> for FulfillmentSpec {
    fn from(names: Vec<String>) -> Self {
        Self::Globals(names)
    }
}

impl<const N: usize> From<[&str; N]> for FulfillmentSpec {
    fn from(names: [&str; N]) -> Self {
        Self::globals(names)
    }
}

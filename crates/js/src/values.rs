use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An engine-agnostic representation of JavaScript values.
/// Objects are plain data bags; functions never cross the host boundary.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum JSValue {
    /// The `undefined` value.
    #[default]
    Undefined,
    /// The `null` value.
    Null,
    /// A boolean primitive.
    Boolean(bool),
    /// A number (IEEE 754 double precision).
    Number(f64),
    /// A string value (UTF-8).
    String(String),
    /// An array in index order.
    Array(Vec<JSValue>),
    /// A plain object keyed by property name.
    Object(BTreeMap<String, JSValue>),
}

impl JSValue {
    /// An empty plain object, `{}`.
    #[inline]
    pub fn empty_object() -> Self {
        Self::Object(BTreeMap::new())
    }

    /// Whether this is the `undefined` value.
    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Numeric conversion used by compound assignments (`+=`, `++`).
    /// `undefined` counts as zero so counters can start from an unset global.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Null => 0.0,
            Self::Boolean(flag) => f64::from(u8::from(*flag)),
            Self::Number(number) => *number,
            Self::String(text) => text.trim().parse::<f64>().unwrap_or(f64::NAN),
            Self::Array(_) | Self::Object(_) => f64::NAN,
        }
    }

    /// The `typeof` string of this value.
    pub const fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Null | Self::Array(_) | Self::Object(_) => "object",
        }
    }
}

impl From<Value> for JSValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Boolean(flag),
            Value::Number(number) => Self::Number(number.as_f64().unwrap_or(f64::NAN)),
            Value::String(text) => Self::String(text),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Self::from(item)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for JSValue {
    fn from(flag: bool) -> Self {
        Self::Boolean(flag)
    }
}

impl From<f64> for JSValue {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<&str> for JSValue {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl Display for JSValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Undefined => write!(formatter, "undefined"),
            Self::Null => write!(formatter, "null"),
            Self::Boolean(flag) => write!(formatter, "{flag}"),
            Self::Number(number) => write!(formatter, "{number}"),
            Self::String(text) => write!(formatter, "{text}"),
            Self::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(formatter, "{}", parts.join(","))
            }
            Self::Object(_) => write!(formatter, "[object Object]"),
        }
    }
}

use dom::Event;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use url::Url;

/// Why a load future rejected.
///
/// Cloneable so every holder of a shared load future observes the same
/// rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The element fired `error`. Carries the event itself.
    Resource(Event),
    /// Empty path, or a path that does not resolve against the container's document.
    InvalidPath(String),
    /// The resolved URL names neither a `.js` nor a `.css` resource.
    UnsupportedKind(Url),
    /// The host refused a DOM operation needed to start the load.
    Host(String),
    /// The element's listeners were dropped without either event firing.
    Detached,
}

impl LoadError {
    /// The error event, for `Resource` failures.
    pub const fn event(&self) -> Option<&Event> {
        match self {
            Self::Resource(event) => Some(event),
            Self::InvalidPath(_) | Self::UnsupportedKind(_) | Self::Host(_) | Self::Detached => None,
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Resource(event) => write!(f, "resource failed to load: {event}"),
            Self::InvalidPath(path) => write!(f, "invalid resource path: {path:?}"),
            Self::UnsupportedKind(url) => {
                write!(f, "unsupported resource kind (expected .js or .css): {url}")
            }
            Self::Host(message) => write!(f, "host error: {message}"),
            Self::Detached => write!(f, "load abandoned before completion"),
        }
    }
}

impl Error for LoadError {}

impl From<anyhow::Error> for LoadError {
    fn from(err: anyhow::Error) -> Self {
        Self::Host(format!("{err:#}"))
    }
}

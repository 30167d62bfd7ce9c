//! Minimal document host.
//!
//! Documents are `html > head, body` trees with attributes, inline styles and
//! author stylesheets. Inserting a `script[src]` or `link[rel=stylesheet]` into
//! a connected tree fetches the resource on the host's tokio runtime, applies
//! it (runs the script in the document's engine or attaches the stylesheet)
//! and fires `load`, or fires `error` when the fetch fails.

pub mod config;
pub mod document;
pub mod events;
pub mod host;
pub mod node;
pub mod style;

pub use config::HostConfig;
pub use document::{Document, DocumentId, ResourceKind};
pub use events::{Event, EventListener, EventType};
pub use host::{DocumentHandle, ElementRef, Host};
pub use indextree::NodeId;

//! Resource events fired at loading elements.

use crate::document::DocumentId;
use indextree::NodeId;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

/// Event types the host fires at `script` and `link` elements.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EventType {
    /// The resource was fetched and applied.
    Load,
    /// The resource could not be fetched.
    Error,
}

impl EventType {
    /// The DOM event type string (`"load"` / `"error"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Error => "error",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A dispatched event. Cloning yields the same event as seen by every listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    event_type: EventType,
    target: NodeId,
    document: DocumentId,
}

impl Event {
    pub(crate) const fn new(event_type: EventType, target: NodeId, document: DocumentId) -> Self {
        Self {
            event_type,
            target,
            document,
        }
    }

    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Same as `event_type().as_str()`.
    pub const fn type_name(&self) -> &'static str {
        self.event_type.as_str()
    }

    /// The element the event was fired at.
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// The document owning the target.
    pub const fn document(&self) -> DocumentId {
        self.document
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} event at {:?} in {}", self.event_type, self.target, self.document)
    }
}

/// Callback registered with `add_event_listener`.
pub type EventListener = Arc<dyn Fn(&Event) + Send + Sync>;

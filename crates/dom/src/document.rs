//! The document tree of one browsing context.
//!
//! A `Document` is plain data guarded by its `DocumentHandle`; methods here
//! never block or spawn. Fetching for inserted `script`/`link` elements is
//! driven by the handle, which asks `loading_request` what to fetch.

use crate::events::{Event, EventListener, EventType};
use crate::node::{DomNode, ElementData, NodeKind};
use crate::style::{cascaded_value, default_display, SelectorElement, Stylesheet};
use anyhow::{anyhow, Result};
use indextree::{Arena, NodeId};
use js::{JsEngine, Window};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use url::Url;

/// Identifies a document within a `Host`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DocumentId(pub u64);

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "document#{}", self.0)
    }
}

/// Kinds of resource an element can pull in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    /// `<script src>`
    Script,
    /// `<link rel="stylesheet" href>`
    Stylesheet,
}

impl ResourceKind {
    /// Tag of the element that loads this kind.
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Stylesheet => "link",
        }
    }

    /// Attribute carrying the resource URL.
    pub const fn url_attribute(self) -> &'static str {
        match self {
            Self::Script => "src",
            Self::Stylesheet => "href",
        }
    }
}

/// Stylesheet attached by a `link` element.
#[derive(Debug)]
struct AttachedSheet {
    owner: NodeId,
    sheet: Stylesheet,
}

pub struct Document {
    id: DocumentId,
    url: Url,
    arena: Arena<DomNode>,
    root: NodeId,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    listeners: HashMap<(NodeId, EventType), Vec<EventListener>>,
    stylesheets: Vec<AttachedSheet>,
    /// Loading elements whose fetch has been started ("already started").
    started: HashSet<NodeId>,
    engine: Box<dyn JsEngine>,
}

impl Document {
    /// Create `html > head, body` for a document at `url`.
    pub fn new(id: DocumentId, url: Url, engine: Box<dyn JsEngine>) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        let html = arena.new_node(element_node("html"));
        let head = arena.new_node(element_node("head"));
        let body = arena.new_node(element_node("body"));
        root.append(html, &mut arena);
        html.append(head, &mut arena);
        html.append(body, &mut arena);
        Self {
            id,
            url,
            arena,
            root,
            html,
            head,
            body,
            listeners: HashMap::new(),
            stylesheets: Vec::new(),
            started: HashSet::new(),
            engine,
        }
    }

    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// Document URL; relative resource paths resolve against it.
    pub const fn url(&self) -> &Url {
        &self.url
    }

    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub const fn document_element(&self) -> NodeId {
        self.html
    }

    pub const fn head(&self) -> NodeId {
        self.head
    }

    pub const fn body(&self) -> NodeId {
        self.body
    }

    /// The global scope scripts of this document run in.
    pub fn window(&self) -> &Window {
        self.engine.window()
    }

    /// Resolve `path` against the document URL.
    ///
    /// # Errors
    /// Returns an error if `path` cannot form a valid URL.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        self.url
            .join(path)
            .map_err(|err| anyhow!("cannot resolve `{path}` against {}: {err}", self.url))
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(element_node(tag))
    }

    /// Create a detached text node.
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Text(text.to_owned()),
        })
    }

    /// Append `child` as the last child of `parent`, moving it if it already
    /// has a parent.
    ///
    /// # Errors
    /// Returns an error if either node is unknown or the append would create a
    /// cycle; the tree is left unchanged.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|err| anyhow!("appendChild failed: {err}"))
    }

    /// Set an attribute on an element.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element of this document.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let data = self
            .arena
            .get_mut(node)
            .and_then(|entry| entry.get_mut().element_mut())
            .ok_or_else(|| anyhow!("{node:?} is not an element of {}", self.id))?;
        data.set_attribute(name, value);
        Ok(())
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)
            .and_then(|data| data.attribute(name))
            .map(str::to_owned)
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|data| data.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(indextree::Node::parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        node.children(&self.arena).collect()
    }

    /// Whether `node` is in this document's tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.arena.get(node).is_some() && node.ancestors(&self.arena).any(|id| id == self.root)
    }

    /// First connected element with the given id, in tree order.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.root
            .descendants(&self.arena)
            .find(|node| self.element(*node).and_then(|data| data.attribute("id")) == Some(id))
    }

    /// Connected elements with the given tag (case-insensitive), in tree order.
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        self.root
            .descendants(&self.arena)
            .filter(|node| {
                self.tag_name(*node)
                    .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            })
            .collect()
    }

    /// Register a listener for `event_type` events fired at `node`.
    pub fn add_event_listener(&mut self, node: NodeId, event_type: EventType, listener: EventListener) {
        self.listeners
            .entry((node, event_type))
            .or_default()
            .push(listener);
    }

    /// Snapshot of the listeners for an event, so they can run unlocked.
    pub(crate) fn listeners_for(&self, node: NodeId, event_type: EventType) -> Vec<EventListener> {
        self.listeners
            .get(&(node, event_type))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) const fn make_event(&self, node: NodeId, event_type: EventType) -> Event {
        Event::new(event_type, node, self.id)
    }

    /// What `node` should fetch now that it may be connected, if anything.
    /// Marks the element as started so a later re-insertion does not fetch again.
    pub(crate) fn loading_request(&mut self, node: NodeId) -> Option<(ResourceKind, Url)> {
        if self.started.contains(&node) || !self.is_connected(node) {
            return None;
        }
        let data = self.element(node)?;
        let kind = match data.tag.as_str() {
            "script" => ResourceKind::Script,
            "link" if data.has_token("rel", "stylesheet") => ResourceKind::Stylesheet,
            _ => return None,
        };
        let raw = data.attribute(kind.url_attribute())?.trim().to_owned();
        if raw.is_empty() {
            return None;
        }
        let url = self.url.join(&raw).ok()?;
        self.started.insert(node);
        Some((kind, url))
    }

    /// Run a fetched classic script in this document's engine.
    ///
    /// # Errors
    /// Returns the uncaught script error, if any.
    pub(crate) fn run_script(&mut self, source: &str, url: &Url) -> Result<()> {
        self.engine.eval_script(source, url.as_str())?;
        self.engine.run_jobs()
    }

    /// Attach a parsed stylesheet owned by `owner`, keeping tree order.
    pub(crate) fn attach_stylesheet(&mut self, owner: NodeId, sheet: Stylesheet) {
        self.stylesheets.retain(|attached| attached.owner != owner);
        self.stylesheets.push(AttachedSheet { owner, sheet });
        let order: HashMap<NodeId, usize> = self
            .root
            .descendants(&self.arena)
            .enumerate()
            .map(|(index, node)| (node, index))
            .collect();
        self.stylesheets
            .sort_by_key(|attached| order.get(&attached.owner).copied().unwrap_or(usize::MAX));
    }

    /// Number of stylesheets currently applied.
    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets
            .iter()
            .filter(|attached| self.is_connected(attached.owner))
            .count()
    }

    /// Set one property of the element's inline `style` attribute; an empty
    /// value removes it.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element of this document.
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let current = self.get_attribute(node, "style").unwrap_or_default();
        let updated = crate::style::inline::set_style_property(&current, property, value);
        self.set_attribute(node, "style", &updated)
    }

    /// Cascaded value of `property` from connected stylesheets and inline style.
    pub fn computed_value(&self, node: NodeId, property: &str) -> Option<String> {
        let view = ElementView {
            document: self,
            node,
        };
        let sheets = self
            .stylesheets
            .iter()
            .filter(|attached| self.is_connected(attached.owner))
            .map(|attached| &attached.sheet);
        let inline = self.element(node).and_then(|data| data.attribute("style"));
        cascaded_value(&view, sheets, inline, property)
    }

    /// Computed `display`, falling back to the user-agent default for the tag.
    pub fn computed_display(&self, node: NodeId) -> String {
        self.computed_value(node, "display").unwrap_or_else(|| {
            self.tag_name(node)
                .map_or("none", default_display)
                .to_owned()
        })
    }

    fn node(&self, node: NodeId) -> Result<&DomNode> {
        self.arena
            .get(node)
            .map(indextree::Node::get)
            .ok_or_else(|| anyhow!("{node:?} does not belong to {}", self.id))
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.arena.get(node).and_then(|entry| entry.get().element())
    }
}

fn element_node(tag: &str) -> DomNode {
    DomNode {
        kind: NodeKind::Element(ElementData::new(tag)),
    }
}

/// Selector-matching view of an element in a document.
struct ElementView<'doc> {
    document: &'doc Document,
    node: NodeId,
}

impl SelectorElement for ElementView<'_> {
    fn local_name(&self) -> Option<String> {
        self.document.tag_name(self.node).map(str::to_owned)
    }

    fn id(&self) -> Option<String> {
        self.document.get_attribute(self.node, "id")
    }

    fn has_class(&self, class: &str) -> bool {
        self.document
            .element(self.node)
            .and_then(|data| data.attribute("class"))
            .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.document.parent(self.node)?;
        self.document.element(parent)?;
        Some(Self {
            document: self.document,
            node: parent,
        })
    }
}

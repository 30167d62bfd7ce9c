//! The host environment: documents, their handles, and resource loading
//! triggered by element insertion.

use crate::config::HostConfig;
use crate::document::{Document, DocumentId, ResourceKind};
use crate::events::{EventListener, EventType};
use crate::style::Stylesheet;
use anyhow::{anyhow, Result};
use indextree::NodeId;
use js::{DeclarativeEngine, JsEngine, Window};
use log::{debug, info, warn};
use net::{FetchError, FetchedResource, NetClient};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use url::Url;

/// Shared state of every document created by one host.
struct HostInner {
    runtime: Handle,
    net: NetClient,
    config: HostConfig,
    next_document: AtomicU64,
}

/// Owns the runtime handle and network client used to load resources for
/// its documents. Cloning shares the host.
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

impl Host {
    /// Create a host that spawns fetches on `runtime`.
    pub fn new(runtime: Handle, config: HostConfig) -> Self {
        let net = NetClient::new(config.net.clone());
        Self {
            inner: Arc::new(HostInner {
                runtime,
                net,
                config,
                next_document: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.inner.config
    }

    /// Create an empty `html > head, body` document at `url` with its own
    /// window and script engine.
    pub fn create_document(&self, url: Url) -> DocumentHandle {
        let id = DocumentId(self.inner.next_document.fetch_add(1, Ordering::Relaxed));
        let window = Window::new();
        let engine: Box<dyn JsEngine> = Box::new(DeclarativeEngine::new(window.clone()));
        let document = Document::new(id, url, engine);
        let (head, body) = (document.head(), document.body());
        debug!("Host: created {id} at {}", document.url());
        DocumentHandle {
            id,
            head,
            body,
            window,
            inner: Arc::new(Mutex::new(document)),
            host: self.clone(),
        }
    }
}

impl Debug for Host {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Host")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Shared, lockable reference to a `Document`.
#[derive(Clone)]
pub struct DocumentHandle {
    id: DocumentId,
    head: NodeId,
    body: NodeId,
    window: Window,
    inner: Arc<Mutex<Document>>,
    host: Host,
}

impl DocumentHandle {
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// The document's global scope; reading it never takes the document lock.
    pub const fn window(&self) -> &Window {
        &self.window
    }

    pub fn head(&self) -> ElementRef {
        ElementRef::new(self.clone(), self.head)
    }

    pub fn body(&self) -> ElementRef {
        ElementRef::new(self.clone(), self.body)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Document>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("{} lock poisoned", self.id))
    }

    /// Run `reader` against the locked document.
    ///
    /// # Errors
    /// Returns an error if the document lock is poisoned.
    pub fn with<R>(&self, reader: impl FnOnce(&Document) -> R) -> Result<R> {
        Ok(reader(&*self.lock()?))
    }

    /// Run `writer` against the locked document. Insertions made here do not
    /// start fetches; use `append_child` for that.
    ///
    /// # Errors
    /// Returns an error if the document lock is poisoned.
    pub fn with_mut<R>(&self, writer: impl FnOnce(&mut Document) -> R) -> Result<R> {
        Ok(writer(&mut *self.lock()?))
    }

    pub fn url(&self) -> Result<Url> {
        self.with(|doc| doc.url().clone())
    }

    /// Resolve `path` against the document URL.
    ///
    /// # Errors
    /// Returns an error if the lock is poisoned or the path cannot be resolved.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        self.lock()?.resolve_url(path)
    }

    /// Create a detached element.
    ///
    /// # Errors
    /// Returns an error if the document lock is poisoned.
    pub fn create_element(&self, tag: &str) -> Result<ElementRef> {
        let node = self.with_mut(|doc| doc.create_element(tag))?;
        Ok(ElementRef::new(self.clone(), node))
    }

    /// Append `child` under `parent`. A connected `script[src]` or
    /// `link[rel=stylesheet][href]` starts loading on the host runtime.
    ///
    /// # Errors
    /// Returns an error if the nodes are unknown or the tree would become cyclic.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let request = {
            let mut doc = self.lock()?;
            doc.append_child(parent, child)?;
            doc.loading_request(child)
        };
        if let Some((kind, url)) = request {
            self.spawn_fetch(child, kind, url);
        }
        Ok(())
    }

    /// Register a listener for events fired at `node`.
    ///
    /// # Errors
    /// Returns an error if the document lock is poisoned.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event_type: EventType,
        listener: EventListener,
    ) -> Result<()> {
        self.with_mut(|doc| doc.add_event_listener(node, event_type, listener))
    }

    /// Fire `event_type` at `node`. Listeners run without the document lock
    /// held, so they may use this handle.
    ///
    /// # Errors
    /// Returns an error if the document lock is poisoned.
    pub fn dispatch_event(&self, node: NodeId, event_type: EventType) -> Result<()> {
        let (listeners, event) = self.with(|doc| {
            (
                doc.listeners_for(node, event_type),
                doc.make_event(node, event_type),
            )
        })?;
        debug!("Host: dispatching {event} to {} listeners", listeners.len());
        for listener in listeners {
            listener(&event);
        }
        Ok(())
    }

    pub fn get_element_by_id(&self, id: &str) -> Result<Option<ElementRef>> {
        let found = self.with(|doc| doc.get_element_by_id(id))?;
        Ok(found.map(|node| ElementRef::new(self.clone(), node)))
    }

    pub fn get_elements_by_tag_name(&self, tag: &str) -> Result<Vec<ElementRef>> {
        let nodes = self.with(|doc| doc.get_elements_by_tag_name(tag))?;
        Ok(nodes
            .into_iter()
            .map(|node| ElementRef::new(self.clone(), node))
            .collect())
    }

    fn spawn_fetch(&self, node: NodeId, kind: ResourceKind, url: Url) {
        debug!("Host: {} {node:?} starts loading {url}", kind.tag_name());
        let handle = self.clone();
        self.host.inner.runtime.spawn(async move {
            let outcome = handle.host.inner.net.fetch(&url).await;
            if let Err(err) = handle.finish_fetch(node, kind, &url, outcome) {
                warn!("Host: dropping completion for {url}: {err}");
            }
        });
    }

    /// Apply a finished fetch and fire `load` or `error` at the element.
    fn finish_fetch(
        &self,
        node: NodeId,
        kind: ResourceKind,
        url: &Url,
        outcome: Result<FetchedResource, FetchError>,
    ) -> Result<()> {
        let event_type = match outcome {
            Ok(resource) => {
                self.apply_resource(node, kind, &resource)?;
                info!("Host: loaded {url}");
                EventType::Load
            }
            Err(err) => {
                warn!("Host: failed to load {url}: {err}");
                EventType::Error
            }
        };
        self.dispatch_event(node, event_type)
    }

    fn apply_resource(&self, node: NodeId, kind: ResourceKind, resource: &FetchedResource) -> Result<()> {
        let text = resource.text();
        match kind {
            ResourceKind::Script => {
                if !self.host.config().scripts_enabled {
                    debug!("Host: scripts disabled, not running {}", resource.url);
                    return Ok(());
                }
                let result = self.lock()?.run_script(&text, &resource.url);
                // An uncaught error is reported, but the element still loaded.
                if let Err(err) = result {
                    warn!("Host: uncaught error in {}: {err:#}", resource.url);
                }
            }
            ResourceKind::Stylesheet => {
                let sheet = Stylesheet::parse(&text);
                self.lock()?.attach_stylesheet(node, sheet);
            }
        }
        Ok(())
    }
}

impl Debug for DocumentHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DocumentHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl PartialEq for DocumentHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DocumentHandle {}

/// An element together with the document that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementRef {
    document: DocumentHandle,
    node: NodeId,
}

impl ElementRef {
    pub const fn new(document: DocumentHandle, node: NodeId) -> Self {
        Self { document, node }
    }

    pub const fn document(&self) -> &DocumentHandle {
        &self.document
    }

    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Window of the owning document.
    pub const fn window(&self) -> &Window {
        self.document.window()
    }

    pub fn tag_name(&self) -> Result<Option<String>> {
        self.document
            .with(|doc| doc.tag_name(self.node).map(str::to_owned))
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.document
            .with_mut(|doc| doc.set_attribute(self.node, name, value))?
    }

    pub fn get_attribute(&self, name: &str) -> Result<Option<String>> {
        self.document.with(|doc| doc.get_attribute(self.node, name))
    }

    /// Append `child`, which must belong to the same document.
    ///
    /// # Errors
    /// Returns an error for a cross-document append or an invalid tree operation.
    pub fn append_child(&self, child: &Self) -> Result<()> {
        if child.document != self.document {
            return Err(anyhow!(
                "cannot append a node of {} into {}",
                child.document.id(),
                self.document.id()
            ));
        }
        self.document.append_child(self.node, child.node)
    }

    pub fn children(&self) -> Result<Vec<Self>> {
        let nodes = self.document.with(|doc| doc.children(self.node))?;
        Ok(nodes
            .into_iter()
            .map(|node| Self::new(self.document.clone(), node))
            .collect())
    }

    pub fn add_event_listener(&self, event_type: EventType, listener: EventListener) -> Result<()> {
        self.document
            .add_event_listener(self.node, event_type, listener)
    }

    pub fn computed_display(&self) -> Result<String> {
        self.document.with(|doc| doc.computed_display(self.node))
    }

    /// Set an inline style property (`element.style.<property> = value`).
    pub fn set_style_property(&self, property: &str, value: &str) -> Result<()> {
        self.document
            .with_mut(|doc| doc.set_style_property(self.node, property, value))?
    }
}

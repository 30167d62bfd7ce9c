//! Starting loads: element creation, listener wiring and dedup.

use crate::cache::{CacheEntry, CacheKey, LoadCache, LoadFuture, LoadResult};
use crate::error::LoadError;
use crate::fulfillment::FulfillmentSpec;
use dom::{DocumentHandle, ElementRef, Event, EventListener, EventType, ResourceKind};
use futures::future::{self, FutureExt as _};
use js::Window;
use log::{debug, trace, warn};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use url::Url;

/// Per-call options for `ResourceLoader::load`.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    fulfilled_with: FulfillmentSpec,
    container: Option<ElementRef>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the load resolves with. Ignored when the load is already cached.
    #[must_use]
    pub fn fulfilled_with(mut self, spec: impl Into<FulfillmentSpec>) -> Self {
        self.fulfilled_with = spec.into();
        self
    }

    /// Insert the element under `container` instead of the loader's default.
    /// Relative paths resolve against the container's document.
    #[must_use]
    pub fn container(mut self, container: ElementRef) -> Self {
        self.container = Some(container);
        self
    }
}

/// Classify a resolved URL by the extension of its last path segment.
/// Query and fragment are not part of the path and so never affect the kind.
pub fn resource_kind(url: &Url) -> Option<ResourceKind> {
    let file_name = url.path().rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.eq_ignore_ascii_case("js") {
        Some(ResourceKind::Script)
    } else if extension.eq_ignore_ascii_case("css") {
        Some(ResourceKind::Stylesheet)
    } else {
        None
    }
}

/// A future that has already rejected with `err`.
fn rejected(err: LoadError) -> LoadFuture {
    future::ready(Err(err)).boxed().shared()
}

/// Loads scripts and stylesheets into documents, at most once per
/// (resolved URL, container).
#[derive(Clone)]
pub struct ResourceLoader {
    default_container: ElementRef,
    cache: LoadCache,
}

impl ResourceLoader {
    /// Loader whose default container is `document`'s `head`, with a fresh cache.
    pub fn new(document: &DocumentHandle) -> Self {
        Self::with_cache(document.head(), LoadCache::new())
    }

    /// Loader over an existing (possibly shared) cache.
    pub const fn with_cache(default_container: ElementRef, cache: LoadCache) -> Self {
        Self {
            default_container,
            cache,
        }
    }

    pub const fn cache(&self) -> &LoadCache {
        &self.cache
    }

    pub const fn default_container(&self) -> &ElementRef {
        &self.default_container
    }

    /// Load `path` into the container named by `options`.
    ///
    /// The first call for a (resolved URL, container) pair inserts a `script`
    /// (for `.js`) or `link rel=stylesheet` (for `.css`) element and returns a
    /// future that resolves when the element fires `load` and rejects with the
    /// event when it fires `error`. Later calls for the same pair return that
    /// same future without touching the document.
    ///
    /// Paths that are empty, unresolvable or of an unsupported kind yield an
    /// already-rejected future and leave both the document and the cache alone.
    pub fn load(&self, path: &str, options: LoadOptions) -> LoadFuture {
        self.start(path, options).unwrap_or_else(|err| {
            warn!("promise_require: not loading {path:?}: {err}");
            rejected(err)
        })
    }

    fn start(&self, path: &str, options: LoadOptions) -> Result<LoadFuture, LoadError> {
        let LoadOptions {
            fulfilled_with,
            container,
        } = options;
        let container = container.unwrap_or_else(|| self.default_container.clone());

        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(LoadError::InvalidPath(path.to_owned()));
        }
        // A poisoned document is a host failure; only a bad join is a bad path.
        let url = container
            .document()
            .with(|doc| doc.url().join(trimmed))?
            .map_err(|_| LoadError::InvalidPath(path.to_owned()))?;
        let kind = resource_kind(&url).ok_or_else(|| LoadError::UnsupportedKind(url.clone()))?;
        let key = CacheKey::new(url, &container);

        // Held until the element is appended, so concurrent callers for the
        // same key always find the entry.
        let mut entries = self.cache.lock();
        if let Some(entry) = entries.get(&key) {
            trace!("promise_require: cache hit for {}", key.url);
            return Ok(entry.outcome.clone());
        }

        let element = create_element(&container, kind, &key.url)?;
        let (sender, receiver) = oneshot::channel::<LoadResult>();
        let listener = settle_listener(sender, fulfilled_with, container.window().clone());
        element.add_event_listener(EventType::Load, Arc::clone(&listener))?;
        element.add_event_listener(EventType::Error, listener)?;

        let outcome = async move { receiver.await.unwrap_or(Err(LoadError::Detached)) }
            .boxed()
            .shared();
        entries.insert(
            key.clone(),
            CacheEntry {
                outcome: outcome.clone(),
                element: element.node(),
            },
        );
        if let Err(err) = container.append_child(&element) {
            entries.remove(&key);
            return Err(err.into());
        }
        debug!(
            "promise_require: loading {} into {:?} of {}",
            key.url, key.container, key.document
        );
        Ok(outcome)
    }
}

/// `script src=url` or `link rel=stylesheet href=url`, detached.
fn create_element(container: &ElementRef, kind: ResourceKind, url: &Url) -> Result<ElementRef, LoadError> {
    let element = container.document().create_element(kind.tag_name())?;
    if kind == ResourceKind::Stylesheet {
        element.set_attribute("rel", "stylesheet")?;
    }
    element.set_attribute(kind.url_attribute(), url.as_str())?;
    Ok(element)
}

/// One listener for both events; whichever fires first settles the load.
fn settle_listener(
    sender: oneshot::Sender<LoadResult>,
    fulfilled_with: FulfillmentSpec,
    window: Window,
) -> EventListener {
    let slot = Mutex::new(Some(sender));
    Arc::new(move |event: &Event| {
        let Some(sender) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return;
        };
        let result = match event.event_type() {
            EventType::Load => Ok(fulfilled_with.resolve(&window)),
            EventType::Error => Err(LoadError::Resource(event.clone())),
        };
        // Every awaiting caller may have gone away; the outcome is still cached.
        let _ = sender.send(result);
    })
}

#[cfg(test)]
mod tests {
    use super::resource_kind;
    use dom::ResourceKind;
    use url::Url;

    fn kind(url: &str) -> Option<ResourceKind> {
        Url::parse(url).ok().and_then(|url| resource_kind(&url))
    }

    #[test]
    fn classifies_by_last_segment_extension() {
        assert_eq!(kind("http://localhost/a.js"), Some(ResourceKind::Script));
        assert_eq!(kind("file:///x/y/Style.CSS"), Some(ResourceKind::Stylesheet));
        assert_eq!(kind("http://localhost/a.js?v=2#top"), Some(ResourceKind::Script));
        assert_eq!(kind("http://localhost/a.json"), None);
        assert_eq!(kind("http://localhost/js"), None);
        assert_eq!(kind("http://localhost/dir.js/"), None);
        assert_eq!(kind("http://localhost/page?file=a.js"), None);
    }
}

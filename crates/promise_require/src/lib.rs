//! Load scripts and stylesheets into a document as shared futures.
//!
//! `ResourceLoader::load` inserts a `script` or `link rel=stylesheet` element
//! under a container element and returns a future that settles on the
//! element's `load` or `error` event. Loads are deduplicated by resolved URL
//! and container: repeated calls return the first call's future, and the
//! document sees one element per pair.
//!
//! ```no_run
//! # async fn demo(document: dom::DocumentHandle) -> Result<(), promise_require::LoadError> {
//! use promise_require::{LoadOptions, ResourceLoader};
//!
//! let loader = ResourceLoader::new(&document);
//! let value = loader
//!     .load("lib/widget.js", LoadOptions::new().fulfilled_with("Widget"))
//!     .await?;
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod fulfillment;
pub mod loader;

pub use cache::{CacheKey, LoadCache, LoadFuture, LoadResult};
pub use error::LoadError;
pub use fulfillment::{Extractor, FulfillmentSpec};
pub use loader::{resource_kind, LoadOptions, ResourceLoader};

/// Shorthand for `loader.load(path, options)`.
pub fn promise_require(loader: &ResourceLoader, path: &str, options: LoadOptions) -> LoadFuture {
    loader.load(path, options)
}

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]
use anyhow::{anyhow, Result};
use dom::{DocumentHandle, ElementRef, Host, HostConfig};
use promise_require::{LoadFuture, LoadResult, ResourceLoader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;
use url::Url;

/// How long a test waits for a load to settle before failing.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the directory containing fixtures for integration tests.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn to_file_url(p: &Path) -> Result<Url> {
    let canonical = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    Url::from_file_path(&canonical)
        .map_err(|()| anyhow!("Invalid file path for URL: {}", canonical.display()))
}

/// A page at `tests/fixtures/index.html`, a frame document at
/// `tests/fixtures/frame/index.html` and a loader defaulting to the page head.
///
/// The fixture HTML is never parsed; only its location serves as the base
/// URL. Tests build the elements they style through the DOM API.
pub struct Page {
    pub rt: Runtime,
    pub host: Host,
    pub document: DocumentHandle,
    pub frame: DocumentHandle,
    pub loader: ResourceLoader,
}

impl Page {
    pub fn new() -> Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        let rt = Runtime::new()?;
        let host = Host::new(rt.handle().clone(), HostConfig::default());
        let document = host.create_document(to_file_url(&fixtures_dir().join("index.html"))?);
        let frame = host.create_document(to_file_url(
            &fixtures_dir().join("frame").join("index.html"),
        )?);
        let loader = ResourceLoader::new(&document);
        Ok(Self {
            rt,
            host,
            document,
            frame,
            loader,
        })
    }

    /// Wait for `future` to settle.
    pub fn settle(&self, future: LoadFuture) -> Result<LoadResult> {
        self.rt
            .block_on(async { tokio::time::timeout(SETTLE_TIMEOUT, future).await })
            .map_err(|_| anyhow!("load did not settle within {SETTLE_TIMEOUT:?}"))
    }

    /// Append `<tag id=id>` to the body of `document`.
    pub fn add_element(document: &DocumentHandle, tag: &str, id: &str) -> Result<ElementRef> {
        let element = document.create_element(tag)?;
        element.set_attribute("id", id)?;
        document.body().append_child(&element)?;
        Ok(element)
    }

    /// Number of `tag` elements in `document`.
    pub fn count(document: &DocumentHandle, tag: &str) -> Result<usize> {
        Ok(document.get_elements_by_tag_name(tag)?.len())
    }
}

#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]
use anyhow::{anyhow, Result};
use dom::{DocumentHandle, ElementRef, EventType, Host, HostConfig};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use url::Url;

/// How long a test waits for a resource event before failing.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

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

/// Build a host on `rt` and a document at `tests/fixtures/index.html`.
pub fn create_document(rt: &Runtime) -> Result<(Host, DocumentHandle)> {
    let host = Host::new(rt.handle().clone(), HostConfig::default());
    let url = to_file_url(&fixtures_dir().join("index.html"))?;
    let document = host.create_document(url);
    Ok((host, document))
}

/// Subscribe to both resource events of `element`, forwarding the type fired.
pub fn watch_events(element: &ElementRef) -> Result<Receiver<EventType>> {
    let (tx, rx) = channel();
    for event_type in [EventType::Load, EventType::Error] {
        let tx = tx.clone();
        element.add_event_listener(
            event_type,
            Arc::new(move |event| {
                let _ = tx.send(event.event_type());
            }),
        )?;
    }
    Ok(rx)
}

//! Cache identity, concurrent callers and requests that never start.

use anyhow::{anyhow, Result};
use dom::{ElementRef, Host, HostConfig};
use js::JSValue;
use promise_require::{LoadCache, LoadError, LoadOptions, ResourceLoader};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tokio::runtime::{Builder, Runtime};

mod common;
use common::Page;

#[test]
fn concurrent_callers_share_one_element() -> Result<()> {
    let page = Page::new()?;
    let futures = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    page.loader.load(
                        "asset/require-multiple-times.js",
                        LoadOptions::new().fulfilled_with("requireMultipletimes"),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .collect::<Vec<_>>()
    });
    assert_eq!(futures.len(), 8);

    for future in futures {
        assert_eq!(page.settle(future)??, JSValue::Number(1.0));
    }
    assert_eq!(Page::count(&page.document, "script")?, 1);
    assert_eq!(page.loader.cache().len(), 1);
    Ok(())
}

#[test]
fn equivalent_paths_share_a_load() -> Result<()> {
    let page = Page::new()?;
    let first = page.loader.load("asset/a.js", LoadOptions::new());
    let second = page.loader.load("./asset/../asset/a.js", LoadOptions::new());
    let absolute = page.document.resolve_url("asset/a.js")?;
    let third = page.loader.load(absolute.as_str(), LoadOptions::new());

    page.settle(first)??;
    page.settle(second)??;
    page.settle(third)??;
    assert_eq!(Page::count(&page.document, "script")?, 1);
    Ok(())
}

#[test]
fn distinct_containers_load_separately() -> Result<()> {
    let page = Page::new()?;
    let options = LoadOptions::new().fulfilled_with("requireMultipletimes");
    let in_head = page.loader.load("asset/require-multiple-times.js", options.clone());
    let in_body = page.loader.load(
        "asset/require-multiple-times.js",
        options.container(page.document.body()),
    );

    let first = page.settle(in_head)??;
    let second = page.settle(in_body)??;
    assert_eq!(Page::count(&page.document, "script")?, 2);
    assert_eq!(page.loader.cache().len(), 2);
    // Both ran in the same window; the later load event sees both runs.
    assert_eq!(page.document.window().get("requireMultipletimes"), JSValue::Number(2.0));
    assert!(first == JSValue::Number(2.0) || second == JSValue::Number(2.0));
    Ok(())
}

#[test]
fn cache_hit_keeps_first_fulfillment() -> Result<()> {
    let page = Page::new()?;
    let first = page.loader.load(
        "asset/multiple-global-vars.js",
        LoadOptions::new().fulfilled_with("globalVar2"),
    );
    let second = page.loader.load(
        "asset/multiple-global-vars.js",
        LoadOptions::new().fulfilled_with("globalVar1"),
    );
    assert_eq!(page.settle(first)??, JSValue::Number(1.0));
    assert_eq!(page.settle(second)??, JSValue::Number(1.0));
    Ok(())
}

#[test]
fn loaders_sharing_a_cache_dedupe_together() -> Result<()> {
    let page = Page::new()?;
    let cache = LoadCache::new();
    let head_loader = ResourceLoader::with_cache(page.document.head(), cache.clone());
    let other = ResourceLoader::with_cache(page.document.head(), cache.clone());

    page.settle(head_loader.load("asset/a.js", LoadOptions::new()))??;
    page.settle(other.load("asset/a.js", LoadOptions::new()))??;
    assert_eq!(cache.len(), 1);
    assert_eq!(Page::count(&page.document, "script")?, 1);
    Ok(())
}

#[test]
fn invalid_requests_reject_without_touching_the_document() -> Result<()> {
    let page = Page::new()?;
    let empty = page.settle(page.loader.load("   ", LoadOptions::new()))?;
    assert!(matches!(empty, Err(LoadError::InvalidPath(_))));

    let unsupported = page.settle(page.loader.load("asset/data.json", LoadOptions::new()))?;
    match unsupported {
        Err(LoadError::UnsupportedKind(url)) => assert!(url.path().ends_with("/asset/data.json")),
        other => anyhow::bail!("expected UnsupportedKind, got {other:?}"),
    }

    let no_extension = page.settle(page.loader.load("asset/a", LoadOptions::new()))?;
    assert!(matches!(no_extension, Err(LoadError::UnsupportedKind(_))));

    assert!(page.loader.cache().is_empty());
    assert_eq!(Page::count(&page.document, "script")?, 0);
    assert_eq!(Page::count(&page.document, "link")?, 0);
    Ok(())
}

#[test]
fn refused_insertion_rejects_and_forgets_the_entry() -> Result<()> {
    let page = Page::new()?;
    // A node id the page document never allocated.
    let frame_nodes = (0..16)
        .map(|_| page.frame.create_element("div").map(|element| element.node()))
        .collect::<Result<Vec<_>>>()?;
    let foreign = *frame_nodes
        .last()
        .ok_or_else(|| anyhow!("frame allocated no nodes"))?;
    let container = ElementRef::new(page.document.clone(), foreign);

    let outcome = page.settle(
        page.loader
            .load("asset/a.js", LoadOptions::new().container(container)),
    )?;
    assert!(matches!(outcome, Err(LoadError::Host(_))), "got {outcome:?}");
    assert!(page.loader.cache().is_empty());
    assert_eq!(Page::count(&page.document, "script")?, 0);
    Ok(())
}

#[test]
fn dropped_document_detaches_pending_load() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    // A current-thread runtime never polls the fetch unless driven.
    let idle = Builder::new_current_thread().enable_all().build()?;
    let host = Host::new(idle.handle().clone(), HostConfig::default());
    let document = host.create_document(common::to_file_url(
        &common::fixtures_dir().join("index.html"),
    )?);
    let loader = ResourceLoader::new(&document);
    let future = loader.load("asset/a.js", LoadOptions::new());

    drop(loader);
    drop(document);
    drop(idle);

    let waiter = Runtime::new()?;
    let outcome =
        waiter.block_on(async { tokio::time::timeout(common::SETTLE_TIMEOUT, future).await })?;
    assert_eq!(outcome, Err(LoadError::Detached));
    Ok(())
}

#[test]
fn poisoned_document_is_a_host_error() -> Result<()> {
    let page = Page::new()?;
    let poisoned = panic::catch_unwind(AssertUnwindSafe(|| {
        page.document.with_mut::<()>(|_| panic!("writer panicked"))
    }));
    assert!(poisoned.is_err());

    let outcome = page.settle(page.loader.load("asset/a.js", LoadOptions::new()))?;
    assert!(matches!(outcome, Err(LoadError::Host(_))), "got {outcome:?}");
    assert!(page.loader.cache().is_empty());
    Ok(())
}

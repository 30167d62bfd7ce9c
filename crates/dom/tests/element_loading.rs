//! Inserting loading elements fetches, applies and reports resources.

use anyhow::Result;
use dom::EventType;
use js::JSValue;
use tokio::runtime::Runtime;

mod common;

#[test]
fn connected_script_runs_and_fires_load() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let rt = Runtime::new()?;
    let (_host, document) = common::create_document(&rt)?;

    let script = document.create_element("script")?;
    script.set_attribute("src", "asset/hello.js")?;
    let events = common::watch_events(&script)?;
    document.head().append_child(&script)?;

    assert_eq!(events.recv_timeout(common::EVENT_TIMEOUT)?, EventType::Load);
    assert_eq!(
        document.window().get("greeting"),
        JSValue::String(String::from("hello"))
    );
    assert_eq!(document.window().get("loads"), JSValue::Number(1.0));
    Ok(())
}

#[test]
fn detached_script_does_not_load_until_connected() -> Result<()> {
    let rt = Runtime::new()?;
    let (_host, document) = common::create_document(&rt)?;

    let wrapper = document.create_element("div")?;
    let script = document.create_element("script")?;
    script.set_attribute("src", "asset/hello.js")?;
    let events = common::watch_events(&script)?;
    wrapper.append_child(&script)?;
    assert!(events.recv_timeout(std::time::Duration::from_millis(200)).is_err());
    assert!(document.window().get("greeting").is_undefined());

    // Moving the script into the tree starts the fetch.
    document.head().append_child(&script)?;
    assert_eq!(events.recv_timeout(common::EVENT_TIMEOUT)?, EventType::Load);
    Ok(())
}

#[test]
fn missing_resource_fires_error() -> Result<()> {
    let rt = Runtime::new()?;
    let (_host, document) = common::create_document(&rt)?;

    let link = document.create_element("link")?;
    link.set_attribute("rel", "stylesheet")?;
    link.set_attribute("href", "asset/nonexistent.css")?;
    let events = common::watch_events(&link)?;
    document.head().append_child(&link)?;

    assert_eq!(events.recv_timeout(common::EVENT_TIMEOUT)?, EventType::Error);
    assert_eq!(document.with(dom::Document::stylesheet_count)?, 0);
    Ok(())
}

#[test]
fn script_error_still_fires_load() -> Result<()> {
    let rt = Runtime::new()?;
    let (_host, document) = common::create_document(&rt)?;

    let script = document.create_element("script")?;
    script.set_attribute("src", "asset/broken.js")?;
    let events = common::watch_events(&script)?;
    document.body().append_child(&script)?;

    assert_eq!(events.recv_timeout(common::EVENT_TIMEOUT)?, EventType::Load);
    assert_eq!(document.window().get("before"), JSValue::Number(1.0));
    assert!(document.window().get("after").is_undefined());
    Ok(())
}

#[test]
fn reinserting_a_started_element_does_not_fetch_again() -> Result<()> {
    let rt = Runtime::new()?;
    let (_host, document) = common::create_document(&rt)?;

    let script = document.create_element("script")?;
    script.set_attribute("src", "asset/hello.js")?;
    let events = common::watch_events(&script)?;
    document.head().append_child(&script)?;
    assert_eq!(events.recv_timeout(common::EVENT_TIMEOUT)?, EventType::Load);

    document.body().append_child(&script)?;
    assert!(events.recv_timeout(std::time::Duration::from_millis(200)).is_err());
    assert_eq!(document.window().get("loads"), JSValue::Number(1.0));
    assert_eq!(document.get_elements_by_tag_name("script")?.len(), 1);
    Ok(())
}

#[test]
fn cross_document_append_is_rejected() -> Result<()> {
    let rt = Runtime::new()?;
    let (host, document) = common::create_document(&rt)?;
    let other = host.create_document(document.url()?);

    let foreign = other.create_element("div")?;
    assert!(document.body().append_child(&foreign).is_err());
    assert_ne!(document.id(), other.id());
    assert!(!document.window().ptr_eq(other.window()));
    Ok(())
}

#[test]
fn disabled_scripts_still_fire_load() -> Result<()> {
    let rt = Runtime::new()?;
    let host = dom::Host::new(
        rt.handle().clone(),
        dom::HostConfig::new(net::NetPolicy::default(), false),
    );
    let document = host.create_document(common::to_file_url(
        &common::fixtures_dir().join("index.html"),
    )?);

    let script = document.create_element("script")?;
    script.set_attribute("src", "asset/hello.js")?;
    let events = common::watch_events(&script)?;
    document.head().append_child(&script)?;

    assert_eq!(events.recv_timeout(common::EVENT_TIMEOUT)?, EventType::Load);
    assert!(document.window().get("greeting").is_undefined());
    Ok(())
}

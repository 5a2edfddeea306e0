use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cb_core::ports::{HostCommandPort, HostEventPort};
use cb_core::protocol::{commands, events};
use cb_platform::{InMemoryEventBus, LocalClipboardHost, MemoryClipboard};
use serde_json::{json, Value};

fn host() -> LocalClipboardHost<MemoryClipboard> {
    LocalClipboardHost::new(MemoryClipboard::new(), Arc::new(InMemoryEventBus::new()))
}

#[tokio::test]
async fn html_only_write_leaves_no_text() {
    let host = host();
    host.invoke(commands::WRITE_HTML, json!({ "html": "<p>x</p>" }))
        .await
        .unwrap();

    assert_eq!(
        host.invoke(commands::HAS_HTML, Value::Null).await.unwrap(),
        json!(true)
    );
    assert_eq!(
        host.invoke(commands::HAS_TEXT, Value::Null).await.unwrap(),
        json!(false)
    );
}

#[tokio::test]
async fn html_and_text_write_sets_both() {
    let host = host();
    host.invoke(
        commands::WRITE_HTML_AND_TEXT,
        json!({ "html": "<p>x</p>", "text": "x" }),
    )
    .await
    .unwrap();

    assert_eq!(
        host.invoke(commands::READ_HTML, Value::Null).await.unwrap(),
        json!("<p>x</p>")
    );
    assert_eq!(
        host.invoke(commands::READ_TEXT, Value::Null).await.unwrap(),
        json!("x")
    );
}

#[tokio::test]
async fn clear_empties_every_kind() {
    let host = host();
    host.invoke(commands::WRITE_RTF, json!({ "rtf": "{\\rtf1 x}" }))
        .await
        .unwrap();
    host.invoke(commands::CLEAR, Value::Null).await.unwrap();

    assert_eq!(
        host.invoke(commands::AVAILABLE_TYPES, Value::Null)
            .await
            .unwrap(),
        json!({ "text": false, "html": false, "rtf": false, "image": false, "files": false })
    );
}

#[tokio::test]
async fn missing_arguments_are_reported() {
    let host = host();
    let err = host
        .invoke(commands::WRITE_TEXT, json!({ "value": "x" }))
        .await
        .unwrap_err();
    assert!(err.to_string().contains(commands::WRITE_TEXT));
}

#[tokio::test]
async fn every_change_while_monitoring_publishes_one_marker() {
    let host = host();
    let updates = Arc::new(AtomicUsize::new(0));
    let counter = updates.clone();
    host.events()
        .listen(
            events::MONITOR_UPDATE,
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await
        .unwrap();

    host.invoke(commands::WRITE_TEXT, json!({ "text": "before" }))
        .await
        .unwrap();
    host.invoke(commands::START_MONITOR, Value::Null)
        .await
        .unwrap();
    host.invoke(commands::WRITE_TEXT, json!({ "text": "a" }))
        .await
        .unwrap();
    host.invoke(commands::WRITE_TEXT, json!({ "text": "b" }))
        .await
        .unwrap();
    host.invoke(commands::STOP_MONITOR, Value::Null).await.unwrap();
    host.invoke(commands::STOP_MONITOR, Value::Null).await.unwrap();

    assert_eq!(updates.load(Ordering::SeqCst), 2);
}

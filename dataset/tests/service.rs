mod common;
use std::time::Duration;

use common::{Script, sequence, settle};
use dataset::*;
use dataset_signals::{Peek, Subscribe};

#[tokio::test]
async fn test_initial_query_loads() {
    let service = DatasetService::new(DatasetConfig::new(|| async { Ok(vec![1, 2]) }));
    assert!(service.loading().peek());
    assert_eq!(service.generation(), 1);

    service.loaded().await;
    assert!(!service.loading().peek());
    assert_eq!(service.data().peek(), Some(vec![1, 2]));
    assert!(service.error().peek().is_none());
    service.dispose();
}

#[tokio::test(start_paused = true)]
async fn test_latest_started_attempt_wins() {
    let script = Script::new();
    let service = DatasetService::new(DatasetConfig::new(script.query()));
    settle().await;
    assert_eq!(script.calls(), 1);

    let second = service.refresh();
    settle().await;
    assert_eq!(script.calls(), 2);

    // newer attempt resolves first
    script.respond(1, Ok("B"));
    second.await;
    assert_eq!(service.data().peek(), Some("B"));
    assert!(!service.loading().peek());

    // the older one arrives late and is discarded
    script.respond(0, Ok("A"));
    settle().await;
    assert_eq!(service.data().peek(), Some("B"));
    assert!(!service.loading().peek());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_result_does_not_clear_loading() {
    let script = Script::new();
    let service = DatasetService::new(DatasetConfig::new(script.query()).fallback(Fallback::value(0)));
    settle().await;
    service.refresh();
    settle().await;

    script.respond(0, Ok(1));
    settle().await;
    assert_eq!(service.data().peek(), None);
    assert!(service.loading().peek());

    // the current attempt fails and falls back
    script.respond(1, Err(anyhow::anyhow!("offline")));
    settle().await;
    assert_eq!(service.data().peek(), Some(0));
    assert!(service.error().peek().is_some());
    assert!(!service.loading().peek());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_stale_failure_is_ignored() {
    let script = Script::new();
    let service = DatasetService::new(DatasetConfig::new(script.query()).fallback(Fallback::value(-1)));
    settle().await;
    service.refresh();
    settle().await;

    script.respond(1, Ok(2));
    settle().await;
    script.respond(0, Err(anyhow::anyhow!("stale")));
    settle().await;

    assert_eq!(service.data().peek(), Some(2));
    assert!(service.error().peek().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_superseded_async_fallback_is_discarded() {
    let script = Script::new();
    let fallback = Script::new();
    let service = DatasetService::new(DatasetConfig::new(script.query()).fallback(Fallback::with_async(fallback.query())));
    settle().await;

    // the first attempt fails and its fallback stays pending
    script.respond(0, Err(anyhow::anyhow!("offline")));
    settle().await;
    assert_eq!(fallback.calls(), 1);

    service.refresh();
    settle().await;
    script.respond(1, Ok(2));
    settle().await;
    assert_eq!(service.data().peek(), Some(2));
    assert!(!service.loading().peek());

    fallback.respond(0, Ok(-1));
    settle().await;
    assert_eq!(service.data().peek(), Some(2));
    assert!(service.error().peek().is_none());
    assert!(!service.loading().peek());
}

#[tokio::test]
async fn test_static_fallback() {
    let service = DatasetService::new(
        DatasetConfig::new(|| async { Err::<Vec<u8>, _>(anyhow::anyhow!("offline")) }).fallback(Fallback::value(vec![9])),
    );
    service.loaded().await;
    assert_eq!(service.data().peek(), Some(vec![9]));
    assert!(!service.loading().peek());
    assert!(matches!(service.error().peek(), Some(DatasetError::Query(_))));
}

#[tokio::test]
async fn test_function_fallbacks() {
    let sync = DatasetService::new(
        DatasetConfig::new(|| async { Err::<String, _>(anyhow::anyhow!("offline")) }).fallback(Fallback::with(|| "sync".to_string())),
    );
    let async_ = DatasetService::new(
        DatasetConfig::new(|| async { Err::<String, _>(anyhow::anyhow!("offline")) })
            .fallback(Fallback::with_async(|| async { Ok("async".to_string()) })),
    );
    sync.loaded().await;
    async_.loaded().await;
    assert_eq!(sync.data().peek().as_deref(), Some("sync"));
    assert_eq!(async_.data().peek().as_deref(), Some("async"));
}

#[tokio::test]
async fn test_failure_without_fallback() {
    let service = DatasetService::new(DatasetConfig::new(|| async { Err::<u32, _>(anyhow::anyhow!("boom")) }));
    service.loaded().await;
    assert_eq!(service.data().peek(), None);
    assert!(!service.loading().peek());

    let error = service.error().peek().expect("error recorded");
    assert_eq!(error.to_string(), "query failed: boom");
}

#[tokio::test]
async fn test_failure_keeps_previous_data() {
    let (_calls, query) = sequence(vec![Ok(1), Err(anyhow::anyhow!("flaky")), Ok(3)]);
    let service = DatasetService::new(DatasetConfig::new(query));
    service.loaded().await;
    assert_eq!(service.data().peek(), Some(1));

    service.refresh().await;
    assert_eq!(service.data().peek(), Some(1));
    assert!(service.error().peek().is_some());

    service.refresh().await;
    assert_eq!(service.data().peek(), Some(3));
    assert!(service.error().peek().is_none());
}

#[tokio::test]
async fn test_failing_fallback_counts_as_none() {
    let (_calls, query) = sequence(vec![Ok(1), Err(anyhow::anyhow!("offline"))]);
    let service = DatasetService::new(
        DatasetConfig::new(query).fallback(Fallback::with_async(|| async { Err(anyhow::anyhow!("no default")) })),
    );
    service.loaded().await;
    service.refresh().await;

    assert_eq!(service.data().peek(), Some(1));
    assert!(!service.loading().peek());
    match service.error().peek() {
        Some(DatasetError::Fallback(err)) => assert_eq!(err.to_string(), "no default"),
        other => panic!("expected fallback error, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_debounced_triggers_collapse() {
    let (calls, query) = sequence((0..10).map(Ok).collect());
    let service = DatasetService::new(DatasetConfig::new(query).debounce(Duration::from_millis(200)));
    settle().await;
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    let first = service.trigger_query(true);
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.trigger_query(true);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let last = service.trigger_query(true);

    // the superseded timer released its waiters
    assert!(first.is_settled());

    tokio::time::sleep(Duration::from_millis(199)).await;
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(service.loading().peek());

    tokio::time::sleep(Duration::from_millis(2)).await;
    last.await;
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(service.data().peek(), Some(1));
    assert_eq!(service.generation(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_pending_debounce() {
    let (calls, query) = sequence((0..10).map(Ok).collect());
    let service = DatasetService::new(DatasetConfig::new(query));
    settle().await;

    service.trigger_query(true);
    assert!(service.loading().peek());
    service.dispose();
    assert!(service.is_disposed());
    assert!(!service.loading().peek());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(service.loaded().is_settled());

    // triggers after dispose are ignored
    let loaded = service.refresh();
    assert!(loaded.is_settled());
    settle().await;
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(service.generation(), 2);

    // disposing twice is harmless
    service.dispose();
}

#[tokio::test]
async fn test_loading_notifications() {
    let (_calls, query) = sequence(vec![Ok(1), Ok(2)]);
    let service = DatasetService::new(DatasetConfig::new(query));
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _guard = service.loading().subscribe(tx);

    service.loaded().await;
    service.refresh().await;

    let mut seen = Vec::new();
    while let Ok(loading) = rx.try_recv() {
        seen.push(loading);
    }
    assert_eq!(seen, [false, true, false]);
}

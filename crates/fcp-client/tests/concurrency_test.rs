//! Several clients sharing one node link.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use fcp_client::blocking::BlockingClient;
use fcp_client::{BackoffPolicy, ClientConfig, FcpClient, MemoryConnection};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn fast_config() -> ClientConfig {
    ClientConfig {
        backoff: BackoffPolicy::fixed(Duration::from_millis(2)),
        ..Default::default()
    }
}

fn shared_node(names: usize) -> Arc<MemoryConnection> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let node = Arc::new(MemoryConnection::new().expect("Failed to start in-memory node"));
    for i in 0..names {
        node.store(format!("KSK@item-{i}"), format!("content of item {i}"));
    }
    node
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clients_never_see_each_others_responses() {
    let node = shared_node(16);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        let client = FcpClient::with_config(node.clone(), fast_config());
        tasks.spawn(async move {
            for round in 0..10 {
                let data = client
                    .fetch(&format!("KSK@item-{i}"))
                    .await
                    .expect("fetch")
                    .expect("stored");
                assert_eq!(
                    data.as_ref(),
                    format!("content of item {i}").as_bytes(),
                    "client {i} got foreign content in round {round}"
                );
            }
        });
    }

    while let Some(result) = tasks.join_next().await {
        result.expect("fetch task");
    }
    assert_eq!(node.submitted().len(), 160);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_one_client_serializes_concurrent_callers() {
    let node = shared_node(8);
    node.set_unavailable(4);
    let client = Arc::new(FcpClient::with_config(node.clone(), fast_config()));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..8 {
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            let data = client
                .fetch(&format!("KSK@item-{i}"))
                .await
                .expect("fetch")
                .expect("stored");
            assert_eq!(data.as_ref(), format!("content of item {i}").as_bytes());
        });
    }

    while let Some(result) = tasks.join_next().await {
        result.expect("fetch task");
    }
    assert_eq!(client.submit_retries(), 4);
}

#[test]
fn test_blocking_clients_on_plain_threads() {
    let node = shared_node(6);

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let node = Arc::clone(&node);
            thread::spawn(move || {
                let client = BlockingClient::with_config(node, fast_config()).expect("client");
                let name = format!("KSK@item-{i}");
                let data = client.fetch(&name).expect("fetch").expect("stored");
                assert_eq!(data.as_ref(), format!("content of item {i}").as_bytes());

                let outcome = client
                    .insert(format!("reply {i}"), &format!("KSK@reply-{i}"))
                    .expect("insert");
                assert!(outcome.is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("client thread");
    }
    for i in 0..6 {
        assert_eq!(
            node.get(&format!("KSK@reply-{i}")).as_deref(),
            Some(format!("reply {i}").as_bytes())
        );
    }
}

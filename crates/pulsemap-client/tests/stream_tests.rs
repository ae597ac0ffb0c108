//! End-to-end subscription tests against a live server

use pulsemap_client::{subscribe, FifoHandle};
use pulsemap_core::{EventKind, MapEvent};
use pulsemap_server::config::ServerConfig;
use pulsemap_server::server::build_app_with_state;
use pulsemap_server::state::AppState;
use std::net::SocketAddr;
use std::time::Duration;

async fn serve(state: AppState, listener: tokio::net::TcpListener) -> SocketAddr {
    let addr = listener.local_addr().unwrap();
    let app = build_app_with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn wait_for_depth(fifo: &FifoHandle, depth: usize) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while fifo.len() < depth {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("fifo never reached expected depth");
}

#[tokio::test]
async fn test_subscribe_receives_backlog_then_live() {
    let state = AppState::new(ServerConfig::default());
    state
        .queue
        .append(&[MapEvent::new("history", "Warsaw", EventKind::Pulse)]);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = serve(state.clone(), listener).await;

    let fifo = FifoHandle::new();
    let url = format!("http://{addr}/api/events");
    let task = tokio::spawn({
        let fifo = fifo.clone();
        async move { subscribe(&url, fifo).await }
    });

    // Backlog replay arrives first, then a live event
    wait_for_depth(&fifo, 1).await;
    state
        .queue
        .append(&[MapEvent::new("live", "Berlin", EventKind::Ripple)]);
    wait_for_depth(&fifo, 2).await;

    let ids: Vec<_> = fifo.take_batch(2).into_iter().map(|e| e.id).collect();
    assert_eq!(ids, ["history", "live"]);
    task.abort();
}

#[tokio::test]
async fn test_subscribe_retries_until_server_appears() {
    // Reserve an address, then release it so the first attempts are refused
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fifo = FifoHandle::new();
    let url = format!("http://{addr}/api/events");
    let task = tokio::spawn({
        let fifo = fifo.clone();
        async move { subscribe(&url, fifo).await }
    });

    // Let at least one connection attempt fail
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(fifo.is_empty());

    let state = AppState::new(ServerConfig::default());
    state
        .queue
        .append(&[MapEvent::new("late", "Paris", EventKind::Pulse)]);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    serve(state, listener).await;

    // The retry loop finds the server and replays the backlog
    wait_for_depth(&fifo, 1).await;
    task.abort();
}

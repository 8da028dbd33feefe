use std::net::SocketAddr;
use std::time::Duration;

use buddy_quiz::server;
use buddy_quiz::store::{KvStore, MemoryStore, RemoteStore, StoreError};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    store: MemoryStore,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let store = MemoryStore::new();
        let (shutdown, stopped) = oneshot::channel::<()>();

        let served = store.clone();
        let handle = tokio::spawn(async move {
            server::serve(listener, served, async {
                let _ = stopped.await;
            })
            .await;
        });

        Self {
            addr,
            store,
            shutdown,
            handle,
        }
    }

    async fn connect(&self) -> RemoteStore {
        RemoteStore::connect(&format!("ws://{}", self.addr))
            .await
            .expect("failed to connect to test server")
    }
}

/// Polls `check` until it holds or about a second has passed.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..50 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_remote_reads_and_writes_shared_tree() {
    let server = TestServer::start().await;
    let client = server.connect().await;

    assert_eq!(client.get("quizzes/Q1").await.unwrap(), None);
    client
        .set("quizzes/Q1", json!({ "creatorName": "Sam", "questions": [] }))
        .await
        .unwrap();

    assert_eq!(
        server.store.get("quizzes/Q1/creatorName").await.unwrap(),
        Some(json!("Sam"))
    );
    assert_eq!(
        client.get("quizzes/Q1/creatorName").await.unwrap(),
        Some(json!("Sam"))
    );

    let key = client
        .push("quizzes/Q1/scores", json!({ "score": 3, "timestamp": { ".sv": "timestamp" } }))
        .await
        .unwrap();
    let stored = client
        .get(&format!("quizzes/Q1/scores/{}", key))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["score"], 3);
    assert!(stored["timestamp"].is_i64());

    client.set("quizzes/Q1", serde_json::Value::Null).await.unwrap();
    assert_eq!(client.get("quizzes/Q1").await.unwrap(), None);
}

#[tokio::test]
async fn test_subscription_follows_other_clients() {
    let server = TestServer::start().await;
    let watcher = server.connect().await;
    let writer = server.connect().await;

    let mut scores = watcher.subscribe("quizzes/Q1/scores").await.unwrap();
    assert_eq!(scores.next().await, Some(None));

    let key = writer
        .push("quizzes/Q1/scores", json!({ "friendName": "Bo", "score": 2 }))
        .await
        .unwrap();
    let update = tokio::time::timeout(Duration::from_secs(2), scores.next())
        .await
        .expect("no update arrived")
        .unwrap()
        .unwrap();
    assert_eq!(update[&key]["friendName"], "Bo");
}

#[tokio::test]
async fn test_dropping_subscription_unsubscribes() {
    let server = TestServer::start().await;
    let client = server.connect().await;

    let subscription = client.subscribe("quizzes/Q1/scores").await.unwrap();
    assert!(eventually(|| async { server.store.listener_count().await == 1 }).await);

    drop(subscription);
    assert!(eventually(|| async { server.store.listener_count().await == 0 }).await);
}

#[tokio::test]
async fn test_dropped_subscriptions_leave_no_feeds() {
    let server = TestServer::start().await;
    let client = server.connect().await;

    for _ in 0..100 {
        let mut scores = client.subscribe("quizzes/Q1/scores").await.unwrap();
        assert_eq!(scores.next().await, Some(None));
        drop(scores);
    }

    assert_eq!(client.feed_count().await, 0);
    assert!(eventually(|| async { server.store.listener_count().await == 0 }).await);
}

#[tokio::test]
async fn test_server_closing_ends_requests() {
    let server = TestServer::start().await;
    let client = server.connect().await;
    client.set("a", json!(1)).await.unwrap();
    let mut feed = client.subscribe("a").await.unwrap();
    assert_eq!(feed.next().await, Some(Some(json!(1))));

    let _ = server.shutdown.send(());
    server.handle.await.unwrap();

    // The feed ends once the closing notice is processed.
    let ended = tokio::time::timeout(Duration::from_secs(2), feed.next())
        .await
        .expect("feed did not end");
    assert_eq!(ended, None);
    assert!(matches!(client.get("a").await, Err(StoreError::Closed)));
}

#[tokio::test]
async fn test_connect_to_nothing_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = RemoteStore::connect(&format!("ws://{}", addr)).await;
    assert!(matches!(result, Err(StoreError::Connect(_))));
}

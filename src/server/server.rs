//! WebSocket server implementation.

use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::store::{KvStore, MemoryStore, StoreError};

/// Open connections, for the shutdown broadcast.
type Connections = Arc<Mutex<HashMap<SocketAddr, mpsc::UnboundedSender<ServerMessage>>>>;

/// Run the store server on `port` until Ctrl-C.
pub async fn run(port: u16, store: MemoryStore) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("store server listening on {}", addr);

    serve(listener, store, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("could not listen for Ctrl-C: {}", e);
        }
    })
    .await;

    Ok(())
}

/// Accept connections on `listener` until `shutdown` completes, then tell
/// every client the server is closing.
pub async fn serve<F>(listener: TcpListener, store: MemoryStore, shutdown: F)
where
    F: Future<Output = ()>,
{
    let connections: Connections = Arc::default();

    let accept_connections = Arc::clone(&connections);
    let acceptor = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let store = store.clone();
                    let connections = Arc::clone(&accept_connections);
                    tokio::spawn(handle_connection(stream, addr, store, connections));
                }
                Err(e) => {
                    tracing::error!("failed to accept connection: {}", e);
                }
            }
        }
    });

    shutdown.await;
    acceptor.abort();

    let connections = connections.lock().await;
    tracing::info!("shutting down, closing {} connection(s)", connections.len());
    for sender in connections.values() {
        let _ = sender.send(ServerMessage::ServerClosing);
    }
    drop(connections);

    // Let the closing notices flush.
    tokio::time::sleep(Duration::from_millis(100)).await;
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    store: MemoryStore,
    connections: Connections,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            tracing::warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    tracing::info!("client {} connected", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    connections.lock().await.insert(addr, tx.clone());

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("could not encode {:?}: {}", msg, e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(ServerMessage::ConnectionAck);

    let mut feeds: HashMap<u64, JoinHandle<()>> = HashMap::new();
    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!("ignoring malformed message from {}: {}", addr, e);
                continue;
            }
        };

        handle_client_message(&store, client_msg, &tx, &mut feeds).await;
    }

    for feed in feeds.values() {
        feed.abort();
    }
    connections.lock().await.remove(&addr);
    send_task.abort();
    tracing::info!("client {} disconnected", addr);
}

/// Handle a single client message.
async fn handle_client_message(
    store: &MemoryStore,
    msg: ClientMessage,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    feeds: &mut HashMap<u64, JoinHandle<()>>,
) {
    tracing::debug!("store request {:?}", msg);

    let reply = match msg {
        ClientMessage::Get { request_id, path } => {
            reply_to(request_id, store.get(&path).await, |value| {
                ServerMessage::Value { request_id, value }
            })
        }
        ClientMessage::Set {
            request_id,
            path,
            value,
        } => reply_to(request_id, store.set(&path, value).await, |()| {
            ServerMessage::Ack { request_id }
        }),
        ClientMessage::Push {
            request_id,
            path,
            value,
        } => reply_to(request_id, store.push(&path, value).await, |key| {
            ServerMessage::Pushed { request_id, key }
        }),
        ClientMessage::Subscribe { request_id, path } => match store.subscribe(&path).await {
            Ok(mut subscription) => {
                let _ = tx.send(ServerMessage::Subscribed { request_id });

                let feed_tx = tx.clone();
                let feed = tokio::spawn(async move {
                    while let Some(value) = subscription.next().await {
                        let changed = ServerMessage::Changed {
                            subscription_id: request_id,
                            value,
                        };
                        if feed_tx.send(changed).is_err() {
                            break;
                        }
                    }
                });
                if let Some(previous) = feeds.insert(request_id, feed) {
                    previous.abort();
                }
                return;
            }
            Err(e) => error_reply(request_id, e),
        },
        ClientMessage::Unsubscribe { subscription_id } => {
            if let Some(feed) = feeds.remove(&subscription_id) {
                feed.abort();
            }
            return;
        }
    };

    let _ = tx.send(reply);
}

fn reply_to<T>(
    request_id: u64,
    result: Result<T, StoreError>,
    ok: impl FnOnce(T) -> ServerMessage,
) -> ServerMessage {
    match result {
        Ok(value) => ok(value),
        Err(e) => error_reply(request_id, e),
    }
}

fn error_reply(request_id: u64, error: StoreError) -> ServerMessage {
    tracing::error!("store request {} failed: {}", request_id, error);
    ServerMessage::Error {
        request_id,
        reason: error.to_string(),
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::protocol::{ClientMessage, ServerMessage};

use super::{KvStore, StoreError, Subscription};

#[derive(Default)]
struct Routes {
    /// Replies awaited by request id.
    pending: HashMap<u64, oneshot::Sender<ServerMessage>>,
    /// Subscription feeds by subscription id.
    feeds: HashMap<u64, mpsc::UnboundedSender<Option<Value>>>,
    closed: bool,
}

impl Routes {
    /// Forgets feeds whose subscription has been dropped.
    fn prune_feeds(&mut self) {
        self.feeds.retain(|_, feed| !feed.is_closed());
    }
}

/// Client of a store hosted by `buddy-quiz serve`.
pub struct RemoteStore {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    routes: Arc<Mutex<Routes>>,
    next_id: AtomicU64,
    tasks: Vec<JoinHandle<()>>,
}

impl RemoteStore {
    /// Connects to a `ws://host:port` store server.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| StoreError::Connect(format!("{}: {}", url, e)))?;
        tracing::info!("connected to store at {}", url);

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (outgoing, mut rx) = mpsc::unbounded_channel::<ClientMessage>();
        let routes = Arc::new(Mutex::new(Routes::default()));

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

        let recv_routes = Arc::clone(&routes);
        let recv_task = tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text.to_string(),
                    Ok(Message::Close(_)) => break,
                    Err(e) => {
                        tracing::warn!("store connection error: {}", e);
                        break;
                    }
                    _ => continue,
                };

                let server_msg: ServerMessage = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!("ignoring malformed store message: {}", e);
                        continue;
                    }
                };

                if matches!(server_msg, ServerMessage::ServerClosing) {
                    tracing::info!("store server is shutting down");
                    break;
                }
                dispatch(&recv_routes, server_msg).await;
            }

            // Wake every waiter and end every feed.
            let mut routes = recv_routes.lock().await;
            routes.closed = true;
            routes.pending.clear();
            routes.feeds.clear();
        });

        Ok(Self {
            outgoing,
            routes,
            next_id: AtomicU64::new(1),
            tasks: vec![send_task, recv_task],
        })
    }

    /// Number of live subscription feeds on this connection.
    pub async fn feed_count(&self) -> usize {
        let mut routes = self.routes.lock().await;
        routes.prune_feeds();
        routes.feeds.len()
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn request(
        &self,
        request_id: u64,
        msg: ClientMessage,
    ) -> Result<ServerMessage, StoreError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut routes = self.routes.lock().await;
            if routes.closed {
                return Err(StoreError::Closed);
            }
            routes.pending.insert(request_id, tx);
        }

        tracing::debug!("store request {:?}", msg);
        self.outgoing.send(msg).map_err(|_| StoreError::Closed)?;

        match rx.await.map_err(|_| StoreError::Closed)? {
            ServerMessage::Error { reason, .. } => Err(StoreError::Server(reason)),
            reply => Ok(reply),
        }
    }
}

async fn dispatch(routes: &Mutex<Routes>, msg: ServerMessage) {
    let mut routes = routes.lock().await;
    routes.prune_feeds();

    if let ServerMessage::Changed {
        subscription_id,
        value,
    } = msg
    {
        let delivered = routes
            .feeds
            .get(&subscription_id)
            .is_some_and(|feed| feed.send(value).is_ok());
        if !delivered {
            routes.feeds.remove(&subscription_id);
        }
        return;
    }

    match msg.request_id() {
        Some(id) => {
            if let Some(waiter) = routes.pending.remove(&id) {
                let _ = waiter.send(msg);
            }
        }
        None => tracing::debug!("unsolicited store message {:?}", msg),
    }
}

impl KvStore for RemoteStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let request_id = self.next_request_id();
        let msg = ClientMessage::Get {
            request_id,
            path: path.to_string(),
        };
        match self.request(request_id, msg).await? {
            ServerMessage::Value { value, .. } => Ok(value),
            other => Err(StoreError::Protocol(format!("{:?}", other))),
        }
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let request_id = self.next_request_id();
        let msg = ClientMessage::Set {
            request_id,
            path: path.to_string(),
            value,
        };
        match self.request(request_id, msg).await? {
            ServerMessage::Ack { .. } => Ok(()),
            other => Err(StoreError::Protocol(format!("{:?}", other))),
        }
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let request_id = self.next_request_id();
        let msg = ClientMessage::Push {
            request_id,
            path: path.to_string(),
            value,
        };
        match self.request(request_id, msg).await? {
            ServerMessage::Pushed { key, .. } => Ok(key),
            other => Err(StoreError::Protocol(format!("{:?}", other))),
        }
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let request_id = self.next_request_id();
        let (feed, receiver) = mpsc::unbounded_channel();

        // Register the feed first so no early `Changed` is lost.
        {
            let mut routes = self.routes.lock().await;
            routes.prune_feeds();
            routes.feeds.insert(request_id, feed);
        }

        let msg = ClientMessage::Subscribe {
            request_id,
            path: path.to_string(),
        };
        match self.request(request_id, msg).await {
            Ok(ServerMessage::Subscribed { .. }) => {}
            Ok(other) => {
                self.routes.lock().await.feeds.remove(&request_id);
                return Err(StoreError::Protocol(format!("{:?}", other)));
            }
            Err(e) => {
                self.routes.lock().await.feeds.remove(&request_id);
                return Err(e);
            }
        }

        let outgoing = self.outgoing.clone();
        Ok(
            Subscription::new(path.to_string(), receiver).on_cancel(move || {
                let _ = outgoing.send(ClientMessage::Unsubscribe {
                    subscription_id: request_id,
                });
            }),
        )
    }
}

impl Drop for RemoteStore {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

//! Shared realtime key-value store.
//!
//! Quizzes and scores live in a JSON tree addressed by `/`-separated paths.
//! The app only talks to it through [`KvStore`]; [`MemoryStore`] keeps the
//! tree in process and [`RemoteStore`] reaches one hosted by `buddy-quiz
//! serve`.

mod memory;
mod remote;
mod tree;

use std::fmt;
use std::future::Future;

use serde_json::{json, Value};
use tokio::sync::mpsc::{self, error::TryRecvError};

pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use tree::{is_related, segments, Tree};

/// Placeholder that the store replaces with its own clock (milliseconds since
/// the epoch) when the value is written.
pub fn server_timestamp() -> Value {
    json!({ ".sv": "timestamp" })
}

/// Error talking to the store.
#[derive(Debug)]
pub enum StoreError {
    /// Could not reach the server.
    Connect(String),
    /// The connection went away before a reply arrived.
    Closed,
    /// The server refused the request.
    Server(String),
    /// The server replied with something unexpected.
    Protocol(String),
    /// A stored document did not have the expected shape.
    Decode(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connect(e) => write!(f, "could not connect to store: {}", e),
            StoreError::Closed => write!(f, "store connection closed"),
            StoreError::Server(reason) => write!(f, "store rejected request: {}", reason),
            StoreError::Protocol(e) => write!(f, "unexpected store reply: {}", e),
            StoreError::Decode(e) => write!(f, "malformed stored document: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err)
    }
}

/// Operations the app needs from the shared store.
pub trait KvStore: Send + Sync {
    /// Reads the value at `path` once. Missing paths read as `None`.
    fn get(&self, path: &str) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Replaces the value at `path`; `null` removes it.
    fn set(&self, path: &str, value: Value) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Stores `value` under a fresh, time-ordered child key of `path` and
    /// returns that key.
    fn push(&self, path: &str, value: Value)
    -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Watches `path`. The current value arrives first, then one update per
    /// write touching the path.
    fn subscribe(&self, path: &str)
    -> impl Future<Output = Result<Subscription, StoreError>> + Send;
}

/// Stream of values for one watched path.
///
/// Dropping the subscription cancels it.
pub struct Subscription {
    path: String,
    rx: mpsc::UnboundedReceiver<Option<Value>>,
    on_cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(path: String, rx: mpsc::UnboundedReceiver<Option<Value>>) -> Self {
        Self {
            path,
            rx,
            on_cancel: None,
        }
    }

    pub(crate) fn on_cancel(mut self, cancel: impl FnOnce() + Send + 'static) -> Self {
        self.on_cancel = Some(Box::new(cancel));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Waits for the next value. `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Option<Value>> {
        self.rx.recv().await
    }

    /// The most recent value delivered since the last call, without waiting.
    pub fn latest(&mut self) -> Option<Option<Value>> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(value) => latest = Some(value),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("path", &self.path).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.on_cancel.take() {
            cancel();
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

use super::{is_related, KvStore, StoreError, Subscription, Tree};

struct Listener {
    path: String,
    sender: mpsc::UnboundedSender<Option<Value>>,
}

#[derive(Default)]
struct Inner {
    tree: Tree,
    listeners: Vec<Listener>,
    snapshot: Option<PathBuf>,
}

impl Inner {
    /// Pushes the new value of every watched path touched by a write to
    /// `path`, forgetting listeners whose subscription is gone.
    fn notify(&mut self, path: &str) {
        let tree = &self.tree;
        self.listeners.retain(|listener| {
            if !is_related(&listener.path, path) {
                return !listener.sender.is_closed();
            }
            listener.sender.send(tree.get(&listener.path)).is_ok()
        });
    }

    fn save_snapshot(&self) {
        let Some(path) = &self.snapshot else {
            return;
        };

        let result = serde_json::to_string(self.tree.as_value())
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            tracing::error!("could not write snapshot {}: {}", path.display(), e);
        }
    }
}

/// Store whose tree lives in this process. Cloning shares the tree.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(tree: Tree) -> Self {
        let inner = Inner {
            tree,
            ..Inner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// A store backed by a JSON snapshot file, loaded now and rewritten after
    /// every change. A missing file starts an empty tree.
    pub fn with_snapshot<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tree = match fs::read_to_string(&path) {
            Ok(content) => Tree::from_value(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tree::default(),
            Err(e) => return Err(StoreError::Server(format!("{}: {}", path.display(), e))),
        };

        let inner = Inner {
            tree,
            listeners: Vec::new(),
            snapshot: Some(path),
        };
        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Number of live subscriptions.
    pub async fn listener_count(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner.listeners.retain(|l| !l.sender.is_closed());
        inner.listeners.len()
    }
}

impl KvStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.inner.lock().await.tree.get(path))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.tree.set(path, value);
        inner.notify(path);
        inner.save_snapshot();
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().await;
        let key = inner.tree.push(path, value);
        inner.notify(&format!("{}/{}", path, key));
        inner.save_snapshot();
        Ok(key)
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().await;

        // Current value first, like every later update.
        let _ = sender.send(inner.tree.get(path));
        inner.listeners.retain(|l| !l.sender.is_closed());
        inner.listeners.push(Listener {
            path: path.to_string(),
            sender,
        });

        Ok(Subscription::new(path.to_string(), receiver))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_subscription_sees_initial_and_child_writes() {
        let store = MemoryStore::new();
        let mut scores = store.subscribe("quizzes/Q1/scores").await.unwrap();
        assert_eq!(scores.next().await, Some(None));

        let key = store
            .push("quizzes/Q1/scores", json!({ "score": 2 }))
            .await
            .unwrap();
        let update = scores.next().await.unwrap().unwrap();
        assert_eq!(update[&key]["score"], 2);
    }

    #[tokio::test]
    async fn test_unrelated_writes_are_not_delivered() {
        let store = MemoryStore::new();
        let mut scores = store.subscribe("quizzes/Q1/scores").await.unwrap();
        let _ = scores.latest();

        store.set("quizzes/Q2", json!({ "creatorName": "x" })).await.unwrap();
        assert_eq!(scores.latest(), None);

        store.set("quizzes/Q1", json!({ "creatorName": "y" })).await.unwrap();
        assert_eq!(scores.latest(), Some(None));
    }

    #[tokio::test]
    async fn test_dropped_subscriptions_are_pruned() {
        let store = MemoryStore::new();
        let first = store.subscribe("a").await.unwrap();
        let _second = store.subscribe("b").await.unwrap();
        assert_eq!(store.listener_count().await, 2);

        drop(first);
        assert_eq!(store.listener_count().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "buddy_quiz_snapshot_{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let store = MemoryStore::with_snapshot(&path).unwrap();
        store.set("quizzes/Q1/creatorName", json!("Sam")).await.unwrap();

        let reopened = MemoryStore::with_snapshot(&path).unwrap();
        assert_eq!(
            reopened.get("quizzes/Q1/creatorName").await.unwrap(),
            Some(json!("Sam"))
        );
        let _ = fs::remove_file(&path);
    }
}

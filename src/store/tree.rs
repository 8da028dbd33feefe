use chrono::Utc;
use serde_json::{Map, Value};

/// Non-empty segments of a `/`-separated path.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether a write to one path can change the value seen at the other, i.e.
/// one is a prefix of the other.
pub fn is_related(a: &str, b: &str) -> bool {
    let a = segments(a);
    let b = segments(b);
    a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// The JSON document behind a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    root: Value,
}

impl Tree {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.get(segment)?;
        }
        (!node.is_null()).then(|| node.clone())
    }

    pub fn set(&mut self, path: &str, mut value: Value) {
        resolve_server_values(&mut value, Utc::now().timestamp_millis());

        let segments = segments(path);
        let Some((last, parents)) = segments.split_last() else {
            self.root = value;
            return;
        };

        if value.is_null() {
            self.remove(parents, last);
            return;
        }

        let mut node = &mut self.root;
        for segment in parents {
            node = object_mut(node)
                .entry(segment.to_string())
                .or_insert(Value::Null);
        }
        object_mut(node).insert(last.to_string(), value);
    }

    /// Stores `value` under a new child of `path` and returns the child key.
    ///
    /// Keys are UUIDv7 strings, so they sort by creation time.
    pub fn push(&mut self, path: &str, value: Value) -> String {
        let key = uuid::Uuid::now_v7().simple().to_string();
        let child = format!("{}/{}", path.trim_end_matches('/'), key);
        self.set(&child, value);
        key
    }

    fn remove(&mut self, parents: &[&str], last: &str) {
        let mut node = &mut self.root;
        for segment in parents {
            match node.get_mut(*segment) {
                Some(child) => node = child,
                None => return,
            }
        }
        if let Value::Object(children) = node {
            children.remove(last);
        }
    }
}

fn object_mut(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(children) => children,
        _ => unreachable!("node was just made an object"),
    }
}

fn is_timestamp_placeholder(value: &Value) -> bool {
    match value {
        Value::Object(children) => {
            children.len() == 1 && children.get(".sv").and_then(Value::as_str) == Some("timestamp")
        }
        _ => false,
    }
}

fn resolve_server_values(value: &mut Value, now_ms: i64) {
    if is_timestamp_placeholder(value) {
        *value = Value::from(now_ms);
        return;
    }

    match value {
        Value::Object(children) => {
            for child in children.values_mut() {
                resolve_server_values(child, now_ms);
            }
        }
        Value::Array(items) => {
            for item in items {
                resolve_server_values(item, now_ms);
            }
        }
        _ => {}
    }
}

//! Protocol messages for the realtime store.
//!
//! All messages are serialized as JSON text frames over WebSocket.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Read a path once.
    Get { request_id: u64, path: String },

    /// Replace the value at a path.
    Set {
        request_id: u64,
        path: String,
        value: Value,
    },

    /// Append a child with a generated key.
    Push {
        request_id: u64,
        path: String,
        value: Value,
    },

    /// Watch a path. The request id doubles as the subscription id.
    Subscribe { request_id: u64, path: String },

    /// Stop watching.
    Unsubscribe { subscription_id: u64 },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Connection accepted.
    ConnectionAck,

    /// Reply to `Get`. `None` when nothing is stored there.
    Value {
        request_id: u64,
        value: Option<Value>,
    },

    /// Reply to `Set`.
    Ack { request_id: u64 },

    /// Reply to `Push` with the generated key.
    Pushed { request_id: u64, key: String },

    /// Reply to `Subscribe`. Values follow as `Changed`.
    Subscribed { request_id: u64 },

    /// New value of a watched path.
    Changed {
        subscription_id: u64,
        value: Option<Value>,
    },

    /// A request failed.
    Error { request_id: u64, reason: String },

    /// Server is shutting down.
    ServerClosing,
}

impl ServerMessage {
    /// The request this message answers, if it is a reply.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ServerMessage::Value { request_id, .. }
            | ServerMessage::Ack { request_id }
            | ServerMessage::Pushed { request_id, .. }
            | ServerMessage::Subscribed { request_id }
            | ServerMessage::Error { request_id, .. } => Some(*request_id),
            _ => None,
        }
    }
}

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;

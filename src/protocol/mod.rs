//! Wire protocol between the store server and its clients.

mod messages;

pub use messages::{ClientMessage, ServerMessage, DEFAULT_PORT};

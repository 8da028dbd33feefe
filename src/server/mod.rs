//! Realtime store server.
//!
//! Hosts a [`MemoryStore`](crate::store::MemoryStore) over WebSocket so that
//! creators and takers on different machines share quizzes and scores.

mod server;

pub use server::{run, serve};

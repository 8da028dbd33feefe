//! # buddy-quiz
//!
//! A "how well do you know your friend" quiz for the terminal.
//!
//! A creator answers fifteen questions about themselves; their answers are
//! stored as the key of a new quiz and they get a share link. Friends open the
//! link, answer the same questions and land on a live scoreboard.
//!
//! Quizzes and scores live in a shared realtime store hosted by
//! `buddy-quiz serve`; each machine also remembers its own results and
//! created quizzes in a local data directory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use buddy_quiz::config::ClientConfig;
//! use buddy_quiz::router::NavContext;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), buddy_quiz::QuizError> {
//!     let config = ClientConfig {
//!         server_url: "ws://127.0.0.1:8712".to_string(),
//!         data_dir: ".buddy-quiz".into(),
//!         share_base: "buddy-quiz://play".to_string(),
//!         questions: None,
//!         nav: NavContext::default(),
//!     };
//!     buddy_quiz::client::run(config).await
//! }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod data;
pub mod models;
pub mod protocol;
pub mod quizzes;
pub mod router;
pub mod server;
pub mod session;
pub mod storage;
pub mod store;
pub mod terminal;
mod ui;

use std::io;

pub use app::{App, View};
pub use data::{builtin_questions, load_questions_from_json, LoadError};
pub use models::{Question, QuizRecord, ScoreRecord};
pub use storage::{LocalError, LocalStore};
pub use store::{KvStore, MemoryStore, RemoteStore, StoreError};

/// Error type for quiz operations.
#[derive(Debug)]
pub enum QuizError {
    /// Error loading questions from file.
    Load(LoadError),
    /// IO error during quiz execution.
    Io(io::Error),
    /// The shared store failed.
    Store(StoreError),
    /// The local data directory could not be used.
    Local(LocalError),
}

impl std::fmt::Display for QuizError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizError::Load(e) => write!(f, "Failed to load questions: {}", e),
            QuizError::Io(e) => write!(f, "IO error: {}", e),
            QuizError::Store(e) => write!(f, "Store error: {}", e),
            QuizError::Local(e) => write!(f, "Local data error: {}", e),
        }
    }
}

impl std::error::Error for QuizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuizError::Load(e) => Some(e),
            QuizError::Io(e) => Some(e),
            QuizError::Store(e) => Some(e),
            QuizError::Local(e) => Some(e),
        }
    }
}

impl From<LoadError> for QuizError {
    fn from(err: LoadError) -> Self {
        QuizError::Load(err)
    }
}

impl From<io::Error> for QuizError {
    fn from(err: io::Error) -> Self {
        QuizError::Io(err)
    }
}

impl From<StoreError> for QuizError {
    fn from(err: StoreError) -> Self {
        QuizError::Store(err)
    }
}

impl From<LocalError> for QuizError {
    fn from(err: LocalError) -> Self {
        QuizError::Local(err)
    }
}

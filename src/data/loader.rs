use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::Question;

const BUILTIN_BANK: &str = include_str!("questions.json");

/// Error loading a question bank.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse { origin: String, source: serde_json::Error },
    Empty { origin: String },
    NoOptions { origin: String, question: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse { origin, source } => {
                write!(f, "failed to parse {}: {}", origin, source)
            }
            LoadError::Empty { origin } => {
                write!(f, "{} must contain at least one question", origin)
            }
            LoadError::NoOptions { origin, question } => {
                write!(f, "{}: question {:?} has no options", origin, question)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The question bank compiled into the binary.
pub fn builtin_questions() -> Result<Vec<Question>, LoadError> {
    parse_questions(BUILTIN_BANK, "built-in question bank")
}

/// Load a question bank from a JSON array of `{question, options}` objects.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_questions(&json_content, &path.display().to_string())
}

fn parse_questions(json_content: &str, origin: &str) -> Result<Vec<Question>, LoadError> {
    let questions: Vec<Question> =
        serde_json::from_str(json_content).map_err(|source| LoadError::Parse {
            origin: origin.to_string(),
            source,
        })?;

    if questions.is_empty() {
        return Err(LoadError::Empty {
            origin: origin.to_string(),
        });
    }

    if let Some(question) = questions.iter().find(|q| q.options.is_empty()) {
        return Err(LoadError::NoOptions {
            origin: origin.to_string(),
            question: question.text.clone(),
        });
    }

    Ok(questions)
}

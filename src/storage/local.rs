//! Durable per-user records kept on this machine.
//!
//! Each record lives in its own JSON file and is always read and written as a
//! whole document.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const FINAL_RESULT_FILE: &str = "finalQuizResult.json";
const LAST_CREATED_FILE: &str = "lastCreatedQuiz.json";
const MY_QUIZZES_FILE: &str = "myCreatedQuizzes.json";
const RECENT_RESULTS_FILE: &str = "buddyzResults.json";

/// Which side of a quiz a saved result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Creator,
    Taker,
}

/// The last result this machine produced as a taker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub role: ParticipantRole,
    pub quiz_id: String,
    pub creator_name: String,
    pub friend_name: String,
    pub score: usize,
    pub total_questions: usize,
    pub timestamp: DateTime<Utc>,
}

/// A quiz authored on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedQuiz {
    pub quiz_id: String,
    pub creator_name: String,
}

/// An entry of the running list of taker results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResult {
    pub quiz_id: String,
    pub creator_name: String,
    pub friend_name: String,
    pub score: usize,
    pub total_questions: usize,
    pub date: DateTime<Utc>,
}

/// Day bucket of the recent results list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentGroup {
    Today,
    Yesterday,
    Older,
}

impl RecentGroup {
    pub fn title(&self) -> &'static str {
        match self {
            RecentGroup::Today => "Today",
            RecentGroup::Yesterday => "Yesterday",
            RecentGroup::Older => "Older",
        }
    }
}

/// Split recent results into Today / Yesterday / Older, keeping list order
/// inside each bucket and dropping empty buckets.
pub fn group_recent(
    results: &[RecentResult],
    today: NaiveDate,
) -> Vec<(RecentGroup, Vec<RecentResult>)> {
    let yesterday = today.pred_opt();
    let bucket_of = |result: &RecentResult| {
        let day = result.date.date_naive();
        if day == today {
            RecentGroup::Today
        } else if Some(day) == yesterday {
            RecentGroup::Yesterday
        } else {
            RecentGroup::Older
        }
    };

    [RecentGroup::Today, RecentGroup::Yesterday, RecentGroup::Older]
        .into_iter()
        .filter_map(|group| {
            let entries: Vec<RecentResult> = results
                .iter()
                .filter(|r| bucket_of(r) == group)
                .cloned()
                .collect();
            (!entries.is_empty()).then_some((group, entries))
        })
        .collect()
}

/// Error reading or writing a local record.
#[derive(Debug)]
pub enum LocalError {
    Io { path: PathBuf, source: io::Error },
    Encode { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for LocalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            LocalError::Encode { path, source } => {
                write!(f, "could not encode {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LocalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocalError::Io { source, .. } => Some(source),
            LocalError::Encode { source, .. } => Some(source),
        }
    }
}

/// Snapshot of everything the view router needs from local storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedState {
    pub final_result: Option<FinalResult>,
    pub last_created: Option<CreatedQuiz>,
    pub my_quizzes: Vec<CreatedQuiz>,
}

/// File-backed local storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LocalError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| LocalError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn saved_state(&self) -> SavedState {
        SavedState {
            final_result: self.final_result(),
            last_created: self.last_created(),
            my_quizzes: self.my_quizzes(),
        }
    }

    pub fn final_result(&self) -> Option<FinalResult> {
        self.read(FINAL_RESULT_FILE)
    }

    pub fn set_final_result(&self, result: &FinalResult) -> Result<(), LocalError> {
        self.write(FINAL_RESULT_FILE, result)
    }

    pub fn last_created(&self) -> Option<CreatedQuiz> {
        self.read(LAST_CREATED_FILE)
    }

    pub fn set_last_created(&self, quiz: &CreatedQuiz) -> Result<(), LocalError> {
        self.write(LAST_CREATED_FILE, quiz)
    }

    /// Quizzes authored here, newest first. Anything that is not a list reads
    /// as empty.
    pub fn my_quizzes(&self) -> Vec<CreatedQuiz> {
        self.read(MY_QUIZZES_FILE).unwrap_or_default()
    }

    pub fn add_created_quiz(&self, quiz: CreatedQuiz) -> Result<(), LocalError> {
        let mut quizzes = self.my_quizzes();
        quizzes.insert(0, quiz);
        self.write(MY_QUIZZES_FILE, &quizzes)
    }

    /// Taker results produced here, newest first.
    pub fn recent_results(&self) -> Vec<RecentResult> {
        self.read(RECENT_RESULTS_FILE).unwrap_or_default()
    }

    pub fn add_recent_result(&self, result: RecentResult) -> Result<(), LocalError> {
        let mut results = self.recent_results();
        results.insert(0, result);
        self.write(RECENT_RESULTS_FILE, &results)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.path(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("could not read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("ignoring unreadable record {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), LocalError> {
        let path = self.path(name);
        let json = serde_json::to_string_pretty(value).map_err(|source| LocalError::Encode {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| LocalError::Io { path, source })
    }
}

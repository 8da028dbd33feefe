use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Question;

/// Path of a whole quiz document in the shared store.
pub fn quiz_path(quiz_id: &str) -> String {
    format!("quizzes/{}", quiz_id)
}

/// Path of the append-only score list of a quiz.
pub fn scores_path(quiz_id: &str) -> String {
    format!("quizzes/{}/scores", quiz_id)
}

/// A sealed quiz as stored under `quizzes/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub creator_name: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub scores: BTreeMap<String, ScoreRecord>,
}

impl QuizRecord {
    pub fn new(creator_name: String, questions: Vec<Question>) -> Self {
        Self {
            creator_name,
            questions,
            scores: BTreeMap::new(),
        }
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Scores ordered for display, best first.
    pub fn ranked_scores(&self) -> Vec<ScoreRecord> {
        rank_scores(self.scores.values().cloned().collect())
    }
}

/// One taker's result, pushed under `quizzes/{id}/scores`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    #[serde(default)]
    pub friend_name: Option<String>,
    #[serde(default)]
    pub score: usize,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl ScoreRecord {
    /// The document a taker pushes on submit. The timestamp is filled in by
    /// the store.
    pub fn entry(friend_name: &str, score: usize) -> Value {
        json!({
            "friendName": friend_name,
            "score": score,
            "timestamp": crate::store::server_timestamp(),
        })
    }

    pub fn display_name(&self) -> &str {
        match self.friend_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Anonymous",
        }
    }
}

/// Sort scores non-increasing by score. Ties keep their incoming order.
pub fn rank_scores(mut scores: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores
}

/// Decode the value of a `scores` path. Malformed children are skipped.
pub fn scores_from_value(value: Option<&Value>) -> Vec<ScoreRecord> {
    let Some(Value::Object(children)) = value else {
        return Vec::new();
    };

    children
        .values()
        .filter_map(|child| serde_json::from_value(child.clone()).ok())
        .collect()
}

/// Number of takers recorded under a `scores` path.
pub fn takers_from_value(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Object(children)) => children.len(),
        _ => 0,
    }
}

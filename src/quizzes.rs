//! Typed access to quiz documents in the shared store.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::models::{quiz_path, scores_path, Question, QuizRecord, ScoreRecord};
use crate::store::{KvStore, StoreError};

/// Length of generated quiz identifiers.
pub const QUIZ_ID_LENGTH: usize = 8;

/// Attempts at finding an unused identifier before giving up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Random identifier of [`QUIZ_ID_LENGTH`] characters from `[A-Za-z0-9]`.
pub fn generate_quiz_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(QUIZ_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Loads a quiz. `None` if no quiz has that identifier.
pub async fn fetch_quiz<S: KvStore>(
    store: &S,
    quiz_id: &str,
) -> Result<Option<QuizRecord>, StoreError> {
    match store.get(&quiz_path(quiz_id)).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Stores a sealed quiz under a fresh identifier and returns it.
///
/// Identifiers already in use are skipped.
pub async fn publish_quiz<S: KvStore, R: Rng + ?Sized>(
    store: &S,
    rng: &mut R,
    creator_name: &str,
    questions: Vec<Question>,
) -> Result<String, StoreError> {
    let quiz = QuizRecord::new(creator_name.to_string(), questions);
    let document = serde_json::to_value(&quiz)?;

    for _ in 0..MAX_ID_ATTEMPTS {
        let quiz_id = generate_quiz_id(rng);
        if store.get(&quiz_path(&quiz_id)).await?.is_some() {
            tracing::warn!("quiz id {} already taken, drawing another", quiz_id);
            continue;
        }

        store.set(&quiz_path(&quiz_id), document).await?;
        tracing::info!(
            "published quiz {} by {} with {} questions",
            quiz_id,
            creator_name,
            quiz.total_questions()
        );
        return Ok(quiz_id);
    }

    Err(StoreError::Server(format!(
        "no free quiz id after {} attempts",
        MAX_ID_ATTEMPTS
    )))
}

/// Appends a taker's score to a quiz's scoreboard.
pub async fn record_score<S: KvStore>(
    store: &S,
    quiz_id: &str,
    friend_name: &str,
    score: usize,
) -> Result<String, StoreError> {
    let key = store
        .push(&scores_path(quiz_id), ScoreRecord::entry(friend_name, score))
        .await?;
    tracing::info!("{} scored {} on quiz {}", friend_name, score, quiz_id);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_generated_ids_are_alphanumeric() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let id = generate_quiz_id(&mut rng);
            assert_eq!(id.len(), QUIZ_ID_LENGTH);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[tokio::test]
    async fn test_publish_skips_taken_ids() {
        let store = MemoryStore::new();
        let taken = generate_quiz_id(&mut StdRng::seed_from_u64(11));
        store
            .set(&quiz_path(&taken), json!({ "creatorName": "first" }))
            .await
            .unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        let quiz_id = publish_quiz(&store, &mut rng, "second", vec![Question::new("q", &["a"])])
            .await
            .unwrap();

        assert_ne!(quiz_id, taken);
        let first = fetch_quiz(&store, &taken).await.unwrap().unwrap();
        assert_eq!(first.creator_name, "first");
        let second = fetch_quiz(&store, &quiz_id).await.unwrap().unwrap();
        assert_eq!(second.creator_name, "second");
    }

    #[tokio::test]
    async fn test_fetch_missing_quiz() {
        let store = MemoryStore::new();
        assert_eq!(fetch_quiz(&store, "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_recorded_scores_get_server_time() {
        let store = MemoryStore::new();
        record_score(&store, "Q1", "Bo", 4).await.unwrap();

        let quiz = store.get("quizzes/Q1/scores").await.unwrap();
        let scores = crate::models::scores_from_value(quiz.as_ref());
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].display_name(), "Bo");
        assert!(scores[0].timestamp.is_some());
    }
}

mod question;
mod quiz;

pub use question::Question;
pub use quiz::{
    quiz_path, rank_scores, scores_from_value, scores_path, takers_from_value, QuizRecord,
    ScoreRecord,
};

use serde::{Deserialize, Serialize};

/// A multiple choice question, as stored in the bank and in sealed quizzes.
///
/// Bank questions carry no `correct_answer`; it is filled in when a creator
/// seals a quiz with their own answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, options: &[&str]) -> Self {
        Self {
            text: text.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: None,
        }
    }

    /// Whether `answer` matches the sealed answer key.
    ///
    /// Unsealed questions never match.
    pub fn is_answered_correctly(&self, answer: Option<&str>) -> bool {
        match (&self.correct_answer, answer) {
            (Some(key), Some(answer)) => key == answer,
            _ => false,
        }
    }

    /// Position of `option` among this question's options.
    pub fn option_index(&self, option: &str) -> Option<usize> {
        self.options.iter().position(|o| o == option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let mut question = Question::new("Pick one", &["A", "B"]);
        question.correct_answer = Some("B".to_string());

        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["question"], "Pick one");
        assert_eq!(json["correctAnswer"], "B");

        let unsealed = serde_json::to_value(Question::new("x", &["y"])).unwrap();
        assert!(unsealed.get("correctAnswer").is_none());
    }

    #[test]
    fn test_unsealed_question_never_correct() {
        let question = Question::new("Pick one", &["A", "B"]);
        assert!(!question.is_answered_correctly(Some("A")));
        assert!(!question.is_answered_correctly(None));
    }
}

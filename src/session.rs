//! Quiz session state machine.
//!
//! A [`QuizSession`] is a plain value. Every user action goes through
//! [`QuizSession::apply`], which consumes the session and hands back the next
//! one, so the whole flow can be driven without a terminal.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Question, QuizRecord};

/// Number of questions a creator answers.
pub const CREATOR_QUESTION_COUNT: usize = 15;

/// Who is answering, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Authoring a new quiz; their answers become the key.
    Creator { name: String },
    /// Answering an existing quiz for a score.
    Taker {
        name: String,
        quiz_id: String,
        creator_name: String,
    },
}

impl Role {
    pub fn participant_name(&self) -> &str {
        match self {
            Role::Creator { name } | Role::Taker { name, .. } => name,
        }
    }

    pub fn is_creator(&self) -> bool {
        matches!(self, Role::Creator { .. })
    }
}

/// A user action on an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Mark an option of the current question as the selection.
    Select(usize),
    Next,
    Previous,
    Submit,
}

/// Why an action left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Next or Submit without a selected option.
    NoSelection,
    /// Select with an index past the option list.
    NoSuchOption(usize),
    /// Previous on the first question.
    PreviousUnavailable,
    /// Submit before the last question.
    SubmitUnavailable,
}

impl Rejection {
    /// Message to show the participant, if this rejection warrants one.
    ///
    /// Actions on hidden controls are dropped silently.
    pub fn alert_message(&self) -> Option<&'static str> {
        match self {
            Rejection::NoSelection => Some("Please select an answer."),
            _ => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoSelection => write!(f, "no option selected"),
            Rejection::NoSuchOption(i) => write!(f, "no option at position {}", i),
            Rejection::PreviousUnavailable => write!(f, "already at the first question"),
            Rejection::SubmitUnavailable => {
                write!(f, "submit is only possible on the last question")
            }
        }
    }
}

/// Result of applying an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Still answering, possibly on another question.
    Answering(QuizSession),
    /// Nothing changed.
    Rejected {
        session: QuizSession,
        reason: Rejection,
    },
    /// Every answer is recorded; the session is ready to be persisted.
    Submitted(QuizSession),
}

/// Error starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Display name empty or whitespace only.
    EmptyName,
    /// Nothing to answer.
    NoQuestions,
    /// A question offers nothing to pick.
    NoOptions { question: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyName => write!(f, "Please enter your name."),
            SessionError::NoQuestions => write!(f, "This quiz has no questions."),
            SessionError::NoOptions { question } => {
                write!(f, "Question {:?} has no answers to choose from.", question)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Trims a display name, rejecting blank input.
pub fn validate_display_name(input: &str) -> Result<String, SessionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SessionError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Uniformly shuffles the bank and keeps the first `count` questions.
pub fn draw_questions<R: Rng + ?Sized>(
    bank: &[Question],
    count: usize,
    rng: &mut R,
) -> Vec<Question> {
    let mut drawn = bank.to_vec();
    drawn.shuffle(rng);
    drawn.truncate(count);
    drawn
}

/// Which navigation controls are on screen for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub previous: bool,
    pub next: bool,
    pub submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    role: Role,
    questions: Vec<Question>,
    index: usize,
    answers: Vec<Option<String>>,
    selected: Option<usize>,
}

impl QuizSession {
    fn new(role: Role, questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        if let Some(empty) = questions.iter().find(|q| q.options.is_empty()) {
            return Err(SessionError::NoOptions {
                question: empty.text.clone(),
            });
        }

        let answers = vec![None; questions.len()];
        Ok(Self {
            role,
            questions,
            index: 0,
            answers,
            selected: None,
        })
    }

    /// Start authoring a quiz from a random draw of the bank.
    pub fn for_creator<R: Rng + ?Sized>(
        name: &str,
        bank: &[Question],
        rng: &mut R,
    ) -> Result<Self, SessionError> {
        let name = validate_display_name(name)?;
        let questions = draw_questions(bank, CREATOR_QUESTION_COUNT, rng);
        Self::new(Role::Creator { name }, questions)
    }

    /// Start answering a stored quiz.
    pub fn for_taker(name: &str, quiz_id: &str, quiz: QuizRecord) -> Result<Self, SessionError> {
        let name = validate_display_name(name)?;
        let role = Role::Taker {
            name,
            quiz_id: quiz_id.to_string(),
            creator_name: quiz.creator_name,
        };
        Self::new(role, quiz.questions)
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.index]
    }

    /// Option currently marked on screen.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn is_last(&self) -> bool {
        self.index + 1 == self.questions.len()
    }

    pub fn controls(&self) -> Controls {
        Controls {
            previous: self.index > 0,
            next: !self.is_last(),
            submit: self.is_last(),
        }
    }

    pub fn apply(mut self, action: Action) -> Transition {
        match action {
            Action::Select(option) => {
                if option >= self.current_question().options.len() {
                    return self.reject(Rejection::NoSuchOption(option));
                }
                self.selected = Some(option);
                Transition::Answering(self)
            }
            Action::Next => {
                if let Err(reason) = self.record_selection() {
                    return self.reject(reason);
                }
                if !self.is_last() {
                    self.move_to(self.index + 1);
                }
                Transition::Answering(self)
            }
            Action::Previous => {
                if self.index == 0 {
                    return self.reject(Rejection::PreviousUnavailable);
                }
                self.move_to(self.index - 1);
                Transition::Answering(self)
            }
            Action::Submit => {
                if !self.is_last() {
                    return self.reject(Rejection::SubmitUnavailable);
                }
                if let Err(reason) = self.record_selection() {
                    return self.reject(reason);
                }
                Transition::Submitted(self)
            }
        }
    }

    fn reject(self, reason: Rejection) -> Transition {
        Transition::Rejected {
            session: self,
            reason,
        }
    }

    fn record_selection(&mut self) -> Result<(), Rejection> {
        let option = self.selected.ok_or(Rejection::NoSelection)?;
        let value = self.questions[self.index].options[option].clone();
        self.answers[self.index] = Some(value);
        Ok(())
    }

    fn move_to(&mut self, index: usize) {
        self.index = index;
        self.selected = self.answers[index]
            .as_deref()
            .and_then(|answer| self.questions[index].option_index(answer));
    }

    /// Number of answers matching the sealed key.
    pub fn score(&self) -> usize {
        self.answers
            .iter()
            .zip(self.questions.iter())
            .filter(|(answer, question)| question.is_answered_correctly(answer.as_deref()))
            .count()
    }

    /// The questions with the participant's answers written in as the key.
    pub fn sealed_questions(&self) -> Vec<Question> {
        self.questions
            .iter()
            .zip(self.answers.iter())
            .map(|(question, answer)| Question {
                correct_answer: answer.clone(),
                ..question.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn bank(size: usize) -> Vec<Question> {
        (0..size)
            .map(|i| Question::new(format!("Question {}", i), &["A", "B", "C", "X"]))
            .collect()
    }

    fn sealed(keys: &[&str]) -> QuizRecord {
        let questions = keys
            .iter()
            .enumerate()
            .map(|(i, key)| Question {
                correct_answer: Some(key.to_string()),
                ..Question::new(format!("Q{}", i), &["A", "B", "C", "X"])
            })
            .collect();
        QuizRecord::new("Sam".to_string(), questions)
    }

    fn answering(transition: Transition) -> QuizSession {
        match transition {
            Transition::Answering(session) => session,
            other => panic!("expected Answering, got {:?}", other),
        }
    }

    fn answer_all(mut session: QuizSession, picks: &[usize]) -> QuizSession {
        for (i, pick) in picks.iter().enumerate() {
            session = answering(session.apply(Action::Select(*pick)));
            if i + 1 < picks.len() {
                session = answering(session.apply(Action::Next));
            }
        }
        match session.apply(Action::Submit) {
            Transition::Submitted(session) => session,
            other => panic!("expected Submitted, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            QuizSession::for_creator("   ", &bank(20), &mut rng),
            Err(SessionError::EmptyName)
        );
        assert_eq!(validate_display_name("  Ann "), Ok("Ann".to_string()));
    }

    #[test]
    fn test_creator_draw_takes_fifteen_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let bank = bank(40);
        let session = QuizSession::for_creator("Ann", &bank, &mut rng).unwrap();

        assert_eq!(session.total(), CREATOR_QUESTION_COUNT);
        let texts: HashSet<&str> = session.questions().iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts.len(), CREATOR_QUESTION_COUNT);
        assert!(session.questions().iter().all(|q| bank.contains(q)));
    }

    #[test]
    fn test_creator_draw_with_small_bank_takes_everything() {
        let mut rng = StdRng::seed_from_u64(7);
        let session = QuizSession::for_creator("Ann", &bank(4), &mut rng).unwrap();
        assert_eq!(session.total(), 4);
    }

    #[test]
    fn test_next_without_selection_is_rejected() {
        let session = QuizSession::for_taker("Bo", "Q1", sealed(&["A", "B"])).unwrap();
        match session.clone().apply(Action::Next) {
            Transition::Rejected { session: after, reason } => {
                assert_eq!(reason, Rejection::NoSelection);
                assert_eq!(reason.alert_message(), Some("Please select an answer."));
                assert_eq!(after, session);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_previous_restores_selection_without_touching_answers() {
        let session = QuizSession::for_taker("Bo", "Q1", sealed(&["A", "B", "C"])).unwrap();
        let session = answering(session.apply(Action::Select(2)));
        let session = answering(session.apply(Action::Next));
        assert_eq!(session.index(), 1);
        assert_eq!(session.selected(), None);

        let session = answering(session.apply(Action::Select(1)));
        let session = answering(session.apply(Action::Previous));
        assert_eq!(session.index(), 0);
        assert_eq!(session.selected(), Some(2));
        assert_eq!(session.answers()[1], None);
    }

    #[test]
    fn test_visited_answers_survive_random_walks() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..8 {
            let keys = vec!["A"; n];
            let mut session = QuizSession::for_taker("Bo", "Q1", sealed(&keys)).unwrap();
            let mut expected: Vec<Option<String>> = vec![None; n];

            for _ in 0..200 {
                let index = session.index();
                if rng.gen_bool(0.5) {
                    let pick = rng.gen_range(0..4);
                    session = answering(session.apply(Action::Select(pick)));
                    session = answering(session.apply(Action::Next));
                    expected[index] = Some(["A", "B", "C", "X"][pick].to_string());
                } else if index > 0 {
                    session = answering(session.apply(Action::Previous));
                    if let Some(answer) = &expected[session.index()] {
                        let shown = session
                            .selected()
                            .map(|i| session.current_question().options[i].clone());
                        assert_eq!(shown.as_ref(), Some(answer));
                    }
                }
                assert_eq!(session.answers(), expected.as_slice());
            }
        }
    }

    #[test]
    fn test_controls_follow_position() {
        let session = QuizSession::for_taker("Bo", "Q1", sealed(&["A", "B", "C"])).unwrap();
        assert_eq!(
            session.controls(),
            Controls { previous: false, next: true, submit: false }
        );

        let session = answering(session.apply(Action::Select(0)));
        let session = answering(session.apply(Action::Next));
        assert_eq!(
            session.controls(),
            Controls { previous: true, next: true, submit: false }
        );

        let session = answering(session.apply(Action::Select(0)));
        let session = answering(session.apply(Action::Next));
        assert_eq!(
            session.controls(),
            Controls { previous: true, next: false, submit: true }
        );
    }

    #[test]
    fn test_single_question_submits_immediately() {
        let session = QuizSession::for_taker("Bo", "Q1", sealed(&["A"])).unwrap();
        assert_eq!(
            session.controls(),
            Controls { previous: false, next: false, submit: true }
        );
        let session = answer_all(session, &[0]);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_submit_before_last_question_is_unreachable() {
        let session = QuizSession::for_taker("Bo", "Q1", sealed(&["A", "B"])).unwrap();
        let session = answering(session.apply(Action::Select(0)));
        assert!(matches!(
            session.apply(Action::Submit),
            Transition::Rejected { reason: Rejection::SubmitUnavailable, .. }
        ));
    }

    #[test]
    fn test_creator_answers_become_the_key() {
        let mut rng = StdRng::seed_from_u64(3);
        let session = QuizSession::for_creator("Ann", &bank(3), &mut rng).unwrap();
        let session = answer_all(session, &[0, 1, 2]);

        let keys: Vec<Option<String>> = session
            .sealed_questions()
            .into_iter()
            .map(|q| q.correct_answer)
            .collect();
        assert_eq!(
            keys,
            vec![Some("A".to_string()), Some("B".to_string()), Some("C".to_string())]
        );
    }

    #[test]
    fn test_taker_score_counts_matches() {
        let session = QuizSession::for_taker("Bo", "Q1", sealed(&["A", "B", "C"])).unwrap();
        // A, X, C
        let session = answer_all(session, &[0, 3, 2]);
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn test_empty_quiz_cannot_start() {
        let quiz = QuizRecord::new("Sam".to_string(), Vec::new());
        assert_eq!(
            QuizSession::for_taker("Bo", "Q1", quiz),
            Err(SessionError::NoQuestions)
        );
    }

    #[test]
    fn test_question_without_options_cannot_start() {
        let questions = vec![
            Question::new("Q0", &["A", "B"]),
            Question::new("Q1", &[]),
        ];
        let quiz = QuizRecord::new("Sam".to_string(), questions);
        assert_eq!(
            QuizSession::for_taker("Bo", "Q1", quiz),
            Err(SessionError::NoOptions {
                question: "Q1".to_string()
            })
        );
    }
}

//! Initial screen selection and share links.

use crate::storage::{CreatedQuiz, FinalResult, ParticipantRole, SavedState};

/// View flag value that opens a quiz's scoreboard.
pub const SCOREBOARD_VIEW: &str = "scoreboard";

/// What the participant arrived with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavContext {
    pub quiz_id: Option<String>,
    pub view: Option<String>,
}

impl NavContext {
    pub fn new(quiz_id: Option<String>, view: Option<String>) -> Self {
        Self {
            quiz_id: quiz_id.filter(|id| !id.is_empty()),
            view: view.filter(|v| !v.is_empty()),
        }
    }

    /// Reads `id` and `view` from the query string of a share link.
    ///
    /// Unknown parameters are ignored; the last occurrence of a parameter wins.
    pub fn from_link(link: &str) -> Self {
        let query = link.split_once('?').map(|(_, q)| q).unwrap_or("");
        let query = query.split('#').next().unwrap_or("");

        let mut quiz_id = None;
        let mut view = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("id", value)) => quiz_id = Some(value.to_string()),
                Some(("view", value)) => view = Some(value.to_string()),
                _ => {}
            }
        }
        Self::new(quiz_id, view)
    }

    fn wants_scoreboard(&self) -> bool {
        self.view.as_deref() == Some(SCOREBOARD_VIEW)
    }
}

/// Screen chosen at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Scoreboard(String),
    Result(FinalResult),
    Take(String),
    Dashboard(Vec<CreatedQuiz>),
    /// Creator entry with the recently taken quizzes below it.
    Create,
}

/// Picks the initial screen. The first matching rule wins.
pub fn route(nav: &NavContext, saved: &SavedState) -> Route {
    let taker_result = saved
        .final_result
        .as_ref()
        .filter(|r| r.role == ParticipantRole::Taker);

    match (&nav.quiz_id, taker_result, &saved.last_created) {
        (Some(id), _, _) if nav.wants_scoreboard() => Route::Scoreboard(id.clone()),
        (Some(id), Some(result), _) if result.quiz_id == *id => Route::Result(result.clone()),
        (None, Some(result), _) => Route::Result(result.clone()),
        (None, None, Some(last)) => Route::Scoreboard(last.quiz_id.clone()),
        (Some(id), _, _) => Route::Take(id.clone()),
        (None, None, None) if !saved.my_quizzes.is_empty() => {
            Route::Dashboard(saved.my_quizzes.clone())
        }
        (None, None, None) => Route::Create,
    }
}

/// Link that opens a quiz for a new taker.
pub fn share_link(base: &str, quiz_id: &str) -> String {
    format!("{}?id={}", base, quiz_id)
}

/// Link that opens a quiz's scoreboard.
pub fn scoreboard_link(base: &str, quiz_id: &str) -> String {
    format!("{}?id={}&view={}", base, quiz_id, SCOREBOARD_VIEW)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn taker_result(quiz_id: &str) -> FinalResult {
        FinalResult {
            role: ParticipantRole::Taker,
            quiz_id: quiz_id.to_string(),
            creator_name: "Sam".to_string(),
            friend_name: "Bo".to_string(),
            score: 1,
            total_questions: 2,
            timestamp: Utc::now(),
        }
    }

    fn created(quiz_id: &str) -> CreatedQuiz {
        CreatedQuiz {
            quiz_id: quiz_id.to_string(),
            creator_name: "Sam".to_string(),
        }
    }

    fn nav(id: Option<&str>, view: Option<&str>) -> NavContext {
        NavContext::new(id.map(String::from), view.map(String::from))
    }

    fn everything_saved() -> SavedState {
        SavedState {
            final_result: Some(taker_result("Q1")),
            last_created: Some(created("MINE")),
            my_quizzes: vec![created("MINE")],
        }
    }

    #[test]
    fn test_scoreboard_flag_dominates() {
        for saved in [SavedState::default(), everything_saved()] {
            assert_eq!(
                route(&nav(Some("Q1"), Some("scoreboard")), &saved),
                Route::Scoreboard("Q1".to_string())
            );
        }
    }

    #[test]
    fn test_returning_taker_sees_saved_result() {
        let saved = everything_saved();
        for arrival in [nav(Some("Q1"), None), nav(None, None)] {
            assert!(matches!(route(&arrival, &saved), Route::Result(r) if r.quiz_id == "Q1"));
        }
    }

    #[test]
    fn test_other_quiz_id_goes_to_taker_entry() {
        let saved = everything_saved();
        assert_eq!(route(&nav(Some("Q2"), None), &saved), Route::Take("Q2".to_string()));
    }

    #[test]
    fn test_creator_result_is_not_a_taker_result() {
        let mut saved = everything_saved();
        if let Some(result) = saved.final_result.as_mut() {
            result.role = ParticipantRole::Creator;
        }
        assert_eq!(
            route(&nav(None, None), &saved),
            Route::Scoreboard("MINE".to_string())
        );
    }

    #[test]
    fn test_dashboard_when_only_quiz_list_exists() {
        let saved = SavedState {
            my_quizzes: vec![created("A"), created("B")],
            ..SavedState::default()
        };
        assert!(matches!(route(&nav(None, None), &saved), Route::Dashboard(q) if q.len() == 2));
    }

    #[test]
    fn test_fresh_landing_is_creator_entry() {
        assert_eq!(route(&nav(None, None), &SavedState::default()), Route::Create);
    }

    #[test]
    fn test_links_round_trip_through_nav_context() {
        let link = scoreboard_link("buddy-quiz://play", "Ab3dEf9h");
        assert_eq!(
            NavContext::from_link(&link),
            nav(Some("Ab3dEf9h"), Some("scoreboard"))
        );
        assert_eq!(
            NavContext::from_link(&share_link("https://x.test/index.html", "Q1")),
            nav(Some("Q1"), None)
        );
        assert_eq!(NavContext::from_link("no query here"), NavContext::default());
        assert_eq!(NavContext::from_link("?id=&view="), NavContext::default());
    }
}

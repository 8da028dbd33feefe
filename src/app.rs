//! Client application state.
//!
//! [`App`] owns the current [`View`], the live subscriptions feeding it and
//! the handles to both stores. Everything here is independent of the terminal;
//! the event loop in `client` maps keys onto these methods.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::{
    rank_scores, scores_from_value, scores_path, takers_from_value, Question, ScoreRecord,
};
use crate::quizzes::{fetch_quiz, publish_quiz, record_score};
use crate::router::{route, scoreboard_link, share_link, NavContext, Route};
use crate::session::{Action, QuizSession, Role, SessionError, Transition};
use crate::storage::{
    group_recent, CreatedQuiz, FinalResult, LocalStore, ParticipantRole, RecentResult,
};
use crate::store::{KvStore, Subscription};

/// Which part of the creator entry screen takes key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Typing the creator's name.
    Name,
    /// Moving through the recent results list.
    Menu,
}

/// A row of the creator dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardEntry {
    pub quiz: CreatedQuiz,
    /// `None` until the first count arrives.
    pub takers: Option<usize>,
}

/// The one screen currently shown.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Creator entry, with the recently taken quizzes below it.
    Create {
        name: String,
        focus: Focus,
        recent: Vec<RecentResult>,
        cursor: usize,
    },
    /// Taker entry for a shared quiz.
    Take { quiz_id: String, name: String },
    /// Answering questions.
    Quiz {
        session: QuizSession,
        heading: String,
        cursor: usize,
    },
    /// A freshly created quiz, with its link and live top scores.
    Share {
        quiz_id: String,
        link: String,
        scoreboard_link: String,
        total: usize,
        scores: Option<Vec<ScoreRecord>>,
    },
    /// Full ranked scoreboard of one quiz.
    Scoreboard {
        quiz_id: String,
        heading: String,
        total: usize,
        scores: Vec<ScoreRecord>,
    },
    /// A taker's final score.
    Result {
        result: FinalResult,
        scoreboard_link: String,
    },
    /// Quizzes created on this machine.
    Dashboard {
        entries: Vec<DashboardEntry>,
        cursor: usize,
    },
}

/// A blocking message. Any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    /// Quiz that could not be found; dismissing returns to the landing screen.
    pub missing_quiz: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedTarget {
    Scores,
    Takers(usize),
}

struct LiveFeed {
    target: FeedTarget,
    subscription: Subscription,
}

pub struct App<S> {
    store: S,
    local: LocalStore,
    bank: Vec<Question>,
    share_base: String,
    rng: StdRng,
    view: View,
    alert: Option<Alert>,
    feeds: Vec<LiveFeed>,
    clipboard_request: Option<String>,
    pub should_quit: bool,
}

impl<S: KvStore> App<S> {
    pub fn new(store: S, local: LocalStore, bank: Vec<Question>, share_base: String) -> Self {
        Self::with_rng(store, local, bank, share_base, StdRng::from_entropy())
    }

    pub fn with_rng(
        store: S,
        local: LocalStore,
        bank: Vec<Question>,
        share_base: String,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            local,
            bank,
            share_base,
            rng,
            view: View::Create {
                name: String::new(),
                focus: Focus::Name,
                recent: Vec::new(),
                cursor: 0,
            },
            alert: None,
            feeds: Vec::new(),
            clipboard_request: None,
            should_quit: false,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Number of live subscriptions held for the current view.
    pub fn live_feed_count(&self) -> usize {
        self.feeds.len()
    }

    /// Shows the screen the router picks for `nav`.
    pub async fn open(&mut self, nav: &NavContext) {
        let saved = self.local.saved_state();
        let route = route(nav, &saved);
        tracing::info!("routing {:?} to {:?}", nav, route);
        self.enter(route).await;
    }

    async fn enter(&mut self, route: Route) {
        match route {
            Route::Scoreboard(quiz_id) => self.show_scoreboard(&quiz_id).await,
            Route::Result(result) => self.show_result(result),
            Route::Take(quiz_id) => self.set_view(View::Take {
                quiz_id,
                name: String::new(),
            }),
            Route::Dashboard(quizzes) => self.show_dashboard(quizzes).await,
            Route::Create => self.show_create(),
        }
    }

    /// Returns to the landing screen. If that would lead straight back to
    /// `missing_quiz`, the creator entry is shown instead.
    async fn open_landing(&mut self, missing_quiz: Option<String>) {
        let saved = self.local.saved_state();
        match route(&NavContext::default(), &saved) {
            Route::Scoreboard(id) if missing_quiz.as_deref() == Some(id.as_str()) => {
                self.show_create()
            }
            other => self.enter(other).await,
        }
    }

    /// Replaces the view. Live feeds belong to the old view and are dropped,
    /// which cancels their subscriptions.
    fn set_view(&mut self, view: View) {
        self.feeds.clear();
        self.view = view;
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(Alert {
            message: message.into(),
            missing_quiz: None,
        });
    }

    fn quiz_not_found(&mut self, quiz_id: &str) {
        tracing::warn!("quiz {} not found", quiz_id);
        self.alert = Some(Alert {
            message: "Quiz not found!".to_string(),
            missing_quiz: Some(quiz_id.to_string()),
        });
    }

    pub async fn dismiss_alert(&mut self) {
        if let Some(alert) = self.alert.take() {
            if alert.missing_quiz.is_some() {
                self.open_landing(alert.missing_quiz).await;
            }
        }
    }

    pub fn show_create(&mut self) {
        // Same order as the grouped list on screen, so the cursor lines up.
        let today = Utc::now().date_naive();
        let recent = group_recent(&self.local.recent_results(), today)
            .into_iter()
            .flat_map(|(_, results)| results)
            .collect();
        self.set_view(View::Create {
            name: String::new(),
            focus: Focus::Name,
            recent,
            cursor: 0,
        });
    }

    pub fn show_result(&mut self, result: FinalResult) {
        let scoreboard_link = scoreboard_link(&self.share_base, &result.quiz_id);
        self.set_view(View::Result {
            result,
            scoreboard_link,
        });
    }

    pub async fn show_scoreboard(&mut self, quiz_id: &str) {
        let quiz = match fetch_quiz(&self.store, quiz_id).await {
            Ok(Some(quiz)) => quiz,
            Ok(None) => return self.quiz_not_found(quiz_id),
            Err(e) => {
                tracing::error!("could not load quiz {}: {}", quiz_id, e);
                return self.show_alert(format!("Could not load the scoreboard: {}", e));
            }
        };

        self.set_view(View::Scoreboard {
            quiz_id: quiz_id.to_string(),
            heading: format!("{}'s Quiz Scores", quiz.creator_name),
            total: quiz.total_questions(),
            scores: quiz.ranked_scores(),
        });
        self.watch(FeedTarget::Scores, &scores_path(quiz_id)).await;
    }

    pub async fn show_dashboard(&mut self, quizzes: Vec<CreatedQuiz>) {
        let entries: Vec<DashboardEntry> = quizzes
            .into_iter()
            .map(|quiz| DashboardEntry { quiz, takers: None })
            .collect();
        let paths: Vec<String> = entries.iter().map(|e| scores_path(&e.quiz.quiz_id)).collect();

        self.set_view(View::Dashboard { entries, cursor: 0 });
        for (index, path) in paths.iter().enumerate() {
            self.watch(FeedTarget::Takers(index), path).await;
        }
    }

    pub async fn show_my_dashboard(&mut self) {
        let quizzes = self.local.my_quizzes();
        self.show_dashboard(quizzes).await;
    }

    async fn show_share(&mut self, quiz_id: String, total: usize) {
        let link = share_link(&self.share_base, &quiz_id);
        let scoreboard_link = scoreboard_link(&self.share_base, &quiz_id);
        let path = scores_path(&quiz_id);

        self.set_view(View::Share {
            quiz_id,
            link,
            scoreboard_link,
            total,
            scores: None,
        });
        self.watch(FeedTarget::Scores, &path).await;
    }

    async fn watch(&mut self, target: FeedTarget, path: &str) {
        match self.store.subscribe(path).await {
            Ok(subscription) => self.feeds.push(LiveFeed {
                target,
                subscription,
            }),
            Err(e) => {
                tracing::error!("could not watch {}: {}", path, e);
                self.show_alert(format!("Live updates are unavailable: {}", e));
            }
        }
    }

    /// Applies whatever the live feeds delivered since the last call.
    pub fn refresh_live(&mut self) {
        let mut updates = Vec::new();
        for feed in &mut self.feeds {
            if let Some(value) = feed.subscription.latest() {
                updates.push((feed.target, value));
            }
        }

        for (target, value) in updates {
            match (target, &mut self.view) {
                (FeedTarget::Scores, View::Share { scores, .. }) => {
                    *scores = Some(rank_scores(scores_from_value(value.as_ref())));
                }
                (FeedTarget::Scores, View::Scoreboard { scores, .. }) => {
                    *scores = rank_scores(scores_from_value(value.as_ref()));
                }
                (FeedTarget::Takers(index), View::Dashboard { entries, .. }) => {
                    if let Some(entry) = entries.get_mut(index) {
                        entry.takers = Some(takers_from_value(value.as_ref()));
                    }
                }
                _ => {}
            }
        }
    }

    /// Typed character on an entry screen.
    pub fn push_char(&mut self, c: char) {
        match &mut self.view {
            View::Create {
                name,
                focus: Focus::Name,
                ..
            }
            | View::Take { name, .. } => name.push(c),
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match &mut self.view {
            View::Create {
                name,
                focus: Focus::Name,
                ..
            }
            | View::Take { name, .. } => {
                name.pop();
            }
            _ => {}
        }
    }

    pub fn toggle_focus(&mut self) {
        if let View::Create { focus, .. } = &mut self.view {
            *focus = match focus {
                Focus::Name => Focus::Menu,
                Focus::Menu => Focus::Name,
            };
        }
    }

    pub fn move_cursor_down(&mut self) {
        match &mut self.view {
            View::Create {
                recent,
                cursor,
                focus: Focus::Menu,
                ..
            } => *cursor = (*cursor + 1).min(recent.len().saturating_sub(1)),
            View::Dashboard { entries, cursor } => {
                *cursor = (*cursor + 1).min(entries.len().saturating_sub(1))
            }
            View::Quiz {
                session, cursor, ..
            } => {
                let options = session.current_question().options.len();
                if options > 0 {
                    *cursor = (*cursor + 1) % options;
                }
            }
            _ => {}
        }
    }

    pub fn move_cursor_up(&mut self) {
        match &mut self.view {
            View::Create {
                cursor,
                focus: Focus::Menu,
                ..
            }
            | View::Dashboard { cursor, .. } => *cursor = cursor.saturating_sub(1),
            View::Quiz {
                session, cursor, ..
            } => {
                let options = session.current_question().options.len();
                if options > 0 {
                    *cursor = (*cursor + options - 1) % options;
                }
            }
            _ => {}
        }
    }

    /// Enter on an entry screen: start a session under the typed name.
    ///
    /// A blank name leaves the form as it is.
    pub async fn submit_name(&mut self) {
        match &self.view {
            View::Create { name, .. } => {
                let name = name.clone();
                match QuizSession::for_creator(&name, &self.bank, &mut self.rng) {
                    Ok(session) => {
                        tracing::info!("{} started a new quiz", session.role().participant_name());
                        self.start_session(session, "Your Quiz".to_string());
                    }
                    Err(SessionError::EmptyName) => {}
                    Err(e) => self.show_alert(e.to_string()),
                }
            }
            View::Take { quiz_id, name } => {
                if name.trim().is_empty() {
                    return;
                }
                let (quiz_id, name) = (quiz_id.clone(), name.clone());
                self.start_taking(&quiz_id, &name).await;
            }
            _ => {}
        }
    }

    async fn start_taking(&mut self, quiz_id: &str, name: &str) {
        let quiz = match fetch_quiz(&self.store, quiz_id).await {
            Ok(Some(quiz)) => quiz,
            Ok(None) => return self.quiz_not_found(quiz_id),
            Err(e) => {
                tracing::error!("could not load quiz {}: {}", quiz_id, e);
                return self.show_alert(format!("Could not load the quiz: {}", e));
            }
        };

        let heading = format!("{}'s Quiz", quiz.creator_name);
        match QuizSession::for_taker(name, quiz_id, quiz) {
            Ok(session) => {
                tracing::info!("{} is taking quiz {}", name, quiz_id);
                self.start_session(session, heading);
            }
            Err(SessionError::EmptyName) => {}
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    fn start_session(&mut self, session: QuizSession, heading: String) {
        let cursor = session.selected().unwrap_or(0);
        self.set_view(View::Quiz {
            session,
            heading,
            cursor,
        });
    }

    /// Select the option under the cursor.
    pub async fn select_under_cursor(&mut self) {
        if let View::Quiz { cursor, .. } = &self.view {
            let cursor = *cursor;
            self.quiz_action(Action::Select(cursor)).await;
        }
    }

    /// Drives the session. Next and Submit are ignored while their controls
    /// are hidden.
    pub async fn quiz_action(&mut self, action: Action) {
        let View::Quiz { session, .. } = &self.view else {
            return;
        };

        let controls = session.controls();
        let hidden = match action {
            Action::Next => !controls.next,
            Action::Previous => !controls.previous,
            Action::Submit => !controls.submit,
            Action::Select(_) => false,
        };
        if hidden {
            return;
        }

        match session.clone().apply(action) {
            Transition::Answering(next) => {
                if let View::Quiz {
                    session, cursor, ..
                } = &mut self.view
                {
                    if next.index() != session.index() {
                        *cursor = next.selected().unwrap_or(0);
                    } else if let Some(selected) = next.selected() {
                        *cursor = selected;
                    }
                    *session = next;
                }
            }
            Transition::Rejected { reason, .. } => {
                if let Some(message) = reason.alert_message() {
                    self.show_alert(message);
                }
            }
            Transition::Submitted(done) => self.finish(done).await,
        }
    }

    async fn finish(&mut self, session: QuizSession) {
        match session.role().clone() {
            Role::Taker {
                name,
                quiz_id,
                creator_name,
            } => {
                let score = session.score();
                if let Err(e) = record_score(&self.store, &quiz_id, &name, score).await {
                    tracing::error!("could not save score for quiz {}: {}", quiz_id, e);
                    return self.show_alert(format!("Could not save your score: {}", e));
                }

                let now = Utc::now();
                let result = FinalResult {
                    role: ParticipantRole::Taker,
                    quiz_id: quiz_id.clone(),
                    creator_name: creator_name.clone(),
                    friend_name: name.clone(),
                    score,
                    total_questions: session.total(),
                    timestamp: now,
                };
                let recent = RecentResult {
                    quiz_id,
                    creator_name,
                    friend_name: name,
                    score,
                    total_questions: session.total(),
                    date: now,
                };

                if let Err(e) = self.local.add_recent_result(recent) {
                    tracing::error!("could not save recent result: {}", e);
                }
                if let Err(e) = self.local.set_final_result(&result) {
                    tracing::error!("could not save final result: {}", e);
                }
                self.show_result(result);
            }
            Role::Creator { name } => {
                let sealed = session.sealed_questions();
                let total = sealed.len();
                let quiz_id = match publish_quiz(&self.store, &mut self.rng, &name, sealed).await {
                    Ok(quiz_id) => quiz_id,
                    Err(e) => {
                        tracing::error!("could not publish quiz: {}", e);
                        return self.show_alert(format!("Could not save your quiz: {}", e));
                    }
                };

                let created = CreatedQuiz {
                    quiz_id: quiz_id.clone(),
                    creator_name: name,
                };
                if let Err(e) = self.local.add_created_quiz(created.clone()) {
                    tracing::error!("could not remember created quiz: {}", e);
                }
                if let Err(e) = self.local.set_last_created(&created) {
                    tracing::error!("could not remember last created quiz: {}", e);
                }
                self.show_share(quiz_id, total).await;
            }
        }
    }

    /// Enter on a list: open the highlighted quiz's scoreboard.
    pub async fn open_selected(&mut self) {
        let quiz_id = match &self.view {
            View::Create {
                recent,
                cursor,
                focus: Focus::Menu,
                ..
            } => recent.get(*cursor).map(|r| r.quiz_id.clone()),
            View::Dashboard { entries, cursor } => {
                entries.get(*cursor).map(|e| e.quiz.quiz_id.clone())
            }
            _ => None,
        };

        if let Some(quiz_id) = quiz_id {
            self.show_scoreboard(&quiz_id).await;
        }
    }

    /// Scoreboard of the quiz the current screen is about.
    pub async fn open_current_scoreboard(&mut self) {
        let quiz_id = match &self.view {
            View::Share { quiz_id, .. } => quiz_id.clone(),
            View::Result { result, .. } => result.quiz_id.clone(),
            _ => return,
        };
        self.show_scoreboard(&quiz_id).await;
    }

    /// Ask the shell to put the share link on the clipboard.
    pub fn request_copy_link(&mut self) {
        if let View::Share { link, .. } = &self.view {
            self.clipboard_request = Some(link.clone());
        }
    }

    pub fn take_clipboard_request(&mut self) -> Option<String> {
        self.clipboard_request.take()
    }
}

//! Terminal client: connects to the store, opens the first screen and runs
//! the key loop.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus, View};
use crate::config::ClientConfig;
use crate::data::{builtin_questions, load_questions_from_json};
use crate::session::Action;
use crate::storage::LocalStore;
use crate::store::{KvStore, RemoteStore};
use crate::terminal;
use crate::ui;
use crate::QuizError;

/// Run the quiz client.
pub async fn run(config: ClientConfig) -> Result<(), QuizError> {
    let local = LocalStore::open(&config.data_dir)?;
    let bank = match &config.questions {
        Some(path) => load_questions_from_json(path)?,
        None => builtin_questions()?,
    };
    tracing::info!("question bank has {} questions", bank.len());

    let store = RemoteStore::connect(&config.server_url).await?;
    let mut app = App::new(store, local, bank, config.share_base);
    app.open(&config.nav).await;

    let mut terminal = terminal::init()?;
    let result = run_event_loop(&mut terminal, &mut app).await;
    terminal::restore()?;
    result.map_err(QuizError::from)
}

async fn run_event_loop<S: KvStore>(
    terminal: &mut terminal::AppTerminal,
    app: &mut App<S>,
) -> io::Result<()> {
    while !app.should_quit {
        app.refresh_live();
        terminal.draw(|frame| ui::render(frame, app.view(), app.alert()))?;

        if let Some(link) = app.take_clipboard_request() {
            match terminal::copy_to_clipboard(&link) {
                Ok(()) => app.show_alert("Link copied to clipboard!"),
                Err(e) => {
                    tracing::error!("could not copy link: {}", e);
                    app.show_alert(format!("Could not copy the link: {}", e));
                }
            }
            continue;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key(app, key).await;
            }
        }
    }

    Ok(())
}

/// Which key map applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keymap {
    NameEntry,
    RecentMenu,
    Quiz,
    Share,
    Result,
    Scoreboard,
    Dashboard,
}

impl Keymap {
    fn of(view: &View) -> Self {
        match view {
            View::Create {
                focus: Focus::Name, ..
            }
            | View::Take { .. } => Keymap::NameEntry,
            View::Create {
                focus: Focus::Menu, ..
            } => Keymap::RecentMenu,
            View::Quiz { .. } => Keymap::Quiz,
            View::Share { .. } => Keymap::Share,
            View::Result { .. } => Keymap::Result,
            View::Scoreboard { .. } => Keymap::Scoreboard,
            View::Dashboard { .. } => Keymap::Dashboard,
        }
    }
}

/// Handle keyboard input.
pub async fn handle_key<S: KvStore>(app: &mut App<S>, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    if app.alert().is_some() {
        app.dismiss_alert().await;
        return;
    }

    match Keymap::of(app.view()) {
        Keymap::NameEntry => match key.code {
            KeyCode::Char(c) => app.push_char(c),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Enter => app.submit_name().await,
            KeyCode::Tab => app.toggle_focus(),
            KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Keymap::RecentMenu => match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor_up(),
            KeyCode::Enter => app.open_selected().await,
            KeyCode::Char('d') => app.show_my_dashboard().await,
            KeyCode::Tab => app.toggle_focus(),
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Keymap::Quiz => match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor_up(),
            KeyCode::Enter | KeyCode::Char(' ') => app.select_under_cursor().await,
            KeyCode::Right | KeyCode::Char('n') => app.quiz_action(Action::Next).await,
            KeyCode::Left | KeyCode::Char('p') => app.quiz_action(Action::Previous).await,
            KeyCode::Char('s') => app.quiz_action(Action::Submit).await,
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Keymap::Share => match key.code {
            KeyCode::Char('c') => app.request_copy_link(),
            KeyCode::Char('v') => app.open_current_scoreboard().await,
            KeyCode::Char('d') => app.show_my_dashboard().await,
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Keymap::Result => match key.code {
            KeyCode::Char('v') => app.open_current_scoreboard().await,
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Keymap::Scoreboard => match key.code {
            KeyCode::Char('h') => app.show_create(),
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        Keymap::Dashboard => match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor_up(),
            KeyCode::Enter => app.open_selected().await,
            KeyCode::Char('n') => app.show_create(),
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::router::NavContext;
    use crate::session::CREATOR_QUESTION_COUNT;
    use crate::store::MemoryStore;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "buddy_quiz_client_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    async fn app(name: &str) -> App<MemoryStore> {
        let local = LocalStore::open(temp_dir(name)).unwrap();
        let mut app = App::with_rng(
            MemoryStore::new(),
            local,
            builtin_questions().unwrap(),
            "buddy-quiz://play".to_string(),
            StdRng::seed_from_u64(3),
        );
        app.open(&NavContext::default()).await;
        app
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            handle_key(app, press(KeyCode::Char(c))).await;
        }
    }

    #[tokio::test]
    async fn test_creator_flow_by_keys() {
        let mut app = app("creator_keys").await;
        type_text(&mut app, "Sam").await;
        handle_key(&mut app, press(KeyCode::Enter)).await;
        assert!(matches!(app.view(), View::Quiz { .. }));

        for i in 0..CREATOR_QUESTION_COUNT {
            handle_key(&mut app, press(KeyCode::Char(' '))).await;
            let key = if i + 1 < CREATOR_QUESTION_COUNT { 'n' } else { 's' };
            handle_key(&mut app, press(KeyCode::Char(key))).await;
        }

        assert!(matches!(app.view(), View::Share { .. }));
        handle_key(&mut app, press(KeyCode::Char('c'))).await;
        assert!(app.take_clipboard_request().is_some());
    }

    #[tokio::test]
    async fn test_q_is_typed_while_entering_a_name() {
        let mut app = app("q_typed").await;
        type_text(&mut app, "q").await;
        assert!(!app.should_quit);
        let View::Create { name, .. } = app.view() else {
            panic!("expected create screen");
        };
        assert_eq!(name, "q");
    }

    #[tokio::test]
    async fn test_missing_selection_alert_is_dismissed_by_any_key() {
        let mut app = app("alert_keys").await;
        type_text(&mut app, "Sam").await;
        handle_key(&mut app, press(KeyCode::Enter)).await;

        handle_key(&mut app, press(KeyCode::Char('n'))).await;
        assert_eq!(
            app.alert().map(|a| a.message.as_str()),
            Some("Please select an answer.")
        );

        handle_key(&mut app, press(KeyCode::Char('x'))).await;
        assert!(app.alert().is_none());
        assert!(matches!(app.view(), View::Quiz { .. }));
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_anywhere() {
        let mut app = app("ctrl_c").await;
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        )
        .await;
        assert!(app.should_quit);
    }
}

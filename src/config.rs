//! Command line options and logging setup.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::protocol::DEFAULT_PORT;
use crate::router::NavContext;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8712";
pub const DEFAULT_SHARE_BASE: &str = "buddy-quiz://play";

const DEFAULT_LOG_FILTER: &str = "buddy_quiz=info";
const LOG_FILE: &str = "buddy-quiz.log";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub play: PlayArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or take a quiz (the default)
    Play(PlayArgs),
    /// Host the shared quiz store
    Serve(ServeArgs),
}

impl Cli {
    /// The subcommand to run, `play` when none was given.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Play(self.play))
    }
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    /// Address of the store server
    #[arg(long, env = "BUDDY_QUIZ_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Directory for results and quizzes remembered on this machine
    #[arg(long, env = "BUDDY_QUIZ_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Prefix of the share links handed out to friends
    #[arg(long, env = "BUDDY_QUIZ_SHARE_BASE", default_value = DEFAULT_SHARE_BASE)]
    pub share_base: String,

    /// JSON file to draw creator questions from instead of the built-in bank
    #[arg(short, long, env = "BUDDY_QUIZ_QUESTIONS")]
    pub questions: Option<PathBuf>,

    /// Quiz to open
    #[arg(long)]
    pub id: Option<String>,

    /// Screen to open the quiz on (`scoreboard`)
    #[arg(long)]
    pub view: Option<String>,

    /// Share link to open, e.g. `buddy-quiz://play?id=abc123XY`
    #[arg(long, conflicts_with_all = ["id", "view"])]
    pub link: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// The port to listen on
    #[arg(short, long, env = "BUDDY_QUIZ_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// JSON file the store is loaded from and saved to
    #[arg(long, env = "BUDDY_QUIZ_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,
}

/// Everything the client needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub data_dir: PathBuf,
    pub share_base: String,
    pub questions: Option<PathBuf>,
    pub nav: NavContext,
}

impl From<PlayArgs> for ClientConfig {
    fn from(args: PlayArgs) -> Self {
        let nav = match args.link {
            Some(link) => NavContext::from_link(&link),
            None => NavContext::new(args.id, args.view),
        };

        Self {
            server_url: args.server,
            data_dir: args.data_dir.unwrap_or_else(default_data_dir),
            share_base: args.share_base,
            questions: args.questions,
            nav,
        }
    }
}

/// `$HOME/.buddy-quiz`, or `.buddy-quiz` when there is no home directory.
pub fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".buddy-quiz"),
        None => PathBuf::from(".buddy-quiz"),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Logs to `<data_dir>/buddy-quiz.log`; the terminal belongs to the UI.
pub fn init_client_logging(data_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

pub fn init_server_logging() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().into_command()
    }

    #[test]
    fn test_play_is_the_default() {
        let Command::Play(args) = parse(&["buddy-quiz", "--id", "abc123XY"]) else {
            panic!("expected play");
        };
        let config = ClientConfig::from(args);
        assert_eq!(config.nav, NavContext::new(Some("abc123XY".into()), None));
        assert_eq!(config.share_base, DEFAULT_SHARE_BASE);
    }

    #[test]
    fn test_link_fills_navigation() {
        let Command::Play(args) = parse(&[
            "buddy-quiz",
            "play",
            "--link",
            "buddy-quiz://play?id=Q1&view=scoreboard",
        ]) else {
            panic!("expected play");
        };
        let config = ClientConfig::from(args);
        assert_eq!(config.nav.quiz_id.as_deref(), Some("Q1"));
        assert_eq!(config.nav.view.as_deref(), Some("scoreboard"));
    }

    #[test]
    fn test_link_conflicts_with_id() {
        assert!(Cli::try_parse_from(["buddy-quiz", "--link", "x?id=a", "--id", "b"]).is_err());
    }

    #[test]
    fn test_serve_options() {
        let Command::Serve(args) = parse(&["buddy-quiz", "serve", "--port", "9000"]) else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 9000);
        assert_eq!(args.snapshot, None);
    }
}

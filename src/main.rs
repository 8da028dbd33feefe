use buddy_quiz::config::{self, Cli, ClientConfig, Command};
use buddy_quiz::store::MemoryStore;
use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    match Cli::parse().into_command() {
        Command::Play(args) => {
            let config = ClientConfig::from(args);
            config::init_client_logging(&config.data_dir)?;
            buddy_quiz::client::run(config).await?;
        }
        Command::Serve(args) => {
            config::init_server_logging();
            let store = match &args.snapshot {
                Some(path) => MemoryStore::with_snapshot(path)?,
                None => MemoryStore::new(),
            };
            buddy_quiz::server::run(args.port, store).await?;
        }
    }

    Ok(())
}

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use guestbook::cli::{self, Cli, Command};
use guestbook::config::Config;
use guestbook::guestbook::Guestbook;
use guestbook::store::{EntryStore, HttpEntryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    let config = Config::from_env()?;
    let store: Arc<dyn EntryStore> = Arc::new(HttpEntryStore::from_config(&config)?);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, store).await,
        Command::List => cli::list_entries(&Guestbook::new(store)).await,
        Command::Post { name, message } => cli::post_entry(&Guestbook::new(store), name, message).await,
    }
}

async fn serve(config: &Config, store: Arc<dyn EntryStore>) -> anyhow::Result<()> {
    let app = guestbook::build_app(store);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!(backend = %config.api_url, "listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

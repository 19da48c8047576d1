use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use journal::auth::session;
use journal::config::{Cli, Command, Config};
use journal::db;
use journal::routes;
use journal::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli)?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    let state = AppState::new(pool, config);

    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(state).await,
        Command::AddUser { username, password } => {
            let user = state.store.create_user(&username, &password).await?;
            println!("Created user {} ({})", user.username, user.id);
            Ok(())
        }
        Command::RemoveUser { username } => {
            let user = state
                .store
                .user_by_name(&username)
                .await?
                .with_context(|| format!("no such user: {}", username))?;
            state.store.delete_user(&user.id).await?;
            println!("Removed user {} and everything they owned", user.username);
            Ok(())
        }
        Command::IssueToken { username } => {
            let user = state
                .store
                .user_by_name(&username)
                .await?
                .with_context(|| format!("no such user: {}", username))?;
            let token = state.store.issue_api_token(&user.id).await?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(state: AppState) -> anyhow::Result<()> {
    let purged = session::purge_expired(&state.db)?;
    if purged > 0 {
        tracing::info!("Purged {} expired sessions", purged);
    }

    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .context("invalid listen address")?;
    let app = routes::app(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

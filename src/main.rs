//! The icon catalog's web server.

use icon_catalog::{config::Config, router, store::GitHubStore, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// # Errors
///
/// See implementation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,icon_catalog=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    if config.owner.is_none() || config.repo.is_none() {
        warn!("`GITHUB_OWNER` or `GITHUB_REPO` isn't set, so every request will fail");
    }

    if config.admin_password.is_none() {
        warn!("`ADMIN_PASSWORD` isn't set, so every update will be unauthorized");
    }

    let store = GitHubStore::new(&config)?;

    info!(
        owner = config.owner.as_deref().unwrap_or_default(),
        repo = config.repo.as_deref().unwrap_or_default(),
        branch = %config.branch,
        fetch_strategy = ?config.fetch_strategy,
        "Using catalog repository"
    );

    let listener = TcpListener::bind(&config.address).await?;

    info!("Listening on http://{}", config.address);

    axum::serve(listener, router(AppState::new(config, store))).await?;

    Ok(())
}

mod app;
mod widgets;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::sync::Arc;

use arcade_core::{config::AppConfig, GeminiResponder, Leaderboard, LocalStore};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load_or_create()?;
    init_logging(&config)?;
    info!(
        model = %config.model,
        storage = %config.storage_root.display(),
        has_api_key = config.api_key.is_some(),
        "Configuration loaded"
    );

    let leaderboard = Leaderboard::load(LocalStore::from_config(&config));
    let responder = GeminiResponder::new(&config);
    if !responder.has_api_key() {
        warn!("No API key configured; Cyber-Santa will answer with the fallback reply");
    }

    let mut app = app::ArcadeApp::new(leaderboard, responder);
    app.run().await
}

// The terminal belongs to the UI, so logs only go to the file.
fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = config.log_dir()?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("cherry-arcade.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}

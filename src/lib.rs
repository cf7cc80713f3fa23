pub mod commands;
pub mod config;
pub mod conversation;
pub mod db;
pub mod endpoint;
pub mod feedback;
pub mod hydration;
pub mod llm;
pub mod models;
mod terminal;

use commands::ChatSession;
use config::{Config, ConfigError};
use db::{Database, KeyValueStore, MemoryStore};
use feedback::FeedbackStore;
use llm::http::HttpBackend;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Feedback lives in the data directory when it can be opened, otherwise
/// only for the lifetime of the process.
fn open_store(config: &Config) -> Box<dyn KeyValueStore> {
    match Database::new(&config.data_dir) {
        Ok(db) => Box::new(db),
        Err(e) => {
            tracing::warn!(
                error = %e,
                dir = %config.data_dir.display(),
                "feedback storage unavailable, ratings will not persist"
            );
            Box::new(MemoryStore::new())
        }
    }
}

pub async fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let base_url = endpoint::resolve_base_url(config.api_url.as_deref(), config.host());
    let shown_base = if base_url.is_empty() {
        "(same origin)"
    } else {
        base_url.as_str()
    };
    tracing::info!(
        base_url = shown_base,
        variant = ?config.variant,
        "Yaseen chat starting v{}",
        env!("CARGO_PKG_VERSION")
    );

    let backend = Arc::new(HttpBackend::new(base_url, Some(config.page_url.clone())));
    let session = ChatSession::new(backend, config.variant);
    let feedback = FeedbackStore::new(open_store(&config));

    let viewport = terminal::TerminalViewport {
        columns: config.columns,
    };

    terminal::run(session, feedback, &viewport).await?;
    Ok(())
}

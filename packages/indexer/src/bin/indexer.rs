//! Indexer Service
//!
//! Runs the document analyzer, document indexer, and tag indexer on their
//! configured intervals until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use indexer_core::{
    start_scheduler, AppUser, Config, MemorySearchIndex, MemoryStore, StoreContextProvider, Workers,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,indexer_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting indexer service");

    let config = Config::from_env().context("Failed to load configuration")?;

    let store = match &config.seed_file {
        Some(path) => {
            let store = MemoryStore::from_seed_file(path)
                .with_context(|| format!("Failed to load seed file {}", path.display()))?;
            tracing::info!(
                documents = store.document_count(),
                tags = store.tag_count(),
                "Loaded seed data"
            );
            store
        }
        None => MemoryStore::new(),
    };

    let user = AppUser::system(&config.system_user);
    tracing::info!(user = %user.username, "Workers act as system user");

    let contexts = StoreContextProvider::new(Arc::new(store), user);
    let workers = Workers::new(
        Arc::new(contexts),
        Arc::new(MemorySearchIndex::new()),
        config.schedule,
    );

    let scheduler = start_scheduler(&workers, &config.schedule).await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    scheduler.shutdown().await?;
    Ok(())
}

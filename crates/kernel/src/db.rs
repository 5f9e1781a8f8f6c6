//! Document store construction.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::{DocumentStore, MemoryStore};

/// Create the document store selected by `config`.
///
/// `MONGODB_URL` selects MongoDB (feature `mongodb`); otherwise an in-memory
/// store is used, loaded from `SEED_FILE` when set.
pub async fn create_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if let Some(url) = &config.mongodb_url {
        return connect_mongo(url, &config.mongodb_database).await;
    }

    let store = match &config.seed_file {
        Some(path) => MemoryStore::from_seed_file(path)
            .with_context(|| format!("failed to load seed file {}", path.display()))?,
        None => MemoryStore::new(),
    };
    tracing::info!(
        collections = store.collection_count(),
        "using in-memory document store"
    );
    Ok(Arc::new(store))
}

#[cfg(feature = "mongodb")]
async fn connect_mongo(url: &str, database: &str) -> Result<Arc<dyn DocumentStore>> {
    let store = crate::store::MongoStore::connect(url, database)
        .await
        .context("failed to connect to MongoDB")?;
    tracing::info!(database = database, "connected to MongoDB");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongo(_url: &str, _database: &str) -> Result<Arc<dyn DocumentStore>> {
    anyhow::bail!("MONGODB_URL is set but this build does not include the `mongodb` feature")
}


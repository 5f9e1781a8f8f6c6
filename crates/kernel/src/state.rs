//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db;
use crate::listing::{ListingService, ResourceRegistry};
use crate::store::DocumentStore;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Listing service over the configured store.
    listing: ListingService,
}

impl AppState {
    /// Connect the configured store and build the built-in registry.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = db::create_store(config)
            .await
            .context("failed to create document store")?;
        Ok(Self::with_store(store, config))
    }

    /// Build state over an existing store.
    pub fn with_store(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        let registry = ResourceRegistry::builtin(config.supported_languages.clone());
        tracing::info!(
            resources = registry.definitions().len(),
            languages = ?registry.languages(),
            "resource registry built"
        );

        let listing = ListingService::new(store, Arc::new(registry))
            .with_page_sizes(config.default_page_size, config.max_page_size);

        Self {
            inner: Arc::new(AppStateInner { listing }),
        }
    }

    pub fn listing(&self) -> &ListingService {
        &self.inner.listing
    }

    /// Check if the document store is healthy.
    pub async fn store_healthy(&self) -> bool {
        self.inner.listing.store_healthy().await
    }
}

//! Document store abstraction.
//!
//! The listing executor talks to the datastore exclusively through
//! [`DocumentStore::aggregate`], which runs one aggregation pipeline against
//! one collection in a single round trip.
//!
//! Backends:
//! - [`MemoryStore`]: in-process evaluator for the pipeline subset the
//!   listing compiler emits (tests, local runs with seed data)
//! - `MongoStore`: MongoDB driver backend (feature `mongodb`)

mod eval;
mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

use async_trait::async_trait;
use bson::Document;
use thiserror::Error;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

/// Errors raised by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The pipeline uses a stage or operator the backend cannot evaluate.
    #[error("unsupported aggregation operator: {0}")]
    Unsupported(String),

    /// The pipeline is structurally invalid (bad stage argument, bad regex).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Seed data could not be read or parsed.
    #[error("failed to load seed data: {0}")]
    Seed(String),

    #[cfg(feature = "mongodb")]
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// A collection-oriented store that can run aggregation pipelines.
///
/// Implementations must execute the whole pipeline as one request so that
/// every `$facet` branch observes the same snapshot.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run `pipeline` against `collection` and return the output documents.
    ///
    /// A missing collection behaves as an empty one.
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Whether the backend is reachable.
    async fn health(&self) -> bool;
}

//! Listing errors.

use thiserror::Error;

use super::registry::ResourceKind;
use crate::store::StoreError;

/// Errors raised while listing a resource.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The registry has no definition for this resource.
    #[error("resource not registered: {0}")]
    NotRegistered(ResourceKind),

    /// The datastore call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The aggregation returned something other than one facet document.
    #[error("malformed aggregation result: {0}")]
    MalformedResult(String),

    /// A returned document does not fit the resource's model.
    #[error("failed to hydrate document {index}{}: {source}", .id.as_deref().map(|id| format!(" ({id})")).unwrap_or_default())]
    Hydration {
        /// Position of the document within the page.
        index: usize,
        /// Hex object id, when the document carries one.
        id: Option<String>,
        source: bson::de::Error,
    },
}

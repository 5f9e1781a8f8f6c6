//! Result hydrator.
//!
//! Aggregation output bypasses the models' normal load path, so every raw
//! page document is deserialized into its model here. That is where `_id`
//! becomes `id` and where internal fields (`removed`, password hashes) drop
//! out of serialization.

use bson::Document;
use serde::de::DeserializeOwned;

use super::error::ListingError;

/// Deserialize each raw document into `T`.
///
/// Fails on the first document that does not fit, naming its position;
/// documents are never skipped.
pub fn hydrate<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>, ListingError> {
    documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let id = document.get_object_id("_id").ok().map(|id| id.to_hex());
            bson::from_document(document)
                .map_err(|source| ListingError::Hydration { index, id, source })
        })
        .collect()
}

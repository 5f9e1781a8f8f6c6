//! MongoDB document store.

use async_trait::async_trait;
use bson::{Document, doc};
use futures_util::TryStreamExt;
use mongodb::{Client, Database};

use super::{DocumentStore, StoreError};

/// Store backed by one MongoDB database.
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to `url` and use `database`.
    ///
    /// The driver connects lazily; failures surface on the first command.
    pub async fn connect(url: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(url).await?;
        Ok(Self {
            db: client.database(database),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<Document>,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .db
            .collection::<Document>(collection)
            .aggregate(pipeline, None)
            .await?;
        let documents = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn health(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }, None).await.is_ok()
    }
}

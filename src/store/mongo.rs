//! MongoDB store implementation

use super::{ensure_object_id, DocumentStore, SortSpec, StoreError, StoreResult, SEED_MARKERS_COLLECTION};
use crate::config::StoreConfig;
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// MongoDB-backed document store
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connect and ping once
    ///
    /// The driver connects lazily, so the ping is what surfaces an unreachable server.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout));

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);

        database.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database '{}'", config.database);

        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        let id = ensure_object_id(&mut document);
        self.collection(collection).insert_one(document).await?;
        debug!("Inserted document {} into '{}'", id, collection);
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<SortSpec>,
    ) -> StoreResult<Vec<Document>> {
        let target = self.collection(collection);
        let mut find = target.find(filter);
        if let Some(sort) = sort {
            find = find.sort(sort.to_document());
        }

        let cursor = find.await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        debug!("Found {} documents in '{}'", documents.len(), collection);
        Ok(documents)
    }

    async fn seed_if_empty(
        &self,
        collection: &str,
        marker: &str,
        documents: Vec<Document>,
    ) -> StoreResult<u64> {
        if documents.is_empty() {
            return Ok(0);
        }

        let markers = self.collection(SEED_MARKERS_COLLECTION);

        // `_id` is unique, so exactly one caller can claim the marker
        let claim = doc! {
            "_id": marker,
            "collection": collection,
            "claimedAt": bson::DateTime::now(),
        };
        match markers.insert_one(claim).await {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => {
                debug!("Seed '{}' already claimed", marker);
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        }

        let target = self.collection(collection);
        let populated = async {
            if target.count_documents(doc! {}).await? > 0 {
                debug!("Collection '{}' already populated, seed '{}' skipped", collection, marker);
                return Ok(0);
            }
            let result = target.insert_many(documents).await?;
            Ok::<u64, MongoError>(result.inserted_ids.len() as u64)
        }
        .await;

        let release = async {
            if let Err(e) = markers.delete_one(doc! { "_id": marker }).await {
                warn!("Failed to release seed marker '{}': {}", marker, e);
            }
        };

        release_on_error(populated, release).await.map_err(StoreError::from)
    }
}

/// Await `release` only when `result` failed, so a claimed seed can be retried
async fn release_on_error<T, E, F>(result: Result<T, E>, release: F) -> Result<T, E>
where
    F: Future<Output = ()>,
{
    if result.is_err() {
        release.await;
    }
    result
}

fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY_CODE
    )
}

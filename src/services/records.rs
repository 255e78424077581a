//! Record service
//!
//! One store operation per call over the quiz progress, progress and assignment collections

use crate::models::records::*;
use crate::store::{DocumentStore, SortSpec};
use crate::utils::error::{helpers::not_found_error, AppError, AppResult, ErrorContext};
use bson::{doc, Document};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Seed marker for the sample assignments
pub const SAMPLE_ASSIGNMENTS_MARKER: &str = "sample_assignments";

/// Persistence operations behind the CRUD routes
///
/// Holds the store handle established at startup. `None` means the
/// connection attempt failed and every operation reports `StoreUnavailable`.
#[derive(Clone)]
pub struct RecordService {
    store: Option<Arc<dyn DocumentStore>>,
}

impl std::fmt::Debug for RecordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordService")
            .field("store", &self.store.as_ref().map(|store| store.name().to_string()))
            .finish()
    }
}

impl RecordService {
    pub fn new(store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { store }
    }

    /// The store handle, if one was established
    pub fn store(&self) -> Option<&Arc<dyn DocumentStore>> {
        self.store.as_ref()
    }

    fn require_store(&self) -> AppResult<&Arc<dyn DocumentStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| AppError::StoreUnavailable("no database connection was established".to_string()))
    }

    pub async fn save_quiz_progress(&self, request: SaveQuizProgressRequest) -> AppResult<String> {
        let record = request.validate()?;
        let store = self.require_store()?;

        let id = store
            .insert_one(QUIZ_PROGRESS_COLLECTION, to_document(&record)?)
            .await
            .store_context("Error saving quiz progress")?;

        info!("Saved quiz progress {} for user {}", id, record.user_id);
        Ok(id.to_hex())
    }

    pub async fn quiz_progress_for_user(&self, user_id: &str) -> AppResult<Vec<QuizProgressView>> {
        let store = self.require_store()?;

        let documents = store
            .find(QUIZ_PROGRESS_COLLECTION, doc! { "userId": user_id }, None)
            .await
            .store_context("Error fetching quiz progress")?;

        Ok(decode_all::<QuizProgress, _>(documents, QUIZ_PROGRESS_COLLECTION))
    }

    pub async fn save_progress(&self, request: SaveProgressRequest) -> AppResult<String> {
        let record = request.validate(Utc::now())?;
        let store = self.require_store()?;

        let id = store
            .insert_one(PROGRESS_COLLECTION, to_document(&record)?)
            .await
            .store_context("Error saving progress")?;

        info!("Saved progress {} for user {} ({})", id, record.user_id, record.language);
        Ok(id.to_hex())
    }

    /// Progress for one user and language, newest first
    pub async fn progress_for(&self, user_id: &str, language: &str) -> AppResult<Vec<ProgressView>> {
        let store = self.require_store()?;

        let documents = store
            .find(
                PROGRESS_COLLECTION,
                doc! { "userId": user_id, "language": language },
                Some(SortSpec::descending("timestamp")),
            )
            .await
            .store_context("Error fetching progress")?;

        if documents.is_empty() {
            return Err(not_found_error("No progress found for this user and language"));
        }

        Ok(decode_all::<Progress, _>(documents, PROGRESS_COLLECTION))
    }

    pub async fn list_assignments(&self) -> AppResult<Vec<AssignmentView>> {
        let store = self.require_store()?;

        let documents = store
            .find(ASSIGNMENTS_COLLECTION, doc! {}, None)
            .await
            .store_context("Error fetching assignments")?;

        Ok(decode_all::<Assignment, _>(documents, ASSIGNMENTS_COLLECTION))
    }

    /// Seed the sample assignments into an empty collection, at most once
    pub async fn insert_sample_assignments(&self) -> AppResult<u64> {
        let store = self.require_store()?;

        let documents = sample_assignments()
            .iter()
            .map(to_document)
            .collect::<AppResult<Vec<_>>>()?;

        let inserted = store
            .seed_if_empty(ASSIGNMENTS_COLLECTION, SAMPLE_ASSIGNMENTS_MARKER, documents)
            .await
            .store_context("Error inserting sample assignments")?;

        if inserted == 0 {
            debug!("Sample assignments already present, nothing inserted");
        } else {
            info!("Inserted {} sample assignments", inserted);
        }
        Ok(inserted)
    }

    pub async fn save_assignment(&self, request: SaveAssignmentRequest) -> AppResult<String> {
        let record = request.validate()?;
        let store = self.require_store()?;

        let id = store
            .insert_one(ASSIGNMENTS_COLLECTION, to_document(&record)?)
            .await
            .store_context("Error saving assignment")?;

        info!("Saved assignment {} '{}'", id, record.title);
        Ok(id.to_hex())
    }
}

fn to_document<T: Serialize>(record: &T) -> AppResult<Document> {
    bson::to_document(record).store_context("Error encoding record")
}

/// Decode stored documents, skipping any that no longer fit the record shape
fn decode_all<R, V>(documents: Vec<Document>, collection: &str) -> Vec<V>
where
    R: DeserializeOwned,
    V: From<R>,
{
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get_object_id("_id").map(|id| id.to_hex()).unwrap_or_default();
            match bson::from_document::<R>(document) {
                Ok(record) => Some(V::from(record)),
                Err(e) => {
                    warn!("Skipping undecodable document {} in '{}': {}", id, collection, e);
                    None
                }
            }
        })
        .collect()
}

//! Document store module
//!
//! Defines the DocumentStore trait and its MongoDB and in-memory implementations

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::Document;
use thiserror::Error;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Collection holding one marker document per completed seed
pub const SEED_MARKERS_COLLECTION: &str = "seed_markers";

/// Store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Driver or server error
    #[error("Database error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// Record could not be encoded as a document
    #[error("Document encoding failed: {0}")]
    Encode(#[from] bson::ser::Error),

    /// Stored document did not match the expected record shape
    #[error("Document decoding failed: {0}")]
    Decode(#[from] bson::de::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Single-field sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: SortOrder::Ascending }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: SortOrder::Descending }
    }

    /// Driver representation, e.g. `{ "timestamp": -1 }`
    pub fn to_document(&self) -> Document {
        let direction = match self.order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };
        let mut document = Document::new();
        document.insert(self.field.clone(), direction);
        document
    }
}

/// Document store trait
///
/// Every operation is a single round trip against one collection.
/// Implementations are shared read-only across request handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the store backend name
    fn name(&self) -> &str;

    /// Check the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Insert one document, assigning `_id` when absent, and return the id
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<ObjectId>;

    /// Find documents whose top-level fields equal every field of `filter`
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<SortSpec>,
    ) -> StoreResult<Vec<Document>>;

    /// Insert `documents` into `collection` at most once, and only while it is empty
    ///
    /// `marker` names the seed; the first caller to claim it performs the insert,
    /// every later or concurrent caller inserts nothing. Returns the inserted count.
    async fn seed_if_empty(
        &self,
        collection: &str,
        marker: &str,
        documents: Vec<Document>,
    ) -> StoreResult<u64>;
}

/// Ensure a document carries an ObjectId `_id`, returning it
pub(crate) fn ensure_object_id(document: &mut Document) -> ObjectId {
    if let Ok(id) = document.get_object_id("_id") {
        return id;
    }
    let id = ObjectId::new();
    document.insert("_id", id);
    id
}

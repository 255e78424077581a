//! In-memory store implementation
//!
//! Same semantics as the MongoDB store for the operations the gateway uses.
//! Backs the test suites and local runs without a database.

use super::{ensure_object_id, DocumentStore, SortOrder, SortSpec, StoreResult};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, Vec<Document>>,
    seed_markers: HashSet<String>,
}

/// Document store held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently in `collection`
    pub async fn count(&self, collection: &str) -> usize {
        let inner = self.inner.read().await;
        inner.collections.get(collection).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        let id = ensure_object_id(&mut document);
        let mut inner = self.inner.write().await;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<SortSpec>,
    ) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().await;
        let mut documents: Vec<Document> = inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches_filter(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = sort {
            documents.sort_by(|a, b| {
                let ordering = compare_bson(a.get(&sort.field), b.get(&sort.field));
                match sort.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

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

        // Claim, check and insert under one write lock
        let mut inner = self.inner.write().await;
        if !inner.seed_markers.insert(marker.to_string()) {
            debug!("Seed '{}' already claimed", marker);
            return Ok(0);
        }

        let target = inner.collections.entry(collection.to_string()).or_default();
        if !target.is_empty() {
            return Ok(0);
        }

        let inserted = documents.len() as u64;
        for mut document in documents {
            ensure_object_id(&mut document);
            target.push(document);
        }
        Ok(inserted)
    }
}

/// Equality match on every top-level filter field
fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

/// Order two field values; missing and null sort first
fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None | Some(Bson::Null), None | Some(Bson::Null)) => Ordering::Equal,
        (None | Some(Bson::Null), _) => Ordering::Less,
        (_, None | Some(Bson::Null)) => Ordering::Greater,
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (as_number(x), as_number(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

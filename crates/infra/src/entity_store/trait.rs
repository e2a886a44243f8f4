use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use backoffice_core::{EntityKey, ExpectedVersion, Version};

/// Entity collection (one table per collection in a table-storage backend).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Customers,
    Products,
    Orders,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Products => "products",
            Collection::Orders => "orders",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored entity: key, version and JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub key: EntityKey,
    pub version: Version,
    /// When the store last wrote this entity.
    pub updated_at: DateTime<Utc>,
    pub payload: JsonValue,
}

/// Write mode for [`EntityStore::put`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PutMode {
    /// Create a new row; fail if the key already exists.
    InsertOnly,
    /// Replace an existing row (full replace, never merge); fail if the row is
    /// missing or its version does not match.
    Replace(ExpectedVersion),
}

/// Outcome of a delete. Deleting a missing row is not an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Entity store operation error.
///
/// Infrastructure errors as opposed to domain errors (validation,
/// invariants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("entity already exists: {0}")]
    AlreadyExists(String),

    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("malformed entity: {0}")]
    Corrupt(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// Keyed get/list/put/delete over independent collections.
///
/// Implementations must:
/// - assign [`Version::INITIAL`] on insert and bump the version on replace
/// - reject inserts over an existing key (creation is append-only)
/// - check the expected version on replace atomically with the write
/// - be safe for concurrent use (`Send + Sync`)
pub trait EntityStore: Send + Sync {
    fn get(&self, collection: Collection, key: &EntityKey) -> Result<Option<StoredEntity>, StoreError>;

    /// Write a document; returns the version now stored.
    fn put(
        &self,
        collection: Collection,
        key: &EntityKey,
        payload: JsonValue,
        mode: PutMode,
    ) -> Result<Version, StoreError>;

    fn delete(&self, collection: Collection, key: &EntityKey) -> Result<DeleteOutcome, StoreError>;

    /// Scan up to `limit` entities in store order.
    fn list_all(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntity>, StoreError>;
}

impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    fn get(&self, collection: Collection, key: &EntityKey) -> Result<Option<StoredEntity>, StoreError> {
        (**self).get(collection, key)
    }

    fn put(
        &self,
        collection: Collection,
        key: &EntityKey,
        payload: JsonValue,
        mode: PutMode,
    ) -> Result<Version, StoreError> {
        (**self).put(collection, key, payload, mode)
    }

    fn delete(&self, collection: Collection, key: &EntityKey) -> Result<DeleteOutcome, StoreError> {
        (**self).delete(collection, key)
    }

    fn list_all(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntity>, StoreError> {
        (**self).list_all(collection, limit)
    }
}

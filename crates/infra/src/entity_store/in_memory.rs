use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use serde_json::Value as JsonValue;

use backoffice_core::{EntityKey, Version};

use super::r#trait::{Collection, DeleteOutcome, EntityStore, PutMode, StoreError, StoredEntity};

type Table = BTreeMap<EntityKey, StoredEntity>;

/// In-memory entity store.
///
/// Intended for tests/dev. Rows are kept in `(partition, row)` order, which is
/// also the scan order of `list_all`. Writes can be made to fail to simulate a
/// backend outage, and every call is counted.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<HashMap<Collection, Table>>,
    write_failure: RwLock<Option<String>>,
    calls: AtomicUsize,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put/delete fail with `reason`.
    pub fn fail_writes(&self, reason: impl Into<String>) {
        if let Ok(mut failure) = self.write_failure.write() {
            *failure = Some(reason.into());
        }
    }

    pub fn restore_writes(&self) {
        if let Ok(mut failure) = self.write_failure.write() {
            *failure = None;
        }
    }

    /// Number of store calls made so far (reads and writes).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.tables
            .read()
            .map(|t| t.get(&collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        let failure = self
            .write_failure
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        match failure.as_ref() {
            Some(reason) => Err(StoreError::Backend(reason.clone())),
            None => Ok(()),
        }
    }
}

impl EntityStore for InMemoryEntityStore {
    fn get(&self, collection: Collection, key: &EntityKey) -> Result<Option<StoredEntity>, StoreError> {
        self.record_call();

        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        Ok(tables.get(&collection).and_then(|t| t.get(key)).cloned())
    }

    fn put(
        &self,
        collection: Collection,
        key: &EntityKey,
        payload: JsonValue,
        mode: PutMode,
    ) -> Result<Version, StoreError> {
        self.record_call();
        self.check_writable()?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        let table = tables.entry(collection).or_default();

        let version = match (mode, table.get(key)) {
            (PutMode::InsertOnly, Some(_)) => {
                return Err(StoreError::AlreadyExists(format!("{collection}/{key}")));
            }
            (PutMode::InsertOnly, None) => Version::INITIAL,
            (PutMode::Replace(_), None) => {
                return Err(StoreError::NotFound(format!("{collection}/{key}")));
            }
            (PutMode::Replace(expected), Some(existing)) => {
                if !expected.matches(existing.version) {
                    return Err(StoreError::Conflict(format!(
                        "{collection}/{key}: expected {expected:?}, found {}",
                        existing.version
                    )));
                }
                existing.version.next()
            }
        };

        table.insert(
            key.clone(),
            StoredEntity {
                key: key.clone(),
                version,
                updated_at: Utc::now(),
                payload,
            },
        );

        Ok(version)
    }

    fn delete(&self, collection: Collection, key: &EntityKey) -> Result<DeleteOutcome, StoreError> {
        self.record_call();
        self.check_writable()?;

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let removed = tables.get_mut(&collection).and_then(|t| t.remove(key));
        Ok(match removed {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        })
    }

    fn list_all(&self, collection: Collection, limit: usize) -> Result<Vec<StoredEntity>, StoreError> {
        self.record_call();

        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        Ok(tables
            .get(&collection)
            .map(|t| t.values().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::ExpectedVersion;
    use serde_json::json;

    fn key(row: &str) -> EntityKey {
        EntityKey::new("P", row)
    }

    #[test]
    fn insert_assigns_initial_version_and_rejects_duplicates() {
        let store = InMemoryEntityStore::new();
        let v = store
            .put(Collection::Orders, &key("a"), json!({"n": 1}), PutMode::InsertOnly)
            .unwrap();
        assert_eq!(v, Version::INITIAL);

        let err = store
            .put(Collection::Orders, &key("a"), json!({"n": 2}), PutMode::InsertOnly)
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        let stored = store.get(Collection::Orders, &key("a")).unwrap().unwrap();
        assert_eq!(stored.payload, json!({"n": 1}));
    }

    #[test]
    fn replace_checks_version_and_bumps_it() {
        let store = InMemoryEntityStore::new();
        let v1 = store
            .put(Collection::Orders, &key("a"), json!({"n": 1}), PutMode::InsertOnly)
            .unwrap();

        let v2 = store
            .put(
                Collection::Orders,
                &key("a"),
                json!({"n": 2}),
                PutMode::Replace(ExpectedVersion::Exact(v1)),
            )
            .unwrap();
        assert_eq!(v2, v1.next());

        // Stale writer loses.
        let err = store
            .put(
                Collection::Orders,
                &key("a"),
                json!({"n": 3}),
                PutMode::Replace(ExpectedVersion::Exact(v1)),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let stored = store.get(Collection::Orders, &key("a")).unwrap().unwrap();
        assert_eq!(stored.payload, json!({"n": 2}));
        assert_eq!(stored.version, v2);
    }

    #[test]
    fn replace_of_missing_row_fails() {
        let store = InMemoryEntityStore::new();
        let err = store
            .put(
                Collection::Orders,
                &key("ghost"),
                json!({}),
                PutMode::Replace(ExpectedVersion::Any),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemoryEntityStore::new();
        store
            .put(Collection::Orders, &key("a"), json!({}), PutMode::InsertOnly)
            .unwrap();

        assert_eq!(
            store.delete(Collection::Orders, &key("a")).unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            store.delete(Collection::Orders, &key("a")).unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[test]
    fn collections_are_independent() {
        let store = InMemoryEntityStore::new();
        store
            .put(Collection::Orders, &key("a"), json!({}), PutMode::InsertOnly)
            .unwrap();

        assert!(store.get(Collection::Products, &key("a")).unwrap().is_none());
        assert_eq!(store.len(Collection::Orders), 1);
        assert_eq!(store.len(Collection::Customers), 0);
    }

    #[test]
    fn list_all_caps_and_orders_by_key() {
        let store = InMemoryEntityStore::new();
        for row in ["c", "a", "b"] {
            store
                .put(Collection::Products, &key(row), json!({"row": row}), PutMode::InsertOnly)
                .unwrap();
        }

        let rows: Vec<_> = store
            .list_all(Collection::Products, 2)
            .unwrap()
            .into_iter()
            .map(|e| e.key.row().to_string())
            .collect();
        assert_eq!(rows, vec!["a", "b"]);
    }

    #[test]
    fn failing_writes_leave_data_untouched() {
        let store = InMemoryEntityStore::new();
        store.fail_writes("disk on fire");

        let err = store
            .put(Collection::Orders, &key("a"), json!({}), PutMode::InsertOnly)
            .unwrap_err();
        assert_eq!(err, StoreError::Backend("disk on fire".to_string()));
        assert_eq!(store.len(Collection::Orders), 0);

        store.restore_writes();
        assert!(store
            .put(Collection::Orders, &key("a"), json!({}), PutMode::InsertOnly)
            .is_ok());
        assert_eq!(store.call_count(), 2);
    }
}

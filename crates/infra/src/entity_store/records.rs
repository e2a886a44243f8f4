//! Typed access to stored documents.

use serde::Serialize;
use serde::de::DeserializeOwned;

use backoffice_core::{Entity, EntityKey, ExpectedVersion, Version};
use backoffice_parties::Customer;
use backoffice_products::Product;
use backoffice_sales::Order;

use super::r#trait::{Collection, EntityStore, PutMode, StoreError, StoredEntity};

/// A domain record that lives in one collection.
pub trait Record: Entity + Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

impl Record for Customer {
    const COLLECTION: Collection = Collection::Customers;
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Orders;
}

/// A record together with the version it was read (or written) at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: Version,
}

impl<T> Versioned<T> {
    pub fn new(value: T, version: Version) -> Self {
        Self { value, version }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

fn decode<T: Record>(stored: StoredEntity) -> Result<Versioned<T>, StoreError> {
    let value: T = serde_json::from_value(stored.payload).map_err(|e| {
        StoreError::Corrupt(format!("{}/{}: {e}", T::COLLECTION, stored.key))
    })?;

    if value.key() != &stored.key {
        return Err(StoreError::Corrupt(format!(
            "{}/{}: document carries key {}",
            T::COLLECTION,
            stored.key,
            value.key()
        )));
    }

    Ok(Versioned::new(value, stored.version))
}

fn encode<T: Record>(record: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(record)
        .map_err(|e| StoreError::Corrupt(format!("{}/{}: {e}", T::COLLECTION, record.key())))
}

pub fn load<T: Record>(store: &impl EntityStore, key: &EntityKey) -> Result<Option<Versioned<T>>, StoreError> {
    store.get(T::COLLECTION, key)?.map(decode).transpose()
}

pub fn insert<T: Record>(store: &impl EntityStore, record: &T) -> Result<Version, StoreError> {
    store.put(T::COLLECTION, record.key(), encode(record)?, PutMode::InsertOnly)
}

pub fn replace<T: Record>(
    store: &impl EntityStore,
    record: &T,
    expected: ExpectedVersion,
) -> Result<Version, StoreError> {
    store.put(T::COLLECTION, record.key(), encode(record)?, PutMode::Replace(expected))
}

/// Strict listing: the first unreadable row fails the whole call.
pub fn list<T: Record>(store: &impl EntityStore, limit: usize) -> Result<Vec<Versioned<T>>, StoreError> {
    scan(store, limit)?.into_iter().collect()
}

/// Decode each row on its own; a bad row does not hide the others.
pub fn scan<T: Record>(
    store: &impl EntityStore,
    limit: usize,
) -> Result<Vec<Result<Versioned<T>, StoreError>>, StoreError> {
    Ok(store
        .list_all(T::COLLECTION, limit)?
        .into_iter()
        .map(decode)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_store::InMemoryEntityStore;
    use backoffice_products::ProductInput;
    use chrono::Utc;
    use serde_json::json;

    fn product() -> Product {
        Product::new_from(
            &ProductInput {
                name: Some("Widget".to_string()),
                price_minor_units: Some(100),
                ..ProductInput::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn insert_then_load_returns_versioned_record() {
        let store = InMemoryEntityStore::new();
        let p = product();
        insert(&store, &p).unwrap();

        let loaded: Versioned<Product> = load(&store, &p.key).unwrap().unwrap();
        assert_eq!(loaded.value, p);
        assert_eq!(loaded.version, Version::INITIAL);
    }

    #[test]
    fn malformed_document_is_reported_as_corrupt() {
        let store = InMemoryEntityStore::new();
        let key = EntityKey::new("_", "bad");
        store
            .put(Collection::Products, &key, json!({"nope": true}), PutMode::InsertOnly)
            .unwrap();

        let err = load::<Product>(&store, &key).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(msg) if msg.contains("products/_/bad")));
    }

    #[test]
    fn document_under_foreign_key_is_corrupt() {
        let store = InMemoryEntityStore::new();
        let p = product();
        let other = EntityKey::new("_", "elsewhere");
        store
            .put(
                Collection::Products,
                &other,
                serde_json::to_value(&p).unwrap(),
                PutMode::InsertOnly,
            )
            .unwrap();

        assert!(matches!(
            load::<Product>(&store, &other),
            Err(StoreError::Corrupt(_))
        ));
    }
}

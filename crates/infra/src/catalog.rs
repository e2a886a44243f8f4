//! Customer and product repositories over the entity store.
//!
//! Thin on purpose: validation lives on the input types, keys are assigned on
//! create and never change, updates are full replaces conditioned on a
//! version, and deletes are idempotent.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use backoffice_core::{DomainError, Entity, EntityKey, ExpectedVersion};
use backoffice_parties::{Customer, CustomerInput};
use backoffice_products::{Product, ProductInfo, ProductInput};
use backoffice_sales::EntityKind;

use crate::clock::{Clock, SystemClock};
use crate::entity_store::{DeleteOutcome, EntityStore, Record, StoreError, Versioned, records};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{0} not found.")]
    NotFound(EntityKind),

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("Record was changed by someone else: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Store(String),

    #[error("Stored data is unreadable: {0}")]
    Decode(String),
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AlreadyExists(msg) | StoreError::Conflict(msg) | StoreError::NotFound(msg) => {
                CatalogError::Conflict(msg)
            }
            StoreError::Corrupt(msg) => CatalogError::Decode(msg),
            StoreError::Backend(msg) => CatalogError::Store(msg),
        }
    }
}

fn get_record<T: Record>(store: &impl EntityStore, key: &EntityKey) -> Result<Option<Versioned<T>>, CatalogError> {
    Ok(records::load(store, key)?)
}

/// Load, apply `edit`, and replace conditioned on `expected`.
fn update_record<T: Record>(
    store: &impl EntityStore,
    kind: EntityKind,
    key: &EntityKey,
    expected: ExpectedVersion,
    edit: impl FnOnce(&mut T) -> Result<(), DomainError>,
) -> Result<Versioned<T>, CatalogError> {
    let current: Versioned<T> = records::load(store, key)?.ok_or(CatalogError::NotFound(kind))?;
    expected
        .check(current.version)
        .map_err(|e| CatalogError::Conflict(format!("{key}: {e}")))?;

    let loaded = current.version;
    let mut value = current.into_value();
    edit(&mut value)?;

    let version = records::replace(store, &value, ExpectedVersion::Exact(loaded))?;
    info!(collection = %T::COLLECTION, key = %key, %version, "record updated");
    Ok(Versioned::new(value, version))
}

fn delete_record<T: Record>(store: &impl EntityStore, key: &EntityKey) -> Result<DeleteOutcome, CatalogError> {
    let outcome = store.delete(T::COLLECTION, key)?;
    debug!(collection = %T::COLLECTION, key = %key, ?outcome, "record delete");
    Ok(outcome)
}

/// Customer records.
pub struct CustomerDirectory<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: EntityStore> CustomerDirectory<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn create(&self, input: &CustomerInput) -> Result<Versioned<Customer>, CatalogError> {
        let customer = Customer::new_from(input, self.clock.now())?;
        let version = records::insert(&self.store, &customer)?;
        info!(customer = %customer.key(), "customer created");
        Ok(Versioned::new(customer, version))
    }

    pub fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Customer>>, CatalogError> {
        get_record(&self.store, key)
    }

    /// Up to `take` customers, sorted by surname then first name.
    pub fn list(&self, take: usize) -> Result<Vec<Versioned<Customer>>, CatalogError> {
        let mut customers: Vec<Versioned<Customer>> = records::list(&self.store, take)?;
        customers.sort_by_cached_key(|c| (c.value.surname.to_lowercase(), c.value.first_name.to_lowercase()));
        Ok(customers)
    }

    pub fn update(
        &self,
        key: &EntityKey,
        input: &CustomerInput,
        expected: ExpectedVersion,
    ) -> Result<Versioned<Customer>, CatalogError> {
        update_record(&self.store, EntityKind::Customer, key, expected, |c: &mut Customer| {
            c.update_from(input)
        })
    }

    pub fn delete(&self, key: &EntityKey) -> Result<DeleteOutcome, CatalogError> {
        delete_record::<Customer>(&self.store, key)
    }
}

/// Product records.
pub struct ProductCatalog<S> {
    store: S,
    clock: Arc<dyn Clock>,
    default_currency: String,
}

impl<S: EntityStore> ProductCatalog<S> {
    pub fn new(store: S, default_currency: impl Into<String>) -> Self {
        Self::with_clock(store, default_currency, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, default_currency: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_currency: default_currency.into(),
        }
    }

    pub fn create(&self, input: &ProductInput) -> Result<Versioned<Product>, CatalogError> {
        let product = Product::new_from(input, self.clock.now())?;
        let version = records::insert(&self.store, &product)?;
        info!(product = %product.key(), "product created");
        Ok(Versioned::new(product, version))
    }

    pub fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Product>>, CatalogError> {
        get_record(&self.store, key)
    }

    /// Up to `take` products, sorted by category then display name.
    /// Uncategorised products come first.
    pub fn list(&self, take: usize) -> Result<Vec<Versioned<Product>>, CatalogError> {
        let mut products: Vec<Versioned<Product>> = records::list(&self.store, take)?;
        products.sort_by_cached_key(|p| {
            (
                p.value.category.as_deref().map(|c| c.trim().to_lowercase()),
                p.value.display_name().to_lowercase(),
            )
        });
        Ok(products)
    }

    pub fn update(
        &self,
        key: &EntityKey,
        input: &ProductInput,
        expected: ExpectedVersion,
    ) -> Result<Versioned<Product>, CatalogError> {
        update_record(&self.store, EntityKind::Product, key, expected, |p: &mut Product| {
            p.update_from(input)
        })
    }

    pub fn delete(&self, key: &EntityKey) -> Result<DeleteOutcome, CatalogError> {
        delete_record::<Product>(&self.store, key)
    }

    /// Price, stock, currency and name for an order form.
    pub fn product_info(&self, key: &EntityKey) -> Result<ProductInfo, CatalogError> {
        let product = get_record::<Product>(&self.store, key)?.ok_or(CatalogError::NotFound(EntityKind::Product))?;
        Ok(product.value.info(&self.default_currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_store::InMemoryEntityStore;
    use backoffice_core::Version;

    fn customer_input(first: &str, surname: &str) -> CustomerInput {
        CustomerInput {
            first_name: first.to_string(),
            surname: surname.to_string(),
            ..CustomerInput::default()
        }
    }

    fn product_input(name: &str, price: Option<i64>) -> ProductInput {
        ProductInput {
            name: Some(name.to_string()),
            category: Some("Hardware".to_string()),
            price_minor_units: price,
            stock_quantity: Some(4),
            ..ProductInput::default()
        }
    }

    #[test]
    fn customers_list_by_surname_then_first_name() {
        let directory = CustomerDirectory::new(InMemoryEntityStore::new());
        directory.create(&customer_input("Zoe", "Adams")).unwrap();
        directory.create(&customer_input("Ann", "Nkosi")).unwrap();
        directory.create(&customer_input("Bob", "adams")).unwrap();

        let names: Vec<_> = directory
            .list(10)
            .unwrap()
            .into_iter()
            .map(|c| c.value.first_name)
            .collect();
        assert_eq!(names, vec!["Bob", "Zoe", "Ann"]);
    }

    #[test]
    fn invalid_customer_is_rejected_without_a_write() {
        let store = Arc::new(InMemoryEntityStore::new());
        let directory = CustomerDirectory::new(store.clone());

        match directory.create(&customer_input(" ", "Adams")) {
            Err(CatalogError::Invalid(DomainError::Validation(_))) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.len(crate::entity_store::Collection::Customers), 0);
    }

    #[test]
    fn customer_update_keeps_key_and_bumps_version() {
        let directory = CustomerDirectory::new(InMemoryEntityStore::new());
        let created = directory.create(&customer_input("Ann", "Adams")).unwrap();

        let updated = directory
            .update(
                &created.value.key,
                &customer_input("Ann", "Zulu"),
                ExpectedVersion::Exact(created.version),
            )
            .unwrap();

        assert_eq!(updated.value.key, created.value.key);
        assert_eq!(updated.value.surname, "Zulu");
        assert_eq!(updated.version, created.version.next());
    }

    #[test]
    fn stale_update_is_a_conflict() {
        let directory = CustomerDirectory::new(InMemoryEntityStore::new());
        let created = directory.create(&customer_input("Ann", "Adams")).unwrap();
        directory
            .update(&created.value.key, &customer_input("Ann", "Baker"), ExpectedVersion::Any)
            .unwrap();

        let result = directory.update(
            &created.value.key,
            &customer_input("Ann", "Cele"),
            ExpectedVersion::Exact(Version::INITIAL),
        );
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let catalog = ProductCatalog::new(InMemoryEntityStore::new(), "ZAR");
        let result = catalog.update(
            &EntityKey::new("_", "missing"),
            &product_input("Widget", Some(100)),
            ExpectedVersion::Any,
        );
        assert_eq!(result.unwrap_err(), CatalogError::NotFound(EntityKind::Product));
    }

    #[test]
    fn deletes_are_idempotent() {
        let catalog = ProductCatalog::new(InMemoryEntityStore::new(), "ZAR");
        let created = catalog.create(&product_input("Widget", Some(100))).unwrap();

        assert_eq!(catalog.delete(&created.value.key).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(catalog.delete(&created.value.key).unwrap(), DeleteOutcome::NotFound);
        assert!(catalog.get(&created.value.key).unwrap().is_none());
    }

    #[test]
    fn products_list_by_name() {
        let catalog = ProductCatalog::new(InMemoryEntityStore::new(), "ZAR");
        catalog.create(&product_input("widget", Some(100))).unwrap();
        catalog.create(&product_input("Bolt", Some(5))).unwrap();
        catalog.create(&product_input("Anvil", None)).unwrap();

        let names: Vec<_> = catalog
            .list(10)
            .unwrap()
            .into_iter()
            .map(|p| p.value.display_name())
            .collect();
        assert_eq!(names, vec!["Anvil", "Bolt", "widget"]);
    }

    #[test]
    fn products_list_by_category_then_name() {
        let catalog = ProductCatalog::new(InMemoryEntityStore::new(), "ZAR");
        let with_category = |name: &str, category: Option<&str>| ProductInput {
            category: category.map(str::to_string),
            ..product_input(name, Some(100))
        };
        catalog.create(&with_category("Apple", Some("Zeta"))).unwrap();
        catalog.create(&with_category("Zebra", Some("Alpha"))).unwrap();
        catalog.create(&with_category("Mango", Some("alpha"))).unwrap();
        catalog.create(&with_category("Yam", None)).unwrap();

        let names: Vec<_> = catalog
            .list(10)
            .unwrap()
            .into_iter()
            .map(|p| p.value.display_name())
            .collect();
        assert_eq!(names, vec!["Yam", "Mango", "Zebra", "Apple"]);
    }

    #[test]
    fn product_info_uses_default_currency() {
        let catalog = ProductCatalog::new(InMemoryEntityStore::new(), "ZAR");
        let created = catalog.create(&product_input("Widget", Some(2500))).unwrap();

        let info = catalog.product_info(&created.value.key).unwrap();
        assert_eq!(info.price_minor_units, 2500);
        assert_eq!(info.stock, 4);
        assert_eq!(info.currency, "ZAR");
        assert_eq!(info.name, "Widget");

        assert_eq!(
            catalog.product_info(&EntityKey::new("_", "nope")).unwrap_err(),
            CatalogError::NotFound(EntityKind::Product)
        );
    }
}

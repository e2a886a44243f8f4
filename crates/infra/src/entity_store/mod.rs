//! Keyed entity store boundary.
//!
//! Three independent collections (customers, products, orders), each entity
//! addressed by a `(partition, row)` key and stored as a JSON document with a
//! store-assigned version.

pub mod in_memory;
pub mod records;
pub mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use records::{Record, Versioned};
pub use r#trait::{Collection, DeleteOutcome, EntityStore, PutMode, StoreError, StoredEntity};

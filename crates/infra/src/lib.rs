//! Infrastructure layer: entity store, catalog repositories, configuration
//! and the order fulfillment workflow.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod entity_store;
pub mod fulfillment;
pub mod order_numbers;


pub use catalog::{CatalogError, CustomerDirectory, ProductCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BackofficeConfig, ConfigError};
pub use entity_store::{EntityStore, InMemoryEntityStore, Versioned};
pub use fulfillment::{Fulfilled, FulfillmentError, OrderFulfillment, Outbound};
pub use order_numbers::OrderNumberGenerator;

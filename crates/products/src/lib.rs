//! Products domain module.
//!
//! Product records carry price (minor units), stock and currency. Order
//! fulfillment reads them as point-in-time snapshots and never writes stock.

pub mod product;

pub use product::{Product, ProductInfo, ProductInput};

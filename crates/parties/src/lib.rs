//! Customers domain module.
//!
//! Customer records are owned by the back-office CRUD surface; order
//! fulfillment only reads them to snapshot a display name.

pub mod customer;

pub use customer::{Customer, CustomerInput, PostalAddress};

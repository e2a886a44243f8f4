use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of entity a request referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Product,
    Order,
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            EntityKind::Customer => "Customer",
            EntityKind::Product => "Product",
            EntityKind::Order => "Order",
        })
    }
}

/// Rejected order request. Always detected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Quantity must be at least 1 (got {0}).")]
    InvalidQuantity(i64),

    #[error("Product has no price.")]
    UnpricedProduct,

    #[error("Quantity {requested} exceeds available stock ({available}).")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("Order total overflows: {0}")]
    AmountOverflow(String),
}

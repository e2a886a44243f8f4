//! Inventory delta rules.
//!
//! Placement reserves the ordered quantity. An edit compensates for the
//! difference between the pre-edit and post-edit lines so that, per product,
//! the sum of signed deltas always equals the change in committed quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::EntityKey;

use crate::events::{InventoryAdjustment, InventoryEvent};

/// The inventory-relevant part of an order: which product, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRef {
    pub product: EntityKey,
    pub quantity: i64,
}

/// A single change to committed stock for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryDelta {
    Reserve { product: EntityKey, quantity: i64 },
    Release { product: EntityKey, quantity: i64 },
}

impl InventoryDelta {
    pub fn product(&self) -> &EntityKey {
        match self {
            InventoryDelta::Reserve { product, .. } | InventoryDelta::Release { product, .. } => product,
        }
    }

    /// Positive for reserve, negative for release.
    pub fn signed_quantity(&self) -> i64 {
        match self {
            InventoryDelta::Reserve { quantity, .. } => *quantity,
            InventoryDelta::Release { quantity, .. } => -*quantity,
        }
    }

    pub fn into_event(self, reason: impl Into<String>, occurred_at: DateTime<Utc>) -> InventoryEvent {
        let reason = reason.into();
        match self {
            InventoryDelta::Reserve { product, quantity } => InventoryEvent::Reserve {
                adjustment: InventoryAdjustment {
                    product_key: product,
                    quantity,
                    reason,
                },
                occurred_at,
            },
            InventoryDelta::Release { product, quantity } => InventoryEvent::Release {
                adjustment: InventoryAdjustment {
                    product_key: product,
                    quantity,
                    reason,
                },
                occurred_at,
            },
        }
    }
}

/// A new order reserves its full quantity.
pub fn placement_delta(line: &OrderLineRef) -> InventoryDelta {
    InventoryDelta::Reserve {
        product: line.product.clone(),
        quantity: line.quantity,
    }
}

/// Compensating deltas for an edit, in publish order.
///
/// - product changed: release old quantity on the old product, then reserve
///   the new quantity on the new product
/// - same product, quantity up: reserve the difference
/// - same product, quantity down: release the difference
/// - unchanged: nothing
pub fn edit_deltas(before: &OrderLineRef, after: &OrderLineRef) -> Vec<InventoryDelta> {
    if before.product != after.product {
        return vec![
            InventoryDelta::Release {
                product: before.product.clone(),
                quantity: before.quantity,
            },
            InventoryDelta::Reserve {
                product: after.product.clone(),
                quantity: after.quantity,
            },
        ];
    }

    let delta = after.quantity - before.quantity;
    match delta.cmp(&0) {
        core::cmp::Ordering::Greater => vec![InventoryDelta::Reserve {
            product: after.product.clone(),
            quantity: delta,
        }],
        core::cmp::Ordering::Less => vec![InventoryDelta::Release {
            product: after.product.clone(),
            quantity: -delta,
        }],
        core::cmp::Ordering::Equal => vec![],
    }
}

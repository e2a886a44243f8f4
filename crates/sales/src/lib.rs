//! Sales orders domain module.
//!
//! Business rules for order fulfillment, implemented as deterministic domain
//! logic (no IO, no storage): request validation and pricing, the order record,
//! event payloads, and the inventory delta rules applied when an order is
//! edited.

pub mod error;
pub mod events;
pub mod inventory;
pub mod order;

pub use error::{EntityKind, ValidationError};
pub use events::{DecodeError, InventoryAdjustment, InventoryEvent, OrderEvent, OrderSnapshot};
pub use inventory::{InventoryDelta, OrderLineRef, edit_deltas, placement_delta};
pub use order::{Order, OrderInput, OrderStatus, PricedLine, check_quantity, price_line};

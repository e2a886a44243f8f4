//! Order and inventory event payloads.
//!
//! One explicit shape per event type. Payloads serialize with camelCase
//! field names; the type tag and timestamp live in the queue envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use backoffice_core::EntityKey;
use backoffice_events::{Channel, Event, QueueMessage};

pub const ORDER_PLACED: &str = "order-placed";
pub const ORDER_UPDATED: &str = "order-updated";
pub const ORDER_DELETED: &str = "order-deleted";
pub const INVENTORY_RESERVE: &str = "inventory-reserve";
pub const INVENTORY_RELEASE: &str = "inventory-release";

/// Full order snapshot carried by placed/updated events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub order_number: i64,
    pub partition_key: String,
    pub row_key: String,
    pub customer_name: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_minor_units: i64,
    pub total_minor_units: i64,
    pub currency_code: String,
    pub created_at_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeletedPayload {
    partition_key: String,
    row_key: String,
}

/// Reserve/release instruction for the inventory consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAdjustment {
    pub product_key: EntityKey,
    pub quantity: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
    Placed {
        order: OrderSnapshot,
        occurred_at: DateTime<Utc>,
    },
    Updated {
        order: OrderSnapshot,
        occurred_at: DateTime<Utc>,
    },
    Deleted {
        key: EntityKey,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    Reserve {
        adjustment: InventoryAdjustment,
        occurred_at: DateTime<Utc>,
    },
    Release {
        adjustment: InventoryAdjustment,
        occurred_at: DateTime<Utc>,
    },
}

/// A queued message could not be turned back into a typed event.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown event type: {0}")]
    UnknownType(String),

    #[error("malformed {event_type} payload: {source}")]
    Payload {
        event_type: String,
        #[source]
        source: serde_json::Error,
    },
}

fn decode_payload<T: serde::de::DeserializeOwned>(message: &QueueMessage) -> Result<T, DecodeError> {
    message.payload_as().map_err(|source| DecodeError::Payload {
        event_type: message.event_type().to_string(),
        source,
    })
}

impl OrderEvent {
    /// Rebuild a typed order event from a queued message.
    pub fn decode(message: &QueueMessage) -> Result<Self, DecodeError> {
        let occurred_at = message.at();
        match message.event_type() {
            ORDER_PLACED => Ok(OrderEvent::Placed {
                order: decode_payload(message)?,
                occurred_at,
            }),
            ORDER_UPDATED => Ok(OrderEvent::Updated {
                order: decode_payload(message)?,
                occurred_at,
            }),
            ORDER_DELETED => {
                let p: DeletedPayload = decode_payload(message)?;
                Ok(OrderEvent::Deleted {
                    key: EntityKey::new(p.partition_key, p.row_key),
                    occurred_at,
                })
            }
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed { .. } => ORDER_PLACED,
            OrderEvent::Updated { .. } => ORDER_UPDATED,
            OrderEvent::Deleted { .. } => ORDER_DELETED,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::Placed { occurred_at, .. }
            | OrderEvent::Updated { occurred_at, .. }
            | OrderEvent::Deleted { occurred_at, .. } => *occurred_at,
        }
    }

    fn channel(&self) -> Channel {
        Channel::Orders
    }

    fn payload(&self) -> serde_json::Result<JsonValue> {
        match self {
            OrderEvent::Placed { order, .. } | OrderEvent::Updated { order, .. } => {
                serde_json::to_value(order)
            }
            OrderEvent::Deleted { key, .. } => serde_json::to_value(DeletedPayload {
                partition_key: key.partition().to_string(),
                row_key: key.row().to_string(),
            }),
        }
    }
}

impl InventoryEvent {
    pub fn adjustment(&self) -> &InventoryAdjustment {
        match self {
            InventoryEvent::Reserve { adjustment, .. } | InventoryEvent::Release { adjustment, .. } => {
                adjustment
            }
        }
    }

    /// Rebuild a typed inventory event from a queued message.
    pub fn decode(message: &QueueMessage) -> Result<Self, DecodeError> {
        let occurred_at = message.at();
        match message.event_type() {
            INVENTORY_RESERVE => Ok(InventoryEvent::Reserve {
                adjustment: decode_payload(message)?,
                occurred_at,
            }),
            INVENTORY_RELEASE => Ok(InventoryEvent::Release {
                adjustment: decode_payload(message)?,
                occurred_at,
            }),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::Reserve { .. } => INVENTORY_RESERVE,
            InventoryEvent::Release { .. } => INVENTORY_RELEASE,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::Reserve { occurred_at, .. } | InventoryEvent::Release { occurred_at, .. } => {
                *occurred_at
            }
        }
    }

    fn channel(&self) -> Channel {
        Channel::Inventory
    }

    fn payload(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self.adjustment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    fn snapshot() -> OrderSnapshot {
        OrderSnapshot {
            order_number: 1_741_944_600_000,
            partition_key: "ORD-2025-03".to_string(),
            row_key: "abc".to_string(),
            customer_name: "Thandi Nkosi".to_string(),
            product_name: "Widget".to_string(),
            quantity: 3,
            unit_price_minor_units: 2500,
            total_minor_units: 7500,
            currency_code: "ZAR".to_string(),
            created_at_utc: test_time(),
        }
    }

    #[test]
    fn order_placed_payload_has_documented_fields() {
        let event = OrderEvent::Placed {
            order: snapshot(),
            occurred_at: test_time(),
        };
        let payload = event.payload().unwrap();

        for field in [
            "orderNumber",
            "partitionKey",
            "rowKey",
            "customerName",
            "productName",
            "quantity",
            "unitPriceMinorUnits",
            "totalMinorUnits",
            "currencyCode",
            "createdAtUtc",
        ] {
            assert!(payload.get(field).is_some(), "missing {field}");
        }
        assert_eq!(event.channel(), Channel::Orders);
    }

    #[test]
    fn inventory_payload_nests_product_key() {
        let event = InventoryEvent::Release {
            adjustment: InventoryAdjustment {
                product_key: EntityKey::new("HARDWARE", "p1"),
                quantity: 5,
                reason: "Order 1 edit".to_string(),
            },
            occurred_at: test_time(),
        };
        let payload = event.payload().unwrap();

        assert_eq!(payload["productKey"]["partition"], "HARDWARE");
        assert_eq!(payload["productKey"]["row"], "p1");
        assert_eq!(payload["quantity"], 5);
        assert_eq!(event.event_type(), "inventory-release");
        assert_eq!(event.channel(), Channel::Inventory);
    }

    #[test]
    fn queue_message_decodes_back_to_typed_events() {
        let deleted = OrderEvent::Deleted {
            key: EntityKey::new("ORD-2025-03", "abc"),
            occurred_at: test_time(),
        };
        let msg = QueueMessage::from_event(&deleted).unwrap();
        assert_eq!(msg.payload()["partitionKey"], "ORD-2025-03");
        assert_eq!(OrderEvent::decode(&msg).unwrap(), deleted);

        let placed = OrderEvent::Placed {
            order: snapshot(),
            occurred_at: test_time(),
        };
        let msg = QueueMessage::from_event(&placed).unwrap();
        assert_eq!(OrderEvent::decode(&msg).unwrap(), placed);
    }

    #[test]
    fn decode_rejects_foreign_types() {
        let msg = QueueMessage::new("inventory-reserve", test_time(), serde_json::json!({}));
        assert!(matches!(
            OrderEvent::decode(&msg),
            Err(DecodeError::UnknownType(t)) if t == "inventory-reserve"
        ));
        assert!(matches!(
            InventoryEvent::decode(&msg),
            Err(DecodeError::Payload { .. })
        ));
    }
}

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::bus::PublishError;
use crate::event::Event;

/// Wire envelope for a queued event: `{"type", "at", "payload"}`.
///
/// This is the unit a publisher sends to a queue. The payload is the event's
/// own serialized shape; consumers dispatch on `type` before decoding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    #[serde(rename = "type")]
    event_type: String,
    at: DateTime<Utc>,
    payload: JsonValue,
}

impl QueueMessage {
    pub fn new(event_type: impl Into<String>, at: DateTime<Utc>, payload: JsonValue) -> Self {
        Self {
            event_type: event_type.into(),
            at,
            payload,
        }
    }

    /// Wrap a typed event, stamping it with its business time.
    pub fn from_event<E: Event>(event: &E) -> Result<Self, PublishError> {
        let payload = event
            .payload()
            .map_err(|e| PublishError::Serialize(format!("{}: {e}", event.event_type())))?;

        Ok(Self::new(event.event_type(), event.occurred_at(), payload))
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    /// Decode the payload into a concrete shape.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Render the message body as sent on the wire.
    pub fn to_json(&self) -> Result<String, PublishError> {
        serde_json::to_string(self).map_err(|e| PublishError::Serialize(e.to_string()))
    }
}

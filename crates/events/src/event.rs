use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use crate::bus::Channel;

/// Something that happened and is announced on a queue.
///
/// Each event type has one payload shape. The type tag and timestamp are not
/// part of the payload; [`QueueMessage`](crate::QueueMessage) carries them.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Wire type tag (e.g. "order-placed").
    fn event_type(&self) -> &'static str;

    /// Business time of the event.
    fn occurred_at(&self) -> DateTime<Utc>;

    fn channel(&self) -> Channel;

    fn payload(&self) -> serde_json::Result<JsonValue>;
}

//! In-memory event queue for tests/dev.

use std::collections::HashMap;
use std::sync::{Mutex, mpsc};

use crate::bus::{EventPublisher, PublishError, Subscription};
use crate::envelope::QueueMessage;

#[derive(Debug, Default)]
struct QueueState {
    /// Every accepted message, in publish order.
    log: Vec<(String, QueueMessage)>,
    subscribers: HashMap<String, Vec<mpsc::Sender<QueueMessage>>>,
    /// Remaining publishes before the queue starts rejecting; `None` = never.
    accept_budget: Option<usize>,
}

/// In-memory named queues.
///
/// Every accepted message lands in one publish log (inspect it with
/// [`published`](Self::published)) and is copied to the queue's live
/// subscribers. [`failing_after`](Self::failing_after) simulates an outage.
#[derive(Debug, Default)]
pub struct InMemoryEventQueue {
    state: Mutex<QueueState>,
}

impl InMemoryEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that accepts `accepted` messages and rejects everything after.
    pub fn failing_after(accepted: usize) -> Self {
        let queue = Self::new();
        queue.fail_after(accepted);
        queue
    }

    /// Accept `accepted` more messages, then reject.
    pub fn fail_after(&self, accepted: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.accept_budget = Some(accepted);
        }
    }

    /// Stop rejecting publishes.
    pub fn recover(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.accept_budget = None;
        }
    }

    /// All accepted messages as `(queue, message)`, in publish order.
    pub fn published(&self) -> Vec<(String, QueueMessage)> {
        self.state
            .lock()
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    /// Accepted messages for one queue, in publish order.
    pub fn messages(&self, queue: &str) -> Vec<QueueMessage> {
        self.published()
            .into_iter()
            .filter_map(|(q, m)| (q == queue).then_some(m))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.log.clear();
        }
    }

    pub fn subscribe(&self, queue: &str) -> Subscription<QueueMessage> {
        let (tx, rx) = mpsc::channel();

        // Poisoned lock: the subscription stays silent.
        if let Ok(mut state) = self.state.lock() {
            state.subscribers.entry(queue.to_string()).or_default().push(tx);
        }

        Subscription::new(rx)
    }
}

impl EventPublisher for InMemoryEventQueue {
    fn publish(&self, queue: &str, message: &QueueMessage) -> Result<(), PublishError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| PublishError::Transport("queue lock poisoned".to_string()))?;

        match state.accept_budget {
            Some(0) => {
                return Err(PublishError::Transport(format!("queue '{queue}' unavailable")));
            }
            Some(ref mut remaining) => *remaining -= 1,
            None => {}
        }

        state.log.push((queue.to_string(), message.clone()));

        // Drop any dead subscribers while publishing.
        if let Some(subs) = state.subscribers.get_mut(queue) {
            subs.retain(|tx| tx.send(message.clone()).is_ok());
        }

        tracing::debug!(queue, event_type = message.event_type(), "message enqueued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn message(event_type: &str) -> QueueMessage {
        QueueMessage::new(event_type, Utc::now(), json!({}))
    }

    #[test]
    fn keeps_publish_order_across_queues() {
        let queue = InMemoryEventQueue::new();
        queue.publish("orders-events", &message("order-placed")).unwrap();
        queue.publish("inventory-events", &message("inventory-reserve")).unwrap();

        let log = queue.published();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, "orders-events");
        assert_eq!(log[1].1.event_type(), "inventory-reserve");
        assert_eq!(queue.messages("inventory-events").len(), 1);
    }

    #[test]
    fn subscribers_only_see_their_queue() {
        let queue = InMemoryEventQueue::new();
        let sub = queue.subscribe("inventory-events");

        queue.publish("orders-events", &message("order-placed")).unwrap();
        queue.publish("inventory-events", &message("inventory-release")).unwrap();

        assert_eq!(sub.try_recv().unwrap().event_type(), "inventory-release");
        assert!(sub.try_recv().is_err());
    }

    #[test]
    fn rejects_after_budget_and_recovers() {
        let queue = InMemoryEventQueue::failing_after(1);
        assert!(queue.publish("q", &message("a")).is_ok());
        assert!(matches!(
            queue.publish("q", &message("b")),
            Err(PublishError::Transport(_))
        ));
        assert_eq!(queue.len(), 1);

        queue.recover();
        assert!(queue.publish("q", &message("c")).is_ok());
        assert_eq!(queue.len(), 2);
    }
}

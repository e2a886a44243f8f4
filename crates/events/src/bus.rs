//! Event publishing abstraction (mechanics only).
//!
//! A publisher is **fire-and-forget**: `publish` returns once the queue has
//! accepted the message, never after a consumer has processed it.
//!
//! - **Transport-agnostic**: storage queues, brokers, in-memory channels.
//! - **At-least-once acceptable**: consumers must be idempotent.
//! - **No ordering guarantee at the consumer**: the publisher sends in call
//!   order, delivery and processing order are up to the transport.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::envelope::QueueMessage;

/// Logical event channel. Concrete queue names are configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Order lifecycle events (placed, updated, deleted).
    Orders,
    /// Inventory reserve/release signals for stock consumers.
    Inventory,
}

/// Publication failure.
///
/// Raised after the triggering write already committed, so callers treat it
/// as a degraded success rather than rolling anything back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("event serialization failed: {0}")]
    Serialize(String),

    #[error("queue rejected message: {0}")]
    Transport(String),
}

/// Receiving end of one queue, for in-process consumers.
///
/// Sees every message published to the queue after it was created.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Next message if one is waiting.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Everything currently queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Named-queue publisher.
///
/// The trait requires `Send + Sync`: one publisher is shared by every
/// concurrent workflow invocation.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, queue: &str, message: &QueueMessage) -> Result<(), PublishError>;
}

impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    fn publish(&self, queue: &str, message: &QueueMessage) -> Result<(), PublishError> {
        (**self).publish(queue, message)
    }
}

//! Domain events and the queue publishing boundary.
//!
//! Events are typed in the domain crates; this crate only knows how to wrap
//! them into the queue wire envelope and hand them to a publisher.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{Channel, EventPublisher, PublishError, Subscription};
pub use envelope::QueueMessage;
pub use event::Event;
pub use in_memory_bus::InMemoryEventQueue;

//! Order fulfillment workflow (application-level orchestration).
//!
//! `OrderFulfillment` composes an [`EntityStore`] and an [`EventPublisher`]
//! into the three order commands: place, edit and delete.
//!
//! ```text
//! request
//!   ↓
//! 1. Pre-check quantity (no store access)
//!   ↓
//! 2. Resolve customer/product snapshots, validate, price
//!   ↓
//! 3. Persist the order (insert-only, or version-checked replace)
//!   ↓
//! 4. Publish order event, then inventory delta events
//! ```
//!
//! Publishing only follows a successful write. A publish failure does not undo
//! the write: the caller gets a [`Fulfilled`] outcome flagged as degraded,
//! carrying the failure and every message that was not sent.
//!
//! Nothing here holds a lock across store or publisher calls, so concurrent
//! placements against one product are not serialized and may jointly oversell.
//! Stock is a best-effort snapshot; reconciliation happens downstream.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use backoffice_core::{Entity, EntityKey, ExpectedVersion, new_row_key};
use backoffice_events::{Event, EventPublisher, PublishError, QueueMessage};
use backoffice_parties::Customer;
use backoffice_products::Product;
use backoffice_sales::{
    EntityKind, Order, OrderEvent, OrderInput, PricedLine, ValidationError, check_quantity, edit_deltas,
    placement_delta, price_line,
};

use crate::clock::{Clock, SystemClock};
use crate::config::BackofficeConfig;
use crate::entity_store::{Collection, DeleteOutcome, EntityStore, StoreError, Versioned, records};
use crate::order_numbers::OrderNumberGenerator;

/// Rejected or failed fulfillment request.
///
/// Publish failures are not here: they never fail a request (see
/// [`Fulfilled::publish_error`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FulfillmentError {
    #[error("{0} not found.")]
    NotFound(EntityKind),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Stale expected version, concurrent writer, or duplicate key.
    #[error("Order was changed by someone else: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Store(String),

    /// A stored document could not be read back as a valid record.
    #[error("Stored data is unreadable: {0}")]
    Decode(String),
}

impl From<StoreError> for FulfillmentError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::AlreadyExists(msg) | StoreError::Conflict(msg) | StoreError::NotFound(msg) => {
                FulfillmentError::Conflict(msg)
            }
            StoreError::Corrupt(msg) => FulfillmentError::Decode(msg),
            StoreError::Backend(msg) => FulfillmentError::Store(msg),
        }
    }
}

/// A message bound for a named queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub queue: String,
    pub message: QueueMessage,
}

/// Outcome of a successful write and its follow-up publishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Fulfilled<T> {
    pub value: T,
    /// Messages the queue accepted, in publish order.
    pub published: Vec<Outbound>,
    /// Messages not sent because an earlier publish failed.
    pub unpublished: Vec<Outbound>,
    pub publish_error: Option<PublishError>,
}

impl<T> Fulfilled<T> {
    fn quiet(value: T) -> Self {
        Self {
            value,
            published: Vec::new(),
            unpublished: Vec::new(),
            publish_error: None,
        }
    }

    /// The write committed but at least one event was not published.
    pub fn is_degraded(&self) -> bool {
        self.publish_error.is_some()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Order placement/edit/delete over a keyed store and a message queue.
///
/// ## Generic Parameters
///
/// - `S`: entity store (`InMemoryEntityStore` in tests, a table store in production)
/// - `P`: event publisher (`InMemoryEventQueue` in tests)
pub struct OrderFulfillment<S, P> {
    store: S,
    publisher: P,
    config: BackofficeConfig,
    clock: Arc<dyn Clock>,
    numbers: OrderNumberGenerator,
}

impl<S, P> OrderFulfillment<S, P> {
    pub fn new(store: S, publisher: P, config: BackofficeConfig) -> Self {
        Self::with_clock(store, publisher, config, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, publisher: P, config: BackofficeConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            publisher,
            config,
            clock,
            numbers: OrderNumberGenerator::new(),
        }
    }
}

impl<S, P> OrderFulfillment<S, P>
where
    S: EntityStore,
    P: EventPublisher,
{
    /// Place a new order.
    ///
    /// On success the order is stored and `order-placed` plus one
    /// `inventory-reserve` (reason `"Order <n>"`) are published in that order.
    /// Nothing is published when validation or the write fails.
    pub fn place(&self, input: &OrderInput) -> Result<Fulfilled<Versioned<Order>>, FulfillmentError> {
        let line = self.validate(input)?;

        let now = self.clock.now();
        let order_number = self.numbers.next(now);
        let order = Order::place(new_row_key(), order_number, line, now);

        let version = records::insert(&self.store, &order)?;
        info!(
            order = %order.key(),
            order_number,
            product = %order.product(),
            quantity = order.quantity(),
            total = %order.total(),
            "order placed"
        );

        let reason = format!("Order {order_number}");
        let outgoing = vec![
            self.outbound(&OrderEvent::Placed {
                order: order.snapshot(),
                occurred_at: now,
            }),
            self.outbound(&placement_delta(&order.line_ref()).into_event(reason, now)),
        ];

        Ok(self.publish_all(Versioned::new(order, version), outgoing))
    }

    /// Edit an existing order's customer, product and quantity.
    ///
    /// `expected` is checked against the stored version before anything else
    /// is resolved; the replace itself is always conditioned on the version
    /// loaded here, so a concurrent writer in between yields `Conflict`.
    ///
    /// Stock is checked against the new product's current snapshot without
    /// crediting the quantity this order already holds.
    pub fn update(
        &self,
        key: &EntityKey,
        input: &OrderInput,
        expected: ExpectedVersion,
    ) -> Result<Fulfilled<Versioned<Order>>, FulfillmentError> {
        check_quantity(input.quantity).inspect_err(|e| warn!(order = %key, error = %e, "order edit rejected"))?;

        let current = self.load_order(key)?.ok_or(FulfillmentError::NotFound(EntityKind::Order))?;
        expected.check(current.version).map_err(|e| {
            warn!(order = %key, ?expected, actual = %current.version, "stale order version");
            FulfillmentError::Conflict(format!("{key}: {e}"))
        })?;

        let line = self.validate(input)?;
        let loaded_version = current.version;
        let mut order = current.into_value();
        let before = order.revise(line);
        let after = order.line_ref();

        let version = records::replace(&self.store, &order, ExpectedVersion::Exact(loaded_version))?;
        info!(
            order = %key,
            order_number = order.order_number(),
            %version,
            quantity = order.quantity(),
            "order updated"
        );

        let now = self.clock.now();
        let reason = format!("Order {} edit", order.order_number());
        let mut outgoing = vec![self.outbound(&OrderEvent::Updated {
            order: order.snapshot(),
            occurred_at: now,
        })];
        outgoing.extend(
            edit_deltas(&before, &after)
                .into_iter()
                .map(|delta| self.outbound(&delta.into_event(reason.clone(), now))),
        );

        Ok(self.publish_all(Versioned::new(order, version), outgoing))
    }

    /// Delete an order. Deleting a missing order succeeds without publishing.
    ///
    /// Inventory held by the order is not released.
    pub fn delete(&self, key: &EntityKey) -> Result<Fulfilled<DeleteOutcome>, FulfillmentError> {
        let outcome = self.store.delete(Collection::Orders, key)?;

        match outcome {
            DeleteOutcome::Deleted => {
                info!(order = %key, "order deleted");
                let outgoing = vec![self.outbound(&OrderEvent::Deleted {
                    key: key.clone(),
                    occurred_at: self.clock.now(),
                })];
                Ok(self.publish_all(outcome, outgoing))
            }
            DeleteOutcome::NotFound => {
                debug!(order = %key, "delete of missing order");
                Ok(Fulfilled::quiet(outcome))
            }
        }
    }

    pub fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Order>>, FulfillmentError> {
        self.load_order(key)
    }

    /// Up to `take` orders (default from config), sorted by order number.
    ///
    /// Unreadable rows are skipped with a warning; `get` and `update` still
    /// report them as `Decode`.
    pub fn list(&self, take: Option<usize>) -> Result<Vec<Versioned<Order>>, FulfillmentError> {
        let take = take.unwrap_or(self.config.list_take);
        let mut orders = Vec::new();
        for row in records::scan::<Order>(&self.store, take)? {
            match row.map_err(FulfillmentError::from).and_then(|o| check_order(&o).map(|()| o)) {
                Ok(order) => orders.push(order),
                Err(e) => warn!(error = %e, "skipping unreadable order"),
            }
        }
        orders.sort_by_key(|o| o.value.order_number());
        debug!(count = orders.len(), take, "orders listed");
        Ok(orders)
    }

    fn load_order(&self, key: &EntityKey) -> Result<Option<Versioned<Order>>, FulfillmentError> {
        let order = records::load::<Order>(&self.store, key)?;
        if let Some(order) = &order {
            check_order(order)?;
        }
        Ok(order)
    }

    /// Quantity pre-check, customer/product resolution, then pricing.
    fn validate(&self, input: &OrderInput) -> Result<PricedLine, FulfillmentError> {
        let result = check_quantity(input.quantity)
            .map_err(FulfillmentError::from)
            .and_then(|()| self.resolve_and_price(input));

        if let Err(e) = &result {
            warn!(
                customer = %input.customer,
                product = %input.product,
                quantity = input.quantity,
                error = %e,
                "order request rejected"
            );
        }
        result
    }

    fn resolve_and_price(&self, input: &OrderInput) -> Result<PricedLine, FulfillmentError> {
        let customer = records::load::<Customer>(&self.store, &input.customer)?
            .ok_or(FulfillmentError::NotFound(EntityKind::Customer))?;
        let product = records::load::<Product>(&self.store, &input.product)?
            .ok_or(FulfillmentError::NotFound(EntityKind::Product))?;
        debug!(customer = %input.customer, product = %input.product, "order parties resolved");

        Ok(price_line(
            input,
            &customer.value,
            &product.value,
            &self.config.default_currency,
        )?)
    }

    fn outbound<E: Event>(&self, event: &E) -> Result<Outbound, PublishError> {
        Ok(Outbound {
            queue: self.config.queue_for(event.channel()).to_string(),
            message: QueueMessage::from_event(event)?,
        })
    }

    /// Publish in order, stopping at the first failure.
    fn publish_all<T>(&self, value: T, outgoing: Vec<Result<Outbound, PublishError>>) -> Fulfilled<T> {
        let mut fulfilled = Fulfilled::quiet(value);

        for item in outgoing {
            match item {
                Ok(outbound) if fulfilled.publish_error.is_some() => fulfilled.unpublished.push(outbound),
                Ok(outbound) => match self.publisher.publish(&outbound.queue, &outbound.message) {
                    Ok(()) => fulfilled.published.push(outbound),
                    Err(e) => {
                        warn!(
                            queue = %outbound.queue,
                            event_type = outbound.message.event_type(),
                            error = %e,
                            "event publish failed; write kept"
                        );
                        fulfilled.publish_error = Some(e);
                        fulfilled.unpublished.push(outbound);
                    }
                },
                Err(e) => {
                    warn!(error = %e, "event could not be encoded");
                    if fulfilled.publish_error.is_none() {
                        fulfilled.publish_error = Some(e);
                    }
                }
            }
        }

        fulfilled
    }
}

fn check_order(order: &Versioned<Order>) -> Result<(), FulfillmentError> {
    order
        .value
        .check_invariants()
        .map_err(|e| FulfillmentError::Decode(format!("{}: {e}", order.value.key())))
}

//! Demo run of the order fulfillment workflow over in-memory collaborators.
//!
//! Seeds one customer and two products, then places, edits and deletes an
//! order, logging every queued message as JSON.

use std::sync::Arc;

use anyhow::Context;

use backoffice_core::{Entity, ExpectedVersion};
use backoffice_events::InMemoryEventQueue;
use backoffice_infra::{
    BackofficeConfig, CustomerDirectory, Fulfilled, InMemoryEntityStore, OrderFulfillment, ProductCatalog,
};
use backoffice_parties::{CustomerInput, PostalAddress};
use backoffice_products::ProductInput;
use backoffice_sales::OrderInput;

fn main() -> anyhow::Result<()> {
    backoffice_observability::init();

    let config = BackofficeConfig::from_env().context("invalid BACKOFFICE_* configuration")?;
    tracing::info!(
        default_currency = %config.default_currency,
        orders_queue = %config.orders_queue,
        inventory_queue = %config.inventory_queue,
        list_take = config.list_take,
        "configuration loaded"
    );

    let store = Arc::new(InMemoryEntityStore::new());
    let queue = Arc::new(InMemoryEventQueue::new());

    let customers = CustomerDirectory::new(store.clone());
    let products = ProductCatalog::new(store.clone(), config.default_currency.clone());
    let fulfillment = OrderFulfillment::new(store.clone(), queue.clone(), config.clone());

    let customer = customers.create(&CustomerInput {
        first_name: "Thandi".to_string(),
        surname: "Mokoena".to_string(),
        email: Some("thandi@example.com".to_string()),
        address: PostalAddress {
            city: Some("Johannesburg".to_string()),
            country: Some("ZA".to_string()),
            ..PostalAddress::default()
        },
        ..CustomerInput::default()
    })?;

    let kettle = products.create(&ProductInput {
        name: Some("Kettle".to_string()),
        category: Some("Kitchen".to_string()),
        price_minor_units: Some(2500),
        stock_quantity: Some(10),
        is_available: Some(true),
        ..ProductInput::default()
    })?;
    let toaster = products.create(&ProductInput {
        name: Some("Toaster".to_string()),
        category: Some("Kitchen".to_string()),
        price_minor_units: Some(4999),
        stock_quantity: Some(4),
        is_available: Some(true),
        ..ProductInput::default()
    })?;

    for product in products.list(config.list_take)? {
        let info = products.product_info(product.value.key())?;
        tracing::info!(product = %product.value.key(), name = %info.name, price = info.price_minor_units, stock = info.stock, "catalog entry");
    }

    let placed = fulfillment.place(&OrderInput {
        customer: customer.value.key().clone(),
        product: kettle.value.key().clone(),
        quantity: 3,
    })?;
    report("place", &placed);

    let order_key = placed.value.value.key().clone();
    let edited = fulfillment.update(
        &order_key,
        &OrderInput {
            customer: customer.value.key().clone(),
            product: toaster.value.key().clone(),
            quantity: 1,
        },
        ExpectedVersion::Exact(placed.value.version),
    )?;
    report("edit", &edited);

    let rejected = fulfillment.place(&OrderInput {
        customer: customer.value.key().clone(),
        product: toaster.value.key().clone(),
        quantity: 50,
    });
    if let Err(e) = rejected {
        tracing::info!(reason = %e, "oversized order rejected as expected");
    }

    for order in fulfillment.list(None)? {
        tracing::info!(
            order_number = order.value.order_number(),
            product = order.value.product_name(),
            quantity = order.value.quantity(),
            total = %order.value.total(),
            version = %order.version,
            "stored order"
        );
    }

    let deleted = fulfillment.delete(&order_key)?;
    report("delete", &deleted);

    for (queue_name, message) in queue.published() {
        tracing::info!(queue = %queue_name, message = %serde_json::to_string(&message)?, "queued message");
    }

    Ok(())
}

fn report<T>(step: &str, outcome: &Fulfilled<T>) {
    if outcome.is_degraded() {
        tracing::warn!(
            step,
            published = outcome.published.len(),
            unpublished = outcome.unpublished.len(),
            error = ?outcome.publish_error,
            "completed with unpublished events"
        );
    } else {
        tracing::info!(step, published = outcome.published.len(), "completed");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{DomainError, DomainResult, Entity, EntityKey, Money};
use backoffice_parties::Customer;
use backoffice_products::Product;

use crate::error::ValidationError;
use crate::events::OrderSnapshot;
use crate::inventory::OrderLineRef;

/// Order status lifecycle.
///
/// Fulfillment only ever sets `Placed`; other states belong to the
/// back-office surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

/// Placement/edit request: who, what, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub customer: EntityKey,
    pub product: EntityKey,
    pub quantity: i64,
}

/// A validated, priced order line with its display snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub customer: EntityKey,
    pub customer_name: String,
    pub product: EntityKey,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

/// Reject non-positive quantities. Cheap enough to run before any lookup.
pub fn check_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Validate a request against the resolved customer/product snapshots and
/// price it.
///
/// Checks run in a fixed order and stop at the first failure: quantity,
/// price, stock. Stock is the product's snapshot as read; nothing is
/// reserved here.
pub fn price_line(
    input: &OrderInput,
    customer: &Customer,
    product: &Product,
    default_currency: &str,
) -> Result<PricedLine, ValidationError> {
    check_quantity(input.quantity)?;

    let unit_minor = product.unit_price().ok_or(ValidationError::UnpricedProduct)?;

    let available = product.stock();
    if input.quantity > available {
        return Err(ValidationError::InsufficientStock {
            requested: input.quantity,
            available,
        });
    }

    let unit_price = Money::new(unit_minor, product.effective_currency(default_currency));
    let total = unit_price
        .times(input.quantity)
        .map_err(|e| match e {
            DomainError::Overflow(detail) => ValidationError::AmountOverflow(detail),
            other => ValidationError::AmountOverflow(other.to_string()),
        })?;

    Ok(PricedLine {
        customer: input.customer.clone(),
        customer_name: customer.display_name(),
        product: input.product.clone(),
        product_name: product.display_name(),
        quantity: input.quantity,
        unit_price,
        total,
    })
}

/// Stored order record.
///
/// Customer/product names are snapshots taken when the order was written;
/// later edits to the customer or product do not flow back here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    key: EntityKey,
    order_number: i64,
    status: OrderStatus,
    customer: EntityKey,
    customer_name: String,
    product: EntityKey,
    product_name: String,
    quantity: i64,
    unit_price_minor_units: i64,
    total_minor_units: i64,
    currency: String,
    created_at: DateTime<Utc>,
}

impl Entity for Order {
    fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl Order {
    /// Orders are bucketed by creation month, e.g. `ORD-2025-03`.
    pub fn partition_for(created_at: DateTime<Utc>) -> String {
        format!("ORD-{}", created_at.format("%Y-%m"))
    }

    /// Create a freshly placed order.
    pub fn place(
        row_key: impl Into<String>,
        order_number: i64,
        line: PricedLine,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key: EntityKey::new(Self::partition_for(created_at), row_key),
            order_number,
            status: OrderStatus::Placed,
            customer: line.customer,
            customer_name: line.customer_name,
            product: line.product,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price_minor_units: line.unit_price.minor_units,
            total_minor_units: line.total.minor_units,
            currency: line.total.currency,
            created_at,
        }
    }

    /// Replace the business fields with a newly priced line.
    ///
    /// Identity, order number, status and creation time are untouched.
    /// Returns the line as it was before the edit.
    pub fn revise(&mut self, line: PricedLine) -> OrderLineRef {
        let previous = self.line_ref();

        self.customer = line.customer;
        self.customer_name = line.customer_name;
        self.product = line.product;
        self.product_name = line.product_name;
        self.quantity = line.quantity;
        self.unit_price_minor_units = line.unit_price.minor_units;
        self.total_minor_units = line.total.minor_units;
        self.currency = line.total.currency;

        previous
    }

    pub fn line_ref(&self) -> OrderLineRef {
        OrderLineRef {
            product: self.product.clone(),
            quantity: self.quantity,
        }
    }

    /// Verify the record's numeric invariants (useful on data read back
    /// from storage).
    pub fn check_invariants(&self) -> DomainResult<()> {
        if self.quantity < 1 {
            return Err(DomainError::invariant("quantity must be at least 1"));
        }
        if self.unit_price_minor_units <= 0 {
            return Err(DomainError::invariant("unit price must be positive"));
        }
        if self.unit_price_minor_units.checked_mul(self.quantity) != Some(self.total_minor_units) {
            return Err(DomainError::invariant("total must equal unit price x quantity"));
        }
        Ok(())
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            order_number: self.order_number,
            partition_key: self.key.partition().to_string(),
            row_key: self.key.row().to_string(),
            customer_name: self.customer_name.clone(),
            product_name: self.product_name.clone(),
            quantity: self.quantity,
            unit_price_minor_units: self.unit_price_minor_units,
            total_minor_units: self.total_minor_units,
            currency_code: self.currency.clone(),
            created_at_utc: self.created_at,
        }
    }

    pub fn order_number(&self) -> i64 {
        self.order_number
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn customer(&self) -> &EntityKey {
        &self.customer
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn product(&self) -> &EntityKey {
        &self.product
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        Money::new(self.unit_price_minor_units, self.currency.clone())
    }

    pub fn total(&self) -> Money {
        Money::new(self.total_minor_units, self.currency.clone())
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{DomainError, DomainResult, Entity, EntityKey, new_row_key};

/// Partition used for products without a category.
pub const FALLBACK_PARTITION: &str = "_";

const UNNAMED: &str = "(Unnamed product)";

/// Create/edit form payload for a product.
///
/// Everything is optional; a product without a price simply cannot be
/// ordered yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Price in smallest currency unit (e.g., cents).
    pub price_minor_units: Option<i64>,
    /// ISO currency code (e.g., "ZAR").
    pub currency: Option<String>,
    pub stock_quantity: Option<i64>,
    pub is_available: Option<bool>,
}

impl ProductInput {
    pub fn validate(&self) -> DomainResult<()> {
        if matches!(self.price_minor_units, Some(p) if p < 0) {
            return Err(DomainError::validation("price must not be negative"));
        }
        if matches!(self.stock_quantity, Some(s) if s < 0) {
            return Err(DomainError::validation("stock quantity must not be negative"));
        }
        Ok(())
    }
}

/// Stored product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub key: EntityKey,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price_minor_units: Option<i64>,
    pub currency: Option<String>,
    pub stock_quantity: Option<i64>,
    pub is_available: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Price/stock summary used by order forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub price_minor_units: i64,
    pub stock: i64,
    pub currency: String,
    pub name: String,
}

impl Entity for Product {
    fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl Product {
    /// Products are bucketed by upper-cased category.
    pub fn partition_for(category: Option<&str>) -> String {
        match category.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_uppercase(),
            _ => FALLBACK_PARTITION.to_string(),
        }
    }

    /// Build a new record with a fresh row key.
    pub fn new_from(input: &ProductInput, created_at: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;

        let key = EntityKey::new(Self::partition_for(input.category.as_deref()), new_row_key());
        let mut product = Self {
            key,
            name: None,
            category: None,
            description: None,
            price_minor_units: None,
            currency: None,
            stock_quantity: None,
            is_available: None,
            created_at,
        };
        product.apply_input(input);
        Ok(product)
    }

    /// Replace every editable field; the key stays put because orders
    /// reference it.
    pub fn update_from(&mut self, input: &ProductInput) -> DomainResult<()> {
        input.validate()?;
        self.apply_input(input);
        Ok(())
    }

    fn apply_input(&mut self, input: &ProductInput) {
        self.name = trimmed(&input.name);
        self.category = trimmed(&input.category);
        self.description = trimmed(&input.description);
        self.price_minor_units = input.price_minor_units;
        self.currency = trimmed(&input.currency);
        self.stock_quantity = input.stock_quantity;
        self.is_available = input.is_available;
    }

    /// Unit price, if the product is priced at all.
    pub fn unit_price(&self) -> Option<i64> {
        self.price_minor_units.filter(|p| *p > 0)
    }

    /// Quantity currently available to reserve (absent counts as none).
    pub fn stock(&self) -> i64 {
        self.stock_quantity.unwrap_or(0).max(0)
    }

    /// Explicit availability flag, else derived from stock.
    pub fn is_available(&self) -> bool {
        self.is_available.unwrap_or_else(|| self.stock() > 0)
    }

    pub fn effective_currency(&self, default: &str) -> String {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(default)
            .to_string()
    }

    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED)
            .to_string()
    }

    pub fn info(&self, default_currency: &str) -> ProductInfo {
        ProductInfo {
            price_minor_units: self.price_minor_units.unwrap_or(0),
            stock: self.stock(),
            currency: self.effective_currency(default_currency),
            name: self.display_name(),
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|s| s.trim().to_string())
}

//! Money in integer minor units.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// An amount in the currency's smallest unit (e.g. cents).
///
/// Never floating point; multiplication is checked so totals cannot wrap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub minor_units: i64,
    pub currency: String,
}

impl ValueObject for Money {}

impl Money {
    pub fn new(minor_units: i64, currency: impl Into<String>) -> Self {
        Self {
            minor_units,
            currency: currency.into(),
        }
    }

    /// Multiply by a quantity (e.g. unit price × quantity = line total).
    pub fn times(&self, quantity: i64) -> DomainResult<Money> {
        let minor_units = self.minor_units.checked_mul(quantity).ok_or_else(|| {
            DomainError::overflow(format!(
                "{} x {quantity} {}",
                self.minor_units, self.currency
            ))
        })?;

        Ok(Money {
            minor_units,
            currency: self.currency.clone(),
        })
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.minor_units < 0 { "-" } else { "" };
        let abs = self.minor_units.unsigned_abs();
        write!(f, "{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}

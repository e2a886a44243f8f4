//! Configuration loading and representation.

use thiserror::Error;

use backoffice_events::Channel;

pub const ENV_DEFAULT_CURRENCY: &str = "BACKOFFICE_DEFAULT_CURRENCY";
pub const ENV_ORDERS_QUEUE: &str = "BACKOFFICE_ORDERS_QUEUE";
pub const ENV_INVENTORY_QUEUE: &str = "BACKOFFICE_INVENTORY_QUEUE";
pub const ENV_LIST_TAKE: &str = "BACKOFFICE_LIST_TAKE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} must not be blank")]
    Blank { key: &'static str },

    #[error("{key} must be a positive integer (got {value:?})")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be a three-letter currency code (got {value:?})")]
    InvalidCurrency { key: &'static str, value: String },
}

/// Back-office settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackofficeConfig {
    /// Currency applied to products that do not name one.
    pub default_currency: String,
    pub orders_queue: String,
    pub inventory_queue: String,
    /// Cap on rows scanned by list operations.
    pub list_take: usize,
}

impl Default for BackofficeConfig {
    fn default() -> Self {
        Self {
            default_currency: "ZAR".to_string(),
            orders_queue: "orders-events".to_string(),
            inventory_queue: "inventory-events".to_string(),
            list_take: 500,
        }
    }
}

impl BackofficeConfig {
    /// Defaults overridden by `BACKOFFICE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEFAULT_CURRENCY) {
            let code = non_blank(ENV_DEFAULT_CURRENCY, &value)?.to_ascii_uppercase();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::InvalidCurrency {
                    key: ENV_DEFAULT_CURRENCY,
                    value,
                });
            }
            config.default_currency = code;
        }

        if let Some(value) = lookup(ENV_ORDERS_QUEUE) {
            config.orders_queue = non_blank(ENV_ORDERS_QUEUE, &value)?;
        }

        if let Some(value) = lookup(ENV_INVENTORY_QUEUE) {
            config.inventory_queue = non_blank(ENV_INVENTORY_QUEUE, &value)?;
        }

        if let Some(value) = lookup(ENV_LIST_TAKE) {
            config.list_take = match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        key: ENV_LIST_TAKE,
                        value,
                    });
                }
            };
        }

        Ok(config)
    }

    /// Queue name a channel publishes to.
    pub fn queue_for(&self, channel: Channel) -> &str {
        match channel {
            Channel::Orders => &self.orders_queue,
            Channel::Inventory => &self.inventory_queue,
        }
    }
}

fn non_blank(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Blank { key });
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = BackofficeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, BackofficeConfig::default());
        assert_eq!(config.queue_for(Channel::Orders), "orders-events");
        assert_eq!(config.queue_for(Channel::Inventory), "inventory-events");
    }

    #[test]
    fn overrides_are_trimmed_and_normalized() {
        let config = BackofficeConfig::from_lookup(lookup(&[
            (ENV_DEFAULT_CURRENCY, " usd "),
            (ENV_ORDERS_QUEUE, " orders "),
            (ENV_LIST_TAKE, "25"),
        ]))
        .unwrap();

        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.orders_queue, "orders");
        assert_eq!(config.inventory_queue, "inventory-events");
        assert_eq!(config.list_take, 25);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            BackofficeConfig::from_lookup(lookup(&[(ENV_INVENTORY_QUEUE, "  ")])),
            Err(ConfigError::Blank {
                key: ENV_INVENTORY_QUEUE
            })
        );
        assert!(matches!(
            BackofficeConfig::from_lookup(lookup(&[(ENV_LIST_TAKE, "0")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            BackofficeConfig::from_lookup(lookup(&[(ENV_DEFAULT_CURRENCY, "RAND")])),
            Err(ConfigError::InvalidCurrency { .. })
        ));
    }
}

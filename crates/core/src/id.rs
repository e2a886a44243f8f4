//! Two-part entity keys (partition + row).

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Composite key addressing an entity within a collection.
///
/// The partition groups related rows for range access; the row is unique
/// within its partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    partition: String,
    row: String,
}

impl EntityKey {
    pub fn new(partition: impl Into<String>, row: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            row: row.into(),
        }
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn row(&self) -> &str {
        &self.row
    }
}

/// Generate a fresh, globally unique row key.
///
/// Uses UUIDv7 (time-ordered) rendered without hyphens.
pub fn new_row_key() -> String {
    Uuid::now_v7().simple().to_string()
}

impl core::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.partition, self.row)
    }
}

impl FromStr for EntityKey {
    type Err = DomainError;

    /// Parse the `partition/row` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (partition, row) = s
            .split_once('/')
            .ok_or_else(|| DomainError::invalid_key(format!("EntityKey: missing '/' in {s:?}")))?;

        if partition.is_empty() || row.is_empty() {
            return Err(DomainError::invalid_key(format!(
                "EntityKey: empty partition or row in {s:?}"
            )));
        }

        Ok(Self::new(partition, row))
    }
}

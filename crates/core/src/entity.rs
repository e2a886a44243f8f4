//! Entity trait: identity + continuity across state changes.

use crate::id::EntityKey;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Returns the entity's composite key.
    fn key(&self) -> &EntityKey;
}

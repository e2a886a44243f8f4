//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**; two instances with the same attribute
/// values are equal. `Money { minor_units: 2500, currency: "ZAR" }` is a value
/// object, a `Customer` keyed by `(partition, row)` is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

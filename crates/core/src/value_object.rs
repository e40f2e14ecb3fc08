//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. `Coins`
/// and `Username` are value objects; an `Account` is an entity, because two
/// accounts with equal balances are still different accounts.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

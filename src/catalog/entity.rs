//! `EntityId`: a strong, zero-cost handle for exchange-store entities
//!
//! Every entity in the exchange model (element block, node set, side set,
//! numbering map, assembly, ...) is identified by a user-assigned integer id.
//! Ids are unique only within their entity kind, and the format places no
//! restriction on their value: zero and negative ids are legal.
//!
//! This module provides:
//! - A transparent `EntityId` newtype around `i64` for zero-cost layout
//!   guarantees at the serialization boundary.
//! - Implementations of common traits (`Debug`, `Display`, ordering,
//!   hashing) so `EntityId` can be used in maps, sets, and printed easily.

use std::fmt;

/// User-assigned entity identifier, unique within one [`EntityKind`].
///
/// # Memory layout
/// This type is `repr(transparent)`, meaning it has the same ABI and
/// alignment as its single field (`i64`).
///
/// [`EntityKind`]: crate::catalog::EntityKind
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct EntityId(i64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `i64` value.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        EntityId(raw)
    }

    /// Returns the inner `i64` value of this `EntityId`.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntityId {
    #[inline]
    fn from(raw: i64) -> Self {
        EntityId(raw)
    }
}

/// Custom `Debug` implementation to display as `EntityId(raw_value)`.
impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityId").field(&self.0).finish()
    }
}

/// Prints the numeric id without any wrapper text.
impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_get() {
        let id = EntityId::new(42);
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn zero_and_negative_are_legal() {
        assert_eq!(EntityId::new(0).get(), 0);
        assert_eq!(EntityId::new(-7).get(), -7);
    }

    #[test]
    fn debug_and_display() {
        let id = EntityId::new(7);
        assert_eq!(format!("{:?}", id), "EntityId(7)");
        assert_eq!(format!("{}", id), "7");
    }

    #[test]
    fn ordering_and_hash() {
        let a = EntityId::new(1);
        let b = EntityId::new(2);
        assert!(a < b);
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn json_roundtrip() {
        let id = EntityId::new(123);
        let s = serde_json::to_string(&id).unwrap();
        let back: EntityId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, id);
    }
}

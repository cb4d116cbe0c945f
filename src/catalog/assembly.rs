//! Assembly entities: named, typed groupings of other entities.
//!
//! An assembly holds an ordered list of member ids, all of one stated kind.
//! Members may themselves be assemblies, which yields a nesting hierarchy.
//! Aggregated results over an assembly live in its reduction-variable
//! family (see [`crate::vars`]), not per member.

use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use crate::records::bound_name;
use serde::{Deserialize, Serialize};

/// Payload of one assembly entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyData {
    /// Display name, bounded like any entity name.
    pub name: String,
    /// Kind of every member id in `members`.
    pub member_kind: EntityKind,
    /// Ordered member ids, each referencing an entity of `member_kind`.
    pub members: Vec<EntityId>,
}

impl AssemblyData {
    /// Builds an assembly payload, truncating an oversized name.
    pub fn new(name: &str, member_kind: EntityKind, members: Vec<EntityId>) -> Self {
        Self {
            name: bound_name(name, "assembly name"),
            member_kind,
            members,
        }
    }

    /// Whether this assembly nests other assemblies.
    #[inline]
    pub fn is_nested(&self) -> bool {
        self.member_kind == EntityKind::Assembly
    }
}

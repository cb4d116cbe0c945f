//! Entity catalog: id↔index bijection, names, and properties per kind.
//!
//! Every entity kind owns an independent id namespace. Within a kind, the
//! catalog maintains the registered ids in creation order (the 1-based
//! *index*), a constant-time id→index lookup, bounded-length names, and
//! named integer properties. The same generic catalog serves all kinds,
//! replacing the per-kind parallel arrays of the historic library.

pub mod assembly;
pub mod entity;

use crate::exchange_error::MeshExchangeError;
use crate::records::bound_name;
use entity::EntityId;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Closed enumeration of entity kinds in the exchange model.
///
/// Each kind has a fixed cardinality source in the schema and its own id
/// namespace; ids are unique *within* a kind, not globally.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EntityKind {
    ElementBlock,
    NodeSet,
    SideSet,
    EdgeBlock,
    EdgeSet,
    FaceBlock,
    FaceSet,
    ElementSet,
    ElementMap,
    NodeMap,
    EdgeMap,
    FaceMap,
    Global,
    Nodal,
    Assembly,
}

impl EntityKind {
    /// All kinds, in a stable order used for deterministic replay.
    pub const ALL: [EntityKind; 15] = [
        EntityKind::ElementBlock,
        EntityKind::NodeSet,
        EntityKind::SideSet,
        EntityKind::EdgeBlock,
        EntityKind::EdgeSet,
        EntityKind::FaceBlock,
        EntityKind::FaceSet,
        EntityKind::ElementSet,
        EntityKind::ElementMap,
        EntityKind::NodeMap,
        EntityKind::EdgeMap,
        EntityKind::FaceMap,
        EntityKind::Global,
        EntityKind::Nodal,
        EntityKind::Assembly,
    ];

    /// Kinds that hold connectivity (element/edge/face blocks).
    #[inline]
    pub fn is_block(self) -> bool {
        matches!(
            self,
            EntityKind::ElementBlock | EntityKind::EdgeBlock | EntityKind::FaceBlock
        )
    }

    /// Kinds that hold membership lists and distribution factors.
    #[inline]
    pub fn is_set(self) -> bool {
        matches!(
            self,
            EntityKind::NodeSet
                | EntityKind::SideSet
                | EntityKind::EdgeSet
                | EntityKind::FaceSet
                | EntityKind::ElementSet
        )
    }

    /// Kinds that hold renumbering maps.
    #[inline]
    pub fn is_map(self) -> bool {
        matches!(
            self,
            EntityKind::ElementMap | EntityKind::NodeMap | EntityKind::EdgeMap | EntityKind::FaceMap
        )
    }

    /// Kinds registered in the catalog (everything but the implicit
    /// Global/Nodal singletons).
    #[inline]
    pub fn is_cataloged(self) -> bool {
        !matches!(self, EntityKind::Global | EntityKind::Nodal)
    }

    /// Kinds that may carry a field-variable family.
    #[inline]
    pub fn has_variables(self) -> bool {
        self.is_block() || self.is_set() || matches!(self, EntityKind::Global | EntityKind::Nodal)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::ElementBlock => "element block",
            EntityKind::NodeSet => "node set",
            EntityKind::SideSet => "side set",
            EntityKind::EdgeBlock => "edge block",
            EntityKind::EdgeSet => "edge set",
            EntityKind::FaceBlock => "face block",
            EntityKind::FaceSet => "face set",
            EntityKind::ElementSet => "element set",
            EntityKind::ElementMap => "element map",
            EntityKind::NodeMap => "node map",
            EntityKind::EdgeMap => "edge map",
            EntityKind::FaceMap => "face map",
            EntityKind::Global => "global",
            EntityKind::Nodal => "nodal",
            EntityKind::Assembly => "assembly",
        };
        f.write_str(name)
    }
}

/// Named integer property column over one kind's entities.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PropertyColumn {
    name: String,
    /// One value per registered entity, in index order.
    values: Vec<i64>,
}

/// Per-kind registry: ids in index order plus the derived lookup table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct KindCatalog {
    /// Registered ids; position `i` is index `i + 1`.
    ids: Vec<EntityId>,
    /// Entity names, parallel to `ids`; empty string when unnamed.
    names: Vec<String>,
    /// Stored property columns (the implicit "ID" column is derived).
    properties: Vec<PropertyColumn>,
    /// id → 0-based position; rebuilt after deserialization.
    #[serde(skip, default)]
    index: HashMap<EntityId, usize>,
}

impl KindCatalog {
    fn rebuild_index(&mut self) {
        self.index = self
            .ids
            .iter()
            .enumerate()
            .map(|(pos, &id)| (id, pos))
            .collect();
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        self.index.get(&id).copied()
    }
}

/// Ordered (id, index, name) registry for every cataloged entity kind.
///
/// # Invariants
///
/// - Within a kind, ids are unique; `index` and `ids` always agree.
/// - `names` has the same length as `ids`.
/// - Registration is atomic: a failed bulk definition leaves the kind
///   untouched, so a half-registered entity is never observable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityCatalog {
    kinds: BTreeMap<EntityKind, KindCatalog>,
}

impl EntityCatalog {
    /// Bulk-registers a kind's id list in index order.
    ///
    /// `expected` is the kind's count from the schema; a different list
    /// length fails with `CardinalityMismatch`. Re-defining an already
    /// populated kind with the identical list is a no-op; any other
    /// redefinition fails.
    pub fn define_entities(
        &mut self,
        kind: EntityKind,
        ids: &[EntityId],
        expected: usize,
    ) -> Result<(), MeshExchangeError> {
        if ids.len() != expected {
            return Err(MeshExchangeError::CardinalityMismatch {
                kind,
                expected,
                found: ids.len(),
            });
        }
        if let Some(existing) = self.kinds.get(&kind) {
            if !existing.ids.is_empty() {
                if existing.ids == ids {
                    return Ok(());
                }
                return Err(MeshExchangeError::EntityListLocked(kind));
            }
        }
        // Build the replacement fully before committing it.
        let mut fresh = KindCatalog {
            ids: ids.to_vec(),
            names: vec![String::new(); ids.len()],
            properties: Vec::new(),
            index: HashMap::with_capacity(ids.len()),
        };
        for (pos, &id) in ids.iter().enumerate() {
            if fresh.index.insert(id, pos).is_some() {
                return Err(MeshExchangeError::DuplicateEntityId { kind, id });
            }
        }
        self.kinds.insert(kind, fresh);
        Ok(())
    }

    /// Registers a single entity, appending it at the next index.
    ///
    /// `limit` is the kind's schema count; registering past it fails with
    /// `CardinalityMismatch`.
    pub fn register(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        limit: usize,
    ) -> Result<usize, MeshExchangeError> {
        let entry = self.kinds.entry(kind).or_default();
        if entry.position(id).is_some() {
            return Err(MeshExchangeError::DuplicateEntityId { kind, id });
        }
        if entry.ids.len() >= limit {
            return Err(MeshExchangeError::CardinalityMismatch {
                kind,
                expected: limit,
                found: entry.ids.len() + 1,
            });
        }
        let pos = entry.ids.len();
        entry.ids.push(id);
        entry.names.push(String::new());
        for column in &mut entry.properties {
            column.values.push(0);
        }
        entry.index.insert(id, pos);
        Ok(pos + 1)
    }

    /// Resolves an id to its 1-based storage index within `kind`.
    pub fn resolve_index(&self, kind: EntityKind, id: EntityId) -> Result<usize, MeshExchangeError> {
        self.kinds
            .get(&kind)
            .and_then(|c| c.position(id))
            .map(|pos| pos + 1)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })
    }

    /// Whether `id` is registered under `kind`.
    #[inline]
    pub fn contains(&self, kind: EntityKind, id: EntityId) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|c| c.position(id).is_some())
    }

    /// Registered ids of `kind` in index order.
    pub fn ids(&self, kind: EntityKind) -> &[EntityId] {
        self.kinds.get(&kind).map(|c| c.ids.as_slice()).unwrap_or(&[])
    }

    /// Number of registered entities of `kind`.
    #[inline]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.kinds.get(&kind).map_or(0, |c| c.ids.len())
    }

    /// Returns the bounded-length name of an entity (empty when unnamed).
    pub fn name(&self, kind: EntityKind, id: EntityId) -> Result<&str, MeshExchangeError> {
        let catalog = self
            .kinds
            .get(&kind)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        let pos = catalog
            .position(id)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        Ok(&catalog.names[pos])
    }

    /// Names of all entities of `kind` in index order.
    pub fn names(&self, kind: EntityKind) -> Vec<String> {
        self.kinds
            .get(&kind)
            .map(|c| c.names.clone())
            .unwrap_or_default()
    }

    /// Assigns a bounded-length name; duplicates across entities are allowed.
    pub fn set_name(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        name: &str,
    ) -> Result<(), MeshExchangeError> {
        let catalog = self
            .kinds
            .get_mut(&kind)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        let pos = catalog
            .position(id)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        catalog.names[pos] = bound_name(name, "entity name");
        Ok(())
    }

    /// Stores an integer property value for one entity.
    ///
    /// Creates the property column zero-filled on first use.
    pub fn put_property(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        property: &str,
        value: i64,
    ) -> Result<(), MeshExchangeError> {
        let catalog = self
            .kinds
            .get_mut(&kind)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        let pos = catalog
            .position(id)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        let bounded = bound_name(property, "property name");
        let entity_count = catalog.ids.len();
        let column = match catalog.properties.iter().position(|c| c.name == bounded) {
            Some(existing) => existing,
            None => {
                catalog.properties.push(PropertyColumn {
                    name: bounded,
                    values: vec![0; entity_count],
                });
                catalog.properties.len() - 1
            }
        };
        catalog.properties[column].values[pos] = value;
        Ok(())
    }

    /// Reads an integer property value for one entity.
    ///
    /// The implicit `ID` property answers with the entity's own id.
    pub fn get_property(
        &self,
        kind: EntityKind,
        id: EntityId,
        property: &str,
    ) -> Result<i64, MeshExchangeError> {
        let catalog = self
            .kinds
            .get(&kind)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        let pos = catalog
            .position(id)
            .ok_or(MeshExchangeError::UnknownEntityId { kind, id })?;
        if let Some(column) = catalog.properties.iter().find(|c| c.name == property) {
            return Ok(column.values[pos]);
        }
        if property == "ID" {
            return Ok(id.get());
        }
        Err(MeshExchangeError::UnknownMetric(property.to_string()))
    }

    /// Property names defined for `kind`, the implicit `ID` column first.
    pub fn property_names(&self, kind: EntityKind) -> Vec<String> {
        let mut names = vec!["ID".to_string()];
        if let Some(catalog) = self.kinds.get(&kind) {
            names.extend(catalog.properties.iter().map(|c| c.name.clone()));
        }
        names
    }

    /// Rebuilds the id→index lookup tables after deserialization.
    pub(crate) fn rehydrate(&mut self) {
        for catalog in self.kinds.values_mut() {
            catalog.rebuild_index();
        }
    }

    /// Checks the id↔index bijection and parallel-array invariants.
    pub fn validate_invariants(&self) -> Result<(), MeshExchangeError> {
        for (&kind, catalog) in &self.kinds {
            if catalog.names.len() != catalog.ids.len() {
                return Err(MeshExchangeError::ShapeMismatch {
                    context: "catalog name table",
                    expected: catalog.ids.len(),
                    found: catalog.names.len(),
                });
            }
            if catalog.index.len() != catalog.ids.len() {
                let dup = catalog
                    .ids
                    .iter()
                    .enumerate()
                    .find(|&(pos, id)| catalog.position(*id) != Some(pos))
                    .map(|(_, &id)| id)
                    .unwrap_or(EntityId::new(0));
                return Err(MeshExchangeError::DuplicateEntityId { kind, id: dup });
            }
            for column in &catalog.properties {
                if column.values.len() != catalog.ids.len() {
                    return Err(MeshExchangeError::ShapeMismatch {
                        context: "catalog property column",
                        expected: catalog.ids.len(),
                        found: column.values.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw)
    }

    #[test]
    fn define_and_resolve() {
        let mut catalog = EntityCatalog::default();
        catalog
            .define_entities(EntityKind::ElementBlock, &[eid(10), eid(20), eid(30)], 3)
            .unwrap();
        assert_eq!(
            catalog.resolve_index(EntityKind::ElementBlock, eid(10)).unwrap(),
            1
        );
        assert_eq!(
            catalog.resolve_index(EntityKind::ElementBlock, eid(30)).unwrap(),
            3
        );
        assert_eq!(catalog.count(EntityKind::ElementBlock), 3);
    }

    #[test]
    fn cardinality_mismatch_rejected() {
        let mut catalog = EntityCatalog::default();
        let err = catalog
            .define_entities(EntityKind::NodeSet, &[eid(1), eid(2)], 3)
            .unwrap_err();
        assert_eq!(
            err,
            MeshExchangeError::CardinalityMismatch {
                kind: EntityKind::NodeSet,
                expected: 3,
                found: 2
            }
        );
        // Nothing was committed.
        assert_eq!(catalog.count(EntityKind::NodeSet), 0);
    }

    #[test]
    fn duplicate_id_rejected_atomically() {
        let mut catalog = EntityCatalog::default();
        let err = catalog
            .define_entities(EntityKind::SideSet, &[eid(5), eid(5)], 2)
            .unwrap_err();
        assert_eq!(
            err,
            MeshExchangeError::DuplicateEntityId {
                kind: EntityKind::SideSet,
                id: eid(5)
            }
        );
        assert_eq!(catalog.count(EntityKind::SideSet), 0);
        assert!(catalog.resolve_index(EntityKind::SideSet, eid(5)).is_err());
    }

    #[test]
    fn identical_redefinition_is_noop() {
        let mut catalog = EntityCatalog::default();
        catalog
            .define_entities(EntityKind::NodeSet, &[eid(7), eid(8)], 2)
            .unwrap();
        catalog
            .define_entities(EntityKind::NodeSet, &[eid(7), eid(8)], 2)
            .unwrap();
        assert_eq!(catalog.count(EntityKind::NodeSet), 2);
    }

    #[test]
    fn incremental_registration_respects_limit() {
        let mut catalog = EntityCatalog::default();
        assert_eq!(catalog.register(EntityKind::ElementBlock, eid(1), 2).unwrap(), 1);
        assert_eq!(catalog.register(EntityKind::ElementBlock, eid(2), 2).unwrap(), 2);
        let err = catalog.register(EntityKind::ElementBlock, eid(3), 2).unwrap_err();
        assert!(matches!(err, MeshExchangeError::CardinalityMismatch { .. }));
    }

    #[test]
    fn same_id_in_two_kinds_is_legal() {
        let mut catalog = EntityCatalog::default();
        catalog.register(EntityKind::ElementBlock, eid(1), 1).unwrap();
        catalog.register(EntityKind::NodeSet, eid(1), 1).unwrap();
        assert_eq!(catalog.resolve_index(EntityKind::ElementBlock, eid(1)).unwrap(), 1);
        assert_eq!(catalog.resolve_index(EntityKind::NodeSet, eid(1)).unwrap(), 1);
    }

    #[test]
    fn names_bounded_and_duplicable() {
        let mut catalog = EntityCatalog::default();
        catalog.register(EntityKind::NodeSet, eid(1), 2).unwrap();
        catalog.register(EntityKind::NodeSet, eid(2), 2).unwrap();
        catalog.set_name(EntityKind::NodeSet, eid(1), "inlet").unwrap();
        catalog.set_name(EntityKind::NodeSet, eid(2), "inlet").unwrap();
        assert_eq!(catalog.name(EntityKind::NodeSet, eid(1)).unwrap(), "inlet");
        assert_eq!(catalog.name(EntityKind::NodeSet, eid(2)).unwrap(), "inlet");
    }

    #[test]
    fn properties_default_id_column() {
        let mut catalog = EntityCatalog::default();
        catalog.register(EntityKind::ElementBlock, eid(10), 1).unwrap();
        assert_eq!(catalog.property_names(EntityKind::ElementBlock), vec!["ID"]);
        assert_eq!(
            catalog.get_property(EntityKind::ElementBlock, eid(10), "ID").unwrap(),
            10
        );
        catalog
            .put_property(EntityKind::ElementBlock, eid(10), "MATERIAL", 7)
            .unwrap();
        assert_eq!(
            catalog
                .get_property(EntityKind::ElementBlock, eid(10), "MATERIAL")
                .unwrap(),
            7
        );
        assert_eq!(
            catalog.property_names(EntityKind::ElementBlock),
            vec!["ID", "MATERIAL"]
        );
    }

    #[test]
    fn serde_roundtrip_rebuilds_index() {
        let mut catalog = EntityCatalog::default();
        catalog
            .define_entities(EntityKind::ElementBlock, &[eid(10), eid(20)], 2)
            .unwrap();
        let ser = serde_json::to_string(&catalog).expect("serialize");
        let mut back: EntityCatalog = serde_json::from_str(&ser).expect("deserialize");
        back.rehydrate();
        assert_eq!(back.resolve_index(EntityKind::ElementBlock, eid(20)).unwrap(), 2);
        back.validate_invariants().unwrap();
    }
}

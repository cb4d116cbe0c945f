//! Bulk data store: large arrays keyed by (entity kind, entity id).
//!
//! Coordinates, connectivity, set membership, distribution factors, and
//! numbering maps live here. The store validates shapes against the
//! declared schema; the owning [`Store`] is responsible for catalog checks
//! (an array can only be written once its entity is registered) and for
//! applying the width/precision policy before delegating.
//!
//! [`Store`]: crate::store::Store

pub mod blocks;
pub mod coordinates;
pub mod maps;
pub mod sets;

use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use crate::exchange_error::MeshExchangeError;
use blocks::{BlockData, BlockParams};
use coordinates::CoordinateSet;
use maps::NumberingMaps;
use serde::{Deserialize, Serialize};
use sets::{SetData, SetParams};
use std::collections::BTreeMap;

/// Aggregate bulk storage for one store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BulkStore {
    coordinates: CoordinateSet,
    maps: NumberingMaps,
    blocks: BTreeMap<(EntityKind, EntityId), BlockData>,
    sets: BTreeMap<(EntityKind, EntityId), SetData>,
}

impl BulkStore {
    /// Fresh bulk storage sized from the schema's global counts.
    pub fn new(num_dim: usize, num_nodes: usize, num_elem: usize) -> Self {
        Self {
            coordinates: CoordinateSet::new(num_dim, num_nodes),
            maps: NumberingMaps::new(num_nodes, num_elem),
            blocks: BTreeMap::new(),
            sets: BTreeMap::new(),
        }
    }

    /// Coordinate storage.
    #[inline]
    pub fn coordinates(&self) -> &CoordinateSet {
        &self.coordinates
    }

    /// Mutable coordinate storage.
    #[inline]
    pub fn coordinates_mut(&mut self) -> &mut CoordinateSet {
        &mut self.coordinates
    }

    /// Numbering maps.
    #[inline]
    pub fn maps(&self) -> &NumberingMaps {
        &self.maps
    }

    /// Mutable numbering maps.
    #[inline]
    pub fn maps_mut(&mut self) -> &mut NumberingMaps {
        &mut self.maps
    }

    /// Creates storage for a newly registered block.
    pub fn insert_block(&mut self, kind: EntityKind, id: EntityId, params: BlockParams) {
        self.blocks.insert((kind, id), BlockData::new(params));
    }

    /// Block payloads for a registered block.
    pub fn block(&self, kind: EntityKind, id: EntityId) -> Result<&BlockData, MeshExchangeError> {
        self.blocks
            .get(&(kind, id))
            .ok_or(MeshExchangeError::EntityNotDefined { kind, id })
    }

    /// Mutable block payloads for a registered block.
    pub fn block_mut(
        &mut self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<&mut BlockData, MeshExchangeError> {
        self.blocks
            .get_mut(&(kind, id))
            .ok_or(MeshExchangeError::EntityNotDefined { kind, id })
    }

    /// Creates storage for a newly registered set.
    pub fn insert_set(&mut self, kind: EntityKind, id: EntityId, params: SetParams) {
        self.sets.insert((kind, id), SetData::new(params));
    }

    /// Set payloads for a registered set.
    pub fn set(&self, kind: EntityKind, id: EntityId) -> Result<&SetData, MeshExchangeError> {
        self.sets
            .get(&(kind, id))
            .ok_or(MeshExchangeError::EntityNotDefined { kind, id })
    }

    /// Mutable set payloads for a registered set.
    pub fn set_mut(
        &mut self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<&mut SetData, MeshExchangeError> {
        self.sets
            .get_mut(&(kind, id))
            .ok_or(MeshExchangeError::EntityNotDefined { kind, id })
    }

    /// Total membership length across all sets of `kind`.
    pub fn total_set_entries(&self, kind: EntityKind) -> usize {
        self.sets
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, data)| data.params().entry_count)
            .sum()
    }

    /// Total distribution-factor length across all sets of `kind`.
    pub fn total_set_dist_factors(&self, kind: EntityKind) -> usize {
        self.sets
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, data)| data.expected_dist_factor_len())
            .sum()
    }

    /// Total incident-node count across all side sets (the concatenated
    /// side-set node list length).
    pub fn total_side_set_nodes(&self) -> usize {
        self.sets
            .iter()
            .filter(|((k, _), _)| *k == EntityKind::SideSet)
            .map(|(_, data)| {
                data.node_counts()
                    .map(|counts| counts.iter().map(|&c| c.max(0) as usize).sum())
                    .unwrap_or(0)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(raw: i64) -> EntityId {
        EntityId::new(raw)
    }

    #[test]
    fn block_access_requires_definition() {
        let mut bulk = BulkStore::new(3, 4, 1);
        let err = bulk.block(EntityKind::ElementBlock, eid(10)).unwrap_err();
        assert_eq!(
            err,
            MeshExchangeError::EntityNotDefined {
                kind: EntityKind::ElementBlock,
                id: eid(10)
            }
        );
        bulk.insert_block(
            EntityKind::ElementBlock,
            eid(10),
            BlockParams {
                topology: "TET4".into(),
                entry_count: 1,
                nodes_per_entry: 4,
                attribute_count: 0,
            },
        );
        assert!(bulk.block(EntityKind::ElementBlock, eid(10)).is_ok());
    }

    #[test]
    fn concat_lengths() {
        let mut bulk = BulkStore::new(2, 6, 2);
        bulk.insert_set(
            EntityKind::NodeSet,
            eid(1),
            SetParams {
                entry_count: 4,
                dist_factor_count: 4,
            },
        );
        bulk.insert_set(
            EntityKind::NodeSet,
            eid(2),
            SetParams {
                entry_count: 2,
                dist_factor_count: 0,
            },
        );
        assert_eq!(bulk.total_set_entries(EntityKind::NodeSet), 6);
        assert_eq!(bulk.total_set_dist_factors(EntityKind::NodeSet), 4);
    }
}

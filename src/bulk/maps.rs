//! Numbering maps: node/element id maps, the element order map, and
//! catalog-registered map entities.
//!
//! The id maps translate internal 1-based indices to application numbering.
//! When never written, they read back as the identity map, matching the
//! historic default.

use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use crate::exchange_error::MeshExchangeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity numbering `1..=len`.
fn identity(len: usize) -> Vec<i64> {
    (1..=len as i64).collect()
}

/// Store-wide numbering maps plus named per-kind map entities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NumberingMaps {
    num_nodes: usize,
    num_elem: usize,
    node_id_map: Option<Vec<i64>>,
    elem_id_map: Option<Vec<i64>>,
    elem_order_map: Option<Vec<i64>>,
    /// Values of catalog-registered map entities, keyed by (kind, id).
    named: BTreeMap<(EntityKind, EntityId), Vec<i64>>,
}

impl NumberingMaps {
    /// Fresh map storage for the schema's node and element counts.
    pub fn new(num_nodes: usize, num_elem: usize) -> Self {
        Self {
            num_nodes,
            num_elem,
            ..Default::default()
        }
    }

    fn check_len(
        values: &[i64],
        expected: usize,
        context: &'static str,
    ) -> Result<(), MeshExchangeError> {
        if values.len() != expected {
            return Err(MeshExchangeError::ShapeMismatch {
                context,
                expected,
                found: values.len(),
            });
        }
        Ok(())
    }

    /// Stores the node id map (length `num_nodes`).
    pub fn put_node_id_map(&mut self, values: &[i64]) -> Result<(), MeshExchangeError> {
        Self::check_len(values, self.num_nodes, "node id map")?;
        self.node_id_map = Some(values.to_vec());
        Ok(())
    }

    /// Node id map; identity when never written.
    pub fn node_id_map(&self) -> Vec<i64> {
        self.node_id_map
            .clone()
            .unwrap_or_else(|| identity(self.num_nodes))
    }

    /// Stores the element id map (length `num_elem`).
    pub fn put_elem_id_map(&mut self, values: &[i64]) -> Result<(), MeshExchangeError> {
        Self::check_len(values, self.num_elem, "element id map")?;
        self.elem_id_map = Some(values.to_vec());
        Ok(())
    }

    /// Element id map; identity when never written.
    pub fn elem_id_map(&self) -> Vec<i64> {
        self.elem_id_map
            .clone()
            .unwrap_or_else(|| identity(self.num_elem))
    }

    /// Stores the element order map (optimizer ordering, length `num_elem`).
    pub fn put_elem_order_map(&mut self, values: &[i64]) -> Result<(), MeshExchangeError> {
        Self::check_len(values, self.num_elem, "element order map")?;
        self.elem_order_map = Some(values.to_vec());
        Ok(())
    }

    /// Element order map; identity when never written.
    pub fn elem_order_map(&self) -> Vec<i64> {
        self.elem_order_map
            .clone()
            .unwrap_or_else(|| identity(self.num_elem))
    }

    /// Expected value count for a map entity of `kind`.
    pub fn entity_map_len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::NodeMap => self.num_nodes,
            EntityKind::ElementMap => self.num_elem,
            // Edge/face map lengths are validated by the store against the
            // schema's edge/face counts.
            _ => 0,
        }
    }

    /// Stores a catalog-registered map entity's values.
    pub fn put_entity_map(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        values: &[i64],
        expected: usize,
    ) -> Result<(), MeshExchangeError> {
        Self::check_len(values, expected, "map entity values")?;
        self.named.insert((kind, id), values.to_vec());
        Ok(())
    }

    /// A map entity's values; identity of `expected` length until written.
    pub fn entity_map(&self, kind: EntityKind, id: EntityId, expected: usize) -> Vec<i64> {
        self.named
            .get(&(kind, id))
            .cloned()
            .unwrap_or_else(|| identity(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_defaults() {
        let maps = NumberingMaps::new(4, 2);
        assert_eq!(maps.node_id_map(), vec![1, 2, 3, 4]);
        assert_eq!(maps.elem_id_map(), vec![1, 2]);
        assert_eq!(maps.elem_order_map(), vec![1, 2]);
    }

    #[test]
    fn lengths_enforced() {
        let mut maps = NumberingMaps::new(3, 1);
        assert!(maps.put_node_id_map(&[10, 20]).is_err());
        maps.put_node_id_map(&[10, 20, 30]).unwrap();
        assert_eq!(maps.node_id_map(), vec![10, 20, 30]);
        maps.put_elem_id_map(&[99]).unwrap();
        assert_eq!(maps.elem_id_map(), vec![99]);
    }

    #[test]
    fn named_map_entities() {
        let mut maps = NumberingMaps::new(3, 1);
        let id = EntityId::new(1);
        assert_eq!(maps.entity_map(EntityKind::NodeMap, id, 3), vec![1, 2, 3]);
        maps.put_entity_map(EntityKind::NodeMap, id, &[3, 1, 2], 3)
            .unwrap();
        assert_eq!(maps.entity_map(EntityKind::NodeMap, id, 3), vec![3, 1, 2]);
    }
}

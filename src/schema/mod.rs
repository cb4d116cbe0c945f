//! Schema/dimensions manager: global counts and the width/precision policy.
//!
//! The schema owns every global cardinality of the store (dimension, node
//! and element counts, per-kind entity counts) and is the leaf component
//! everything else depends on: the catalog checks registration against the
//! schema's counts, and bulk arrays are validated against them.

pub mod inquiry;
pub mod policy;

use crate::catalog::EntityKind;
use crate::exchange_error::MeshExchangeError;
use serde::{Deserialize, Serialize};

/// Global counts consumed by [`Schema::initialize`].
///
/// This is an explicit configuration struct passed by value; it replaces the
/// ABI-fixed parameter block of the historic interface. Counts are unsigned,
/// so negative values are unrepresentable by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    pub num_dim: usize,
    pub num_nodes: usize,
    pub num_elem: usize,
    pub num_elem_blk: usize,
    pub num_node_sets: usize,
    pub num_side_sets: usize,
    pub num_edge: usize,
    pub num_edge_blk: usize,
    pub num_edge_sets: usize,
    pub num_face: usize,
    pub num_face_blk: usize,
    pub num_face_sets: usize,
    pub num_elem_sets: usize,
    pub num_node_maps: usize,
    pub num_edge_maps: usize,
    pub num_face_maps: usize,
    pub num_elem_maps: usize,
    pub num_assembly: usize,
}

/// Dimension/count registry for one open store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    params: InitParams,
    initialized: bool,
}

impl Schema {
    /// Consumes the global counts; exactly one successful call per store
    /// created in write mode.
    ///
    /// # Errors
    /// `InvalidDimension` if `num_dim` is not in {1,2,3};
    /// `AlreadyInitialized` on a second call.
    pub fn initialize(&mut self, params: InitParams) -> Result<(), MeshExchangeError> {
        if self.initialized {
            return Err(MeshExchangeError::AlreadyInitialized);
        }
        if !(1..=3).contains(&params.num_dim) {
            return Err(MeshExchangeError::InvalidDimension(params.num_dim));
        }
        self.params = params;
        self.initialized = true;
        Ok(())
    }

    /// Whether dimensions have been set on this handle.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The initialized counts.
    ///
    /// # Errors
    /// `NotInitialized` before the first successful [`initialize`](Self::initialize).
    pub fn params(&self) -> Result<&InitParams, MeshExchangeError> {
        if !self.initialized {
            return Err(MeshExchangeError::NotInitialized);
        }
        Ok(&self.params)
    }

    /// Fixed cardinality source for each entity kind.
    ///
    /// Global and Nodal are degenerate kinds with exactly one implicit
    /// entity each.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::ElementBlock => self.params.num_elem_blk,
            EntityKind::NodeSet => self.params.num_node_sets,
            EntityKind::SideSet => self.params.num_side_sets,
            EntityKind::EdgeBlock => self.params.num_edge_blk,
            EntityKind::EdgeSet => self.params.num_edge_sets,
            EntityKind::FaceBlock => self.params.num_face_blk,
            EntityKind::FaceSet => self.params.num_face_sets,
            EntityKind::ElementSet => self.params.num_elem_sets,
            EntityKind::ElementMap => self.params.num_elem_maps,
            EntityKind::NodeMap => self.params.num_node_maps,
            EntityKind::EdgeMap => self.params.num_edge_maps,
            EntityKind::FaceMap => self.params.num_face_maps,
            EntityKind::Global | EntityKind::Nodal => 1,
            EntityKind::Assembly => self.params.num_assembly,
        }
    }

    /// Spatial dimension (1–3).
    #[inline]
    pub fn num_dim(&self) -> usize {
        self.params.num_dim
    }

    /// Number of nodes in the mesh.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.params.num_nodes
    }

    /// Number of elements across all blocks.
    #[inline]
    pub fn num_elem(&self) -> usize {
        self.params.num_elem
    }

    /// Number of edges across all edge blocks.
    #[inline]
    pub fn num_edge(&self) -> usize {
        self.params.num_edge
    }

    /// Number of faces across all face blocks.
    #[inline]
    pub fn num_face(&self) -> usize {
        self.params.num_face
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_once() {
        let mut schema = Schema::default();
        schema
            .initialize(InitParams {
                num_dim: 3,
                num_nodes: 8,
                num_elem: 1,
                num_elem_blk: 1,
                ..Default::default()
            })
            .unwrap();
        assert!(schema.is_initialized());
        assert_eq!(schema.num_dim(), 3);
        let err = schema.initialize(InitParams::default()).unwrap_err();
        assert_eq!(err, MeshExchangeError::AlreadyInitialized);
    }

    #[test]
    fn dimension_must_be_1_to_3() {
        let mut schema = Schema::default();
        let err = schema
            .initialize(InitParams {
                num_dim: 0,
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, MeshExchangeError::InvalidDimension(0));
        let err = schema
            .initialize(InitParams {
                num_dim: 4,
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, MeshExchangeError::InvalidDimension(4));
        // Failed attempts do not consume the one-shot.
        schema
            .initialize(InitParams {
                num_dim: 2,
                ..Default::default()
            })
            .unwrap();
    }

    #[test]
    fn counts_by_kind() {
        let mut schema = Schema::default();
        schema
            .initialize(InitParams {
                num_dim: 2,
                num_elem_blk: 4,
                num_node_sets: 2,
                num_assembly: 1,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(schema.count(EntityKind::ElementBlock), 4);
        assert_eq!(schema.count(EntityKind::NodeSet), 2);
        assert_eq!(schema.count(EntityKind::SideSet), 0);
        assert_eq!(schema.count(EntityKind::Assembly), 1);
        assert_eq!(schema.count(EntityKind::Global), 1);
        assert_eq!(schema.count(EntityKind::Nodal), 1);
    }

    #[test]
    fn params_before_initialize_fails() {
        let schema = Schema::default();
        assert_eq!(schema.params().unwrap_err(), MeshExchangeError::NotInitialized);
    }
}

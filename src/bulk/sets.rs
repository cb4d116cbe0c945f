//! Set storage: membership lists and distribution factors.
//!
//! A node/edge/face/element set is a flat membership list; a side set is a
//! pair of parallel lists (element, local side). Distribution factors attach
//! one weight per incident node: for side sets that is the *sum of per-side
//! node counts*, never the side count, and a zero-length factor array is a
//! valid "no weighting" sentinel rather than a mismatch.

use crate::exchange_error::MeshExchangeError;
use serde::{Deserialize, Serialize};

/// Declared shape of one set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetParams {
    /// Number of entries (nodes, sides, edges, faces, or elements).
    pub entry_count: usize,
    /// Declared distribution-factor count; 0 means unweighted.
    pub dist_factor_count: usize,
}

/// One set's bulk payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetData {
    params: SetParams,
    /// Membership list; for side sets, the element of each (element, side) pair.
    entries: Option<Vec<i64>>,
    /// Local side numbers, parallel to `entries` (side sets only).
    sides: Option<Vec<i64>>,
    /// Per-side incident node counts (side sets only).
    node_counts: Option<Vec<i64>>,
    dist_factors: Option<Vec<f64>>,
}

impl SetData {
    /// Fresh set storage for the declared shape.
    pub fn new(params: SetParams) -> Self {
        Self {
            params,
            entries: None,
            sides: None,
            node_counts: None,
            dist_factors: None,
        }
    }

    /// Declared shape.
    #[inline]
    pub fn params(&self) -> &SetParams {
        &self.params
    }

    /// Stores the membership list; `sides` must be given for side sets and
    /// run parallel to `entries`.
    pub fn put_entries(
        &mut self,
        entries: &[i64],
        sides: Option<&[i64]>,
    ) -> Result<(), MeshExchangeError> {
        if entries.len() != self.params.entry_count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "set membership",
                expected: self.params.entry_count,
                found: entries.len(),
            });
        }
        if let Some(sides) = sides {
            if sides.len() != entries.len() {
                return Err(MeshExchangeError::ShapeMismatch {
                    context: "side list",
                    expected: entries.len(),
                    found: sides.len(),
                });
            }
            self.sides = Some(sides.to_vec());
        }
        self.entries = Some(entries.to_vec());
        Ok(())
    }

    /// Membership list; zeros of the declared shape until written.
    pub fn entries(&self) -> Vec<i64> {
        match &self.entries {
            Some(entries) => entries.clone(),
            None => vec![0; self.params.entry_count],
        }
    }

    /// Local side numbers (side sets), zeros until written.
    pub fn sides(&self) -> Vec<i64> {
        match &self.sides {
            Some(sides) => sides.clone(),
            None => vec![0; self.params.entry_count],
        }
    }

    /// Declares the per-side incident node counts.
    pub fn put_node_counts(&mut self, counts: &[i64]) -> Result<(), MeshExchangeError> {
        if counts.len() != self.params.entry_count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "side node counts",
                expected: self.params.entry_count,
                found: counts.len(),
            });
        }
        self.node_counts = Some(counts.to_vec());
        Ok(())
    }

    /// Per-side incident node counts, when declared.
    #[inline]
    pub fn node_counts(&self) -> Option<&[i64]> {
        self.node_counts.as_deref()
    }

    /// Expected distribution-factor length: the sum of per-side node counts
    /// when declared, otherwise the declared factor count.
    pub fn expected_dist_factor_len(&self) -> usize {
        match &self.node_counts {
            Some(counts) => counts.iter().map(|&c| c.max(0) as usize).sum(),
            None => self.params.dist_factor_count,
        }
    }

    /// Stores distribution factors.
    ///
    /// A zero-length array is the "no weighting" sentinel and always
    /// succeeds; any other length must match [`expected_dist_factor_len`].
    ///
    /// [`expected_dist_factor_len`]: Self::expected_dist_factor_len
    pub fn put_dist_factors(&mut self, factors: &[f64]) -> Result<(), MeshExchangeError> {
        if !factors.is_empty() {
            let expected = self.expected_dist_factor_len();
            if factors.len() != expected {
                return Err(MeshExchangeError::ShapeMismatch {
                    context: "distribution factors",
                    expected,
                    found: factors.len(),
                });
            }
        }
        self.dist_factors = Some(factors.to_vec());
        Ok(())
    }

    /// Distribution factors; empty when never written (unweighted).
    pub fn dist_factors(&self) -> &[f64] {
        self.dist_factors.as_deref().unwrap_or(&[])
    }
}

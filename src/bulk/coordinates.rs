//! Nodal coordinate storage: parallel per-axis arrays plus axis names.
//!
//! Coordinates are stored and retrieved together as up to three parallel
//! arrays of length `num_nodes`. Axes beyond the store's dimensionality are
//! empty. Unwritten coordinates read back as zeros of the declared shape.

use crate::exchange_error::MeshExchangeError;
use crate::records::bound_name;
use serde::{Deserialize, Serialize};

/// Per-axis coordinate arrays with display names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinateSet {
    dim: usize,
    num_nodes: usize,
    /// Axis display names, `dim` entries.
    names: Vec<String>,
    /// `dim` arrays, each of length `num_nodes`, zero-filled until written.
    axes: Vec<Vec<f64>>,
}

impl CoordinateSet {
    /// Zero-filled coordinate storage for `num_nodes` points in `dim` axes.
    pub fn new(dim: usize, num_nodes: usize) -> Self {
        let default_names = ["x", "y", "z"];
        Self {
            dim,
            num_nodes,
            names: (0..dim).map(|axis| default_names[axis].to_string()).collect(),
            axes: vec![vec![0.0; num_nodes]; dim],
        }
    }

    /// Spatial dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Stores all axes together. Axes beyond `dim` must be empty.
    pub fn put(&mut self, x: &[f64], y: &[f64], z: &[f64]) -> Result<(), MeshExchangeError> {
        let supplied = [x, y, z];
        for (axis, values) in supplied.iter().enumerate() {
            if axis < self.dim {
                if values.len() != self.num_nodes {
                    return Err(MeshExchangeError::ShapeMismatch {
                        context: "coordinate axis",
                        expected: self.num_nodes,
                        found: values.len(),
                    });
                }
            } else if !values.is_empty() {
                return Err(MeshExchangeError::ShapeMismatch {
                    context: "coordinate axis beyond dimension",
                    expected: 0,
                    found: values.len(),
                });
            }
        }
        for (axis, values) in supplied.iter().take(self.dim).enumerate() {
            self.axes[axis].clear();
            self.axes[axis].extend_from_slice(values);
        }
        Ok(())
    }

    /// Retrieves all axes together; unused axes come back empty.
    pub fn get(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let axis = |i: usize| self.axes.get(i).cloned().unwrap_or_default();
        (axis(0), axis(1), axis(2))
    }

    /// One axis by 0-based index.
    pub fn axis(&self, axis: usize) -> Result<&[f64], MeshExchangeError> {
        self.axes
            .get(axis)
            .map(|a| a.as_slice())
            .ok_or(MeshExchangeError::ShapeMismatch {
                context: "coordinate axis index",
                expected: self.dim,
                found: axis,
            })
    }

    /// Assigns axis display names; the list length must equal `dim`.
    pub fn put_names(&mut self, names: &[&str]) -> Result<(), MeshExchangeError> {
        if names.len() != self.dim {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "coordinate names",
                expected: self.dim,
                found: names.len(),
            });
        }
        self.names = names
            .iter()
            .map(|name| bound_name(name, "coordinate name"))
            .collect();
        Ok(())
    }

    /// Axis display names in axis order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

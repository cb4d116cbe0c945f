//! Block storage: connectivity, attributes, and polyhedral count arrays.
//!
//! An element/edge/face block couples a free-form topology tag ("HEX8",
//! "TRI3", "NSIDED", "NFACED", ...) with fixed per-entry sizes. Polyhedral
//! topologies replace the fixed nodes-per-entry with a per-entry count
//! array; their connectivity length is the sum of those counts.

use crate::exchange_error::MeshExchangeError;
use crate::records::bound_name;
use serde::{Deserialize, Serialize};

/// Declared shape of one block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockParams {
    /// Free-form topology tag, e.g. "HEX8", "TET4", "NSIDED", "NFACED".
    pub topology: String,
    /// Number of entries (elements/edges/faces) in the block.
    pub entry_count: usize,
    /// Nodes per entry; 0 for polyhedral topologies.
    pub nodes_per_entry: usize,
    /// Number of float attributes per entry.
    pub attribute_count: usize,
}

impl BlockParams {
    /// Whether the topology tag names a polyhedral block.
    #[inline]
    pub fn is_polyhedral(&self) -> bool {
        self.topology.eq_ignore_ascii_case("nsided")
            || self.topology.eq_ignore_ascii_case("nfaced")
    }
}

/// One block's bulk payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockData {
    params: BlockParams,
    /// Node connectivity, entry-major.
    connectivity: Option<Vec<i64>>,
    /// Entry-to-face connectivity (NFACED blocks).
    face_connectivity: Option<Vec<i64>>,
    /// Per-entry node (NSIDED) or face (NFACED) counts.
    entity_counts: Option<Vec<i64>>,
    /// Attribute column names, `attribute_count` entries.
    attribute_names: Vec<String>,
    /// Attribute values, entry-major: `entry_count * attribute_count`.
    attributes: Option<Vec<f64>>,
}

impl BlockData {
    /// Fresh block storage for the declared shape.
    pub fn new(params: BlockParams) -> Self {
        let attribute_names = vec![String::new(); params.attribute_count];
        Self {
            params,
            connectivity: None,
            face_connectivity: None,
            entity_counts: None,
            attribute_names,
            attributes: None,
        }
    }

    /// Declared shape.
    #[inline]
    pub fn params(&self) -> &BlockParams {
        &self.params
    }

    /// Expected node-connectivity length: per-entry counts when declared,
    /// otherwise `entry_count * nodes_per_entry`.
    pub fn expected_connectivity_len(&self) -> usize {
        match &self.entity_counts {
            Some(counts) => counts.iter().map(|&c| c.max(0) as usize).sum(),
            None => self.params.entry_count * self.params.nodes_per_entry,
        }
    }

    /// Declares per-entry counts for a polyhedral block.
    pub fn put_entity_counts(&mut self, counts: &[i64]) -> Result<(), MeshExchangeError> {
        if counts.len() != self.params.entry_count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "polyhedral entity counts",
                expected: self.params.entry_count,
                found: counts.len(),
            });
        }
        self.entity_counts = Some(counts.to_vec());
        Ok(())
    }

    /// Per-entry counts, when declared.
    #[inline]
    pub fn entity_counts(&self) -> Option<&[i64]> {
        self.entity_counts.as_deref()
    }

    /// Stores node connectivity, validating the declared length.
    pub fn put_connectivity(&mut self, conn: &[i64]) -> Result<(), MeshExchangeError> {
        let expected = self.expected_connectivity_len();
        if conn.len() != expected {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "block connectivity",
                expected,
                found: conn.len(),
            });
        }
        self.connectivity = Some(conn.to_vec());
        Ok(())
    }

    /// Node connectivity; zeros of the declared shape until written.
    pub fn connectivity(&self) -> Vec<i64> {
        match &self.connectivity {
            Some(conn) => conn.clone(),
            None => vec![0; self.expected_connectivity_len()],
        }
    }

    /// Stores entry-to-face connectivity (NFACED blocks); length is driven
    /// by the per-entry face counts.
    pub fn put_face_connectivity(&mut self, conn: &[i64]) -> Result<(), MeshExchangeError> {
        let expected = match &self.entity_counts {
            Some(counts) => counts.iter().map(|&c| c.max(0) as usize).sum(),
            None => {
                return Err(MeshExchangeError::ShapeMismatch {
                    context: "face connectivity requires entity counts",
                    expected: self.params.entry_count,
                    found: 0,
                });
            }
        };
        if conn.len() != expected {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "block face connectivity",
                expected,
                found: conn.len(),
            });
        }
        self.face_connectivity = Some(conn.to_vec());
        Ok(())
    }

    /// Entry-to-face connectivity, when written.
    #[inline]
    pub fn face_connectivity(&self) -> Option<&[i64]> {
        self.face_connectivity.as_deref()
    }

    /// Assigns all attribute column names.
    pub fn put_attribute_names(&mut self, names: &[&str]) -> Result<(), MeshExchangeError> {
        if names.len() != self.params.attribute_count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "attribute names",
                expected: self.params.attribute_count,
                found: names.len(),
            });
        }
        self.attribute_names = names
            .iter()
            .map(|name| bound_name(name, "attribute name"))
            .collect();
        Ok(())
    }

    /// Attribute column names in column order.
    #[inline]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Stores the full attribute matrix, entry-major.
    pub fn put_attributes(&mut self, values: &[f64]) -> Result<(), MeshExchangeError> {
        let expected = self.params.entry_count * self.params.attribute_count;
        if values.len() != expected {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "block attributes",
                expected,
                found: values.len(),
            });
        }
        self.attributes = Some(values.to_vec());
        Ok(())
    }

    /// Full attribute matrix; zeros until written.
    pub fn attributes(&self) -> Vec<f64> {
        match &self.attributes {
            Some(values) => values.clone(),
            None => vec![0.0; self.params.entry_count * self.params.attribute_count],
        }
    }

    /// Index of a named attribute column.
    fn attribute_column(&self, name: &str) -> Result<usize, MeshExchangeError> {
        self.attribute_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| MeshExchangeError::UnknownMetric(name.to_string()))
    }

    /// Stores a single named attribute column.
    pub fn put_attribute_values(
        &mut self,
        name: &str,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        let column = self.attribute_column(name)?;
        if values.len() != self.params.entry_count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "attribute column",
                expected: self.params.entry_count,
                found: values.len(),
            });
        }
        let stride = self.params.attribute_count;
        let mut matrix = self.attributes();
        for (entry, &value) in values.iter().enumerate() {
            matrix[entry * stride + column] = value;
        }
        self.attributes = Some(matrix);
        Ok(())
    }

    /// Reads a single named attribute column.
    pub fn attribute_values(&self, name: &str) -> Result<Vec<f64>, MeshExchangeError> {
        let column = self.attribute_column(name)?;
        let stride = self.params.attribute_count;
        let matrix = self.attributes();
        Ok((0..self.params.entry_count)
            .map(|entry| matrix[entry * stride + column])
            .collect())
    }
}

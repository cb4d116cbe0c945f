//! Time series index: the ordered sequence of analysis time stamps.
//!
//! Every per-step variable read or write is indexed against this series.
//! Appending always extends the series by exactly one; there is no
//! retroactive insertion. Non-monotonic values are accepted, matching
//! historic behavior (see DESIGN.md).

use crate::exchange_error::MeshExchangeError;
use serde::{Deserialize, Serialize};

/// Append-only, 1-indexed sequence of time values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimeSeriesIndex {
    times: Vec<f64>,
}

impl TimeSeriesIndex {
    /// Appends a time value, extending the series by one.
    ///
    /// Returns the 1-based step index of the appended value. The value is
    /// not checked for monotonicity or uniqueness.
    pub fn append(&mut self, value: f64) -> usize {
        self.times.push(value);
        self.times.len()
    }

    /// Number of time steps.
    #[inline]
    pub fn count(&self) -> usize {
        self.times.len()
    }

    /// Time value at a 1-based step.
    pub fn value_at(&self, step: usize) -> Result<f64, MeshExchangeError> {
        if step == 0 || step > self.times.len() {
            return Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: self.times.len(),
            });
        }
        Ok(self.times[step - 1])
    }

    /// All time values in step order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.times
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_extends_by_one() {
        let mut index = TimeSeriesIndex::default();
        assert_eq!(index.append(0.0), 1);
        assert_eq!(index.append(0.5), 2);
        assert_eq!(index.append(1.0), 3);
        assert_eq!(index.count(), 3);
        assert_eq!(index.value_at(2).unwrap(), 0.5);
    }

    #[test]
    fn non_monotonic_values_accepted() {
        let mut index = TimeSeriesIndex::default();
        index.append(1.0);
        index.append(0.25);
        assert_eq!(index.values(), &[1.0, 0.25]);
    }

    #[test]
    fn step_bounds() {
        let mut index = TimeSeriesIndex::default();
        index.append(0.0);
        assert_eq!(
            index.value_at(0).unwrap_err(),
            MeshExchangeError::StepOutOfRange { step: 0, bound: 1 }
        );
        assert_eq!(
            index.value_at(2).unwrap_err(),
            MeshExchangeError::StepOutOfRange { step: 2, bound: 1 }
        );
    }
}

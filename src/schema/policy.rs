//! Integer-width and floating-precision policy, fixed at store creation.
//!
//! The policy is negotiated once when a store is created and persisted with
//! it; opening an existing store in append mode reads the stored policy, and
//! every subsequent bulk operation honors it. There is no silent promotion
//! or demotion: a 64-bit value that does not fit a 32-bit lane is rejected
//! at put time, and single-precision floats are quantized at put time so the
//! caller observes exactly what a later reader will.

use crate::exchange_error::MeshExchangeError;
use serde::{Deserialize, Serialize};

/// Storage width for one integer lane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntWidth {
    /// 32-bit lane; values outside `i32` range are rejected.
    I32,
    /// 64-bit lane; the full `i64` range is representable.
    #[default]
    I64,
}

impl IntWidth {
    /// Word size in bytes.
    #[inline]
    pub fn word_size(self) -> usize {
        match self {
            IntWidth::I32 => 4,
            IntWidth::I64 => 8,
        }
    }

    /// Validates that `value` fits this width.
    pub fn check(self, value: i64, context: &'static str) -> Result<(), MeshExchangeError> {
        match self {
            IntWidth::I64 => Ok(()),
            IntWidth::I32 => {
                if i32::try_from(value).is_ok() {
                    Ok(())
                } else {
                    Err(MeshExchangeError::WidthOverflow { context, value })
                }
            }
        }
    }

    /// Validates every value in a slice.
    pub fn check_all(self, values: &[i64], context: &'static str) -> Result<(), MeshExchangeError> {
        if self == IntWidth::I64 {
            return Ok(());
        }
        for &value in values {
            self.check(value, context)?;
        }
        Ok(())
    }
}

/// Floating-point storage precision.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatPrecision {
    /// 4-byte reals; values are quantized through `f32` at put time.
    Single,
    /// 8-byte reals.
    #[default]
    Double,
}

impl FloatPrecision {
    /// Word size in bytes.
    #[inline]
    pub fn word_size(self) -> usize {
        match self {
            FloatPrecision::Single => 4,
            FloatPrecision::Double => 8,
        }
    }

    /// Rounds `value` to this precision.
    #[inline]
    pub fn quantize(self, value: f64) -> f64 {
        match self {
            FloatPrecision::Double => value,
            FloatPrecision::Single => value as f32 as f64,
        }
    }

    /// Quantizes a whole buffer in place.
    pub fn quantize_all(self, values: &mut [f64]) {
        if self == FloatPrecision::Single {
            for value in values {
                *value = *value as f32 as f64;
            }
        }
    }
}

/// Per-lane integer width policy: id values, map values, bulk/index values
/// are independently selectable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidthPolicy {
    /// Entity id values.
    pub ids: IntWidth,
    /// Numbering-map values.
    pub maps: IntWidth,
    /// Bulk arrays: connectivity, membership lists, count arrays.
    pub bulk: IntWidth,
}

impl WidthPolicy {
    /// Policy with every lane at 32 bits.
    pub fn all_32() -> Self {
        Self {
            ids: IntWidth::I32,
            maps: IntWidth::I32,
            bulk: IntWidth::I32,
        }
    }

    /// Policy with every lane at 64 bits.
    pub fn all_64() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i32_width_rejects_out_of_range() {
        let width = IntWidth::I32;
        width.check(i64::from(i32::MAX), "test").unwrap();
        width.check(i64::from(i32::MIN), "test").unwrap();
        let err = width.check(i64::from(i32::MAX) + 1, "test").unwrap_err();
        assert!(matches!(err, MeshExchangeError::WidthOverflow { .. }));
    }

    #[test]
    fn i64_width_accepts_everything() {
        IntWidth::I64.check(i64::MAX, "test").unwrap();
        IntWidth::I64.check(i64::MIN, "test").unwrap();
    }

    #[test]
    fn single_precision_quantizes() {
        let precise = 0.123_456_789_012_345_f64;
        let quantized = FloatPrecision::Single.quantize(precise);
        assert_ne!(precise, quantized);
        assert!((precise - quantized).abs() < 1e-7);
        assert_eq!(FloatPrecision::Double.quantize(precise), precise);
    }

    #[test]
    fn word_sizes() {
        assert_eq!(IntWidth::I32.word_size(), 4);
        assert_eq!(IntWidth::I64.word_size(), 8);
        assert_eq!(FloatPrecision::Single.word_size(), 4);
        assert_eq!(FloatPrecision::Double.word_size(), 8);
    }
}

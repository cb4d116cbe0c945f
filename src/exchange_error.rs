//! MeshExchangeError: Unified error type for mesh-exchange public APIs
//!
//! This error type is used throughout the mesh-exchange library to provide
//! robust, non-panicking error handling for all public APIs.

use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for mesh-exchange operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshExchangeError {
    /// Spatial dimension outside the supported range {1,2,3}.
    #[error("invalid spatial dimension {0} (expected 1, 2, or 3)")]
    InvalidDimension(usize),
    /// `initialize` called twice on the same store handle.
    #[error("store dimensions already initialized; re-initialization is not allowed")]
    AlreadyInitialized,
    /// An operation that requires dimensions was called before `initialize`.
    #[error("store dimensions not initialized; call initialize first")]
    NotInitialized,
    /// A mutating operation was attempted on a read-only handle.
    #[error("operation `{0}` requires a writable store handle")]
    ReadOnly(&'static str),
    /// Typed inquiry of a metric the store cannot answer.
    #[error("unknown inquiry metric `{0}`")]
    UnknownMetric(String),
    /// Entity id lookup failed within its kind.
    #[error("unknown {kind} id {id}")]
    UnknownEntityId { kind: EntityKind, id: EntityId },
    /// Two entities of one kind were registered with the same id.
    #[error("duplicate {kind} id {id}")]
    DuplicateEntityId { kind: EntityKind, id: EntityId },
    /// Bulk redefinition of a kind's id list after it was registered.
    #[error("{0} entity list is locked; ids were already registered")]
    EntityListLocked(EntityKind),
    /// Registered entity list length disagrees with the schema count.
    #[error("{kind} cardinality mismatch: schema declares {expected}, got {found}")]
    CardinalityMismatch {
        kind: EntityKind,
        expected: usize,
        found: usize,
    },
    /// Bulk put targeting an entity the catalog has not registered.
    #[error("{kind} id {id} is not defined in the catalog")]
    EntityNotDefined { kind: EntityKind, id: EntityId },
    /// Operation not meaningful for the entity kind.
    #[error("{kind} does not support {context}")]
    UnsupportedKind {
        kind: EntityKind,
        context: &'static str,
    },
    /// Array length disagrees with the declared shape.
    #[error("{context}: expected length {expected}, got {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    /// Variable count redefinition after names or values were committed.
    #[error("{kind} variable count is locked at {current}; cannot change to {requested}")]
    VariableCountLocked {
        kind: EntityKind,
        current: usize,
        requested: usize,
    },
    /// Variable index outside `[1, count]`.
    #[error("{kind} variable index {index} out of range [1, {count}]")]
    VariableIndexOutOfRange {
        kind: EntityKind,
        index: usize,
        count: usize,
    },
    /// Truth table redefinition after values were written for the kind.
    #[error("{0} truth table is locked; values have already been written")]
    TruthTableLocked(EntityKind),
    /// Value access on a (entity, variable) pair the truth table marks false.
    #[error("{kind} id {id}, variable {variable}: cell is undefined in the truth table")]
    UndefinedCell {
        kind: EntityKind,
        id: EntityId,
        variable: usize,
    },
    /// Time step outside the valid range for the operation.
    #[error("time step {step} out of range (bound {bound})")]
    StepOutOfRange { step: usize, bound: usize },
    /// Integer value does not fit the 32-bit width negotiated at creation.
    #[error("{context}: value {value} exceeds the 32-bit storage width")]
    WidthOverflow { context: &'static str, value: i64 },
    /// `create` refused to overwrite an existing store.
    #[error("refusing to clobber existing store at {}", .0.display())]
    FileExists(PathBuf),
    /// `open`/`append` on a store that does not exist.
    #[error("store not found at {}", .0.display())]
    FileNotFound(PathBuf),
    /// Persisted container rejected at open (bad magic or format version).
    #[error("unrecognized store container: {0}")]
    BadContainer(String),
    /// Snapshot encode/decode failure from the codec.
    #[error("snapshot codec error: {0}")]
    Codec(String),
    /// Backend I/O failure, surfaced as-is.
    #[error("I/O error ({kind:?}): {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl From<std::io::Error> for MeshExchangeError {
    fn from(err: std::io::Error) -> Self {
        MeshExchangeError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

//! # mesh-exchange
//!
//! mesh-exchange is a structured, typed reader/writer for a mesh-exchange
//! store: entities (nodes, elements, element blocks, node/side sets,
//! numbering maps, assemblies), named time-varying field variables with
//! sparse truth tables, and QA/info metadata, persisted through a pluggable
//! backend.
//!
//! ## Features
//! - One generic entity catalog enforcing the id↔index bijection per kind
//! - Bulk arrays (coordinates, connectivity, set membership, distribution
//!   factors, numbering maps) validated against the declared schema
//! - Variable families per entity kind with truth-table-gated, per-step
//!   value series, plus assembly reduction variables
//! - Integer-width and float-precision policy negotiated at creation and
//!   honored for the store's lifetime
//! - A copy engine that replays a store into a fresh one, optionally adding
//!   variables and attributes with default-filled values
//!
//! ## Determinism
//!
//! All iteration surfaces (catalog ids, names, truth tables, replay order)
//! follow creation/index order, so round trips and copies are reproducible.
//!
//! ## Usage
//! Add `mesh-exchange` as a dependency in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mesh-exchange = "0.4"
//! ```

// Re-export our major subsystems:
pub mod bulk;
pub mod catalog;
pub mod exchange_error;
pub mod records;
pub mod schema;
pub mod store;
pub mod time_index;
pub mod vars;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::bulk::blocks::BlockParams;
    pub use crate::bulk::sets::SetParams;
    pub use crate::catalog::assembly::AssemblyData;
    pub use crate::catalog::entity::EntityId;
    pub use crate::catalog::EntityKind;
    pub use crate::exchange_error::MeshExchangeError;
    pub use crate::records::QaRecord;
    pub use crate::schema::inquiry::{Inquiry, InquiryValue};
    pub use crate::schema::policy::{FloatPrecision, IntWidth, WidthPolicy};
    pub use crate::schema::InitParams;
    pub use crate::store::backend::{Backend, FileBackend, MemoryBackend};
    pub use crate::store::{
        copy_store, CopyOptions, CreateOptions, OpenMode, SchemaAdditions, Store,
    };
}

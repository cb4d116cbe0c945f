//! Snapshot codec: the persisted form of a store.
//!
//! The container is a small validated header (magic bytes plus a format
//! version) followed by a bincode-encoded [`StoreState`]. The physical
//! layout is an implementation detail of this crate; the logical contract
//! is the round trip, so the header exists purely to reject foreign or
//! incompatible files at open time instead of failing deep in decode.

use crate::bulk::BulkStore;
use crate::catalog::assembly::AssemblyData;
use crate::catalog::entity::EntityId;
use crate::catalog::EntityCatalog;
use crate::exchange_error::MeshExchangeError;
use crate::records::RecordLog;
use crate::schema::policy::{FloatPrecision, WidthPolicy};
use crate::schema::Schema;
use crate::time_index::TimeSeriesIndex;
use crate::vars::VariableManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Container magic bytes.
const MAGIC: &[u8; 4] = b"MXST";
/// Container format version; bumped on incompatible layout changes.
pub const FORMAT_VERSION: u16 = 1;

/// Interface version reported by inquiry.
pub const API_VERSION: f64 = 0.4;
/// Database format version reported by inquiry.
pub const DB_VERSION: f64 = 1.0;

/// Everything a store persists.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreState {
    pub title: String,
    pub policy: WidthPolicy,
    pub precision: FloatPrecision,
    pub schema: Schema,
    pub catalog: EntityCatalog,
    pub bulk: Option<BulkStore>,
    pub vars: VariableManager,
    pub times: TimeSeriesIndex,
    pub records: RecordLog,
    pub assemblies: BTreeMap<EntityId, AssemblyData>,
}

/// Encodes a state into container bytes.
pub fn encode(state: &StoreState) -> Result<Vec<u8>, MeshExchangeError> {
    let body = bincode::serialize(state).map_err(|e| MeshExchangeError::Codec(e.to_string()))?;
    let mut bytes = Vec::with_capacity(MAGIC.len() + 2 + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decodes container bytes, validating the header and rebuilding derived
/// lookup tables.
pub fn decode(bytes: &[u8]) -> Result<StoreState, MeshExchangeError> {
    if bytes.len() < MAGIC.len() + 2 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(MeshExchangeError::BadContainer(
            "missing container magic".into(),
        ));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != FORMAT_VERSION {
        return Err(MeshExchangeError::BadContainer(format!(
            "format version {version} (supported: {FORMAT_VERSION})"
        )));
    }
    let mut state: StoreState = bincode::deserialize(&bytes[MAGIC.len() + 2..])
        .map_err(|e| MeshExchangeError::Codec(e.to_string()))?;
    state.catalog.rehydrate();
    Ok(state)
}

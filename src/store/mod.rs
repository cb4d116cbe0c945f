//! Store: the root object tying schema, catalog, bulk data, variables, and
//! the time series to a persistence backend.
//!
//! Lifecycle: a store is created (`create`) or opened (`open`) explicitly,
//! initialized exactly once with its global counts, populated through the
//! get/put surface, and closed explicitly. Closing consumes the handle, so
//! use-after-close is unrepresentable. Every put is observable through the
//! matching get within the same open handle; persistence happens at close.
//!
//! A handle is single-threaded and single-writer; concurrent handles onto
//! the same persisted store are not coordinated here.

pub mod backend;
pub mod copy;
pub mod snapshot;

use crate::bulk::blocks::BlockParams;
use crate::bulk::sets::SetParams;
use crate::bulk::BulkStore;
use crate::catalog::assembly::AssemblyData;
use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use crate::exchange_error::MeshExchangeError;
use crate::records::{bound_title, QaRecord, MAX_NAME_LENGTH};
use crate::schema::inquiry::{Inquiry, InquiryValue};
use crate::schema::policy::{FloatPrecision, WidthPolicy};
use crate::schema::InitParams;
use backend::{Backend, FileBackend};
use itertools::izip;
use snapshot::{StoreState, API_VERSION, DB_VERSION};
use std::path::Path;

pub use copy::{copy_store, CopyOptions, SchemaAdditions};

/// Access mode of an open store handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing store, reads only.
    Read,
    /// Existing store, reads and writes.
    Append,
    /// Fresh store; refuses to clobber an existing one.
    Create,
}

/// Options consumed by [`Store::create`].
#[derive(Clone, Debug, Default)]
pub struct CreateOptions {
    /// Store title, bounded to the maximum line length (tail kept).
    pub title: String,
    /// Integer width policy, fixed for the store's lifetime.
    pub policy: WidthPolicy,
    /// Floating precision, fixed for the store's lifetime.
    pub precision: FloatPrecision,
}

/// An open mesh-exchange store.
#[derive(Debug)]
pub struct Store<B: Backend = FileBackend> {
    backend: B,
    mode: OpenMode,
    state: StoreState,
}

impl Store<FileBackend> {
    /// Creates a fresh store at `path`.
    ///
    /// # Errors
    /// `FileExists` if `path` already holds a store (no silent overwrite).
    pub fn create(path: impl AsRef<Path>, options: CreateOptions) -> Result<Self, MeshExchangeError> {
        Self::create_with(FileBackend::new(path), options)
    }

    /// Opens an existing store at `path` in `Read` or `Append` mode, or
    /// creates one with default options for `Create`.
    ///
    /// # Errors
    /// `FileNotFound` for `Read`/`Append` on a missing store; `FileExists`
    /// for `Create` on an existing one.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self, MeshExchangeError> {
        Self::open_with(FileBackend::new(path), mode)
    }
}

impl<B: Backend> Store<B> {
    /// Creates a fresh store on an explicit backend.
    pub fn create_with(backend: B, options: CreateOptions) -> Result<Self, MeshExchangeError> {
        if backend.exists() {
            return Err(MeshExchangeError::FileExists(backend.location()));
        }
        let state = StoreState {
            title: bound_title(&options.title),
            policy: options.policy,
            precision: options.precision,
            ..Default::default()
        };
        Ok(Self {
            backend,
            mode: OpenMode::Create,
            state,
        })
    }

    /// Opens a store on an explicit backend.
    pub fn open_with(mut backend: B, mode: OpenMode) -> Result<Self, MeshExchangeError> {
        if mode == OpenMode::Create {
            return Self::create_with(backend, CreateOptions::default());
        }
        let bytes = backend.load()?;
        let state = snapshot::decode(&bytes)?;
        Ok(Self {
            backend,
            mode,
            state,
        })
    }

    /// Flushes the store through its backend and consumes the handle.
    ///
    /// Read-only handles close without writing.
    pub fn close(mut self) -> Result<(), MeshExchangeError> {
        if self.mode == OpenMode::Read {
            return Ok(());
        }
        let bytes = snapshot::encode(&self.state)?;
        self.backend.save(&bytes)
    }

    /// Access mode of this handle.
    #[inline]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Store title.
    #[inline]
    pub fn title(&self) -> &str {
        &self.state.title
    }

    /// Integer width policy negotiated at creation.
    #[inline]
    pub fn policy(&self) -> WidthPolicy {
        self.state.policy
    }

    /// Floating precision negotiated at creation.
    #[inline]
    pub fn precision(&self) -> FloatPrecision {
        self.state.precision
    }

    fn writable(&self, op: &'static str) -> Result<(), MeshExchangeError> {
        if self.mode == OpenMode::Read {
            return Err(MeshExchangeError::ReadOnly(op));
        }
        Ok(())
    }

    fn bulk(&self) -> Result<&BulkStore, MeshExchangeError> {
        self.state
            .bulk
            .as_ref()
            .ok_or(MeshExchangeError::NotInitialized)
    }

    fn bulk_mut(&mut self) -> Result<&mut BulkStore, MeshExchangeError> {
        self.state
            .bulk
            .as_mut()
            .ok_or(MeshExchangeError::NotInitialized)
    }

    fn quantized(&self, values: &[f64]) -> Vec<f64> {
        let mut owned = values.to_vec();
        self.state.precision.quantize_all(&mut owned);
        owned
    }

    // ------------------------------------------------------------------
    // dimensions
    // ------------------------------------------------------------------

    /// Sets the global counts; exactly one successful call per created
    /// store. Sizes every dependent component.
    pub fn initialize(&mut self, params: InitParams) -> Result<(), MeshExchangeError> {
        self.writable("initialize")?;
        self.state.schema.initialize(params)?;
        let schema = &self.state.schema;
        self.state.bulk = Some(BulkStore::new(
            schema.num_dim(),
            schema.num_nodes(),
            schema.num_elem(),
        ));
        Ok(())
    }

    /// Whether dimensions have been set.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.schema.is_initialized()
    }

    /// The initialized counts.
    pub fn params(&self) -> Result<&InitParams, MeshExchangeError> {
        self.state.schema.params()
    }

    /// Spatial dimension.
    #[inline]
    pub fn num_dimensions(&self) -> usize {
        self.state.schema.num_dim()
    }

    /// Node count.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.state.schema.num_nodes()
    }

    /// Element count across all blocks.
    #[inline]
    pub fn num_elems(&self) -> usize {
        self.state.schema.num_elem()
    }

    /// Declared entity count for a kind.
    #[inline]
    pub fn declared_count(&self, kind: EntityKind) -> usize {
        self.state.schema.count(kind)
    }

    // ------------------------------------------------------------------
    // inquiry
    // ------------------------------------------------------------------

    /// Answers one metadata metric.
    ///
    /// [`Inquiry::Invalid`] (an unrecognized token) yields
    /// [`InquiryValue::Invalid`] rather than an error, so probe loops
    /// degrade gracefully.
    pub fn inquire(&self, metric: Inquiry) -> InquiryValue {
        use Inquiry::*;
        let schema = &self.state.schema;
        let int = InquiryValue::Int;
        let set_len = |kind| {
            self.state
                .bulk
                .as_ref()
                .map_or(0, |b| b.total_set_entries(kind)) as i64
        };
        let df_len = |kind| {
            self.state
                .bulk
                .as_ref()
                .map_or(0, |b| b.total_set_dist_factors(kind)) as i64
        };
        let props = |kind| self.state.catalog.property_names(kind).len() as i64;
        match metric {
            ApiVersion | LibVersion => InquiryValue::Float(API_VERSION),
            DbVersion => InquiryValue::Float(DB_VERSION),
            Dimension => int(schema.num_dim() as i64),
            Nodes => int(schema.num_nodes() as i64),
            Elements => int(schema.num_elem() as i64),
            ElementBlocks => int(schema.count(EntityKind::ElementBlock) as i64),
            NodeSets => int(schema.count(EntityKind::NodeSet) as i64),
            NodeSetNodeLength => int(set_len(EntityKind::NodeSet)),
            NodeSetDistFactLength => int(df_len(EntityKind::NodeSet)),
            SideSets => int(schema.count(EntityKind::SideSet) as i64),
            SideSetElementLength => int(set_len(EntityKind::SideSet)),
            SideSetNodeLength => int(
                self.state
                    .bulk
                    .as_ref()
                    .map_or(0, |b| b.total_side_set_nodes()) as i64,
            ),
            SideSetDistFactLength => int(df_len(EntityKind::SideSet)),
            QaRecords => int(self.state.records.qa_count() as i64),
            InfoRecords => int(self.state.records.info_count() as i64),
            TimeSteps => int(self.state.times.count() as i64),
            ElementBlockProperties => int(props(EntityKind::ElementBlock)),
            NodeSetProperties => int(props(EntityKind::NodeSet)),
            SideSetProperties => int(props(EntityKind::SideSet)),
            ElementMapProperties => int(props(EntityKind::ElementMap)),
            NodeMapProperties => int(props(EntityKind::NodeMap)),
            ElementMaps => int(schema.count(EntityKind::ElementMap) as i64),
            NodeMaps => int(schema.count(EntityKind::NodeMap) as i64),
            EdgeMaps => int(schema.count(EntityKind::EdgeMap) as i64),
            FaceMaps => int(schema.count(EntityKind::FaceMap) as i64),
            Edges => int(schema.num_edge() as i64),
            EdgeBlocks => int(schema.count(EntityKind::EdgeBlock) as i64),
            EdgeSets => int(schema.count(EntityKind::EdgeSet) as i64),
            EdgeSetLength => int(set_len(EntityKind::EdgeSet)),
            EdgeSetDistFactLength => int(df_len(EntityKind::EdgeSet)),
            EdgeBlockProperties => int(props(EntityKind::EdgeBlock)),
            EdgeSetProperties => int(props(EntityKind::EdgeSet)),
            Faces => int(schema.num_face() as i64),
            FaceBlocks => int(schema.count(EntityKind::FaceBlock) as i64),
            FaceSets => int(schema.count(EntityKind::FaceSet) as i64),
            FaceSetLength => int(set_len(EntityKind::FaceSet)),
            FaceSetDistFactLength => int(df_len(EntityKind::FaceSet)),
            FaceBlockProperties => int(props(EntityKind::FaceBlock)),
            FaceSetProperties => int(props(EntityKind::FaceSet)),
            ElementSets => int(schema.count(EntityKind::ElementSet) as i64),
            ElementSetLength => int(set_len(EntityKind::ElementSet)),
            ElementSetDistFactLength => int(df_len(EntityKind::ElementSet)),
            ElementSetProperties => int(props(EntityKind::ElementSet)),
            Assemblies => int(schema.count(EntityKind::Assembly) as i64),
            DbMaxAllowedNameLength | MaxReadNameLength => int(MAX_NAME_LENGTH as i64),
            DbMaxUsedNameLength => int(self.max_used_name_length() as i64),
            DbFloatSize => int(self.state.precision.word_size() as i64),
            Invalid => InquiryValue::Invalid,
        }
    }

    /// Token-based inquiry; unknown tokens answer the invalid sentinel.
    pub fn inquire_token(&self, token: &str) -> InquiryValue {
        self.inquire(Inquiry::from_token(token))
    }

    fn max_used_name_length(&self) -> usize {
        let catalog_max = EntityKind::ALL
            .iter()
            .flat_map(|&kind| self.state.catalog.names(kind))
            .map(|name| name.len())
            .max()
            .unwrap_or(0);
        let var_max = EntityKind::ALL
            .iter()
            .flat_map(|&kind| self.state.vars.names(kind))
            .map(|name| name.len())
            .max()
            .unwrap_or(0);
        catalog_max.max(var_max)
    }

    // ------------------------------------------------------------------
    // coordinates
    // ------------------------------------------------------------------

    /// Stores all coordinate axes together; axes beyond the store's
    /// dimension must be empty.
    pub fn put_coords(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_coords")?;
        let (x, y, z) = (self.quantized(x), self.quantized(y), self.quantized(z));
        self.bulk_mut()?.coordinates_mut().put(&x, &y, &z)
    }

    /// Retrieves all coordinate axes together.
    pub fn get_coords(&self) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), MeshExchangeError> {
        Ok(self.bulk()?.coordinates().get())
    }

    /// Assigns coordinate axis display names.
    pub fn put_coord_names(&mut self, names: &[&str]) -> Result<(), MeshExchangeError> {
        self.writable("put_coord_names")?;
        self.bulk_mut()?.coordinates_mut().put_names(names)
    }

    /// Coordinate axis display names.
    pub fn get_coord_names(&self) -> Result<Vec<String>, MeshExchangeError> {
        Ok(self.bulk()?.coordinates().names().to_vec())
    }

    // ------------------------------------------------------------------
    // numbering maps
    // ------------------------------------------------------------------

    /// Stores the node id map.
    pub fn put_node_id_map(&mut self, values: &[i64]) -> Result<(), MeshExchangeError> {
        self.writable("put_node_id_map")?;
        self.state.policy.maps.check_all(values, "node id map")?;
        self.bulk_mut()?.maps_mut().put_node_id_map(values)
    }

    /// Node id map; identity when never written.
    pub fn get_node_id_map(&self) -> Result<Vec<i64>, MeshExchangeError> {
        Ok(self.bulk()?.maps().node_id_map())
    }

    /// Stores the element id map.
    pub fn put_elem_id_map(&mut self, values: &[i64]) -> Result<(), MeshExchangeError> {
        self.writable("put_elem_id_map")?;
        self.state.policy.maps.check_all(values, "element id map")?;
        self.bulk_mut()?.maps_mut().put_elem_id_map(values)
    }

    /// Element id map; identity when never written.
    pub fn get_elem_id_map(&self) -> Result<Vec<i64>, MeshExchangeError> {
        Ok(self.bulk()?.maps().elem_id_map())
    }

    /// Stores the element order map.
    pub fn put_elem_order_map(&mut self, values: &[i64]) -> Result<(), MeshExchangeError> {
        self.writable("put_elem_order_map")?;
        self.state.policy.maps.check_all(values, "element order map")?;
        self.bulk_mut()?.maps_mut().put_elem_order_map(values)
    }

    /// Element order map; identity when never written.
    pub fn get_elem_order_map(&self) -> Result<Vec<i64>, MeshExchangeError> {
        Ok(self.bulk()?.maps().elem_order_map())
    }

    fn entity_map_len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::NodeMap => self.state.schema.num_nodes(),
            EntityKind::ElementMap => self.state.schema.num_elem(),
            EntityKind::EdgeMap => self.state.schema.num_edge(),
            EntityKind::FaceMap => self.state.schema.num_face(),
            _ => 0,
        }
    }

    /// Registers a map entity of a map kind.
    pub fn put_map(&mut self, kind: EntityKind, id: EntityId) -> Result<(), MeshExchangeError> {
        self.writable("put_map")?;
        if !kind.is_map() {
            return Err(MeshExchangeError::UnsupportedKind {
                kind,
                context: "numbering maps",
            });
        }
        let limit = self.state.schema.count(kind);
        self.state.catalog.register(kind, id, limit)?;
        Ok(())
    }

    /// Stores a registered map entity's values.
    pub fn put_map_values(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        values: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_map_values")?;
        if !self.state.catalog.contains(kind, id) {
            return Err(MeshExchangeError::EntityNotDefined { kind, id });
        }
        self.state.policy.maps.check_all(values, "map entity values")?;
        let expected = self.entity_map_len(kind);
        self.bulk_mut()?
            .maps_mut()
            .put_entity_map(kind, id, values, expected)
    }

    /// A registered map entity's values; identity until written.
    pub fn get_map_values(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Vec<i64>, MeshExchangeError> {
        if !self.state.catalog.contains(kind, id) {
            return Err(MeshExchangeError::EntityNotDefined { kind, id });
        }
        let expected = self.entity_map_len(kind);
        Ok(self.bulk()?.maps().entity_map(kind, id, expected))
    }

    // ------------------------------------------------------------------
    // blocks
    // ------------------------------------------------------------------

    /// Registers a block of `kind` and its declared shape.
    pub fn put_block(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        params: BlockParams,
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_block")?;
        if !kind.is_block() {
            return Err(MeshExchangeError::UnsupportedKind {
                kind,
                context: "block storage",
            });
        }
        let limit = self.state.schema.count(kind);
        self.state.catalog.register(kind, id, limit)?;
        self.bulk_mut()?.insert_block(kind, id, params);
        Ok(())
    }

    /// Registers an element block.
    pub fn put_element_block(
        &mut self,
        id: EntityId,
        params: BlockParams,
    ) -> Result<(), MeshExchangeError> {
        self.put_block(EntityKind::ElementBlock, id, params)
    }

    /// Registers several element blocks from parallel arrays.
    pub fn put_concat_element_blocks(
        &mut self,
        ids: &[EntityId],
        topologies: &[&str],
        entry_counts: &[usize],
        nodes_per_entry: &[usize],
        attribute_counts: &[usize],
    ) -> Result<(), MeshExchangeError> {
        for (len, context) in [
            (topologies.len(), "concat block topologies"),
            (entry_counts.len(), "concat block entry counts"),
            (nodes_per_entry.len(), "concat block nodes per entry"),
            (attribute_counts.len(), "concat block attribute counts"),
        ] {
            if len != ids.len() {
                return Err(MeshExchangeError::ShapeMismatch {
                    context,
                    expected: ids.len(),
                    found: len,
                });
            }
        }
        for (&id, &topology, &entry_count, &npe, &attrs) in
            izip!(ids, topologies, entry_counts, nodes_per_entry, attribute_counts)
        {
            self.put_element_block(
                id,
                BlockParams {
                    topology: topology.to_string(),
                    entry_count,
                    nodes_per_entry: npe,
                    attribute_count: attrs,
                },
            )?;
        }
        Ok(())
    }

    /// A block's declared shape.
    pub fn block_params(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<BlockParams, MeshExchangeError> {
        Ok(self.bulk()?.block(kind, id)?.params().clone())
    }

    /// Stores a block's node connectivity.
    pub fn put_connectivity(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        conn: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_connectivity")?;
        self.state.policy.bulk.check_all(conn, "block connectivity")?;
        self.bulk_mut()?.block_mut(kind, id)?.put_connectivity(conn)
    }

    /// A block's node connectivity; zeros of the declared shape until written.
    pub fn get_connectivity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Vec<i64>, MeshExchangeError> {
        Ok(self.bulk()?.block(kind, id)?.connectivity())
    }

    /// Declares per-entry counts for a polyhedral block.
    pub fn put_entity_counts(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        counts: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_entity_counts")?;
        self.state.policy.bulk.check_all(counts, "polyhedral counts")?;
        self.bulk_mut()?.block_mut(kind, id)?.put_entity_counts(counts)
    }

    /// Per-entry counts of a polyhedral block, when declared.
    pub fn get_entity_counts(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<Vec<i64>>, MeshExchangeError> {
        Ok(self.bulk()?.block(kind, id)?.entity_counts().map(<[i64]>::to_vec))
    }

    /// Stores an NFACED block's entry-to-face connectivity.
    pub fn put_face_connectivity(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        conn: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_face_connectivity")?;
        self.state.policy.bulk.check_all(conn, "face connectivity")?;
        self.bulk_mut()?.block_mut(kind, id)?.put_face_connectivity(conn)
    }

    /// An NFACED block's entry-to-face connectivity, when written.
    pub fn get_face_connectivity(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Option<Vec<i64>>, MeshExchangeError> {
        Ok(self
            .bulk()?
            .block(kind, id)?
            .face_connectivity()
            .map(<[i64]>::to_vec))
    }

    /// Assigns a block's attribute column names.
    pub fn put_attribute_names(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        names: &[&str],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_attribute_names")?;
        self.bulk_mut()?.block_mut(kind, id)?.put_attribute_names(names)
    }

    /// A block's attribute column names.
    pub fn get_attribute_names(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Vec<String>, MeshExchangeError> {
        Ok(self.bulk()?.block(kind, id)?.attribute_names().to_vec())
    }

    /// Stores a block's full attribute matrix, entry-major.
    pub fn put_attributes(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_attributes")?;
        let values = self.quantized(values);
        self.bulk_mut()?.block_mut(kind, id)?.put_attributes(&values)
    }

    /// A block's full attribute matrix; zeros until written.
    pub fn get_attributes(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        Ok(self.bulk()?.block(kind, id)?.attributes())
    }

    /// Stores a single named attribute column.
    pub fn put_attribute_values(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        name: &str,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_attribute_values")?;
        let values = self.quantized(values);
        self.bulk_mut()?
            .block_mut(kind, id)?
            .put_attribute_values(name, &values)
    }

    /// Reads a single named attribute column.
    pub fn get_attribute_values(
        &self,
        kind: EntityKind,
        id: EntityId,
        name: &str,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        self.bulk()?.block(kind, id)?.attribute_values(name)
    }

    // ------------------------------------------------------------------
    // sets
    // ------------------------------------------------------------------

    /// Registers a set of `kind` and its declared shape.
    pub fn put_set_params(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        params: SetParams,
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_set_params")?;
        if !kind.is_set() {
            return Err(MeshExchangeError::UnsupportedKind {
                kind,
                context: "set storage",
            });
        }
        let limit = self.state.schema.count(kind);
        self.state.catalog.register(kind, id, limit)?;
        self.bulk_mut()?.insert_set(kind, id, params);
        Ok(())
    }

    /// A set's declared shape.
    pub fn get_set_params(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<SetParams, MeshExchangeError> {
        Ok(self.bulk()?.set(kind, id)?.params().clone())
    }

    /// (id, declared shape) for every registered set of `kind`, in index
    /// order.
    pub fn get_all_set_params(
        &self,
        kind: EntityKind,
    ) -> Result<Vec<(EntityId, SetParams)>, MeshExchangeError> {
        let bulk = self.bulk()?;
        self.state
            .catalog
            .ids(kind)
            .iter()
            .map(|&id| Ok((id, bulk.set(kind, id)?.params().clone())))
            .collect()
    }

    /// Stores a set's membership list (node/edge/face/element sets).
    pub fn put_set(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        entries: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_set")?;
        self.state.policy.bulk.check_all(entries, "set membership")?;
        self.bulk_mut()?.set_mut(kind, id)?.put_entries(entries, None)
    }

    /// A set's membership list; zeros until written.
    pub fn get_set(&self, kind: EntityKind, id: EntityId) -> Result<Vec<i64>, MeshExchangeError> {
        Ok(self.bulk()?.set(kind, id)?.entries())
    }

    /// Stores a side set's parallel (element, local side) lists.
    pub fn put_side_set(
        &mut self,
        id: EntityId,
        elements: &[i64],
        sides: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_side_set")?;
        self.state.policy.bulk.check_all(elements, "side set elements")?;
        self.state.policy.bulk.check_all(sides, "side set sides")?;
        self.bulk_mut()?
            .set_mut(EntityKind::SideSet, id)?
            .put_entries(elements, Some(sides))
    }

    /// A side set's parallel (element, local side) lists.
    pub fn get_side_set(&self, id: EntityId) -> Result<(Vec<i64>, Vec<i64>), MeshExchangeError> {
        let data = self.bulk()?.set(EntityKind::SideSet, id)?;
        Ok((data.entries(), data.sides()))
    }

    /// Declares a side set's per-side incident node counts.
    pub fn put_side_set_node_counts(
        &mut self,
        id: EntityId,
        counts: &[i64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_side_set_node_counts")?;
        self.state.policy.bulk.check_all(counts, "side node counts")?;
        self.bulk_mut()?
            .set_mut(EntityKind::SideSet, id)?
            .put_node_counts(counts)
    }

    /// A side set's per-side incident node counts, when declared.
    pub fn get_side_set_node_counts(
        &self,
        id: EntityId,
    ) -> Result<Option<Vec<i64>>, MeshExchangeError> {
        Ok(self
            .bulk()?
            .set(EntityKind::SideSet, id)?
            .node_counts()
            .map(<[i64]>::to_vec))
    }

    /// Stores a set's distribution factors; empty means "no weighting".
    pub fn put_dist_factors(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        factors: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_dist_factors")?;
        let factors = self.quantized(factors);
        self.bulk_mut()?.set_mut(kind, id)?.put_dist_factors(&factors)
    }

    /// A set's distribution factors; empty when unweighted.
    pub fn get_dist_factors(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        Ok(self.bulk()?.set(kind, id)?.dist_factors().to_vec())
    }

    // ------------------------------------------------------------------
    // catalog: ids, names, properties
    // ------------------------------------------------------------------

    /// Bulk-registers a kind's id list against the schema count.
    pub fn define_entities(
        &mut self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<(), MeshExchangeError> {
        self.writable("define_entities")?;
        for id in ids {
            self.state.policy.ids.check(id.get(), "entity id")?;
        }
        let expected = self.state.schema.count(kind);
        self.state.catalog.define_entities(kind, ids, expected)
    }

    /// Resolves an id to its 1-based index within `kind`.
    pub fn resolve_index(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<usize, MeshExchangeError> {
        self.state.catalog.resolve_index(kind, id)
    }

    /// Registered ids of `kind` in index order.
    pub fn ids(&self, kind: EntityKind) -> Vec<EntityId> {
        self.state.catalog.ids(kind).to_vec()
    }

    /// An entity's name; empty when unnamed.
    pub fn name(&self, kind: EntityKind, id: EntityId) -> Result<String, MeshExchangeError> {
        self.state.catalog.name(kind, id).map(str::to_string)
    }

    /// Names of all entities of `kind` in index order.
    pub fn names(&self, kind: EntityKind) -> Vec<String> {
        self.state.catalog.names(kind)
    }

    /// Assigns an entity's bounded-length name.
    pub fn set_name(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        name: &str,
    ) -> Result<(), MeshExchangeError> {
        self.writable("set_name")?;
        self.state.catalog.set_name(kind, id, name)
    }

    /// Stores an integer property value for one entity.
    pub fn put_property(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        property: &str,
        value: i64,
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_property")?;
        self.state.catalog.put_property(kind, id, property, value)
    }

    /// Reads an integer property value for one entity.
    pub fn get_property(
        &self,
        kind: EntityKind,
        id: EntityId,
        property: &str,
    ) -> Result<i64, MeshExchangeError> {
        self.state.catalog.get_property(kind, id, property)
    }

    /// Property names defined for `kind`.
    pub fn property_names(&self, kind: EntityKind) -> Vec<String> {
        self.state.catalog.property_names(kind)
    }

    // ------------------------------------------------------------------
    // QA / info records
    // ------------------------------------------------------------------

    /// Appends QA records.
    pub fn put_qa_records(&mut self, records: &[QaRecord]) -> Result<(), MeshExchangeError> {
        self.writable("put_qa_records")?;
        self.state.records.append_qa(records.iter().cloned());
        Ok(())
    }

    /// All QA records in append order.
    pub fn get_qa_records(&self) -> Vec<QaRecord> {
        self.state.records.qa_records().to_vec()
    }

    /// Appends info lines, truncating oversized ones with a warning.
    pub fn put_info_records<'a, I>(&mut self, lines: I) -> Result<(), MeshExchangeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.writable("put_info_records")?;
        self.state.records.append_info(lines);
        Ok(())
    }

    /// All info lines in append order.
    pub fn get_info_records(&self) -> Vec<String> {
        self.state.records.info_records().to_vec()
    }

    // ------------------------------------------------------------------
    // time series
    // ------------------------------------------------------------------

    /// Appends a time value, returning its 1-based step.
    pub fn append_time(&mut self, value: f64) -> Result<usize, MeshExchangeError> {
        self.writable("append_time")?;
        Ok(self.state.times.append(self.state.precision.quantize(value)))
    }

    /// Number of time steps.
    #[inline]
    pub fn num_times(&self) -> usize {
        self.state.times.count()
    }

    /// Time value at a 1-based step.
    pub fn time_at(&self, step: usize) -> Result<f64, MeshExchangeError> {
        self.state.times.value_at(step)
    }

    /// All time values in step order.
    pub fn times(&self) -> &[f64] {
        self.state.times.values()
    }

    // ------------------------------------------------------------------
    // variables
    // ------------------------------------------------------------------

    /// Declares the variable count for `kind` (one-shot,
    /// idempotent-if-identical).
    pub fn set_variable_count(
        &mut self,
        kind: EntityKind,
        n: usize,
    ) -> Result<(), MeshExchangeError> {
        self.writable("set_variable_count")?;
        if !kind.has_variables() {
            return Err(MeshExchangeError::UnsupportedKind {
                kind,
                context: "field variables",
            });
        }
        let rows = self.state.schema.count(kind);
        self.state.vars.set_count(kind, n, rows)
    }

    /// Declared variable count for `kind`.
    pub fn variable_count(&self, kind: EntityKind) -> usize {
        self.state.vars.count(kind)
    }

    /// Assigns the name of variable `index` (1-based) of `kind`.
    pub fn set_variable_name(
        &mut self,
        kind: EntityKind,
        index: usize,
        name: &str,
    ) -> Result<(), MeshExchangeError> {
        self.writable("set_variable_name")?;
        self.state.vars.set_name(kind, index, name)
    }

    /// Variable names of `kind` in index order.
    pub fn variable_names(&self, kind: EntityKind) -> Vec<String> {
        self.state.vars.names(kind)
    }

    /// Resolves a variable name to its 1-based index.
    pub fn variable_index(&self, kind: EntityKind, name: &str) -> Result<usize, MeshExchangeError> {
        self.state
            .vars
            .family(kind)
            .and_then(|f| f.index_of(name))
            .ok_or_else(|| MeshExchangeError::UnknownMetric(name.to_string()))
    }

    /// Row-major truth table flags for `kind`.
    pub fn get_truth_table(&self, kind: EntityKind) -> Vec<bool> {
        self.state.vars.truth_table(kind)
    }

    /// Replaces the truth table for `kind`.
    pub fn set_truth_table(
        &mut self,
        kind: EntityKind,
        flags: &[bool],
    ) -> Result<(), MeshExchangeError> {
        self.writable("set_truth_table")?;
        let rows = self.state.schema.count(kind);
        self.state.vars.set_truth_table(kind, flags, rows)
    }

    /// The (0-based row, normalized id, payload length) of one variable
    /// cell. Global and Nodal are singleton rows keyed by a zero id.
    fn variable_cell(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<(usize, EntityId, usize), MeshExchangeError> {
        match kind {
            EntityKind::Global => Ok((0, EntityId::new(0), 1)),
            EntityKind::Nodal => Ok((0, EntityId::new(0), self.state.schema.num_nodes())),
            _ if kind.is_block() => {
                let row = self.state.catalog.resolve_index(kind, id)? - 1;
                let len = self.bulk()?.block(kind, id)?.params().entry_count;
                Ok((row, id, len))
            }
            _ if kind.is_set() => {
                let row = self.state.catalog.resolve_index(kind, id)? - 1;
                let len = self.bulk()?.set(kind, id)?.params().entry_count;
                Ok((row, id, len))
            }
            _ => Err(MeshExchangeError::UnsupportedKind {
                kind,
                context: "field variables",
            }),
        }
    }

    /// Writes one variable payload for `(kind, id)` at a step.
    ///
    /// Steps are per-cell append-only: `step` must be the cell's written
    /// length + 1 and must not exceed the appended time count.
    pub fn put_variable_values(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        index: usize,
        step: usize,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_variable_values")?;
        let (row, cell_id, payload_len) = self.variable_cell(kind, id)?;
        let values = self.quantized(values);
        let time_count = self.state.times.count();
        self.state.vars.put_values(
            kind, cell_id, row, index, step, &values, payload_len, time_count,
        )
    }

    /// Reads one variable payload for `(kind, id)` at a step.
    pub fn get_variable_values(
        &self,
        kind: EntityKind,
        id: EntityId,
        index: usize,
        step: usize,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        let (row, cell_id, _) = self.variable_cell(kind, id)?;
        self.state.vars.get_values(kind, cell_id, row, index, step)
    }

    /// Writes the nodal payload of variable `index` at a step.
    pub fn put_nodal_values(
        &mut self,
        index: usize,
        step: usize,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.put_variable_values(EntityKind::Nodal, EntityId::new(0), index, step, values)
    }

    /// Reads the nodal payload of variable `index` at a step.
    pub fn get_nodal_values(
        &self,
        index: usize,
        step: usize,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        self.get_variable_values(EntityKind::Nodal, EntityId::new(0), index, step)
    }

    /// Writes every global variable's value for a step at once.
    pub fn put_global_values(
        &mut self,
        step: usize,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        let count = self.variable_count(EntityKind::Global);
        if values.len() != count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "global values",
                expected: count,
                found: values.len(),
            });
        }
        for (pos, &value) in values.iter().enumerate() {
            self.put_variable_values(
                EntityKind::Global,
                EntityId::new(0),
                pos + 1,
                step,
                &[value],
            )?;
        }
        Ok(())
    }

    /// Reads every global variable's value at a step.
    pub fn get_global_values(&self, step: usize) -> Result<Vec<f64>, MeshExchangeError> {
        (1..=self.variable_count(EntityKind::Global))
            .map(|index| {
                self.get_variable_values(EntityKind::Global, EntityId::new(0), index, step)
                    .map(|payload| payload[0])
            })
            .collect()
    }

    /// One global variable's value over every written step.
    pub fn global_variable_series(&self, index: usize) -> Vec<f64> {
        self.state
            .vars
            .scalar_series(EntityKind::Global, EntityId::new(0), index)
    }

    // ------------------------------------------------------------------
    // assemblies and reduction variables
    // ------------------------------------------------------------------

    /// Registers an assembly and its member list.
    ///
    /// Members must already be registered under the assembly's member kind;
    /// nested assemblies are therefore defined leaf-first.
    pub fn put_assembly(
        &mut self,
        id: EntityId,
        data: AssemblyData,
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_assembly")?;
        let limit = self.state.schema.count(EntityKind::Assembly);
        for &member in &data.members {
            if !self.state.catalog.contains(data.member_kind, member) {
                return Err(MeshExchangeError::UnknownEntityId {
                    kind: data.member_kind,
                    id: member,
                });
            }
        }
        self.state.catalog.register(EntityKind::Assembly, id, limit)?;
        self.state
            .catalog
            .set_name(EntityKind::Assembly, id, &data.name)?;
        self.state.assemblies.insert(id, data);
        Ok(())
    }

    /// An assembly's payload.
    pub fn get_assembly(&self, id: EntityId) -> Result<AssemblyData, MeshExchangeError> {
        self.state
            .assemblies
            .get(&id)
            .cloned()
            .ok_or(MeshExchangeError::UnknownEntityId {
                kind: EntityKind::Assembly,
                id,
            })
    }

    /// Registered assembly ids in index order.
    pub fn assembly_ids(&self) -> Vec<EntityId> {
        self.state.catalog.ids(EntityKind::Assembly).to_vec()
    }

    /// Declares the reduction-variable count for `kind`.
    pub fn set_reduction_variable_count(
        &mut self,
        kind: EntityKind,
        n: usize,
    ) -> Result<(), MeshExchangeError> {
        self.writable("set_reduction_variable_count")?;
        self.state.vars.set_reduction_count(kind, n)
    }

    /// Declared reduction-variable count for `kind`.
    pub fn reduction_variable_count(&self, kind: EntityKind) -> usize {
        self.state.vars.reduction_count(kind)
    }

    /// Assigns a reduction-variable name (1-based index).
    pub fn set_reduction_variable_name(
        &mut self,
        kind: EntityKind,
        index: usize,
        name: &str,
    ) -> Result<(), MeshExchangeError> {
        self.writable("set_reduction_variable_name")?;
        self.state.vars.set_reduction_name(kind, index, name)
    }

    /// Reduction-variable names of `kind` in index order.
    pub fn reduction_variable_names(&self, kind: EntityKind) -> Vec<String> {
        self.state.vars.reduction_names(kind)
    }

    /// Writes all reduction values of one entity for a step.
    pub fn put_reduction_values(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        step: usize,
        values: &[f64],
    ) -> Result<(), MeshExchangeError> {
        self.writable("put_reduction_values")?;
        self.state.catalog.resolve_index(kind, id)?;
        let values = self.quantized(values);
        let time_count = self.state.times.count();
        self.state
            .vars
            .put_reduction_values(kind, id, step, &values, time_count)
    }

    /// Reads all reduction values of one entity at a step.
    pub fn get_reduction_values(
        &self,
        kind: EntityKind,
        id: EntityId,
        step: usize,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        self.state.catalog.resolve_index(kind, id)?;
        self.state.vars.get_reduction_values(kind, id, step)
    }

    /// Written step count of one variable cell (used by the copy engine).
    pub fn written_steps(&self, kind: EntityKind, id: EntityId, index: usize) -> usize {
        let cell_id = match kind {
            EntityKind::Global | EntityKind::Nodal => EntityId::new(0),
            _ => id,
        };
        self.state.vars.written_steps(kind, cell_id, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::MemoryBackend;

    fn minimal_params() -> InitParams {
        InitParams {
            num_dim: 3,
            num_nodes: 4,
            num_elem: 1,
            num_elem_blk: 1,
            ..Default::default()
        }
    }

    #[test]
    fn create_refuses_to_clobber() {
        let backend = MemoryBackend::new();
        let mut store = Store::create_with(backend.clone(), CreateOptions::default()).unwrap();
        store.initialize(minimal_params()).unwrap();
        store.close().unwrap();
        let err = Store::create_with(backend, CreateOptions::default()).unwrap_err();
        assert!(matches!(err, MeshExchangeError::FileExists(_)));
    }

    #[test]
    fn open_missing_fails() {
        let err = Store::open_with(MemoryBackend::new(), OpenMode::Read).unwrap_err();
        assert!(matches!(err, MeshExchangeError::FileNotFound(_)));
    }

    #[test]
    fn read_mode_rejects_puts() {
        let backend = MemoryBackend::new();
        let mut store = Store::create_with(backend.clone(), CreateOptions::default()).unwrap();
        store.initialize(minimal_params()).unwrap();
        store.close().unwrap();
        let mut reader = Store::open_with(backend, OpenMode::Read).unwrap();
        let err = reader.append_time(1.0).unwrap_err();
        assert_eq!(err, MeshExchangeError::ReadOnly("append_time"));
    }

    #[test]
    fn initialize_is_one_shot_across_reopen() {
        let backend = MemoryBackend::new();
        let mut store = Store::create_with(backend.clone(), CreateOptions::default()).unwrap();
        store.initialize(minimal_params()).unwrap();
        assert_eq!(
            store.initialize(minimal_params()).unwrap_err(),
            MeshExchangeError::AlreadyInitialized
        );
        store.close().unwrap();
        let mut appender = Store::open_with(backend, OpenMode::Append).unwrap();
        assert_eq!(
            appender.initialize(minimal_params()).unwrap_err(),
            MeshExchangeError::AlreadyInitialized
        );
    }

    #[test]
    fn bulk_ops_require_initialize() {
        let mut store =
            Store::create_with(MemoryBackend::new(), CreateOptions::default()).unwrap();
        let err = store.put_coords(&[0.0], &[0.0], &[0.0]).unwrap_err();
        assert_eq!(err, MeshExchangeError::NotInitialized);
    }

    #[test]
    fn width_policy_enforced_on_bulk_puts() {
        let mut store = Store::create_with(
            MemoryBackend::new(),
            CreateOptions {
                policy: WidthPolicy::all_32(),
                ..Default::default()
            },
        )
        .unwrap();
        store.initialize(minimal_params()).unwrap();
        store
            .put_element_block(
                EntityId::new(10),
                BlockParams {
                    topology: "TET4".into(),
                    entry_count: 1,
                    nodes_per_entry: 4,
                    attribute_count: 0,
                },
            )
            .unwrap();
        let big = i64::from(i32::MAX) + 1;
        let err = store
            .put_connectivity(EntityKind::ElementBlock, EntityId::new(10), &[1, 2, 3, big])
            .unwrap_err();
        assert!(matches!(err, MeshExchangeError::WidthOverflow { .. }));
    }

    #[test]
    fn single_precision_quantizes_at_put() {
        let mut store = Store::create_with(
            MemoryBackend::new(),
            CreateOptions {
                precision: FloatPrecision::Single,
                ..Default::default()
            },
        )
        .unwrap();
        store.initialize(minimal_params()).unwrap();
        let precise = 0.123_456_789_012_345_f64;
        store.append_time(precise).unwrap();
        assert_eq!(store.time_at(1).unwrap(), precise as f32 as f64);
    }

    #[test]
    fn unknown_inquiry_token_is_sentinel() {
        let store = Store::create_with(MemoryBackend::new(), CreateOptions::default()).unwrap();
        assert_eq!(store.inquire_token("EX_INQ_BOGUS"), InquiryValue::Invalid);
        assert_eq!(store.inquire_token("EX_INQ_NODES"), InquiryValue::Int(0));
    }

    #[test]
    fn title_is_bounded_keeping_tail() {
        let long = format!("{}END", "x".repeat(200));
        let store = Store::create_with(
            MemoryBackend::new(),
            CreateOptions {
                title: long,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.title().len(), crate::records::MAX_LINE_LENGTH);
        assert!(store.title().ends_with("END"));
    }
}

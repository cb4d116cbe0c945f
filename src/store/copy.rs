//! Copy/merge engine: replay one store into a freshly created one.
//!
//! The engine reads every entity, bulk array, name, property, and record
//! from a fully initialized source and replays it into a destination whose
//! dimensions match the source exactly. Transient state (time steps and
//! variable values) is replayed on request. Schema additions are the one
//! supported way to grow a store: new global/nodal/element variables and new
//! element attributes are declared on the destination and default-filled
//! with 0.0 for every entity and every pre-existing time step.
//!
//! Failure is not rolled back: if any replay step fails after the
//! destination was created, the destination is left in an unspecified
//! state and must not be trusted.

use crate::bulk::blocks::BlockParams;
use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use crate::exchange_error::MeshExchangeError;
use crate::store::backend::Backend;
use crate::store::{CreateOptions, Store};

/// New schema elements to declare on the destination.
#[derive(Clone, Debug, Default)]
pub struct SchemaAdditions {
    /// Names of global variables to append.
    pub global_variables: Vec<String>,
    /// Names of nodal variables to append.
    pub nodal_variables: Vec<String>,
    /// Names of element variables to append.
    pub element_variables: Vec<String>,
    /// (block id, attribute name) pairs to append to element blocks.
    pub element_attributes: Vec<(EntityId, String)>,
}

impl SchemaAdditions {
    fn variables_for(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Global => &self.global_variables,
            EntityKind::Nodal => &self.nodal_variables,
            EntityKind::ElementBlock => &self.element_variables,
            _ => &[],
        }
    }

    fn attributes_for(&self, id: EntityId) -> Vec<&str> {
        self.element_attributes
            .iter()
            .filter(|(block, _)| *block == id)
            .map(|(_, name)| name.as_str())
            .collect()
    }
}

/// Options consumed by [`copy_store`].
#[derive(Clone, Debug, Default)]
pub struct CopyOptions {
    /// Also replay time steps and variable definitions/values.
    pub include_transient: bool,
    /// Schema elements to add on the destination.
    pub additions: SchemaAdditions,
}

/// Replays `source` into a fresh store on `dest_backend`.
///
/// The destination inherits the source's title, width policy, and
/// precision. The returned handle is open in create mode; close it to
/// persist.
pub fn copy_store<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest_backend: DB,
    options: &CopyOptions,
) -> Result<Store<DB>, MeshExchangeError> {
    let mut dest = Store::create_with(
        dest_backend,
        CreateOptions {
            title: source.title().to_string(),
            policy: source.policy(),
            precision: source.precision(),
        },
    )?;
    dest.initialize(source.params()?.clone())?;

    for kind in [
        EntityKind::ElementBlock,
        EntityKind::EdgeBlock,
        EntityKind::FaceBlock,
    ] {
        replay_blocks(source, &mut dest, kind, &options.additions)?;
    }
    for kind in [
        EntityKind::NodeSet,
        EntityKind::SideSet,
        EntityKind::EdgeSet,
        EntityKind::FaceSet,
        EntityKind::ElementSet,
    ] {
        replay_sets(source, &mut dest, kind)?;
    }
    replay_maps(source, &mut dest)?;
    replay_coordinates(source, &mut dest)?;
    replay_records(source, &mut dest)?;
    replay_assemblies(source, &mut dest)?;
    replay_names_and_properties(source, &mut dest)?;

    if options.include_transient {
        for &value in source.times() {
            dest.append_time(value)?;
        }
    }
    replay_variables(source, &mut dest, options)?;

    Ok(dest)
}

fn replay_blocks<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
    kind: EntityKind,
    additions: &SchemaAdditions,
) -> Result<(), MeshExchangeError> {
    for id in source.ids(kind) {
        let params = source.block_params(kind, id)?;
        let added = if kind == EntityKind::ElementBlock {
            additions.attributes_for(id)
        } else {
            Vec::new()
        };
        let old_attr_count = params.attribute_count;
        let new_attr_count = old_attr_count + added.len();
        dest.put_block(
            kind,
            id,
            BlockParams {
                attribute_count: new_attr_count,
                ..params
            },
        )?;

        if let Some(counts) = source.get_entity_counts(kind, id)? {
            dest.put_entity_counts(kind, id, &counts)?;
        }
        dest.put_connectivity(kind, id, &source.get_connectivity(kind, id)?)?;
        if let Some(face_conn) = source.get_face_connectivity(kind, id)? {
            dest.put_face_connectivity(kind, id, &face_conn)?;
        }

        if new_attr_count > 0 {
            let mut names = source.get_attribute_names(kind, id)?;
            names.extend(added.iter().map(|name| name.to_string()));
            let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
            dest.put_attribute_names(kind, id, &name_refs)?;

            // Expand the entry-major matrix with zero columns for the
            // added attributes.
            let old_matrix = source.get_attributes(kind, id)?;
            let entry_count = source.block_params(kind, id)?.entry_count;
            let mut matrix = Vec::with_capacity(entry_count * new_attr_count);
            for entry in 0..entry_count {
                matrix.extend_from_slice(
                    &old_matrix[entry * old_attr_count..(entry + 1) * old_attr_count],
                );
                matrix.extend(std::iter::repeat_n(0.0, added.len()));
            }
            dest.put_attributes(kind, id, &matrix)?;
        }
    }
    Ok(())
}

fn replay_sets<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
    kind: EntityKind,
) -> Result<(), MeshExchangeError> {
    for (id, params) in source.get_all_set_params(kind)? {
        dest.put_set_params(kind, id, params)?;
        if kind == EntityKind::SideSet {
            let (elements, sides) = source.get_side_set(id)?;
            dest.put_side_set(id, &elements, &sides)?;
            if let Some(counts) = source.get_side_set_node_counts(id)? {
                dest.put_side_set_node_counts(id, &counts)?;
            }
        } else {
            dest.put_set(kind, id, &source.get_set(kind, id)?)?;
        }
        dest.put_dist_factors(kind, id, &source.get_dist_factors(kind, id)?)?;
    }
    Ok(())
}

fn replay_maps<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
) -> Result<(), MeshExchangeError> {
    dest.put_node_id_map(&source.get_node_id_map()?)?;
    dest.put_elem_id_map(&source.get_elem_id_map()?)?;
    dest.put_elem_order_map(&source.get_elem_order_map()?)?;
    for kind in [
        EntityKind::NodeMap,
        EntityKind::ElementMap,
        EntityKind::EdgeMap,
        EntityKind::FaceMap,
    ] {
        for id in source.ids(kind) {
            dest.put_map(kind, id)?;
            dest.put_map_values(kind, id, &source.get_map_values(kind, id)?)?;
        }
    }
    Ok(())
}

fn replay_coordinates<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
) -> Result<(), MeshExchangeError> {
    let (x, y, z) = source.get_coords()?;
    dest.put_coords(&x, &y, &z)?;
    let names = source.get_coord_names()?;
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    dest.put_coord_names(&name_refs)
}

fn replay_records<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
) -> Result<(), MeshExchangeError> {
    dest.put_qa_records(&source.get_qa_records())?;
    let info = source.get_info_records();
    dest.put_info_records(info.iter().map(String::as_str))
}

fn replay_assemblies<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
) -> Result<(), MeshExchangeError> {
    // Index order is registration order, so nested assemblies replay
    // leaf-first exactly as the source accepted them.
    for id in source.assembly_ids() {
        dest.put_assembly(id, source.get_assembly(id)?)?;
    }
    Ok(())
}

fn replay_names_and_properties<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
) -> Result<(), MeshExchangeError> {
    for kind in EntityKind::ALL {
        if !kind.is_cataloged() {
            continue;
        }
        for id in source.ids(kind) {
            let name = source.name(kind, id)?;
            if !name.is_empty() {
                dest.set_name(kind, id, &name)?;
            }
        }
        for property in source.property_names(kind) {
            if property == "ID" {
                continue;
            }
            for id in source.ids(kind) {
                dest.put_property(kind, id, &property, source.get_property(kind, id, &property)?)?;
            }
        }
    }
    Ok(())
}

fn replay_variables<SB: Backend, DB: Backend>(
    source: &Store<SB>,
    dest: &mut Store<DB>,
    options: &CopyOptions,
) -> Result<(), MeshExchangeError> {
    for kind in EntityKind::ALL {
        if !kind.has_variables() {
            continue;
        }
        let added = options.additions.variables_for(kind);
        let src_count = if options.include_transient {
            source.variable_count(kind)
        } else {
            0
        };
        let dest_count = src_count + added.len();
        if dest_count == 0 {
            continue;
        }
        dest.set_variable_count(kind, dest_count)?;
        let src_names = source.variable_names(kind);
        for index in 1..=src_count {
            dest.set_variable_name(kind, index, &src_names[index - 1])?;
        }
        for (offset, name) in added.iter().enumerate() {
            dest.set_variable_name(kind, src_count + 1 + offset, name)?;
        }

        // Source truth flags extended with always-true columns for the
        // added variables.
        if src_count > 0 {
            let rows = dest.declared_count(kind);
            let src_flags = source.get_truth_table(kind);
            let mut flags = Vec::with_capacity(rows * dest_count);
            for row in 0..rows {
                flags.extend_from_slice(&src_flags[row * src_count..(row + 1) * src_count]);
                flags.extend(std::iter::repeat_n(true, added.len()));
            }
            dest.set_truth_table(kind, &flags)?;
        }

        let entity_ids: Vec<EntityId> = match kind {
            EntityKind::Global | EntityKind::Nodal => vec![EntityId::new(0)],
            _ => source.ids(kind),
        };
        for &id in &entity_ids {
            for index in 1..=src_count {
                let written = source.written_steps(kind, id, index);
                for step in 1..=written {
                    match source.get_variable_values(kind, id, index, step) {
                        Ok(values) => {
                            dest.put_variable_values(kind, id, index, step, &values)?
                        }
                        Err(MeshExchangeError::UndefinedCell { .. }) => break,
                        Err(err) => return Err(err),
                    }
                }
            }
            // Added variables default-fill 0.0 for every pre-existing step.
            if !added.is_empty() && dest.num_times() > 0 {
                let payload_len = match kind {
                    EntityKind::Global => 1,
                    EntityKind::Nodal => dest.num_nodes(),
                    _ => dest.block_params(kind, id)?.entry_count,
                };
                let zeros = vec![0.0; payload_len];
                for index in src_count + 1..=dest_count {
                    for step in 1..=dest.num_times() {
                        dest.put_variable_values(kind, id, index, step, &zeros)?;
                    }
                }
            }
        }
    }

    if options.include_transient {
        for kind in EntityKind::ALL {
            let count = source.reduction_variable_count(kind);
            if count == 0 {
                continue;
            }
            dest.set_reduction_variable_count(kind, count)?;
            let names = source.reduction_variable_names(kind);
            for (pos, name) in names.iter().enumerate() {
                if !name.is_empty() {
                    dest.set_reduction_variable_name(kind, pos + 1, name)?;
                }
            }
            for id in source.ids(kind) {
                let mut step = 1;
                loop {
                    match source.get_reduction_values(kind, id, step) {
                        Ok(values) => dest.put_reduction_values(kind, id, step, &values)?,
                        Err(MeshExchangeError::StepOutOfRange { .. }) => break,
                        Err(err) => return Err(err),
                    }
                    step += 1;
                }
            }
        }
    }
    Ok(())
}

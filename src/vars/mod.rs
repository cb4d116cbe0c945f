//! Variable manager: named field-variable families per entity kind.
//!
//! A family is declared in two steps: first the variable *count* for a kind
//! (one-shot; re-setting the same value is a no-op), then a name per 1-based
//! index. Values are stored per (entity, variable, step); the truth table
//! declares which (entity, variable) cells exist at all. Each defined cell's
//! value series is append-only in step order, which forbids retroactive and
//! skipped writes without a larger transactional model.
//!
//! Global variables are a degenerate family with exactly one implicit
//! entity; assemblies carry *reduction* families whose values aggregate
//! over the assembly rather than per member.

pub mod truth;

use crate::catalog::entity::EntityId;
use crate::catalog::EntityKind;
use crate::exchange_error::MeshExchangeError;
use crate::records::bound_name;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use truth::TruthTable;

/// One kind's variable family: count, names, truth table, value series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableFamily {
    kind: EntityKind,
    count: usize,
    names: Vec<String>,
    truth: TruthTable,
    /// Truth table becomes immutable once any value is written.
    truth_locked: bool,
    /// Per-cell value series: (entity id, 1-based variable) → step payloads.
    series: BTreeMap<(EntityId, usize), Vec<Vec<f64>>>,
}

impl VariableFamily {
    fn new(kind: EntityKind, count: usize, entity_count: usize) -> Self {
        Self {
            kind,
            count,
            names: vec![String::new(); count],
            truth: TruthTable::all_true(entity_count, count),
            truth_locked: false,
            series: BTreeMap::new(),
        }
    }

    /// Declared variable count.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Variable names in index order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolves a variable name to its 1-based index.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name).map(|i| i + 1)
    }

    /// The family's truth table.
    #[inline]
    pub fn truth(&self) -> &TruthTable {
        &self.truth
    }

    fn check_index(&self, index: usize) -> Result<(), MeshExchangeError> {
        if index == 0 || index > self.count {
            return Err(MeshExchangeError::VariableIndexOutOfRange {
                kind: self.kind,
                index,
                count: self.count,
            });
        }
        Ok(())
    }

    /// Written step count for one cell.
    fn written(&self, id: EntityId, index: usize) -> usize {
        self.series.get(&(id, index)).map_or(0, Vec::len)
    }
}

/// Reduction-variable family: values aggregated over whole entities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReductionFamily {
    count: usize,
    names: Vec<String>,
    /// Per-entity step series; each step holds one value per variable.
    series: BTreeMap<EntityId, Vec<Vec<f64>>>,
}

impl ReductionFamily {
    /// Declared reduction-variable count.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reduction-variable names in index order.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// All variable state of one store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VariableManager {
    families: BTreeMap<EntityKind, VariableFamily>,
    reductions: BTreeMap<EntityKind, ReductionFamily>,
}

impl VariableManager {
    /// Declares the variable count for `kind`.
    ///
    /// Idempotent when `n` matches the committed count; any different value
    /// after the first successful call fails with `VariableCountLocked`.
    pub fn set_count(
        &mut self,
        kind: EntityKind,
        n: usize,
        entity_count: usize,
    ) -> Result<(), MeshExchangeError> {
        if let Some(family) = self.families.get(&kind) {
            if family.count == n {
                return Ok(());
            }
            return Err(MeshExchangeError::VariableCountLocked {
                kind,
                current: family.count,
                requested: n,
            });
        }
        self.families
            .insert(kind, VariableFamily::new(kind, n, entity_count));
        Ok(())
    }

    /// Declared count for `kind`; zero when never set.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.families.get(&kind).map_or(0, VariableFamily::count)
    }

    /// The family for `kind`, when declared.
    pub fn family(&self, kind: EntityKind) -> Option<&VariableFamily> {
        self.families.get(&kind)
    }

    fn family_mut(&mut self, kind: EntityKind) -> Result<&mut VariableFamily, MeshExchangeError> {
        self.families
            .get_mut(&kind)
            .ok_or(MeshExchangeError::VariableIndexOutOfRange {
                kind,
                index: 1,
                count: 0,
            })
    }

    /// Assigns the name of variable `index` (1-based) of `kind`.
    ///
    /// Duplicate names are tolerated but flagged with a warning, matching
    /// permissive historic behavior.
    pub fn set_name(
        &mut self,
        kind: EntityKind,
        index: usize,
        name: &str,
    ) -> Result<(), MeshExchangeError> {
        let family = self.family_mut(kind)?;
        family.check_index(index)?;
        let bounded = bound_name(name, "variable name");
        if family
            .names
            .iter()
            .enumerate()
            .any(|(pos, existing)| pos + 1 != index && *existing == bounded)
        {
            log::warn!("duplicate {kind} variable name `{bounded}`");
        }
        family.names[index - 1] = bounded;
        Ok(())
    }

    /// Variable names of `kind` in index order.
    pub fn names(&self, kind: EntityKind) -> Vec<String> {
        self.families
            .get(&kind)
            .map(|f| f.names.clone())
            .unwrap_or_default()
    }

    /// Names that appear more than once within `kind`'s family.
    pub fn duplicate_names(&self, kind: EntityKind) -> Vec<String> {
        self.families
            .get(&kind)
            .map(|f| {
                f.names
                    .iter()
                    .filter(|n| !n.is_empty())
                    .duplicates()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Row-major truth table flags for `kind`.
    pub fn truth_table(&self, kind: EntityKind) -> Vec<bool> {
        self.families
            .get(&kind)
            .map(|f| f.truth.flags().to_vec())
            .unwrap_or_default()
    }

    /// Replaces the truth table for `kind`.
    ///
    /// The flag count must equal `entity_count * variable_count`; the table
    /// locks once any value has been written for the kind.
    pub fn set_truth_table(
        &mut self,
        kind: EntityKind,
        flags: &[bool],
        entity_count: usize,
    ) -> Result<(), MeshExchangeError> {
        let family = self.family_mut(kind)?;
        if family.truth_locked {
            return Err(MeshExchangeError::TruthTableLocked(kind));
        }
        family.truth = TruthTable::from_flags(entity_count, family.count, flags)?;
        Ok(())
    }

    /// Writes one cell's payload for a time step.
    ///
    /// `entity_index` is the entity's 0-based row; `payload_len` the
    /// expected payload length for the kind (nodes for Nodal, entries in
    /// the block/set, 1 for Global). Steps are per-cell append-only: `step`
    /// must be the cell's written length + 1 and must not exceed
    /// `time_count`.
    #[allow(clippy::too_many_arguments)]
    pub fn put_values(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        entity_index: usize,
        index: usize,
        step: usize,
        values: &[f64],
        payload_len: usize,
        time_count: usize,
    ) -> Result<(), MeshExchangeError> {
        let family = self.family_mut(kind)?;
        family.check_index(index)?;
        if !family.truth.is_defined(entity_index, index - 1) {
            return Err(MeshExchangeError::UndefinedCell {
                kind,
                id,
                variable: index,
            });
        }
        if values.len() != payload_len {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "variable payload",
                expected: payload_len,
                found: values.len(),
            });
        }
        let written = family.written(id, index);
        if step != written + 1 {
            return Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: written + 1,
            });
        }
        if step > time_count {
            return Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: time_count,
            });
        }
        family
            .series
            .entry((id, index))
            .or_default()
            .push(values.to_vec());
        family.truth_locked = true;
        Ok(())
    }

    /// Reads one cell's payload at a time step.
    pub fn get_values(
        &self,
        kind: EntityKind,
        id: EntityId,
        entity_index: usize,
        index: usize,
        step: usize,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        let family = self
            .families
            .get(&kind)
            .ok_or(MeshExchangeError::VariableIndexOutOfRange {
                kind,
                index,
                count: 0,
            })?;
        family.check_index(index)?;
        if !family.truth.is_defined(entity_index, index - 1) {
            return Err(MeshExchangeError::UndefinedCell {
                kind,
                id,
                variable: index,
            });
        }
        match family.series.get(&(id, index)) {
            Some(steps) if step >= 1 && step <= steps.len() => Ok(steps[step - 1].clone()),
            other => Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: other.map_or(0, Vec::len),
            }),
        }
    }

    /// Written step count of one cell; zero for unknown cells.
    pub fn written_steps(&self, kind: EntityKind, id: EntityId, index: usize) -> usize {
        self.families
            .get(&kind)
            .map_or(0, |f| f.written(id, index))
    }

    /// One cell's scalar series over every written step (payload length 1).
    pub fn scalar_series(
        &self,
        kind: EntityKind,
        id: EntityId,
        index: usize,
    ) -> Vec<f64> {
        self.families
            .get(&kind)
            .and_then(|f| f.series.get(&(id, index)))
            .map(|steps| steps.iter().filter_map(|payload| payload.first().copied()).collect())
            .unwrap_or_default()
    }

    /// Declares the reduction-variable count for `kind` (one-shot like
    /// [`set_count`](Self::set_count)).
    pub fn set_reduction_count(
        &mut self,
        kind: EntityKind,
        n: usize,
    ) -> Result<(), MeshExchangeError> {
        if let Some(family) = self.reductions.get(&kind) {
            if family.count == n {
                return Ok(());
            }
            return Err(MeshExchangeError::VariableCountLocked {
                kind,
                current: family.count,
                requested: n,
            });
        }
        self.reductions.insert(
            kind,
            ReductionFamily {
                count: n,
                names: vec![String::new(); n],
                series: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Declared reduction count for `kind`; zero when never set.
    pub fn reduction_count(&self, kind: EntityKind) -> usize {
        self.reductions.get(&kind).map_or(0, ReductionFamily::count)
    }

    /// Assigns a reduction-variable name (1-based index).
    pub fn set_reduction_name(
        &mut self,
        kind: EntityKind,
        index: usize,
        name: &str,
    ) -> Result<(), MeshExchangeError> {
        let family = self
            .reductions
            .get_mut(&kind)
            .ok_or(MeshExchangeError::VariableIndexOutOfRange {
                kind,
                index,
                count: 0,
            })?;
        if index == 0 || index > family.count {
            return Err(MeshExchangeError::VariableIndexOutOfRange {
                kind,
                index,
                count: family.count,
            });
        }
        family.names[index - 1] = bound_name(name, "reduction variable name");
        Ok(())
    }

    /// Reduction-variable names of `kind` in index order.
    pub fn reduction_names(&self, kind: EntityKind) -> Vec<String> {
        self.reductions
            .get(&kind)
            .map(|f| f.names.clone())
            .unwrap_or_default()
    }

    /// Writes all reduction values of one entity for a step (append-only).
    pub fn put_reduction_values(
        &mut self,
        kind: EntityKind,
        id: EntityId,
        step: usize,
        values: &[f64],
        time_count: usize,
    ) -> Result<(), MeshExchangeError> {
        let family = self
            .reductions
            .get_mut(&kind)
            .ok_or(MeshExchangeError::VariableIndexOutOfRange {
                kind,
                index: 1,
                count: 0,
            })?;
        if values.len() != family.count {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "reduction payload",
                expected: family.count,
                found: values.len(),
            });
        }
        let written = family.series.get(&id).map_or(0, Vec::len);
        if step != written + 1 {
            return Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: written + 1,
            });
        }
        if step > time_count {
            return Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: time_count,
            });
        }
        family.series.entry(id).or_default().push(values.to_vec());
        Ok(())
    }

    /// Reads all reduction values of one entity at a step.
    pub fn get_reduction_values(
        &self,
        kind: EntityKind,
        id: EntityId,
        step: usize,
    ) -> Result<Vec<f64>, MeshExchangeError> {
        let family = self
            .reductions
            .get(&kind)
            .ok_or(MeshExchangeError::VariableIndexOutOfRange {
                kind,
                index: 1,
                count: 0,
            })?;
        match family.series.get(&id) {
            Some(steps) if step >= 1 && step <= steps.len() => Ok(steps[step - 1].clone()),
            other => Err(MeshExchangeError::StepOutOfRange {
                step,
                bound: other.map_or(0, Vec::len),
            }),
        }
    }
}

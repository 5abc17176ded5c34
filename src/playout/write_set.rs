use std::collections::{BTreeMap, HashMap};

use crate::{
    foundation::core::{PartId, PieceInstanceId, RundownId},
    model::instance::{PieceInstance, sort_instances},
    propagate::{
        chain::ChainState,
        engine::{CommittedState, PropagationResult},
    },
};

/// Buffered PieceInstance mutations of one job, committed in one step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WriteSet {
    /// Rundown the mutations belong to.
    pub rundown_id: RundownId,
    /// Instances that did not exist before.
    #[serde(default)]
    pub inserted: Vec<PieceInstance>,
    /// Instances whose id existed with different values.
    #[serde(default)]
    pub updated: Vec<PieceInstance>,
    /// Ids of instances that no longer exist.
    #[serde(default)]
    pub removed: Vec<PieceInstanceId>,
    /// Chain checkpoints replacing the committed ones.
    #[serde(default)]
    pub checkpoints: BTreeMap<PartId, ChainState>,
}

impl WriteSet {
    /// Mutations turning `committed` into the state described by `result`.
    pub fn diff(committed: &CommittedState, result: &PropagationResult) -> Self {
        let before: HashMap<&PieceInstanceId, &PieceInstance> =
            committed.iter().map(|inst| (&inst.id, inst)).collect();
        let after: HashMap<&PieceInstanceId, &PieceInstance> =
            result.instances().map(|inst| (&inst.id, inst)).collect();

        let mut inserted = Vec::new();
        let mut updated = Vec::new();
        for inst in result.instances() {
            match before.get(&inst.id) {
                None => inserted.push(inst.clone()),
                Some(old) if *old != inst => updated.push(inst.clone()),
                Some(_) => {}
            }
        }

        let mut removed: Vec<PieceInstanceId> = committed
            .iter()
            .filter(|inst| !after.contains_key(&inst.id))
            .map(|inst| inst.id.clone())
            .collect();
        removed.sort();

        Self {
            rundown_id: result.rundown_id.clone(),
            inserted,
            updated,
            removed,
            checkpoints: result
                .parts
                .iter()
                .map(|p| (p.part_id.clone(), p.checkpoint.clone()))
                .collect(),
        }
    }

    /// `true` when no PieceInstance changes.
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    /// Number of instance mutations.
    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.removed.len()
    }

    /// New committed state with these mutations applied; `committed` is left untouched.
    pub fn apply(&self, committed: &CommittedState) -> CommittedState {
        let mut by_id: HashMap<PieceInstanceId, PieceInstance> = committed
            .iter()
            .map(|inst| (inst.id.clone(), inst.clone()))
            .collect();
        for id in &self.removed {
            by_id.remove(id);
        }
        for inst in self.inserted.iter().chain(&self.updated) {
            by_id.insert(inst.id.clone(), inst.clone());
        }

        let mut instances: BTreeMap<PartId, Vec<PieceInstance>> = BTreeMap::new();
        for inst in by_id.into_values() {
            instances.entry(inst.part_id.clone()).or_default().push(inst);
        }
        for list in instances.values_mut() {
            sort_instances(list);
        }

        CommittedState {
            instances,
            checkpoints: self.checkpoints.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playout/write_set.rs"]
mod tests;

use std::collections::{BTreeMap, HashMap};

use crate::{
    foundation::core::{Millis, PartId, PieceInstanceId, RundownId},
    foundation::error::{PlayoutError, PlayoutResult},
    model::{
        instance::{PieceInstance, sort_instances},
        rundown::{Part, Piece, PieceKind, Rundown, RundownIndex},
    },
    propagate::chain::{ChainState, OpenChain, retire_out_of_scope},
};

/// PieceInstances and chain checkpoints as last committed for a rundown.
///
/// The checkpoint of a Part is the chain state after that Part; it seeds incremental runs that
/// start at the following Part.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommittedState {
    /// PieceInstances per hosting Part. Parts without instances are absent.
    #[serde(default)]
    pub instances: BTreeMap<PartId, Vec<PieceInstance>>,
    /// Chain state after each Part.
    #[serde(default)]
    pub checkpoints: BTreeMap<PartId, ChainState>,
}

impl CommittedState {
    /// Committed instances hosted by `part`.
    pub fn instances_for(&self, part: &PartId) -> &[PieceInstance] {
        self.instances.get(part).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All committed instances in Part order of their keys.
    pub fn iter(&self) -> impl Iterator<Item = &PieceInstance> {
        self.instances.values().flatten()
    }

    /// `true` when nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.checkpoints.is_empty()
    }

    /// Set an operator duration override on a committed instance and return the updated
    /// instance.
    pub fn set_duration_override(
        &mut self,
        id: &PieceInstanceId,
        duration: Option<Millis>,
    ) -> PlayoutResult<&PieceInstance> {
        let inst = self
            .instances
            .values_mut()
            .flatten()
            .find(|inst| &inst.id == id)
            .ok_or_else(|| {
                PlayoutError::precondition(format!("unknown piece instance '{id}'"))
            })?;
        inst.duration_override = duration;
        Ok(inst)
    }

    fn overrides(&self) -> HashMap<&PieceInstanceId, Millis> {
        self.iter()
            .filter_map(|inst| inst.duration_override.map(|d| (&inst.id, d)))
            .collect()
    }
}

/// Propagation output for one Part.
#[derive(Clone, Debug, PartialEq)]
pub struct PartPropagation {
    /// Hosting Part.
    pub part_id: PartId,
    /// Instances in canonical order.
    pub instances: Vec<PieceInstance>,
    /// Chain state after this Part.
    pub checkpoint: ChainState,
}

/// Output of [`propagate`] for a whole rundown, in Part order.
#[derive(Clone, Debug, PartialEq)]
pub struct PropagationResult {
    /// Rundown the result belongs to.
    pub rundown_id: RundownId,
    /// Every Part of the rundown in playout order.
    pub parts: Vec<PartPropagation>,
    /// First recomputed Part; earlier Parts were copied from the committed state.
    pub recomputed_from: Option<PartId>,
    /// `true` when every Part was recomputed.
    pub full: bool,
}

impl PropagationResult {
    /// All instances in Part order.
    pub fn instances(&self) -> impl Iterator<Item = &PieceInstance> {
        self.parts.iter().flat_map(|p| p.instances.iter())
    }

    /// Instances hosted by `part`.
    pub fn instances_for(&self, part: &PartId) -> &[PieceInstance] {
        self.parts
            .iter()
            .find(|p| &p.part_id == part)
            .map(|p| p.instances.as_slice())
            .unwrap_or(&[])
    }

    /// Convert into the state that becomes the seed for the next run.
    pub fn into_committed(self) -> CommittedState {
        let mut state = CommittedState::default();
        for part in self.parts {
            if !part.instances.is_empty() {
                state.instances.insert(part.part_id.clone(), part.instances);
            }
            state.checkpoints.insert(part.part_id, part.checkpoint);
        }
        state
    }
}

/// Materialize PieceInstances for every Part of `rundown`.
///
/// With `from_part`, Parts before it are copied from `committed` and the chain state is seeded
/// from the checkpoint of its predecessor. When that checkpoint is missing or stale the run
/// falls back to a full recomputation. Re-running over the same input reproduces identical ids
/// and values; `duration_override` values of committed instances are carried over by id.
#[tracing::instrument(skip(rundown, committed), fields(rundown = %rundown.id))]
pub fn propagate(
    rundown: &Rundown,
    from_part: Option<&PartId>,
    committed: &CommittedState,
) -> PlayoutResult<PropagationResult> {
    let index = rundown.index()?;
    let parts = index.parts();

    let requested = match from_part {
        None => 0,
        Some(id) => index.position(id).ok_or_else(|| {
            PlayoutError::precondition(format!("unknown from_part '{id}'"))
        })?,
    };

    let (start, seed) = match seed_state(&index, requested, committed) {
        Ok(seeded) => seeded,
        Err(e) => {
            tracing::warn!(error = %e, "incremental propagation not possible, recomputing all parts");
            (0, ChainState::new())
        }
    };

    let mut out = Vec::with_capacity(parts.len());
    for part in &parts[..start] {
        out.push(PartPropagation {
            part_id: part.id.clone(),
            instances: committed.instances_for(&part.id).to_vec(),
            checkpoint: committed
                .checkpoints
                .get(&part.id)
                .cloned()
                .unwrap_or_default(),
        });
    }

    let overrides = committed.overrides();
    let mut state = seed;
    for part in &parts[start..] {
        let (next, mut instances) =
            propagate_part(&rundown.id, state, part, index.pieces_for(&part.id), &index)?;
        for inst in &mut instances {
            if let Some(d) = overrides.get(&inst.id) {
                inst.duration_override = Some(*d);
            }
        }
        sort_instances(&mut instances);
        out.push(PartPropagation {
            part_id: part.id.clone(),
            instances,
            checkpoint: next.clone(),
        });
        state = next;
    }

    tracing::debug!(
        parts = out.len(),
        recomputed = parts.len() - start,
        "propagation finished"
    );

    Ok(PropagationResult {
        rundown_id: rundown.id.clone(),
        parts: out,
        recomputed_from: parts.get(start).map(|p| p.id.clone()),
        full: start == 0,
    })
}

/// Chain state entering Part `start`, read from the committed checkpoints.
fn seed_state(
    index: &RundownIndex<'_>,
    start: usize,
    committed: &CommittedState,
) -> PlayoutResult<(usize, ChainState)> {
    if start == 0 {
        return Ok((0, ChainState::new()));
    }
    let parts = index.parts();
    if let Some(missing) = parts[..start]
        .iter()
        .find(|p| !committed.checkpoints.contains_key(&p.id))
    {
        return Err(PlayoutError::inconsistent(format!(
            "no committed checkpoint for part '{}'",
            missing.id
        )));
    }

    let predecessor = &parts[start - 1].id;
    let seed = committed
        .checkpoints
        .get(predecessor)
        .cloned()
        .unwrap_or_default();
    for (layer, chain) in &seed {
        let current = index.piece(&chain.origin_piece).filter(|piece| {
            &piece.source_layer_id == layer
                && piece.lifespan == chain.lifespan
                && piece.part_id == chain.origin_part
                && piece.kind == PieceKind::Content
        });
        if current.is_none() {
            return Err(PlayoutError::inconsistent(format!(
                "checkpoint of part '{predecessor}' names stale chain origin '{}'",
                chain.origin_piece
            )));
        }
    }
    Ok((start, seed))
}

/// Advance the chain state across one Part, returning the new state and the Part's instances.
fn propagate_part(
    rundown_id: &RundownId,
    state: ChainState,
    part: &Part,
    pieces: &[&Piece],
    index: &RundownIndex<'_>,
) -> PlayoutResult<(ChainState, Vec<PieceInstance>)> {
    let mut state = retire_out_of_scope(state, part);
    let mut instances: Vec<PieceInstance> = Vec::with_capacity(pieces.len() + state.len());

    for piece in pieces {
        let layer = &piece.source_layer_id;
        let offset = piece.enable.sort_offset();

        if let Some(chain) = state.remove(layer) {
            close_chain(rundown_id, &chain, part, offset, index, &mut instances)?;
        }

        if piece.kind == PieceKind::Blocker {
            continue;
        }
        instances.push(PieceInstance::original(rundown_id, piece));
        if piece.lifespan.propagates() {
            tracing::debug!(layer = %layer, piece = %piece.id, part = %part.id, "chain opened");
            state.insert(layer.clone(), OpenChain::open(piece, part));
        }
    }

    for chain in state.values().filter(|c| c.carried_into(part)) {
        let origin = origin_piece(index, chain)?;
        instances.push(PieceInstance::continuation(rundown_id, origin, &part.id));
    }

    Ok((state, instances))
}

/// End `chain` at `offset` ms into `part`.
fn close_chain(
    rundown_id: &RundownId,
    chain: &OpenChain,
    part: &Part,
    offset: Millis,
    index: &RundownIndex<'_>,
    instances: &mut Vec<PieceInstance>,
) -> PlayoutResult<()> {
    tracing::debug!(
        origin = %chain.origin_piece,
        part = %part.id,
        offset,
        "chain closed"
    );
    if chain.carried_into(part) {
        if offset > 0 {
            let origin = origin_piece(index, chain)?;
            let mut cont = PieceInstance::continuation(rundown_id, origin, &part.id);
            cont.cropped_at = Some(offset);
            instances.push(cont);
        }
        return Ok(());
    }

    // Opened earlier in this Part: crop the original instead.
    if let Some(inst) = instances
        .iter_mut()
        .find(|inst| !inst.is_continuation() && inst.piece.id == chain.origin_piece)
    {
        inst.cropped_at = Some(offset);
    }
    Ok(())
}

fn origin_piece<'a>(index: &RundownIndex<'a>, chain: &OpenChain) -> PlayoutResult<&'a Piece> {
    index.piece(&chain.origin_piece).ok_or_else(|| {
        PlayoutError::inconsistent(format!(
            "chain origin '{}' is missing from the rundown",
            chain.origin_piece
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/propagate/engine.rs"]
mod tests;

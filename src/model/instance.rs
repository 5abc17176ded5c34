use crate::{
    foundation::core::{
        Millis, PartId, PartInstanceId, PieceId, PieceInstanceId, RundownId, SourceLayerId,
    },
    foundation::hash::{continuation_id, original_instance_id, part_instance_id},
    model::rundown::{Part, Piece, PieceEnable},
};

/// Playthrough-scoped materialization of a [`Piece`] inside a Part.
///
/// Originals live in the Part that defines the piece and have no `infinite_id`. Continuations
/// are produced by propagation in later Parts and point back at the piece that opened the chain.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PieceInstance {
    /// Deterministic instance id.
    pub id: PieceInstanceId,
    /// Owning rundown.
    pub rundown_id: RundownId,
    /// Part hosting this instance (not necessarily the piece's own Part).
    pub part_id: PartId,
    /// Snapshot of the piece.
    pub piece: Piece,
    /// Originating piece for continuations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infinite_id: Option<PieceId>,
    /// Part-relative end imposed by a later piece on the same source layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cropped_at: Option<Millis>,
    /// Operator-set duration; survives re-propagation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_override: Option<Millis>,
}

impl PieceInstance {
    /// Instance of `piece` inside its own Part.
    pub fn original(rundown_id: &RundownId, piece: &Piece) -> Self {
        Self {
            id: original_instance_id(&piece.id, &piece.part_id),
            rundown_id: rundown_id.clone(),
            part_id: piece.part_id.clone(),
            piece: piece.clone(),
            infinite_id: None,
            cropped_at: None,
            duration_override: None,
        }
    }

    /// Continuation of the chain opened by `origin`, hosted by `part`.
    ///
    /// The continuation starts with the Part and carries no own duration; it never acts as a
    /// transition of the hosting Part.
    pub fn continuation(rundown_id: &RundownId, origin: &Piece, part: &PartId) -> Self {
        let mut piece = origin.clone();
        piece.enable = PieceEnable::default();
        piece.is_transition = false;
        Self {
            id: continuation_id(&origin.id, part),
            rundown_id: rundown_id.clone(),
            part_id: part.clone(),
            piece,
            infinite_id: Some(origin.id.clone()),
            cropped_at: None,
            duration_override: None,
        }
    }

    /// `true` for instances carried over from an earlier Part.
    pub fn is_continuation(&self) -> bool {
        self.infinite_id.is_some()
    }

    /// `true` when a later piece on the same layer ends this instance early.
    pub fn is_cropped(&self) -> bool {
        self.cropped_at.is_some()
    }

    /// Source layer of the underlying piece.
    pub fn source_layer(&self) -> &SourceLayerId {
        &self.piece.source_layer_id
    }

    /// Id of the chain this instance belongs to: the originating piece.
    pub fn chain_id(&self) -> &PieceId {
        self.infinite_id.as_ref().unwrap_or(&self.piece.id)
    }

    pub(crate) fn sort_key(&self) -> (Millis, &SourceLayerId, &PieceInstanceId) {
        (self.piece.enable.sort_offset(), self.source_layer(), &self.id)
    }
}

/// Sort instances into the canonical per-Part order.
pub(crate) fn sort_instances(instances: &mut [PieceInstance]) {
    instances.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Playthrough-scoped materialization of a [`Part`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartInstance {
    /// Deterministic instance id, derived from the Part and the playthrough counter.
    pub id: PartInstanceId,
    /// Owning rundown.
    pub rundown_id: RundownId,
    /// Snapshot of the Part.
    pub part: Part,
    /// Playthrough counter within the playlist.
    pub playthrough: u64,
    /// Wall-clock (epoch ms) at which this instance went on air.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_playback: Option<Millis>,
    /// Pieces active in this instance, originals and continuations.
    #[serde(default)]
    pub piece_instances: Vec<PieceInstance>,
    /// Went on air through its transition; fixed at take and reused once this instance is the
    /// previous one.
    #[serde(default)]
    pub entered_with_transition: bool,
}

impl PartInstance {
    /// New, not yet playing instance of `part`.
    pub fn new(
        rundown_id: &RundownId,
        part: &Part,
        playthrough: u64,
        piece_instances: Vec<PieceInstance>,
    ) -> Self {
        Self {
            id: part_instance_id(&part.id, playthrough),
            rundown_id: rundown_id.clone(),
            part: part.clone(),
            playthrough,
            started_playback: None,
            piece_instances,
            entered_with_transition: false,
        }
    }

    /// Same instance, anchored at `started` (epoch ms).
    pub fn started_at(mut self, started: Millis) -> Self {
        self.started_playback = Some(started);
        self
    }

    /// Id of the Part this instance plays.
    pub fn part_id(&self) -> &PartId {
        &self.part.id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/instance.rs"]
mod tests;

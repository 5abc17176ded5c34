use std::collections::{HashMap, HashSet};

use crate::{
    foundation::core::{
        Millis, OutputLayerId, PartId, PieceId, RundownId, SegmentId, SourceLayerId,
        non_negative,
    },
    foundation::error::{PlayoutError, PlayoutResult},
    timeline::object::Trigger,
};

/// How far a piece survives past the Part that created it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PieceLifespan {
    /// Exists only within its own Part.
    #[default]
    WithinPart,
    /// Continues into later Parts of the same Segment.
    OutOnSegmentEnd,
    /// Continues into every later Part of the rundown ("infinite").
    OutOnRundownEnd,
}

impl PieceLifespan {
    /// `true` when pieces with this lifespan start a propagation chain.
    pub fn propagates(self) -> bool {
        !matches!(self, Self::WithinPart)
    }
}

/// Whether a piece renders anything.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    /// Regular on-air content.
    #[default]
    Content,
    /// Virtual piece: only terminates the open chain on its source layer.
    Blocker,
}

/// Start trigger and optional duration of a piece, relative to its Part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PieceEnable {
    /// Start trigger; `Absolute(n)` is an offset from the Part start.
    pub start: Trigger,
    /// Planned duration; open when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Millis>,
}

impl PieceEnable {
    /// Piece starting `offset` ms into its Part.
    pub fn at(offset: Millis) -> Self {
        Self {
            start: Trigger::Absolute(offset),
            duration: None,
        }
    }

    /// Part-relative start offset, when the start is absolute.
    pub fn start_offset(&self) -> Option<Millis> {
        match self.start {
            Trigger::Absolute(t) => Some(t.max(0)),
            Trigger::Relative(_) | Trigger::Logical(_) => None,
        }
    }

    /// Offset used for ordering and blocking; non-absolute starts count as the Part start.
    pub fn sort_offset(&self) -> Millis {
        self.start_offset().unwrap_or(0)
    }
}

/// Definition of on-air content attached to a Part.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Piece {
    /// Piece id, unique within the rundown.
    pub id: PieceId,
    /// Owning Part.
    pub part_id: PartId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Source layer; propagation chains are tracked per source layer.
    pub source_layer_id: SourceLayerId,
    /// Output layer the device sink routes this piece to.
    pub output_layer_id: OutputLayerId,
    /// Timing inside the Part.
    #[serde(default)]
    pub enable: PieceEnable,
    /// Propagation scope.
    #[serde(default)]
    pub lifespan: PieceLifespan,
    /// Content or chain blocker.
    #[serde(default)]
    pub kind: PieceKind,
    /// Marks the transition into this Part.
    #[serde(default)]
    pub is_transition: bool,
    /// Opaque device content.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub content: serde_json::Value,
}

/// Ranked, schedulable unit of a Segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Part {
    /// Part id, unique within the rundown.
    pub id: PartId,
    /// Owning Segment.
    pub segment_id: SegmentId,
    /// Order within the Segment.
    pub rank: f64,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Planned on-air duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_duration: Option<Millis>,
    /// Lead time the incoming content needs before it is visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preroll_duration: Option<Millis>,
    /// Lead time of the transition into this Part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_preroll_duration: Option<Millis>,
    /// How long the outgoing Part is kept alive under the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_keepalive_duration: Option<Millis>,
    /// Advance to the following Part automatically.
    #[serde(default)]
    pub autonext: bool,
    /// Overlap between this Part's end and the following Part's start when auto-advancing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonext_overlap: Option<Millis>,
    /// The Part after this one must cut in; its transition is ignored.
    #[serde(default)]
    pub disable_out_transition: bool,
}

impl Part {
    /// Expected duration, unset counting as zero.
    pub fn expected(&self) -> Millis {
        non_negative(self.expected_duration)
    }

    /// Preroll duration, unset counting as zero.
    pub fn preroll(&self) -> Millis {
        non_negative(self.preroll_duration)
    }

    /// Transition preroll duration, unset counting as zero.
    pub fn transition_preroll(&self) -> Millis {
        non_negative(self.transition_preroll_duration)
    }

    /// Transition keepalive duration, unset counting as zero.
    pub fn transition_keepalive(&self) -> Millis {
        non_negative(self.transition_keepalive_duration)
    }

    /// Autonext overlap, unset counting as zero.
    pub fn overlap(&self) -> Millis {
        non_negative(self.autonext_overlap)
    }
}

/// Named grouping of Parts.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Segment id, unique within the rundown.
    pub id: SegmentId,
    /// Order within the rundown.
    pub rank: f64,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Snapshot of a running order as supplied by ingest.
///
/// Parts and pieces are stored flat and reference their parent by id, like the documents they
/// are loaded from. Use [`Rundown::index`] for a validated, rank-ordered view.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rundown {
    /// Rundown id.
    pub id: RundownId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Segments (any order; sorted by rank).
    pub segments: Vec<Segment>,
    /// Parts (any order; sorted by segment rank, then part rank).
    pub parts: Vec<Part>,
    /// Pieces (any order).
    #[serde(default)]
    pub pieces: Vec<Piece>,
}

impl Rundown {
    /// Check the snapshot for duplicate ids, bad ranks and dangling references.
    ///
    /// Duplicates and non-finite ranks are [`PlayoutError::Validation`]; references to missing
    /// segments/parts are [`PlayoutError::Precondition`] (the caller passed an inconsistent
    /// snapshot).
    pub fn validate(&self) -> PlayoutResult<()> {
        let mut segment_ids = HashSet::with_capacity(self.segments.len());
        for segment in &self.segments {
            if !segment_ids.insert(&segment.id) {
                return Err(PlayoutError::validation(format!(
                    "duplicate segment id '{}'",
                    segment.id
                )));
            }
            if !segment.rank.is_finite() {
                return Err(PlayoutError::validation(format!(
                    "segment '{}' rank must be finite",
                    segment.id
                )));
            }
        }

        let mut part_ids = HashSet::with_capacity(self.parts.len());
        for part in &self.parts {
            if !part_ids.insert(&part.id) {
                return Err(PlayoutError::validation(format!(
                    "duplicate part id '{}'",
                    part.id
                )));
            }
            if !part.rank.is_finite() {
                return Err(PlayoutError::validation(format!(
                    "part '{}' rank must be finite",
                    part.id
                )));
            }
            if !segment_ids.contains(&part.segment_id) {
                return Err(PlayoutError::precondition(format!(
                    "part '{}' references missing segment '{}'",
                    part.id, part.segment_id
                )));
            }
        }

        let mut piece_ids = HashSet::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            if !piece_ids.insert(&piece.id) {
                return Err(PlayoutError::validation(format!(
                    "duplicate piece id '{}'",
                    piece.id
                )));
            }
            if !part_ids.contains(&piece.part_id) {
                return Err(PlayoutError::precondition(format!(
                    "piece '{}' references missing part '{}'",
                    piece.id, piece.part_id
                )));
            }
        }

        Ok(())
    }

    /// Parts in playout order: segment rank, part rank, then id as tie-break.
    pub fn ordered_parts(&self) -> Vec<&Part> {
        let segment_order: HashMap<&SegmentId, (f64, &SegmentId)> = self
            .segments
            .iter()
            .map(|s| (&s.id, (s.rank, &s.id)))
            .collect();

        let mut parts: Vec<(&(f64, &SegmentId), &Part)> = self
            .parts
            .iter()
            .filter_map(|p| segment_order.get(&p.segment_id).map(|key| (key, p)))
            .collect();
        parts.sort_by(|(sa, a), (sb, b)| {
            sa.0.total_cmp(&sb.0)
                .then_with(|| sa.1.cmp(sb.1))
                .then_with(|| a.rank.total_cmp(&b.rank))
                .then_with(|| a.id.cmp(&b.id))
        });
        parts.into_iter().map(|(_, p)| p).collect()
    }

    /// Validate and build the lookup view used by propagation and the playlist.
    pub fn index(&self) -> PlayoutResult<RundownIndex<'_>> {
        self.validate()?;
        Ok(RundownIndex::build(self))
    }
}

/// Validated, rank-ordered view over a [`Rundown`].
#[derive(Clone, Debug)]
pub struct RundownIndex<'a> {
    rundown: &'a Rundown,
    parts: Vec<&'a Part>,
    positions: HashMap<&'a PartId, usize>,
    pieces_by_part: HashMap<&'a PartId, Vec<&'a Piece>>,
    pieces: HashMap<&'a PieceId, &'a Piece>,
}

impl<'a> RundownIndex<'a> {
    fn build(rundown: &'a Rundown) -> Self {
        let parts = rundown.ordered_parts();
        let positions = parts.iter().enumerate().map(|(i, p)| (&p.id, i)).collect();

        let mut pieces_by_part: HashMap<&PartId, Vec<&Piece>> = HashMap::new();
        let mut pieces = HashMap::with_capacity(rundown.pieces.len());
        for piece in &rundown.pieces {
            pieces_by_part.entry(&piece.part_id).or_default().push(piece);
            pieces.insert(&piece.id, piece);
        }
        for list in pieces_by_part.values_mut() {
            list.sort_by(|a, b| {
                a.enable
                    .sort_offset()
                    .cmp(&b.enable.sort_offset())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        Self {
            rundown,
            parts,
            positions,
            pieces_by_part,
            pieces,
        }
    }

    /// Underlying snapshot.
    pub fn rundown(&self) -> &'a Rundown {
        self.rundown
    }

    /// Parts in playout order.
    pub fn parts(&self) -> &[&'a Part] {
        &self.parts
    }

    /// Position of `id` in playout order.
    pub fn position(&self, id: &PartId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Look up a Part.
    pub fn part(&self, id: &PartId) -> Option<&'a Part> {
        self.position(id).map(|i| self.parts[i])
    }

    /// First Part in playout order.
    pub fn first_part(&self) -> Option<&'a Part> {
        self.parts.first().copied()
    }

    /// Part following `id` in playout order.
    pub fn part_after(&self, id: &PartId) -> Option<&'a Part> {
        let i = self.position(id)?;
        self.parts.get(i + 1).copied()
    }

    /// Pieces of a Part ordered by start offset, then id.
    pub fn pieces_for(&self, id: &PartId) -> &[&'a Piece] {
        self.pieces_by_part
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a Piece.
    pub fn piece(&self, id: &PieceId) -> Option<&'a Piece> {
        self.pieces.get(id).copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/rundown.rs"]
mod tests;

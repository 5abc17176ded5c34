use crate::{
    foundation::core::{
        Millis, OutputLayerId, PartId, PieceId, RundownId, SegmentId, SourceLayerId,
    },
    foundation::error::{PlayoutError, PlayoutResult},
    model::rundown::{Part, Piece, PieceEnable, PieceKind, PieceLifespan, Rundown, Segment},
    timeline::object::Trigger,
};

/// Fluent construction of a [`Rundown`].
///
/// Segments and Parts receive ranks from their insertion order unless a rank is set explicitly.
pub struct RundownBuilder {
    id: String,
    name: String,
    segments: Vec<SegmentBuilder>,
}

impl RundownBuilder {
    /// Start a rundown with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            segments: Vec::new(),
        }
    }

    /// Display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a segment.
    pub fn segment(mut self, segment: SegmentBuilder) -> Self {
        self.segments.push(segment);
        self
    }

    /// Flatten and validate.
    pub fn build(self) -> PlayoutResult<Rundown> {
        if self.id.trim().is_empty() {
            return Err(PlayoutError::validation("rundown id must be non-empty"));
        }

        let mut rundown = Rundown {
            id: RundownId::new(self.id),
            name: self.name,
            segments: Vec::with_capacity(self.segments.len()),
            parts: Vec::new(),
            pieces: Vec::new(),
        };
        for (i, segment) in self.segments.into_iter().enumerate() {
            segment.flatten(i as f64, &mut rundown)?;
        }
        rundown.validate()?;
        Ok(rundown)
    }
}

/// Fluent construction of a [`Segment`] and its Parts.
pub struct SegmentBuilder {
    id: String,
    name: String,
    rank: Option<f64>,
    parts: Vec<PartBuilder>,
}

impl SegmentBuilder {
    /// Start a segment with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            rank: None,
            parts: Vec::new(),
        }
    }

    /// Display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Explicit rank instead of insertion order.
    pub fn rank(mut self, rank: f64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Append a part.
    pub fn part(mut self, part: PartBuilder) -> Self {
        self.parts.push(part);
        self
    }

    fn flatten(self, default_rank: f64, rundown: &mut Rundown) -> PlayoutResult<()> {
        if self.id.trim().is_empty() {
            return Err(PlayoutError::validation("segment id must be non-empty"));
        }
        let id = SegmentId::new(self.id);
        for (i, part) in self.parts.into_iter().enumerate() {
            part.flatten(&id, i as f64, rundown)?;
        }
        rundown.segments.push(Segment {
            id,
            rank: self.rank.unwrap_or(default_rank),
            name: self.name,
        });
        Ok(())
    }
}

/// Fluent construction of a [`Part`] and its Pieces.
pub struct PartBuilder {
    id: String,
    title: String,
    rank: Option<f64>,
    expected_duration: Option<Millis>,
    preroll_duration: Option<Millis>,
    transition_preroll_duration: Option<Millis>,
    transition_keepalive_duration: Option<Millis>,
    autonext: bool,
    autonext_overlap: Option<Millis>,
    disable_out_transition: bool,
    pieces: Vec<PieceBuilder>,
}

impl PartBuilder {
    /// Start a part with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            rank: None,
            expected_duration: None,
            preroll_duration: None,
            transition_preroll_duration: None,
            transition_keepalive_duration: None,
            autonext: false,
            autonext_overlap: None,
            disable_out_transition: false,
            pieces: Vec::new(),
        }
    }

    /// Display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Explicit rank instead of insertion order.
    pub fn rank(mut self, rank: f64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Planned duration.
    pub fn expected(mut self, ms: Millis) -> Self {
        self.expected_duration = Some(ms);
        self
    }

    /// Content preroll.
    pub fn preroll(mut self, ms: Millis) -> Self {
        self.preroll_duration = Some(ms);
        self
    }

    /// Transition preroll and keepalive.
    pub fn transition(mut self, preroll: Millis, keepalive: Millis) -> Self {
        self.transition_preroll_duration = Some(preroll);
        self.transition_keepalive_duration = Some(keepalive);
        self
    }

    /// Auto-advance to the next part, overlapping it by `overlap` ms.
    pub fn autonext(mut self, overlap: Millis) -> Self {
        self.autonext = true;
        self.autonext_overlap = Some(overlap);
        self
    }

    /// Force a cut into the following part.
    pub fn disable_out_transition(mut self) -> Self {
        self.disable_out_transition = true;
        self
    }

    /// Append a piece.
    pub fn piece(mut self, piece: PieceBuilder) -> Self {
        self.pieces.push(piece);
        self
    }

    fn flatten(
        self,
        segment_id: &SegmentId,
        default_rank: f64,
        rundown: &mut Rundown,
    ) -> PlayoutResult<()> {
        if self.id.trim().is_empty() {
            return Err(PlayoutError::validation("part id must be non-empty"));
        }
        let id = PartId::new(self.id);
        for piece in self.pieces {
            rundown.pieces.push(piece.build(&id)?);
        }
        rundown.parts.push(Part {
            id,
            segment_id: segment_id.clone(),
            rank: self.rank.unwrap_or(default_rank),
            title: self.title,
            expected_duration: self.expected_duration,
            preroll_duration: self.preroll_duration,
            transition_preroll_duration: self.transition_preroll_duration,
            transition_keepalive_duration: self.transition_keepalive_duration,
            autonext: self.autonext,
            autonext_overlap: self.autonext_overlap,
            disable_out_transition: self.disable_out_transition,
        });
        Ok(())
    }
}

/// Fluent construction of a [`Piece`].
pub struct PieceBuilder {
    id: String,
    name: String,
    source_layer: String,
    output_layer: Option<String>,
    enable: PieceEnable,
    lifespan: PieceLifespan,
    kind: PieceKind,
    is_transition: bool,
    content: serde_json::Value,
}

impl PieceBuilder {
    /// Start a piece on `source_layer`; the output layer defaults to the same name.
    pub fn new(id: impl Into<String>, source_layer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            source_layer: source_layer.into(),
            output_layer: None,
            enable: PieceEnable::default(),
            lifespan: PieceLifespan::WithinPart,
            kind: PieceKind::Content,
            is_transition: false,
            content: serde_json::Value::Null,
        }
    }

    /// Display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Route to a different output layer.
    pub fn output_layer(mut self, layer: impl Into<String>) -> Self {
        self.output_layer = Some(layer.into());
        self
    }

    /// Start `ms` after the part start.
    pub fn start(mut self, ms: Millis) -> Self {
        self.enable.start = Trigger::Absolute(ms);
        self
    }

    /// Arbitrary start trigger.
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.enable.start = trigger;
        self
    }

    /// Fixed duration.
    pub fn duration(mut self, ms: Millis) -> Self {
        self.enable.duration = Some(ms);
        self
    }

    /// Propagation scope.
    pub fn lifespan(mut self, lifespan: PieceLifespan) -> Self {
        self.lifespan = lifespan;
        self
    }

    /// Make this a virtual piece that only ends the chain on its layer.
    pub fn blocker(mut self) -> Self {
        self.kind = PieceKind::Blocker;
        self
    }

    /// Mark as the transition into its part.
    pub fn transition(mut self) -> Self {
        self.is_transition = true;
        self
    }

    /// Opaque device content.
    pub fn content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    fn build(self, part_id: &PartId) -> PlayoutResult<Piece> {
        if self.id.trim().is_empty() {
            return Err(PlayoutError::validation("piece id must be non-empty"));
        }
        if self.source_layer.trim().is_empty() {
            return Err(PlayoutError::validation(format!(
                "piece '{}' source layer must be non-empty",
                self.id
            )));
        }
        if self.enable.duration.is_some_and(|d| d < 0) {
            return Err(PlayoutError::validation(format!(
                "piece '{}' duration must be non-negative",
                self.id
            )));
        }
        let output_layer = self
            .output_layer
            .unwrap_or_else(|| self.source_layer.clone());
        Ok(Piece {
            id: PieceId::new(self.id),
            part_id: part_id.clone(),
            name: self.name,
            source_layer_id: SourceLayerId::new(self.source_layer),
            output_layer_id: OutputLayerId::new(output_layer),
            enable: self.enable,
            lifespan: self.lifespan,
            kind: self.kind,
            is_transition: self.is_transition,
            content: self.content,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/dsl.rs"]
mod tests;

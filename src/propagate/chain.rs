use std::collections::BTreeMap;

use crate::{
    foundation::core::{PartId, PieceId, SegmentId, SourceLayerId},
    model::rundown::{Part, Piece, PieceLifespan},
};

/// Head of a propagation chain on one source layer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OpenChain {
    /// Piece that opened the chain.
    pub origin_piece: PieceId,
    /// Part defining the origin piece.
    pub origin_part: PartId,
    /// Segment of the origin part; bounds `OutOnSegmentEnd` chains.
    pub origin_segment: SegmentId,
    /// Scope of the chain.
    pub lifespan: PieceLifespan,
}

/// Open chains keyed by source layer, as they stand after a given Part.
pub type ChainState = BTreeMap<SourceLayerId, OpenChain>;

impl OpenChain {
    /// Chain opened by `piece` in `part`.
    pub fn open(piece: &Piece, part: &Part) -> Self {
        Self {
            origin_piece: piece.id.clone(),
            origin_part: part.id.clone(),
            origin_segment: part.segment_id.clone(),
            lifespan: piece.lifespan,
        }
    }

    /// `true` when the chain still applies inside `part`.
    pub fn reaches(&self, part: &Part) -> bool {
        match self.lifespan {
            PieceLifespan::WithinPart => part.id == self.origin_part,
            PieceLifespan::OutOnSegmentEnd => part.segment_id == self.origin_segment,
            PieceLifespan::OutOnRundownEnd => true,
        }
    }

    /// `true` when the chain arrived in `part` from an earlier Part.
    pub fn carried_into(&self, part: &Part) -> bool {
        self.origin_part != part.id
    }
}

/// Drop every chain whose scope ends before `part`.
pub(crate) fn retire_out_of_scope(state: ChainState, part: &Part) -> ChainState {
    state
        .into_iter()
        .filter(|(layer, chain)| {
            let keep = chain.reaches(part);
            if !keep {
                tracing::debug!(
                    layer = %layer,
                    origin = %chain.origin_piece,
                    part = %part.id,
                    "chain retired at segment boundary"
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/propagate/chain.rs"]
mod tests;

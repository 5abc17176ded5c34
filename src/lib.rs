//! Playout scheduling core for rundown-driven broadcast automation.
//!
//! Two deterministic stages turn an ingested running order into device instructions:
//!
//! - [`propagate`] walks Parts in rank order and materializes the [`PieceInstance`]s that carry
//!   long-lived ("infinite") pieces across Part boundaries.
//! - [`compile`] turns the previous/current/next [`PartInstance`]s into a flat list of
//!   [`TimelineObject`]s whose timing is expressed relative to each other.
//!
//! [`PlayoutWorker`] wires both into per-rundown job queues with atomic commits. See [`guide`]
//! for a walkthrough.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub mod guide;
pub(crate) mod model;
pub(crate) mod playout;
pub(crate) mod propagate;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Millis, OutputLayerId, PartId, PartInstanceId, PieceId, PieceInstanceId, RundownId,
    SegmentId, SourceLayerId, TimelineObjectId,
};
pub use crate::foundation::error::{PlayoutError, PlayoutResult};
pub use crate::foundation::hash::{continuation_id, original_instance_id, part_instance_id};

pub use crate::model::dsl::{PartBuilder, PieceBuilder, RundownBuilder, SegmentBuilder};
pub use crate::model::instance::{PartInstance, PieceInstance};
pub use crate::model::rundown::{
    Part, Piece, PieceEnable, PieceKind, PieceLifespan, Rundown, RundownIndex, Segment,
};

pub use crate::propagate::chain::{ChainState, OpenChain};
pub use crate::propagate::engine::{
    CommittedState, PartPropagation, PropagationResult, propagate,
};

pub use crate::timeline::compiler::{TimelineOpts, compile};
pub use crate::timeline::fingerprint::{TimelineFingerprint, fingerprint_timeline};
pub use crate::timeline::object::{
    Edge, Enable, ObjectKind, RelativeTime, TimelineDuration, TimelineObject, Trigger,
    part_group_id, piece_group_id, piece_object_id,
};
pub use crate::timeline::timing::{
    allows_transition, autonext_overlap_offset, autonext_target_duration, keepalive_offset,
    transition_contents_delay, transition_piece_delay,
};

pub use crate::playout::playlist::Playlist;
pub use crate::playout::store::RundownState;
pub use crate::playout::worker::{Job, JobOutcome, JobStatus, PlayoutWorker, WorkerOpts};
pub use crate::playout::write_set::WriteSet;

//! # Playout guide
//!
//! A walkthrough of how a running order becomes a device timeline.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Rundown`](crate::Rundown): flat snapshot of Segments, Parts and Pieces from ingest
//! - [`Piece`](crate::Piece): on-air content on a source layer, with a
//!   [`PieceLifespan`](crate::PieceLifespan) deciding how far it carries over
//! - [`PieceInstance`](crate::PieceInstance): a piece materialized inside one Part; continuations
//!   carry `infinite_id` pointing at the piece that opened the chain
//! - [`PartInstance`](crate::PartInstance): one playthrough of a Part, anchored by
//!   `started_playback` once it is on air
//! - [`TimelineObject`](crate::TimelineObject): a node of the graph handed to the device engine
//!
//! ## Propagation
//!
//! [`propagate`](crate::propagate) keeps one open chain per source layer while it walks the
//! Parts in order. A new piece on a layer closes the chain there; a
//! [`PieceKind::Blocker`](crate::PieceKind::Blocker) closes it without rendering anything. When
//! the closing piece starts after the Part start, the carried-in content still plays until then
//! and is marked with `cropped_at`.
//!
//! The state after every Part is kept as a checkpoint in
//! [`CommittedState`](crate::CommittedState), so an ingest that only touched Part *n* can call
//! `propagate(rundown, Some(n), committed)` and get the same answer as a full run.
//!
//! ```
//! use playout::{
//!     CommittedState, PartBuilder, PartId, PieceBuilder, PieceLifespan, RundownBuilder,
//!     SegmentBuilder, propagate,
//! };
//!
//! let rundown = RundownBuilder::new("news")
//!     .segment(
//!         SegmentBuilder::new("opener")
//!             .part(PartBuilder::new("titles").piece(
//!                 PieceBuilder::new("studio-bg", "background")
//!                     .lifespan(PieceLifespan::OutOnRundownEnd),
//!             ))
//!             .part(PartBuilder::new("host")),
//!     )
//!     .build()?;
//!
//! let result = propagate(&rundown, None, &CommittedState::default())?;
//! let host = result.instances_for(&PartId::new("host"));
//! assert_eq!(host.len(), 1);
//! assert!(host[0].is_continuation());
//! # Ok::<(), playout::PlayoutError>(())
//! ```
//!
//! ## Timeline compilation
//!
//! [`compile`](crate::compile) emits one group per PartInstance:
//!
//! - the previous group stays alive until `#<current>.start + keepalive`
//! - the current group starts at its `started_playback` anchor and runs open, or for a fixed
//!   target duration when the Part auto-advances
//! - the next group either starts at `#<current>.end - overlap` (auto-advance) or is emitted
//!   disabled at time 0 for lookahead
//!
//! Transition pieces get a nested group; regular content of that Part is positioned relative to
//! it so that content appears once the transition has covered the cut. Timing helpers live in
//! [`keepalive_offset`](crate::keepalive_offset),
//! [`autonext_target_duration`](crate::autonext_target_duration) and friends.
//!
//! ## Jobs
//!
//! [`PlayoutWorker`](crate::PlayoutWorker) queues [`Job`](crate::Job)s per rundown. Each job
//! works on a copy of the stored state and replaces it only on success. A failed ingest marks
//! the rundown as needing a reload; a failed take or set-next is rejected and changes nothing.
//! `Job::SetDurationOverride` changes one committed PieceInstance; later ingests keep the value.
//! Committed jobs report their [`WriteSet`](crate::WriteSet) and, once playback has started,
//! the timeline plus its [`TimelineFingerprint`](crate::TimelineFingerprint).

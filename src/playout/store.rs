use crate::{
    model::rundown::Rundown,
    playout::playlist::Playlist,
    propagate::engine::CommittedState,
    timeline::fingerprint::TimelineFingerprint,
};

/// Everything the worker keeps for one rundown between jobs.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RundownState {
    /// Last successfully ingested snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rundown: Option<Rundown>,
    /// Committed PieceInstances and checkpoints.
    #[serde(default)]
    pub committed: CommittedState,
    /// Playback pointers.
    #[serde(default)]
    pub playlist: Playlist,
    /// Set when an ingest failed; the next ingest recomputes everything.
    #[serde(default)]
    pub needs_reload: bool,
    /// Fingerprint of the last published timeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<TimelineFingerprint>,
}

impl RundownState {
    /// Loaded snapshot, if ingest has succeeded at least once.
    pub fn loaded(&self) -> Option<&Rundown> {
        self.rundown.as_ref()
    }
}

use crate::{
    foundation::core::{Millis, PartId},
    foundation::error::{PlayoutError, PlayoutResult},
    model::{
        instance::PartInstance,
        rundown::{Rundown, RundownIndex},
    },
    propagate::engine::CommittedState,
    timeline::{
        compiler::{TimelineOpts, compile},
        object::TimelineObject,
        timing::allows_transition,
    },
};

/// Previous/current/next pointers of a rundown being played.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Playlist {
    /// Part that was on air before the current one; kept alive for its keepalive window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<PartInstance>,
    /// Part on air.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PartInstance>,
    /// Part queued for the next take.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PartInstance>,
    /// Playthrough counter handed to the next PartInstance created.
    #[serde(default)]
    pub next_playthrough: u64,
}

impl Playlist {
    /// `true` once a Part has been taken.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Queue `part` as the next Part.
    pub fn set_next(
        &mut self,
        rundown: &Rundown,
        committed: &CommittedState,
        part: &PartId,
    ) -> PlayoutResult<()> {
        let index = rundown.index()?;
        let next = self.instantiate(&index, committed, part)?;
        self.next = Some(next);
        Ok(())
    }

    /// Put the queued next Part on air at `now` (epoch ms).
    ///
    /// The current Part becomes the previous one and the Part following the new current one is
    /// queued as next, if any. Leaves the playlist untouched on error.
    #[tracing::instrument(skip(self, rundown, committed), fields(rundown = %rundown.id))]
    pub fn take(
        &mut self,
        rundown: &Rundown,
        committed: &CommittedState,
        now: Millis,
    ) -> PlayoutResult<()> {
        let index = rundown.index()?;
        let next = self
            .next
            .as_ref()
            .ok_or_else(|| PlayoutError::precondition("no next part to take"))?;
        if index.part(next.part_id()).is_none() {
            return Err(PlayoutError::precondition(format!(
                "next part '{}' is no longer in the rundown",
                next.part_id()
            )));
        }

        let mut staged = self.clone();
        let Some(taken) = staged.next.take() else {
            return Err(PlayoutError::precondition("no next part to take"));
        };
        let following = index.part_after(taken.part_id()).map(|p| p.id.clone());
        staged.previous = staged.current.take();
        let mut taken = taken.started_at(now);
        taken.entered_with_transition =
            allows_transition(staged.previous.as_ref().map(|p| &p.part));
        staged.current = Some(taken);
        if let Some(id) = following {
            staged.next = Some(staged.instantiate(&index, committed, &id)?);
        }

        tracing::info!(
            part = ?staged.current.as_ref().map(|c| c.part_id().to_string()),
            now,
            "take"
        );
        *self = staged;
        Ok(())
    }

    /// Re-read Part snapshots and PieceInstances of current and next after an ingest.
    ///
    /// A next Part that disappeared from the rundown is replaced by the Part following the
    /// current one. The previous Part keeps the snapshot it went off air with.
    pub fn refresh(&mut self, rundown: &Rundown, committed: &CommittedState) -> PlayoutResult<()> {
        let index = rundown.index()?;
        let mut staged = self.clone();

        if let Some(cur) = staged.current.as_mut()
            && let Some(part) = index.part(cur.part_id())
        {
            cur.part = part.clone();
            cur.piece_instances = committed.instances_for(&part.id).to_vec();
        }

        let next_part = staged
            .next
            .as_ref()
            .filter(|n| index.part(n.part_id()).is_some())
            .map(|n| (n.part_id().clone(), n.playthrough));
        staged.next = match next_part {
            Some((id, playthrough)) => {
                let part = index.part(&id).ok_or_else(|| {
                    PlayoutError::inconsistent(format!("next part '{id}' vanished"))
                })?;
                Some(PartInstance::new(
                    &rundown.id,
                    part,
                    playthrough,
                    committed.instances_for(&id).to_vec(),
                ))
            }
            None => match staged
                .current
                .as_ref()
                .and_then(|c| index.part_after(c.part_id()))
                .map(|p| p.id.clone())
            {
                Some(id) => Some(staged.instantiate(&index, committed, &id)?),
                None => None,
            },
        };

        *self = staged;
        Ok(())
    }

    /// Compile the timeline for the active pointers.
    pub fn timeline(&self, opts: &TimelineOpts) -> PlayoutResult<Vec<TimelineObject>> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| PlayoutError::precondition("no current part instance"))?;
        Ok(compile(
            self.previous.as_ref(),
            current,
            self.next.as_ref(),
            opts,
        ))
    }

    fn instantiate(
        &mut self,
        index: &RundownIndex<'_>,
        committed: &CommittedState,
        part: &PartId,
    ) -> PlayoutResult<PartInstance> {
        let found = index
            .part(part)
            .ok_or_else(|| PlayoutError::precondition(format!("unknown part '{part}'")))?;
        let inst = PartInstance::new(
            &index.rundown().id,
            found,
            self.next_playthrough,
            committed.instances_for(part).to_vec(),
        );
        self.next_playthrough += 1;
        Ok(inst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playout/playlist.rs"]
mod tests;

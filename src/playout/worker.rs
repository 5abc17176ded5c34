use std::collections::{BTreeMap, VecDeque};

use rayon::prelude::*;

use crate::{
    foundation::core::{Millis, PartId, PieceInstanceId, RundownId},
    foundation::error::{PlayoutError, PlayoutResult},
    model::rundown::Rundown,
    playout::{playlist::Playlist, store::RundownState, write_set::WriteSet},
    propagate::engine::propagate,
    timeline::{
        compiler::TimelineOpts,
        fingerprint::{TimelineFingerprint, fingerprint_timeline},
        object::TimelineObject,
    },
};

/// Unit of work for one rundown.
#[derive(Clone, Debug)]
pub enum Job {
    /// New snapshot from ingest, with the first Part that changed (if known).
    Ingest {
        /// The complete snapshot.
        rundown: Rundown,
        /// First changed Part; `None` recomputes every Part.
        changed_from: Option<PartId>,
    },
    /// Operator queued a Part as next.
    SetNext {
        /// Target rundown.
        rundown_id: RundownId,
        /// Part to queue.
        part_id: PartId,
    },
    /// Operator take.
    Take {
        /// Target rundown.
        rundown_id: RundownId,
        /// Wall-clock time of the take (epoch ms).
        now: Millis,
    },
    /// Operator set (or cleared) the duration of one PieceInstance.
    SetDurationOverride {
        /// Target rundown.
        rundown_id: RundownId,
        /// Instance to change.
        piece_instance_id: PieceInstanceId,
        /// New duration; `None` clears the override.
        duration: Option<Millis>,
    },
}

impl Job {
    /// Rundown whose queue this job belongs to.
    pub fn rundown_id(&self) -> &RundownId {
        match self {
            Self::Ingest { rundown, .. } => &rundown.id,
            Self::SetNext { rundown_id, .. }
            | Self::Take { rundown_id, .. }
            | Self::SetDurationOverride { rundown_id, .. } => rundown_id,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Ingest { .. } => "ingest",
            Self::SetNext { .. } => "set_next",
            Self::Take { .. } => "take",
            Self::SetDurationOverride { .. } => "set_duration_override",
        }
    }
}

/// How a job ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Changes were committed.
    Committed,
    /// Ingest failed; the rundown must be reloaded and nothing was committed.
    NeedsReload(String),
    /// Operator action refused; nothing was committed.
    Rejected(String),
}

/// Result of one job.
#[derive(Clone, Debug)]
pub struct JobOutcome {
    /// Rundown the job ran against.
    pub rundown_id: RundownId,
    /// Final status.
    pub status: JobStatus,
    /// PieceInstance mutations committed by an ingest or a duration override.
    pub write_set: Option<WriteSet>,
    /// Timeline to publish, when the playlist is active.
    pub timeline: Option<Vec<TimelineObject>>,
    /// Fingerprint of `timeline`.
    pub fingerprint: Option<TimelineFingerprint>,
    /// `false` when `timeline` equals the previously published one.
    pub timeline_changed: bool,
}

impl JobOutcome {
    fn failed(rundown_id: RundownId, status: JobStatus) -> Self {
        Self {
            rundown_id,
            status,
            write_set: None,
            timeline: None,
            fingerprint: None,
            timeline_changed: false,
        }
    }

    /// `true` for committed jobs.
    pub fn is_committed(&self) -> bool {
        self.status == JobStatus::Committed
    }
}

/// Worker configuration.
#[derive(Clone, Debug)]
pub struct WorkerOpts {
    /// Run queues of different rundowns in parallel.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Options handed to the timeline compiler.
    pub timeline: TimelineOpts,
}

impl Default for WorkerOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            timeline: TimelineOpts::default(),
        }
    }
}

/// In-memory job runner: FIFO per rundown, rundowns independent of each other.
pub struct PlayoutWorker {
    opts: WorkerOpts,
    states: BTreeMap<RundownId, RundownState>,
    queues: BTreeMap<RundownId, VecDeque<Job>>,
}

impl PlayoutWorker {
    /// Empty worker.
    pub fn new(opts: WorkerOpts) -> Self {
        Self {
            opts,
            states: BTreeMap::new(),
            queues: BTreeMap::new(),
        }
    }

    /// Queue a job behind earlier jobs of the same rundown.
    pub fn submit(&mut self, job: Job) {
        self.queues
            .entry(job.rundown_id().clone())
            .or_default()
            .push_back(job);
    }

    /// Number of queued jobs.
    pub fn pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Stored state of a rundown.
    pub fn state(&self, id: &RundownId) -> Option<&RundownState> {
        self.states.get(id)
    }

    /// Drain every queue. Outcomes are grouped by rundown id, in submission order per rundown.
    ///
    /// Fails only when the thread pool cannot be built, in which case every job stays queued.
    /// Job failures are reported per outcome.
    pub fn run_pending(&mut self) -> PlayoutResult<Vec<JobOutcome>> {
        let pool = if self.opts.parallel && self.queues.len() > 1 {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        let work: Vec<(RundownId, RundownState, VecDeque<Job>)> = std::mem::take(&mut self.queues)
            .into_iter()
            .map(|(id, jobs)| {
                let state = self.states.remove(&id).unwrap_or_default();
                (id, state, jobs)
            })
            .collect();
        if work.is_empty() {
            return Ok(Vec::new());
        }

        let timeline_opts = &self.opts.timeline;
        let run = |(id, mut state, jobs): (RundownId, RundownState, VecDeque<Job>)| {
            let outcomes: Vec<JobOutcome> = jobs
                .into_iter()
                .map(|job| run_job(&mut state, job, timeline_opts))
                .collect();
            (id, state, outcomes)
        };

        let finished: Vec<(RundownId, RundownState, Vec<JobOutcome>)> = match &pool {
            Some(pool) => pool.install(|| work.into_par_iter().map(run).collect()),
            None => work.into_iter().map(run).collect(),
        };

        let mut out = Vec::new();
        for (id, state, outcomes) in finished {
            self.states.insert(id, state);
            out.extend(outcomes);
        }
        Ok(out)
    }
}

fn build_thread_pool(threads: Option<usize>) -> PlayoutResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PlayoutError::validation(
            "worker 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

/// Run one job against `state`, committing only on success.
#[tracing::instrument(skip_all, fields(rundown = %job.rundown_id(), job = job.name()))]
fn run_job(state: &mut RundownState, job: Job, opts: &TimelineOpts) -> JobOutcome {
    let rundown_id = job.rundown_id().clone();
    let is_ingest = matches!(job, Job::Ingest { .. });

    let staged = match job {
        Job::Ingest {
            rundown,
            changed_from,
        } => stage_ingest(state, rundown, changed_from),
        Job::SetNext { part_id, .. } => stage_set_next(state, &part_id),
        Job::Take { now, .. } => stage_take(state, now),
        Job::SetDurationOverride {
            piece_instance_id,
            duration,
            ..
        } => stage_duration_override(state, &piece_instance_id, duration),
    };

    let (next_state, write_set) = match staged {
        Ok(staged) => staged,
        Err(e) => {
            tracing::error!(error = %e, "job failed, nothing committed");
            let status = if is_ingest {
                state.needs_reload = true;
                JobStatus::NeedsReload(e.to_string())
            } else {
                JobStatus::Rejected(e.to_string())
            };
            return JobOutcome::failed(rundown_id, status);
        }
    };

    *state = next_state;
    let mut outcome = JobOutcome {
        rundown_id,
        status: JobStatus::Committed,
        write_set,
        timeline: None,
        fingerprint: None,
        timeline_changed: false,
    };

    if state.playlist.is_active() {
        match state.playlist.timeline(opts) {
            Ok(timeline) => {
                let fp = fingerprint_timeline(&timeline);
                outcome.timeline_changed = state.published != Some(fp);
                state.published = Some(fp);
                outcome.fingerprint = Some(fp);
                outcome.timeline = Some(timeline);
            }
            Err(e) => tracing::error!(error = %e, "timeline compile skipped"),
        }
    }
    outcome
}

type Staged = (RundownState, Option<WriteSet>);

fn stage_ingest(
    state: &RundownState,
    rundown: Rundown,
    changed_from: Option<PartId>,
) -> PlayoutResult<Staged> {
    let from = if state.needs_reload || state.rundown.is_none() {
        None
    } else {
        changed_from.as_ref()
    };
    let result = propagate(&rundown, from, &state.committed)?;
    let write_set = WriteSet::diff(&state.committed, &result);
    let committed = write_set.apply(&state.committed);

    let mut playlist: Playlist = state.playlist.clone();
    playlist.refresh(&rundown, &committed)?;
    if !playlist.is_active()
        && playlist.next.is_none()
        && let Some(first) = rundown.index()?.first_part()
    {
        let first = first.id.clone();
        playlist.set_next(&rundown, &committed, &first)?;
    }

    tracing::info!(
        inserted = write_set.inserted.len(),
        updated = write_set.updated.len(),
        removed = write_set.removed.len(),
        "ingest staged"
    );
    Ok((
        RundownState {
            rundown: Some(rundown),
            committed,
            playlist,
            needs_reload: false,
            published: state.published,
        },
        Some(write_set),
    ))
}

fn stage_set_next(state: &RundownState, part: &PartId) -> PlayoutResult<Staged> {
    let rundown = loaded(state)?;
    let mut next = state.clone();
    next.playlist.set_next(rundown, &state.committed, part)?;
    Ok((next, None))
}

fn stage_take(state: &RundownState, now: Millis) -> PlayoutResult<Staged> {
    let rundown = loaded(state)?;
    let mut next = state.clone();
    next.playlist.take(rundown, &state.committed, now)?;
    Ok((next, None))
}

fn stage_duration_override(
    state: &RundownState,
    id: &PieceInstanceId,
    duration: Option<Millis>,
) -> PlayoutResult<Staged> {
    let rundown = loaded(state)?;
    let mut next = state.clone();
    let updated = next.committed.set_duration_override(id, duration)?.clone();
    next.playlist.refresh(rundown, &next.committed)?;
    let write_set = WriteSet {
        rundown_id: rundown.id.clone(),
        inserted: Vec::new(),
        updated: vec![updated],
        removed: Vec::new(),
        checkpoints: next.committed.checkpoints.clone(),
    };
    Ok((next, Some(write_set)))
}

fn loaded(state: &RundownState) -> PlayoutResult<&Rundown> {
    if state.needs_reload {
        return Err(PlayoutError::precondition("rundown needs reload"));
    }
    state
        .loaded()
        .ok_or_else(|| PlayoutError::precondition("rundown has not been ingested"))
}

#[cfg(test)]
#[path = "../../tests/unit/playout/worker.rs"]
mod tests;

use super::*;
use crate::model::{
    dsl::{PartBuilder, PieceBuilder, RundownBuilder, SegmentBuilder},
    rundown::PieceLifespan,
};

fn rundown(id: &str) -> Rundown {
    RundownBuilder::new(id)
        .segment(
            SegmentBuilder::new("s")
                .part(
                    PartBuilder::new("a").piece(
                        PieceBuilder::new("bg", "bg").lifespan(PieceLifespan::OutOnRundownEnd),
                    ),
                )
                .part(PartBuilder::new("b").expected(3000).autonext(200))
                .part(PartBuilder::new("c")),
        )
        .build()
        .unwrap()
}

fn ingest(id: &str) -> Job {
    Job::Ingest {
        rundown: rundown(id),
        changed_from: None,
    }
}

fn take(id: &str, now: Millis) -> Job {
    Job::Take {
        rundown_id: RundownId::new(id),
        now,
    }
}

#[test]
fn ingest_commits_and_queues_first_part() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(ingest("rd"));
    assert_eq!(w.pending(), 1);

    let out = w.run_pending().unwrap();
    assert_eq!(w.pending(), 0);
    assert_eq!(out.len(), 1);
    assert!(out[0].is_committed());
    assert_eq!(out[0].write_set.as_ref().unwrap().inserted.len(), 3);
    assert!(out[0].timeline.is_none());

    let state = w.state(&RundownId::new("rd")).unwrap();
    assert_eq!(
        state.playlist.next.as_ref().unwrap().part_id().as_str(),
        "a"
    );
}

#[test]
fn take_publishes_timeline_once_per_change() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(ingest("rd"));
    w.submit(take("rd", 1000));
    w.submit(ingest("rd"));
    let out = w.run_pending().unwrap();
    assert_eq!(out.len(), 3);

    assert!(out[1].is_committed());
    assert!(out[1].timeline.is_some());
    assert!(out[1].timeline_changed);

    // unchanged snapshot: same timeline, nothing to republish
    assert!(out[2].write_set.as_ref().unwrap().is_empty());
    assert_eq!(out[2].fingerprint, out[1].fingerprint);
    assert!(!out[2].timeline_changed);
}

#[test]
fn take_before_ingest_is_rejected() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(take("rd", 0));
    let out = w.run_pending().unwrap();
    assert!(matches!(out[0].status, JobStatus::Rejected(_)));
}

#[test]
fn failed_ingest_needs_reload_and_keeps_state() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(ingest("rd"));
    w.run_pending().unwrap();
    let before = w.state(&RundownId::new("rd")).unwrap().committed.clone();

    let mut broken = rundown("rd");
    broken.pieces[0].part_id = PartId::new("gone");
    w.submit(Job::Ingest {
        rundown: broken,
        changed_from: None,
    });
    w.submit(take("rd", 5));
    let out = w.run_pending().unwrap();
    assert!(matches!(out[0].status, JobStatus::NeedsReload(_)));
    assert!(matches!(out[1].status, JobStatus::Rejected(_)));

    let state = w.state(&RundownId::new("rd")).unwrap();
    assert!(state.needs_reload);
    assert_eq!(state.committed, before);

    w.submit(Job::Ingest {
        rundown: rundown("rd"),
        changed_from: Some(PartId::new("b")),
    });
    let out = w.run_pending().unwrap();
    assert!(out[0].is_committed());
    assert!(!w.state(&RundownId::new("rd")).unwrap().needs_reload);
}

#[test]
fn set_next_unknown_part_is_rejected() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(ingest("rd"));
    w.submit(Job::SetNext {
        rundown_id: RundownId::new("rd"),
        part_id: PartId::new("zz"),
    });
    let out = w.run_pending().unwrap();
    assert!(matches!(out[1].status, JobStatus::Rejected(_)));
}

#[test]
fn parallel_run_matches_sequential() {
    let jobs = || {
        vec![
            ingest("one"),
            ingest("two"),
            take("one", 100),
            take("two", 200),
            take("one", 4000),
        ]
    };

    let mut seq = PlayoutWorker::new(WorkerOpts::default());
    let mut par = PlayoutWorker::new(WorkerOpts {
        parallel: true,
        threads: Some(2),
        ..WorkerOpts::default()
    });
    for job in jobs() {
        seq.submit(job.clone());
        par.submit(job);
    }
    let a = seq.run_pending().unwrap();
    let b = par.run_pending().unwrap();
    assert_eq!(a.len(), 5);
    let fa: Vec<_> = a.iter().map(|o| (o.rundown_id.clone(), o.fingerprint)).collect();
    let fb: Vec<_> = b.iter().map(|o| (o.rundown_id.clone(), o.fingerprint)).collect();
    assert_eq!(fa, fb);
    assert_eq!(
        seq.state(&RundownId::new("one")),
        par.state(&RundownId::new("one"))
    );
}

#[test]
fn zero_threads_is_rejected() {
    let mut w = PlayoutWorker::new(WorkerOpts {
        parallel: true,
        threads: Some(0),
        ..WorkerOpts::default()
    });
    w.submit(ingest("one"));
    w.submit(ingest("two"));
    assert!(w.run_pending().is_err());
    assert_eq!(w.pending(), 2);
}

#[test]
fn duration_override_survives_full_reingest() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(ingest("rd"));
    w.run_pending().unwrap();
    let state = w.state(&RundownId::new("rd")).unwrap();
    let target = state.committed.instances_for(&PartId::new("b"))[0].id.clone();

    w.submit(Job::SetDurationOverride {
        rundown_id: RundownId::new("rd"),
        piece_instance_id: target.clone(),
        duration: Some(1500),
    });
    w.submit(ingest("rd"));
    w.submit(take("rd", 1000));
    let out = w.run_pending().unwrap();
    assert!(out.iter().all(JobOutcome::is_committed));
    let updated = &out[0].write_set.as_ref().unwrap().updated;
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].duration_override, Some(1500));
    assert!(out[1].write_set.as_ref().unwrap().is_empty());

    let state = w.state(&RundownId::new("rd")).unwrap();
    let committed = state.committed.instances_for(&PartId::new("b"));
    assert_eq!(committed[0].id, target);
    assert_eq!(committed[0].duration_override, Some(1500));
    let next = state.playlist.next.as_ref().unwrap();
    assert_eq!(next.part_id().as_str(), "b");
    assert_eq!(next.piece_instances[0].duration_override, Some(1500));
}

#[test]
fn duration_override_on_unknown_instance_is_rejected() {
    let mut w = PlayoutWorker::new(WorkerOpts::default());
    w.submit(ingest("rd"));
    w.run_pending().unwrap();
    let before = w.state(&RundownId::new("rd")).unwrap().clone();

    w.submit(Job::SetDurationOverride {
        rundown_id: RundownId::new("rd"),
        piece_instance_id: PieceInstanceId::new("missing"),
        duration: Some(10),
    });
    let out = w.run_pending().unwrap();
    assert!(matches!(out[0].status, JobStatus::Rejected(_)));
    assert_eq!(w.state(&RundownId::new("rd")).unwrap(), &before);
}

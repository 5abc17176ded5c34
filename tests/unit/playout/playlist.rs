use super::*;
use crate::{
    model::{
        dsl::{PartBuilder, PieceBuilder, RundownBuilder, SegmentBuilder},
        rundown::PieceLifespan,
    },
    propagate::engine::propagate,
    timeline::object::{Trigger, part_group_id},
};

fn setup() -> (Rundown, CommittedState) {
    let rundown = RundownBuilder::new("rd")
        .segment(
            SegmentBuilder::new("s")
                .part(
                    PartBuilder::new("a").piece(
                        PieceBuilder::new("bg", "bg").lifespan(PieceLifespan::OutOnRundownEnd),
                    ),
                )
                .part(PartBuilder::new("b").piece(PieceBuilder::new("cam", "cam")))
                .part(PartBuilder::new("c")),
        )
        .build()
        .unwrap();
    let committed = propagate(&rundown, None, &CommittedState::default())
        .unwrap()
        .into_committed();
    (rundown, committed)
}

#[test]
fn take_rotates_pointers_and_queues_following_part() {
    let (r, c) = setup();
    let mut pl = Playlist::default();
    pl.set_next(&r, &c, &PartId::new("a")).unwrap();
    assert!(!pl.is_active());

    pl.take(&r, &c, 1000).unwrap();
    let cur = pl.current.as_ref().unwrap();
    assert_eq!(cur.part_id().as_str(), "a");
    assert_eq!(cur.started_playback, Some(1000));
    assert_eq!(pl.next.as_ref().unwrap().part_id().as_str(), "b");
    assert!(pl.previous.is_none());

    pl.take(&r, &c, 6000).unwrap();
    assert_eq!(pl.previous.as_ref().unwrap().part_id().as_str(), "a");
    let cur = pl.current.as_ref().unwrap();
    assert_eq!(cur.part_id().as_str(), "b");
    // own camera plus the background continuation
    assert_eq!(cur.piece_instances.len(), 2);
    assert_eq!(pl.next.as_ref().unwrap().part_id().as_str(), "c");
}

#[test]
fn take_without_next_is_rejected_and_leaves_state() {
    let (r, c) = setup();
    let mut pl = Playlist::default();
    pl.set_next(&r, &c, &PartId::new("c")).unwrap();
    pl.take(&r, &c, 0).unwrap();
    assert!(pl.next.is_none());

    let before = pl.clone();
    assert!(pl.take(&r, &c, 10).unwrap_err().is_precondition());
    assert_eq!(pl, before);
}

#[test]
fn set_next_to_unknown_part_fails() {
    let (r, c) = setup();
    let mut pl = Playlist::default();
    assert!(pl.set_next(&r, &c, &PartId::new("zz")).unwrap_err().is_precondition());
    assert_eq!(pl.next_playthrough, 0);
}

#[test]
fn playthroughs_give_distinct_instance_ids() {
    let (r, c) = setup();
    let mut pl = Playlist::default();
    pl.set_next(&r, &c, &PartId::new("a")).unwrap();
    let first = pl.next.as_ref().unwrap().id.clone();
    pl.set_next(&r, &c, &PartId::new("a")).unwrap();
    assert_ne!(pl.next.as_ref().unwrap().id, first);
}

#[test]
fn refresh_replaces_vanished_next() {
    let (r, c) = setup();
    let mut pl = Playlist::default();
    pl.set_next(&r, &c, &PartId::new("a")).unwrap();
    pl.take(&r, &c, 0).unwrap();

    let mut edited = r.clone();
    edited.parts.retain(|p| p.id.as_str() != "b");
    edited.pieces.retain(|p| p.part_id.as_str() != "b");
    let committed = propagate(&edited, None, &CommittedState::default())
        .unwrap()
        .into_committed();
    pl.refresh(&edited, &committed).unwrap();
    assert_eq!(pl.next.as_ref().unwrap().part_id().as_str(), "c");
    assert_eq!(pl.next.as_ref().unwrap().piece_instances.len(), 1);
}

#[test]
fn timeline_requires_current() {
    let (r, c) = setup();
    let mut pl = Playlist::default();
    assert!(
        pl.timeline(&TimelineOpts::default())
            .unwrap_err()
            .is_precondition()
    );

    pl.set_next(&r, &c, &PartId::new("a")).unwrap();
    pl.take(&r, &c, 700).unwrap();
    let objects = pl.timeline(&TimelineOpts::default()).unwrap();
    let cur = pl.current.as_ref().unwrap();
    assert_eq!(objects[0].id, part_group_id(&cur.id));
    assert_eq!(objects[0].enable.start, Trigger::Absolute(700));
}

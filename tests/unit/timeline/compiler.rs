use super::*;
use crate::{
    foundation::core::{OutputLayerId, PartId, PieceId, RundownId, SegmentId, SourceLayerId},
    model::rundown::{Part, Piece, PieceEnable, PieceLifespan},
};

fn part(id: &str) -> Part {
    Part {
        id: PartId::new(id),
        segment_id: SegmentId::new("s"),
        rank: 0.0,
        title: String::new(),
        expected_duration: None,
        preroll_duration: None,
        transition_preroll_duration: None,
        transition_keepalive_duration: None,
        autonext: false,
        autonext_overlap: None,
        disable_out_transition: false,
    }
}

fn piece(id: &str, part: &str, layer: &str, start: Millis) -> Piece {
    Piece {
        id: PieceId::new(id),
        part_id: PartId::new(part),
        name: String::new(),
        source_layer_id: SourceLayerId::new(layer),
        output_layer_id: OutputLayerId::new(layer),
        enable: PieceEnable::at(start),
        lifespan: PieceLifespan::WithinPart,
        kind: PieceKind::Content,
        is_transition: false,
        content: serde_json::Value::Null,
    }
}

fn instance(part: Part, pieces: Vec<Piece>) -> PartInstance {
    let rd = RundownId::new("rd");
    let pis = pieces
        .iter()
        .map(|p| PieceInstance::original(&rd, p))
        .collect();
    PartInstance::new(&rd, &part, 0, pis)
}

fn find<'a>(objects: &'a [TimelineObject], id: &TimelineObjectId) -> &'a TimelineObject {
    objects.iter().find(|o| &o.id == id).unwrap()
}

#[test]
fn current_only_emits_live_group_and_pieces() {
    let cur = instance(part("a"), vec![piece("cam", "a", "cam", 0)]).started_at(1000);
    let objects = compile(None, &cur, None, &TimelineOpts::default());
    assert_eq!(objects.len(), 2);

    let group = &objects[0];
    assert_eq!(group.kind, ObjectKind::PartGroup);
    assert_eq!(group.enable.start, Trigger::Absolute(1000));
    assert_eq!(group.enable.duration, TimelineDuration::Open);

    let cam = &objects[1];
    assert_eq!(cam.in_group.as_ref(), Some(&group.id));
    assert_eq!(cam.layer, Some(OutputLayerId::new("cam")));
    assert_eq!(cam.enable.start, Trigger::Absolute(0));
}

#[test]
fn next_without_autonext_is_disabled_lookahead() {
    let cur = instance(part("a"), vec![]).started_at(1000);
    let next = instance(part("b"), vec![piece("vt", "b", "vt", 0)]);
    let objects = compile(None, &cur, Some(&next), &TimelineOpts::default());

    let group = find(&objects, &part_group_id(&next.id));
    assert!(group.disabled);
    assert_eq!(group.enable.start, Trigger::Absolute(0));

    let no_lookahead = compile(
        None,
        &cur,
        Some(&next),
        &TimelineOpts {
            lookahead_next: false,
        },
    );
    assert_eq!(no_lookahead.len(), 1);
}

#[test]
fn transition_is_dropped_without_preceding_part() {
    let mut wipe = piece("wipe", "a", "mix", 0);
    wipe.is_transition = true;
    let cur = instance(part("a"), vec![wipe, piece("cam", "a", "cam", 0)]).started_at(0);
    let objects = compile(None, &cur, None, &TimelineOpts::default());
    assert!(objects.iter().all(|o| o.kind != ObjectKind::PieceGroup));
    assert_eq!(objects.len(), 2);
}

#[test]
fn transition_after_forced_cut_is_dropped() {
    let mut prev_part = part("a");
    prev_part.disable_out_transition = true;
    let prev = instance(prev_part, vec![]).started_at(0);

    let mut wipe = piece("wipe", "b", "mix", 0);
    wipe.is_transition = true;
    let cur = instance(part("b"), vec![wipe]).started_at(3000);
    let objects = compile(Some(&prev), &cur, None, &TimelineOpts::default());
    assert!(objects.iter().all(|o| o.kind == ObjectKind::PartGroup));
}

#[test]
fn blockers_are_not_emitted() {
    let mut stop = piece("stop", "a", "bg", 0);
    stop.kind = PieceKind::Blocker;
    let cur = instance(part("a"), vec![stop]).started_at(0);
    let objects = compile(None, &cur, None, &TimelineOpts::default());
    assert_eq!(objects.len(), 1);
}

#[test]
fn cropped_piece_ends_at_crop_point() {
    let rd = RundownId::new("rd");
    let mut bg = PieceInstance::original(&rd, &piece("bg", "a", "bg", 0));
    bg.cropped_at = Some(1500);
    let mut short = PieceInstance::original(&rd, &piece("gfx", "a", "gfx", 0));
    short.piece.enable.duration = Some(1000);
    short.cropped_at = Some(1500);

    let cur = PartInstance::new(&rd, &part("a"), 0, vec![bg.clone(), short.clone()]);
    let objects = compile(None, &cur, None, &TimelineOpts::default());
    let group = part_group_id(&cur.id);

    let bg_obj = find(&objects, &piece_object_id(&bg.id));
    assert_eq!(
        bg_obj.enable.duration,
        TimelineDuration::Until(RelativeTime::start_of(group, 1500))
    );
    let short_obj = find(&objects, &piece_object_id(&short.id));
    assert_eq!(short_obj.enable.duration, TimelineDuration::Fixed(1000));
}

#[test]
fn duration_override_wins_over_piece_duration() {
    let rd = RundownId::new("rd");
    let mut p = piece("vt", "a", "vt", 0);
    p.enable.duration = Some(5000);
    let mut pi = PieceInstance::original(&rd, &p);
    pi.duration_override = Some(3200);
    let cur = PartInstance::new(&rd, &part("a"), 0, vec![pi.clone()]);
    let objects = compile(None, &cur, None, &TimelineOpts::default());
    assert_eq!(
        find(&objects, &piece_object_id(&pi.id)).enable.duration,
        TimelineDuration::Fixed(3200)
    );
}

#[test]
fn previous_keeps_transition_layout_it_was_taken_with() {
    let mut b = part("b");
    b.preroll_duration = Some(300);
    b.transition_preroll_duration = Some(500);
    let mut wipe = piece("wipe", "b", "mix", 0);
    wipe.is_transition = true;
    wipe.enable.duration = Some(2500);
    let a = instance(part("a"), vec![]).started_at(0);
    let b = instance(b, vec![wipe, piece("cam", "b", "cam", 0)]).started_at(5000);

    let on_air = compile(Some(&a), &b, None, &TimelineOpts::default());

    let mut gone = b.clone();
    gone.entered_with_transition = true;
    let c = instance(part("c"), vec![]).started_at(9000);
    let after = compile(Some(&gone), &c, None, &TimelineOpts::default());

    let b_pieces = |objects: &[TimelineObject]| -> Vec<TimelineObject> {
        objects
            .iter()
            .filter(|o| o.part_instance_id == b.id && o.kind != ObjectKind::PartGroup)
            .cloned()
            .collect()
    };
    assert_eq!(b_pieces(&on_air).len(), 3);
    assert_eq!(b_pieces(&on_air), b_pieces(&after));

    // a previous instance that was cut to stays without its transition
    let cut = compile(Some(&b), &c, None, &TimelineOpts::default());
    assert!(cut.iter().all(|o| o.kind != ObjectKind::PieceGroup));
}

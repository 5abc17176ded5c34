use super::*;
use crate::foundation::core::{PartId, SegmentId};

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

#[test]
fn keepalive_covers_preroll_beyond_transition() {
    let a = part("a");
    let mut b = part("b");
    b.preroll_duration = Some(250);
    assert_eq!(keepalive_offset(&a, &b), 250);

    b.preroll_duration = Some(300);
    b.transition_preroll_duration = Some(500);
    b.transition_keepalive_duration = Some(400);
    assert_eq!(keepalive_offset(&a, &b), 400);

    b.preroll_duration = Some(500);
    b.transition_preroll_duration = Some(300);
    b.transition_keepalive_duration = Some(200);
    assert_eq!(keepalive_offset(&a, &b), 400);
}

#[test]
fn keepalive_after_forced_cut_uses_outgoing_overlap() {
    let mut a = part("a");
    a.disable_out_transition = true;
    a.autonext_overlap = Some(120);
    let mut b = part("b");
    b.transition_keepalive_duration = Some(900);
    assert_eq!(keepalive_offset(&a, &b), 120);
}

#[test]
fn overlap_offset_adds_autonext_overlap() {
    let mut b = part("b");
    b.autonext = true;
    b.autonext_overlap = Some(500);
    let mut c = part("c");
    c.preroll_duration = Some(350);
    assert_eq!(autonext_overlap_offset(&b, &c), 850);

    c.transition_preroll_duration = Some(600);
    assert_eq!(autonext_overlap_offset(&b, &c), 1100);

    b.disable_out_transition = true;
    assert_eq!(autonext_overlap_offset(&b, &c), 850);
}

#[test]
fn target_duration_requires_autonext_and_expected() {
    let mut b = part("b");
    b.expected_duration = Some(4500);
    assert_eq!(autonext_target_duration(None, &b), None);

    b.autonext = true;
    b.expected_duration = None;
    assert_eq!(autonext_target_duration(None, &b), None);
}

#[test]
fn target_duration_adds_preroll_and_previous_overlap() {
    let mut a = part("a");
    let mut b = part("b");
    b.autonext = true;
    b.autonext_overlap = Some(500);
    b.expected_duration = Some(4500);
    b.preroll_duration = Some(250);
    assert_eq!(autonext_target_duration(Some(&a), &b), Some(4750));
    assert_eq!(autonext_target_duration(None, &b), Some(4750));

    a.autonext_overlap = Some(100);
    assert_eq!(autonext_target_duration(Some(&a), &b), Some(4850));

    a.disable_out_transition = true;
    assert_eq!(autonext_target_duration(Some(&a), &b), Some(4750));
}

#[test]
fn target_duration_with_transition_timing() {
    let a = part("a");
    let mut b = part("b");
    b.autonext = true;
    b.expected_duration = Some(4000);
    b.preroll_duration = Some(300);
    b.transition_preroll_duration = Some(500);
    b.transition_keepalive_duration = Some(400);
    // raw = 4000 - (500 - 400) = 3900; + transition preroll 500
    assert_eq!(autonext_target_duration(Some(&a), &b), Some(4400));
}

#[test]
fn non_positive_target_leaves_group_open() {
    let mut b = part("b");
    b.autonext = true;
    b.expected_duration = Some(100);
    b.transition_preroll_duration = Some(400);
    b.preroll_duration = Some(0);
    // raw = 100 - 400 = -300; + 0 (no previous) = -300
    assert_eq!(autonext_target_duration(None, &b), None);
}

#[test]
fn transition_delays() {
    let mut b = part("b");
    b.preroll_duration = Some(300);
    b.transition_preroll_duration = Some(500);
    assert_eq!(transition_piece_delay(&b), 0);
    assert_eq!(transition_contents_delay(&b), 200);

    b.preroll_duration = Some(500);
    b.transition_preroll_duration = Some(300);
    assert_eq!(transition_piece_delay(&b), 200);
    assert_eq!(transition_contents_delay(&b), -200);
}

#[test]
fn transitions_need_a_preceding_part() {
    let mut a = part("a");
    assert!(!allows_transition(None));
    assert!(allows_transition(Some(&a)));
    a.disable_out_transition = true;
    assert!(!allows_transition(Some(&a)));
}

use super::*;
use crate::foundation::core::{PartInstanceId, TimelineObjectId};

fn group(start: i64) -> TimelineObject {
    TimelineObject {
        id: TimelineObjectId::new("part_group_x"),
        kind: ObjectKind::PartGroup,
        layer: None,
        enable: Enable {
            start: Trigger::Absolute(start),
            duration: TimelineDuration::Open,
        },
        in_group: None,
        disabled: false,
        content: serde_json::json!({ "b": 1, "a": [1, 2] }),
        part_instance_id: PartInstanceId::new("x"),
        piece_instance_id: None,
    }
}

#[test]
fn fingerprint_is_stable_and_content_sensitive() {
    let a = fingerprint_timeline(&[group(700)]);
    assert_eq!(a, fingerprint_timeline(&[group(700)]));
    assert_ne!(a, fingerprint_timeline(&[group(701)]));
    assert_ne!(a, fingerprint_timeline(&[]));

    let mut disabled = group(700);
    disabled.disabled = true;
    assert_ne!(a, fingerprint_timeline(&[disabled]));
    assert_eq!(a.to_string().len(), 32);
}

#[test]
fn content_key_order_does_not_matter() {
    let mut other = group(700);
    other.content = serde_json::from_str(r#"{ "a": [1, 2], "b": 1 }"#).unwrap();
    assert_eq!(
        fingerprint_timeline(&[group(700)]),
        fingerprint_timeline(&[other])
    );
}

#[test]
fn differing_content_changes_fingerprint() {
    let mut clip = group(700);
    clip.content = serde_json::json!({ "clip": "open.mov" });
    let mut other = group(700);
    other.content = serde_json::json!({ "clip": "close.mov" });
    assert_ne!(fingerprint_timeline(&[clip]), fingerprint_timeline(&[other]));
}

use crate::{
    foundation::hash::StableHasher,
    timeline::object::{
        Edge, Enable, ObjectKind, RelativeTime, TimelineDuration, TimelineObject, Trigger,
    },
};

/// Stable 128-bit fingerprint of a compiled timeline.
///
/// Used by the sink to skip republishing a timeline identical to the last one it sent.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimelineFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for TimelineFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint `objects` in order.
pub fn fingerprint_timeline(objects: &[TimelineObject]) -> TimelineFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(objects.len() as u64);
    for obj in objects {
        write_object(&mut h, obj);
    }
    let v = h.finish128();
    TimelineFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}

fn write_object(h: &mut StableHasher, obj: &TimelineObject) {
    h.write_str(obj.id.as_str());
    h.write_u8(match obj.kind {
        ObjectKind::PartGroup => 0,
        ObjectKind::PieceGroup => 1,
        ObjectKind::Piece => 2,
    });
    write_opt_str(h, obj.layer.as_ref().map(|l| l.as_str()));
    write_enable(h, &obj.enable);
    write_opt_str(h, obj.in_group.as_ref().map(|g| g.as_str()));
    h.write_bool(obj.disabled);
    // serde_json maps are key-sorted, so this is canonical.
    h.write_str(&obj.content.to_string());
    h.write_str(obj.part_instance_id.as_str());
    write_opt_str(h, obj.piece_instance_id.as_ref().map(|p| p.as_str()));
}

fn write_enable(h: &mut StableHasher, enable: &Enable) {
    match &enable.start {
        Trigger::Absolute(t) => {
            h.write_u8(0);
            h.write_i64(*t);
        }
        Trigger::Relative(r) => {
            h.write_u8(1);
            write_relative(h, r);
        }
        Trigger::Logical(expr) => {
            h.write_u8(2);
            h.write_str(expr);
        }
    }
    match &enable.duration {
        TimelineDuration::Open => h.write_u8(0),
        TimelineDuration::Fixed(d) => {
            h.write_u8(1);
            h.write_i64(*d);
        }
        TimelineDuration::Until(r) => {
            h.write_u8(2);
            write_relative(h, r);
        }
    }
}

fn write_relative(h: &mut StableHasher, r: &RelativeTime) {
    h.write_str(r.object.as_str());
    h.write_bool(matches!(r.edge, Edge::End));
    h.write_i64(r.offset);
}

fn write_opt_str(h: &mut StableHasher, v: Option<&str>) {
    match v {
        None => h.write_u8(0),
        Some(s) => {
            h.write_u8(1);
            h.write_str(s);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/fingerprint.rs"]
mod tests;

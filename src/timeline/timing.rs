//! Offsets between consecutive Parts.
//!
//! All functions are total: unset or negative configuration values count as zero.

use crate::{foundation::core::Millis, model::rundown::Part};

/// `true` when the Part following `preceding` may play its transition.
pub fn allows_transition(preceding: Option<&Part>) -> bool {
    preceding.is_some_and(|p| !p.disable_out_transition)
}

/// How long the outgoing Part `from` stays alive after `to` starts.
pub fn keepalive_offset(from: &Part, to: &Part) -> Millis {
    if from.disable_out_transition {
        return from.overlap();
    }
    to.transition_keepalive() + (to.preroll() - to.transition_preroll()).max(0)
}

/// How far before the end of `from` the group of `to` starts when auto-advancing.
pub fn autonext_overlap_offset(from: &Part, to: &Part) -> Millis {
    let lead = if !from.disable_out_transition && to.transition_preroll() > 0 {
        to.transition_preroll()
    } else {
        to.preroll()
    };
    let overlap = if from.autonext { from.overlap() } else { 0 };
    lead + overlap
}

/// Fixed group duration of an auto-advancing `part`, or `None` when the group stays open.
pub fn autonext_target_duration(previous: Option<&Part>, part: &Part) -> Option<Millis> {
    if !part.autonext {
        return None;
    }
    let expected = part.expected_duration?;
    let preroll = part.preroll();
    let raw = expected
        - (part.transition_preroll().max(preroll) - part.transition_keepalive().max(preroll));

    let target = match previous {
        Some(prev) if allows_transition(Some(prev)) => {
            let lead = if part.transition_preroll() > 0 {
                part.transition_preroll()
            } else {
                preroll
            };
            raw + prev.overlap() + lead
        }
        _ => raw + preroll,
    };
    (target > 0).then_some(target)
}

/// Start of a transition piece group inside the Part group.
pub fn transition_piece_delay(part: &Part) -> Millis {
    (part.preroll() - part.transition_preroll()).max(0)
}

/// Offset of regular content relative to the transition group start.
pub fn transition_contents_delay(part: &Part) -> Millis {
    part.transition_preroll() - part.preroll()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/timing.rs"]
mod tests;

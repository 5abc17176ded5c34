use crate::{
    foundation::core::{Millis, TimelineObjectId},
    model::{
        instance::{PartInstance, PieceInstance},
        rundown::PieceKind,
    },
    timeline::{
        object::{
            Enable, ObjectKind, RelativeTime, TimelineDuration, TimelineObject, Trigger,
            part_group_id, piece_group_id, piece_object_id,
        },
        timing::{
            allows_transition, autonext_overlap_offset, autonext_target_duration,
            keepalive_offset, transition_contents_delay, transition_piece_delay,
        },
    },
};

/// Options for [`compile`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimelineOpts {
    /// Emit the next Part as a disabled lookahead group when it is not auto-advanced into.
    pub lookahead_next: bool,
}

impl Default for TimelineOpts {
    fn default() -> Self {
        Self {
            lookahead_next: true,
        }
    }
}

/// Build the flat timeline for the previous, current and next PartInstances.
///
/// The only absolute wall-clock values used are the `started_playback` anchors of the previous
/// and current instances; everything else is expressed relative to other objects. The previous
/// instance keeps the transition layout it was taken with (`entered_with_transition`).
#[tracing::instrument(skip_all, fields(current = %current.id))]
pub fn compile(
    previous: Option<&PartInstance>,
    current: &PartInstance,
    next: Option<&PartInstance>,
    opts: &TimelineOpts,
) -> Vec<TimelineObject> {
    let mut objects = Vec::new();
    let current_group = part_group_id(&current.id);

    if let Some(prev) = previous {
        let keepalive = keepalive_offset(&prev.part, &current.part);
        let enable = Enable {
            start: Trigger::Absolute(prev.started_playback.unwrap_or(0)),
            duration: TimelineDuration::Until(RelativeTime::start_of(
                current_group.clone(),
                keepalive,
            )),
        };
        emit_part(&mut objects, prev, enable, false, prev.entered_with_transition);
    }

    let target = autonext_target_duration(previous.map(|p| &p.part), &current.part);
    let enable = Enable {
        start: Trigger::Absolute(current.started_playback.unwrap_or(0)),
        duration: target.map_or(TimelineDuration::Open, TimelineDuration::Fixed),
    };
    emit_part(
        &mut objects,
        current,
        enable,
        false,
        allows_transition(previous.map(|p| &p.part)),
    );

    if let Some(next) = next {
        let placement = match target {
            Some(_) => Some((
                Trigger::Relative(RelativeTime::end_of(
                    current_group,
                    -autonext_overlap_offset(&current.part, &next.part),
                )),
                false,
            )),
            None if opts.lookahead_next => Some((Trigger::Absolute(0), true)),
            None => None,
        };
        if let Some((start, disabled)) = placement {
            let duration = autonext_target_duration(Some(&current.part), &next.part)
                .map_or(TimelineDuration::Open, TimelineDuration::Fixed);
            emit_part(
                &mut objects,
                next,
                Enable { start, duration },
                disabled,
                allows_transition(Some(&current.part)),
            );
        }
    }

    tracing::debug!(objects = objects.len(), "timeline compiled");
    objects
}

fn emit_part(
    objects: &mut Vec<TimelineObject>,
    inst: &PartInstance,
    enable: Enable,
    disabled: bool,
    transitions: bool,
) {
    let group_id = part_group_id(&inst.id);
    objects.push(TimelineObject {
        id: group_id.clone(),
        kind: ObjectKind::PartGroup,
        layer: None,
        enable,
        in_group: None,
        disabled,
        content: serde_json::Value::Null,
        part_instance_id: inst.id.clone(),
        piece_instance_id: None,
    });

    let mut pieces: Vec<&PieceInstance> = inst
        .piece_instances
        .iter()
        .filter(|p| p.piece.kind == PieceKind::Content)
        .collect();
    pieces.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let transition_group = pieces
        .iter()
        .find(|p| transitions && p.piece.is_transition)
        .map(|p| piece_group_id(&p.id));

    for pi in pieces {
        if pi.piece.is_transition {
            if !transitions {
                continue;
            }
            let piece_group = piece_group_id(&pi.id);
            objects.push(TimelineObject {
                id: piece_group.clone(),
                kind: ObjectKind::PieceGroup,
                layer: None,
                enable: Enable {
                    start: Trigger::Absolute(transition_piece_delay(&inst.part)),
                    duration: piece_duration(pi, &group_id),
                },
                in_group: Some(group_id.clone()),
                disabled: false,
                content: serde_json::Value::Null,
                part_instance_id: inst.id.clone(),
                piece_instance_id: Some(pi.id.clone()),
            });
            objects.push(piece_object(inst, pi, Enable::default(), piece_group));
            continue;
        }

        let start = match (&transition_group, &pi.piece.enable.start) {
            (Some(tg), Trigger::Absolute(n)) => Trigger::Relative(RelativeTime::start_of(
                tg.clone(),
                transition_contents_delay(&inst.part) + n,
            )),
            (_, trigger) => trigger.clone(),
        };
        let enable = Enable {
            start,
            duration: piece_duration(pi, &group_id),
        };
        objects.push(piece_object(inst, pi, enable, group_id.clone()));
    }
}

fn piece_object(
    inst: &PartInstance,
    pi: &PieceInstance,
    enable: Enable,
    in_group: TimelineObjectId,
) -> TimelineObject {
    TimelineObject {
        id: piece_object_id(&pi.id),
        kind: ObjectKind::Piece,
        layer: Some(pi.piece.output_layer_id.clone()),
        enable,
        in_group: Some(in_group),
        disabled: false,
        content: pi.piece.content.clone(),
        part_instance_id: inst.id.clone(),
        piece_instance_id: Some(pi.id.clone()),
    }
}

/// Duration of a piece inside the group `part_group`.
fn piece_duration(pi: &PieceInstance, part_group: &TimelineObjectId) -> TimelineDuration {
    let own: Option<Millis> = pi
        .duration_override
        .or(pi.piece.enable.duration)
        .map(|d| d.max(0));
    match pi.cropped_at {
        Some(crop) => match (own, pi.piece.enable.start_offset()) {
            (Some(d), Some(start)) if start + d <= crop => TimelineDuration::Fixed(d),
            _ => TimelineDuration::Until(RelativeTime::start_of(part_group.clone(), crop)),
        },
        None => own.map_or(TimelineDuration::Open, TimelineDuration::Fixed),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/compiler.rs"]
mod tests;

use std::fmt;

use crate::foundation::core::{
    Millis, OutputLayerId, PartInstanceId, PieceInstanceId, TimelineObjectId,
};

/// Boundary of a timeline object that a relative trigger can refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// The object's resolved start.
    Start,
    /// The object's resolved end.
    End,
}

/// A point in time expressed as `#<object>.<edge> ± offset`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RelativeTime {
    /// Referenced object.
    pub object: TimelineObjectId,
    /// Referenced boundary of `object`.
    pub edge: Edge,
    /// Signed offset from the boundary.
    pub offset: Millis,
}

impl RelativeTime {
    /// `#<object>.start + offset`.
    pub fn start_of(object: TimelineObjectId, offset: Millis) -> Self {
        Self {
            object,
            edge: Edge::Start,
            offset,
        }
    }

    /// `#<object>.end + offset`.
    pub fn end_of(object: TimelineObjectId, offset: Millis) -> Self {
        Self {
            object,
            edge: Edge::End,
            offset,
        }
    }
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edge = match self.edge {
            Edge::Start => "start",
            Edge::End => "end",
        };
        write!(f, "#{}.{}", self.object, edge)?;
        match self.offset {
            0 => Ok(()),
            o if o > 0 => write!(f, " + {o}"),
            o => write!(f, " - {}", o.unsigned_abs()),
        }
    }
}

/// When an object (or piece) starts.
///
/// Absolute values are epoch milliseconds for top-level objects and offsets from the parent
/// group's start for grouped objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Trigger {
    /// Fixed time (see type docs for the reference point).
    Absolute(Millis),
    /// Offset from another object's boundary.
    Relative(RelativeTime),
    /// Opaque logical expression handed to the downstream resolver untouched.
    Logical(String),
}

impl Default for Trigger {
    fn default() -> Self {
        Self::Absolute(0)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(t) => write!(f, "{t}"),
            Self::Relative(r) => write!(f, "{r}"),
            Self::Logical(expr) => f.write_str(expr),
        }
    }
}

/// How long an object stays active.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TimelineDuration {
    /// Runs until its parent ends (or forever for top-level objects).
    #[default]
    Open,
    /// Fixed length in milliseconds.
    Fixed(Millis),
    /// Ends at the referenced boundary, i.e. `<boundary> - #.start`.
    Until(RelativeTime),
}

impl fmt::Display for TimelineDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("0"),
            Self::Fixed(d) => write!(f, "{d}"),
            Self::Until(r) => write!(f, "{r} - #.start"),
        }
    }
}

/// Start trigger plus duration of a timeline object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Enable {
    /// Start trigger.
    pub start: Trigger,
    /// Active duration.
    pub duration: TimelineDuration,
}

/// Role of an emitted object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Group wrapping everything a PartInstance puts on air.
    PartGroup,
    /// Nested group wrapping a transition piece.
    PieceGroup,
    /// Renderable piece content routed to an output layer.
    Piece,
}

/// One node of the flat timeline graph handed to the device sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineObject {
    /// Unique object id, referenced by relative triggers.
    pub id: TimelineObjectId,
    /// Object role.
    pub kind: ObjectKind,
    /// Output layer for piece objects; groups have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<OutputLayerId>,
    /// Timing.
    pub enable: Enable,
    /// Parent group, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_group: Option<TimelineObjectId>,
    /// Disabled objects (and their children) are kept for lookahead but never played.
    #[serde(default)]
    pub disabled: bool,
    /// Opaque device content copied from the piece.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub content: serde_json::Value,
    /// PartInstance this object belongs to.
    pub part_instance_id: PartInstanceId,
    /// PieceInstance this object renders, for piece objects and piece groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_instance_id: Option<PieceInstanceId>,
}

/// Id of the group object for a PartInstance.
pub fn part_group_id(part_instance: &PartInstanceId) -> TimelineObjectId {
    TimelineObjectId(format!("part_group_{part_instance}"))
}

/// Id of the nested group wrapping a (transition) PieceInstance.
pub fn piece_group_id(piece_instance: &PieceInstanceId) -> TimelineObjectId {
    TimelineObjectId(format!("piece_group_{piece_instance}"))
}

/// Id of the content object for a PieceInstance.
pub fn piece_object_id(piece_instance: &PieceInstanceId) -> TimelineObjectId {
    TimelineObjectId(format!("piece_{piece_instance}"))
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/object.rs"]
mod tests;

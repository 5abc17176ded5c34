use std::fmt;

/// Milliseconds. Used both for wall-clock anchors (epoch ms) and for relative offsets/durations.
pub type Millis = i64;

/// Clamp an optional configured duration to a non-negative value; unset counts as zero.
pub fn non_negative(v: Option<Millis>) -> Millis {
    v.unwrap_or(0).max(0)
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw id string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the raw id string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Rundown`](crate::Rundown).
    RundownId
);
string_id!(
    /// Identifier of a [`Segment`](crate::Segment).
    SegmentId
);
string_id!(
    /// Identifier of a [`Part`](crate::Part).
    PartId
);
string_id!(
    /// Identifier of a [`Piece`](crate::Piece).
    PieceId
);
string_id!(
    /// Identifier of a [`PartInstance`](crate::PartInstance).
    PartInstanceId
);
string_id!(
    /// Identifier of a [`PieceInstance`](crate::PieceInstance).
    PieceInstanceId
);
string_id!(
    /// Source layer a piece occupies; propagation chains are tracked per source layer.
    SourceLayerId
);
string_id!(
    /// Output (device) layer a piece is routed to.
    OutputLayerId
);
string_id!(
    /// Identifier of an emitted [`TimelineObject`](crate::TimelineObject).
    TimelineObjectId
);

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

/// Convenience result type used across the playout core.
pub type PlayoutResult<T> = Result<T, PlayoutError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PlayoutError {
    /// Malformed snapshot data (duplicate ids, invalid values).
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller handed over an inconsistent snapshot (dangling ids, missing current part).
    #[error("precondition violation: {0}")]
    Precondition(String),

    /// Committed propagation state does not line up with the requested incremental run.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlayoutError {
    /// Build a [`PlayoutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PlayoutError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`PlayoutError::InconsistentState`] value.
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::InconsistentState(msg.into())
    }

    /// Build a [`PlayoutError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors caused by the caller's snapshot rather than by the engine.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}

impl From<serde_json::Error> for PlayoutError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

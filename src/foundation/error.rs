/// Convenience result type used across showline.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant except `Serde`/`Other` is fatal for a resolve call: the whole call is aborted,
/// not just the object that triggered it.
#[derive(thiserror::Error, Debug)]
pub enum TimelineError {
    /// Two objects (or keyframes) in one timeline share an id.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// An object's enable expression depends on itself, directly or transitively.
    #[error("circular reference: {0}")]
    CircularReference(String),

    /// Malformed enable expression (unbalanced parentheses, operand/operator mismatch, ...).
    #[error("expression error: {0}")]
    Expression(String),

    /// Internal invariant violated while resolving (e.g. a list where a duration is required).
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimelineError {
    /// Build a [`TimelineError::DuplicateId`] value.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId(id.into())
    }

    /// Build a [`TimelineError::CircularReference`] value.
    pub fn circular_reference(id: impl Into<String>) -> Self {
        Self::CircularReference(id.into())
    }

    /// Build a [`TimelineError::Expression`] value.
    pub fn expression(msg: impl Into<String>) -> Self {
        Self::Expression(msg.into())
    }

    /// Build a [`TimelineError::Resolution`] value.
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Build a [`TimelineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

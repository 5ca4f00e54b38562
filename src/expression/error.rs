use std::fmt;

use crate::foundation::error::TimelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExprError {
    pub(crate) source: String,
    pub(crate) message: String,
}

impl ExprError {
    pub(crate) fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in \"{}\": {}", self.source, self.message)
    }
}

impl std::error::Error for ExprError {}

impl From<ExprError> for TimelineError {
    fn from(err: ExprError) -> Self {
        TimelineError::expression(err.to_string())
    }
}

//! Interval algebra over sets of [`TimelineInstance`]s.
//!
//! Everything here is pure apart from drawing fresh instance ids from the caller's
//! [`IdSequence`](crate::foundation::core::IdSequence).

pub(crate) mod events;
pub(crate) mod ops;
pub(crate) mod repeat;

use crate::model::instance::{ScalarValue, TimelineInstance};

/// What an expression evaluates to when it has a value: a constant, or a set of instances.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Scalar(ScalarValue),
    Instances(Vec<TimelineInstance>),
}

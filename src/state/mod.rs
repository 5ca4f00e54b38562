//! Layer state: who holds each layer over time, and point-in-time queries.

pub(crate) mod model;
pub(crate) mod query;
pub(crate) mod sweep;

//! Object resolution: from declarative enable expressions to concrete instances.

pub(crate) mod lookup;
pub(crate) mod resolver;

//! Input objects, resolved instances and the resolved graph.

pub(crate) mod instance;
pub(crate) mod load;
pub(crate) mod object;
pub(crate) mod resolved;

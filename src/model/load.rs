use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::TimelineResult;
use crate::model::object::TimelineObject;

/// Parse a JSON array of timeline objects.
pub fn load_objects_from_str(json: &str) -> TimelineResult<Vec<TimelineObject>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a JSON array of timeline objects from `path`.
///
/// This is a convenience for hosts; the resolver itself never touches the filesystem.
pub fn load_objects_from_path(path: impl AsRef<Path>) -> TimelineResult<Vec<TimelineObject>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read timeline '{}'", path.display()))?;
    load_objects_from_str(&json)
}

#[cfg(test)]
#[path = "../../tests/unit/model/load.rs"]
mod tests;

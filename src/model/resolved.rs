use std::collections::{BTreeMap, HashMap};

use crate::foundation::core::Time;
use crate::model::instance::TimelineInstance;
use crate::model::object::Enable;

/// Number of repeat tiles produced when [`ResolveOptions::limit_count`] is not set.
pub const DEFAULT_LIMIT_COUNT: usize = 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Query window for one resolve call.
pub struct ResolveOptions {
    /// Reference time; repeating objects are tiled from the period containing it.
    pub time: Time,
    /// Max repeat tiles per instance (defaults to [`DEFAULT_LIMIT_COUNT`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_count: Option<usize>,
    /// Repeat tiles starting at or after this time are not produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_time: Option<Time>,
}

impl ResolveOptions {
    /// Options for reference time `time` with default limits.
    pub fn at(time: Time) -> Self {
        Self {
            time,
            ..Self::default()
        }
    }

    /// Set the repeat tile limit.
    pub fn with_limit_count(mut self, limit_count: usize) -> Self {
        self.limit_count = Some(limit_count);
        self
    }

    /// Set the time horizon.
    pub fn with_limit_time(mut self, limit_time: Time) -> Self {
        self.limit_time = Some(limit_time);
        self
    }

    pub(crate) fn repeat_limit(&self) -> usize {
        self.limit_count
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_LIMIT_COUNT)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Counters collected during one resolve call.
pub struct Statistics {
    /// Objects (including keyframes) that ended up without any instance.
    pub unresolved_count: usize,
    /// Objects (including keyframes) resolved to at least one instance.
    pub resolved_count: usize,
    /// Total instances across all objects.
    pub resolved_instance_count: usize,
    /// Resolved non-group, non-keyframe objects.
    pub resolved_object_count: usize,
    /// Resolved groups.
    pub resolved_group_count: usize,
    /// Resolved keyframes.
    pub resolved_keyframe_count: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Memo state of one object within a resolve call.
pub enum ResolveStatus {
    /// Not visited yet.
    #[default]
    Unresolved,
    /// On the current resolution path; reaching it again means a cycle.
    Resolving,
    /// Instances are final.
    Resolved,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Resolution output attached to each object.
pub struct ResolvedInfo {
    /// Memo status.
    pub status: ResolveStatus,
    /// Final instances, sorted by start.
    pub instances: Vec<TimelineInstance>,
    /// Nesting depth, root objects are 0.
    pub level_deep: usize,
    /// Id of the enclosing group (or keyframe owner), looked up in the same graph.
    pub parent_id: Option<String>,
    /// `true` for keyframes.
    pub is_keyframe: bool,
}

impl ResolvedInfo {
    /// `true` once the object's instances are final.
    pub fn is_resolved(&self) -> bool {
        self.status == ResolveStatus::Resolved
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// A flattened timeline object (or keyframe) together with its resolution.
pub struct ResolvedObject {
    /// Object id.
    pub id: String,
    /// Output layer, empty for keyframes and layer-less objects.
    pub layer: String,
    /// Enable condition as supplied.
    pub enable: Enable,
    /// Tags.
    pub classes: Vec<String>,
    /// Layer priority.
    pub priority: f64,
    /// `true` for groups.
    pub is_group: bool,
    /// Direct children ids, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    /// Keyframe ids, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<String>,
    /// Opaque payload.
    pub content: serde_json::Value,
    /// Disabled objects never enter the state.
    pub disabled: bool,
    /// Resolution output.
    pub resolved: ResolvedInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ObjIdx(pub(crate) usize);

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Result of [`crate::resolve_timeline`]: every object with its instances.
///
/// Objects are stored in flattening order (parents before their children), which also gives
/// the JSON output a stable key order.
pub struct ResolvedGraph {
    /// Options the graph was resolved with.
    pub options: ResolveOptions,
    /// All objects and keyframes, keyed by id when serialized.
    #[serde(serialize_with = "serialize_objects_by_id")]
    pub objects: Vec<ResolvedObject>,
    /// Class tag -> object ids.
    pub classes: BTreeMap<String, Vec<String>>,
    /// Layer -> object ids.
    pub layers: BTreeMap<String, Vec<String>>,
    /// Counters.
    pub statistics: Statistics,
    #[serde(skip)]
    pub(crate) index: HashMap<String, ObjIdx>,
}

impl ResolvedGraph {
    /// Look up an object by id.
    pub fn object(&self, id: &str) -> Option<&ResolvedObject> {
        self.index.get(id).map(|idx| &self.objects[idx.0])
    }

    /// Resolved instances of `id`; empty when unknown.
    pub fn instances(&self, id: &str) -> &[TimelineInstance] {
        self.object(id)
            .map(|o| o.resolved.instances.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn get(&self, idx: ObjIdx) -> &ResolvedObject {
        &self.objects[idx.0]
    }

    pub(crate) fn lookup(&self, id: &str) -> Option<ObjIdx> {
        self.index.get(id).copied()
    }
}

fn serialize_objects_by_id<S>(objects: &[ResolvedObject], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_map(objects.iter().map(|o| (&o.id, o)))
}

#[cfg(test)]
#[path = "../../tests/unit/model/resolved.rs"]
mod tests;

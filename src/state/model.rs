use std::collections::BTreeMap;

use crate::foundation::core::{Time, TimeKey};
use crate::model::instance::TimelineInstance;
use crate::model::resolved::{ResolveOptions, Statistics};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// Kind of a future state change.
pub enum EventType {
    /// An object takes its layer.
    Start = 0,
    /// An object leaves its layer.
    End = 1,
    /// A keyframe starts or stops applying.
    Keyframe = 2,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// A future state change.
pub struct NextEvent {
    /// Kind.
    #[serde(rename = "type")]
    pub kind: EventType,
    /// When it happens.
    pub time: Time,
    /// Object or keyframe id.
    pub obj_id: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// An object holding a layer, as seen in the state.
pub struct LayerState {
    /// Object id.
    pub id: String,
    /// Layer held.
    pub layer: String,
    /// Priority it won with.
    pub priority: f64,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// `true` for groups.
    pub is_group: bool,
    /// Enclosing group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Content with active keyframes applied.
    pub content: serde_json::Value,
    /// The state-level instance: when the object took the layer and when it lost it.
    pub instance: TimelineInstance,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// A keyframe attached to the object holding a layer.
pub struct KeyframeState {
    /// Keyframe id.
    pub id: String,
    /// Object the keyframe belongs to.
    pub parent_id: String,
    /// Partial content merged over the object's content.
    pub content: serde_json::Value,
    /// The keyframe's resolved instance.
    pub instance: TimelineInstance,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// One entry of a layer's state at a point in time.
pub enum StateEntry {
    /// An object takes the layer.
    Object(LayerState),
    /// A keyframe of the current holder starts applying.
    Keyframe(KeyframeState),
}

/// Per layer, the entries recorded at each time a change happened. An empty entry list
/// means the layer becomes empty at that time.
pub type LayerTimeline = BTreeMap<TimeKey, Vec<StateEntry>>;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Layer occupancy over time, produced by [`crate::resolve_all_states`].
pub struct ResolvedStates {
    /// Options the underlying graph was resolved with.
    pub options: ResolveOptions,
    /// Counters of the underlying graph.
    pub statistics: Statistics,
    /// Object id -> state-level instances (when it actually held its layer).
    pub objects: BTreeMap<String, Vec<TimelineInstance>>,
    /// Layer -> ids of objects that held it at some point.
    pub layers: BTreeMap<String, Vec<String>>,
    /// Layer -> change log.
    pub state: BTreeMap<String, LayerTimeline>,
    /// Changes after `options.time`, in order.
    pub next_events: Vec<NextEvent>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Snapshot returned by [`crate::get_state`].
pub struct TimelineState {
    /// Query time.
    pub time: Time,
    /// Layer -> holder at `time`. Empty layers are absent.
    pub layers: BTreeMap<String, LayerState>,
    /// Changes strictly after `time`, in order.
    pub next_events: Vec<NextEvent>,
}

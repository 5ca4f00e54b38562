use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::foundation::core::{Time, TimeKey};
use crate::model::resolved::ResolvedGraph;
use crate::state::model::{LayerState, LayerTimeline, ResolvedStates, StateEntry, TimelineState};
use crate::state::sweep::resolve_all_states;

/// Input accepted by [`get_state`]: a resolved graph (swept on the fly) or precomputed states.
#[derive(Clone, Copy, Debug)]
pub enum StateSource<'a> {
    /// A graph; its states are computed for this query only.
    Graph(&'a ResolvedGraph),
    /// States from [`crate::resolve_all_states`].
    States(&'a ResolvedStates),
}

impl<'a> From<&'a ResolvedGraph> for StateSource<'a> {
    fn from(graph: &'a ResolvedGraph) -> Self {
        Self::Graph(graph)
    }
}

impl<'a> From<&'a ResolvedStates> for StateSource<'a> {
    fn from(states: &'a ResolvedStates) -> Self {
        Self::States(states)
    }
}

/// What every layer holds at `time`, plus the events strictly after `time` (at most
/// `event_limit` when given).
#[tracing::instrument(skip(source))]
pub fn get_state<'a>(
    source: impl Into<StateSource<'a>>,
    time: Time,
    event_limit: Option<usize>,
) -> TimelineState {
    let states = match source.into() {
        StateSource::Graph(graph) => Cow::Owned(resolve_all_states(graph)),
        StateSource::States(states) => Cow::Borrowed(states),
    };

    let layers = states
        .state
        .iter()
        .filter_map(|(layer, timeline)| {
            get_state_at_time(timeline, time).map(|held| (layer.clone(), held))
        })
        .collect();

    let next_events = states
        .next_events
        .iter()
        .filter(|e| e.time > time)
        .take(event_limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    TimelineState {
        time,
        layers,
        next_events,
    }
}

/// The holder of one layer at `time`, with the content of its active keyframes merged in.
pub fn get_state_at_time(timeline: &LayerTimeline, time: Time) -> Option<LayerState> {
    let mut current: Option<Cow<'_, LayerState>> = None;
    for entries in timeline.range(..=TimeKey(time)).map(|(_, entries)| entries) {
        if entries.is_empty() {
            current = None;
            continue;
        }
        for entry in entries {
            match entry {
                StateEntry::Object(held) => current = Some(Cow::Borrowed(held)),
                StateEntry::Keyframe(keyframe) => {
                    let Some(held) = current.as_mut() else {
                        continue;
                    };
                    if held.id == keyframe.parent_id && keyframe.instance.end_or_infinity() > time {
                        apply_keyframe_content(&mut held.to_mut().content, &keyframe.content);
                    }
                }
            }
        }
    }
    current.map(Cow::into_owned)
}

/// Merge keyframe content over object content.
///
/// Objects merge key by key, arrays element by element and are cut to the keyframe's length,
/// anything else replaces the target.
pub fn apply_keyframe_content(target: &mut Value, keyframe: &Value) {
    match keyframe {
        Value::Object(fields) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(target) = target {
                for (key, value) in fields {
                    apply_keyframe_content(target.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
        }
        Value::Array(items) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(target) = target {
                target.truncate(items.len());
                for (i, value) in items.iter().enumerate() {
                    if i == target.len() {
                        target.push(Value::Null);
                    }
                    apply_keyframe_content(&mut target[i], value);
                }
            }
        }
        scalar => *target = scalar.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/state/query.rs"]
mod tests;

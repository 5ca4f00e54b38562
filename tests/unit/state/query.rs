use super::*;
use serde_json::json;

use crate::model::object::{Enable, TimelineKeyframe, TimelineObject};
use crate::model::resolved::ResolveOptions;
use crate::resolve::resolver::resolve_timeline;
use crate::state::model::EventType;

fn merged(target: Value, keyframe: Value) -> Value {
    let mut target = target;
    apply_keyframe_content(&mut target, &keyframe);
    target
}

#[test]
fn objects_merge_deeply() {
    assert_eq!(
        merged(
            json!({"a": 1, "nested": {"x": 1, "y": 2}}),
            json!({"nested": {"y": 3, "z": 4}, "b": true})
        ),
        json!({"a": 1, "b": true, "nested": {"x": 1, "y": 3, "z": 4}})
    );
}

#[test]
fn arrays_merge_positionally_and_truncate() {
    assert_eq!(
        merged(json!({"list": [1, 2, 3]}), json!({"list": [9]})),
        json!({"list": [9]})
    );
    assert_eq!(
        merged(
            json!({"list": [{"a": 1, "b": 2}]}),
            json!({"list": [{"b": 5}, 7]})
        ),
        json!({"list": [{"a": 1, "b": 5}, 7]})
    );
}

#[test]
fn shape_mismatch_replaces() {
    assert_eq!(merged(json!({"v": 1}), json!({"v": {"w": 2}})), json!({"v": {"w": 2}}));
    assert_eq!(merged(json!({"v": [1]}), json!({"v": {"w": 2}})), json!({"v": {"w": 2}}));
    assert_eq!(merged(json!({"v": {"w": 2}}), json!({"v": null})), json!({"v": null}));
}

fn keyed_timeline() -> Vec<TimelineObject> {
    vec![
        TimelineObject::new("p", "L", Enable::start(0))
            .with_content(json!({"color": "red", "size": 1}))
            .with_keyframes(vec![
                TimelineKeyframe::new("k1", Enable::start(5).with_end(8), json!({"color": "blue"})),
                TimelineKeyframe::new("k2", Enable::start(6).with_end(20), json!({"size": 2})),
            ]),
        TimelineObject::new("q", "M", Enable::start(10).with_end(30)),
    ]
}

#[test]
fn keyframe_window() {
    let graph = resolve_timeline(&keyed_timeline(), ResolveOptions::at(0.0)).expect("resolves");
    let color = |t: Time| get_state(&graph, t, None).layers["L"].content["color"].clone();
    assert_eq!(color(4.0), json!("red"));
    assert_eq!(color(6.0), json!("blue"));
    assert_eq!(color(9.0), json!("red"));

    let state = get_state(&graph, 7.0, None);
    assert_eq!(state.layers["L"].content, json!({"color": "blue", "size": 2}));
}

#[test]
fn original_content_is_not_mutated() {
    let graph = resolve_timeline(&keyed_timeline(), ResolveOptions::at(0.0)).expect("resolves");
    let states = resolve_all_states(&graph);
    let _ = get_state(&states, 7.0, None);
    let later = get_state(&states, 25.0, None);
    assert_eq!(later.layers["L"].content, json!({"color": "red", "size": 1}));
}

#[test]
fn empty_layers_are_absent() {
    let graph = resolve_timeline(&keyed_timeline(), ResolveOptions::at(0.0)).expect("resolves");
    let state = get_state(&graph, 40.0, None);
    assert!(state.layers.contains_key("L"));
    assert!(!state.layers.contains_key("M"));
    assert_eq!(state.time, 40.0);
}

#[test]
fn event_limit_truncates() {
    let graph = resolve_timeline(&keyed_timeline(), ResolveOptions::at(0.0)).expect("resolves");
    let all = get_state(&graph, 0.0, None).next_events;
    assert!(all.len() > 2);
    let limited = get_state(&graph, 0.0, Some(2)).next_events;
    assert_eq!(limited.as_slice(), &all[..2]);
    assert_eq!(limited[0].kind, EventType::Keyframe);
    assert_eq!(limited[0].time, 5.0);
}

#[test]
fn next_events_are_relative_to_the_query_time() {
    let graph = resolve_timeline(
        &[
            TimelineObject::new("x1", "L1", Enable::start(0).with_duration(10)),
            TimelineObject::new("x2", "L1", Enable::start(5).with_duration(10)).with_priority(1.0),
        ],
        ResolveOptions::at(0.0),
    )
    .expect("resolves");
    let events = |t: Time| -> Vec<(EventType, Time, String)> {
        get_state(&graph, t, None)
            .next_events
            .into_iter()
            .map(|e| (e.kind, e.time, e.obj_id))
            .collect()
    };
    assert_eq!(events(12.0), vec![(EventType::End, 15.0, "x2".to_owned())]);
    assert_eq!(events(5.0), vec![(EventType::End, 15.0, "x2".to_owned())]);
    assert!(events(15.0).is_empty());
    assert_eq!(events(0.0).len(), 3);
}

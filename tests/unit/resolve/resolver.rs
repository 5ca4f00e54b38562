use super::*;
use crate::foundation::core::Time;
use crate::model::object::{Enable, TimelineKeyframe};

fn resolve(objects: &[TimelineObject]) -> ResolvedGraph {
    resolve_timeline(objects, ResolveOptions::at(0.0)).expect("resolves")
}

fn spans(graph: &ResolvedGraph, id: &str) -> Vec<(Time, Option<Time>)> {
    graph.instances(id).iter().map(|i| (i.start, i.end)).collect()
}

#[test]
fn start_end_and_duration() {
    let graph = resolve(&[
        TimelineObject::new("a", "L1", Enable::start(10).with_end(20)),
        TimelineObject::new("b", "L1", Enable::start(10).with_duration(5)),
        TimelineObject::new("c", "L1", Enable::start(30)),
    ]);
    assert_eq!(spans(&graph, "a"), vec![(10.0, Some(20.0))]);
    assert_eq!(spans(&graph, "b"), vec![(10.0, Some(15.0))]);
    assert_eq!(spans(&graph, "c"), vec![(30.0, None)]);
}

#[test]
fn empty_objects_never_resolve() {
    let graph = resolve(&[
        TimelineObject::new("zero", "L1", Enable::start(5).with_duration(0)),
        TimelineObject::new("same", "L2", Enable::start(5).with_end(5)),
        TimelineObject::new("backwards", "L3", Enable::start(8).with_end(3)),
    ]);
    assert!(spans(&graph, "zero").is_empty());
    assert!(spans(&graph, "same").is_empty());
    assert!(spans(&graph, "backwards").is_empty());
    assert_eq!(graph.statistics.unresolved_count, 3);
}

#[test]
fn instance_ids_are_unique() {
    let graph = resolve(&[
        TimelineObject::new("a", "L1", Enable::start(0).with_end(10)),
        TimelineObject::new("b", "L1", Enable::while_("#a")),
    ]);
    let mut ids: Vec<&str> = graph
        .objects
        .iter()
        .flat_map(|o| o.resolved.instances.iter().map(|i| i.id.as_str()))
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn references_chain_across_objects() {
    let graph = resolve(&[
        TimelineObject::new("b", "L2", Enable::start("#a.end + 5")),
        TimelineObject::new("a", "L1", Enable::start(10).with_end(20)),
    ]);
    assert_eq!(spans(&graph, "b"), vec![(25.0, None)]);
    assert!(graph.instances("b")[0].references.contains("#a"));
}

#[test]
fn while_intersection() {
    let graph = resolve(&[
        TimelineObject::new("a", "L1", Enable::start(0).with_end(10)),
        TimelineObject::new("b", "L2", Enable::start(5).with_end(15)),
        TimelineObject::new("c", "L3", Enable::while_("#a & #b")),
    ]);
    assert_eq!(spans(&graph, "c"), vec![(5.0, Some(10.0))]);
}

#[test]
fn while_shortcuts() {
    let graph = resolve(&[
        TimelineObject::new("on", "L1", Enable::while_("1")),
        TimelineObject::new("off", "L2", Enable::while_(0)),
    ]);
    assert_eq!(spans(&graph, "on"), vec![(0.0, None)]);
    assert!(spans(&graph, "off").is_empty());
    assert_eq!(graph.statistics.unresolved_count, 1);
}

#[test]
fn children_are_relative_to_and_capped_by_their_group() {
    let graph = resolve(&[TimelineObject::new("g", "", Enable::start(100).with_end(200))
        .with_children(vec![
            TimelineObject::new("c1", "L1", Enable::start(10).with_duration(20)),
            TimelineObject::new("c2", "L2", Enable::start(0)),
            TimelineObject::new("c3", "L3", Enable::start(150).with_duration(100)),
            TimelineObject::new("c4", "L4", Enable::start(20).with_end(30)),
        ])]);
    assert_eq!(spans(&graph, "c1"), vec![(110.0, Some(130.0))]);
    assert_eq!(spans(&graph, "c2"), vec![(100.0, Some(200.0))]);
    assert_eq!(spans(&graph, "c3"), vec![(150.0, Some(200.0))]);
    assert_eq!(spans(&graph, "c4"), vec![(120.0, Some(130.0))]);

    let c1 = graph.object("c1").expect("flattened");
    assert_eq!(c1.resolved.level_deep, 1);
    assert_eq!(c1.resolved.parent_id.as_deref(), Some("g"));
    assert_eq!(graph.instances("c1")[0].caps.len(), 1);
}

#[test]
fn referencing_children_are_capped_by_overlap() {
    let graph = resolve(&[
        TimelineObject::new("a", "L0", Enable::start(150).with_end(300)),
        TimelineObject::new("early", "L0", Enable::start(20).with_end(40)),
        TimelineObject::new("g", "", Enable::start(100).with_end(200)).with_children(vec![
            TimelineObject::new("c", "L1", Enable::start("#a")),
            TimelineObject::new("d", "L2", Enable::start("#early")),
        ]),
    ]);
    assert_eq!(spans(&graph, "c"), vec![(150.0, Some(200.0))]);
    assert!(spans(&graph, "d").is_empty());
}

#[test]
fn keyframes_resolve_relative_to_their_object() {
    let graph = resolve(&[TimelineObject::new("o", "L1", Enable::start(10).with_end(50))
        .with_keyframes(vec![TimelineKeyframe::new(
            "k",
            Enable::start(5).with_duration(10),
            serde_json::json!({"x": 1}),
        )])]);
    assert_eq!(spans(&graph, "k"), vec![(15.0, Some(25.0))]);
    let k = graph.object("k").expect("flattened");
    assert!(k.resolved.is_keyframe);
    assert!(k.layer.is_empty());
    assert_eq!(graph.statistics.resolved_keyframe_count, 1);
}

#[test]
fn repeating_tiles_from_the_reference_time() {
    let graph = resolve_timeline(
        &[TimelineObject::new("r", "L1", Enable::while_("1").with_repeating(10))],
        ResolveOptions::at(23.0).with_limit_count(2),
    )
    .expect("resolves");
    assert_eq!(spans(&graph, "r"), vec![(20.0, Some(30.0)), (30.0, Some(40.0))]);
}

#[test]
fn repeating_duration_is_clamped_to_the_period() {
    let graph = resolve_timeline(
        &[TimelineObject::new(
            "r",
            "L1",
            Enable::start(0).with_duration(15).with_repeating(10),
        )],
        ResolveOptions::at(0.0).with_limit_count(2),
    )
    .expect("resolves");
    assert_eq!(spans(&graph, "r"), vec![(0.0, Some(10.0)), (10.0, Some(20.0))]);
}

#[test]
fn circular_references_abort() {
    let err = resolve_timeline(
        &[
            TimelineObject::new("a", "L1", Enable::start("#b")),
            TimelineObject::new("b", "L2", Enable::start("#a")),
        ],
        ResolveOptions::at(0.0),
    )
    .expect_err("cycle");
    assert!(matches!(err, TimelineError::CircularReference(ref id) if id == "a"));
}

#[test]
fn self_reference_is_circular() {
    let err = resolve_timeline(
        &[TimelineObject::new("a", "L1", Enable::start("#a.end"))],
        ResolveOptions::at(0.0),
    )
    .expect_err("cycle");
    assert!(matches!(err, TimelineError::CircularReference(_)));
}

#[test]
fn duplicate_ids_are_rejected_up_front() {
    let err = resolve_timeline(
        &[
            TimelineObject::new("a", "L1", Enable::start(0)),
            TimelineObject::new("g", "", Enable::start(0))
                .with_children(vec![TimelineObject::new("a", "L2", Enable::start(0))]),
        ],
        ResolveOptions::at(0.0),
    )
    .expect_err("duplicate");
    assert!(matches!(err, TimelineError::DuplicateId(ref id) if id == "a"));

    let err = resolve_timeline(
        &[TimelineObject::new("o", "L1", Enable::start(0)).with_keyframes(vec![
            TimelineKeyframe::new("o", Enable::start(0), serde_json::json!({})),
        ])],
        ResolveOptions::at(0.0),
    )
    .expect_err("duplicate");
    assert!(matches!(err, TimelineError::DuplicateId(_)));
}

#[test]
fn malformed_expression_aborts() {
    let err = resolve_timeline(
        &[TimelineObject::new("a", "L1", Enable::start("(#b + 1"))],
        ResolveOptions::at(0.0),
    )
    .expect_err("malformed");
    assert!(matches!(err, TimelineError::Expression(_)));
}

#[test]
fn multi_instance_duration_is_a_resolution_error() {
    let err = resolve_timeline(
        &[
            TimelineObject::new("x", "L1", Enable::start(0).with_end(10)),
            TimelineObject::new("y", "L2", Enable::start(20).with_end(30)),
            TimelineObject::new("z", "L3", Enable::start(0).with_duration("$L1.start | $L2.start")),
        ],
        ResolveOptions::at(0.0),
    )
    .expect_err("list duration");
    assert!(matches!(err, TimelineError::Resolution(_)));
}

#[test]
fn statistics_count_by_kind() {
    let graph = resolve(&[
        TimelineObject::new("a", "L1", Enable::start(0).with_end(10)),
        TimelineObject::new("b", "L1", Enable::start("#nope")),
        TimelineObject::new("g", "", Enable::start(0))
            .with_children(vec![TimelineObject::new("c", "L2", Enable::start(0))]),
    ]);
    let stats = graph.statistics;
    assert_eq!(stats.resolved_count, 3);
    assert_eq!(stats.unresolved_count, 1);
    assert_eq!(stats.resolved_object_count, 2);
    assert_eq!(stats.resolved_group_count, 1);
    assert_eq!(stats.resolved_instance_count, 3);
}

#[test]
fn classes_and_layers_are_indexed() {
    let graph = resolve(&[
        TimelineObject::new("a", "L1", Enable::start(0)).with_classes(["x", "y"]),
        TimelineObject::new("b", "L1", Enable::start(0)).with_classes(["x"]),
    ]);
    assert_eq!(graph.classes["x"], vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(graph.classes["y"], vec!["a".to_owned()]);
    assert_eq!(graph.layers["L1"], vec!["a".to_owned(), "b".to_owned()]);
}

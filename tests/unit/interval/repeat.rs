use super::*;
use crate::foundation::core::{References, Time};
use crate::model::instance::Cap;

fn inst(start: Time, end: Option<Time>) -> TimelineInstance {
    TimelineInstance::new("x", start, end, References::new())
}

fn spans(list: &[TimelineInstance]) -> Vec<(Time, Option<Time>)> {
    list.iter().map(|i| (i.start, i.end)).collect()
}

#[test]
fn no_period_passes_through() {
    let mut ids = IdSequence::new();
    let input = vec![inst(0.0, None)];
    let out = apply_repeating_instances(input.clone(), None, &ResolveOptions::at(0.0), &mut ids);
    assert_eq!(out, input);

    let zero = ScalarValue::constant(0.0);
    let out = apply_repeating_instances(input.clone(), Some(&zero), &ResolveOptions::at(0.0), &mut ids);
    assert_eq!(out, input);
}

#[test]
fn open_instance_tiles_from_the_period_containing_time() {
    let mut ids = IdSequence::new();
    let period = ScalarValue::constant(10.0);
    let out = apply_repeating_instances(
        vec![inst(0.0, None)],
        Some(&period),
        &ResolveOptions::at(23.0).with_limit_count(2),
        &mut ids,
    );
    assert_eq!(spans(&out), vec![(20.0, Some(30.0)), (30.0, Some(40.0))]);
}

#[test]
fn bounded_instance_keeps_its_length() {
    let mut ids = IdSequence::new();
    let period = ScalarValue::constant(100.0);
    let out = apply_repeating_instances(
        vec![inst(10.0, Some(40.0))],
        Some(&period),
        &ResolveOptions::at(0.0).with_limit_count(3),
        &mut ids,
    );
    assert_eq!(
        spans(&out),
        vec![(10.0, Some(40.0)), (110.0, Some(140.0)), (210.0, Some(240.0))]
    );
}

#[test]
fn limit_time_stops_tiling() {
    let mut ids = IdSequence::new();
    let period = ScalarValue::constant(10.0);
    let out = apply_repeating_instances(
        vec![inst(0.0, Some(5.0))],
        Some(&period),
        &ResolveOptions::at(0.0).with_limit_count(10).with_limit_time(25.0),
        &mut ids,
    );
    assert_eq!(spans(&out), vec![(0.0, Some(5.0)), (10.0, Some(15.0)), (20.0, Some(25.0))]);
}

#[test]
fn tiles_are_clipped_to_the_referenced_cap() {
    let mut ids = IdSequence::new();
    let period = ScalarValue::constant(10.0);
    let mut instance = inst(0.0, Some(5.0));
    instance.references.insert("@p".to_owned());
    instance.caps.push(Cap {
        id: "@p".to_owned(),
        start: 0.0,
        end: Some(13.0),
    });
    let out = apply_repeating_instances(
        vec![instance],
        Some(&period),
        &ResolveOptions::at(0.0).with_limit_count(3),
        &mut ids,
    );
    assert_eq!(spans(&out), vec![(0.0, Some(5.0)), (10.0, Some(13.0))]);
}

#[test]
fn tile_references_include_the_period() {
    let mut ids = IdSequence::new();
    let period = ScalarValue {
        value: 10.0,
        references: ["#clock".to_owned()].into_iter().collect(),
    };
    let out = apply_repeating_instances(
        vec![inst(0.0, Some(5.0))],
        Some(&period),
        &ResolveOptions::at(0.0),
        &mut ids,
    );
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|i| i.references.contains("#clock")));
}

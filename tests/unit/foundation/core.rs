use super::*;
use std::collections::BTreeMap;

fn refs(items: &[&str]) -> References {
    items.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn join_references_is_sorted_union() {
    let joined = join_references(&refs(&["#b", "@3"]), &refs(&["#a", "#b"]));
    assert_eq!(
        joined.into_iter().collect::<Vec<_>>(),
        vec!["#a".to_owned(), "#b".to_owned(), "@3".to_owned()]
    );
}

#[test]
fn reference_prefixes_match_sigils() {
    assert_eq!(object_reference("video"), "#video");
    assert_eq!(class_reference("gfx"), ".gfx");
    assert_eq!(layer_reference("L1"), "$L1");
}

#[test]
fn time_keys_order_numerically() {
    let mut m = BTreeMap::new();
    m.insert(TimeKey(10.0), "b");
    m.insert(TimeKey(2.0), "a");
    m.insert(TimeKey(-1.5), "z");
    let keys: Vec<f64> = m.keys().map(|k| k.0).collect();
    assert_eq!(keys, vec![-1.5, 2.0, 10.0]);
}

#[test]
fn time_keys_serialize_as_strings() {
    let mut m = BTreeMap::new();
    m.insert(TimeKey(20.0), 1);
    m.insert(TimeKey(2.5), 2);
    let s = serde_json::to_string(&m).unwrap();
    assert_eq!(s, r#"{"2.5":2,"20":1}"#);
}

#[test]
fn id_sequence_is_scoped_and_deterministic() {
    let mut a = IdSequence::new();
    let mut b = IdSequence::new();
    assert_eq!(a.next_id(), "@1");
    assert_eq!(a.next_id(), "@2");
    assert_eq!(b.next_id(), "@1");
}

#[test]
fn open_end_is_infinite() {
    assert_eq!(end_or_infinity(None), f64::INFINITY);
    assert_eq!(end_or_infinity(Some(3.0)), 3.0);
}

use super::*;
use crate::foundation::error::TimelineError;

#[test]
fn parses_object_arrays() {
    let objs = load_objects_from_str(
        r##"[
            { "id": "a", "layer": "L1", "enable": { "start": 0, "duration": 10 } },
            { "id": "b", "layer": "L1", "enable": { "while": "#a" } }
        ]"##,
    )
    .unwrap();
    assert_eq!(objs.len(), 2);
    assert_eq!(objs[1].id, "b");
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = load_objects_from_str("[{").unwrap_err();
    assert!(matches!(err, TimelineError::Serde(_)));
}

#[test]
fn missing_file_keeps_the_path_in_the_message() {
    let err = load_objects_from_path("does/not/exist.json").unwrap_err();
    assert!(matches!(err, TimelineError::Other(_)));
    assert!(format!("{err:#}").contains("does/not/exist.json"));
}

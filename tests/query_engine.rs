//! Property tests for the nested-document query engine.
//!
//! Generated documents keep one value kind per key name so that every leaf
//! path reaches scalars in every branch:
//! - `a`..`c`: scalars (including `null`)
//! - `s*`: lists of scalars
//! - `m*`: nested maps
//! - `l*`: lists of nested maps

use edu_corpus::{
    CatchErrors, CorpusError, Document, Scalar, Terminal, get_in, get_leaves, get_terminal_in,
    with_new_value,
};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn document_strategy(depth: u32) -> BoxedStrategy<Value> {
    let scalars = prop::collection::btree_map("[abc]", scalar_strategy(), 0..3);
    let scalar_lists =
        prop::collection::btree_map("s[0-2]", prop::collection::vec(scalar_strategy(), 0..4), 0..2);
    if depth == 0 {
        return (scalars, scalar_lists)
            .prop_map(|(scalars, lists)| {
                let mut map = Map::new();
                map.extend(scalars);
                map.extend(lists.into_iter().map(|(key, list)| (key, Value::Array(list))));
                Value::Object(map)
            })
            .boxed();
    }
    let maps = prop::collection::btree_map("m[0-2]", document_strategy(depth - 1), 0..2);
    let map_lists = prop::collection::btree_map(
        "l[0-2]",
        prop::collection::vec(document_strategy(depth - 1), 0..3),
        0..2,
    );
    (scalars, scalar_lists, maps, map_lists)
        .prop_map(|(scalars, lists, maps, map_lists)| {
            let mut map = Map::new();
            map.extend(scalars);
            map.extend(lists.into_iter().map(|(key, list)| (key, Value::Array(list))));
            map.extend(maps);
            map.extend(
                map_lists
                    .into_iter()
                    .map(|(key, list)| (key, Value::Array(list))),
            );
            Value::Object(map)
        })
        .boxed()
}

fn document(value: Value) -> Document {
    Document::try_from(value).unwrap()
}

proptest! {
    #[test]
    fn leaf_paths_never_resolve_to_documents(raw in document_strategy(3)) {
        let doc = document(raw);
        for leaf in get_leaves(&doc) {
            let result = get_in(&doc, &leaf, CatchErrors::ALL).unwrap();
            prop_assert!(!result.contains_document(), "leaf {:?} reached a document", leaf);
        }
    }

    #[test]
    fn terminal_queries_never_fail(raw in document_strategy(2), path in prop::collection::vec("[abcsml][0-2]?", 0..5)) {
        let doc = document(raw);
        // Any resolution result is a terminal; the point is that nothing panics.
        let _ = get_terminal_in(&doc, &path);
    }

    #[test]
    fn with_new_value_leaves_the_original_untouched(raw in document_strategy(2), value in any::<i64>()) {
        let doc = document(raw);
        let before = doc.to_json();
        let updated = with_new_value(&doc, &["z", "new"], value).unwrap();

        prop_assert_eq!(doc.to_json(), before);
        prop_assert_eq!(get_terminal_in(&doc, &["z", "new"]), Terminal::ABSENT);
        prop_assert_eq!(
            get_terminal_in(&updated, &["z", "new"]),
            Terminal::Value(Some(Scalar::Int(value)))
        );
        for (key, node) in doc.iter() {
            prop_assert_eq!(updated.get(key), Some(node));
        }
    }
}

#[test]
fn terminal_queries_flatten_nested_forks() {
    let doc = document(json!({
        "l": [
            {"l": [{"a": 1}, {"a": 2}]},
            {"l": []},
            {"l": [{"a": 3}]},
            {"other": true}
        ]
    }));
    assert_eq!(
        get_terminal_in(&doc, &["l", "l", "a"]),
        Terminal::Sequence(vec![
            Some(Scalar::Int(1)),
            Some(Scalar::Int(2)),
            Some(Scalar::Int(3)),
            None,
        ])
    );
}

#[test]
fn terminal_queries_collapse_documents_and_premature_scalars() {
    let doc = document(json!({"m": {"a": 1}, "a": "text"}));
    assert_eq!(get_terminal_in(&doc, &["m"]), Terminal::ABSENT);
    assert_eq!(get_terminal_in(&doc, &["a", "deeper"]), Terminal::ABSENT);
    assert_eq!(get_terminal_in(&doc, &["missing"]), Terminal::ABSENT);
}

#[test]
fn strict_queries_report_the_failing_key() {
    let doc = document(json!({"m": {"a": 1}}));
    match get_in(&doc, &["m", "b"], CatchErrors::NONE) {
        Err(CorpusError::MissingKey { key, path }) => {
            assert_eq!(key, "b");
            assert_eq!(path, "m.b");
        }
        other => panic!("expected a missing key error, got {other:?}"),
    }
    assert!(matches!(
        get_in(&doc, &["m", "a", "x"], CatchErrors::NONE),
        Err(CorpusError::NotIndexable { .. })
    ));
    let only_missing = CatchErrors {
        missing_key: true,
        not_indexable: false,
    };
    assert!(get_in(&doc, &["m", "b"], only_missing).is_ok());
    assert!(get_in(&doc, &["m", "a", "x"], only_missing).is_err());
}

#[test]
fn with_new_value_appends_to_lists_instead_of_guessing_an_element() {
    let doc = document(json!({"l": [{"a": 1}]}));
    let updated = with_new_value(&doc, &["l", "a"], 2).unwrap();
    assert_eq!(updated.to_json(), json!({"l": [{"a": 1}, {"a": 2}]}));
    assert_eq!(doc.to_json(), json!({"l": [{"a": 1}]}));
}

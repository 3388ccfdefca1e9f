mod common;

use std::collections::HashSet;

use common::{FieldFixture, corpus};
use edu_corpus::{BowCorpus, ProcessedCorpus};
use proptest::prelude::*;

fn processed(texts: Vec<Vec<String>>) -> ProcessedCorpus {
    let documents = texts.len();
    let base = corpus(
        vec![FieldFixture::new("field", vec![vec!["c"]; documents])],
        documents,
    );
    ProcessedCorpus::new(base, texts).unwrap()
}

fn assert_consistent(bow: &BowCorpus) {
    for (row, tokens) in bow.processed_texts().iter().enumerate() {
        let in_text: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        for (column, token) in bow.vocabulary().iter().enumerate() {
            let count = bow.bows().arr()[[row, column]];
            assert_eq!(count > 0, in_text.contains(token.as_str()), "token {token} in row {row}");
            let occurrences = tokens.iter().filter(|candidate| *candidate == token).count();
            assert_eq!(usize::from(count), occurrences.min(255));
        }
        for token in in_text {
            assert!(bow.vocabulary().iter().any(|entry| entry == token));
        }
    }
    assert_eq!(bow.bows().uris().len(), bow.bows().labels().len());
    for (uri, label) in bow.bows().uris().iter().zip(bow.bows().labels()) {
        assert_eq!(label.as_deref(), Some(uri.as_str()));
    }
}

fn texts_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-e]", 0..8), 0..6)
}

proptest! {
    #[test]
    fn derived_vocabulary_matches_texts(texts in texts_strategy()) {
        let bow = BowCorpus::from_processed(processed(texts.clone()));
        assert_consistent(&bow);
        prop_assert_eq!(bow.processed_texts(), texts.as_slice());
        let distinct: HashSet<&String> = texts.iter().flatten().collect();
        prop_assert_eq!(bow.vocabulary().len(), distinct.len());
    }

    #[test]
    fn superset_vocabulary_keeps_texts_intact(texts in texts_strategy()) {
        let vocabulary: Vec<String> = ["z", "a", "b", "c", "d", "e", "y"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let bow = BowCorpus::from_processed_with_vocabulary(processed(texts.clone()), vocabulary.clone());
        assert_consistent(&bow);
        prop_assert_eq!(bow.processed_texts(), texts.as_slice());
        prop_assert_eq!(bow.vocabulary(), vocabulary.as_slice());
    }

    #[test]
    fn partial_vocabulary_trims_texts(texts in texts_strategy()) {
        let vocabulary = vec!["a".to_string(), "b".to_string()];
        let bow = BowCorpus::from_processed_with_vocabulary(processed(texts), vocabulary);
        assert_consistent(&bow);
        prop_assert!(bow.processed_texts().iter().flatten().all(|token| token == "a" || token == "b"));
    }
}

#[test]
fn counts_saturate_at_one_byte() {
    let bow = BowCorpus::from_processed(processed(vec![vec!["wort".to_string(); 300]]));
    assert_eq!(bow.bows().arr()[[0, 0]], 255);
    assert_eq!(bow.bows().document_totals(), vec![255]);
    assert_eq!(bow.processed_texts()[0].len(), 300);
}

#[test]
fn bag_of_words_serializes_with_every_stage() {
    let bow = BowCorpus::from_processed(processed(vec![vec!["a".to_string()]]));
    let json = serde_json::to_value(&bow).unwrap();
    for key in ["raw_texts", "ids", "target_data", "processed_texts", "bows"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}

mod common;

use common::{FieldFixture, bow_corpus, corpus, tokens};
use edu_corpus::pipeline::{
    apply_quality_thresholds, converge_quality, prune_frequent_tokens, prune_long_tokens,
};
use edu_corpus::{QualityReport, QualityThresholds};

const DOCUMENTS: usize = 50;
const SHORT: [usize; 3] = [7, 23, 41];

fn healthy_text() -> String {
    (0..12).map(|index| format!("t{index} ")).collect()
}

/// 50 documents over two fields; five tokens appear in only two documents
/// each and three documents hold only three tokens.
fn scenario() -> edu_corpus::BowCorpus {
    let level = (0..DOCUMENTS)
        .map(|index| if index < 25 { vec!["primary"] } else { vec!["secondary"] })
        .collect();
    let subject = (0..DOCUMENTS)
        .map(|index| {
            if index % 2 == 0 {
                vec!["math", "german"]
            } else {
                vec!["math"]
            }
        })
        .collect();
    let base = corpus(
        vec![
            FieldFixture::new("level", level),
            FieldFixture::new("subject", subject),
        ],
        DOCUMENTS,
    );

    let texts = (0..DOCUMENTS)
        .map(|index| {
            if SHORT.contains(&index) {
                return tokens("t0 t1 t2");
            }
            let mut text = healthy_text();
            if index < 10 {
                text.push_str(&format!("rare{}", index / 2));
            }
            tokens(&text)
        })
        .collect();
    bow_corpus(base, texts)
}

#[test]
fn quality_loop_converges_without_touching_healthy_entries() {
    let corpus = scenario();
    let thresholds = QualityThresholds::default();
    let before = QualityReport::measure(&corpus, &thresholds);
    assert_eq!(before.rare_tokens, 5);
    assert_eq!(before.short_documents, 3);

    let converged = converge_quality(corpus.clone(), &thresholds).unwrap();
    let report = QualityReport::measure(&converged, &thresholds);
    assert!(report.is_satisfied(), "{report}");

    let expected_ids: Vec<String> = (0..DOCUMENTS)
        .filter(|index| !SHORT.contains(index))
        .map(|index| format!("doc-{index}"))
        .collect();
    assert_eq!(converged.corpus().ids(), expected_ids.as_slice());

    let expected_vocabulary: Vec<String> = (0..12).map(|index| format!("t{index}")).collect();
    assert_eq!(converged.vocabulary(), expected_vocabulary.as_slice());

    for field in ["level", "subject"] {
        assert_eq!(
            converged.corpus().target(field).unwrap().uris(),
            corpus.corpus().target(field).unwrap().uris()
        );
    }
}

#[test]
fn quality_loop_may_end_with_an_empty_corpus() {
    let thresholds = QualityThresholds {
        min_category_support: DOCUMENTS + 1,
        ..QualityThresholds::default()
    };
    let converged = converge_quality(scenario(), &thresholds).unwrap();
    assert!(converged.is_empty());
    assert!(QualityReport::measure(&converged, &thresholds).is_satisfied());
}

#[test]
fn frequent_tokens_are_dropped_by_share() {
    let base = corpus(vec![FieldFixture::new("f", vec![vec!["c"]; 2])], 2);
    let bow = bow_corpus(base, vec![tokens("a a a b"), tokens("a c")]);
    // a: 4/6, b: 1/6, c: 1/6
    let pruned = prune_frequent_tokens(&bow, 0.5).unwrap();
    assert_eq!(pruned.vocabulary(), &["b".to_string(), "c".to_string()]);

    // A share exactly at the limit is dropped too.
    let pruned = prune_frequent_tokens(&bow, 1.0 / 6.0).unwrap();
    assert!(pruned.vocabulary().is_empty());
}

#[test]
fn long_tokens_are_dropped() {
    let base = corpus(vec![FieldFixture::new("f", vec![vec!["c"]])], 1);
    let thirty = "x".repeat(30);
    let thirty_one = "y".repeat(31);
    let bow = bow_corpus(base, vec![vec![thirty.clone(), thirty_one]]);
    let pruned = prune_long_tokens(&bow, 30).unwrap();
    assert_eq!(pruned.vocabulary(), &[thirty]);
}

#[test]
fn thresholds_apply_one_shot_prunes_before_the_loop() {
    let thresholds = QualityThresholds {
        max_token_share: 0.5,
        ..QualityThresholds::default()
    };
    let result = apply_quality_thresholds(&scenario(), &thresholds).unwrap();
    assert!(QualityReport::measure(&result, &thresholds).is_satisfied());
    assert!(result.vocabulary().iter().all(|token| token.starts_with('t')));
}

#![allow(dead_code)]

use edu_corpus::{BowCorpus, Corpus, ProcessedCorpus, TargetData};
use indexmap::IndexMap;
use ndarray::Array1;

/// One target field: per-document category lists and test-set flags.
pub struct FieldFixture {
    pub name: &'static str,
    pub categories: Vec<Vec<&'static str>>,
    pub in_test_set: Vec<bool>,
}

impl FieldFixture {
    pub fn new(name: &'static str, categories: Vec<Vec<&'static str>>) -> Self {
        let in_test_set = vec![false; categories.len()];
        Self {
            name,
            categories,
            in_test_set,
        }
    }

    pub fn with_test_set(mut self, in_test_set: Vec<bool>) -> Self {
        self.in_test_set = in_test_set;
        self
    }
}

pub fn corpus(fields: Vec<FieldFixture>, documents: usize) -> Corpus {
    let mut target_data = IndexMap::new();
    for field in fields {
        let (arr, uris) = edu_corpus::as_boolean_array(
            field
                .categories
                .iter()
                .map(|categories| categories.iter().map(|uri| uri.to_string())),
            None,
        );
        let labels = uris.iter().map(|uri| Some(format!("label of {uri}"))).collect();
        target_data.insert(
            field.name.to_string(),
            TargetData::new(arr, Array1::from(field.in_test_set), uris, labels).unwrap(),
        );
    }
    Corpus::new(
        (0..documents).map(|index| format!("text {index}")).collect(),
        (0..documents).map(|index| format!("doc-{index}")).collect(),
        (0..documents).map(|index| index % 3 == 0).collect::<Array1<bool>>(),
        target_data,
    )
    .unwrap()
}

pub fn bow_corpus(corpus: Corpus, texts: Vec<Vec<String>>) -> BowCorpus {
    BowCorpus::from_processed(ProcessedCorpus::new(corpus, texts).unwrap())
}

pub fn tokens(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

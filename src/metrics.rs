use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::QualityThresholds;
use crate::data::{BowCorpus, Corpus};
use crate::types::FieldName;

/// Number of labels each document carries, summed over every target field.
pub fn labels_per_document(corpus: &Corpus) -> Vec<u64> {
    let mut counts = vec![0u64; corpus.len()];
    for target in corpus.target_data().values() {
        for (count, labels) in counts.iter_mut().zip(target.document_totals()) {
            *count += labels;
        }
    }
    counts
}

/// Share of all token occurrences per vocabulary entry; all zero when the
/// corpus holds no tokens.
pub fn token_shares(corpus: &BowCorpus) -> Vec<f64> {
    let totals = corpus.bows().category_totals();
    let sum: u64 = totals.iter().sum();
    totals
        .into_iter()
        .map(|total| {
            if sum == 0 {
                0.0
            } else {
                total as f64 / sum as f64
            }
        })
        .collect()
}

/// Measurements of the four convergence conditions on one corpus.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualityReport {
    /// Number of documents.
    pub documents: usize,
    /// Number of vocabulary tokens.
    pub vocabulary: usize,
    /// Smallest document length, if any document exists.
    pub min_document_length: Option<u64>,
    /// Smallest token support, if any token exists.
    pub min_token_support: Option<usize>,
    /// Category count and smallest category support per target field.
    pub categories: IndexMap<FieldName, (usize, Option<usize>)>,
    /// Documents below the minimum length.
    pub short_documents: usize,
    /// Tokens below the minimum support.
    pub rare_tokens: usize,
    /// Categories below the minimum support, per target field.
    pub rare_categories: IndexMap<FieldName, usize>,
    /// Documents without any label.
    pub unlabeled_documents: usize,
}

impl QualityReport {
    /// Measure `corpus` against `thresholds`.
    pub fn measure(corpus: &BowCorpus, thresholds: &QualityThresholds) -> Self {
        let lengths = corpus.bows().document_totals();
        let token_support = corpus.bows().category_support();

        let mut categories = IndexMap::new();
        let mut rare_categories = IndexMap::new();
        for (field, target) in corpus.corpus().target_data() {
            let support = target.category_support();
            categories.insert(
                field.clone(),
                (support.len(), support.iter().copied().min()),
            );
            rare_categories.insert(
                field.clone(),
                support
                    .iter()
                    .filter(|&&count| count < thresholds.min_category_support)
                    .count(),
            );
        }

        Self {
            documents: corpus.len(),
            vocabulary: corpus.vocabulary().len(),
            min_document_length: lengths.iter().copied().min(),
            min_token_support: token_support.iter().copied().min(),
            categories,
            short_documents: lengths
                .iter()
                .filter(|&&length| length < thresholds.min_document_length)
                .count(),
            rare_tokens: token_support
                .iter()
                .filter(|&&support| support < thresholds.min_token_support)
                .count(),
            rare_categories,
            unlabeled_documents: labels_per_document(corpus.corpus())
                .into_iter()
                .filter(|&count| count == 0)
                .count(),
        }
    }

    /// True if all four conditions hold; vacuously true for an empty corpus.
    pub fn is_satisfied(&self) -> bool {
        self.short_documents == 0
            && self.rare_tokens == 0
            && self.rare_categories.values().all(|&count| count == 0)
            && self.unlabeled_documents == 0
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "documents={} vocabulary={} min_length={} min_token_support={}",
            self.documents,
            self.vocabulary,
            display_min(self.min_document_length),
            display_min(self.min_token_support),
        )?;
        for (field, (count, min_support)) in &self.categories {
            writeln!(
                f,
                "  {field}: categories={count} min_support={}",
                display_min(*min_support)
            )?;
        }
        Ok(())
    }
}

fn display_min<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

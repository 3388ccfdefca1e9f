use std::collections::HashSet;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use crate::constants::bow::{BOW_FIELD, MAX_TOKEN_COUNT};
use crate::errors::CorpusError;
use crate::subset::{CategoryAxes, DocumentAxis, check_indices, check_unique_indices};
use crate::types::{CategoryLabel, CategoryUri, DocumentId, FieldName, Token};
use crate::utils::Tokenizer;

/// Cell type of an assignment matrix.
pub trait Assignment: Copy {
    /// Numeric weight of the cell; zero means "not assigned".
    fn weight(self) -> u64;
}

impl Assignment for bool {
    fn weight(self) -> u64 {
        u64::from(self)
    }
}

impl Assignment for u8 {
    fn weight(self) -> u64 {
        u64::from(self)
    }
}

/// One field's encoding across a corpus: document x category assignments plus
/// the per-category metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TargetData<A = bool> {
    arr: Array2<A>,
    in_test_set: Array1<bool>,
    // Category metadata is never per-document; row subsets share it.
    uris: Arc<[CategoryUri]>,
    labels: Arc<[CategoryLabel]>,
}

impl<A: Assignment> TargetData<A> {
    /// Validate and assemble target data.
    pub fn new(
        arr: Array2<A>,
        in_test_set: Array1<bool>,
        uris: Vec<CategoryUri>,
        labels: Vec<CategoryLabel>,
    ) -> Result<Self, CorpusError> {
        if uris.len() != arr.ncols() || labels.len() != arr.ncols() {
            return Err(CorpusError::ShapeMismatch(format!(
                "{} uris and {} labels for {} category columns",
                uris.len(),
                labels.len(),
                arr.ncols()
            )));
        }
        if in_test_set.len() != arr.nrows() {
            return Err(CorpusError::ShapeMismatch(format!(
                "{} test-set flags for {} documents",
                in_test_set.len(),
                arr.nrows()
            )));
        }
        let mut seen = HashSet::with_capacity(uris.len());
        if let Some(duplicate) = uris.iter().find(|uri| !seen.insert(uri.as_str())) {
            return Err(CorpusError::ShapeMismatch(format!(
                "duplicate category uri '{duplicate}'"
            )));
        }
        Ok(Self {
            arr,
            in_test_set,
            uris: uris.into(),
            labels: labels.into(),
        })
    }

    /// Document x category assignment matrix.
    pub fn arr(&self) -> &Array2<A> {
        &self.arr
    }

    /// Pre-existing test-set membership per document.
    pub fn in_test_set(&self) -> &Array1<bool> {
        &self.in_test_set
    }

    /// Category identifiers in column order.
    pub fn uris(&self) -> &[CategoryUri] {
        &self.uris
    }

    /// Human-readable category names in column order.
    pub fn labels(&self) -> &[CategoryLabel] {
        &self.labels
    }

    /// Number of category columns.
    pub fn num_categories(&self) -> usize {
        self.arr.ncols()
    }

    /// Number of documents with a non-zero cell, per category.
    pub fn category_support(&self) -> Vec<usize> {
        self.arr
            .columns()
            .into_iter()
            .map(|column| column.iter().filter(|cell| cell.weight() > 0).count())
            .collect()
    }

    /// Sum of all cells, per category.
    pub fn category_totals(&self) -> Vec<u64> {
        self.arr
            .columns()
            .into_iter()
            .map(|column| column.iter().map(|cell| cell.weight()).sum())
            .collect()
    }

    /// Sum of all cells, per document.
    pub fn document_totals(&self) -> Vec<u64> {
        self.arr
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|cell| cell.weight()).sum())
            .collect()
    }

    /// Restrict and reorder the category axis; `indices` must not repeat.
    pub fn select_category_columns(&self, indices: &[usize]) -> Result<Self, CorpusError> {
        check_indices(indices, self.num_categories(), "category")?;
        check_unique_indices(indices, "category")?;
        Ok(Self {
            arr: self.arr.select(Axis(1), indices),
            in_test_set: self.in_test_set.clone(),
            uris: indices.iter().map(|&index| self.uris[index].clone()).collect(),
            labels: indices
                .iter()
                .map(|&index| self.labels[index].clone())
                .collect(),
        })
    }
}

impl<A: Assignment> DocumentAxis for TargetData<A> {
    fn num_documents(&self) -> usize {
        self.arr.nrows()
    }

    fn select_documents(&self, indices: &[usize]) -> Self {
        Self {
            arr: self.arr.select(Axis(0), indices),
            in_test_set: self.in_test_set.select(Axis(0), indices),
            uris: Arc::clone(&self.uris),
            labels: Arc::clone(&self.labels),
        }
    }
}

/// Labeled text corpus with one `TargetData` per target field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Corpus {
    raw_texts: Vec<String>,
    ids: Vec<DocumentId>,
    editorially_confirmed: Array1<bool>,
    target_data: IndexMap<FieldName, TargetData>,
}

impl Corpus {
    /// Validate that every per-document array shares one document axis.
    pub fn new(
        raw_texts: Vec<String>,
        ids: Vec<DocumentId>,
        editorially_confirmed: Array1<bool>,
        target_data: IndexMap<FieldName, TargetData>,
    ) -> Result<Self, CorpusError> {
        let len = raw_texts.len();
        if ids.len() != len || editorially_confirmed.len() != len {
            return Err(CorpusError::ShapeMismatch(format!(
                "{len} texts, {} ids and {} editor flags",
                ids.len(),
                editorially_confirmed.len()
            )));
        }
        if let Some((field, target)) = target_data
            .iter()
            .find(|(_, target)| target.num_documents() != len)
        {
            return Err(CorpusError::ShapeMismatch(format!(
                "target '{field}' covers {} documents, corpus has {len}",
                target.num_documents()
            )));
        }
        Ok(Self {
            raw_texts,
            ids,
            editorially_confirmed,
            target_data,
        })
    }

    /// Unprocessed text per document.
    pub fn raw_texts(&self) -> &[String] {
        &self.raw_texts
    }

    /// Document ids.
    pub fn ids(&self) -> &[DocumentId] {
        &self.ids
    }

    /// Editorial confirmation flag per document.
    pub fn editorially_confirmed(&self) -> &Array1<bool> {
        &self.editorially_confirmed
    }

    /// All target fields in insertion order.
    pub fn target_data(&self) -> &IndexMap<FieldName, TargetData> {
        &self.target_data
    }

    /// Target data of one field.
    pub fn target(&self, field: &str) -> Option<&TargetData> {
        self.target_data.get(field)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.raw_texts.len()
    }

    /// True if the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.raw_texts.is_empty()
    }
}

impl DocumentAxis for Corpus {
    fn num_documents(&self) -> usize {
        self.len()
    }

    fn select_documents(&self, indices: &[usize]) -> Self {
        Self {
            raw_texts: select_rows(&self.raw_texts, indices),
            ids: select_rows(&self.ids, indices),
            editorially_confirmed: self.editorially_confirmed.select(Axis(0), indices),
            target_data: self
                .target_data
                .iter()
                .map(|(field, target)| (field.clone(), target.select_documents(indices)))
                .collect(),
        }
    }
}

impl CategoryAxes for Corpus {
    fn select_categories(
        &self,
        field: &str,
        indices: &[usize],
    ) -> Result<Option<Self>, CorpusError> {
        let Some(target) = self.target_data.get(field) else {
            return Ok(None);
        };
        let mut target_data = self.target_data.clone();
        target_data.insert(field.to_string(), target.select_category_columns(indices)?);
        Ok(Some(Self {
            target_data,
            ..self.clone()
        }))
    }
}

/// Corpus with one token sequence per document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessedCorpus {
    #[serde(flatten)]
    corpus: Corpus,
    processed_texts: Vec<Vec<Token>>,
}

impl ProcessedCorpus {
    /// Attach externally produced token sequences.
    pub fn new(corpus: Corpus, processed_texts: Vec<Vec<Token>>) -> Result<Self, CorpusError> {
        if processed_texts.len() != corpus.len() {
            return Err(CorpusError::ShapeMismatch(format!(
                "{} processed texts for {} documents",
                processed_texts.len(),
                corpus.len()
            )));
        }
        Ok(Self {
            corpus,
            processed_texts,
        })
    }

    /// Tokenize every raw text with `tokenizer`.
    pub fn from_corpus<T: Tokenizer + ?Sized>(corpus: Corpus, tokenizer: &T) -> Self {
        let processed_texts = corpus
            .raw_texts()
            .iter()
            .map(|text| tokenizer.tokenize(text))
            .collect();
        Self {
            corpus,
            processed_texts,
        }
    }

    /// The underlying corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Token sequence per document.
    pub fn processed_texts(&self) -> &[Vec<Token>] {
        &self.processed_texts
    }

    /// Drop the token sequences.
    pub fn into_corpus(self) -> Corpus {
        self.corpus
    }
}

impl DocumentAxis for ProcessedCorpus {
    fn num_documents(&self) -> usize {
        self.corpus.len()
    }

    fn select_documents(&self, indices: &[usize]) -> Self {
        Self {
            corpus: self.corpus.select_documents(indices),
            processed_texts: select_rows(&self.processed_texts, indices),
        }
    }
}

impl CategoryAxes for ProcessedCorpus {
    fn select_categories(
        &self,
        field: &str,
        indices: &[usize],
    ) -> Result<Option<Self>, CorpusError> {
        Ok(self
            .corpus
            .select_categories(field, indices)?
            .map(|corpus| Self {
                corpus,
                processed_texts: self.processed_texts.clone(),
            }))
    }
}

/// Processed corpus with a bag-of-words count matrix, addressable as the
/// target field `bows`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BowCorpus {
    #[serde(flatten)]
    processed: ProcessedCorpus,
    bows: TargetData<u8>,
}

impl BowCorpus {
    /// Count tokens over a vocabulary derived from the texts in first-seen order.
    pub fn from_processed(processed: ProcessedCorpus) -> Self {
        let vocabulary: IndexSet<Token> = processed
            .processed_texts
            .iter()
            .flatten()
            .cloned()
            .collect();
        Self::build(processed, vocabulary)
    }

    /// Count tokens over an explicit vocabulary.
    ///
    /// Tokens outside the vocabulary are removed from the processed texts so
    /// that texts and counts agree.
    pub fn from_processed_with_vocabulary<I>(processed: ProcessedCorpus, vocabulary: I) -> Self
    where
        I: IntoIterator<Item = Token>,
    {
        let vocabulary: IndexSet<Token> = vocabulary.into_iter().collect();
        let ProcessedCorpus {
            corpus,
            processed_texts,
        } = processed;
        let processed_texts = processed_texts
            .into_iter()
            .map(|tokens| {
                tokens
                    .into_iter()
                    .filter(|token| vocabulary.contains(token))
                    .collect()
            })
            .collect();
        Self::build(
            ProcessedCorpus {
                corpus,
                processed_texts,
            },
            vocabulary,
        )
    }

    fn build(processed: ProcessedCorpus, vocabulary: IndexSet<Token>) -> Self {
        let documents = processed.processed_texts.len();
        let mut arr = Array2::<u8>::zeros((documents, vocabulary.len()));
        for (row, tokens) in processed.processed_texts.iter().enumerate() {
            for token in tokens {
                if let Some(column) = vocabulary.get_index_of(token) {
                    let cell = &mut arr[[row, column]];
                    *cell = cell.saturating_add(1).min(MAX_TOKEN_COUNT);
                }
            }
        }
        let tokens: Vec<Token> = vocabulary.into_iter().collect();
        let bows = TargetData {
            arr,
            in_test_set: Array1::from_elem(documents, false),
            labels: tokens.iter().cloned().map(Some).collect(),
            uris: tokens.into(),
        };
        Self { processed, bows }
    }

    /// The processed corpus.
    pub fn processed(&self) -> &ProcessedCorpus {
        &self.processed
    }

    /// The underlying corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.processed.corpus
    }

    /// Token sequence per document.
    pub fn processed_texts(&self) -> &[Vec<Token>] {
        &self.processed.processed_texts
    }

    /// Bag-of-words counts as target data.
    pub fn bows(&self) -> &TargetData<u8> {
        &self.bows
    }

    /// Tokens in column order of the count matrix.
    pub fn vocabulary(&self) -> &[Token] {
        self.bows.uris()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.processed.corpus.len()
    }

    /// True if the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.processed.corpus.is_empty()
    }
}

impl DocumentAxis for BowCorpus {
    fn num_documents(&self) -> usize {
        self.len()
    }

    fn select_documents(&self, indices: &[usize]) -> Self {
        Self {
            processed: self.processed.select_documents(indices),
            bows: self.bows.select_documents(indices),
        }
    }
}

impl CategoryAxes for BowCorpus {
    fn select_categories(
        &self,
        field: &str,
        indices: &[usize],
    ) -> Result<Option<Self>, CorpusError> {
        let bows = if field == BOW_FIELD {
            Some(self.bows.select_category_columns(indices)?)
        } else {
            None
        };
        let processed = self.processed.select_categories(field, indices)?;
        if bows.is_none() && processed.is_none() {
            return Ok(None);
        }
        Ok(Some(Self {
            processed: processed.unwrap_or_else(|| self.processed.clone()),
            bows: bows.unwrap_or_else(|| self.bows.clone()),
        }))
    }
}

impl AsRef<Corpus> for Corpus {
    fn as_ref(&self) -> &Corpus {
        self
    }
}

impl AsRef<Corpus> for ProcessedCorpus {
    fn as_ref(&self) -> &Corpus {
        &self.corpus
    }
}

impl AsRef<Corpus> for BowCorpus {
    fn as_ref(&self) -> &Corpus {
        &self.processed.corpus
    }
}

fn select_rows<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&index| values[index].clone()).collect()
}

//! From raw dump documents to a quality-thresholded bag-of-words corpus.
//!
//! Stages, in order:
//! 1. extraction (value fixes, filters, column selection)
//! 2. corpus assembly and pruning of rare categories
//! 3. tokenization and bag-of-words encoding
//! 4. one-shot token prunes (too frequent, too long)
//! 5. the quality loop, repeated until every threshold holds

use std::path::Path;

use indexmap::IndexMap;
use ndarray::Array1;
use tracing::{debug, info};

use crate::config::{PipelineConfig, QualityThresholds};
use crate::constants::{bow::BOW_FIELD, fields, filters as sentinels};
use crate::data::{BowCorpus, Corpus, ProcessedCorpus, TargetData};
use crate::document::{Document, Scalar, Terminal};
use crate::errors::CorpusError;
use crate::filters::{
    Filter, MinLengths, MultiValue, basic_admissibility_filter, existing_text_filter,
    labeled_filter, language_filter, min_length_filter, public_visibility_filter,
};
use crate::metrics::{QualityReport, labels_per_document, token_shares};
use crate::source::labels::{LabelCache, LabelResolver};
use crate::source::{DumpReader, RecordExtractor, Row};
use crate::subset::{
    CategoryAxes, DocumentAxis, indices_where, subset_categories, subset_data_points,
};
use crate::transform::as_boolean_array;
use crate::types::FieldName;
use crate::utils::{Tokenizer, raw_text};

/// Label resolvers keyed by target field.
pub type LabelResolvers = IndexMap<FieldName, Box<dyn LabelResolver>>;

/// Filters applied while reading the dump.
///
/// With `use_default_filters` this starts with basic admissibility, public
/// visibility, and existing text; then come the labeled filter (any target),
/// the language filter, and the minimum text length over description or title.
pub fn default_filters(config: &PipelineConfig) -> Vec<Filter> {
    let mut filters = Vec::new();
    if config.use_default_filters {
        filters.push(basic_admissibility_filter());
        filters.push(public_visibility_filter());
        filters.push(existing_text_filter());
    }
    filters.push(labeled_filter(
        config.target_fields.clone(),
        MultiValue::Any,
    ));
    filters.push(language_filter(config.languages.clone()));
    filters.push(min_length_filter(
        vec![fields::DESCRIPTION.to_string(), fields::TITLE.to_string()],
        MinLengths::Shared(config.min_text_chars),
        MultiValue::Any,
    ));
    filters
}

/// Columns extracted for corpus assembly.
pub fn extraction_columns(target_fields: &[FieldName]) -> Vec<FieldName> {
    let mut columns: Vec<FieldName> = [
        fields::TITLE,
        fields::DESCRIPTION,
        fields::ID,
        fields::COLLECTIONS_TITLE,
        fields::LANGUAGE,
        fields::TEST_DATA,
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    for field in target_fields {
        if !columns.contains(field) {
            columns.push(field.clone());
        }
    }
    columns
}

/// Build a corpus from extracted rows.
///
/// Texts are title and first description entry joined by a newline. Fields
/// without a resolver get no labels; resolved labels go through `cache`.
pub fn assemble_corpus(
    rows: &[Row],
    target_fields: &[FieldName],
    resolvers: &LabelResolvers,
    cache: &mut LabelCache,
) -> Result<Corpus, CorpusError> {
    let column = |row: &Row, name: &str| row.get(name).cloned().unwrap_or(Terminal::ABSENT);

    let raw_texts = rows
        .iter()
        .map(|row| {
            let title = first_string(&column(row, fields::TITLE));
            let description = first_string(&column(row, fields::DESCRIPTION));
            raw_text(title.as_deref(), description.as_deref())
        })
        .collect();
    let ids = rows
        .iter()
        .map(|row| first_string(&column(row, fields::ID)).unwrap_or_default())
        .collect();
    let editorial = Scalar::from(sentinels::EDITORIAL_COLLECTION);
    let editorially_confirmed = rows
        .iter()
        .map(|row| column(row, fields::COLLECTIONS_TITLE).contains(&editorial))
        .collect::<Array1<bool>>();

    let mut target_data = IndexMap::new();
    for field in target_fields {
        // Category uris are the rendered values, so values that render alike
        // (`1`, `"1"`, `1.0`) share one column.
        let (arr, uris) = as_boolean_array(
            rows.iter().map(|row| {
                column(row, field)
                    .present_values()
                    .iter()
                    .map(Scalar::to_string)
                    .collect::<Vec<_>>()
            }),
            None,
        );
        let labels = match resolvers.get(field) {
            Some(resolver) => cache.labels_for(resolver.as_ref(), &uris),
            None => vec![None; uris.len()],
        };
        let marker = Scalar::from(field.as_str());
        let in_test_set = rows
            .iter()
            .map(|row| column(row, fields::TEST_DATA).contains(&marker))
            .collect::<Array1<bool>>();
        target_data.insert(
            field.clone(),
            TargetData::new(arr, in_test_set, uris, labels)?,
        );
    }

    Corpus::new(raw_texts, ids, editorially_confirmed, target_data)
}

fn first_string(terminal: &Terminal) -> Option<String> {
    terminal.present_values().first().map(Scalar::to_string)
}

/// Drop categories below `min_support` in every target field, then drop
/// documents that lost all labels of some target field.
pub fn prune_rare_categories(corpus: &Corpus, min_support: usize) -> Result<Corpus, CorpusError> {
    let mut pruned = drop_rare_categories(corpus.clone(), min_support)?;
    let mut labeled = vec![true; pruned.len()];
    for target in pruned.target_data().values() {
        for (keep, labels) in labeled.iter_mut().zip(target.document_totals()) {
            *keep &= labels > 0;
        }
    }
    pruned = subset_data_points(&pruned, &indices_where(labeled))?;
    debug!(
        "[edu-corpus:pipeline] {} documents remain after category pruning",
        pruned.len()
    );
    Ok(pruned)
}

fn drop_rare_categories<C>(mut corpus: C, min_support: usize) -> Result<C, CorpusError>
where
    C: CategoryAxes + AsRef<Corpus>,
{
    let supports: Vec<(FieldName, Vec<usize>)> = corpus
        .as_ref()
        .target_data()
        .iter()
        .map(|(field, target)| (field.clone(), target.category_support()))
        .collect();
    for (field, support) in supports {
        let keep = indices_where(support.iter().map(|&count| count >= min_support));
        corpus = subset_categories(&corpus, &keep, &field)?;
    }
    Ok(corpus)
}

/// Drop tokens whose share of all token occurrences reaches `max_share`.
pub fn prune_frequent_tokens(corpus: &BowCorpus, max_share: f64) -> Result<BowCorpus, CorpusError> {
    let keep = indices_where(token_shares(corpus).into_iter().map(|share| share < max_share));
    subset_categories(corpus, &keep, BOW_FIELD)
}

/// Drop tokens longer than `max_chars` characters.
pub fn prune_long_tokens(corpus: &BowCorpus, max_chars: usize) -> Result<BowCorpus, CorpusError> {
    let keep = indices_where(
        corpus
            .vocabulary()
            .iter()
            .map(|token| token.chars().count() <= max_chars),
    );
    subset_categories(corpus, &keep, BOW_FIELD)
}

/// Prune until document length, token support, category support, and
/// labeling all meet `thresholds`.
///
/// Every round that does not end the loop removes at least one row or
/// column, so the loop terminates; an empty corpus is a valid result.
pub fn converge_quality(
    mut corpus: BowCorpus,
    thresholds: &QualityThresholds,
) -> Result<BowCorpus, CorpusError> {
    let mut round = 0usize;
    loop {
        let report = QualityReport::measure(&corpus, thresholds);
        if report.is_satisfied() {
            info!(
                "[edu-corpus:pipeline] thresholds met after {} rounds ({} documents x {} tokens)",
                round,
                corpus.len(),
                corpus.vocabulary().len()
            );
            return Ok(corpus);
        }
        round += 1;
        info!(
            "[edu-corpus:pipeline] quality round {}: {} documents x {} tokens",
            round,
            corpus.len(),
            corpus.vocabulary().len()
        );

        let support = corpus.bows().category_support();
        let keep = indices_where(
            support
                .iter()
                .map(|&count| count >= thresholds.min_token_support),
        );
        corpus = subset_categories(&corpus, &keep, BOW_FIELD)?;

        let lengths = corpus.bows().document_totals();
        let keep = indices_where(
            lengths
                .iter()
                .map(|&length| length >= thresholds.min_document_length),
        );
        corpus = subset_data_points(&corpus, &keep)?;

        corpus = drop_rare_categories(corpus, thresholds.min_category_support)?;

        let keep = indices_where(
            labels_per_document(corpus.corpus())
                .into_iter()
                .map(|count| count > 0),
        );
        corpus = subset_data_points(&corpus, &keep)?;
    }
}

/// One-shot token prunes followed by `converge_quality`.
pub fn apply_quality_thresholds(
    corpus: &BowCorpus,
    thresholds: &QualityThresholds,
) -> Result<BowCorpus, CorpusError> {
    let corpus = prune_frequent_tokens(corpus, thresholds.max_token_share)?;
    let corpus = prune_long_tokens(&corpus, thresholds.max_token_chars)?;
    converge_quality(corpus, thresholds)
}

/// Split into (train, test) by the `in_test_set` flags of `field`.
pub fn split_by_test_set<C>(corpus: &C, field: &str) -> Result<(C, C), CorpusError>
where
    C: DocumentAxis + AsRef<Corpus>,
{
    let flags = corpus
        .as_ref()
        .target(field)
        .ok_or_else(|| CorpusError::UnknownField(field.to_string()))?
        .in_test_set()
        .to_vec();
    let train = indices_where(flags.iter().map(|&flag| !flag));
    let test = indices_where(flags);
    Ok((
        subset_data_points(corpus, &train)?,
        subset_data_points(corpus, &test)?,
    ))
}

/// End-to-end corpus generation.
pub struct Pipeline {
    config: PipelineConfig,
    resolvers: LabelResolvers,
    extra_filters: Vec<Filter>,
}

impl Pipeline {
    /// Validate `config` and create a pipeline without label resolvers.
    pub fn new(config: PipelineConfig) -> Result<Self, CorpusError> {
        config.validate()?;
        Ok(Self {
            config,
            resolvers: IndexMap::new(),
            extra_filters: Vec::new(),
        })
    }

    /// Resolve labels of `field` with `resolver`.
    pub fn with_label_resolver(
        mut self,
        field: impl Into<FieldName>,
        resolver: impl LabelResolver + 'static,
    ) -> Self {
        self.resolvers.insert(field.into(), Box::new(resolver));
        self
    }

    /// Add a filter on top of the configured ones.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.extra_filters.push(filter);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extractor with the configured fixes, filters, and columns.
    pub fn extractor(&self) -> Result<RecordExtractor, CorpusError> {
        Ok(RecordExtractor::new(&self.config.extraction)?
            .with_filters(default_filters(&self.config))
            .with_filters(self.extra_filters.iter().cloned())
            .with_columns(extraction_columns(&self.config.target_fields)))
    }

    /// Extract, assemble, and prune rare categories.
    pub fn base_corpus<I>(
        &self,
        documents: I,
        cache: &mut LabelCache,
    ) -> Result<Corpus, CorpusError>
    where
        I: IntoIterator<Item = Result<Document, CorpusError>>,
    {
        info!("[edu-corpus:pipeline] reading data");
        let rows = self.extractor()?.extract(documents)?;
        let corpus = assemble_corpus(&rows, &self.config.target_fields, &self.resolvers, cache)?;
        prune_rare_categories(&corpus, self.config.quality.min_category_support)
    }

    /// Run every stage on already parsed documents.
    pub fn run<I, T>(
        &self,
        documents: I,
        tokenizer: &T,
        cache: &mut LabelCache,
    ) -> Result<BowCorpus, CorpusError>
    where
        I: IntoIterator<Item = Result<Document, CorpusError>>,
        T: Tokenizer + ?Sized,
    {
        let corpus = self.base_corpus(documents, cache)?;
        info!(
            "[edu-corpus:pipeline] tokenizing {} documents",
            corpus.len()
        );
        let processed = ProcessedCorpus::from_corpus(corpus, tokenizer);
        let bow = BowCorpus::from_processed(processed);
        info!(
            "[edu-corpus:pipeline] applying quality thresholds to {} documents x {} tokens",
            bow.len(),
            bow.vocabulary().len()
        );
        apply_quality_thresholds(&bow, &self.config.quality)
    }

    /// Run every stage on a dump file.
    pub fn run_file<T: Tokenizer + ?Sized>(
        &self,
        path: &Path,
        tokenizer: &T,
        cache: &mut LabelCache,
    ) -> Result<BowCorpus, CorpusError> {
        let documents = DumpReader::open(path, &self.config.extraction)?;
        self.run(documents, tokenizer, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::labels::StaticLabels;

    fn row(entries: &[(&str, Terminal)]) -> Row {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn text(value: &str) -> Terminal {
        Terminal::Value(Some(Scalar::from(value)))
    }

    fn many(values: &[&str]) -> Terminal {
        Terminal::Sequence(values.iter().map(|value| Some(Scalar::from(*value))).collect())
    }

    #[test]
    fn assemble_corpus_builds_texts_flags_and_targets() {
        let rows = vec![
            row(&[
                (fields::TITLE, text("Titel")),
                (fields::DESCRIPTION, many(&["Beschreibung", "ignored"])),
                (fields::ID, text("id-1")),
                (fields::COLLECTIONS_TITLE, many(&["Redaktionsbuffet"])),
                (fields::TAXONID, many(&["u/380", "u/120"])),
                (fields::TEST_DATA, many(&[fields::TAXONID])),
            ]),
            row(&[
                (fields::ID, text("id-2")),
                (fields::TAXONID, many(&["u/120"])),
            ]),
        ];
        let mut resolvers: LabelResolvers = IndexMap::new();
        let labels: StaticLabels = [("u/380", "Mathematik")].into_iter().collect();
        resolvers.insert(fields::TAXONID.to_string(), Box::new(labels));
        let mut cache = LabelCache::new();

        let corpus = assemble_corpus(
            &rows,
            &[fields::TAXONID.to_string()],
            &resolvers,
            &mut cache,
        )
        .unwrap();

        assert_eq!(corpus.raw_texts(), &["Titel\nBeschreibung".to_string(), "\n".to_string()]);
        assert_eq!(corpus.ids(), &["id-1".to_string(), "id-2".to_string()]);
        assert_eq!(corpus.editorially_confirmed().to_vec(), vec![true, false]);
        let target = corpus.target(fields::TAXONID).unwrap();
        assert_eq!(target.uris(), &["u/380".to_string(), "u/120".to_string()]);
        assert_eq!(target.labels(), &[Some("Mathematik".to_string()), None]);
        assert_eq!(target.in_test_set().to_vec(), vec![true, false]);
        assert_eq!(target.category_support(), vec![1, 2]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn values_rendering_alike_share_one_category() {
        let rows = vec![
            row(&[("f", Terminal::Sequence(vec![Some(Scalar::Int(1))]))]),
            row(&[("f", Terminal::Sequence(vec![Some(Scalar::from("1"))]))]),
            row(&[(
                "f",
                Terminal::Sequence(vec![Some(Scalar::Float(1.0)), Some(Scalar::Int(2))]),
            )]),
        ];
        let corpus = assemble_corpus(
            &rows,
            &["f".to_string()],
            &IndexMap::new(),
            &mut LabelCache::new(),
        )
        .unwrap();
        let target = corpus.target("f").unwrap();
        assert_eq!(target.uris(), &["1".to_string(), "2".to_string()]);
        assert_eq!(target.category_support(), vec![3, 1]);
    }

    #[test]
    fn prune_rare_categories_drops_documents_missing_any_target() {
        let rows: Vec<Row> = (0..4)
            .map(|index| {
                let discipline = if index < 3 { "common" } else { "rare" };
                row(&[
                    (fields::ID, text(&index.to_string())),
                    ("a", many(&[discipline])),
                    ("b", many(&["shared"])),
                ])
            })
            .collect();
        let corpus = assemble_corpus(
            &rows,
            &["a".to_string(), "b".to_string()],
            &IndexMap::new(),
            &mut LabelCache::new(),
        )
        .unwrap();
        let pruned = prune_rare_categories(&corpus, 2).unwrap();
        assert_eq!(pruned.len(), 3);
        assert_eq!(pruned.target("a").unwrap().uris(), &["common".to_string()]);
        assert_eq!(pruned.ids(), &["0".to_string(), "1".to_string(), "2".to_string()]);
    }

    #[test]
    fn default_filters_respect_flag() {
        let config = PipelineConfig::default();
        assert_eq!(default_filters(&config).len(), 6);
        let config = PipelineConfig {
            use_default_filters: false,
            ..PipelineConfig::default()
        };
        assert_eq!(default_filters(&config).len(), 3);
    }

    #[test]
    fn extraction_columns_do_not_repeat_fields() {
        let columns = extraction_columns(&[fields::TITLE.to_string(), "x".to_string()]);
        assert_eq!(columns.len(), 7);
        assert_eq!(columns.last().map(String::as_str), Some("x"));
    }

    #[test]
    fn split_by_test_set_rejects_unknown_fields() {
        let corpus = Corpus::new(
            Vec::new(),
            Vec::new(),
            Array1::from_elem(0, false),
            IndexMap::new(),
        )
        .unwrap();
        assert!(matches!(
            split_by_test_set(&corpus, "missing"),
            Err(CorpusError::UnknownField(_))
        ));
    }
}

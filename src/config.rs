use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{fields, pipeline, vocabs};
use crate::document::{Node, Scalar};
use crate::errors::CorpusError;
use crate::transform::ValueFixer;
use crate::types::FieldName;

/// Thresholds of the quality convergence loop and the one-shot token prunes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Minimum total token count per document.
    pub min_document_length: u64,
    /// Minimum number of documents containing each token.
    pub min_token_support: usize,
    /// Minimum number of documents per category, for every target field.
    pub min_category_support: usize,
    /// Tokens whose share of all token occurrences reaches this are dropped once.
    pub max_token_share: f64,
    /// Tokens longer than this many characters are dropped once.
    pub max_token_chars: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_document_length: pipeline::DEFAULT_MIN_DOCUMENT_LENGTH,
            min_token_support: pipeline::DEFAULT_MIN_TOKEN_SUPPORT,
            min_category_support: pipeline::DEFAULT_MIN_CATEGORY_SUPPORT,
            max_token_share: pipeline::DEFAULT_MAX_TOKEN_SHARE,
            max_token_chars: pipeline::DEFAULT_MAX_TOKEN_CHARS,
        }
    }
}

/// How dump lines are sliced and which field values are fixed on the way in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Key path every line is resolved to; it must exist and be a map.
    pub prefix: String,
    /// Separator of dot-joined key paths.
    pub key_separator: String,
    /// Stop after this many accepted records.
    pub max_records: Option<usize>,
    /// Values dropped per field (after remapping).
    pub dropped_values: IndexMap<FieldName, Vec<Value>>,
    /// Value replacements per field; a `null` target drops the value.
    ///
    /// JSON object keys are strings, so only string values can be remapped.
    /// Drop numbers through `dropped_values` instead.
    pub remapped_values: IndexMap<FieldName, IndexMap<String, Value>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            prefix: pipeline::DEFAULT_PREFIX.to_string(),
            key_separator: pipeline::DEFAULT_KEY_SEPARATOR.to_string(),
            max_records: None,
            dropped_values: default_dropped_values(),
            remapped_values: default_remapped_values(),
        }
    }
}

impl ExtractionConfig {
    /// Same settings without any drop or remap rules.
    pub fn without_value_fixes(mut self) -> Self {
        self.dropped_values.clear();
        self.remapped_values.clear();
        self
    }

    /// Limit the number of accepted records.
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    /// Build one validated `ValueFixer` per field with rules.
    pub fn value_fixers(&self) -> Result<IndexMap<FieldName, ValueFixer>, CorpusError> {
        let mut field_names: Vec<&FieldName> = self.dropped_values.keys().collect();
        field_names.extend(
            self.remapped_values
                .keys()
                .filter(|field| !self.dropped_values.contains_key(*field)),
        );

        let mut fixers = IndexMap::new();
        for field in field_names {
            let drop = self
                .dropped_values
                .get(field)
                .into_iter()
                .flatten()
                .map(|value| config_scalar(field, value))
                .collect::<Result<Vec<_>, _>>()?;
            let remap = self
                .remapped_values
                .get(field)
                .into_iter()
                .flatten()
                .map(|(from, to)| {
                    let from = Some(Scalar::from(from.as_str()));
                    Ok((from, config_scalar(field, to)?))
                })
                .collect::<Result<Vec<_>, CorpusError>>()?;
            let fixer = ValueFixer::new(drop, remap)?;
            if !fixer.is_identity() {
                fixers.insert(field.clone(), fixer);
            }
        }
        Ok(fixers)
    }
}

fn config_scalar(field: &str, value: &Value) -> Result<Option<Scalar>, CorpusError> {
    match Node::from(value.clone()) {
        Node::Null => Ok(None),
        Node::Scalar(scalar) => Ok(Some(scalar)),
        Node::Map(_) | Node::List(_) => Err(CorpusError::InvalidTransform(format!(
            "value fixes of '{field}' must be scalars, got {value}"
        ))),
    }
}

/// Full pipeline configuration, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Target fields to encode and train on.
    pub target_fields: Vec<FieldName>,
    /// Accepted content languages; empty accepts every language.
    pub languages: Vec<String>,
    /// Minimum characters in title or description.
    pub min_text_chars: usize,
    /// Apply basic admissibility, public visibility, and existing text filters.
    pub use_default_filters: bool,
    /// Dump slicing and value fixes.
    pub extraction: ExtractionConfig,
    /// Quality thresholds.
    pub quality: QualityThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_fields: vec![fields::TAXONID.to_string()],
            languages: vec![pipeline::DEFAULT_LANGUAGE.to_string()],
            min_text_chars: pipeline::DEFAULT_MIN_TEXT_CHARS,
            use_default_filters: true,
            extraction: ExtractionConfig::default(),
            quality: QualityThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a configuration file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, CorpusError> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CorpusError::Json {
            line: source.line(),
            source,
        })
    }

    /// Replace the target fields.
    pub fn with_target_fields<I, S>(mut self, target_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldName>,
    {
        self.target_fields = target_fields.into_iter().map(Into::into).collect();
        self
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<(), CorpusError> {
        if self.target_fields.is_empty() {
            return Err(CorpusError::Configuration(
                "at least one target field is required".to_string(),
            ));
        }
        if self.extraction.key_separator.is_empty() {
            return Err(CorpusError::Configuration(
                "key separator must not be empty".to_string(),
            ));
        }
        let share = self.quality.max_token_share;
        if share.is_nan() || share <= 0.0 {
            return Err(CorpusError::Configuration(format!(
                "max_token_share must be positive, got {}",
                self.quality.max_token_share
            )));
        }
        Ok(())
    }
}

fn default_dropped_values() -> IndexMap<FieldName, Vec<Value>> {
    let mut dropped = IndexMap::new();
    dropped.insert(
        fields::TAXONID.to_string(),
        vec![
            Value::from(""),
            Value::from(format!("{}???", vocabs::DISCIPLINE_BASE)),
            // Ambiguous discipline.
            Value::from(format!("{}Pädagogik", vocabs::DISCIPLINE_BASE)),
        ],
    );
    dropped
}

fn default_remapped_values() -> IndexMap<FieldName, IndexMap<String, Value>> {
    let discipline = |suffix: &str| format!("{}{suffix}", vocabs::DISCIPLINE_BASE);
    let taxonid: IndexMap<String, Value> = [
        (discipline("Darstellendes-Spiel"), "12002"),
        (discipline("Deutsch"), "120"),
        (discipline("Deutsch als Zweitsprache"), "28002"),
        (discipline("Deutsch als"), "28002"),
        ("Zweitsprache".to_string(), "28002"),
        (discipline("Englisch"), "20001"),
        (discipline("Geografie"), "220"),
        (discipline("Geschichte"), "240"),
        (discipline("Informatik"), "320"),
        (discipline("Mathematik"), "380"),
        (discipline("Physik"), "460"),
        (discipline("Religion"), "520"),
        (discipline("Spanisch"), "20007"),
        (discipline("Medienbildung"), "900"),
    ]
    .into_iter()
    .map(|(from, to)| (from, Value::from(discipline(to))))
    .collect();

    let language: IndexMap<String, Value> = [
        ("de_DE", "de"),
        ("de_AT", "de"),
        ("DE", "de"),
        ("de-DE", "de"),
        ("Deutsch", "de"),
        ("en-US-LEARN", "en"),
        ("en_US", "en"),
        ("en_GB", "en"),
        ("hu_HU", "hu"),
        ("es_CR", "es"),
        ("es_ES", "es"),
        ("es_AR", "es"),
        ("fr_FR", "fr"),
        ("tr_TR", "tr"),
        ("latin", "la"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), Value::from(to)))
    .collect();

    let mut remapped = IndexMap::new();
    remapped.insert(fields::TAXONID.to_string(), taxonid);
    remapped.insert(fields::LANGUAGE.to_string(), language);
    remapped
}

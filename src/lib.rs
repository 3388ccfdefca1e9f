#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command line runner behind the `edu-corpus` binary.
pub mod cli;
/// Extraction, pipeline, and quality threshold configuration.
pub mod config;
/// Centralized field paths, filter sentinels, and pipeline defaults.
pub mod constants;
/// Corpus types and their document/category axes.
pub mod data;
/// Immutable nested documents and the key-path query engine.
pub mod document;
/// Document filters and their combinators.
pub mod filters;
/// Corpus measurements used by the quality loop.
pub mod metrics;
/// End-to-end corpus generation.
pub mod pipeline;
/// Dump reading, record extraction, and category labels.
pub mod source;
/// Index-based subsetting of corpora.
pub mod subset;
/// Value fixes and boolean encoding.
pub mod transform;
/// Shared type aliases.
pub mod types;
/// Text assembly and tokenization helpers.
pub mod utils;

mod errors;

pub use config::{ExtractionConfig, PipelineConfig, QualityThresholds};
pub use data::{BowCorpus, Corpus, ProcessedCorpus, TargetData};
pub use document::{
    CatchErrors, Document, Node, QueryResult, Scalar, Terminal, get_in, get_leaves,
    get_terminal_in, with_new_value,
};
pub use errors::CorpusError;
pub use filters::{Filter, MultiValue};
pub use metrics::QualityReport;
pub use pipeline::Pipeline;
pub use source::labels::{LabelCache, LabelResolver, SkosVocabulary};
pub use source::{DumpReader, RecordExtractor};
pub use subset::{CategoryAxes, DocumentAxis, subset_categories, subset_data_points};
pub use transform::{ValueFixer, as_boolean_array};
pub use types::{CategoryLabel, CategoryUri, DocumentId, FieldName, KeyPath, Token};
pub use utils::{SimpleTokenizer, Tokenizer};

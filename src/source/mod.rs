//! Dump reading and record extraction.
//!
//! Ownership model:
//! - `DumpReader` turns a line-delimited JSON dump into documents sliced to the
//!   configured prefix. It owns the reader and the current line number.
//! - `RecordExtractor` owns the per-field value fixers, the filters, and the
//!   column selection, and turns documents into flat rows of terminal values.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::document::{
    CatchErrors, Document, QueryResult, Terminal, get_in, get_terminal_in, split_key_path,
    with_new_value,
};
use crate::errors::CorpusError;
use crate::filters::Filter;
use crate::transform::ValueFixer;
use crate::types::KeyPath;

/// Label resolvers and the label cache.
pub mod labels;

/// One extracted record: column name to terminal value, in column order.
pub type Row = IndexMap<String, Terminal>;

/// Streams documents out of a line-delimited JSON dump.
pub struct DumpReader<R> {
    lines: Lines<R>,
    line_number: usize,
    prefix: KeyPath,
}

impl DumpReader<BufReader<File>> {
    /// Open a dump file.
    pub fn open(path: &Path, config: &ExtractionConfig) -> Result<Self, CorpusError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), config))
    }
}

impl<R: BufRead> DumpReader<R> {
    /// Read dump lines from any buffered reader.
    pub fn new(reader: R, config: &ExtractionConfig) -> Self {
        let prefix = if config.prefix.is_empty() {
            Vec::new()
        } else {
            split_key_path(&config.prefix, &config.key_separator)
        };
        Self {
            lines: reader.lines(),
            line_number: 0,
            prefix,
        }
    }

    fn parse(&self, line: &str) -> Result<Document, CorpusError> {
        let document = Document::from_json_str(line).map_err(|source| CorpusError::Json {
            line: self.line_number,
            source,
        })?;
        slice_prefix(&document, &self.prefix)
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = Result<Document, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;
            match line {
                Err(err) => return Some(Err(err.into())),
                Ok(line) if line.trim().is_empty() => {
                    debug!("[edu-corpus:dump] skipping blank line {}", self.line_number);
                }
                Ok(line) => return Some(self.parse(&line)),
            }
        }
    }
}

/// Resolve a mandatory prefix; it must exist and point at a map.
pub fn slice_prefix(document: &Document, prefix: &[String]) -> Result<Document, CorpusError> {
    match get_in(document, prefix, CatchErrors::NONE)? {
        QueryResult::Document(sliced) => Ok(sliced),
        _ => Err(CorpusError::ShapeMismatch(format!(
            "prefix '{}' does not point to a map",
            prefix.join(".")
        ))),
    }
}

/// Fixes, filters, and flattens documents into rows.
#[derive(Clone)]
pub struct RecordExtractor {
    fixers: Vec<(KeyPath, ValueFixer)>,
    filters: Vec<Filter>,
    columns: IndexMap<String, KeyPath>,
    key_separator: String,
    max_records: Option<usize>,
}

impl RecordExtractor {
    /// Build an extractor from validated value fixes; no filters, no columns.
    pub fn new(config: &ExtractionConfig) -> Result<Self, CorpusError> {
        let fixers = config
            .value_fixers()?
            .into_iter()
            .map(|(field, fixer)| (split_key_path(&field, &config.key_separator), fixer))
            .collect();
        Ok(Self {
            fixers,
            filters: Vec::new(),
            columns: IndexMap::new(),
            key_separator: config.key_separator.clone(),
            max_records: config.max_records,
        })
    }

    /// Add a filter every record must pass.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add several filters.
    pub fn with_filters<I: IntoIterator<Item = Filter>>(mut self, filters: I) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Add columns named after their key paths.
    pub fn with_columns<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            let field = field.into();
            let keys = split_key_path(&field, &self.key_separator);
            self.columns.insert(field, keys);
        }
        self
    }

    /// Add a column under a custom name.
    pub fn with_named_column(mut self, name: impl Into<String>, field: &str) -> Self {
        self.columns
            .insert(name.into(), split_key_path(field, &self.key_separator));
        self
    }

    /// Apply every value fix and write the result back into the document.
    pub fn fix_values(&self, mut document: Document) -> Result<Document, CorpusError> {
        for (keys, fixer) in &self.fixers {
            let value = get_terminal_in(&document, keys);
            if value.is_absent() {
                continue;
            }
            document = with_new_value(&document, keys, fixer.fix_terminal(value))?;
        }
        Ok(document)
    }

    /// True if every filter keeps the document.
    pub fn accepts(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| filter(document))
    }

    /// Resolve the selected columns.
    pub fn row(&self, document: &Document) -> Row {
        self.columns
            .iter()
            .map(|(name, keys)| (name.clone(), get_terminal_in(document, keys)))
            .collect()
    }

    /// Fix, filter, and flatten documents until `max_records` rows are accepted.
    ///
    /// The first read or parse error aborts extraction.
    pub fn extract<I>(&self, documents: I) -> Result<Vec<Row>, CorpusError>
    where
        I: IntoIterator<Item = Result<Document, CorpusError>>,
    {
        let mut rows = Vec::new();
        let mut seen = 0usize;
        let mut documents = documents.into_iter();
        while self.max_records.is_none_or(|max| rows.len() < max) {
            let Some(document) = documents.next() else {
                break;
            };
            seen += 1;
            let document = self.fix_values(document?)?;
            if self.accepts(&document) {
                rows.push(self.row(&document));
            }
        }
        info!(
            "[edu-corpus:dump] extracted {} of {} records",
            rows.len(),
            seen
        );
        Ok(rows)
    }
}

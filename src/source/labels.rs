//! Human-readable labels for category identifiers.
//!
//! Resolvers never fetch anything themselves; SKOS vocabularies are read from
//! documents the caller already has. `LabelCache` memoizes lookups for as long
//! as the caller keeps it alive.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::constants::pipeline::{SKOS_CHILD_FIELDS, SKOS_ID_PATH, SKOS_LABEL_PATH};
use crate::document::{Document, Node, Scalar, get_terminal_in, split_key_path};
use crate::errors::CorpusError;
use crate::types::{CategoryLabel, CategoryUri, KeyPath};

/// Maps a category identifier to its label, or `None` if unknown.
pub trait LabelResolver {
    /// Label of one identifier.
    fn resolve(&self, uri: &str) -> CategoryLabel;
}

/// Resolver that knows no labels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLabels;

impl LabelResolver for NoLabels {
    fn resolve(&self, _uri: &str) -> CategoryLabel {
        None
    }
}

/// Resolver over a fixed identifier-to-label table.
#[derive(Clone, Debug, Default)]
pub struct StaticLabels {
    labels: HashMap<CategoryUri, String>,
}

impl<U: Into<CategoryUri>, L: Into<String>> FromIterator<(U, L)> for StaticLabels {
    fn from_iter<I: IntoIterator<Item = (U, L)>>(iter: I) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|(uri, label)| (uri.into(), label.into()))
                .collect(),
        }
    }
}

impl LabelResolver for StaticLabels {
    fn resolve(&self, uri: &str) -> CategoryLabel {
        self.labels.get(uri).cloned()
    }
}

/// Concepts of a SKOS vocabulary with their labels and hierarchy.
#[derive(Clone, Debug, Default)]
pub struct SkosVocabulary {
    labels: IndexMap<CategoryUri, CategoryLabel>,
    children: IndexMap<CategoryUri, Vec<CategoryUri>>,
}

impl SkosVocabulary {
    /// Read the vocabulary from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, CorpusError> {
        let raw = fs::read_to_string(path)?;
        let document = Document::from_json_str(&raw).map_err(|source| CorpusError::Json {
            line: source.line(),
            source,
        })?;
        Ok(Self::from_document(&document))
    }

    /// Walk every concept below the root, using `id` and `prefLabel.de`.
    pub fn from_document(root: &Document) -> Self {
        Self::from_document_with_paths(
            root,
            &split_key_path(SKOS_ID_PATH, "."),
            &split_key_path(SKOS_LABEL_PATH, "."),
        )
    }

    /// Walk every concept below the root with custom id and label paths.
    pub fn from_document_with_paths(
        root: &Document,
        id_path: &KeyPath,
        label_path: &KeyPath,
    ) -> Self {
        let mut vocabulary = Self::default();
        let mut pending = vec![root.clone()];
        while let Some(concept) = pending.pop() {
            let id = string_at(&concept, id_path);
            let mut child_ids = Vec::new();
            for field in SKOS_CHILD_FIELDS {
                let Some(Node::List(children)) = concept.get(field) else {
                    continue;
                };
                for child in children.iter() {
                    if let Node::Map(child) = child {
                        child_ids.extend(string_at(child, id_path));
                        pending.push(child.clone());
                    }
                }
            }
            if let Some(id) = id {
                vocabulary
                    .labels
                    .insert(id.clone(), string_at(&concept, label_path));
                vocabulary.children.insert(id, child_ids);
            }
        }
        vocabulary
    }

    /// Number of concepts with an id.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if no concept was found.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Ids of the direct children of a concept.
    pub fn children(&self, uri: &str) -> &[CategoryUri] {
        self.children.get(uri).map(Vec::as_slice).unwrap_or_default()
    }

    /// Id of the parent concept, if any.
    pub fn parent(&self, uri: &str) -> Option<&CategoryUri> {
        self.children
            .iter()
            .find(|(_, children)| children.iter().any(|child| child == uri))
            .map(|(parent, _)| parent)
    }
}

impl LabelResolver for SkosVocabulary {
    fn resolve(&self, uri: &str) -> CategoryLabel {
        self.labels.get(uri).cloned().flatten()
    }
}

fn string_at(document: &Document, path: &KeyPath) -> Option<String> {
    match get_terminal_in(document, path).present_values().first() {
        Some(Scalar::Str(value)) => Some(value.clone()),
        Some(other) => Some(other.to_string()),
        None => None,
    }
}

/// Memoized lookups, owned by the caller for the duration of a run.
#[derive(Clone, Debug, Default)]
pub struct LabelCache {
    entries: HashMap<CategoryUri, CategoryLabel>,
}

impl LabelCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve each uri, consulting the cache first.
    pub fn labels_for<R: LabelResolver + ?Sized>(
        &mut self,
        resolver: &R,
        uris: &[CategoryUri],
    ) -> Vec<CategoryLabel> {
        uris.iter()
            .map(|uri| {
                self.entries
                    .entry(uri.clone())
                    .or_insert_with(|| resolver.resolve(uri))
                    .clone()
            })
            .collect()
    }

    /// Number of cached identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every cached label.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Nested metadata documents and the key-path queries over them.
//!
//! Ownership model:
//! - A `Document` is an immutable, reference-counted map. Updates through
//!   `with_new_value` rebuild only the maps and lists along the touched path;
//!   every other subtree is shared with the original.
//! - Queries fork at every list they pass through, so the shape of a
//!   `QueryResult` depends on the data. `get_terminal_in` flattens that shape
//!   into a `Terminal` so callers never special-case forked results.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::CorpusError;
use crate::types::KeyPath;

/// A present basic value. The absence-marker is modelled as `Option::None`.
#[derive(Clone, Debug)]
pub enum Scalar {
    /// UTF-8 string.
    Str(String),
    /// Integer number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// JSON boolean.
    Bool(bool),
}

impl Scalar {
    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Empty strings, zero, and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Str(value) => !value.is_empty(),
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Bool(value) => *value,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Str(value) => Value::String(value.clone()),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
            Self::Bool(value) => Value::Bool(*value),
        }
    }
}

// Floats compare by bit pattern so scalars can key drop sets and remap tables.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Str(value) => value.hash(state),
            Self::Int(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::Bool(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One node of a document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// The absence-marker (JSON `null`).
    Null,
    /// A present basic value.
    Scalar(Scalar),
    /// A nested document.
    Map(Document),
    /// An ordered sequence of scalars and/or documents.
    List(Arc<[Node]>),
}

impl Node {
    /// Build a list node from any iterator of nodes.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Convert the node back into a `serde_json::Value`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Scalar(scalar) => scalar.to_json(),
            Self::Map(document) => document.to_json(),
            Self::List(items) => Value::Array(items.iter().map(Node::to_json).collect()),
        }
    }
}

impl<T: Into<Scalar>> From<T> for Node {
    fn from(value: T) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<Option<Scalar>> for Node {
    fn from(value: Option<Scalar>) -> Self {
        value.map_or(Self::Null, Self::Scalar)
    }
}

impl From<Document> for Node {
    fn from(value: Document) -> Self {
        Self::Map(value)
    }
}

impl From<Terminal> for Node {
    fn from(value: Terminal) -> Self {
        match value {
            Terminal::Value(value) => value.into(),
            Terminal::Sequence(values) => Self::list(values),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Scalar(Scalar::Bool(flag)),
            Value::Number(number) => Self::Scalar(match number.as_i64() {
                Some(int) => Scalar::Int(int),
                None => Scalar::Float(number.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(text) => Self::Scalar(Scalar::Str(text)),
            Value::Array(items) => Self::list(items.into_iter().map(Node::from)),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Immutable string-keyed map of nodes; clones share the underlying tree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document(Arc<IndexMap<String, Node>>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one JSON object.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }

    /// Look up a direct child.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the document has no children.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate direct children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.0.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Return a copy with `key` set to `node`. Only this map is copied;
    /// children are shared.
    pub fn with_entry(&self, key: &str, node: Node) -> Self {
        let mut map = IndexMap::clone(&self.0);
        map.insert(key.to_string(), node);
        Self(Arc::new(map))
    }

    /// True if both handles point at the same tree.
    pub fn shares_tree_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Convert back into a `serde_json::Value` object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, node)| (key.clone(), node.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Node)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl TryFrom<Value> for Document {
    type Error = CorpusError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match Node::from(value) {
            Node::Map(document) => Ok(document),
            _ => Err(CorpusError::ShapeMismatch(
                "expected a JSON object at the document root".to_string(),
            )),
        }
    }
}

/// Raw query result; its nesting mirrors the lists a key path forked through.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryResult {
    /// Nothing found, or an explicit `null`.
    Absent,
    /// A basic value.
    Scalar(Scalar),
    /// A nested document.
    Document(Document),
    /// One result per element of a list that was passed through.
    Sequence(Vec<QueryResult>),
}

impl QueryResult {
    /// Coerce into a terminal value: documents become absent, sequences flatten.
    pub fn into_terminal(self) -> Terminal {
        match self {
            Self::Absent | Self::Document(_) => Terminal::Value(None),
            Self::Scalar(scalar) => Terminal::Value(Some(scalar)),
            Self::Sequence(results) => {
                let mut flat = Vec::with_capacity(results.len());
                for result in results {
                    match result.into_terminal() {
                        Terminal::Value(value) => flat.push(value),
                        Terminal::Sequence(values) => flat.extend(values),
                    }
                }
                Terminal::Sequence(flat)
            }
        }
    }

    /// True if any document appears anywhere inside the result.
    pub fn contains_document(&self) -> bool {
        match self {
            Self::Document(_) => true,
            Self::Sequence(results) => results.iter().any(QueryResult::contains_document),
            Self::Absent | Self::Scalar(_) => false,
        }
    }
}

impl From<&Node> for QueryResult {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Self::Absent,
            Node::Scalar(scalar) => Self::Scalar(scalar.clone()),
            Node::Map(document) => Self::Document(document.clone()),
            Node::List(items) => Self::Sequence(items.iter().map(QueryResult::from).collect()),
        }
    }
}

/// A leaf value: one basic value, or a flat sequence of them.
#[derive(Clone, Debug, PartialEq)]
pub enum Terminal {
    /// A single (possibly absent) value.
    Value(Option<Scalar>),
    /// A flat sequence of (possibly absent) values.
    Sequence(Vec<Option<Scalar>>),
}

impl Terminal {
    /// The absent terminal.
    pub const ABSENT: Terminal = Terminal::Value(None);

    /// True only for a single absent value.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Value(None))
    }

    /// Absent values, empty sequences, and falsy scalars are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Value(None) => false,
            Self::Value(Some(scalar)) => scalar.is_truthy(),
            Self::Sequence(values) => !values.is_empty(),
        }
    }

    /// Length of a sequence-like value: character count of a string, element
    /// count of a sequence, `0` for everything else.
    pub fn sequence_len(&self) -> usize {
        match self {
            Self::Value(Some(Scalar::Str(text))) => text.chars().count(),
            Self::Value(_) => 0,
            Self::Sequence(values) => values.len(),
        }
    }

    /// Present values in order; absent entries are skipped.
    pub fn present_values(&self) -> Vec<Scalar> {
        match self {
            Self::Value(value) => value.iter().cloned().collect(),
            Self::Sequence(values) => values.iter().flatten().cloned().collect(),
        }
    }

    /// True if `needle` is the value or one of the sequence entries.
    pub fn contains(&self, needle: &Scalar) -> bool {
        match self {
            Self::Value(value) => value.as_ref() == Some(needle),
            Self::Sequence(values) => values.iter().any(|value| value.as_ref() == Some(needle)),
        }
    }
}

impl From<Option<Scalar>> for Terminal {
    fn from(value: Option<Scalar>) -> Self {
        Self::Value(value)
    }
}

/// Which structural errors a raw query converts into `QueryResult::Absent`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatchErrors {
    /// Swallow lookups of keys the map does not contain.
    pub missing_key: bool,
    /// Swallow lookups into scalars, lists, or `null`.
    pub not_indexable: bool,
}

impl CatchErrors {
    /// Propagate every structural error.
    pub const NONE: CatchErrors = CatchErrors {
        missing_key: false,
        not_indexable: false,
    };
    /// Swallow every structural error.
    pub const ALL: CatchErrors = CatchErrors {
        missing_key: true,
        not_indexable: true,
    };
}

/// Split a dot-joined field name into a key path.
pub fn split_key_path(field: &str, separator: &str) -> KeyPath {
    field.split(separator).map(str::to_string).collect()
}

/// Resolve `keys` against `document`, forking at every list.
///
/// Structural errors selected by `catch` become `QueryResult::Absent` for the
/// affected branch; the others are returned as errors.
pub fn get_in<K: AsRef<str>>(
    document: &Document,
    keys: &[K],
    catch: CatchErrors,
) -> Result<QueryResult, CorpusError> {
    resolve(&Node::Map(document.clone()), keys, 0, catch)
}

/// Like `get_in` with every structural error caught, coerced to a `Terminal`.
pub fn get_terminal_in<K: AsRef<str>>(document: &Document, keys: &[K]) -> Terminal {
    match get_in(document, keys, CatchErrors::ALL) {
        Ok(result) => result.into_terminal(),
        Err(_) => Terminal::ABSENT,
    }
}

fn resolve<K: AsRef<str>>(
    node: &Node,
    keys: &[K],
    depth: usize,
    catch: CatchErrors,
) -> Result<QueryResult, CorpusError> {
    let Some(key) = keys.get(depth).map(AsRef::as_ref) else {
        return Ok(QueryResult::from(node));
    };

    let child = match node {
        Node::Map(document) => match document.get(key) {
            Some(child) => child,
            None if catch.missing_key => return Ok(QueryResult::Absent),
            None => {
                return Err(CorpusError::MissingKey {
                    key: key.to_string(),
                    path: joined_prefix(keys, depth),
                });
            }
        },
        _ if catch.not_indexable => return Ok(QueryResult::Absent),
        _ => {
            return Err(CorpusError::NotIndexable {
                key: key.to_string(),
                path: joined_prefix(keys, depth),
            });
        }
    };

    match child {
        Node::List(items) => items
            .iter()
            .map(|item| resolve(item, keys, depth + 1, catch))
            .collect::<Result<Vec<_>, _>>()
            .map(QueryResult::Sequence),
        other => resolve(other, keys, depth + 1, catch),
    }
}

fn joined_prefix<K: AsRef<str>>(keys: &[K], depth: usize) -> String {
    keys[..=depth]
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

/// All key paths that reach a scalar, `null`, or a list element of those.
///
/// List indices are not part of a path: elements are visited under the path of
/// the list itself.
pub fn get_leaves(document: &Document) -> BTreeSet<KeyPath> {
    let mut leaves = BTreeSet::new();
    let mut current = Vec::new();
    for (key, node) in document.iter() {
        current.push(key.to_string());
        collect_leaves(node, &mut current, &mut leaves);
        current.pop();
    }
    leaves
}

fn collect_leaves(node: &Node, current: &mut KeyPath, leaves: &mut BTreeSet<KeyPath>) {
    match node {
        Node::Null | Node::Scalar(_) => {
            leaves.insert(current.clone());
        }
        Node::Map(document) => {
            for (key, child) in document.iter() {
                current.push(key.to_string());
                collect_leaves(child, current, leaves);
                current.pop();
            }
        }
        Node::List(items) => {
            for item in items.iter() {
                collect_leaves(item, current, leaves);
            }
        }
    }
}

/// Return a new document with `value` stored at `keys`.
///
/// Missing maps along the path are created. Scalars in the way are replaced.
/// When the walk meets a list while keys remain, a new singleton mapping
/// holding the rest of the path is appended to that list; existing elements
/// are never modified.
pub fn with_new_value<K: AsRef<str>>(
    document: &Document,
    keys: &[K],
    value: impl Into<Node>,
) -> Result<Document, CorpusError> {
    if keys.is_empty() {
        return Err(CorpusError::InvalidTransform(
            "cannot replace the document root through an empty key path".to_string(),
        ));
    }
    Ok(set_in_map(document, keys, value.into()))
}

fn set_in_map<K: AsRef<str>>(document: &Document, keys: &[K], value: Node) -> Document {
    let key = keys[0].as_ref();
    let rest = &keys[1..];
    let child = match document.get(key) {
        Some(existing) => set_in_node(existing, rest, value),
        None => nest(rest, value),
    };
    document.with_entry(key, child)
}

fn set_in_node<K: AsRef<str>>(node: &Node, keys: &[K], value: Node) -> Node {
    if keys.is_empty() {
        return value;
    }
    match node {
        Node::Map(document) => Node::Map(set_in_map(document, keys, value)),
        Node::List(items) => {
            let mut items = items.to_vec();
            items.push(nest(keys, value));
            Node::List(items.into())
        }
        Node::Null | Node::Scalar(_) => nest(keys, value),
    }
}

fn nest<K: AsRef<str>>(keys: &[K], value: Node) -> Node {
    keys.iter().rev().fold(value, |inner, key| {
        Node::Map(Document::new().with_entry(key.as_ref(), inner))
    })
}

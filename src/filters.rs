use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::{fields, filters};
use crate::document::{Document, Scalar, Terminal, get_terminal_in, split_key_path};
use crate::types::FieldName;

/// Keep/drop decision over one raw record.
pub type Filter = Arc<dyn Fn(&Document) -> bool + Send + Sync>;
/// Predicate over a resolved terminal value.
pub type Predicate = Arc<dyn Fn(&Terminal) -> bool + Send + Sync>;

/// Reduction of per-element decisions for multi-valued fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiValue {
    /// At least one element must pass (false for empty input).
    Any,
    /// Every element must pass (true for empty input).
    All,
}

impl MultiValue {
    /// Reduce a sequence of decisions.
    pub fn reduce<I: IntoIterator<Item = bool>>(self, decisions: I) -> bool {
        let mut decisions = decisions.into_iter();
        match self {
            Self::Any => decisions.any(|decision| decision),
            Self::All => decisions.all(|decision| decision),
        }
    }
}

/// Minimum lengths for `min_length_filter`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MinLengths {
    /// One minimum applied to every field.
    Shared(usize),
    /// One minimum per field, in field order. Fields past the end of the
    /// list take no part in the decision.
    PerField(Vec<usize>),
}

impl MinLengths {
    fn for_field(&self, position: usize) -> Option<usize> {
        match self {
            Self::Shared(min) => Some(*min),
            Self::PerField(mins) => mins.get(position).copied(),
        }
    }
}

/// Lift a predicate over single scalars to terminal values.
///
/// Sequences apply the predicate per element and reduce with `combinator`.
pub fn lift_to_terminal<F>(simple: F, combinator: MultiValue) -> Predicate
where
    F: Fn(Option<&Scalar>) -> bool + Send + Sync + 'static,
{
    Arc::new(move |terminal: &Terminal| match terminal {
        Terminal::Value(value) => simple(value.as_ref()),
        Terminal::Sequence(values) => {
            combinator.reduce(values.iter().map(|value| simple(value.as_ref())))
        }
    })
}

/// Apply `predicate` to the terminal value at the dot-joined `field`.
pub fn field_filter(predicate: Predicate, field: &str) -> Filter {
    let keys = split_key_path(field, ".");
    Arc::new(move |document: &Document| predicate(&get_terminal_in(document, &keys)))
}

/// Keep records where `field` equals `expected` (per `combinator` for lists).
pub fn equals_filter(field: &str, expected: &str, combinator: MultiValue) -> Filter {
    let expected = expected.to_string();
    let predicate = lift_to_terminal(
        move |value| value.and_then(Scalar::as_str) == Some(expected.as_str()),
        combinator,
    );
    field_filter(predicate, field)
}

/// Keep records where `field` differs from `rejected` (per `combinator` for lists).
pub fn not_equals_filter(field: &str, rejected: &str, combinator: MultiValue) -> Filter {
    let rejected = rejected.to_string();
    let predicate = lift_to_terminal(
        move |value| value.and_then(Scalar::as_str) != Some(rejected.as_str()),
        combinator,
    );
    field_filter(predicate, field)
}

/// Invert a filter.
pub fn negate(filter: Filter) -> Filter {
    Arc::new(move |document: &Document| !filter(document))
}

/// Keep records accepted by every filter.
pub fn all_of(filters: Vec<Filter>) -> Filter {
    Arc::new(move |document: &Document| filters.iter().all(|filter| filter(document)))
}

/// Keep records accepted by at least one filter.
pub fn any_of(filters: Vec<Filter>) -> Filter {
    Arc::new(move |document: &Document| filters.iter().any(|filter| filter(document)))
}

/// Regular learning material of the expected metadata schema, excluding
/// collection reference copies.
pub fn basic_admissibility_filter() -> Filter {
    all_of(vec![
        equals_filter(
            filters::STORE_PROTOCOL_FIELD,
            filters::STORE_PROTOCOL,
            MultiValue::Any,
        ),
        equals_filter(filters::TYPE_FIELD, filters::MATERIAL_TYPE, MultiValue::Any),
        equals_filter(
            filters::METADATASET_FIELD,
            filters::METADATASET,
            MultiValue::Any,
        ),
        not_equals_filter(
            filters::ASPECTS_FIELD,
            filters::COLLECTION_REFERENCE_ASPECT,
            MultiValue::All,
        ),
    ])
}

/// Readable by everyone, directly or through an associated collection.
pub fn public_visibility_filter() -> Filter {
    any_of(vec![
        equals_filter(
            filters::READ_PERMISSIONS_FIELD,
            filters::PUBLIC_GROUP,
            MultiValue::Any,
        ),
        equals_filter(
            filters::COLLECTION_READ_PERMISSIONS_FIELD,
            filters::PUBLIC_GROUP,
            MultiValue::Any,
        ),
    ])
}

/// Contained in the editorial collection.
pub fn editorial_confirmation_filter() -> Filter {
    equals_filter(
        fields::COLLECTIONS_TITLE,
        filters::EDITORIAL_COLLECTION,
        MultiValue::Any,
    )
}

/// Keep records whose languages all lie in `accepted`.
///
/// An empty accepted set keeps everything, and so does a missing language.
pub fn language_filter<I, S>(accepted: I) -> Filter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let accepted: HashSet<String> = accepted.into_iter().map(Into::into).collect();
    let accept_all = accepted.is_empty();
    let is_accepted = move |value: Option<&Scalar>| {
        value
            .and_then(Scalar::as_str)
            .is_some_and(|language| accepted.contains(language))
    };
    let keys = split_key_path(fields::LANGUAGE, ".");
    Arc::new(move |document: &Document| {
        if accept_all {
            return true;
        }
        match get_terminal_in(document, &keys) {
            Terminal::Value(None) => true,
            Terminal::Value(Some(language)) => is_accepted(Some(&language)),
            Terminal::Sequence(languages) => languages
                .iter()
                .all(|language| is_accepted(language.as_ref())),
        }
    })
}

/// Keep records where `combinator` holds over "field has a truthy value".
pub fn labeled_filter(fields: Vec<FieldName>, combinator: MultiValue) -> Filter {
    let paths: Vec<_> = fields
        .iter()
        .map(|field| split_key_path(field, "."))
        .collect();
    Arc::new(move |document: &Document| {
        combinator.reduce(
            paths
                .iter()
                .map(|keys| get_terminal_in(document, keys).is_truthy()),
        )
    })
}

/// Keep records where `combinator` holds over "field length >= minimum".
///
/// Strings count characters, sequences count entries, anything else has length
/// zero. Without fields every record is kept.
pub fn min_length_filter(
    fields: Vec<FieldName>,
    min_lengths: MinLengths,
    combinator: MultiValue,
) -> Filter {
    let paths: Vec<_> = fields
        .iter()
        .map(|field| split_key_path(field, "."))
        .collect();
    Arc::new(move |document: &Document| {
        if paths.is_empty() {
            return true;
        }
        combinator.reduce(paths.iter().enumerate().filter_map(|(position, keys)| {
            let min = min_lengths.for_field(position)?;
            Some(get_terminal_in(document, keys).sequence_len() >= min)
        }))
    })
}

/// Both title and description are present and non-empty.
pub fn existing_text_filter() -> Filter {
    min_length_filter(
        vec![fields::TITLE.to_string(), fields::DESCRIPTION.to_string()],
        MinLengths::Shared(1),
        MultiValue::All,
    )
}

/// Keep records marked as test data for any of `labels`.
pub fn test_data_filter<I, S>(labels: I) -> Filter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let labels: HashSet<String> = labels.into_iter().map(Into::into).collect();
    let predicate = lift_to_terminal(
        move |value| {
            value
                .and_then(Scalar::as_str)
                .is_some_and(|label| labels.contains(label))
        },
        MultiValue::Any,
    );
    field_filter(predicate, fields::TEST_DATA)
}

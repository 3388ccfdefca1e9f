use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use indexmap::IndexSet;
use ndarray::Array2;

use crate::document::{Scalar, Terminal};
use crate::errors::CorpusError;

/// Values removed after remapping.
pub type DropSet = HashSet<Scalar>;
/// Replacement table; a `None` target removes the value outright.
pub type RemapTable = HashMap<Scalar, Option<Scalar>>;

/// Remap `value`, then drop it if the remapped result is in `drop`.
///
/// Remapping happens first, so a value may be canonicalized into something
/// that is dropped afterwards.
pub fn fix_single_value(
    value: Option<Scalar>,
    drop: &DropSet,
    remap: &RemapTable,
) -> Option<Scalar> {
    let value = value?;
    let remapped = match remap.get(&value) {
        Some(target) => target.clone(),
        None => Some(value),
    };
    remapped.filter(|value| !drop.contains(value))
}

/// Fix every element, discard absent results, and deduplicate keeping the
/// first occurrence.
pub fn fix_multi_value<I>(values: I, drop: &DropSet, remap: &RemapTable) -> Vec<Scalar>
where
    I: IntoIterator<Item = Option<Scalar>>,
{
    values
        .into_iter()
        .filter_map(|value| fix_single_value(value, drop, remap))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Validated drop set and remap table for one field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueFixer {
    drop: DropSet,
    remap: RemapTable,
}

impl ValueFixer {
    /// Build a fixer. The absence-marker can be neither dropped nor remapped.
    pub fn new<D, R>(drop: D, remap: R) -> Result<Self, CorpusError>
    where
        D: IntoIterator<Item = Option<Scalar>>,
        R: IntoIterator<Item = (Option<Scalar>, Option<Scalar>)>,
    {
        let drop = drop
            .into_iter()
            .map(|value| {
                value.ok_or_else(|| {
                    CorpusError::InvalidTransform("cannot drop the absent value".to_string())
                })
            })
            .collect::<Result<DropSet, _>>()?;
        let remap = remap
            .into_iter()
            .map(|(from, to)| match from {
                Some(from) => Ok((from, to)),
                None => Err(CorpusError::InvalidTransform(
                    "cannot remap the absent value".to_string(),
                )),
            })
            .collect::<Result<RemapTable, _>>()?;
        Ok(Self { drop, remap })
    }

    /// True if the fixer never changes a value.
    pub fn is_identity(&self) -> bool {
        self.drop.is_empty() && self.remap.is_empty()
    }

    /// See `fix_single_value`.
    pub fn fix_single(&self, value: Option<Scalar>) -> Option<Scalar> {
        fix_single_value(value, &self.drop, &self.remap)
    }

    /// See `fix_multi_value`.
    pub fn fix_multi<I: IntoIterator<Item = Option<Scalar>>>(&self, values: I) -> Vec<Scalar> {
        fix_multi_value(values, &self.drop, &self.remap)
    }

    /// Fix a terminal: single values stay single, sequences are deduplicated.
    pub fn fix_terminal(&self, terminal: Terminal) -> Terminal {
        match terminal {
            Terminal::Value(value) => Terminal::Value(self.fix_single(value)),
            Terminal::Sequence(values) => {
                Terminal::Sequence(self.fix_multi(values).into_iter().map(Some).collect())
            }
        }
    }
}

/// Encode per-document value collections as a document x value boolean matrix.
///
/// Returns the matrix and its column values. Without `sort_fn` the columns
/// follow first-seen order. Zero documents yield a `(0, 0)` matrix.
pub fn as_boolean_array<T, I, C>(
    collections: I,
    sort_fn: Option<&dyn Fn(&mut [T])>,
) -> (Array2<bool>, Vec<T>)
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = C>,
    C: IntoIterator<Item = T>,
{
    let rows: Vec<IndexSet<T>> = collections
        .into_iter()
        .map(|values| values.into_iter().collect())
        .collect();

    let mut union: Vec<T> = rows
        .iter()
        .flat_map(|row| row.iter().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect();
    if let Some(sort_fn) = sort_fn {
        sort_fn(&mut union);
    }

    let columns: HashMap<&T, usize> = union
        .iter()
        .enumerate()
        .map(|(column, value)| (value, column))
        .collect();
    let mut arr = Array2::from_elem((rows.len(), union.len()), false);
    for (row, values) in rows.iter().enumerate() {
        for value in values {
            if let Some(&column) = columns.get(value) {
                arr[[row, column]] = true;
            }
        }
    }
    (arr, union)
}

//! Subsetting along the document axis and along one field's category axis.
//!
//! Every corpus type describes its own axes by implementing the two traits
//! below; the free functions validate indices and dispatch.

use std::collections::HashSet;

use crate::errors::CorpusError;

/// Types with a per-document axis.
pub trait DocumentAxis: Sized {
    /// Length of the document axis.
    fn num_documents(&self) -> usize;

    /// Re-index every per-document field by `indices`, which are known to be
    /// in bounds. Fields that are not per-document are shared unchanged.
    fn select_documents(&self, indices: &[usize]) -> Self;
}

/// Types holding named category axes.
pub trait CategoryAxes: Sized {
    /// Restrict the category axis of every entry named `field` to `indices`.
    ///
    /// Returns `Ok(None)` when no entry carries that name.
    fn select_categories(
        &self,
        field: &str,
        indices: &[usize],
    ) -> Result<Option<Self>, CorpusError>;
}

/// New corpus holding exactly the documents at `indices`, in that order.
///
/// Duplicate indices replicate documents.
pub fn subset_data_points<C: DocumentAxis>(
    corpus: &C,
    indices: &[usize],
) -> Result<C, CorpusError> {
    check_indices(indices, corpus.num_documents(), "document")?;
    Ok(corpus.select_documents(indices))
}

/// New corpus where the category axis of `field` is restricted and reordered
/// to `indices`. Every other field is left as is.
///
/// Category uris stay unique, so repeated indices are rejected.
pub fn subset_categories<C: CategoryAxes>(
    corpus: &C,
    indices: &[usize],
    field: &str,
) -> Result<C, CorpusError> {
    corpus
        .select_categories(field, indices)?
        .ok_or_else(|| CorpusError::UnknownField(field.to_string()))
}

/// Positions where `keep` holds, for building index lists from masks.
pub fn indices_where<I: IntoIterator<Item = bool>>(keep: I) -> Vec<usize> {
    keep.into_iter()
        .enumerate()
        .filter_map(|(index, keep)| keep.then_some(index))
        .collect()
}

pub(crate) fn check_indices(
    indices: &[usize],
    len: usize,
    axis: &'static str,
) -> Result<(), CorpusError> {
    match indices.iter().find(|&&index| index >= len) {
        Some(&index) => Err(CorpusError::IndexOutOfBounds { index, len, axis }),
        None => Ok(()),
    }
}

pub(crate) fn check_unique_indices(
    indices: &[usize],
    axis: &'static str,
) -> Result<(), CorpusError> {
    let mut seen = HashSet::with_capacity(indices.len());
    match indices.iter().find(|&&index| !seen.insert(index)) {
        Some(&index) => Err(CorpusError::DuplicateIndex { index, axis }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_where_lists_true_positions() {
        assert_eq!(indices_where([true, false, true, true]), vec![0, 2, 3]);
        assert!(indices_where(Vec::new()).is_empty());
    }

    #[test]
    fn check_indices_reports_first_offender() {
        assert!(check_indices(&[0, 1, 1], 2, "document").is_ok());
        let err = check_indices(&[0, 5, 7], 3, "category").unwrap_err();
        assert!(matches!(
            err,
            CorpusError::IndexOutOfBounds {
                index: 5,
                len: 3,
                axis: "category"
            }
        ));
    }

    #[test]
    fn check_unique_indices_reports_first_repeat() {
        assert!(check_unique_indices(&[2, 0, 1], "category").is_ok());
        assert!(check_unique_indices(&[], "category").is_ok());
        let err = check_unique_indices(&[1, 0, 1, 0], "category").unwrap_err();
        assert!(matches!(
            err,
            CorpusError::DuplicateIndex {
                index: 1,
                axis: "category"
            }
        ));
    }
}

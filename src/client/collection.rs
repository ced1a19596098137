//! Identity comparison and picker-collection merging.

use std::collections::HashSet;

use crate::models::Identified;

/// Whether two optional entity references denote the same logical record.
///
/// Both absent counts as equal; exactly one absent does not. Two present
/// references are the same record only when both identifiers are non-null
/// and equal, so a draft never equals anything, not even another draft.
pub fn same_identity<A, B>(a: Option<&A>, b: Option<&B>) -> bool
where
    A: Identified,
    B: Identified,
{
    match (a, b) {
        (Some(a), Some(b)) => match (a.identifier(), b.identifier()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (None, None) => true,
        _ => false,
    }
}

/// Merge candidate entities into a picker collection unless already present.
///
/// Absent candidates are dropped. Kept candidates are prepended in their
/// original relative order; the base collection order is preserved behind
/// them. Deduplication is by identifier, first occurrence wins, and also
/// applies among the candidates themselves. When nothing is added the input
/// collection is handed back untouched (same allocation).
pub fn merge_missing<T, I>(collection: Vec<T>, candidates: I) -> Vec<T>
where
    T: Identified,
    I: IntoIterator<Item = Option<T>>,
{
    let candidates: Vec<T> = candidates.into_iter().flatten().collect();
    if candidates.is_empty() {
        return collection;
    }

    let mut seen: HashSet<Option<i64>> =
        collection.iter().map(|item| item.identifier()).collect();
    let mut added: Vec<T> = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.identifier()) {
            added.push(candidate);
        }
    }

    if added.is_empty() {
        return collection;
    }
    added.extend(collection);
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Board;

    fn board(id: i64) -> Board {
        Board {
            id,
            title: Some(format!("board {}", id)),
        }
    }

    #[test]
    fn test_same_identity_null_handling() {
        let a = board(1);
        let b = board(1);
        let c = board(2);

        assert!(same_identity::<Board, Board>(None, None));
        assert!(!same_identity(Some(&a), None::<&Board>));
        assert!(!same_identity(None::<&Board>, Some(&a)));
        assert!(same_identity(Some(&a), Some(&b)));
        assert!(!same_identity(Some(&a), Some(&c)));
    }

    #[test]
    fn test_merge_missing_without_candidates_returns_same_allocation() {
        let collection = vec![board(1), board(2)];
        let ptr = collection.as_ptr();

        let merged = merge_missing(collection, []);

        assert_eq!(merged.as_ptr(), ptr);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_missing_prepends_new_candidate() {
        let collection = vec![board(1), board(2)];

        let merged = merge_missing(collection, [Some(board(3))]);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, 3);
        assert_eq!(merged[1].id, 1);
        assert_eq!(merged[2].id, 2);
    }

    #[test]
    fn test_merge_missing_skips_candidate_already_in_collection() {
        let collection = vec![board(1), board(2)];
        let ptr = collection.as_ptr();

        let merged = merge_missing(collection, [Some(board(2))]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.as_ptr(), ptr);
    }

    #[test]
    fn test_merge_missing_into_empty_collection_keeps_candidate_order() {
        let merged = merge_missing(Vec::new(), [Some(board(4)), Some(board(7))]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, 4);
        assert_eq!(merged[1].id, 7);
    }

    #[test]
    fn test_merge_missing_drops_absent_candidates() {
        let merged = merge_missing(Vec::new(), [None, Some(board(4)), None]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 4);
    }

    #[test]
    fn test_merge_missing_deduplicates_candidates_first_occurrence_wins() {
        let merged = merge_missing(
            Vec::new(),
            [Some(board(4)), Some(board(4)), Some(board(5))],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, 4);
        assert_eq!(merged[1].id, 5);
    }
}

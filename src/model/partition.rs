use super::confusion::ConfusionMatrix;
use crate::{ClassId, DenseMat};
use ordered_float::NotNan;
use std::cmp::Reverse;

/// One proposed binary split of a class set: the seed pair of classes plus
/// the confusion score for that pair, summed over both directions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PartitionCandidate {
    pub classes: (ClassId, ClassId),
    pub score: f64,
}

/// Generate ranked partition candidates for the given class set.
///
/// The local sub-matrix of the confusion matrix is symmetrized by summing
/// both directions, every unordered class pair is scored by its symmetrized
/// entry, and the pairs are ranked most-confusable first so that the
/// hardest splits are explored under the candidate cap. Ties break by
/// ascending class ids. At most `max_candidates` candidates are returned;
/// class sets with fewer than 2 members yield none.
pub fn generate(
    confusion: &ConfusionMatrix,
    class_set: &[ClassId],
    max_candidates: usize,
) -> Vec<PartitionCandidate> {
    let n = class_set.len();
    if n < 2 {
        return Vec::new();
    }

    // Local confusion sub-matrix restricted to the class set, then
    // symmetrized by summation. The diagonal contribution is double-counted
    // on purpose; it is the tie-break signal, not noise.
    let mut local = DenseMat::zeros((n, n));
    for (i, &ci) in class_set.iter().enumerate() {
        for (j, &cj) in class_set.iter().enumerate() {
            local[[i, j]] = confusion.get(ci, cj) + confusion.get(cj, ci);
        }
    }

    let mut candidates = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in i + 1..n {
            candidates.push(PartitionCandidate {
                classes: (class_set[i], class_set[j]),
                score: local[[i, j]],
            });
        }
    }

    candidates.sort_unstable_by_key(|c| (Reverse(NotNan::new(c.score).unwrap()), c.classes));
    candidates.truncate(max_candidates);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DenseMat;

    fn uniform_confusion(n_classes: usize, pair: (usize, usize), pair_score: f64) -> ConfusionMatrix {
        let mut mat = DenseMat::ones((n_classes, n_classes));
        mat[[pair.0, pair.1]] = pair_score;
        mat[[pair.1, pair.0]] = pair_score;
        ConfusionMatrix::new(mat).unwrap()
    }

    #[test]
    fn small_class_sets_yield_no_candidates() {
        let confusion = uniform_confusion(4, (0, 1), 10.);
        assert!(generate(&confusion, &[], 30).is_empty());
        assert!(generate(&confusion, &[2], 30).is_empty());
    }

    #[test]
    fn most_confused_pair_ranks_first() {
        let confusion = uniform_confusion(4, (0, 1), 10.);
        let candidates = generate(&confusion, &[0, 1, 2, 3], 30);
        assert_eq!(6, candidates.len());
        assert_eq!((0, 1), candidates[0].classes);
        // Both directions of the symmetric entry are summed
        assert_approx_eq!(20., candidates[0].score);
        assert_approx_eq!(2., candidates[1].score);
    }

    #[test]
    fn scores_are_non_increasing_and_pairs_stay_in_set() {
        let n_classes = 9;
        let mut mat = DenseMat::zeros((n_classes, n_classes));
        for i in 0..n_classes {
            for j in 0..n_classes {
                mat[[i, j]] = ((i * 31 + j * 17) % 7) as f64;
            }
        }
        crate::mat_util::symmetrize(&mut mat);
        let confusion = ConfusionMatrix::new(mat).unwrap();

        let class_set = vec![1, 2, 4, 5, 6, 7, 8];
        let candidates = generate(&confusion, &class_set, 30);
        assert_eq!(21, candidates.len());
        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for candidate in &candidates {
            assert!(class_set.contains(&candidate.classes.0));
            assert!(class_set.contains(&candidate.classes.1));
            assert!(candidate.classes.0 < candidate.classes.1);
        }
    }

    #[test]
    fn candidate_count_is_capped() {
        // 9 classes make 36 pairs, more than the default cap of 30
        let confusion = uniform_confusion(9, (2, 3), 5.);
        let class_set: Vec<_> = (0..9).collect();
        assert_eq!(30, generate(&confusion, &class_set, 30).len());
        assert_eq!(3, generate(&confusion, &class_set, 3).len());
    }
}

//! Randomized best-of-k split selection.

use rand::Rng;

use crate::error::ForestError;
use crate::node::FeatureIndex;
use crate::partition::Partition;

/// Default number of feature candidates per split: `round(sqrt(n_features))`,
/// at least 1.
pub(crate) fn default_feature_candidates(n_features: usize) -> usize {
    ((n_features as f64).sqrt().round() as usize).max(1)
}

/// The winning candidate from one round of split selection.
#[derive(Debug)]
pub(crate) struct CandidateSplit<'a> {
    /// Feature the split tests.
    pub(crate) feature: FeatureIndex,
    /// Median threshold of that feature over the parent partition.
    pub(crate) threshold: f64,
    /// Samples with feature value strictly below the threshold.
    pub(crate) left: Partition<'a>,
    /// Samples with feature value at or above the threshold.
    pub(crate) right: Partition<'a>,
}

/// Pick the best of `feature_candidates` random median splits of `parent`.
///
/// Each candidate draws a feature index uniformly from `[0, n_features)`
/// *with replacement* — duplicate draws are acceptable and simply re-evaluate
/// the same split. Candidates are scored by weighted child impurity,
/// `(left.impurity + right.impurity) / parent.count`, and the minimum wins;
/// exact ties keep the first candidate seen. This bounded random subsampling
/// is what distinguishes the forest from a plain greedy decision tree.
///
/// The winner may still have an empty side when none of the sampled features
/// separate the partition; the caller decides how to terminate in that case.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ForestError::InvalidFeatureCandidates`] | `feature_candidates` is zero |
/// | [`ForestError::EmptyDataset`] | `parent` has no samples |
pub(crate) fn select_split<'a>(
    parent: &Partition<'a>,
    feature_candidates: usize,
    rng: &mut impl Rng,
) -> Result<CandidateSplit<'a>, ForestError> {
    let n_features = parent.n_features();
    let parent_count = parent.count() as f64;

    let mut best: Option<(f64, CandidateSplit<'a>)> = None;
    for _ in 0..feature_candidates {
        let feature = FeatureIndex::new(rng.gen_range(0..n_features));
        let (threshold, left, right) = parent.split_on(feature)?;
        let weighted = (left.impurity().value() + right.impurity().value()) / parent_count;
        if best.as_ref().is_none_or(|(score, _)| weighted < *score) {
            best = Some((
                weighted,
                CandidateSplit {
                    feature,
                    threshold,
                    left,
                    right,
                },
            ));
        }
    }

    best.map(|(_, candidate)| candidate)
        .ok_or(ForestError::InvalidFeatureCandidates { feature_candidates })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{default_feature_candidates, select_split};
    use crate::error::ForestError;
    use crate::partition::Partition;

    #[test]
    fn sqrt_default_rounds() {
        assert_eq!(default_feature_candidates(1), 1);
        assert_eq!(default_feature_candidates(2), 1);
        assert_eq!(default_feature_candidates(9), 3);
        assert_eq!(default_feature_candidates(10), 3);
        assert_eq!(default_feature_candidates(12), 3);
        assert_eq!(default_feature_candidates(13), 4);
        assert_eq!(default_feature_candidates(10_000), 100);
    }

    #[test]
    fn zero_candidates_error() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0, 1];
        let p = Partition::new(&features, &labels, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let err = select_split(&p, 0, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidFeatureCandidates {
                feature_candidates: 0
            }
        ));
    }

    #[test]
    fn single_feature_finds_median_split() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let labels = vec![0, 0, 1, 1];
        let p = Partition::new(&features, &labels, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = select_split(&p, 3, &mut rng).unwrap();
        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 6.0).abs() < f64::EPSILON);
        assert_eq!(split.left.count(), 2);
        assert_eq!(split.right.count(), 2);
        assert_eq!(split.left.pure_label(), Some(0));
        assert_eq!(split.right.pure_label(), Some(1));
    }

    #[test]
    fn prefers_separating_feature() {
        // Feature 0 separates the labels perfectly, feature 1 is constant.
        // Enough draws that both features are (near-certainly) sampled; the
        // zero-impurity split must win regardless of draw order.
        let features = vec![
            vec![0.0, 5.0],
            vec![0.0, 5.0],
            vec![9.0, 5.0],
            vec![9.0, 5.0],
        ];
        let labels = vec![0, 0, 1, 1];
        let p = Partition::new(&features, &labels, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let split = select_split(&p, 32, &mut rng).unwrap();
        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 4.5).abs() < f64::EPSILON);
        assert_eq!(split.left.pure_label(), Some(0));
        assert_eq!(split.right.pure_label(), Some(1));
    }

    #[test]
    fn unsplittable_partition_yields_degenerate_winner() {
        // Every feature constant: the best candidate still has an empty side.
        let features = vec![vec![3.0, 3.0]; 4];
        let labels = vec![0, 1, 0, 1];
        let p = Partition::new(&features, &labels, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = select_split(&p, 5, &mut rng).unwrap();
        assert!(split.left.is_empty());
        assert_eq!(split.right.count(), 4);
    }

    #[test]
    fn deterministic_given_seed() {
        let features = vec![vec![1.0, 9.0], vec![4.0, 2.0], vec![6.0, 8.0], vec![3.0, 1.0]];
        let labels = vec![0, 1, 0, 1];
        let p = Partition::new(&features, &labels, 2).unwrap();
        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        let a = select_split(&p, 4, &mut rng1).unwrap();
        let b = select_split(&p, 4, &mut rng2).unwrap();
        assert_eq!(a.feature, b.feature);
        assert!((a.threshold - b.threshold).abs() < f64::EPSILON);
    }
}

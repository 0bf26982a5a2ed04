//! Immutable per-node views over the training set, with cached label statistics.

use std::fmt;

use crate::error::ForestError;
use crate::node::FeatureIndex;

/// Unnormalized Gini impurity: `count * (1 - Σ(p_i²))`.
///
/// Zero for pure and empty partitions; scales with partition size so that
/// sibling scores can be summed and divided by the parent count to weight
/// a candidate split.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Validate a row-major training set and return its feature dimension.
///
/// Shared by tree and forest fitting so both surfaces reject the same inputs.
pub(crate) fn check_training_set(
    features: &[Vec<f64>],
    labels: &[i64],
) -> Result<usize, ForestError> {
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(ForestError::PartitionLengthMismatch {
            n_rows: features.len(),
            n_labels: labels.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(ForestError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }
    Ok(n_features)
}

/// An immutable view over one subtree's share of the training set.
///
/// Holds indices into the shared row-major sample store rather than copies,
/// so sibling partitions never alias each other's rows and splitting is an
/// index shuffle. Label statistics (dominant label, purity, impurity) are
/// computed once at construction.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [i64],
    indices: Vec<usize>,
    n_features: usize,
    dominant_label: Option<i64>,
    pure_label: Option<i64>,
    impurity: Impurity,
}

impl<'a> Partition<'a> {
    /// Create the root partition over an entire training set.
    ///
    /// `features[sample_idx][feature_idx]` — row-major layout.
    /// `n_features` is threaded explicitly so empty partitions still know
    /// their dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PartitionLengthMismatch`] when `features` and
    /// `labels` have different lengths.
    pub fn new(
        features: &'a [Vec<f64>],
        labels: &'a [i64],
        n_features: usize,
    ) -> Result<Self, ForestError> {
        if features.len() != labels.len() {
            return Err(ForestError::PartitionLengthMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }
        let indices: Vec<usize> = (0..features.len()).collect();
        Ok(Self::from_indices(features, labels, n_features, indices))
    }

    /// Build a partition from a subset of sample indices, computing its
    /// label statistics.
    pub(crate) fn from_indices(
        features: &'a [Vec<f64>],
        labels: &'a [i64],
        n_features: usize,
        indices: Vec<usize>,
    ) -> Self {
        // Label frequencies in first-encounter order, so the dominant-label
        // tie-break is deterministic: first label to reach the maximum count.
        let mut label_counts: Vec<(i64, usize)> = Vec::new();
        for &i in &indices {
            match label_counts.iter_mut().find(|(l, _)| *l == labels[i]) {
                Some((_, c)) => *c += 1,
                None => label_counts.push((labels[i], 1)),
            }
        }

        // Strict > keeps the first label that reached the maximum count.
        let mut dominant_label = None;
        let mut dominant_count = 0;
        for &(label, count) in &label_counts {
            if count > dominant_count {
                dominant_count = count;
                dominant_label = Some(label);
            }
        }
        let pure_label = match label_counts.as_slice() {
            [(label, _)] => Some(*label),
            _ => None,
        };

        let count = indices.len();
        let impurity = if count == 0 {
            Impurity::new(0.0)
        } else {
            let n = count as f64;
            let sum_sq: f64 = label_counts
                .iter()
                .map(|&(_, c)| {
                    let p = c as f64 / n;
                    p * p
                })
                .sum();
            Impurity::new(n * (1.0 - sum_sq))
        };

        Self {
            features,
            labels,
            indices,
            n_features,
            dominant_label,
            pure_label,
            impurity,
        }
    }

    /// Return the number of samples in this partition.
    #[must_use]
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    /// Return `true` when the partition holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Return the feature dimension of the underlying sample store.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the most frequent label, or `None` for an empty partition.
    ///
    /// Ties go to the first label reaching the maximum count in sample order.
    #[must_use]
    pub fn dominant_label(&self) -> Option<i64> {
        self.dominant_label
    }

    /// Return the shared label when every sample agrees, `None` otherwise
    /// (including for empty partitions).
    #[must_use]
    pub fn pure_label(&self) -> Option<i64> {
        self.pure_label
    }

    /// Return the cached unnormalized Gini impurity.
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        self.impurity
    }

    /// Return the labels of this partition's samples, in partition order.
    pub(crate) fn iter_labels(&self) -> impl Iterator<Item = i64> + '_ {
        self.indices.iter().map(|&i| self.labels[i])
    }

    /// Split on the median of one feature's values across this partition.
    ///
    /// Samples with `value < median` go left, all others right, preserving
    /// relative order on each side. Either side may come back empty (a
    /// degenerate split). Pure function of the partition's contents.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::InvalidFeatureIndex`] | `feature` outside `[0, n_features)` |
    /// | [`ForestError::EmptyDataset`] | called on an empty partition |
    pub fn split_on(
        &self,
        feature: FeatureIndex,
    ) -> Result<(f64, Partition<'a>, Partition<'a>), ForestError> {
        if feature.index() >= self.n_features {
            return Err(ForestError::InvalidFeatureIndex {
                feature_index: feature.index(),
                n_features: self.n_features,
            });
        }
        if self.indices.is_empty() {
            return Err(ForestError::EmptyDataset);
        }

        let values: Vec<f64> = self
            .indices
            .iter()
            .map(|&i| self.features[i][feature.index()])
            .collect();

        let mut sorted = values.clone();
        sorted.sort_unstable_by(f64::total_cmp);
        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[(n - 1) / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        let mut lesser = Vec::new();
        let mut greater = Vec::new();
        for (&index, &value) in self.indices.iter().zip(&values) {
            if value < median {
                lesser.push(index);
            } else {
                greater.push(index);
            }
        }

        let left = Partition::from_indices(self.features, self.labels, self.n_features, lesser);
        let right = Partition::from_indices(self.features, self.labels, self.n_features, greater);
        Ok((median, left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::{Partition, check_training_set};
    use crate::error::ForestError;
    use crate::node::FeatureIndex;

    fn partition<'a>(features: &'a [Vec<f64>], labels: &'a [i64]) -> Partition<'a> {
        Partition::new(features, labels, features[0].len()).unwrap()
    }

    // --- construction ---

    #[test]
    fn length_mismatch_error() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0];
        let err = Partition::new(&features, &labels, 1).unwrap_err();
        assert!(matches!(
            err,
            ForestError::PartitionLengthMismatch {
                n_rows: 2,
                n_labels: 1
            }
        ));
    }

    #[test]
    fn empty_partition_has_no_dominant_label() {
        let features: Vec<Vec<f64>> = vec![];
        let labels: Vec<i64> = vec![];
        let p = Partition::new(&features, &labels, 3).unwrap();
        assert_eq!(p.count(), 0);
        assert!(p.is_empty());
        assert_eq!(p.dominant_label(), None);
        assert_eq!(p.pure_label(), None);
        assert!((p.impurity().value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dominant_label_most_frequent() {
        let features = vec![vec![0.0]; 5];
        let labels = vec![1, -1, -1, 1, -1];
        let p = partition(&features, &labels);
        assert_eq!(p.dominant_label(), Some(-1));
    }

    #[test]
    fn dominant_label_tie_goes_to_first_seen() {
        let features = vec![vec![0.0]; 4];
        let labels = vec![7, 3, 3, 7];
        let p = partition(&features, &labels);
        assert_eq!(p.dominant_label(), Some(7));
    }

    // --- impurity ---

    #[test]
    fn impurity_zero_for_pure() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![5, 5, 5];
        let p = partition(&features, &labels);
        assert!((p.impurity().value() - 0.0).abs() < f64::EPSILON);
        assert_eq!(p.pure_label(), Some(5));
    }

    #[test]
    fn impurity_unnormalized_balanced_binary() {
        // 4 samples, 2+2: 4 * (1 - 0.25 - 0.25) = 2.0
        let features = vec![vec![0.0]; 4];
        let labels = vec![0, 0, 1, 1];
        let p = partition(&features, &labels);
        assert!((p.impurity().value() - 2.0).abs() < 1e-12);
        assert_eq!(p.pure_label(), None);
    }

    #[test]
    fn impurity_nonnegative_for_skewed_mix() {
        let features = vec![vec![0.0]; 5];
        let labels = vec![0, 0, 0, 0, 1];
        let p = partition(&features, &labels);
        // 5 * (1 - 0.64 - 0.04) = 1.6
        assert!((p.impurity().value() - 1.6).abs() < 1e-12);
        assert!(p.impurity().value() > 0.0);
    }

    // --- split_on ---

    #[test]
    fn median_odd_count() {
        let features = vec![vec![3.0], vec![1.0], vec![2.0]];
        let labels = vec![0, 0, 1];
        let p = partition(&features, &labels);
        let (median, left, right) = p.split_on(FeatureIndex::new(0)).unwrap();
        assert!((median - 2.0).abs() < f64::EPSILON);
        assert_eq!(left.count(), 1);
        assert_eq!(right.count(), 2);
    }

    #[test]
    fn median_even_count_averages_middle_values() {
        let features = vec![vec![1.0], vec![2.0], vec![4.0], vec![8.0]];
        let labels = vec![0, 0, 1, 1];
        let p = partition(&features, &labels);
        let (median, left, right) = p.split_on(FeatureIndex::new(0)).unwrap();
        assert!((median - 3.0).abs() < f64::EPSILON);
        assert_eq!(left.count(), 2);
        assert_eq!(right.count(), 2);
    }

    #[test]
    fn split_conserves_samples_and_order() {
        let features = vec![vec![5.0], vec![1.0], vec![9.0], vec![2.0], vec![7.0]];
        let labels = vec![0, 1, 2, 3, 4];
        let p = partition(&features, &labels);
        let (median, left, right) = p.split_on(FeatureIndex::new(0)).unwrap();
        assert!((median - 5.0).abs() < f64::EPSILON);
        // value < 5 goes left in original order; the rest right in original order
        let left_labels: Vec<i64> = left.iter_labels().collect();
        let right_labels: Vec<i64> = right.iter_labels().collect();
        assert_eq!(left_labels, vec![1, 3]);
        assert_eq!(right_labels, vec![0, 2, 4]);
        assert_eq!(left.count() + right.count(), p.count());
    }

    #[test]
    fn identical_values_split_is_degenerate() {
        // Median equals the shared value, so nothing is strictly less.
        let features = vec![vec![4.0], vec![4.0], vec![4.0]];
        let labels = vec![0, 1, 0];
        let p = partition(&features, &labels);
        let (median, left, right) = p.split_on(FeatureIndex::new(0)).unwrap();
        assert!((median - 4.0).abs() < f64::EPSILON);
        assert!(left.is_empty());
        assert_eq!(right.count(), 3);
    }

    #[test]
    fn split_does_not_mutate_parent() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0, 1];
        let p = partition(&features, &labels);
        let _ = p.split_on(FeatureIndex::new(0)).unwrap();
        assert_eq!(p.count(), 2);
        assert_eq!(p.dominant_label(), Some(0));
    }

    #[test]
    fn out_of_range_feature_index_error() {
        let features = vec![vec![1.0, 2.0]];
        let labels = vec![0];
        let p = partition(&features, &labels);
        let err = p.split_on(FeatureIndex::new(2)).unwrap_err();
        assert!(matches!(
            err,
            ForestError::InvalidFeatureIndex {
                feature_index: 2,
                n_features: 2
            }
        ));
    }

    #[test]
    fn split_on_empty_partition_error() {
        let features: Vec<Vec<f64>> = vec![];
        let labels: Vec<i64> = vec![];
        let p = Partition::new(&features, &labels, 1).unwrap();
        let err = p.split_on(FeatureIndex::new(0)).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    // --- check_training_set ---

    #[test]
    fn check_rejects_empty() {
        let err = check_training_set(&[], &[]).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn check_rejects_ragged_rows() {
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let labels = vec![0, 1];
        let err = check_training_set(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            ForestError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                sample_index: 1
            }
        ));
    }

    #[test]
    fn check_rejects_non_finite() {
        let features = vec![vec![1.0, f64::NAN]];
        let labels = vec![0];
        let err = check_training_set(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            ForestError::NonFiniteValue {
                sample_index: 0,
                feature_index: 1
            }
        ));
    }

    #[test]
    fn check_returns_feature_dimension() {
        let features = vec![vec![1.0, 2.0, 3.0]];
        let labels = vec![0];
        assert_eq!(check_training_set(&features, &labels).unwrap(), 3);
    }
}

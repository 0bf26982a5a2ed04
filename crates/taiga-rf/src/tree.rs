use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::node::{Node, NodeIndex};
use crate::partition::{Partition, check_training_set};
use crate::split::{default_feature_candidates, select_split};

/// Configuration for a single decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter            | Default                              |
/// |----------------------|--------------------------------------|
/// | `feature_candidates` | `None` (`round(sqrt(n_features))`)   |
/// | `seed`               | 42                                   |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) feature_candidates: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            feature_candidates: None,
            seed: 42,
        }
    }

    /// Set the number of random feature candidates evaluated per split.
    ///
    /// `None` resolves to `round(sqrt(n_features))`, minimum 1. Values above
    /// `n_features` are allowed since candidates are drawn with replacement.
    #[must_use]
    pub fn with_feature_candidates(mut self, feature_candidates: Option<usize>) -> Self {
        self.feature_candidates = feature_candidates;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the configured feature candidate count, if set.
    #[must_use]
    pub fn feature_candidates(&self) -> Option<usize> {
        self.feature_candidates
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]` — row-major layout.
    /// `labels[sample_idx]` — integer class labels.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`]              | `features` is empty              |
    /// | [`ForestError::PartitionLengthMismatch`]   | row and label counts differ      |
    /// | [`ForestError::ZeroFeatures`]              | rows have zero feature columns   |
    /// | [`ForestError::FeatureCountMismatch`]      | rows have inconsistent lengths   |
    /// | [`ForestError::NonFiniteValue`]            | any value is NaN or infinite     |
    /// | [`ForestError::InvalidFeatureCandidates`]  | `feature_candidates` is `Some(0)`|
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[i64]) -> Result<DecisionTree, ForestError> {
        let n_features = check_training_set(features, labels)?;

        let feature_candidates = match self.feature_candidates {
            Some(0) => {
                return Err(ForestError::InvalidFeatureCandidates {
                    feature_candidates: 0,
                });
            }
            Some(k) => k,
            None => default_feature_candidates(n_features),
        };

        debug!(
            n_samples = features.len(),
            n_features,
            feature_candidates,
            "fitting decision tree"
        );

        let root = Partition::new(features, labels, n_features)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut arena: Vec<Node> = Vec::new();
        build_node(&root, feature_candidates, &mut rng, &mut arena)?;

        debug!(n_nodes = arena.len(), "decision tree built");

        Ok(DecisionTree {
            nodes: arena,
            n_features,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively grow the arena-based tree from a non-empty partition.
///
/// A pure partition terminates into a leaf with its shared label. Otherwise
/// the best of `feature_candidates` random median splits is taken; when even
/// that winner leaves one side empty, the node leafs out with the partition's
/// dominant label instead of retrying with fresh features — split attempts
/// are bounded at `feature_candidates` per node, so an unsplittable mixed
/// partition underfits rather than recursing forever.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
fn build_node(
    partition: &Partition<'_>,
    feature_candidates: usize,
    rng: &mut ChaCha8Rng,
    arena: &mut Vec<Node>,
) -> Result<NodeIndex, ForestError> {
    let push_leaf = |arena: &mut Vec<Node>, label: i64| {
        let idx = arena.len();
        arena.push(Node::Leaf { label });
        NodeIndex::new(idx)
    };

    if let Some(label) = partition.pure_label() {
        return Ok(push_leaf(arena, label));
    }

    let split = select_split(partition, feature_candidates, rng)?;
    if split.left.is_empty() || split.right.is_empty() {
        let Some(label) = partition.dominant_label() else {
            return Err(ForestError::EmptyDataset);
        };
        return Ok(push_leaf(arena, label));
    }

    // Arena pattern: reserve the index, recurse, then overwrite with the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf { label: 0 });

    let left = build_node(&split.left, feature_candidates, rng, arena)?;
    let right = build_node(&split.right, feature_candidates, rng, arena)?;

    arena[node_idx] = Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left,
        right,
    };
    Ok(NodeIndex::new(node_idx))
}

/// A fitted decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references for
/// cache-friendly traversal. `PartialEq` compares structure deeply and
/// exists for testing determinism, not as a runtime contract.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// Traverses from the root: at each split, goes left when
    /// `sample[feature] < threshold`, right otherwise, until a leaf.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<i64, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { label } => return Ok(*label),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if sample[feature.index()] < *threshold {
                        idx = left.index();
                    } else {
                        idx = right.index();
                    }
                }
            }
        }
    }

    /// Return the number of features this tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        // BFS: (node_index, current_depth)
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => {
                    if d > max_depth {
                        max_depth = d;
                    }
                }
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }

        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dataset_error() {
        let features: Vec<Vec<f64>> = vec![];
        let labels: Vec<i64> = vec![];
        let err = DecisionTreeConfig::new().fit(&features, &labels).unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn label_count_mismatch_error() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0];
        let err = DecisionTreeConfig::new().fit(&features, &labels).unwrap_err();
        assert!(matches!(err, ForestError::PartitionLengthMismatch { .. }));
    }

    #[test]
    fn zero_candidates_error() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0, 1];
        let err = DecisionTreeConfig::new()
            .with_feature_candidates(Some(0))
            .fit(&features, &labels)
            .unwrap_err();
        assert!(matches!(err, ForestError::InvalidFeatureCandidates { .. }));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let labels = vec![1, 1, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[9.0, 9.0]).unwrap(), 1);
    }

    #[test]
    fn quadrant_dataset_splits_once() {
        // Feature 0's median 2.5 separates the labels exactly; with 32
        // candidate draws per split it is sampled with near-certainty, and
        // its zero-impurity split always wins, so the tree is one split
        // node over two pure leaves.
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 5.0],
            vec![5.0, 0.0],
            vec![5.0, 5.0],
        ];
        let labels = vec![0, 0, 1, 1];
        let tree = DecisionTreeConfig::new()
            .with_feature_candidates(Some(32))
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(
            tree.nodes[0],
            Node::Split {
                feature: crate::node::FeatureIndex::new(0),
                threshold: 2.5,
                left: NodeIndex::new(1),
                right: NodeIndex::new(2),
            }
        );
        for (sample, label) in features.iter().zip(&labels) {
            assert_eq!(tree.predict(sample).unwrap(), *label);
        }
    }

    #[test]
    fn quadrant_dataset_feature_zero_separates_exactly() {
        // The non-random half of the scenario above: feature 0's median
        // split alone yields two pure sides at threshold 2.5.
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 5.0],
            vec![5.0, 0.0],
            vec![5.0, 5.0],
        ];
        let labels = vec![0, 0, 1, 1];
        let root = Partition::new(&features, &labels, 2).unwrap();
        let (threshold, left, right) = root.split_on(crate::node::FeatureIndex::new(0)).unwrap();
        assert!((threshold - 2.5).abs() < f64::EPSILON);
        assert_eq!(left.pure_label(), Some(0));
        assert_eq!(right.pure_label(), Some(1));
    }

    #[test]
    fn indistinguishable_samples_leaf_out_with_dominant_label() {
        // Identical feature rows, mixed labels: every candidate split is
        // degenerate, so the tree must be a single leaf with the dominant label.
        let features = vec![vec![2.0, 2.0]; 5];
        let labels = vec![1, -1, 1, -1, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[2.0, 2.0]).unwrap(), 1);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let features = vec![
            vec![1.0, 5.0],
            vec![2.0, 6.0],
            vec![3.0, 7.0],
            vec![10.0, 15.0],
            vec![11.0, 16.0],
            vec![12.0, 17.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree1 = DecisionTreeConfig::new()
            .with_seed(123)
            .fit(&features, &labels)
            .unwrap();
        let tree2 = DecisionTreeConfig::new()
            .with_seed(123)
            .fit(&features, &labels)
            .unwrap();
        // Structurally identical trees, not merely matching predictions.
        assert_eq!(tree1, tree2);
    }

    #[test]
    fn prediction_is_idempotent() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let labels = vec![0, 0, 1, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let first = tree.predict(&[1.5]).unwrap();
        for _ in 0..10 {
            assert_eq!(tree.predict(&[1.5]).unwrap(), first);
        }
    }

    #[test]
    fn prediction_feature_mismatch() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let labels = vec![0, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn negative_labels_supported() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let labels = vec![-1, -1, 1, 1];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.predict(&[0.0]).unwrap(), -1);
        assert_eq!(tree.predict(&[20.0]).unwrap(), 1);
    }
}

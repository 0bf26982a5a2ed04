//! Random Forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::error::ForestError;
use crate::partition::check_training_set;
use crate::split::default_feature_candidates;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter            | Default                              |
/// |----------------------|--------------------------------------|
/// | `feature_candidates` | `None` (`round(sqrt(n_features))`)   |
/// | `seed`               | 42                                   |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) feature_candidates: Option<usize>,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            feature_candidates: None,
            seed: 42,
        })
    }

    /// Set the number of random feature candidates evaluated per split.
    ///
    /// `None` resolves to `round(sqrt(n_features))`, minimum 1.
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

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
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

    /// Train a Random Forest on the provided dataset.
    ///
    /// Every tree trains on the full dataset — there is no bootstrap row
    /// resampling. Trees differ only through their independent random
    /// feature subsampling at each split, each driven by its own seed drawn
    /// from a master RNG, so results are deterministic per seed and tree
    /// construction parallelizes freely.
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
    #[instrument(skip_all, fields(n_trees = self.n_trees, n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[i64]) -> Result<RandomForest, ForestError> {
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

        info!(
            n_trees = self.n_trees,
            n_samples = features.len(),
            n_features,
            feature_candidates,
            "training random forest"
        );

        // Per-tree seeds from the master RNG, drawn up front so tree order
        // does not depend on worker scheduling.
        let mut master_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_trees).map(|_| master_rng.r#gen()).collect();

        // A failure building any tree aborts the whole training run.
        let trees: Vec<DecisionTree> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                DecisionTreeConfig::new()
                    .with_feature_candidates(Some(feature_candidates))
                    .with_seed(seed)
                    .fit(features, labels)
            })
            .collect::<Result<_, _>>()?;

        debug!(n_trees_trained = trees.len(), "tree training complete");

        Ok(RandomForest { trees, n_features })
    }
}

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
}

impl RandomForest {
    /// Predict the class label for a single sample by plurality vote.
    ///
    /// Collects every member tree's prediction in training order; ties go to
    /// the first label reaching the maximum vote count.
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

        let mut tally: Vec<(i64, usize)> = Vec::new();
        let mut winner: Option<(i64, usize)> = None;
        for tree in &self.trees {
            let label = tree.predict(sample)?;
            let count = match tally.iter_mut().find(|(l, _)| *l == label) {
                Some((_, c)) => {
                    *c += 1;
                    *c
                }
                None => {
                    tally.push((label, 1));
                    1
                }
            };
            // Strict > keeps the first label that reached the maximum count.
            if winner.is_none_or(|(_, best)| count > best) {
                winner = Some((label, count));
            }
        }

        // The config guarantees at least one tree.
        winner
            .map(|(label, _)| label)
            .ok_or(ForestError::EmptyDataset)
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any sample has
    /// the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<i64>, ForestError> {
        features
            .par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Return the member trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

//! Random Forest classification: train and predict.
//!
//! Provides a hand-rolled Random Forest classifier built from median-threshold
//! decision trees. Each split evaluates a small random subset of features
//! (drawn with replacement) and keeps the one minimizing weighted Gini
//! impurity; every tree trains on the full dataset, so ensemble diversity
//! comes entirely from per-split feature subsampling. Training is
//! deterministic per seed and parallelized across trees via rayon.

mod confusion;
mod error;
mod forest;
mod node;
mod partition;
mod split;
mod tree;

pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::ForestError;
pub use forest::{RandomForest, RandomForestConfig};
pub use node::{FeatureIndex, Node, NodeIndex};
pub use partition::{Impurity, Partition};
pub use tree::{DecisionTree, DecisionTreeConfig};

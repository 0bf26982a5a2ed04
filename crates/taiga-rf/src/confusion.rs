//! Confusion matrix and per-class classification metrics.

use std::fmt;

use crate::error::ForestError;

/// A confusion matrix for multi-class classification over arbitrary labels.
///
/// Labels are not assumed zero-based: the distinct labels of the true and
/// predicted sequences are collected in ascending order and each maps to one
/// matrix row/column. Entry `[true_class][predicted_class]` counts how many
/// samples with that true label received that prediction.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    classes: Vec<i64>,
    matrix: Vec<Vec<usize>>,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    /// The class label.
    pub class: i64,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true samples for this class.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | Zero labels provided |
    /// | [`ForestError::LabelCountMismatch`] | Sequences have different lengths |
    pub fn from_labels(true_labels: &[i64], predicted: &[i64]) -> Result<Self, ForestError> {
        if true_labels.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(ForestError::LabelCountMismatch {
                n_true: true_labels.len(),
                n_predicted: predicted.len(),
            });
        }

        let mut classes: Vec<i64> = true_labels
            .iter()
            .chain(predicted.iter())
            .copied()
            .collect();
        classes.sort_unstable();
        classes.dedup();

        let class_index = |label: i64| {
            classes
                .binary_search(&label)
                .unwrap_or_else(|_| unreachable!("label came from the class list"))
        };

        let n = classes.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (&t, &p) in true_labels.iter().zip(predicted.iter()) {
            matrix[class_index(t)][class_index(p)] += 1;
        }
        Ok(Self { classes, matrix })
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.classes.len()).map(|i| self.matrix[i][i]).sum();
        let total: usize = self.matrix.iter().flat_map(|row| row.iter()).sum();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.classes.len();
        (0..n)
            .map(|c| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let fn_: usize = (0..n).filter(|&j| j != c).map(|j| self.matrix[c][j]).sum();
                let support = tp + fn_;
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: self.classes[c],
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the distinct class labels in ascending order.
    #[must_use]
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Return the underlying matrix rows, indexed like [`Self::classes`].
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for class in &self.classes {
            write!(f, " pred_{class:>4}")?;
        }
        writeln!(f)?;

        for (class, row) in self.classes.iter().zip(&self.matrix) {
            write!(f, "true_{class:>5}")?;
            for val in row {
                write!(f, " {val:>9}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

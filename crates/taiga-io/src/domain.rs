//! Domain types produced by the readers.

use crate::error::IoError;

/// A feature matrix paired with its labels, validated to agree in length.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    features: Vec<Vec<f64>>,
    labels: Vec<i64>,
}

impl LabeledDataset {
    /// Pair a feature matrix with labels.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::LabelCountMismatch`] when the counts disagree.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<i64>) -> Result<Self, IoError> {
        if features.len() != labels.len() {
            return Err(IoError::LabelCountMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }
        Ok(Self { features, labels })
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the feature dimension (zero for an empty dataset).
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    /// Return the row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the labels, parallel to the feature rows.
    #[must_use]
    pub fn labels(&self) -> &[i64] {
        &self.labels
    }
}

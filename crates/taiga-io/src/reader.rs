//! Whitespace-delimited feature and label file readers with full validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::LabeledDataset;
use crate::error::IoError;

/// Reads a feature matrix from a whitespace-delimited text file.
///
/// Expected format: one sample per line, feature values separated by any
/// whitespace, every line the same length. No header.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::EmptyDataset`] | Zero lines |
/// | [`IoError::InconsistentRowLength`] | Line length differs from the first line |
/// | [`IoError::InvalidValue`] | Token is unparseable, NaN, or infinite |
pub struct FeatureReader {
    path: PathBuf,
}

impl FeatureReader {
    /// Create a new reader for the given features file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning row-major feature vectors.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<Vec<f64>>, IoError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut expected_cols: Option<usize> = None;

        for (line_index, line) in contents.lines().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();

            let expected = *expected_cols.get_or_insert(tokens.len());
            if tokens.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    line_index,
                    expected,
                    got: tokens.len(),
                });
            }

            let mut row = Vec::with_capacity(tokens.len());
            for (col_index, raw) in tokens.iter().enumerate() {
                let value: f64 = raw.parse().map_err(|_| IoError::InvalidValue {
                    path: self.path.clone(),
                    line_index,
                    col_index,
                    raw: (*raw).to_string(),
                })?;
                if !value.is_finite() {
                    return Err(IoError::InvalidValue {
                        path: self.path.clone(),
                        line_index,
                        col_index,
                        raw: (*raw).to_string(),
                    });
                }
                row.push(value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        debug!(
            n_samples = rows.len(),
            n_features = rows.first().map_or(0, Vec::len),
            "feature matrix loaded"
        );
        Ok(rows)
    }
}

/// Reads integer labels from a text file, one label per line.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::EmptyDataset`] | Zero lines |
/// | [`IoError::InvalidLabel`] | Line is not a single integer |
pub struct LabelReader {
    path: PathBuf,
}

impl LabelReader {
    /// Create a new reader for the given labels file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning one label per sample.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<i64>, IoError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut labels = Vec::new();
        for (line_index, line) in contents.lines().enumerate() {
            let label: i64 = line.trim().parse().map_err(|_| IoError::InvalidLabel {
                path: self.path.clone(),
                line_index,
                raw: line.to_string(),
            })?;
            labels.push(label);
        }

        if labels.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        debug!(n_labels = labels.len(), "labels loaded");
        Ok(labels)
    }
}

/// Read a features file and its parallel labels file into one dataset.
///
/// # Errors
///
/// Any reader error above, plus [`IoError::LabelCountMismatch`] when the two
/// files disagree on sample count.
pub fn read_dataset(features_path: &Path, labels_path: &Path) -> Result<LabeledDataset, IoError> {
    let features = FeatureReader::new(features_path).read()?;
    let labels = LabelReader::new(labels_path).read()?;
    let dataset = LabeledDataset::new(features, labels)?;
    info!(
        n_samples = dataset.n_samples(),
        n_features = dataset.n_features(),
        "dataset loaded"
    );
    Ok(dataset)
}

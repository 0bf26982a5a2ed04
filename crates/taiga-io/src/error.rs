//! I/O error types for taiga-io.

use std::path::PathBuf;

/// Errors from reading whitespace-delimited feature and label files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("cannot read file: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the file contains zero data lines.
    #[error("empty dataset (no data lines) in {path}")]
    EmptyDataset {
        /// Path to the offending file.
        path: PathBuf,
    },

    /// Returned when a line has a different number of values than the first line.
    #[error("inconsistent row length in {path}: line {line_index} has {got} values, expected {expected}")]
    InconsistentRowLength {
        /// Path to the features file.
        path: PathBuf,
        /// Zero-based line index.
        line_index: usize,
        /// Expected number of values (from the first line).
        expected: usize,
        /// Actual number of values on this line.
        got: usize,
    },

    /// Returned when a feature value is unparseable, NaN, or infinite.
    #[error("invalid value in {path}: line {line_index}, column {col_index}, raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the features file.
        path: PathBuf,
        /// Zero-based line index.
        line_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw token that failed to parse.
        raw: String,
    },

    /// Returned when a label line is not a single integer.
    #[error("invalid label in {path}: line {line_index}, raw value \"{raw}\"")]
    InvalidLabel {
        /// Path to the labels file.
        path: PathBuf,
        /// Zero-based line index.
        line_index: usize,
        /// The raw line that failed to parse.
        raw: String,
    },

    /// Returned when feature rows and labels disagree in count.
    #[error("{n_rows} feature rows but {n_labels} labels")]
    LabelCountMismatch {
        /// Number of feature rows read.
        n_rows: usize,
        /// Number of labels read.
        n_labels: usize,
    },
}

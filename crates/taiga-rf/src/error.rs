/// Errors from Random Forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when feature_candidates is explicitly set to zero.
    #[error("feature_candidates must be at least 1, got {feature_candidates}")]
    InvalidFeatureCandidates {
        /// The invalid feature_candidates value provided.
        feature_candidates: usize,
    },

    /// Returned when training or classifying against a dataset with zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the dataset has zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when the feature rows and label sequence have different lengths.
    #[error("partition has {n_rows} feature rows but {n_labels} labels")]
    PartitionLengthMismatch {
        /// Number of feature rows provided.
        n_rows: usize,
        /// Number of labels provided.
        n_labels: usize,
    },

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a requested feature index is outside `[0, n_features)`.
    ///
    /// Cannot occur under correct uniform sampling; kept as a fatal assertion.
    #[error("feature index {feature_index} out of range for {n_features} features")]
    InvalidFeatureIndex {
        /// The out-of-range feature index.
        feature_index: usize,
        /// The number of feature columns in the dataset.
        n_features: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when true and predicted label sequences have different lengths.
    #[error("got {n_predicted} predicted labels for {n_true} true labels")]
    LabelCountMismatch {
        /// Number of true labels provided.
        n_true: usize,
        /// Number of predicted labels provided.
        n_predicted: usize,
    },
}

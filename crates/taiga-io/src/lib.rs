//! File I/O and input validation for the taiga pipeline.
//!
//! Reads whitespace-delimited feature matrices and integer label files
//! (one label per line) into validated [`LabeledDataset`] values.

mod domain;
mod error;
mod reader;

pub use domain::LabeledDataset;
pub use error::IoError;
pub use reader::{FeatureReader, LabelReader, read_dataset};

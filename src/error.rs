use thiserror::Error;

/// Errors raised while converting datasets or scoring search results.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The source bundle does not have a required field.
    #[error("source is missing required field '{field}'")]
    MissingField { field: String },

    /// Two matrices that must agree on a dimension do not.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// The recall cutoff is zero or exceeds the available columns.
    #[error("invalid recall cutoff k={k}; must be in [1, {max}]")]
    InvalidCutoff { k: usize, max: usize },

    /// The array has an element type this operation cannot handle.
    #[error("field '{field}' has unsupported element type {dtype}")]
    UnsupportedDtype { field: String, dtype: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("failed to read npy artifact: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("failed to write npy artifact: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("invalid array shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Failure reported by an external ANN index.
    #[error("index error: {0}")]
    Index(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;

impl DatasetError {
    pub(crate) fn shape_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        DatasetError::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

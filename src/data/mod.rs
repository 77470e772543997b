pub mod convert;
pub mod hdf5_source;
pub mod in_memory;
pub mod normalize;

use std::fmt;
use std::fmt::Formatter;
use tracing::debug;
use crate::error::{DatasetError, Result};
use crate::types::typed_array::TypedArray;

/// Name of the field that holds the data points.
pub const TRAIN: &str = "train";
/// Name of the field that holds the query points.
pub const TEST: &str = "test";
/// Name of the field that holds the exact nearest neighbors of each query.
pub const NEIGHBORS: &str = "neighbors";

/// A source of named matrices, such as an ann-benchmarks HDF5 file.
pub trait NamedArraySource {
    /// Reads the matrix stored under `field`.
    ///
    /// Returns `DatasetError::MissingField` if the source has no such field.
    fn get(&self, field: &str) -> Result<TypedArray>;

    /// Convenience method that returns the data points.
    fn get_train(&self) -> Result<TypedArray> {
        self.get(TRAIN)
    }

    /// Convenience method that returns the query points.
    fn get_test(&self) -> Result<TypedArray> {
        self.get(TEST)
    }

    /// Convenience method that returns the exact neighbors of the query points.
    fn get_neighbors(&self) -> Result<TypedArray> {
        self.get(NEIGHBORS)
    }
}

/// Identifies one of the three matrices of a [`DatasetBundle`].
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum BundleField {
    Train,
    Test,
    GroundTruth,
}

impl BundleField {
    /// Returns the name of the field in the source.
    pub fn source_name(&self) -> &'static str {
        match self {
            BundleField::Train => TRAIN,
            BundleField::Test => TEST,
            BundleField::GroundTruth => NEIGHBORS,
        }
    }
}

/// Data points, query points, and the exact neighbors of the query points.
#[derive(PartialEq, Debug, Clone)]
pub struct DatasetBundle {
    pub train: TypedArray,
    pub test: TypedArray,
    pub ground_truth: TypedArray,
}

impl DatasetBundle {
    /// Creates a bundle.
    ///
    /// Returns an error if `train` and `test` differ in dimensionality, or if `ground_truth` does
    /// not have one row per query point.
    pub fn new(train: TypedArray, test: TypedArray, ground_truth: TypedArray) -> Result<DatasetBundle> {
        if train.ncols() != test.ncols() {
            return Err(DatasetError::shape_mismatch(
                "dimensionality of test vs. train", train.ncols(), test.ncols()));
        }
        if ground_truth.nrows() != test.nrows() {
            return Err(DatasetError::shape_mismatch(
                "row count of neighbors vs. test", test.nrows(), ground_truth.nrows()));
        }
        Ok(DatasetBundle { train, test, ground_truth })
    }

    pub fn field(&self, field: BundleField) -> &TypedArray {
        match field {
            BundleField::Train => &self.train,
            BundleField::Test => &self.test,
            BundleField::GroundTruth => &self.ground_truth,
        }
    }

    /// Returns the bundle with its train and test rows scaled to unit L2 norm. The ground truth
    /// holds ids and is left untouched.
    pub fn normalized(self) -> DatasetBundle {
        DatasetBundle {
            train: normalize::normalize_vectors(self.train),
            test: normalize::normalize_vectors(self.test),
            ground_truth: self.ground_truth,
        }
    }
}

impl fmt::Display for DatasetBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let fields = [BundleField::Train, BundleField::Test, BundleField::GroundTruth];
        let lines = fields.iter()
            .map(|&field| format!("{}: {}", field.source_name(), self.field(field)))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Reads the train, test, and neighbors fields of `source` into a bundle.
pub fn load_bundle<S: NamedArraySource + ?Sized>(source: &S) -> Result<DatasetBundle> {
    let train = source.get_train()?;
    let test = source.get_test()?;
    let ground_truth = source.get_neighbors()?;
    debug!(train = %train, test = %test, neighbors = %ground_truth, "loaded dataset bundle");
    DatasetBundle::new(train, test, ground_truth)
}

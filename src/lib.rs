//! Dataset preparation and result evaluation for Approximate Nearest Neighbor search
//! benchmarks.
//!
//! Converts ann-benchmarks style HDF5 files (`train`, `test`, `neighbors`) into `.npy`
//! artifacts, or into the header-prefixed flat binary layout (`fbin`, `u8bin`, `u32bin`)
//! used by big-ANN tooling, and scores ANN search results against ground truth.
//!
//! ## Converting a dataset
//!
//! ```no_run
//! use ann_prep::{convert, ConvertOptions, Hdf5Source};
//!
//! let source = Hdf5Source::open("sift-128-euclidean.hdf5").expect("failed to open dataset");
//! let options = ConvertOptions { normalize: false, flat: true };
//! let report = convert(&source, "sift-128-euclidean.hdf5", &options)
//!     .expect("failed to convert dataset");
//! println!("{}", report);
//! ```
//!
//! ## Computing recall
//! ```
//! use ann_prep::compute_recall;
//! use ndarray::array;
//!
//! let results = array![[1_usize, 2, 3], [4, 5, 6]];
//! let ground_truth = array![[3_usize, 2, 9], [7, 8, 9]];
//! let recall = compute_recall(results.view(), ground_truth.view(), None).unwrap();
//! assert!((recall - 1.0 / 3.0).abs() < 1e-9);
//! ```

pub mod data;
pub mod error;
pub mod index;
pub mod io;
mod types;

pub use crate::data::{load_bundle, BundleField, DatasetBundle, NamedArraySource};
pub use crate::data::convert::{convert, convert_with, plan_artifacts, Artifact, ArtifactFormat, ConversionReport, ConvertOptions};
pub use crate::data::hdf5_source::Hdf5Source;
pub use crate::data::in_memory::InMemorySource;
pub use crate::data::normalize::{normalize_rows, normalize_vectors};
pub use crate::error::{DatasetError, Result};
pub use crate::index::{run_benchmark, AnnIndex, BenchmarkConfig, IndexParams, RecallReport, ReorderStrategy};
pub use crate::io::flat::{read_flat, write_flat, ElementType};
pub use crate::io::native::{read_native, write_native};

pub use crate::types::Metric;
pub use crate::types::ground_truth::{compute_recall, per_query_recall, GroundTruth};
pub use crate::types::typed_array::{Dtype, TypedArray};

use std::ffi::OsString;
use std::fmt;
use std::fmt::Formatter;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::data::{load_bundle, BundleField, DatasetBundle, NamedArraySource};
use crate::error::Result;
use crate::io::flat::{write_flat, ElementType};
use crate::io::native::{self, write_native};

/// Source-file suffixes stripped before naming artifacts.
pub const SOURCE_SUFFIXES: [&str; 2] = [".hdf5", ".h5"];

#[derive(Eq, PartialEq, Default, Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Scale train and test rows to unit L2 norm.
    pub normalize: bool,
    /// Also emit flat binary artifacts (`fbin`, `u8bin`, `u32bin`).
    pub flat: bool,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ArtifactFormat {
    /// Self-describing `.npy`.
    Native,
    /// Header-prefixed flat binary with the given element type.
    Flat(ElementType),
}

/// A single output file of a conversion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub field: BundleField,
    pub format: ArtifactFormat,
}

impl Artifact {
    /// Writes the matrix this artifact holds. Overwrites any existing file.
    pub fn write(&self, bundle: &DatasetBundle) -> Result<()> {
        let matrix = bundle.field(self.field);
        match self.format {
            ArtifactFormat::Native => write_native(matrix, &self.path),
            ArtifactFormat::Flat(element_type) => write_flat(matrix, &self.path, element_type),
        }
    }
}

/// Strips a recognized source suffix from `input`; other paths are returned unchanged.
pub fn artifact_base<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    if let Some(text) = input.to_str() {
        for suffix in SOURCE_SUFFIXES {
            if let Some(base) = text.strip_suffix(suffix) {
                return PathBuf::from(base);
            }
        }
    }
    input.to_path_buf()
}

fn artifact_path(base: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(stem);
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Lists the artifacts a conversion of `input` produces, in write order.
///
/// The native artifacts are `<base>.train.npy`, `<base>.test.npy`, and `<base>.gtruth.npy`.
/// With `options.flat`, the flat artifacts `<base>.data.{u8bin,fbin}`,
/// `<base>.queries.{u8bin,fbin}`, and `<base>.gtruth.u32bin` follow.
pub fn plan_artifacts<P: AsRef<Path>>(input: P, options: &ConvertOptions) -> Vec<Artifact> {
    let base = artifact_base(input);
    let native_artifact = |stem: &str, field: BundleField| Artifact {
        path: artifact_path(&base, stem, native::EXTENSION),
        field,
        format: ArtifactFormat::Native,
    };
    let flat_artifact = |stem: &str, field: BundleField, element_type: ElementType| Artifact {
        path: artifact_path(&base, stem, element_type.extension()),
        field,
        format: ArtifactFormat::Flat(element_type),
    };

    let mut artifacts = vec![
        native_artifact("train", BundleField::Train),
        native_artifact("test", BundleField::Test),
        native_artifact("gtruth", BundleField::GroundTruth),
    ];
    if options.flat {
        artifacts.extend([
            flat_artifact("data", BundleField::Train, ElementType::UInt8),
            flat_artifact("queries", BundleField::Test, ElementType::UInt8),
            flat_artifact("gtruth", BundleField::GroundTruth, ElementType::UInt32),
            flat_artifact("data", BundleField::Train, ElementType::Float32),
            flat_artifact("queries", BundleField::Test, ElementType::Float32),
        ]);
    }
    artifacts
}

/// Summary of a finished conversion.
#[derive(PartialEq, Debug, Clone)]
pub struct ConversionReport {
    /// Shapes and element types of the source matrices, as `<field>: (rows, cols) <dtype>`.
    pub source: String,
    pub artifacts: Vec<PathBuf>,
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let artifacts = self.artifacts.iter()
            .map(|path| format!("  - {}", path.display()))
            .collect::<Vec<_>>();
        write!(f, "{}\nWrote {} artifacts:\n{}", self.source, artifacts.len(), artifacts.join("\n"))
    }
}

/// Reads the bundle from `source`, optionally normalizes it, and writes every artifact planned
/// for `input`.
///
/// Each artifact is replaced as a whole. Artifacts already written stay on disk if a later one
/// fails. Re-running the conversion overwrites them with identical bytes.
pub fn convert<S, P>(source: &S, input: P, options: &ConvertOptions) -> Result<ConversionReport>
where
    S: NamedArraySource + ?Sized,
    P: AsRef<Path>,
{
    convert_with(source, input, options, |_| {})
}

/// Same as [`convert`], calling `on_written` after every artifact is in place.
pub fn convert_with<S, P, F>(source: &S, input: P, options: &ConvertOptions, mut on_written: F)
    -> Result<ConversionReport>
where
    S: NamedArraySource + ?Sized,
    P: AsRef<Path>,
    F: FnMut(&Artifact),
{
    let bundle = load_bundle(source)?;
    let summary = bundle.to_string();
    let bundle = if options.normalize { bundle.normalized() } else { bundle };

    let artifacts = plan_artifacts(input, options);
    for artifact in &artifacts {
        artifact.write(&bundle)?;
        on_written(artifact);
    }
    info!(count = artifacts.len(), normalize = options.normalize, "conversion finished");

    Ok(ConversionReport {
        source: summary,
        artifacts: artifacts.into_iter().map(|artifact| artifact.path).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use approx_eq::assert_approx_eq;
    use linfa_linalg::norm::Norm;
    use ndarray::{Array2, Axis};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use tempdir::TempDir;
    use crate::data::convert::{artifact_base, convert, convert_with, plan_artifacts, ArtifactFormat,
                               ConvertOptions};
    use crate::data::in_memory::InMemorySource;
    use crate::data::{BundleField, NamedArraySource, NEIGHBORS, TEST, TRAIN};
    use crate::io::flat::{read_flat, ElementType};
    use crate::io::native::read_native;
    use crate::types::typed_array::TypedArray;

    fn sample_source() -> InMemorySource {
        let mut source = InMemorySource::new();
        source.add(TRAIN, TypedArray::Float32(Array2::random((100, 8), Uniform::new(0.0_f32, 50.0))));
        source.add(TEST, TypedArray::Float32(Array2::random((10, 8), Uniform::new(0.0_f32, 50.0))));
        source.add(NEIGHBORS, TypedArray::Int32(Array2::random((10, 5), Uniform::new(0_i32, 100))));
        source
    }

    #[test]
    fn test_artifact_base() {
        assert_eq!(PathBuf::from("data/sift-128-euclidean"),
                   artifact_base("data/sift-128-euclidean.hdf5"));
        assert_eq!(PathBuf::from("glove-25-angular"), artifact_base("glove-25-angular.h5"));
        assert_eq!(PathBuf::from("vectors.bin"), artifact_base("vectors.bin"));
    }

    #[test]
    fn test_plan() {
        let artifacts = plan_artifacts("mnist-784-euclidean.hdf5", &ConvertOptions::default());
        let paths = artifacts.iter().map(|a| a.path.clone()).collect::<Vec<_>>();
        assert_eq!(vec![PathBuf::from("mnist-784-euclidean.train.npy"),
                        PathBuf::from("mnist-784-euclidean.test.npy"),
                        PathBuf::from("mnist-784-euclidean.gtruth.npy")], paths);
        assert_eq!(BundleField::GroundTruth, artifacts[2].field);

        let options = ConvertOptions { normalize: false, flat: true };
        let artifacts = plan_artifacts("sift.hdf5", &options);
        assert_eq!(8, artifacts.len());
        assert_eq!(PathBuf::from("sift.gtruth.u32bin"), artifacts[5].path);
        assert_eq!(ArtifactFormat::Flat(ElementType::UInt32), artifacts[5].format);
        assert_eq!(PathBuf::from("sift.queries.fbin"), artifacts[7].path);
    }

    #[test]
    fn test_convert_normalized() {
        let dir = TempDir::new("test_convert_normalized").unwrap();
        let input = dir.path().join("toy-8-euclidean.hdf5");
        let source = sample_source();

        let options = ConvertOptions { normalize: true, flat: false };
        let report = convert(&source, &input, &options).unwrap();
        assert_eq!(3, report.artifacts.len());
        assert!(report.source.starts_with("train: (100, 8) float32"));

        let train = read_native(dir.path().join("toy-8-euclidean.train.npy")).unwrap();
        assert_eq!((100, 8), train.shape());
        train.to_f32().axis_iter(Axis(0)).for_each(|row| {
            assert_approx_eq!(row.norm_l2() as f64, 1.0, 1e-6);
        });

        let gtruth = read_native(dir.path().join("toy-8-euclidean.gtruth.npy")).unwrap();
        assert_eq!(source.get_neighbors().unwrap(), gtruth);
    }

    #[test]
    fn test_convert_idempotent() {
        let dir = TempDir::new("test_convert_idempotent").unwrap();
        let input = dir.path().join("toy.hdf5");
        let source = sample_source();
        let options = ConvertOptions { normalize: true, flat: true };

        let first = convert(&source, &input, &options).unwrap();
        let snapshot = first.artifacts.iter()
            .map(|path| std::fs::read(path).unwrap())
            .collect::<Vec<_>>();

        let second = convert(&source, &input, &options).unwrap();
        assert_eq!(first, second);
        for (path, bytes) in second.artifacts.iter().zip(snapshot) {
            assert_eq!(bytes, std::fs::read(path).unwrap());
        }
    }

    #[test]
    fn test_convert_flat() {
        let dir = TempDir::new("test_convert_flat").unwrap();
        let input = dir.path().join("toy.hdf5");
        let source = sample_source();
        convert(&source, &input, &ConvertOptions { normalize: false, flat: true }).unwrap();

        let queries = read_flat(dir.path().join("toy.queries.fbin"), ElementType::Float32).unwrap();
        assert_eq!(source.get_test().unwrap(), queries);

        let gtruth = read_flat(dir.path().join("toy.gtruth.u32bin"), ElementType::UInt32).unwrap();
        assert_eq!(source.get_neighbors().unwrap().to_ids().unwrap(), gtruth.to_ids().unwrap());

        let data = read_flat(dir.path().join("toy.data.u8bin"), ElementType::UInt8).unwrap();
        assert_eq!((100, 8), data.shape());
    }

    #[test]
    fn test_convert_missing_field() {
        let dir = TempDir::new("test_convert_missing_field").unwrap();
        let mut source = sample_source();
        source.remove(NEIGHBORS);
        assert!(convert(&source, dir.path().join("toy.hdf5"), &ConvertOptions::default()).is_err());
        assert!(!dir.path().join("toy.train.npy").exists());
    }

    #[test]
    fn test_convert_with_callback() {
        let dir = TempDir::new("test_convert_with_callback").unwrap();
        let input = dir.path().join("toy.h5");
        let options = ConvertOptions { normalize: false, flat: true };

        let mut written = vec![];
        let report = convert_with(&sample_source(), &input, &options, |artifact| {
            assert!(artifact.path.exists());
            written.push(artifact.path.clone());
        }).unwrap();
        assert_eq!(report.artifacts, written);

        let text = report.to_string();
        assert!(text.starts_with("train: (100, 8) float32\ntest: (10, 8) float32\nneighbors: (10, 5) int32"));
        assert!(text.contains("Wrote 8 artifacts:"));
        assert!(text.contains(&format!("  - {}", dir.path().join("toy.gtruth.u32bin").display())));
    }
}

use std::fmt;
use std::fmt::Formatter;
use std::path::Path;
use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::File;
use tracing::debug;
use crate::data::NamedArraySource;
use crate::error::{DatasetError, Result};
use crate::types::typed_array::{Dtype, TypedArray};

/// An HDF5 file, in the layout used by ann-benchmarks, where each matrix is a 2-D dataset at
/// the root of the file.
pub struct Hdf5Source {
    file: File,
}

impl Hdf5Source {
    /// Opens the HDF5 file at `path` for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Hdf5Source> {
        let file = File::open(path.as_ref())?;
        Ok(Hdf5Source { file })
    }

    /// Returns the names of all datasets at the root of the file.
    pub fn field_names(&self) -> Result<Vec<String>> {
        Ok(self.file.datasets()?
            .iter()
            .map(|dataset| dataset.name().trim_start_matches('/').to_string())
            .collect())
    }
}

impl NamedArraySource for Hdf5Source {
    fn get(&self, field: &str) -> Result<TypedArray> {
        if !self.file.member_names()?.iter().any(|name| name == field) {
            return Err(DatasetError::MissingField { field: field.to_string() });
        }

        let dataset = self.file.dataset(field)?;
        if dataset.ndim() != 2 {
            return Err(DatasetError::shape_mismatch(
                format!("rank of field '{}'", field), 2, dataset.ndim()));
        }

        let descriptor = dataset.dtype()?.to_descriptor()?;
        debug!(field, shape = ?dataset.shape(), dtype = ?descriptor, "reading hdf5 dataset");
        let dtype = dtype_of(&descriptor).ok_or_else(|| DatasetError::UnsupportedDtype {
            field: field.to_string(),
            dtype: format!("{:?}", descriptor),
        })?;
        let array = match dtype {
            Dtype::Float32 => TypedArray::Float32(dataset.read_2d()?),
            Dtype::Float64 => TypedArray::Float64(dataset.read_2d()?),
            Dtype::UInt8 => TypedArray::UInt8(dataset.read_2d()?),
            Dtype::UInt32 => TypedArray::UInt32(dataset.read_2d()?),
            Dtype::Int32 => TypedArray::Int32(dataset.read_2d()?),
            Dtype::Int64 => TypedArray::Int64(dataset.read_2d()?),
        };
        Ok(array)
    }
}

fn dtype_of(descriptor: &TypeDescriptor) -> Option<Dtype> {
    match descriptor {
        TypeDescriptor::Float(FloatSize::U4) => Some(Dtype::Float32),
        TypeDescriptor::Float(FloatSize::U8) => Some(Dtype::Float64),
        TypeDescriptor::Unsigned(IntSize::U1) => Some(Dtype::UInt8),
        TypeDescriptor::Unsigned(IntSize::U4) => Some(Dtype::UInt32),
        TypeDescriptor::Integer(IntSize::U4) => Some(Dtype::Int32),
        TypeDescriptor::Integer(IntSize::U8) => Some(Dtype::Int64),
        _ => None,
    }
}

impl fmt::Display for Hdf5Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let datasets = self.file.datasets().map_err(|_| fmt::Error)?;
        let lines = datasets.iter()
            .map(|dataset| {
                let dtype = dataset.dtype()
                    .and_then(|dtype| dtype.to_descriptor())
                    .ok()
                    .and_then(|descriptor| dtype_of(&descriptor))
                    .map_or_else(|| "unsupported".to_string(), |dtype| dtype.to_string());
                format!("  - {} with shape {:?} ({})",
                        dataset.name().trim_start_matches('/'), dataset.shape(), dtype)
            })
            .collect::<Vec<_>>();
        write!(f, "There are a total of {} datasets: \n{}", datasets.len(), lines.join("\n"))
    }
}

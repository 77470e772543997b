//! Header-prefixed flat binary artifacts, as consumed by big-ANN benchmark tooling.
//!
//! Layout: `u32` row count and `u32` column count (little-endian), followed by
//! `rows * cols` elements in row-major order with no padding. The element type is not stored;
//! by convention it is implied by the file extension (`u8bin`, `fbin`, `u32bin`).

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ndarray::Array2;
use tracing::info;
use crate::error::{DatasetError, Result};
use crate::io::write_atomically;
use crate::types::typed_array::TypedArray;

/// Size of the `(rows, cols)` header in bytes.
pub const HEADER_LEN: usize = 8;

/// Element types a flat artifact can hold.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum ElementType {
    /// Quantized vectors.
    UInt8,
    /// Vectors.
    Float32,
    /// Neighbor ids.
    UInt32,
}

impl ElementType {
    /// Returns the width of a single element in bytes.
    pub fn width(&self) -> usize {
        match self {
            ElementType::UInt8 => 1,
            ElementType::Float32 | ElementType::UInt32 => 4,
        }
    }

    /// Returns the conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ElementType::UInt8 => "u8bin",
            ElementType::Float32 => "fbin",
            ElementType::UInt32 => "u32bin",
        }
    }

    pub fn from_extension(extension: &str) -> Option<ElementType> {
        match extension {
            "u8bin" => Some(ElementType::UInt8),
            "fbin" => Some(ElementType::Float32),
            "u32bin" | "ibin" => Some(ElementType::UInt32),
            _ => None,
        }
    }

    /// Infers the element type from the extension of `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<ElementType> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ElementType::from_extension)
    }

    /// Returns the total size in bytes of an artifact with the given shape, or `None` if it
    /// does not fit in a `u64`.
    pub fn artifact_len(&self, rows: usize, cols: usize) -> Option<u64> {
        (rows as u64).checked_mul(cols as u64)?
            .checked_mul(self.width() as u64)?
            .checked_add(HEADER_LEN as u64)
    }
}

trait FlatElement: Copy {
    fn cast(matrix: &TypedArray) -> Array2<Self>;
    fn wrap(matrix: Array2<Self>) -> TypedArray;
    fn encode<W: Write>(self, writer: &mut W) -> std::io::Result<()>;
    fn decode<R: Read>(reader: &mut R) -> std::io::Result<Self>;
}

impl FlatElement for u8 {
    fn cast(matrix: &TypedArray) -> Array2<u8> { matrix.to_u8() }
    fn wrap(matrix: Array2<u8>) -> TypedArray { TypedArray::UInt8(matrix) }
    fn encode<W: Write>(self, writer: &mut W) -> std::io::Result<()> { writer.write_u8(self) }
    fn decode<R: Read>(reader: &mut R) -> std::io::Result<u8> { reader.read_u8() }
}

impl FlatElement for f32 {
    fn cast(matrix: &TypedArray) -> Array2<f32> { matrix.to_f32() }
    fn wrap(matrix: Array2<f32>) -> TypedArray { TypedArray::Float32(matrix) }
    fn encode<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
        writer.write_f32::<LittleEndian>(self)
    }
    fn decode<R: Read>(reader: &mut R) -> std::io::Result<f32> { reader.read_f32::<LittleEndian>() }
}

impl FlatElement for u32 {
    fn cast(matrix: &TypedArray) -> Array2<u32> { matrix.to_u32() }
    fn wrap(matrix: Array2<u32>) -> TypedArray { TypedArray::UInt32(matrix) }
    fn encode<W: Write>(self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u32::<LittleEndian>(self)
    }
    fn decode<R: Read>(reader: &mut R) -> std::io::Result<u32> { reader.read_u32::<LittleEndian>() }
}

/// Writes `matrix` to `path` in the flat layout, casting every element to `element_type`.
pub fn write_flat<P: AsRef<Path>>(matrix: &TypedArray, path: P, element_type: ElementType) -> Result<()> {
    let path = path.as_ref();
    match element_type {
        ElementType::UInt8 => write_elements::<u8>(matrix, path)?,
        ElementType::Float32 => write_elements::<f32>(matrix, path)?,
        ElementType::UInt32 => write_elements::<u32>(matrix, path)?,
    }
    info!(path = %path.display(), rows = matrix.nrows(), cols = matrix.ncols(),
          element_type = element_type.extension(), "wrote flat artifact");
    Ok(())
}

/// Reads a flat artifact whose elements are of type `element_type`.
pub fn read_flat<P: AsRef<Path>>(path: P, element_type: ElementType) -> Result<TypedArray> {
    let path = path.as_ref();
    match element_type {
        ElementType::UInt8 => read_elements::<u8>(path, element_type),
        ElementType::Float32 => read_elements::<f32>(path, element_type),
        ElementType::UInt32 => read_elements::<u32>(path, element_type),
    }
}

fn header_value(context: &str, value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| DatasetError::shape_mismatch(context, u32::MAX as usize, value))
}

fn write_elements<T: FlatElement>(matrix: &TypedArray, path: &Path) -> Result<()> {
    let (rows, cols) = matrix.shape();
    let rows = header_value("flat artifact row count", rows)?;
    let cols = header_value("flat artifact column count", cols)?;

    let values = T::cast(matrix);
    write_atomically(path, |writer| {
        writer.write_u32::<LittleEndian>(rows)?;
        writer.write_u32::<LittleEndian>(cols)?;
        for &value in values.iter() {
            value.encode(writer)?;
        }
        Ok(())
    })
}

fn read_elements<T: FlatElement>(path: &Path, element_type: ElementType) -> Result<TypedArray> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let rows = reader.read_u32::<LittleEndian>()? as usize;
    let cols = reader.read_u32::<LittleEndian>()? as usize;

    // The header is untrusted until the payload it describes is actually on disk.
    match element_type.artifact_len(rows, cols) {
        Some(expected) if expected == file_len => {}
        expected => {
            let expected = expected.map_or(usize::MAX, |len| usize::try_from(len).unwrap_or(usize::MAX));
            let actual = usize::try_from(file_len).unwrap_or(usize::MAX);
            return Err(DatasetError::shape_mismatch(
                format!("length of flat artifact '{}'", path.display()), expected, actual));
        }
    }

    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows * cols {
        data.push(T::decode(&mut reader)?);
    }
    Ok(T::wrap(Array2::from_shape_vec((rows, cols), data)?))
}

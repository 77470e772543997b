//! Self-describing `.npy` artifacts. Element type and shape travel with the data, so
//! artifacts round-trip exactly and are readable by numpy-based tooling.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use byteorder::{LittleEndian, ReadBytesExt};
use ndarray::Array2;
use ndarray_npy::{read_npy, ReadableElement, WriteNpyExt};
use tracing::{debug, info};
use crate::error::{DatasetError, Result};
use crate::io::write_atomically;
use crate::types::typed_array::TypedArray;

pub const EXTENSION: &str = "npy";

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Writes `matrix` to `path`, preserving its element type.
pub fn write_native<P: AsRef<Path>>(matrix: &TypedArray, path: P) -> Result<()> {
    let path = path.as_ref();
    write_atomically(path, |writer| {
        match matrix {
            TypedArray::Float32(array) => array.write_npy(writer)?,
            TypedArray::Float64(array) => array.write_npy(writer)?,
            TypedArray::UInt8(array) => array.write_npy(writer)?,
            TypedArray::UInt32(array) => array.write_npy(writer)?,
            TypedArray::Int32(array) => array.write_npy(writer)?,
            TypedArray::Int64(array) => array.write_npy(writer)?,
        }
        Ok(())
    })?;
    info!(path = %path.display(), rows = matrix.nrows(), cols = matrix.ncols(),
          dtype = %matrix.dtype(), "wrote npy artifact");
    Ok(())
}

/// Reads a 2-D `.npy` artifact of any supported element type.
///
/// The element type is taken from the `descr` entry of the header; the payload is then parsed
/// once with the matching reader.
pub fn read_native<P: AsRef<Path>>(path: P) -> Result<TypedArray> {
    let path = path.as_ref();
    let descriptor = read_descriptor(path)?;
    debug!(path = %path.display(), descriptor = descriptor.as_str(), "read npy header");

    // Byte order is left to the reader, which handles both.
    match descriptor.trim_start_matches(['<', '>', '|', '=']) {
        "f4" => Ok(TypedArray::Float32(read::<f32>(path)?)),
        "f8" => Ok(TypedArray::Float64(read::<f64>(path)?)),
        "u1" => Ok(TypedArray::UInt8(read::<u8>(path)?)),
        "u4" => Ok(TypedArray::UInt32(read::<u32>(path)?)),
        "i4" => Ok(TypedArray::Int32(read::<i32>(path)?)),
        "i8" => Ok(TypedArray::Int64(read::<i64>(path)?)),
        _ => Err(DatasetError::UnsupportedDtype {
            field: path.display().to_string(),
            dtype: descriptor,
        }),
    }
}

fn read<A: ReadableElement>(path: &Path) -> Result<Array2<A>> {
    Ok(read_npy::<_, Array2<A>>(path)?)
}

fn invalid_header(message: &str) -> DatasetError {
    DatasetError::Io(std::io::Error::new(ErrorKind::InvalidData, message.to_string()))
}

/// Returns the type descriptor of an npy file, e.g. `<f4`.
fn read_descriptor(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0_u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(invalid_header("not an npy file"));
    }
    let major = reader.read_u8()?;
    let _minor = reader.read_u8()?;
    let header_len = match major {
        1 => reader.read_u16::<LittleEndian>()? as usize,
        _ => reader.read_u32::<LittleEndian>()? as usize,
    };

    let mut header = Vec::new();
    reader.take(header_len as u64).read_to_end(&mut header)?;
    let header = String::from_utf8_lossy(&header);
    parse_descriptor(&header).ok_or_else(|| invalid_header("npy header has no 'descr' entry"))
}

fn parse_descriptor(header: &str) -> Option<String> {
    let rest = &header[header.find("'descr'")? + "'descr'".len()..];
    let rest = rest.trim_start().strip_prefix(':')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let rest = &rest[1..];
    Some(rest[..rest.find(quote)?].to_string())
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use tempdir::TempDir;
    use crate::error::DatasetError;
    use crate::io::native::{parse_descriptor, read_native, write_native};
    use crate::types::typed_array::{Dtype, TypedArray};

    #[test]
    fn test_dtype_preserved() {
        let dir = TempDir::new("test_dtype_preserved").unwrap();

        let vectors = TypedArray::Float32(Array2::random((20, 8), Uniform::new(0.0_f32, 1.0)));
        let path = dir.path().join("a.train.npy");
        write_native(&vectors, &path).unwrap();
        assert_eq!(vectors, read_native(&path).unwrap());

        let ids = TypedArray::Int32(array![[0, 5, 2], [9, 1, 4]]);
        let path = dir.path().join("a.gtruth.npy");
        write_native(&ids, &path).unwrap();
        let read = read_native(&path).unwrap();
        assert_eq!(Dtype::Int32, read.dtype());
        assert_eq!(ids, read);

        let quantized = TypedArray::UInt8(array![[0_u8, 255], [17, 3]]);
        let path = dir.path().join("a.test.npy");
        write_native(&quantized, &path).unwrap();
        assert_eq!(quantized, read_native(&path).unwrap());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new("test_missing_file").unwrap();
        assert!(read_native(dir.path().join("nothing.npy")).is_err());
    }

    #[test]
    fn test_every_dtype() {
        let dir = TempDir::new("test_every_dtype").unwrap();
        let matrices = [
            TypedArray::Float64(array![[0.25_f64, -1.0]]),
            TypedArray::UInt32(array![[4_000_000_000_u32, 1]]),
            TypedArray::Int64(array![[-1_i64, 1 << 40]]),
        ];
        for (i, matrix) in matrices.into_iter().enumerate() {
            let path = dir.path().join(format!("m{}.npy", i));
            write_native(&matrix, &path).unwrap();
            assert_eq!(matrix, read_native(&path).unwrap());
        }
    }

    #[test]
    fn test_descriptor() {
        let header = "{'descr': '<f4', 'fortran_order': False, 'shape': (3, 2), }";
        assert_eq!(Some("<f4".to_string()), parse_descriptor(header));
        assert_eq!(Some("|u1".to_string()), parse_descriptor("{'descr':\"|u1\", 'shape': (1,)}"));
        assert_eq!(None, parse_descriptor("{'shape': (3, 2)}"));
    }

    #[test]
    fn test_not_npy() {
        let dir = TempDir::new("test_not_npy").unwrap();
        let path = dir.path().join("garbage.npy");
        std::fs::write(&path, b"definitely not numpy").unwrap();
        assert!(matches!(read_native(&path), Err(DatasetError::Io(_))));
    }
}

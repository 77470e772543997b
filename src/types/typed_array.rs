use std::fmt::{Display, Formatter};
use ndarray::Array2;
use crate::error::{DatasetError, Result};

/// Element type of a matrix, named the way numpy names it.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Dtype {
    Float32,
    Float64,
    UInt8,
    UInt32,
    Int32,
    Int64,
}

impl Dtype {
    /// Returns `true` for integer element types.
    pub fn is_integer(&self) -> bool {
        !matches!(self, Dtype::Float32 | Dtype::Float64)
    }
}

impl Display for Dtype {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::UInt8 => "uint8",
            Dtype::UInt32 => "uint32",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
        };
        write!(f, "{}", name)
    }
}

/// A dense matrix where each row is a single vector (or a single list of neighbor ids),
/// tagged with its element type.
#[derive(PartialEq, Debug, Clone)]
pub enum TypedArray {
    Float32(Array2<f32>),
    Float64(Array2<f64>),
    UInt8(Array2<u8>),
    UInt32(Array2<u32>),
    Int32(Array2<i32>),
    Int64(Array2<i64>),
}

/// Evaluates `$body` with `$array` bound to the inner matrix, whatever its element type.
macro_rules! each_array {
    ($value:expr, $array:ident => $body:expr) => {
        match $value {
            TypedArray::Float32($array) => $body,
            TypedArray::Float64($array) => $body,
            TypedArray::UInt8($array) => $body,
            TypedArray::UInt32($array) => $body,
            TypedArray::Int32($array) => $body,
            TypedArray::Int64($array) => $body,
        }
    };
}

impl TypedArray {
    pub fn dtype(&self) -> Dtype {
        match self {
            TypedArray::Float32(_) => Dtype::Float32,
            TypedArray::Float64(_) => Dtype::Float64,
            TypedArray::UInt8(_) => Dtype::UInt8,
            TypedArray::UInt32(_) => Dtype::UInt32,
            TypedArray::Int32(_) => Dtype::Int32,
            TypedArray::Int64(_) => Dtype::Int64,
        }
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        each_array!(self, array => array.dim())
    }

    pub fn nrows(&self) -> usize { self.shape().0 }

    pub fn ncols(&self) -> usize { self.shape().1 }

    /// Casts every element to `f32`.
    pub fn to_f32(&self) -> Array2<f32> {
        match self {
            TypedArray::Float32(array) => array.clone(),
            other => each_array!(other, array => array.mapv(|x| x as f32)),
        }
    }

    /// Casts every element to `u8` with `as` semantics: floats saturate, wider integers wrap.
    pub fn to_u8(&self) -> Array2<u8> {
        match self {
            TypedArray::UInt8(array) => array.clone(),
            other => each_array!(other, array => array.mapv(|x| x as u8)),
        }
    }

    /// Casts every element to `u32` with `as` semantics.
    pub fn to_u32(&self) -> Array2<u32> {
        match self {
            TypedArray::UInt32(array) => array.clone(),
            other => each_array!(other, array => array.mapv(|x| x as u32)),
        }
    }

    /// Interprets an integer matrix as item ids.
    ///
    /// Negative ids map to `usize::MAX` so they can never match a real id. Returns an error for
    /// floating-point matrices.
    pub fn to_ids(&self) -> Result<Array2<usize>> {
        match self {
            TypedArray::UInt8(array) => Ok(array.mapv(|x| x as usize)),
            TypedArray::UInt32(array) => Ok(array.mapv(|x| x as usize)),
            TypedArray::Int32(array) => Ok(array.mapv(|x| usize::try_from(x).unwrap_or(usize::MAX))),
            TypedArray::Int64(array) => Ok(array.mapv(|x| usize::try_from(x).unwrap_or(usize::MAX))),
            TypedArray::Float32(_) | TypedArray::Float64(_) => Err(DatasetError::UnsupportedDtype {
                field: "ids".to_string(),
                dtype: self.dtype().to_string(),
            }),
        }
    }
}

impl Display for TypedArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {}", self.shape(), self.dtype())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array2};
    use crate::types::typed_array::{Dtype, TypedArray};

    #[test]
    fn test_shape_and_dtype() {
        let set = TypedArray::Float32(Array2::<f32>::zeros((100, 8)));
        assert_eq!((100, 8), set.shape());
        assert_eq!(Dtype::Float32, set.dtype());
        assert_eq!("(100, 8) float32", set.to_string());

        let set = TypedArray::Int32(Array2::<i32>::zeros((3, 10)));
        assert_eq!(3, set.nrows());
        assert_eq!(10, set.ncols());
        assert!(set.dtype().is_integer());
    }

    #[test]
    fn test_to_ids() {
        let set = TypedArray::Int32(array![[0, 4, -1], [7, 2, 3]]);
        let ids = set.to_ids().unwrap();
        assert_eq!(array![[0_usize, 4, usize::MAX], [7, 2, 3]], ids);

        let set = TypedArray::Float32(array![[0.0_f32, 1.0]]);
        assert!(set.to_ids().is_err());
    }

    #[test]
    fn test_casts() {
        let set = TypedArray::Float32(array![[0.5_f32, 300.0, -2.0]]);
        assert_eq!(array![[0_u8, 255, 0]], set.to_u8());

        let set = TypedArray::Int32(array![[-1, 5]]);
        assert_eq!(array![[u32::MAX, 5]], set.to_u32());

        let set = TypedArray::UInt8(array![[1_u8, 2], [3, 4]]);
        assert_eq!(array![[1.0_f32, 2.0], [3.0, 4.0]], set.to_f32());
    }
}

use linfa_linalg::norm::Norm;
use ndarray::{Array2, NdFloat, Zip};
use crate::types::typed_array::TypedArray;

/// Added to every row norm so that all-zero rows stay finite.
pub const NORM_EPSILON: f32 = 1e-30;

/// Divides every row of `matrix` by its L2 norm plus [`NORM_EPSILON`].
///
/// An all-zero row stays all-zero rather than turning into NaNs.
pub fn normalize_rows<A: NdFloat + From<f32> + std::iter::Sum>(mut matrix: Array2<A>) -> Array2<A> {
    let epsilon = <A as From<f32>>::from(NORM_EPSILON);
    Zip::from(matrix.rows_mut()).par_for_each(|mut row| {
        let norm = row.norm_l2() + epsilon;
        row.mapv_inplace(|x| x / norm);
    });
    matrix
}

/// Normalizes the rows of a vector matrix of any element type.
///
/// Integer matrices are promoted to `f32` first; unit vectors do not survive a round trip
/// through an integer type.
pub fn normalize_vectors(matrix: TypedArray) -> TypedArray {
    match matrix {
        TypedArray::Float32(array) => TypedArray::Float32(normalize_rows(array)),
        TypedArray::Float64(array) => TypedArray::Float64(normalize_rows(array)),
        other => TypedArray::Float32(normalize_rows(other.to_f32())),
    }
}

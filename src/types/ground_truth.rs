use std::cmp::min;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use roaring::RoaringBitmap;
use tracing::debug;
use crate::error::{DatasetError, Result};

/// Defines the exact nearest neighbors of a query set.
#[derive(Eq, PartialEq, Default, Debug, Clone)]
pub struct GroundTruth(Array2<usize>);

impl GroundTruth {
    pub fn new(neighbors: Array2<usize>) -> GroundTruth {
        GroundTruth(neighbors)
    }

    /// Returns the set of neighbors.
    pub fn get_neighbors(&self) -> ArrayView2<usize> { self.0.view() }

    pub fn num_queries(&self) -> usize { self.0.nrows() }

    /// Computes the recall of every query given a retrieved set.
    pub fn per_query_recall(&self, results: ArrayView2<usize>, k: Option<usize>) -> Result<Array1<f64>> {
        per_query_recall(results, self.0.view(), k)
    }

    /// Computes mean recall given a retrieved set.
    ///
    /// Returns an error if the number of queries does not match between `results` and the exact
    /// neighbor set stored in this object.
    pub fn mean_recall(&self, results: ArrayView2<usize>, k: Option<usize>) -> Result<f64> {
        compute_recall(results, self.0.view(), k)
    }
}

/// Scores `results` against `ground_truth`, both with one row per query.
///
/// A result slot counts as recalled when its id equals any of the first `k` ground-truth ids of
/// that query. Matched ground-truth ids are not consumed, so an id repeated within a result row
/// is counted once per occurrence. This mirrors the any-match-per-slot definition used by ANN
/// benchmark tooling and can exceed a strict multiset intersection when rows hold duplicates.
///
/// `k` defaults to the smaller of the two row widths.
pub fn compute_recall(
    results: ArrayView2<usize>,
    ground_truth: ArrayView2<usize>,
    k: Option<usize>,
) -> Result<f64> {
    let recalls = per_query_recall(results, ground_truth, k)?;
    if recalls.is_empty() {
        return Ok(1_f64);
    }
    let recall = recalls.sum() / recalls.len() as f64;
    debug!(queries = recalls.len(), recall, "computed mean recall");
    Ok(recall)
}

/// Same as [`compute_recall`], without averaging over queries.
pub fn per_query_recall(
    results: ArrayView2<usize>,
    ground_truth: ArrayView2<usize>,
    k: Option<usize>,
) -> Result<Array1<f64>> {
    if results.nrows() != ground_truth.nrows() {
        return Err(DatasetError::shape_mismatch(
            "query count of results vs. ground truth",
            ground_truth.nrows(),
            results.nrows(),
        ));
    }

    let max = min(results.ncols(), ground_truth.ncols());
    let k = k.unwrap_or(max);
    if k == 0 || k > max {
        return Err(DatasetError::InvalidCutoff { k, max });
    }

    Ok(Zip::from(results.rows())
        .and(ground_truth.rows())
        .par_map_collect(|result, truth| query_recall(result, truth, k)))
}

fn query_recall(result: ArrayView1<usize>, truth: ArrayView1<usize>, k: usize) -> f64 {
    let truth = truth.slice(ndarray::s![..k]);
    let narrow = RoaringBitmap::from_iter(
        truth.iter().filter_map(|&id| u32::try_from(id).ok()));

    let recalled = result.iter()
        .take(k)
        .filter(|&&id| match u32::try_from(id) {
            Ok(id) => narrow.contains(id),
            Err(_) => truth.iter().any(|&t| t == id),
        })
        .count();
    recalled as f64 / k as f64
}

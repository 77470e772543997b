//! The call contract of an external ANN index, and a driver that runs one end to end
//! against a converted dataset.
//!
//! Graph construction, layout reordering, the on-disk format, and distance kernels all belong
//! to the index implementation. This module only feeds it matrices and scores what it returns.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};
use anyhow::anyhow;
use ndarray::{Array1, Array2, ArrayView2};
use tracing::info;
use crate::data::DatasetBundle;
use crate::error::{DatasetError, Result};
use crate::types::ground_truth::per_query_recall;
use crate::types::Metric;

/// Graph layout reordering algorithms an index may support.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum ReorderStrategy {
    Gorder,
    InDegree,
    OutDegree,
    Rcm,
    HubSort,
    HubCluster,
    Dbg,
}

impl ReorderStrategy {
    /// Returns the name index implementations know the strategy by.
    pub fn name(&self) -> &'static str {
        match self {
            ReorderStrategy::Gorder => "gorder",
            ReorderStrategy::InDegree => "in_deg",
            ReorderStrategy::OutDegree => "out_deg",
            ReorderStrategy::Rcm => "rcm",
            ReorderStrategy::HubSort => "hub_sort",
            ReorderStrategy::HubCluster => "hub_cluster",
            ReorderStrategy::Dbg => "DBG",
        }
    }
}

impl Display for ReorderStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ReorderStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gorder" => Ok(ReorderStrategy::Gorder),
            "in_deg" => Ok(ReorderStrategy::InDegree),
            "out_deg" => Ok(ReorderStrategy::OutDegree),
            "rcm" => Ok(ReorderStrategy::Rcm),
            "hub_sort" => Ok(ReorderStrategy::HubSort),
            "hub_cluster" => Ok(ReorderStrategy::HubCluster),
            "DBG" | "dbg" => Ok(ReorderStrategy::Dbg),
            _ => Err(anyhow!("'{}' is not a supported graph reordering algorithm", s)),
        }
    }
}

/// Parameters an index is constructed with.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IndexParams {
    pub metric: Metric,
    /// Maximum out-degree of a node in the graph.
    pub max_degree: usize,
    /// Beam width used while inserting points.
    pub ef_construction: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        IndexParams {
            metric: Metric::Euclidean,
            max_degree: 16,
            ef_construction: 100,
        }
    }
}

/// An approximate nearest neighbor index over `f32` vectors, labeled by row number.
pub trait AnnIndex: Sized {
    type Error: std::error::Error;

    /// Builds an index over the rows of `vectors`.
    fn build(vectors: ArrayView2<f32>, params: &IndexParams) -> std::result::Result<Self, Self::Error>;

    /// Relabels nodes to improve memory locality during search.
    fn reorder(&mut self, strategy: ReorderStrategy) -> std::result::Result<(), Self::Error>;

    fn persist(&self, path: &Path) -> std::result::Result<(), Self::Error>;

    fn load(path: &Path, params: &IndexParams) -> std::result::Result<Self, Self::Error>;

    /// Returns the ids of the `k` approximate nearest neighbors of every query row, one row per
    /// query, using a beam of width `ef_search`.
    fn search(&self, queries: ArrayView2<f32>, k: usize, ef_search: usize)
        -> std::result::Result<Array2<usize>, Self::Error>;
}

#[derive(PartialEq, Debug, Clone)]
pub struct BenchmarkConfig {
    pub index: IndexParams,
    pub ef_search: usize,
    /// Number of neighbors to retrieve and score.
    pub k: usize,
    pub reorder: Option<ReorderStrategy>,
    /// When set, the index is persisted here and reloaded before searching.
    pub index_path: Option<PathBuf>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            index: IndexParams::default(),
            ef_search: 100,
            k: 100,
            reorder: None,
            index_path: None,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct RecallReport {
    pub recall: f64,
    pub per_query: Array1<f64>,
    pub build_time: Duration,
    pub search_time: Duration,
}

impl Display for RecallReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Recall: {:.4} over {} queries (build {:.3}s, search {:.3}s)",
               self.recall, self.per_query.len(),
               self.build_time.as_secs_f64(), self.search_time.as_secs_f64())
    }
}

fn index_error<E: std::error::Error>(err: E) -> DatasetError {
    DatasetError::Index(err.to_string())
}

/// Builds an index of type `I` over the data points of `bundle`, searches it with the query
/// points, and scores the results against the bundle's ground truth.
pub fn run_benchmark<I: AnnIndex>(bundle: &DatasetBundle, config: &BenchmarkConfig) -> Result<RecallReport> {
    let ground_truth = bundle.ground_truth.to_ids()?;
    if config.k == 0 || config.k > ground_truth.ncols() {
        return Err(DatasetError::InvalidCutoff { k: config.k, max: ground_truth.ncols() });
    }
    let train = bundle.train.to_f32();
    let test = bundle.test.to_f32();

    let start = Instant::now();
    let mut index = I::build(train.view(), &config.index).map_err(index_error)?;
    if let Some(strategy) = config.reorder {
        index.reorder(strategy).map_err(index_error)?;
    }
    let build_time = start.elapsed();
    info!(points = train.nrows(), seconds = build_time.as_secs_f64(), "index built");

    if let Some(path) = config.index_path.as_ref() {
        index.persist(path).map_err(index_error)?;
        index = I::load(path, &config.index).map_err(index_error)?;
        info!(path = %path.display(), "index persisted and reloaded");
    }

    let start = Instant::now();
    let results = index.search(test.view(), config.k, config.ef_search).map_err(index_error)?;
    let search_time = start.elapsed();

    let per_query = per_query_recall(results.view(), ground_truth.view(), Some(config.k))?;
    let recall = if per_query.is_empty() { 1_f64 } else { per_query.sum() / per_query.len() as f64 };
    info!(queries = per_query.len(), recall, seconds = search_time.as_secs_f64(), "search finished");

    Ok(RecallReport { recall, per_query, build_time, search_time })
}

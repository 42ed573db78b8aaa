/*
 * File: /src/methods.rs
 * Created Date: Thursday, October 15th 2026
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-15		Zihan	Clustering methods and the per-dataset runner
 */

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use linfa::traits::{Fit, Predict};
use linfa_clustering::KMeans;
use log::{debug, error, info};
use ndarray::Array2;
use thiserror::Error;

use crate::index::DatasetRecord;
use crate::locate::result_path;
use crate::trajectory::{TableError, TrajectoryTable};

#[derive(Debug, Error)]
pub enum MethodError {
    #[error("unknown clustering method `{0}`")]
    Unknown(String),
    #[error("cannot form {k} clusters from {samples} trajectories")]
    InvalidK { k: usize, samples: usize },
    #[error("trajectories have different lengths: {0}")]
    Ragged(String),
    #[error("clustering failed: {0}")]
    Fit(String),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A clustering algorithm run with a fixed number of clusters.
pub trait ClusteringMethod: Send + Sync {
    fn name(&self) -> &str;

    /// One label per row of `features`, each in `0..k`.
    fn cluster(&self, features: &Array2<f64>, k: usize) -> Result<Vec<usize>, MethodError>;
}

/// k-means on the raw value series
#[derive(Debug, Clone)]
pub struct KMeansMethod {
    n_runs: usize,
    max_iter: u64,
    tol: f64,
}

impl Default for KMeansMethod {
    fn default() -> Self {
        Self {
            n_runs: 10,
            max_iter: 300,
            tol: 1e-4,
        }
    }
}

impl KMeansMethod {
    pub fn new(n_runs: usize, max_iter: u64, tol: f64) -> Self {
        Self {
            n_runs,
            max_iter,
            tol,
        }
    }
}

impl ClusteringMethod for KMeansMethod {
    fn name(&self) -> &str {
        "kmeans"
    }

    fn cluster(&self, features: &Array2<f64>, k: usize) -> Result<Vec<usize>, MethodError> {
        let samples = features.nrows();
        if k == 0 || k > samples {
            return Err(MethodError::InvalidK { k, samples });
        }

        let dataset = linfa::Dataset::from(features.clone());
        let model = KMeans::params(k)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_iter)
            .tolerance(self.tol)
            .fit(&dataset)
            .map_err(|e| MethodError::Fit(e.to_string()))?;

        Ok(model.predict(dataset.records()).to_vec())
    }
}

/// Built-in method for `name`
pub fn method_by_name(name: &str) -> Result<Box<dyn ClusteringMethod>, MethodError> {
    match name {
        "kmeans" => Ok(Box::new(KMeansMethod::default())),
        other => Err(MethodError::Unknown(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub planned: usize,
}

/// Runs one method over datasets and writes `{stem}.clust.tsv` next to each.
pub struct ClusterRunner {
    method: Box<dyn ClusteringMethod>,
    value_column: String,
    cluster_label_key: String,
    dry_run: bool,
}

impl ClusterRunner {
    pub fn new(method: Box<dyn ClusteringMethod>) -> Self {
        Self {
            method,
            value_column: "Y".to_string(),
            cluster_label_key: "cluster".to_string(),
            dry_run: false,
        }
    }

    pub fn with_value_column(mut self, column: &str) -> Self {
        self.value_column = column.to_string();
        self
    }

    pub fn with_cluster_label_key(mut self, key: &str) -> Self {
        self.cluster_label_key = key.to_string();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Cluster one dataset with k = its class count.
    ///
    /// Returns the output path, which is not written in dry-run mode.
    pub fn run_one(&self, record: &DatasetRecord) -> Result<PathBuf, MethodError> {
        let k = record.class_count;
        let out = result_path(record, self.method.name(), k);
        if self.dry_run {
            info!(
                "[method: {}] dry run: {} -> {}",
                self.method.name(),
                record.dataset_path.display(),
                out.display()
            );
            return Ok(out);
        }

        let table = TrajectoryTable::read_path(&record.dataset_path)?;
        let features = table.numeric_series(&self.value_column).map_err(|e| match e {
            TableError::Ragged { .. } => MethodError::Ragged(e.to_string()),
            other => MethodError::Table(other),
        })?;

        let start_time = Instant::now();
        let labels = self.method.cluster(&features, k)?;
        debug!(
            "[method: {}] {} trajectories x {} points clustered in {:?}",
            self.method.name(),
            features.nrows(),
            features.ncols(),
            start_time.elapsed()
        );

        let labels = labels.into_iter().map(|l| l.to_string()).collect();
        let table = table.with_column(&self.cluster_label_key, labels)?;
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        table.write_path(&out)?;
        Ok(out)
    }

    pub fn run(&self, records: &[DatasetRecord]) -> RunTally {
        let mut tally = RunTally::default();
        for record in records {
            tally.total += 1;
            match self.run_one(record) {
                Ok(_) if self.dry_run => tally.planned += 1,
                Ok(path) => {
                    tally.succeeded += 1;
                    info!(
                        "[method: {}] dataset #{} ✓ {}",
                        self.method.name(),
                        record.index,
                        path.display()
                    );
                }
                Err(e) => {
                    tally.failed += 1;
                    error!(
                        "[method: {}] dataset #{} ({}) failed: {}",
                        self.method.name(),
                        record.index,
                        record.describe(),
                        e
                    );
                }
            }
        }
        info!(
            "[method: {}] {} datasets: {} succeeded, {} failed, {} planned",
            self.method.name(),
            tally.total,
            tally.succeeded,
            tally.failed,
            tally.planned
        );
        tally
    }
}

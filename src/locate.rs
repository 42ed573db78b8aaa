/*
 * File: /src/locate.rs
 * Created Date: Wednesday, October 14th 2026
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-14		Zihan	Result locator over a pluggable label source
 */

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use log::{debug, warn};
use thiserror::Error;

use crate::index::DatasetRecord;
use crate::naming::{parse_method_dir, MethodTag, CLUSTERING_DIR};
use crate::trajectory::{TableError, TrajectoryTable};

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error(
        "{} has no `{column}` column (columns present: {})",
        .path.display(),
        .available.join(", ")
    )]
    MissingColumn {
        path: PathBuf,
        column: String,
        available: Vec<String>,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

/// Reads one label column from a table on disk (or anywhere else).
pub trait LabelSource: Send + Sync {
    fn load_labels(&self, path: &Path, column: &str) -> Result<Vec<String>, LabelError>;
}

/// Tab-separated files on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvLabelSource;

impl LabelSource for TsvLabelSource {
    fn load_labels(&self, path: &Path, column: &str) -> Result<Vec<String>, LabelError> {
        if !path.is_file() {
            return Err(LabelError::NotFound(path.to_path_buf()));
        }
        let table = TrajectoryTable::read_path(path).map_err(|source| LabelError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        table
            .column(column)
            .ok_or_else(|| LabelError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
                available: table.headers.clone(),
            })
    }
}

/// Canned label columns keyed by path, for runs without a filesystem
#[derive(Debug, Default)]
pub struct InMemoryLabelSource {
    tables: RwLock<HashMap<PathBuf, HashMap<String, Vec<String>>>>,
}

impl InMemoryLabelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, column: &str, labels: Vec<String>) {
        if let Ok(mut tables) = self.tables.write() {
            tables
                .entry(path.into())
                .or_default()
                .insert(column.to_string(), labels);
        }
    }
}

impl LabelSource for InMemoryLabelSource {
    fn load_labels(&self, path: &Path, column: &str) -> Result<Vec<String>, LabelError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| LabelError::NotFound(path.to_path_buf()))?;
        let table = tables
            .get(path)
            .ok_or_else(|| LabelError::NotFound(path.to_path_buf()))?;
        table.get(column).cloned().ok_or_else(|| {
            let mut available: Vec<String> = table.keys().cloned().collect();
            available.sort();
            LabelError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
                available,
            }
        })
    }
}

/// Why no predictions were available for a pair
#[derive(Debug, Clone, PartialEq)]
pub enum Absence {
    MissingFile(PathBuf),
    MissingColumn {
        path: PathBuf,
        available: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Located {
    Labels(Vec<String>),
    Absent(Absence),
}

/// `{stem}.clust.tsv` for a `{stem}.tsv` dataset
pub fn clustered_file_name(dataset_path: &Path) -> String {
    let name = dataset_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".tsv").unwrap_or(&name);
    format!("{stem}.clust.tsv")
}

/// `{dataset_dir}/clustering/{method}_k{k}/{stem}.clust.tsv`
pub fn result_path(record: &DatasetRecord, method: &str, k: usize) -> PathBuf {
    record
        .dataset_dir()
        .join(CLUSTERING_DIR)
        .join(MethodTag::new(method, k).dir_name())
        .join(clustered_file_name(&record.dataset_path))
}

pub struct ResultLocator {
    source: Arc<dyn LabelSource>,
    label_column: String,
}

impl ResultLocator {
    pub fn new(source: Arc<dyn LabelSource>, label_column: &str) -> Self {
        Self {
            source,
            label_column: label_column.to_string(),
        }
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Predicted labels for `method` run with k = class count.
    ///
    /// A missing file or label column is [`Located::Absent`]; anything else
    /// that goes wrong while reading is returned as an error.
    pub fn locate(&self, record: &DatasetRecord, method: &str) -> Result<Located, LabelError> {
        let path = result_path(record, method, record.class_count);
        match self.source.load_labels(&path, &self.label_column) {
            Ok(labels) => Ok(Located::Labels(labels)),
            Err(LabelError::NotFound(path)) => {
                debug!("[method: {}] no result at {}", method, path.display());
                Ok(Located::Absent(Absence::MissingFile(path)))
            }
            Err(LabelError::MissingColumn {
                path, available, ..
            }) => {
                warn!(
                    "[method: {}] {} lacks `{}`; columns present: {:?}",
                    method,
                    path.display(),
                    self.label_column,
                    available
                );
                Ok(Located::Absent(Absence::MissingColumn { path, available }))
            }
            Err(e) => Err(e),
        }
    }
}

/// Method names found in `clustering/{method}_k{K}` directories beside the
/// indexed datasets
pub fn discover_methods<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a DatasetRecord>,
{
    let dirs: BTreeSet<PathBuf> = records
        .into_iter()
        .map(|r| r.dataset_dir().join(CLUSTERING_DIR))
        .collect();

    let mut methods = BTreeSet::new();
    for dir in dirs {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(tag) = entry.file_name().to_str().and_then(parse_method_dir) {
                methods.insert(tag.method);
            }
        }
    }
    methods.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, class_count: usize) -> DatasetRecord {
        DatasetRecord {
            index: 1,
            class_count,
            function_combo: "a-b-c".into(),
            noise_level: 0.04,
            seed: 0,
            dataset_path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_result_path_flat_layout() {
        let r = record("input_trajs/8/3/0.04noise.a-b-c.200reps.0.tsv", 3);
        assert_eq!(
            result_path(&r, "gmm", 3),
            PathBuf::from("input_trajs/8/3/clustering/gmm_k3/0.04noise.a-b-c.200reps.0.clust.tsv")
        );
    }

    #[test]
    fn test_result_path_hierarchical_layout() {
        let r = record("data/3_classes/a-b-c/noise_0.04/seed_000/trajectories.tsv", 3);
        assert_eq!(
            result_path(&r, "kmeans", 3),
            PathBuf::from(
                "data/3_classes/a-b-c/noise_0.04/seed_000/clustering/kmeans_k3/trajectories.clust.tsv"
            )
        );
    }

    #[test]
    fn test_discover_methods_only_looks_beside_given_records() {
        let dir = tempfile::tempdir().unwrap();
        let three = record(dir.path().join("3/a.tsv").to_str().unwrap(), 3);
        let six = record(dir.path().join("6/b.tsv").to_str().unwrap(), 6);
        fs::create_dir_all(dir.path().join("3/clustering/gmm_k3")).unwrap();
        fs::create_dir_all(dir.path().join("6/clustering/spectral_k6")).unwrap();
        fs::create_dir_all(dir.path().join("6/clustering/kmeans_k6")).unwrap();

        assert_eq!(discover_methods([&three]), vec!["gmm"]);
        assert_eq!(discover_methods(&[three, six]), vec!["gmm", "kmeans", "spectral"]);
    }

    #[test]
    fn test_locate_distinguishes_absences() {
        let r = record("d/3/x.tsv", 3);
        let source = Arc::new(InMemoryLabelSource::new());
        source.insert(result_path(&r, "gmm", 3), "ID", vec!["t0".into()]);
        source.insert(result_path(&r, "kmeans", 3), "cluster", vec!["0".into()]);
        let locator = ResultLocator::new(source, "cluster");

        assert_eq!(
            locator.locate(&r, "kmeans").unwrap(),
            Located::Labels(vec!["0".into()])
        );
        assert!(matches!(
            locator.locate(&r, "gmm").unwrap(),
            Located::Absent(Absence::MissingColumn { ref available, .. }) if available == &vec!["ID".to_string()]
        ));
        assert!(matches!(
            locator.locate(&r, "spectral").unwrap(),
            Located::Absent(Absence::MissingFile(_))
        ));
    }
}

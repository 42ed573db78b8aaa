//! # Dataset index
//!
//! Walks a data directory, parses every candidate trajectory file and assigns
//! stable 1-based indices. Job-array schedulers address datasets purely by that
//! integer, so ordering is fixed: (class count, function combo, noise, seed).

/*
 * File: /src/index.rs
 * Created Date: Tuesday, October 13th 2026
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-13		Zihan	Directory walk, ordering and TSV persistence
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::naming::{DatasetParams, ParseError, PathParser};

/// One discovered simulated dataset. Field order is the index table layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub index: usize,
    #[serde(rename = "num_classes")]
    pub class_count: usize,
    pub function_combo: String,
    pub noise_level: f64,
    pub seed: u64,
    pub dataset_path: PathBuf,
}

impl DatasetRecord {
    pub fn dataset_dir(&self) -> &Path {
        self.dataset_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// `3_classes/exponential-norm/noise_0.04/seed_000`
    pub fn describe(&self) -> String {
        format!(
            "{}_classes/{}/noise_{:.2}/seed_{:03}",
            self.class_count, self.function_combo, self.noise_level, self.seed
        )
    }

    fn key_cmp(&self, other: &Self) -> Ordering {
        self.class_count
            .cmp(&other.class_count)
            .then_with(|| self.function_combo.cmp(&other.function_combo))
            .then_with(|| self.noise_level.total_cmp(&other.noise_level))
            .then_with(|| self.seed.cmp(&other.seed))
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("data directory {} does not exist", .0.display())]
    RootMissing(PathBuf),
    #[error(
        "no datasets found under {} matching `{pattern}` ({rejected} files failed to parse)",
        .root.display()
    )]
    NoDatasets {
        root: PathBuf,
        pattern: String,
        rejected: usize,
    },
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("no dataset with index {requested} (index has {len} datasets, 1-based)")]
    UnknownIndex { requested: usize, len: usize },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A file the indexer had to leave out
#[derive(Debug, Clone)]
pub struct Rejected {
    pub path: PathBuf,
    pub error: ParseError,
}

/// Ordered, duplicate-free dataset enumeration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetIndex {
    records: Vec<DatasetRecord>,
}

impl DatasetIndex {
    /// Sort, drop duplicate keys (first path wins) and number from 1.
    ///
    /// Returns the index and the number of duplicates dropped.
    pub fn from_params(found: Vec<(DatasetParams, PathBuf)>) -> (Self, usize) {
        let mut records: Vec<DatasetRecord> = found
            .into_iter()
            .map(|(p, path)| DatasetRecord {
                index: 0,
                class_count: p.class_count,
                function_combo: p.function_combo,
                noise_level: p.noise_level,
                seed: p.seed,
                dataset_path: path,
            })
            .collect();
        records.sort_by(|a, b| a.key_cmp(b).then_with(|| a.dataset_path.cmp(&b.dataset_path)));

        let before = records.len();
        records.dedup_by(|later, kept| {
            let same = later.key_cmp(kept) == Ordering::Equal;
            if same {
                warn!(
                    "{} duplicates dataset {} ({}), skipping",
                    later.dataset_path.display(),
                    kept.describe(),
                    kept.dataset_path.display()
                );
            }
            same
        });
        let duplicates = before - records.len();

        for (i, record) in records.iter_mut().enumerate() {
            record.index = i + 1;
        }
        (Self { records }, duplicates)
    }

    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a 1-based job index.
    pub fn get(&self, index: usize) -> Result<&DatasetRecord, IndexError> {
        index
            .checked_sub(1)
            .and_then(|i| self.records.get(i))
            .ok_or(IndexError::UnknownIndex {
                requested: index,
                len: self.records.len(),
            })
    }

    pub fn counts_by_class(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.class_count).or_insert(0) += 1;
        }
        counts
    }

    pub fn write_path(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        self.to_writer(fs::File::create(path)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), IndexError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn read_path(path: &Path) -> Result<Self, IndexError> {
        Self::from_reader(fs::File::open(path)?)
    }

    /// Read a persisted index back. Rows keep the indices written in the file.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IndexError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(reader);
        let records = rdr
            .deserialize()
            .collect::<Result<Vec<DatasetRecord>, _>>()?;
        Ok(Self { records })
    }
}

/// What one indexing pass found
#[derive(Debug)]
pub struct IndexOutcome {
    pub index: DatasetIndex,
    pub rejected: Vec<Rejected>,
    pub duplicates: usize,
}

pub struct DatasetIndexer {
    root: PathBuf,
    pattern: String,
    exclude_dirs: Vec<String>,
    parser: PathParser,
}

impl DatasetIndexer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: "**/*.tsv".to_string(),
            exclude_dirs: vec!["sample".to_string()],
            parser: PathParser::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }

    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    pub fn with_parser(mut self, parser: PathParser) -> Self {
        self.parser = parser;
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .iter()
            .filter_map(|c| c.to_str())
            .any(|c| self.exclude_dirs.iter().any(|d| d == c))
    }

    /// Discover every dataset under the root.
    ///
    /// Unparseable files are logged and collected in [`IndexOutcome::rejected`].
    /// A missing root or an empty result is an error.
    pub fn discover(&self) -> Result<IndexOutcome, IndexError> {
        if !self.root.is_dir() {
            return Err(IndexError::RootMissing(self.root.clone()));
        }

        let full_pattern = self.root.join(&self.pattern);
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in glob::glob(&full_pattern.to_string_lossy())? {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => warn!("cannot read {}: {}", e.path().display(), e.error()),
            }
        }
        paths.sort();

        let mut found = Vec::new();
        let mut rejected = Vec::new();
        for path in paths {
            if !path.is_file() || self.is_excluded(&path) {
                continue;
            }
            match self.parser.parse(&path) {
                Ok(parsed) if parsed.result.is_some() => {
                    debug!("skipping clustering output {}", path.display());
                }
                Ok(parsed) => found.push((parsed.params, path)),
                Err(error) => {
                    warn!("skipping {}: {}", path.display(), error);
                    rejected.push(Rejected { path, error });
                }
            }
        }

        let (index, duplicates) = DatasetIndex::from_params(found);
        if index.is_empty() {
            return Err(IndexError::NoDatasets {
                root: self.root.clone(),
                pattern: self.pattern.clone(),
                rejected: rejected.len(),
            });
        }

        info!(
            "Indexed {} datasets under {} ({} rejected, {} duplicates)",
            index.len(),
            self.root.display(),
            rejected.len(),
            duplicates
        );
        Ok(IndexOutcome {
            index,
            rejected,
            duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(class_count: usize, combo: &str, noise: f64, seed: u64) -> DatasetParams {
        DatasetParams {
            class_count,
            function_combo: combo.to_string(),
            noise_level: noise,
            seed,
        }
    }

    #[test]
    fn test_from_params_orders_and_numbers() {
        let found = vec![
            (params(6, "a-b", 0.0, 0), PathBuf::from("d")),
            (params(3, "b-c", 0.1, 1), PathBuf::from("c")),
            (params(3, "b-c", 0.04, 2), PathBuf::from("b")),
            (params(3, "a-b", 0.2, 0), PathBuf::from("a")),
        ];
        let (index, dupes) = DatasetIndex::from_params(found);
        assert_eq!(dupes, 0);
        let order: Vec<&str> = index
            .records()
            .iter()
            .map(|r| r.dataset_path.to_str().unwrap())
            .collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
        let indices: Vec<usize> = index.records().iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_from_params_drops_duplicate_keys() {
        let found = vec![
            (params(3, "a-b", 0.1, 0), PathBuf::from("z")),
            (params(3, "a-b", 0.1, 0), PathBuf::from("y")),
        ];
        let (index, dupes) = DatasetIndex::from_params(found);
        assert_eq!(dupes, 1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.records()[0].dataset_path, PathBuf::from("y"));
    }

    #[test]
    fn test_tsv_roundtrip_keeps_header() {
        let (index, _) = DatasetIndex::from_params(vec![(
            params(3, "exponential-norm", 0.04, 0),
            PathBuf::from("input_trajs/8/3/0.04noise.exponential-norm.200reps.0.tsv"),
        )]);
        let mut out = Vec::new();
        index.to_writer(&mut out).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.starts_with(
            "index\tnum_classes\tfunction_combo\tnoise_level\tseed\tdataset_path\n"
        ));
        let reread = DatasetIndex::from_reader(out.as_slice()).unwrap();
        assert_eq!(reread, index);
    }

    #[test]
    fn test_get_is_one_based() {
        let (index, _) =
            DatasetIndex::from_params(vec![(params(3, "a-b", 0.0, 0), PathBuf::from("a"))]);
        assert_eq!(index.get(1).unwrap().dataset_path, PathBuf::from("a"));
        assert!(matches!(
            index.get(0),
            Err(IndexError::UnknownIndex { requested: 0, len: 1 })
        ));
        assert!(index.get(2).is_err());
    }

    #[test]
    fn test_describe() {
        let (index, _) =
            DatasetIndex::from_params(vec![(params(3, "a-b", 0.04, 7), PathBuf::from("a"))]);
        assert_eq!(index.records()[0].describe(), "3_classes/a-b/noise_0.04/seed_007");
    }
}

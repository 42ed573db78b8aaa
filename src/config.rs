/*
 * File: /src/config.rs
 * Created Date: Friday, January 26th 2024
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-16		Zihan	Run configuration: JSON file, flags and environment
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::parse_batch;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid batch `{0}`, expected a class count such as `3` or `3_classes`")]
    InvalidBatch(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // 数据根目录
    pub data_dir: PathBuf,
    pub dataset_glob: String,
    pub exclude_dirs: Vec<String>,
    // empty: discover from clustering/ directories
    pub methods: Vec<String>,
    pub batch: Option<usize>,
    pub true_label_key: String,
    pub cluster_label_key: String,
    // series column fed to clustering methods
    pub value_column: String,
    pub index_output: PathBuf,
    pub scores_output: PathBuf,
    pub summary_output: Option<PathBuf>,
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dataset_glob: "**/*.tsv".to_string(),
            exclude_dirs: vec!["sample".to_string()],
            methods: Vec::new(),
            batch: None,
            true_label_key: "func".to_string(),
            cluster_label_key: "cluster".to_string(),
            value_column: "Y".to_string(),
            index_output: PathBuf::from("dataset_index.tsv"),
            scores_output: PathBuf::from("vmeasure_scores.tsv"),
            summary_output: None,
            parallel: false,
        }
    }
}

impl Config {
    /// Read a JSON config; keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the `--config` file if given, then flags and their
    /// environment fallbacks.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, ConfigError> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_matches(matches)?;
        Ok(config)
    }

    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), ConfigError> {
        if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
            self.data_dir = dir.clone();
        }
        if let Some(glob) = matches.get_one::<String>("glob") {
            self.dataset_glob = glob.clone();
        }
        if let Some(dirs) = matches.get_many::<String>("exclude") {
            self.exclude_dirs = dirs.cloned().collect();
        }
        if let Some(methods) = matches.get_many::<String>("methods") {
            self.methods = methods
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
        }
        if let Some(batch) = matches.get_one::<String>("batch") {
            let class_count =
                parse_batch(batch).ok_or_else(|| ConfigError::InvalidBatch(batch.clone()))?;
            self.batch = Some(class_count);
        }
        if let Some(key) = matches.get_one::<String>("true-label-key") {
            self.true_label_key = key.clone();
        }
        if let Some(key) = matches.get_one::<String>("cluster-label-key") {
            self.cluster_label_key = key.clone();
        }
        if let Some(column) = matches.get_one::<String>("value-column") {
            self.value_column = column.clone();
        }
        if let Some(path) = matches.get_one::<PathBuf>("index-output") {
            self.index_output = path.clone();
        }
        if let Some(path) = matches.get_one::<PathBuf>("scores-output") {
            self.scores_output = path.clone();
        }
        if let Some(path) = matches.get_one::<PathBuf>("summary-output") {
            self.summary_output = Some(path.clone());
        }
        if matches.get_flag("parallel") {
            self.parallel = true;
        }
        Ok(())
    }

    /// Summary table path, `vmeasure_summary.tsv` beside the scores table
    /// unless set.
    pub fn summary_output(&self) -> PathBuf {
        self.summary_output
            .clone()
            .unwrap_or_else(|| self.scores_output.with_file_name("vmeasure_summary.tsv"))
    }
}

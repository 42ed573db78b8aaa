//! # Evaluation pipeline
//!
//! Scores every (dataset, method) pair. Each pair ends in exactly one of three
//! outcomes (scored, skipped, failed), and the per-pair outcomes are folded
//! into one accumulator so `scored + skipped + failed == total` always holds.

/*
 * File: /src/pipeline.rs
 * Created Date: Monday, May 26th 2025
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-15		Zihan	Rewritten around dataset x method evaluation
 */

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::index::DatasetRecord;
use crate::locate::{discover_methods, result_path, Absence, LabelSource, Located, ResultLocator, TsvLabelSource};
use crate::report::{summarize, MethodSummary};
use crate::scoring::{score_labels, ClusteringMetrics};

/// Pipeline配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Methods to evaluate; empty means discover them on disk
    pub methods: Vec<String>,
    /// Only evaluate datasets with this class count
    pub class_filter: Option<usize>,
    /// Ground-truth label column in dataset files
    pub true_label_key: String,
    /// Predicted label column in clustering outputs
    pub cluster_label_key: String,
    /// Evaluate datasets on the rayon pool
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            class_filter: None,
            true_label_key: "func".to_string(),
            cluster_label_key: "cluster".to_string(),
            parallel: false,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            methods: config.methods.clone(),
            class_filter: config.batch,
            true_label_key: config.true_label_key.clone(),
            cluster_label_key: config.cluster_label_key.clone(),
            parallel: config.parallel,
        }
    }
}

/// One scored (dataset, method) pair. Field order is the scores table layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    #[serde(skip)]
    pub dataset_index: usize,
    pub method: String,
    #[serde(rename = "num_classes")]
    pub class_count: usize,
    pub function_combo: String,
    pub noise_level: f64,
    pub seed: u64,
    pub k_detected: usize,
    pub k_correct: bool,
    pub nvi: f64,
    pub v_measure: f64,
    pub homogeneity: f64,
    pub completeness: f64,
    pub f_measure: f64,
    pub ari: f64,
}

impl MetricResult {
    pub fn new(record: &DatasetRecord, method: &str, metrics: ClusteringMetrics) -> Self {
        Self {
            dataset_index: record.index,
            method: method.to_string(),
            class_count: record.class_count,
            function_combo: record.function_combo.clone(),
            noise_level: record.noise_level,
            seed: record.seed,
            k_detected: metrics.k_detected,
            k_correct: metrics.k_detected == record.class_count,
            nvi: metrics.nvi,
            v_measure: metrics.v_measure,
            homogeneity: metrics.homogeneity,
            completeness: metrics.completeness,
            f_measure: metrics.f_measure,
            ari: metrics.ari,
        }
    }
}

/// Context for a pair that could not be scored for an unexpected reason
#[derive(Debug, Clone, PartialEq)]
pub struct PairFailure {
    pub dataset_index: usize,
    pub method: String,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Scored(MetricResult),
    Skipped(Absence),
    Failed(PairFailure),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub scored: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    pub fn is_balanced(&self) -> bool {
        self.scored + self.skipped + self.failed == self.total
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    rows: Vec<MetricResult>,
    failures: Vec<PairFailure>,
    tally: Tally,
}

impl Accumulator {
    fn absorb(mut self, outcome: PairOutcome) -> Self {
        self.tally.total += 1;
        match outcome {
            PairOutcome::Scored(row) => {
                self.tally.scored += 1;
                self.rows.push(row);
            }
            PairOutcome::Skipped(_) => self.tally.skipped += 1,
            PairOutcome::Failed(failure) => {
                self.tally.failed += 1;
                self.failures.push(failure);
            }
        }
        self
    }

    fn finish(self, methods: Vec<String>, duration: Duration) -> EvaluationReport {
        let summaries = summarize(&self.rows);
        EvaluationReport {
            methods,
            rows: self.rows,
            failures: self.failures,
            summaries,
            tally: self.tally,
            duration,
        }
    }
}

/// Everything one evaluation run produced
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub methods: Vec<String>,
    pub rows: Vec<MetricResult>,
    pub failures: Vec<PairFailure>,
    pub summaries: Vec<MethodSummary>,
    pub tally: Tally,
    pub duration: Duration,
}

impl EvaluationReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Total pairs: {}\nScored: {}\nSkipped: {}\nFailed: {}",
            self.tally.total, self.tally.scored, self.tally.skipped, self.tally.failed
        );
        for s in &self.summaries {
            summary.push_str(&format!(
                "\n  {:12} n={:<4} ARI={:.3} V={:.3} NVI={:.3} k_correct={:.3}",
                s.method, s.count, s.ari_mean, s.v_measure_mean, s.nvi_mean, s.k_correct_mean
            ));
        }
        summary
    }
}

/// Dataset x method evaluation
pub struct EvaluationPipeline {
    ground_truth: Arc<dyn LabelSource>,
    locator: ResultLocator,
    config: PipelineConfig,
}

impl EvaluationPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Configured methods, or those found on disk when none are configured.
    pub fn resolve_methods(&self, records: &[&DatasetRecord]) -> Vec<String> {
        if !self.config.methods.is_empty() {
            return self.config.methods.clone();
        }
        let found = discover_methods(records.iter().copied());
        if found.is_empty() {
            warn!("No methods configured and no clustering directories found");
        } else {
            info!("Discovered methods: {}", found.join(", "));
        }
        found
    }

    pub fn run(&self, records: &[DatasetRecord]) -> EvaluationReport {
        let start_time = Instant::now();

        let selected: Vec<&DatasetRecord> = records
            .iter()
            .filter(|r| self.config.class_filter.map_or(true, |k| r.class_count == k))
            .collect();
        let methods = self.resolve_methods(&selected);
        info!(
            "Evaluating {} datasets x {} methods ({} pairs)",
            selected.len(),
            methods.len(),
            selected.len() * methods.len()
        );

        let per_dataset: Vec<Vec<PairOutcome>> = if self.config.parallel {
            selected
                .par_iter()
                .map(|record| self.evaluate_dataset(record, &methods))
                .collect()
        } else {
            selected
                .iter()
                .map(|record| self.evaluate_dataset(record, &methods))
                .collect()
        };

        let report = per_dataset
            .into_iter()
            .flatten()
            .fold(Accumulator::default(), Accumulator::absorb)
            .finish(methods, start_time.elapsed());

        info!(
            "Evaluation completed in {:?}: {} scored, {} skipped, {} failed of {} pairs",
            report.duration,
            report.tally.scored,
            report.tally.skipped,
            report.tally.failed,
            report.tally.total
        );
        report
    }

    /// All pairs for one dataset. Ground truth is read once and shared.
    pub fn evaluate_dataset(&self, record: &DatasetRecord, methods: &[String]) -> Vec<PairOutcome> {
        let truth = match self
            .ground_truth
            .load_labels(&record.dataset_path, &self.config.true_label_key)
        {
            Ok(truth) => truth,
            Err(e) => {
                return methods
                    .iter()
                    .map(|method| {
                        self.failure(record, method, record.dataset_path.clone(), format!("ground truth unreadable: {}", e))
                    })
                    .collect();
            }
        };

        methods
            .iter()
            .map(|method| self.evaluate_pair(record, &truth, method))
            .collect()
    }

    pub fn evaluate_pair(&self, record: &DatasetRecord, truth: &[String], method: &str) -> PairOutcome {
        let predicted = match self.locator.locate(record, method) {
            Ok(Located::Labels(labels)) => labels,
            Ok(Located::Absent(absence)) => return PairOutcome::Skipped(absence),
            Err(e) => {
                let path = result_path(record, method, record.class_count);
                return self.failure(record, method, path, e.to_string());
            }
        };

        match score_labels(truth, &predicted) {
            Ok(metrics) => {
                debug!(
                    "[method: {}] {} ✓ (ARI={:.3}, V={:.3})",
                    method,
                    record.describe(),
                    metrics.ari,
                    metrics.v_measure
                );
                PairOutcome::Scored(MetricResult::new(record, method, metrics))
            }
            Err(e) => {
                let path = result_path(record, method, record.class_count);
                self.failure(record, method, path, e.to_string())
            }
        }
    }

    fn failure(&self, record: &DatasetRecord, method: &str, path: PathBuf, reason: String) -> PairOutcome {
        error!(
            "[method: {}] dataset #{} ({}) failed at {}: {}",
            method,
            record.index,
            record.describe(),
            path.display(),
            reason
        );
        PairOutcome::Failed(PairFailure {
            dataset_index: record.index,
            method: method.to_string(),
            path,
            reason,
        })
    }
}

/// Pipeline构建器
pub struct PipelineBuilder {
    ground_truth: Option<Arc<dyn LabelSource>>,
    results: Option<Arc<dyn LabelSource>>,
    config: PipelineConfig,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            ground_truth: None,
            results: None,
            config: PipelineConfig::default(),
        }
    }

    /// Use one source for both ground truth and clustering outputs.
    pub fn with_label_source(mut self, source: Arc<dyn LabelSource>) -> Self {
        self.ground_truth = Some(source.clone());
        self.results = Some(source);
        self
    }

    pub fn with_ground_truth_source(mut self, source: Arc<dyn LabelSource>) -> Self {
        self.ground_truth = Some(source);
        self
    }

    pub fn with_result_source(mut self, source: Arc<dyn LabelSource>) -> Self {
        self.results = Some(source);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn methods(mut self, methods: Vec<String>) -> Self {
        self.config.methods = methods;
        self
    }

    pub fn class_filter(mut self, class_count: Option<usize>) -> Self {
        self.config.class_filter = class_count;
        self
    }

    pub fn true_label_key(mut self, key: &str) -> Self {
        self.config.true_label_key = key.to_string();
        self
    }

    pub fn cluster_label_key(mut self, key: &str) -> Self {
        self.config.cluster_label_key = key.to_string();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Unset sources default to tab-separated files on disk.
    pub fn build(self) -> EvaluationPipeline {
        let ground_truth = self
            .ground_truth
            .unwrap_or_else(|| Arc::new(TsvLabelSource));
        let results = self.results.unwrap_or_else(|| Arc::new(TsvLabelSource));
        EvaluationPipeline {
            ground_truth,
            locator: ResultLocator::new(results, &self.config.cluster_label_key),
            config: self.config,
        }
    }
}

/*
 * File: ./src/scoring.rs
 * Created Date: Monday, May 26th 2025
 * Author: Zihan
 * -----
 * Last Modified: Thursday, 15th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-15		Zihan	Agreement metrics between ground truth and predicted labels
**/
// src/scoring.rs
//! Clustering agreement metrics.
//!
//! Every metric is computed from one contingency table. A metric whose
//! denominator vanishes (a labeling with a single distinct value, or too few
//! samples) is reported as `NaN` instead of an error, so the other metrics for
//! the same pair are still available.

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use thiserror::Error;

use crate::util::{count_distinct, encode_labels};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusteringMetrics {
    /// Distinct predicted labels
    pub k_detected: usize,
    pub v_measure: f64,
    pub homogeneity: f64,
    pub completeness: f64,
    /// Adjusted Rand index
    pub ari: f64,
    /// 1 - normalized mutual information
    pub nvi: f64,
    /// Support-weighted F1 with labels matched by literal value
    pub f_measure: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("label sequences differ in length: {truth} ground-truth vs {predicted} predicted")]
    LengthMismatch { truth: usize, predicted: usize },
}

/// Class (rows) by cluster (columns) co-occurrence counts
#[derive(Debug, Clone)]
pub struct Contingency {
    table: Array2<f64>,
    class_sums: Array1<f64>,
    cluster_sums: Array1<f64>,
    n: f64,
}

impl Contingency {
    pub fn new<S: AsRef<str>>(truth: &[S], predicted: &[S]) -> Result<Self, ScoreError> {
        if truth.len() != predicted.len() {
            return Err(ScoreError::LengthMismatch {
                truth: truth.len(),
                predicted: predicted.len(),
            });
        }

        let (classes, class_names) = encode_labels(truth);
        let (clusters, cluster_names) = encode_labels(predicted);

        let mut table = Array2::<f64>::zeros((class_names.len(), cluster_names.len()));
        for (&c, &k) in classes.iter().zip(clusters.iter()) {
            table[[c, k]] += 1.0;
        }

        Ok(Self {
            class_sums: table.sum_axis(Axis(1)),
            cluster_sums: table.sum_axis(Axis(0)),
            n: truth.len() as f64,
            table,
        })
    }

    pub fn n_classes(&self) -> usize {
        self.class_sums.len()
    }

    pub fn n_clusters(&self) -> usize {
        self.cluster_sums.len()
    }

    pub fn class_entropy(&self) -> f64 {
        entropy(&self.class_sums, self.n)
    }

    pub fn cluster_entropy(&self) -> f64 {
        entropy(&self.cluster_sums, self.n)
    }

    pub fn mutual_information(&self) -> f64 {
        let n = self.n;
        let mut mi = 0.0;
        for ((i, j), &n_ij) in self.table.indexed_iter() {
            if n_ij > 0.0 {
                let a = self.class_sums[i];
                let b = self.cluster_sums[j];
                mi += (n_ij / n) * ((n * n_ij) / (a * b)).ln();
            }
        }
        mi.max(0.0)
    }

    /// (homogeneity, completeness, v-measure)
    pub fn homogeneity_completeness_v_measure(&self) -> (f64, f64, f64) {
        let mi = self.mutual_information();
        let h_class = self.class_entropy();
        let h_cluster = self.cluster_entropy();

        let homogeneity = if h_class > 0.0 { mi / h_class } else { f64::NAN };
        let completeness = if h_cluster > 0.0 { mi / h_cluster } else { f64::NAN };
        let v_measure = if homogeneity.is_nan() || completeness.is_nan() {
            f64::NAN
        } else if homogeneity + completeness == 0.0 {
            0.0
        } else {
            2.0 * homogeneity * completeness / (homogeneity + completeness)
        };

        (homogeneity, completeness, v_measure)
    }

    /// Mutual information normalised by the arithmetic mean of both entropies
    pub fn normalized_mutual_information(&self) -> f64 {
        let normalizer = (self.class_entropy() + self.cluster_entropy()) / 2.0;
        if normalizer > 0.0 {
            self.mutual_information() / normalizer
        } else {
            f64::NAN
        }
    }

    pub fn adjusted_rand_index(&self) -> f64 {
        let sum_comb_c: f64 = self.table.iter().map(|&v| comb2(v)).sum();
        let sum_comb_a: f64 = self.class_sums.iter().map(|&v| comb2(v)).sum();
        let sum_comb_b: f64 = self.cluster_sums.iter().map(|&v| comb2(v)).sum();
        let n_comb = comb2(self.n);
        if n_comb == 0.0 {
            return f64::NAN;
        }

        let expected_index = sum_comb_a * sum_comb_b / n_comb;
        let max_index = (sum_comb_a + sum_comb_b) / 2.0;
        if max_index - expected_index == 0.0 {
            return f64::NAN;
        }
        (sum_comb_c - expected_index) / (max_index - expected_index)
    }
}

fn comb2(n: f64) -> f64 {
    if n < 2.0 {
        0.0
    } else {
        n * (n - 1.0) / 2.0
    }
}

fn entropy(counts: &Array1<f64>, n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| (c / n) * (n / c).ln())
        .sum()
}

/// Weighted F1 treating both labelings as classifier output: a predicted
/// label only counts as correct when it is literally equal to the true one.
pub fn weighted_f_measure<S: AsRef<str>>(truth: &[S], predicted: &[S]) -> f64 {
    let n = truth.len();
    if n == 0 || n != predicted.len() {
        return f64::NAN;
    }

    let labels: Vec<&str> = truth
        .iter()
        .chain(predicted.iter())
        .map(AsRef::as_ref)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut weighted = 0.0;
    for label in labels {
        let mut tp = 0usize;
        let mut support = 0usize;
        let mut predicted_count = 0usize;
        for (t, p) in truth.iter().zip(predicted.iter()) {
            let (t, p) = (t.as_ref() == label, p.as_ref() == label);
            support += t as usize;
            predicted_count += p as usize;
            tp += (t && p) as usize;
        }
        if support == 0 {
            continue;
        }
        let precision = if predicted_count > 0 {
            tp as f64 / predicted_count as f64
        } else {
            0.0
        };
        let recall = tp as f64 / support as f64;
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        weighted += f1 * support as f64;
    }
    weighted / n as f64
}

/// Score one predicted labeling against ground truth.
pub fn score_labels<S: AsRef<str>>(
    truth: &[S],
    predicted: &[S],
) -> Result<ClusteringMetrics, ScoreError> {
    let contingency = Contingency::new(truth, predicted)?;
    let (homogeneity, completeness, v_measure) =
        contingency.homogeneity_completeness_v_measure();

    Ok(ClusteringMetrics {
        k_detected: count_distinct(predicted),
        v_measure,
        homogeneity,
        completeness,
        ari: contingency.adjusted_rand_index(),
        nvi: 1.0 - contingency.normalized_mutual_information(),
        f_measure: weighted_f_measure(truth, predicted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn labels(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_labelings() {
        let truth = labels(&["a", "a", "b", "b", "c", "c"]);
        let m = score_labels(&truth, &truth).unwrap();
        assert!((m.v_measure - 1.0).abs() < EPS);
        assert!((m.homogeneity - 1.0).abs() < EPS);
        assert!((m.completeness - 1.0).abs() < EPS);
        assert!((m.ari - 1.0).abs() < EPS);
        assert!(m.nvi.abs() < EPS);
        assert!((m.f_measure - 1.0).abs() < EPS);
        assert_eq!(m.k_detected, 3);
    }

    #[test]
    fn test_relabeled_partition_is_perfect_except_f_measure() {
        let truth = labels(&["a", "a", "b", "b"]);
        let pred = labels(&["1", "1", "0", "0"]);
        let m = score_labels(&truth, &pred).unwrap();
        assert!((m.v_measure - 1.0).abs() < 1e-9);
        assert!((m.ari - 1.0).abs() < 1e-9);
        assert!(m.nvi.abs() < 1e-9);
        assert_eq!(m.f_measure, 0.0);
    }

    #[test]
    fn test_single_predicted_cluster() {
        let truth = labels(&["a", "a", "b", "b", "c", "c"]);
        let pred = labels(&["0"; 6]);
        let m = score_labels(&truth, &pred).unwrap();
        assert_eq!(m.homogeneity, 0.0);
        assert!(m.completeness.is_nan());
        assert!(m.v_measure.is_nan());
        assert_eq!(m.k_detected, 1);
        assert!(m.ari.abs() < EPS);
        assert!((m.nvi - 1.0).abs() < EPS);
    }

    #[test]
    fn test_merged_classes() {
        let truth = labels(&["A", "A", "B", "B", "C", "C"]);
        let pred = labels(&["1", "1", "1", "1", "2", "2"]);
        let m = score_labels(&truth, &pred).unwrap();
        assert!(m.ari < 1.0);
        assert!(m.homogeneity < 1.0);
        assert!((m.completeness - 1.0).abs() < EPS);
        assert_eq!(m.k_detected, 2);
    }

    #[test]
    fn test_known_ari_value() {
        // sklearn: adjusted_rand_score([0,0,1,1], [0,0,1,2]) == 0.5714285714285715
        let truth = labels(&["0", "0", "1", "1"]);
        let pred = labels(&["0", "0", "1", "2"]);
        let m = score_labels(&truth, &pred).unwrap();
        assert!((m.ari - 0.571_428_571_428_571_5).abs() < 1e-12);
    }

    #[test]
    fn test_both_single_label_is_undefined() {
        let truth = labels(&["a", "a", "a"]);
        let m = score_labels(&truth, &truth).unwrap();
        assert!(m.homogeneity.is_nan());
        assert!(m.completeness.is_nan());
        assert!(m.nvi.is_nan());
        assert!(m.ari.is_nan());
        assert!((m.f_measure - 1.0).abs() < EPS);
    }

    #[test]
    fn test_weighted_f_measure_literal_match() {
        let truth = labels(&["0", "0", "1", "1"]);
        let pred = labels(&["0", "1", "1", "1"]);
        // label 0: p=1, r=0.5, f1=2/3; label 1: p=2/3, r=1, f1=0.8
        let expected = (2.0 / 3.0 * 2.0 + 0.8 * 2.0) / 4.0;
        assert!((weighted_f_measure(&truth, &pred) - expected).abs() < EPS);
    }

    #[test]
    fn test_length_mismatch() {
        let err = score_labels(&labels(&["a"]), &labels(&["a", "b"])).unwrap_err();
        assert_eq!(err, ScoreError::LengthMismatch { truth: 1, predicted: 2 });
    }

    #[test]
    fn test_contingency_shape() {
        let c = Contingency::new(&["x", "y", "y"], &["1", "1", "2"]).unwrap();
        assert_eq!(c.n_classes(), 2);
        assert_eq!(c.n_clusters(), 2);
    }
}

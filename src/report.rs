/*
 * File: /src/report.rs
 * Created Date: Thursday, October 15th 2026
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-15		Zihan	Score tables and per-method rollups
 */

//! Score tables and per-method rollups.
//!
//! Not-a-number metric values are written as `NaN` and left out of the
//! summary mean and standard deviation of that metric.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

use crate::pipeline::MetricResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-method rollup. Standard deviations are sample deviations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub method: String,
    pub count: usize,
    pub ari_mean: f64,
    pub ari_std: f64,
    pub v_measure_mean: f64,
    pub v_measure_std: f64,
    pub v_measure_min: f64,
    pub v_measure_max: f64,
    pub nvi_mean: f64,
    pub nvi_std: f64,
    pub homogeneity_mean: f64,
    pub homogeneity_std: f64,
    pub completeness_mean: f64,
    pub completeness_std: f64,
    pub f_measure_mean: f64,
    pub f_measure_std: f64,
    pub k_correct_mean: f64,
}

fn mean_std<F>(rows: &[&MetricResult], field: F) -> (f64, f64)
where
    F: Fn(&MetricResult) -> f64,
{
    let values: Vec<f64> = rows.iter().map(|r| field(r)).filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    (values.iter().mean(), values.iter().std_dev())
}

fn min_max<F>(rows: &[&MetricResult], field: F) -> (f64, f64)
where
    F: Fn(&MetricResult) -> f64,
{
    let values: Vec<f64> = rows.iter().map(|r| field(r)).filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    (Statistics::min(values.iter()), Statistics::max(values.iter()))
}

/// Group rows by method (sorted by name) and roll each group up.
pub fn summarize(rows: &[MetricResult]) -> Vec<MethodSummary> {
    let mut groups: BTreeMap<&str, Vec<&MetricResult>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.method.as_str()).or_default().push(row);
    }

    groups
        .into_iter()
        .map(|(method, group)| {
            let (ari_mean, ari_std) = mean_std(&group, |r| r.ari);
            let (v_measure_mean, v_measure_std) = mean_std(&group, |r| r.v_measure);
            let (v_measure_min, v_measure_max) = min_max(&group, |r| r.v_measure);
            let (nvi_mean, nvi_std) = mean_std(&group, |r| r.nvi);
            let (homogeneity_mean, homogeneity_std) = mean_std(&group, |r| r.homogeneity);
            let (completeness_mean, completeness_std) = mean_std(&group, |r| r.completeness);
            let (f_measure_mean, f_measure_std) = mean_std(&group, |r| r.f_measure);
            let correct = group.iter().filter(|r| r.k_correct).count();
            MethodSummary {
                method: method.to_string(),
                count: group.len(),
                ari_mean,
                ari_std,
                v_measure_mean,
                v_measure_std,
                v_measure_min,
                v_measure_max,
                nvi_mean,
                nvi_std,
                homogeneity_mean,
                homogeneity_std,
                completeness_mean,
                completeness_std,
                f_measure_mean,
                f_measure_std,
                k_correct_mean: correct as f64 / group.len() as f64,
            }
        })
        .collect()
}

fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_table_to(file, rows).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_table_to<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_header(path: &Path, columns: &[&str]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", columns.join("\t")))?;
    Ok(())
}

/// Per-row scores table. An empty run still gets a header line.
pub fn write_rows(path: &Path, rows: &[MetricResult]) -> Result<(), ReportError> {
    if rows.is_empty() {
        return write_header(path, &SCORE_COLUMNS);
    }
    write_table(path, rows)
}

/// Per-method summary table, header only when nothing was scored
pub fn write_summary(path: &Path, summaries: &[MethodSummary]) -> Result<(), ReportError> {
    if summaries.is_empty() {
        return write_header(path, &SUMMARY_COLUMNS);
    }
    write_table(path, summaries)
}

pub const SCORE_COLUMNS: [&str; 13] = [
    "method",
    "num_classes",
    "function_combo",
    "noise_level",
    "seed",
    "k_detected",
    "k_correct",
    "nvi",
    "v_measure",
    "homogeneity",
    "completeness",
    "f_measure",
    "ari",
];

pub const SUMMARY_COLUMNS: [&str; 17] = [
    "method",
    "count",
    "ari_mean",
    "ari_std",
    "v_measure_mean",
    "v_measure_std",
    "v_measure_min",
    "v_measure_max",
    "nvi_mean",
    "nvi_std",
    "homogeneity_mean",
    "homogeneity_std",
    "completeness_mean",
    "completeness_std",
    "f_measure_mean",
    "f_measure_std",
    "k_correct_mean",
];

/// Console table, rounded to three decimals
pub fn render_summary(summaries: &[MethodSummary]) -> String {
    let mut out = format!(
        "{:<14}{:>6}{:>16}{:>16}{:>16}{:>11}\n",
        "method", "n", "ari", "v_measure", "nvi", "k_correct"
    );
    for s in summaries {
        out.push_str(&format!(
            "{:<14}{:>6}{:>16}{:>16}{:>16}{:>11.3}\n",
            s.method,
            s.count,
            format!("{:.3}±{:.3}", s.ari_mean, s.ari_std),
            format!("{:.3}±{:.3}", s.v_measure_mean, s.v_measure_std),
            format!("{:.3}±{:.3}", s.nvi_mean, s.nvi_std),
            s.k_correct_mean
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(method: &str, ari: f64, v: f64, k_correct: bool) -> MetricResult {
        MetricResult {
            dataset_index: 1,
            method: method.into(),
            class_count: 3,
            function_combo: "a-b-c".into(),
            noise_level: 0.04,
            seed: 0,
            k_detected: if k_correct { 3 } else { 2 },
            k_correct,
            nvi: 0.0,
            v_measure: v,
            homogeneity: v,
            completeness: v,
            f_measure: 1.0,
            ari,
        }
    }

    #[test]
    fn test_summarize_groups_by_method() {
        let rows = vec![
            row("kmeans", 0.5, 0.6, false),
            row("gmm", 1.0, 1.0, true),
            row("kmeans", 0.7, 0.8, true),
        ];
        let summaries = summarize(&rows);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].method, "gmm");
        assert_eq!(summaries[1].count, 2);
        assert!((summaries[1].ari_mean - 0.6).abs() < 1e-12);
        assert!((summaries[1].ari_std - 0.02f64.sqrt()).abs() < 1e-12);
        assert!((summaries[1].k_correct_mean - 0.5).abs() < 1e-12);
        assert_eq!(summaries[1].v_measure_min, 0.6);
        assert_eq!(summaries[1].v_measure_max, 0.8);
    }

    #[test]
    fn test_nan_excluded_from_mean() {
        let rows = vec![
            row("spectral", 0.4, f64::NAN, false),
            row("spectral", 0.6, 0.9, false),
        ];
        let s = &summarize(&rows)[0];
        assert_eq!(s.count, 2);
        assert!((s.v_measure_mean - 0.9).abs() < 1e-12);
        assert!((s.ari_mean - 0.5).abs() < 1e-12);
        assert_eq!(s.v_measure_min, 0.9);
        assert_eq!(s.v_measure_max, 0.9);
    }

    #[test]
    fn test_summary_columns_match_serialized_header() {
        let mut out = Vec::new();
        write_table_to(&mut out, &summarize(&[row("gmm", 1.0, 1.0, true)])).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next().unwrap(), SUMMARY_COLUMNS.join("\t"));
    }

    #[test]
    fn test_empty_summary_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("vmeasure_summary.tsv");
        write_summary(&path, &[]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), SUMMARY_COLUMNS.join("\t"));
    }

    #[test]
    fn test_rows_table_layout() {
        let mut out = Vec::new();
        write_table_to(&mut out, &[row("gmm", 1.0, f64::NAN, true)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), SCORE_COLUMNS.join("\t"));
        let fields: Vec<&str> = lines.next().unwrap().split('\t').collect();
        assert_eq!(fields[0], "gmm");
        assert_eq!(fields[6], "true");
        assert_eq!(fields[8], "NaN");
    }

    #[test]
    fn test_render_summary() {
        let summaries = summarize(&[row("gmm", 1.0, 1.0, true)]);
        let text = render_summary(&summaries);
        assert!(text.starts_with("method"));
        assert!(text.contains("gmm"));
        assert!(text.contains("1.000"));
    }
}

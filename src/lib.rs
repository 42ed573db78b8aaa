/*
 * File: /src/lib.rs
 * Created Date: Monday, January 22nd 2024
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-16		Zihan	Trajectory clustering evaluation modules
 */

//! Index simulated trajectory datasets, locate clustering outputs for each
//! of them and score the outputs against ground truth.
//!
//! ```text
//! naming -> index -> locate -> scoring -> pipeline -> report
//! ```

pub mod cli;
pub mod config;
pub mod index;
pub mod locate;
pub mod methods;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod trajectory;
pub mod util;

pub use config::Config;
pub use index::{DatasetIndex, DatasetIndexer, DatasetRecord};
pub use locate::{LabelSource, ResultLocator};
pub use naming::{parse_path, DatasetParams, PathParser};
pub use pipeline::{EvaluationPipeline, EvaluationReport, MetricResult, PipelineConfig};
pub use scoring::{score_labels, ClusteringMetrics};

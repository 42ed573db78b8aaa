/*
 * File: /src/cli.rs
 * Created Date: Friday, October 16th 2026
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-16		Zihan	Command-line surface
 */

use std::path::PathBuf;

use clap::builder::{RangedU64ValueParser, Styles};
use clap::{value_parser as vparser, Arg, ArgAction, Command};

/// Job index for array jobs; 1-based
fn job_index_arg() -> Arg {
    Arg::new("index")
        .help("The 1-based dataset index")
        .long_help("The 1-based dataset index, as assigned by `index`; falls back to the scheduler's job-array index")
        .short('i')
        .long("index")
        .env("LSB_JOBINDEX")
        .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
        .action(ArgAction::Set)
}

#[rustfmt::skip]
pub fn build_cli() -> Command {
    let index_subcommand = Command::new("index")
        .about("Discover datasets under the data directory and write the dataset index");

    let lookup_subcommand = Command::new("lookup")
        .about("Print the dataset row for one job index")
        .arg(job_index_arg().required(true));

    let cluster_subcommand = Command::new("cluster")
        .about("Cluster one indexed dataset (or all of them) with k = class count")
        .arg(
            Arg::new("method")
                .help("The clustering method to run")
                .short('m')
                .long("method")
                .default_value("kmeans")
                .action(ArgAction::Set),
        )
        .arg(job_index_arg().required(false))
        .arg(
            Arg::new("dry-run")
                .help("Log the planned output paths without clustering")
                .long("dry-run")
                .action(ArgAction::SetTrue),
        );

    let evaluate_subcommand = Command::new("evaluate")
        .about("Score clustering outputs against ground truth and write the score tables");

    Command::new("traj-cluster-eval")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Index trajectory datasets and evaluate clustering results against ground truth")
        .color(clap::ColorChoice::Auto)
        .styles(Styles::styled())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .help("A JSON config file; flags override its values")
                .short('c')
                .long("config")
                .env("TCE_CONFIG")
                .global(true)
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("data-dir")
                .help("The root directory holding the datasets")
                .short('d')
                .long("data-dir")
                .env("TCE_DATA_DIR")
                .global(true)
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("glob")
                .help("The dataset file pattern, relative to the data directory")
                .long("glob")
                .env("TCE_DATASET_GLOB")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("exclude")
                .help("Directory names to skip while indexing")
                .long("exclude")
                .env("TCE_EXCLUDE_DIRS")
                .global(true)
                .num_args(1..)
                .value_delimiter(',')
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("methods")
                .help("The methods to evaluate, comma separated")
                .long_help("The methods to evaluate, comma separated; discovered from `clustering/` directories when unset")
                .long("methods")
                .env("TCE_METHODS")
                .global(true)
                .num_args(1..)
                .value_delimiter(',')
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("batch")
                .help("Only use datasets with this class count (`3` or `3_classes`)")
                .short('b')
                .long("batch")
                .env("TCE_BATCH")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("true-label-key")
                .help("The ground-truth label column")
                .long("true-label-key")
                .env("TCE_TRUE_LABEL_KEY")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("cluster-label-key")
                .help("The predicted label column in clustering outputs")
                .long("cluster-label-key")
                .env("TCE_CLUSTER_LABEL_KEY")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("value-column")
                .help("The series column used as clustering features")
                .long("value-column")
                .env("TCE_VALUE_COLUMN")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("index-output")
                .help("Where the dataset index is written and read")
                .long("index-output")
                .env("TCE_INDEX_OUTPUT")
                .global(true)
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("scores-output")
                .help("Where the per-row score table is written")
                .long("scores-output")
                .env("TCE_SCORES_OUTPUT")
                .global(true)
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("summary-output")
                .help("Where the per-method summary is written")
                .long("summary-output")
                .env("TCE_SUMMARY_OUTPUT")
                .global(true)
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("parallel")
                .help("Evaluate datasets in parallel")
                .long("parallel")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("More log output (repeat for trace)")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .help("Only log warnings and errors")
                .short('q')
                .long("quiet")
                .global(true)
                .conflicts_with("verbose")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .help("Also append log output to this file")
                .long("log-file")
                .global(true)
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        )
        .subcommands([
            index_subcommand,
            lookup_subcommand,
            cluster_subcommand,
            evaluate_subcommand,
        ])
}

/*
 * File: /main.rs
 * Created Date: Tuesday November 21st 2023
 * Author: Zihan
 * -----
 * Last Modified: Saturday, 17th October 2026
 * Modified By: Zihan Wu <wzh4464@gmail.com>
 * -----
 * HISTORY:
 * Date      		By   	Comments
 * ----------		------	---------------------------------------------------------
 * 2026-10-16		Zihan	index / lookup / cluster / evaluate entry point
 */

use std::path::Path;

use anyhow::{bail, Context};
use clap::ArgMatches;
use log::{info, warn, LevelFilter};

use traj_cluster_eval::cli::build_cli;
use traj_cluster_eval::config::Config;
use traj_cluster_eval::index::{DatasetIndex, DatasetIndexer, IndexOutcome};
use traj_cluster_eval::methods::{method_by_name, ClusterRunner};
use traj_cluster_eval::pipeline::{EvaluationPipeline, PipelineConfig};
use traj_cluster_eval::report::{render_summary, write_rows, write_summary};

fn setup_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());
    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }
    dispatch.apply()?;
    Ok(())
}

fn log_level(matches: &ArgMatches) -> LevelFilter {
    if matches.get_flag("quiet") {
        return LevelFilter::Warn;
    }
    match matches.get_count("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn discover(config: &Config) -> anyhow::Result<IndexOutcome> {
    let outcome = DatasetIndexer::new(&config.data_dir)
        .with_pattern(&config.dataset_glob)
        .with_excluded_dirs(config.exclude_dirs.clone())
        .discover()?;
    Ok(outcome)
}

fn run_index(config: &Config) -> anyhow::Result<()> {
    let outcome = discover(config)?;
    outcome
        .index
        .write_path(&config.index_output)
        .with_context(|| format!("writing {}", config.index_output.display()))?;

    println!("Datasets by class:");
    for (class_count, n) in outcome.index.counts_by_class() {
        println!("  {:>3} classes: {}", class_count, n);
    }
    println!(
        "{} datasets indexed to {}",
        outcome.index.len(),
        config.index_output.display()
    );
    Ok(())
}

fn load_index(config: &Config) -> anyhow::Result<DatasetIndex> {
    DatasetIndex::read_path(&config.index_output).with_context(|| {
        format!(
            "reading {} (run `index` first)",
            config.index_output.display()
        )
    })
}

fn run_lookup(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let Some(&job_index) = matches.get_one::<usize>("index") else {
        bail!("no dataset index given");
    };
    let index = load_index(config)?;
    let record = index.get(job_index)?;
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        record.index,
        record.class_count,
        record.function_combo,
        record.noise_level,
        record.seed,
        record.dataset_path.display()
    );
    Ok(())
}

fn run_cluster(config: &Config, matches: &ArgMatches) -> anyhow::Result<()> {
    let method_name = matches
        .get_one::<String>("method")
        .map(String::as_str)
        .unwrap_or("kmeans");
    let method = method_by_name(method_name)?;
    let runner = ClusterRunner::new(method)
        .with_value_column(&config.value_column)
        .with_cluster_label_key(&config.cluster_label_key)
        .dry_run(matches.get_flag("dry-run"));

    let index = load_index(config)?;
    let records = match matches.get_one::<usize>("index") {
        Some(&job_index) => vec![index.get(job_index)?.clone()],
        None => index
            .records()
            .iter()
            .filter(|r| config.batch.map_or(true, |k| r.class_count == k))
            .cloned()
            .collect(),
    };

    let tally = runner.run(&records);
    if tally.failed > 0 {
        warn!("{} of {} datasets failed to cluster", tally.failed, tally.total);
    }
    Ok(())
}

fn run_evaluate(config: &Config) -> anyhow::Result<()> {
    let outcome = discover(config)?;
    let pipeline = EvaluationPipeline::builder()
        .with_config(PipelineConfig::from(config))
        .build();
    let report = pipeline.run(outcome.index.records());

    write_rows(&config.scores_output, &report.rows)?;
    let summary_path = config.summary_output();
    write_summary(&summary_path, &report.summaries)?;
    info!(
        "Wrote {} and {}",
        config.scores_output.display(),
        summary_path.display()
    );

    println!("{}", report.summary());
    if !report.summaries.is_empty() {
        println!("\n{}", render_summary(&report.summaries));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    setup_logger(
        log_level(&matches),
        matches.get_one::<std::path::PathBuf>("log-file").map(|p| p.as_path()),
    )?;
    let config = Config::from_matches(&matches)?;

    match matches.subcommand() {
        Some(("index", _)) => run_index(&config),
        Some(("lookup", sub)) => run_lookup(&config, sub),
        Some(("cluster", sub)) => run_cluster(&config, sub),
        Some(("evaluate", _)) => run_evaluate(&config),
        _ => unreachable!("subcommand is required"),
    }
}

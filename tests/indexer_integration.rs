//! Dataset discovery over temporary directory trees.

use std::fs;
use std::path::Path;

use traj_cluster_eval::index::{DatasetIndex, DatasetIndexer, IndexError};

const HEADER: &str = "ID\tX\tY\tfunc\tnoise\toriginal_trajectory\n";

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, HEADER).unwrap();
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_single_flat_dataset() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    touch(
        dir.path(),
        "input_trajs/8/3/0.04noise.exponential-hyperbolic-norm.200reps.0.tsv",
    );

    let outcome = DatasetIndexer::new(dir.path()).discover().unwrap();
    let records = outcome.index.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].index, 1);
    assert_eq!(records[0].class_count, 3);
    assert_eq!(records[0].function_combo, "exponential-hyperbolic-norm");
    assert_eq!(records[0].noise_level, 0.04);
    assert_eq!(records[0].seed, 0);
}

#[test]
fn test_mixed_tree() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(root, "3_classes/exp-norm-sin/noise_0.04/seed_000/trajectories.tsv");
    touch(root, "3_classes/exp-norm-sin/noise_0.04/seed_001/trajectories.tsv");
    touch(
        root,
        "3_classes/exp-norm-sin/noise_0.04/seed_000/clustering/gmm_k3/trajectories.clust.tsv",
    );
    touch(root, "input_trajs/8/6/0.1noise.a-b-c-d-e-f.200reps.7.tsv");
    touch(root, "input_trajs/8/6/clustering/kmeans_k6/0.1noise.a-b-c-d-e-f.200reps.7.clust.tsv");
    touch(root, "sample/3/0.04noise.a-b-c.200reps.0.tsv");
    touch(root, "notes/readme.tsv");

    let outcome = DatasetIndexer::new(root).discover().unwrap();
    let index = &outcome.index;
    assert_eq!(index.len(), 3);
    assert_eq!(outcome.rejected.len(), 1);
    assert!(index.records().iter().all(|r| !r.dataset_path.starts_with(root.join("sample"))));

    let counts = index.counts_by_class();
    assert_eq!(counts.get(&3), Some(&2));
    assert_eq!(counts.get(&6), Some(&1));

    let indices: Vec<usize> = index.records().iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

#[test]
fn test_duplicate_parameters_kept_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(root, "a/3/0.04noise.a-b-c.200reps.0.tsv");
    touch(root, "b/3/0.04noise.c-b-a.200reps.0.tsv");

    let outcome = DatasetIndexer::new(root).discover().unwrap();
    assert_eq!(outcome.index.len(), 1);
    assert_eq!(outcome.duplicates, 1);
    assert!(outcome.index.records()[0].dataset_path.starts_with(root.join("a")));
}

#[test]
fn test_reindexing_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    touch(&root, "8/3/0.04noise.a-b-c.200reps.0.tsv");
    touch(&root, "8/3/0.04noise.a-b-c.200reps.1.tsv");
    touch(&root, "8/6/0.1noise.a-b-c-d-e-f.200reps.0.tsv");

    let first = dir.path().join("first.tsv");
    let second = dir.path().join("second.tsv");
    DatasetIndexer::new(&root).discover().unwrap().index.write_path(&first).unwrap();
    DatasetIndexer::new(&root).discover().unwrap().index.write_path(&second).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

    let header = fs::read_to_string(&first).unwrap();
    assert_eq!(
        header.lines().next().unwrap(),
        "index\tnum_classes\tfunction_combo\tnoise_level\tseed\tdataset_path"
    );

    let reread = DatasetIndex::read_path(&first).unwrap();
    assert_eq!(reread.len(), 3);
    assert_eq!(reread.get(3).unwrap().class_count, 6);
    assert!(matches!(
        reread.get(4),
        Err(IndexError::UnknownIndex { requested: 4, len: 3 })
    ));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = DatasetIndexer::new(dir.path().join("absent")).discover().unwrap_err();
    assert!(matches!(err, IndexError::RootMissing(_)));
}

#[test]
fn test_no_datasets_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "sample/3/0.04noise.a-b-c.200reps.0.tsv");
    let err = DatasetIndexer::new(dir.path()).discover().unwrap_err();
    assert!(matches!(err, IndexError::NoDatasets { .. }));
}

#[test]
fn test_sibling_tables_in_seed_directory_are_not_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    touch(root, "3_classes/a-b-c/noise_0.04/seed_000/trajectories.tsv");
    touch(root, "3_classes/a-b-c/noise_0.04/seed_000/metadata.tsv");

    let outcome = DatasetIndexer::new(root).discover().unwrap();
    assert_eq!(outcome.index.len(), 1);
    assert_eq!(outcome.duplicates, 0);
    assert_eq!(outcome.rejected.len(), 1);
    assert!(outcome.index.records()[0]
        .dataset_path
        .ends_with("seed_000/trajectories.tsv"));
}

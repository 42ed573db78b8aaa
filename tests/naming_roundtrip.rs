//! Round trip of the flat `{noise}noise.{combo}.{R}reps.{seed}.tsv` naming
//! convention over randomly sampled parameters.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use traj_cluster_eval::naming::{parse_path, Convention};

const FUNCTIONS: [&str; 8] = [
    "exponential",
    "hyperbolic",
    "linear",
    "logistic",
    "norm",
    "sin",
    "cos",
    "sigmoid",
];

struct Case {
    class_count: usize,
    function_combo: String,
    noise_level: f64,
    seed: u64,
}

fn sample_case(rng: &mut StdRng) -> Case {
    let class_count = [3, 6, 9][rng.random_range(0..3)];

    let mut functions = FUNCTIONS.to_vec();
    functions.shuffle(rng);
    let n_functions = rng.random_range(2..=4);
    let mut chosen: Vec<&str> = functions[..n_functions].to_vec();
    chosen.sort();

    // 0 to 2 decimal digits
    let noise_level = match rng.random_range(0..3) {
        0 => rng.random_range(0..5) as f64,
        1 => rng.random_range(0..50) as f64 / 10.0,
        _ => rng.random_range(0..500) as f64 / 100.0,
    };

    Case {
        class_count,
        function_combo: chosen.join("-"),
        noise_level,
        seed: rng.random_range(0..10_000),
    }
}

#[test]
fn test_flat_filename_round_trip() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let case = sample_case(&mut rng);
        let name = format!(
            "{}noise.{}.200reps.{}.tsv",
            case.noise_level, case.function_combo, case.seed
        );
        let path = PathBuf::from("input_trajs/8")
            .join(case.class_count.to_string())
            .join(&name);

        let parsed = parse_path(&path).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert_eq!(parsed.convention, Convention::FlatFilename, "{}", name);
        assert_eq!(parsed.params.class_count, case.class_count, "{}", name);
        assert_eq!(parsed.params.function_combo, case.function_combo, "{}", name);
        assert_eq!(parsed.params.noise_level, case.noise_level, "{}", name);
        assert_eq!(parsed.params.seed, case.seed, "{}", name);
        assert!(parsed.result.is_none());
    }
}

#[test]
fn test_known_file_name() {
    let path = PathBuf::from("input_trajs/8/3/0.04noise.exponential-hyperbolic-norm.200reps.0.tsv");
    let parsed = parse_path(&path).unwrap();
    assert_eq!(parsed.params.class_count, 3);
    assert_eq!(parsed.params.function_combo, "exponential-hyperbolic-norm");
    assert_eq!(parsed.params.noise_level, 0.04);
    assert_eq!(parsed.params.seed, 0);
}

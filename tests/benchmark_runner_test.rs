mod common;

use std::fs;

use common::ScriptedBackend;
use matbench::benchmarks::{
    BenchmarkRunner, ConfigLoader, KernelMode, MatrixGenerator, Operand, Report, Shape,
    SweepConfig, data_size_mib, total_flop,
};
use matbench::errors::BenchmarkError;

const DELTA: f64 = 1e-9;

#[test]
fn test_run_trial_derives_metrics() {
    let backend = ScriptedBackend::with_duration(1_000);
    let runner = BenchmarkRunner::new(&backend, MatrixGenerator::default());
    let context = runner.create_context().unwrap();
    let mut report = Report::new("trial");

    let shape = Shape::new(32, 48, 64).unwrap();
    runner
        .run_trial(KernelMode::InnerProduct, shape, &context, &mut report)
        .unwrap();

    assert_eq!(report.len(), 1);
    let row = &report.rows()[0];
    assert_eq!(row.mode, "IP / MOCK");
    assert_eq!(row.shape.to_string(), "32/48/64");
    assert_eq!(row.total_flop, 32 * 48 * 127);
    assert_eq!(row.duration_ns, 1_000);
    assert!((row.gflops - (32.0 * 48.0 * 127.0) / 1_000.0).abs() < DELTA);
    assert!((row.data_size_mib - data_size_mib(32, 48, 64)).abs() < DELTA);
}

#[test]
fn test_zero_duration_leaves_report_untouched() {
    let backend = ScriptedBackend::with_duration(0);
    let runner = BenchmarkRunner::new(&backend, MatrixGenerator::default());
    let context = runner.create_context().unwrap();
    let mut report = Report::new("trial");

    let result = runner.run_trial(
        KernelMode::Gemm,
        Shape::square(16).unwrap(),
        &context,
        &mut report,
    );

    assert!(matches!(result, Err(BenchmarkError::ZeroDuration { .. })));
    assert!(report.is_empty());
}

#[test]
fn test_operands_are_reproducible_across_trials_and_modes() {
    let backend = ScriptedBackend::with_duration(10);
    let runner = BenchmarkRunner::new(&backend, MatrixGenerator::default().with_workers(3));
    let context = runner.create_context().unwrap();
    let mut report = Report::new("trial");

    let shape = Shape::new(12, 20, 9).unwrap();
    for mode in [KernelMode::InnerProduct, KernelMode::InnerProduct, KernelMode::Gemm] {
        runner.run_trial(mode, shape, &context, &mut report).unwrap();
    }

    let calls = backend.calls.borrow();
    assert_eq!(calls[0].lhs, calls[1].lhs);
    assert_eq!(calls[0].lhs, calls[2].lhs);
    assert_eq!(report.len(), 3);
    // Rows are independent snapshots, so repeated trials report identically.
    assert_eq!(report.rows()[0], report.rows()[1]);
}

#[test]
fn test_generator_is_deterministic() {
    let first = MatrixGenerator::default()
        .generate(Operand::Lhs, 64, 64)
        .unwrap();
    let second = MatrixGenerator::default()
        .generate(Operand::Lhs, 64, 64)
        .unwrap();
    assert_eq!(first, second);

    let other_seed = MatrixGenerator::new(7)
        .generate(Operand::Lhs, 64, 64)
        .unwrap();
    assert_ne!(first, other_seed);
}

#[test]
fn test_total_flop_property() {
    for n1 in [1usize, 3, 64] {
        for n2 in [1usize, 5, 128] {
            for m in [1usize, 2, 1024] {
                let expected = (n1 * n2 * (2 * m - 1)) as u64;
                assert_eq!(total_flop(n1, n2, m).unwrap(), expected);
                assert_eq!(data_size_mib(n1, n2, m), data_size_mib(n2, n1, m));
            }
        }
    }
    assert!(total_flop(4, 4, 0).is_err());
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.json");
    fs::write(
        &path,
        r#"{
            "square": { "sizes": [64, 128] },
            "rectangular": { "n1_sizes": [32], "n2_base": 1048576, "n2_multipliers": [1, 2], "m": 1024 },
            "generator_threads": 4
        }"#,
    )
    .unwrap();

    let config = ConfigLoader::load_sweep_config_from(path.to_str().unwrap()).unwrap();
    assert_eq!(config.square.sizes, vec![64, 128]);
    assert_eq!(config.rectangular.n2_multipliers, vec![1, 2]);
    assert_eq!(config.generator_threads, Some(4));
    assert_eq!(config.backend_threads, None);
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let config = ConfigLoader::load_sweep_config_from(path.to_str().unwrap()).unwrap();
    assert_eq!(config, SweepConfig::default());
}

#[test]
fn test_malformed_config_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"square\": ").unwrap();

    let result = ConfigLoader::load_sweep_config_from(path.to_str().unwrap());
    assert!(matches!(result, Err(BenchmarkError::ConfigParse { .. })));
}

#[test]
fn test_invalid_config_values_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    fs::write(&path, r#"{ "square": { "sizes": [64, 0] } }"#).unwrap();

    let result = ConfigLoader::load_sweep_config_from(path.to_str().unwrap());
    assert!(matches!(
        result,
        Err(BenchmarkError::ConfigValidation { ref field, .. }) if field == "square.sizes"
    ));
}

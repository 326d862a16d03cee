use std::fs;

use bm_bench::timing_log::read_all;
use bm_bench::{run, BenchError, Mode, RunConfig};
use bm_matrix::{multiply_naive, Matrix, MatrixError, FILL_MAX, FILL_MIN};

fn small_config(dir: &tempfile::TempDir, mode: Mode) -> RunConfig {
    RunConfig {
        rows_a: 6,
        cols_a: 5,
        rows_b: 5,
        cols_b: 4,
        batch_size: 4,
        repetitions: 3,
        log_file: dir.path().join("execution_log.txt"),
        seed: Some(2024),
        mode,
        print: false,
    }
}

#[test]
fn test_one_log_line_per_repetition() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(&dir, Mode::Spawn);

    let mut seen = Vec::new();
    let report = run(&config, |rep| seen.push(rep.number)).unwrap();

    assert_eq!(seen, vec![1, 2, 3]);
    let logged = read_all(&config.log_file).unwrap();
    assert_eq!(logged.len(), 3);
    assert!(logged.iter().all(|&t| t >= 0.0));
    assert_eq!(report.timings.len(), 3);
}

#[test]
fn test_log_is_appended_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(&dir, Mode::Pooled);

    run(&config, |_| {}).unwrap();
    run(&config, |_| {}).unwrap();

    assert_eq!(read_all(&config.log_file).unwrap().len(), 6);
}

#[test]
fn test_products_are_correct() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(&dir, Mode::Pooled);

    run(&config, |rep| {
        assert!(rep
            .a
            .as_slice()
            .iter()
            .all(|v| (FILL_MIN..=FILL_MAX).contains(v)));
        let mut expected = Matrix::zeros(rep.a.rows(), rep.b.cols());
        multiply_naive(rep.a, rep.b, &mut expected).unwrap();
        assert_eq!(rep.c, &expected);
    })
    .unwrap();
}

#[test]
fn test_incompatible_shapes_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        rows_b: 4,
        ..small_config(&dir, Mode::Spawn)
    };

    let mut called = false;
    let err = run(&config, |_| called = true).unwrap_err();

    assert!(matches!(
        err,
        BenchError::Matrix(MatrixError::DimensionMismatch { .. })
    ));
    assert!(!called);
    assert!(!config.log_file.exists());
}

#[test]
fn test_zero_repetitions_leaves_no_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        repetitions: 0,
        ..small_config(&dir, Mode::Serial)
    };

    let report = run(&config, |_| {}).unwrap();
    assert!(report.timings.is_empty());
    assert!(fs::metadata(&config.log_file).is_err());
}

#[test]
fn test_unaddressable_sizes_fail_before_allocating() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        rows_a: usize::MAX / 2 + 1,
        cols_a: 1,
        rows_b: 1,
        cols_b: 4,
        ..small_config(&dir, Mode::Pooled)
    };

    let err = run(&config, |_| {}).unwrap_err();

    assert!(matches!(
        err,
        BenchError::Matrix(MatrixError::SizeOverflow { .. })
    ));
    assert!(!config.log_file.exists());
}

use std::time::Instant;

use bm_matrix::{multiply_naive, Matrix};
use bm_sched::BatchScheduler;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::Result;
use crate::timing_log;

/// One finished repetition, handed to the progress callback.
pub struct Repetition<'a> {
    /// One-based repetition number.
    pub number: usize,
    /// Wall-clock time of the multiplication alone.
    pub seconds: f64,
    pub a: &'a Matrix,
    pub b: &'a Matrix,
    pub c: &'a Matrix,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub timings: Vec<f64>,
}

impl RunReport {
    /// Returns the summed time of every repetition.
    pub fn total_seconds(&self) -> f64 {
        self.timings.iter().sum()
    }

    /// Returns the mean time per repetition, or `None` for an empty run.
    pub fn mean_seconds(&self) -> Option<f64> {
        if self.timings.is_empty() {
            None
        } else {
            Some(self.total_seconds() / self.timings.len() as f64)
        }
    }
}

enum Engine {
    Serial,
    Batched(BatchScheduler),
}

impl Engine {
    fn multiply(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
        match self {
            Engine::Serial => multiply_naive(a, b, c)?,
            Engine::Batched(scheduler) => {
                scheduler.multiply(a, b, c)?;
            }
        }
        Ok(())
    }
}

/// Run `config.repetitions` timed multiplications.
///
/// Each repetition allocates fresh random operands, times only the
/// multiplication and appends the elapsed seconds to `config.log_file`.
/// The configuration is validated before the first repetition, so an
/// incompatible shape never touches the log.
pub fn run<F>(config: &RunConfig, mut on_repetition: F) -> Result<RunReport>
where
    F: FnMut(&Repetition<'_>),
{
    let out = config.validate()?;
    let engine = match config.mode.dispatch_mode() {
        Some(mode) => Engine::Batched(BatchScheduler::with_mode(config.batch_size, mode)?),
        None => Engine::Serial,
    };
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!(
        a = %config.dims_a(),
        b = %config.dims_b(),
        batch_size = config.batch_size,
        mode = ?config.mode,
        repetitions = config.repetitions,
        log = %config.log_file.display(),
        "starting run"
    );

    let mut report = RunReport::default();
    for i in 0..config.repetitions {
        let a = Matrix::random(config.rows_a, config.cols_a, &mut rng);
        let b = Matrix::random(config.rows_b, config.cols_b, &mut rng);
        let mut c = Matrix::zeros(out.rows, out.cols);

        let start = Instant::now();
        engine.multiply(&a, &b, &mut c)?;
        let seconds = start.elapsed().as_secs_f64();

        timing_log::append(&config.log_file, seconds)?;
        debug!(repetition = i + 1, seconds, "repetition finished");
        report.timings.push(seconds);

        on_repetition(&Repetition {
            number: i + 1,
            seconds,
            a: &a,
            b: &b,
            c: &c,
        });
    }

    info!(
        repetitions = report.timings.len(),
        total_seconds = report.total_seconds(),
        "run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use approx::assert_relative_eq;

    #[test]
    fn test_report_mean() {
        let report = RunReport {
            timings: vec![1.0, 2.0, 3.0],
        };
        assert_relative_eq!(report.total_seconds(), 6.0);
        assert_relative_eq!(report.mean_seconds().unwrap(), 2.0);
        assert!(RunReport::default().mean_seconds().is_none());
    }

    #[test]
    fn test_every_mode_agrees() {
        let dir = tempfile::tempdir().unwrap();
        let mut products = Vec::new();

        for mode in [Mode::Spawn, Mode::Pooled, Mode::Serial] {
            let config = RunConfig {
                rows_a: 5,
                cols_a: 4,
                rows_b: 4,
                cols_b: 3,
                batch_size: 3,
                repetitions: 1,
                log_file: dir.path().join("log.txt"),
                seed: Some(17),
                mode,
                print: false,
            };
            run(&config, |rep| products.push(rep.c.clone())).unwrap();
        }

        assert_eq!(products.len(), 3);
        assert_eq!(products[0], products[1]);
        assert_eq!(products[1], products[2]);
    }
}

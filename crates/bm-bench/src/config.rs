use std::fs;
use std::path::{Path, PathBuf};

use bm_matrix::Dims;
use bm_sched::DispatchMode;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::error::{BenchError, Result};

/// `tracing` filter used when `RUST_LOG` is unset: run-level progress from
/// the driver and the scheduler, per-batch detail only on request.
pub const DEFAULT_LOG_FILTER: &str = "batchmul=info,bm_bench=info,bm_sched=info";

/// How each repetition computes the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Batched, fresh threads per batch.
    #[default]
    Spawn,
    /// Batched, worker pool reused across batches.
    Pooled,
    /// Single-threaded triple loop.
    Serial,
}

impl Mode {
    /// The scheduler dispatch mode, or `None` for the serial baseline.
    pub fn dispatch_mode(self) -> Option<DispatchMode> {
        match self {
            Mode::Spawn => Some(DispatchMode::Spawn),
            Mode::Pooled => Some(DispatchMode::Pooled),
            Mode::Serial => None,
        }
    }
}

/// Command-line flags. Every flag overrides the config file.
#[derive(Debug, Default, Parser)]
#[command(name = "batchmul", version, about = "Time batched-parallel integer matrix multiplication")]
pub struct Cli {
    /// TOML file with run settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rows of A
    #[arg(long)]
    pub rows_a: Option<usize>,

    /// Columns of A
    #[arg(long)]
    pub cols_a: Option<usize>,

    /// Rows of B (must equal columns of A)
    #[arg(long)]
    pub rows_b: Option<usize>,

    /// Columns of B
    #[arg(long)]
    pub cols_b: Option<usize>,

    /// Cells computed concurrently per batch
    #[arg(long, short = 'b')]
    pub batch_size: Option<usize>,

    /// Number of timed multiplications
    #[arg(long, short = 'n')]
    pub repetitions: Option<usize>,

    /// File the elapsed seconds are appended to
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Seed for the random fill (entropy when absent)
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Print the matrices after each repetition
    #[arg(long)]
    pub print: bool,
}

/// Settings for one `batchmul` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub rows_a: usize,
    pub cols_a: usize,
    pub rows_b: usize,
    pub cols_b: usize,
    pub batch_size: usize,
    pub repetitions: usize,
    pub log_file: PathBuf,
    pub seed: Option<u64>,
    pub mode: Mode,
    pub print: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            rows_a: 1000,
            cols_a: 1000,
            rows_b: 1000,
            cols_b: 1000,
            batch_size: 4,
            repetitions: 100,
            log_file: PathBuf::from("execution_log.txt"),
            seed: None,
            mode: Mode::Spawn,
            print: false,
        }
    }
}

impl RunConfig {
    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<RunConfig> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse the TOML file at `path`.
    pub fn load(path: &Path) -> Result<RunConfig> {
        let text = fs::read_to_string(path).map_err(|source| BenchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Layer defaults, then the config file named by `cli.config`, then the
    /// flags themselves.
    pub fn resolve(cli: &Cli) -> Result<RunConfig> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(v) = cli.rows_a {
            config.rows_a = v;
        }
        if let Some(v) = cli.cols_a {
            config.cols_a = v;
        }
        if let Some(v) = cli.rows_b {
            config.rows_b = v;
        }
        if let Some(v) = cli.cols_b {
            config.cols_b = v;
        }
        if let Some(v) = cli.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = cli.repetitions {
            config.repetitions = v;
        }
        if let Some(v) = &cli.log_file {
            config.log_file = v.clone();
        }
        if cli.seed.is_some() {
            config.seed = cli.seed;
        }
        if let Some(v) = cli.mode {
            config.mode = v;
        }
        config.print |= cli.print;

        Ok(config)
    }

    /// Returns the extents of `A`.
    pub fn dims_a(&self) -> Dims {
        Dims::new(self.rows_a, self.cols_a)
    }

    /// Returns the extents of `B`.
    pub fn dims_b(&self) -> Dims {
        Dims::new(self.rows_b, self.cols_b)
    }

    /// Check the settings and return the output extents.
    ///
    /// # Errors
    /// `InvalidConfig` for a zero batch size, `Matrix(DimensionMismatch)` if
    /// the operands cannot be multiplied, `Matrix(SizeOverflow)` if any of
    /// `A`, `B` or `C` has more cells than can be addressed.
    pub fn validate(&self) -> Result<Dims> {
        if self.batch_size == 0 {
            return Err(BenchError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        let out = self.dims_a().product_with(&self.dims_b())?;
        for dims in [self.dims_a(), self.dims_b(), out] {
            dims.numel()?;
        }
        Ok(out)
    }
}

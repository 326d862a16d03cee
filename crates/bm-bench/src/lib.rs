//! `bm-bench` - The `batchmul` driver.
//!
//! Runs a configurable number of random multiplications, times each one and
//! appends the elapsed seconds to a plain-text log, one value per line.

pub mod config;
pub mod error;
pub mod runner;
pub mod timing_log;

pub use config::{Cli, Mode, RunConfig, DEFAULT_LOG_FILTER};
pub use error::{BenchError, Result};
pub use runner::{run, Repetition, RunReport};

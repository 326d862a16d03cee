use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("matrix error: {0}")]
    Matrix(#[from] bm_matrix::MatrixError),
    #[error("scheduler error: {0}")]
    Sched(#[from] bm_sched::SchedError),
    #[error("bad timing log entry on line {line}: {value:?}")]
    LogParse { line: usize, value: String },
}

pub type Result<T> = std::result::Result<T, BenchError>;

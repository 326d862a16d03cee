use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{BenchError, Result};

/// Append one elapsed time, in seconds, as its own line.
///
/// The file is created if missing and never truncated.
pub fn append(path: &Path, seconds: f64) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{:.6}", seconds)?;
    Ok(())
}

/// Read every recorded time back. Blank lines are skipped.
pub fn read_all(path: &Path) -> Result<Vec<f64>> {
    let text = fs::read_to_string(path)?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.trim().parse::<f64>().map_err(|_| BenchError::LogParse {
                line: i + 1,
                value: line.to_string(),
            })
        })
        .collect()
}

pub mod pooled;
pub mod spawn;

use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::batch::Batch;
use crate::error::Result;
use crate::probe::TaskProbe;
use crate::stats::RunStats;

pub use pooled::Pooled;
pub use spawn::SpawnPerBatch;

/// Trait for pluggable batch execution strategies.
///
/// An implementation runs each batch fully in parallel and must not hand
/// out any task of the next batch until every task of the current batch has
/// completed. It must never run more workers at once than the size of the
/// largest batch it receives.
pub trait Dispatcher: Send + Sync + Debug {
    /// Returns the name of this dispatcher (e.g., "spawn", "pooled").
    fn name(&self) -> &str;

    /// Drain `batches` in order, calling `probe` around every unit task.
    ///
    /// On error no further batch is started. Tasks of the failing batch
    /// that were already running are waited for before returning.
    fn execute<'env>(
        &self,
        batches: &mut dyn Iterator<Item = Batch<'env>>,
        probe: &dyn TaskProbe,
    ) -> Result<RunStats>;
}

/// Selects a built-in [`Dispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Fresh worker threads for every batch.
    #[default]
    Spawn,
    /// One set of worker threads reused across batches.
    Pooled,
}

impl DispatchMode {
    /// Returns a fresh dispatcher for this mode with default settings.
    pub fn dispatcher(self) -> Box<dyn Dispatcher> {
        match self {
            DispatchMode::Spawn => Box::new(SpawnPerBatch::new()),
            DispatchMode::Pooled => Box::new(Pooled::new()),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Spawn => write!(f, "spawn"),
            DispatchMode::Pooled => write!(f, "pooled"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "spawn" => Ok(DispatchMode::Spawn),
            "pooled" => Ok(DispatchMode::Pooled),
            other => Err(format!("unknown dispatch mode: {}", other)),
        }
    }
}

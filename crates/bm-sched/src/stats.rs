/// Counters describing one batched multiplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Output cells computed.
    pub cells: usize,
    /// Batches dispatched.
    pub batches: usize,
    /// OS threads created for workers.
    pub workers_spawned: usize,
    /// Size of the largest batch, an upper bound on live workers.
    pub largest_batch: usize,
}

impl RunStats {
    pub(crate) fn record_batch(&mut self, len: usize) {
        self.cells += len;
        self.batches += 1;
        self.largest_batch = self.largest_batch.max(len);
    }
}

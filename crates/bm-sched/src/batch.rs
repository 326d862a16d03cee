use crate::task::UnitTask;

/// Lazy row-major scan over the coordinates of a `rows x cols` output.
#[derive(Debug, Clone)]
pub struct RowMajor {
    cols: usize,
    total: usize,
    next: usize,
}

impl RowMajor {
    /// Starts a scan at `(0, 0)`.
    ///
    /// Extents whose cell count overflows `usize` cannot describe a real
    /// matrix; the scan saturates at `usize::MAX` coordinates.
    pub fn new(rows: usize, cols: usize) -> Self {
        RowMajor {
            cols,
            total: rows.saturating_mul(cols),
            next: 0,
        }
    }
}

impl Iterator for RowMajor {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.next >= self.total {
            return None;
        }
        let coords = (self.next / self.cols, self.next % self.cols);
        self.next += 1;
        Some(coords)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowMajor {}

/// An ordered group of at most `batch_size` unit tasks, dispatched together.
#[derive(Debug)]
pub struct Batch<'a> {
    index: usize,
    tasks: Vec<UnitTask<'a>>,
}

impl<'a> Batch<'a> {
    /// Creates batch number `index` holding `tasks` in dispatch order.
    pub fn new(index: usize, tasks: Vec<UnitTask<'a>>) -> Self {
        Batch { index, tasks }
    }

    /// Zero-based position of this batch in dispatch order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of unit tasks, which is also the number of
    /// workers the batch occupies.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the batch holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns a reference to the tasks in dispatch order.
    pub fn tasks(&self) -> &[UnitTask<'a>] {
        &self.tasks
    }

    /// Consumes the batch, handing its tasks to the workers.
    pub fn into_tasks(self) -> Vec<UnitTask<'a>> {
        self.tasks
    }
}

/// Groups a stream of unit tasks into consecutive batches.
///
/// Every batch holds exactly `batch_size` tasks except possibly the last,
/// which holds the remainder. An empty stream yields no batches.
#[derive(Debug)]
pub struct Batches<I> {
    tasks: I,
    batch_size: usize,
    next_index: usize,
}

impl<I> Batches<I> {
    /// # Panics
    /// Panics if `batch_size == 0`.
    pub fn new(tasks: I, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be at least 1");
        Batches {
            tasks,
            batch_size,
            next_index: 0,
        }
    }
}

impl<'a, I> Iterator for Batches<I>
where
    I: Iterator<Item = UnitTask<'a>>,
{
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Batch<'a>> {
        let tasks: Vec<UnitTask<'a>> = self.tasks.by_ref().take(self.batch_size).collect();
        if tasks.is_empty() {
            return None;
        }
        let batch = Batch::new(self.next_index, tasks);
        self.next_index += 1;
        Some(batch)
    }
}

use crate::error::ProbeViolation;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Observer called from inside workers around each unit task.
///
/// Both hooks run on the worker thread, so implementations must be `Sync`.
/// The default implementations do nothing.
pub trait TaskProbe: Sync {
    fn task_started(&self, _batch: usize, _row: usize, _col: usize) {}

    fn task_finished(&self, _batch: usize, _row: usize, _col: usize) {}
}

/// Probe that observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProbe;

impl TaskProbe for NoopProbe {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEventKind {
    Started,
    Finished,
}

/// One timestamped hook invocation.
#[derive(Debug, Clone)]
pub struct ProbeEvent {
    pub batch: usize,
    pub row: usize,
    pub col: usize,
    pub kind: ProbeEventKind,
    pub at: Instant,
}

/// Probe that records every start and finish with a timestamp.
///
/// Optionally sleeps inside one chosen cell's worker, which makes batch
/// barrier violations observable. Also tracks how many workers were inside
/// a task at the same time.
#[derive(Debug, Default)]
pub struct RecordingProbe {
    events: Mutex<Vec<ProbeEvent>>,
    delay: Option<((usize, usize), Duration)>,
    live: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingProbe {
    /// Creates an empty recorder with no injected delay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` at the start of the worker for cell `(row, col)`.
    pub fn with_delay(mut self, row: usize, col: usize, delay: Duration) -> Self {
        self.delay = Some(((row, col), delay));
        self
    }

    /// Snapshot of all recorded events in arrival order.
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.lock_events().clone()
    }

    /// Cells whose task finished, in completion order.
    pub fn written_cells(&self) -> Vec<(usize, usize)> {
        self.lock_events()
            .iter()
            .filter(|e| e.kind == ProbeEventKind::Finished)
            .map(|e| (e.row, e.col))
            .collect()
    }

    /// Number of tasks that ever started.
    pub fn started_count(&self) -> usize {
        self.lock_events()
            .iter()
            .filter(|e| e.kind == ProbeEventKind::Started)
            .count()
    }

    /// Largest number of tasks observed running at once.
    pub fn peak_live(&self) -> usize {
        self.peak.load(Ordering::Acquire)
    }

    /// Verify that every started cell finished exactly once and that no
    /// cell was written twice.
    pub fn check_disjoint_writes(&self) -> Result<(), ProbeViolation> {
        let events = self.lock_events();
        let mut started: HashMap<(usize, usize), usize> = HashMap::new();
        let mut finished: HashMap<(usize, usize), usize> = HashMap::new();
        for e in events.iter() {
            let counts = match e.kind {
                ProbeEventKind::Started => &mut started,
                ProbeEventKind::Finished => &mut finished,
            };
            *counts.entry((e.row, e.col)).or_insert(0) += 1;
        }

        for (&(row, col), &count) in &finished {
            if count > 1 {
                return Err(ProbeViolation::DuplicateWrite { row, col, count });
            }
        }
        for &(row, col) in started.keys() {
            if !finished.contains_key(&(row, col)) {
                return Err(ProbeViolation::Unfinished { row, col });
            }
        }
        Ok(())
    }

    /// Verify that no worker of batch `N + 1` started before the last
    /// worker of batch `N` finished.
    pub fn check_batch_barriers(&self) -> Result<(), ProbeViolation> {
        let events = self.lock_events();

        // batch -> (earliest start, latest finish)
        let mut spans: BTreeMap<usize, (Option<Instant>, Option<Instant>)> = BTreeMap::new();
        for e in events.iter() {
            let span = spans.entry(e.batch).or_insert((None, None));
            match e.kind {
                ProbeEventKind::Started => {
                    span.0 = Some(span.0.map_or(e.at, |t| t.min(e.at)));
                }
                ProbeEventKind::Finished => {
                    span.1 = Some(span.1.map_or(e.at, |t| t.max(e.at)));
                }
            }
        }

        let spans: Vec<_> = spans.into_iter().collect();
        for pair in spans.windows(2) {
            let (prev, (_, prev_finish)) = pair[0];
            let (next, (next_start, _)) = pair[1];
            if let (Some(finish), Some(start)) = (prev_finish, next_start) {
                if start < finish {
                    return Err(ProbeViolation::BarrierCrossed { prev, next });
                }
            }
        }
        Ok(())
    }

    fn record(&self, batch: usize, row: usize, col: usize, kind: ProbeEventKind) {
        let event = ProbeEvent {
            batch,
            row,
            col,
            kind,
            at: Instant::now(),
        };
        self.lock_events().push(event);
    }

    fn lock_events(&self) -> std::sync::MutexGuard<'_, Vec<ProbeEvent>> {
        // A panicking worker must not hide the events recorded so far.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TaskProbe for RecordingProbe {
    fn task_started(&self, batch: usize, row: usize, col: usize) {
        let live = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak.fetch_max(live, Ordering::AcqRel);
        self.record(batch, row, col, ProbeEventKind::Started);

        if let Some((cell, delay)) = self.delay {
            if cell == (row, col) {
                thread::sleep(delay);
            }
        }
    }

    fn task_finished(&self, batch: usize, row: usize, col: usize) {
        self.record(batch, row, col, ProbeEventKind::Finished);
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

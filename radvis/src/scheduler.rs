use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::info;

use crate::VisError;

const PROGRESS_INTERVAL_MS: u128 = 500;

struct Progress {
    start: Instant,
    last_report: Mutex<Instant>,
}

/// Hands out `0..count` exactly once across all workers
pub struct WorkQueue {
    next: AtomicUsize,
    count: usize,
    progress: Option<Progress>,
}

impl WorkQueue {
    /// With `estimate` set, claims periodically log how far along the queue
    /// is.
    pub fn new(count: usize, estimate: bool) -> Self {
        let now = Instant::now();
        Self {
            next: AtomicUsize::new(0),
            count,
            progress: estimate.then(|| Progress {
                start: now,
                last_report: Mutex::new(now),
            }),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// The next unclaimed unit, `None` once everything has been handed out
    pub fn claim_next(&self) -> Option<usize> {
        let unit = self.next.fetch_add(1, Ordering::Relaxed);
        if unit >= self.count {
            return None;
        }
        self.report_progress(unit);
        Some(unit)
    }

    /// Stop handing out work. Units already claimed are unaffected.
    pub fn abort(&self) {
        self.next.fetch_max(self.count, Ordering::Relaxed);
    }

    fn report_progress(&self, claimed: usize) {
        let Some(progress) = &self.progress else {
            return;
        };
        let now = Instant::now();
        // Whoever holds the lock reports, everyone else carries on
        if let Ok(mut last) = progress.last_report.try_lock() {
            if now.duration_since(*last).as_millis() < PROGRESS_INTERVAL_MS {
                return;
            }
            let done = claimed as f32 / self.count as f32 * 100.0;
            let elapsed = progress.start.elapsed().as_secs_f32();
            let remaining = if done > 0.0 {
                elapsed * (100.0 - done) / done
            } else {
                0.0
            };
            info!("Vis build: {done:.1}% | Time: {elapsed:.1}s | ETA: {remaining:.1}s");
            *last = now;
        }
    }
}

/// Run `work` once on each of `threads` pool threads and wait for all of them.
///
/// `work` receives the worker index and is expected to drain `queue`. The
/// first worker to fail aborts the queue so the others wind down, and the
/// first error in worker order is returned.
pub fn run_workers<R, F>(threads: usize, queue: &WorkQueue, work: F) -> Result<Vec<R>, VisError>
where
    R: Send,
    F: Fn(usize) -> Result<R, VisError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("radvis-worker-{i}"))
        .build()
        .map_err(|e| VisError::ThreadPool(e.to_string()))?;

    let results = pool.broadcast(|ctx| {
        let result = work(ctx.index());
        if result.is_err() {
            queue.abort();
        }
        result
    });

    results.into_iter().collect()
}

//! Fixed-size worker pool with a shared batch cursor.
//!
//! Workers pull targets off an atomic cursor and process them sequentially;
//! within one worker outcomes follow pull order, across workers there is no
//! order. The scoped join is the batch barrier: exactly one outcome per
//! target comes back before `run_batch` returns, even while some workers are
//! mid-cooldown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::error::{Error, Result};
use crate::fetcher::Outcome;
use crate::target::DownloadTarget;

/// One pool worker. Implementations own their per-thread state (HTTP handle,
/// breaker). Closures get a blanket impl so tests can inject fetch stubs.
pub trait Worker {
    fn process(&mut self, target: &DownloadTarget) -> Outcome;
}

impl<F> Worker for F
where
    F: FnMut(&DownloadTarget) -> Outcome,
{
    fn process(&mut self, target: &DownloadTarget) -> Outcome {
        self(target)
    }
}

/// Runs every target in `targets` on a pool of `num_workers` threads, each
/// built fresh by `make_worker(worker_id)` inside its own thread.
pub fn run_batch<W, F>(
    targets: &[DownloadTarget],
    num_workers: usize,
    make_worker: F,
) -> Result<Vec<Outcome>>
where
    W: Worker,
    F: Fn(usize) -> W + Sync,
{
    if targets.is_empty() {
        return Ok(Vec::new());
    }
    let num_workers = num_workers.max(1).min(targets.len());
    let cursor = &AtomicUsize::new(0);
    let make_worker = &make_worker;

    thread::scope(|scope| {
        let handles: Vec<_> = (0..num_workers)
            .map(|worker_id| {
                scope.spawn(move || {
                    let mut worker = make_worker(worker_id);
                    let mut outcomes = Vec::new();
                    loop {
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(target) = targets.get(index) else {
                            break;
                        };
                        outcomes.push(worker.process(target));
                    }
                    outcomes
                })
            })
            .collect();

        let mut all = Vec::with_capacity(targets.len());
        let mut panicked = false;
        for handle in handles {
            match handle.join() {
                Ok(outcomes) => all.extend(outcomes),
                Err(_) => panicked = true,
            }
        }
        if panicked {
            return Err(Error::WorkerPanicked);
        }
        Ok(all)
    })
}

//! Advisory progress output, injected into the downloader.
//!
//! Observability only: the ledger is the correctness contract, these events
//! are for humans watching a run. The observer is an explicit instance passed
//! to the downloader, never process-global state.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receiver for advisory progress events. All methods default to no-ops so
/// implementations pick what they care about.
pub trait ProgressObserver: Send + Sync {
    /// A batch of `_n` targets is about to run.
    fn batch_started(&self, _n: usize) {}
    /// One target fetched and stored.
    fn fetched(&self, _url: &str) {}
    /// One target failed (`_status` is `None` for transport errors).
    fn failed(&self, _url: &str, _status: Option<u32>) {}
    /// A worker's breaker paused it after a failure streak.
    fn breaker_tripped(&self, _url: &str, _status: Option<u32>) {}
    /// A fetched body could not be written to `_dest`.
    fn write_failed(&self, _dest: &Path, _err: &io::Error) {}
}

/// Stderr observer: `o`/`x` per outcome, a running count every 1000 targets,
/// and an explicit line naming the URL and status when a breaker trips.
#[derive(Debug, Default)]
pub struct StderrProgress {
    processed: AtomicU64,
}

impl StderrProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(&self, tag: &str) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(tag.as_bytes());
        if processed % 1000 == 0 {
            let _ = write!(stderr, "# processed urls: {}...", processed);
        }
        let _ = stderr.flush();
    }
}

impl ProgressObserver for StderrProgress {
    fn batch_started(&self, n: usize) {
        eprintln!("# files to download: {}", n);
    }

    fn fetched(&self, _url: &str) {
        self.mark("o");
    }

    fn failed(&self, _url: &str, _status: Option<u32>) {
        self.mark("x");
    }

    fn breaker_tripped(&self, url: &str, status: Option<u32>) {
        let code = status.map_or_else(|| "none".to_string(), |c| c.to_string());
        eprintln!();
        eprintln!("last error status is {}, error url: {}", code, url);
    }

    fn write_failed(&self, dest: &Path, err: &io::Error) {
        eprintln!();
        eprintln!("write failed for {}: {}", dest.display(), err);
    }
}

/// Observer that swallows everything. Used when verbosity is off and in tests.
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {}

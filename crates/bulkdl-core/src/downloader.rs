//! Public downloader: construction, reconciliation, batch loop.
//!
//! A [`Downloader`] owns the immutable full target list, the pending subset,
//! and the ledger for one output directory. Batches run on the worker pool;
//! between batches the outcomes are flushed to the ledger in one append and
//! the pending list is recomputed. Nothing mutates the pending list while
//! workers are running.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BulkdlConfig;
use crate::error::{Error, Result};
use crate::fetcher::{BodySink, Outcome};
use crate::progress::{ProgressObserver, SilentProgress, StderrProgress};
use crate::progress_log::{LogRecord, ProgressLog};
use crate::scheduler;
use crate::target::{self, DownloadTarget};
use crate::worker::{WorkerContext, WorkerSettings};

/// Ledger filename inside the output directory.
const LOG_FILE: &str = "downloaded.log";
/// Subdirectory of the output directory receiving downloaded bodies.
const DATA_DIR: &str = "data";

/// Builder for [`Downloader`]. Defaults: 4 workers, error tolerance 1000,
/// no cooldown, 600 s timeout, batch size 1024, empty headers, stderr
/// progress.
pub struct DownloaderBuilder {
    urls: Vec<String>,
    names: Option<Vec<String>>,
    out_dir: PathBuf,
    num_workers: usize,
    err_tolerance: u32,
    cooldown: Duration,
    timeout: Duration,
    batch_size: usize,
    headers: HashMap<String, String>,
    verbose: bool,
    sink: Option<Box<BodySink>>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl DownloaderBuilder {
    pub fn new(urls: Vec<String>, out_dir: impl Into<PathBuf>) -> Self {
        let defaults = BulkdlConfig::default();
        Self {
            urls,
            names: None,
            out_dir: out_dir.into(),
            num_workers: defaults.num_workers,
            err_tolerance: defaults.err_tolerance,
            cooldown: Duration::from_secs(defaults.cooldown_secs),
            timeout: Duration::from_secs(defaults.timeout_secs),
            batch_size: defaults.batch_size,
            headers: HashMap::new(),
            verbose: true,
            sink: None,
            observer: None,
        }
    }

    /// Explicit output filenames, paired 1:1 with the URLs.
    pub fn output_names(mut self, names: Vec<String>) -> Self {
        self.names = Some(names);
        self
    }

    pub fn workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn err_tolerance(mut self, tolerance: u32) -> Self {
        self.err_tolerance = tolerance;
        self
    }

    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Drop the default stderr progress output.
    pub fn quiet(mut self) -> Self {
        self.verbose = false;
        self
    }

    /// Replace the progress output entirely.
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the default body writer with a caller-supplied sink.
    pub fn body_sink<S>(mut self, sink: S) -> Self
    where
        S: Fn(&Path, &[u8]) -> io::Result<()> + Send + Sync + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Creates the output layout (`data/` and the ledger), builds the target
    /// list, and reconciles it against whatever the ledger already holds.
    pub fn build(self) -> Result<Downloader> {
        let data_dir = self.out_dir.join(DATA_DIR);
        fs::create_dir_all(&data_dir).map_err(|source| Error::OutputDir {
            path: data_dir.clone(),
            source,
        })?;
        let log = ProgressLog::open(&self.out_dir.join(LOG_FILE))?;
        let all_targets = target::build_targets(&self.urls, self.names.as_deref(), &data_dir)?;

        let observer: Arc<dyn ProgressObserver> = match self.observer {
            Some(observer) => observer,
            None if self.verbose => Arc::new(StderrProgress::new()),
            None => Arc::new(SilentProgress),
        };
        let settings = Arc::new(WorkerSettings {
            headers: self.headers,
            timeout: self.timeout,
            err_tolerance: self.err_tolerance,
            cooldown: self.cooldown,
            sink: self.sink,
            observer: Arc::clone(&observer),
        });

        let mut downloader = Downloader {
            all_targets,
            pending: Vec::new(),
            log,
            num_workers: self.num_workers,
            batch_size: self.batch_size,
            settings,
            observer,
        };
        downloader.reconcile()?;
        tracing::info!(
            "downloader ready: {} target(s), {} pending",
            downloader.all_targets.len(),
            downloader.pending.len()
        );
        Ok(downloader)
    }
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Accumulated outcome counts for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Downloader {
    all_targets: Vec<DownloadTarget>,
    pending: Vec<DownloadTarget>,
    log: ProgressLog,
    num_workers: usize,
    batch_size: usize,
    settings: Arc<WorkerSettings>,
    observer: Arc<dyn ProgressObserver>,
}

impl Downloader {
    /// Reloads the ledger and recomputes the pending list.
    fn reconcile(&mut self) -> Result<()> {
        let records = self.log.load_all()?;
        self.pending = target::reconcile(&self.all_targets, &records);
        Ok(())
    }

    /// Number of targets not yet satisfied by the ledger. Reconciles against
    /// a fresh reload first, so it is accurate after external log changes.
    pub fn pending_count(&mut self) -> Result<usize> {
        self.reconcile()?;
        Ok(self.pending.len())
    }

    /// Targets still pending as of the last reconciliation.
    pub fn pending(&self) -> &[DownloadTarget] {
        &self.pending
    }

    /// Runs the first `min(limit, pending)` targets through the pool, appends
    /// every outcome to the ledger in one write, and reconciles. Does not
    /// return until each target of the batch has an outcome.
    pub fn run_batch(&mut self, limit: usize) -> Result<BatchReport> {
        let len = limit.min(self.pending.len());
        if len == 0 {
            return Ok(BatchReport::default());
        }

        self.observer.batch_started(len);
        tracing::info!(
            "batch of {} target(s) on {} worker(s)",
            len,
            self.num_workers
        );

        let settings = &self.settings;
        let outcomes = scheduler::run_batch(&self.pending[..len], self.num_workers, |id| {
            WorkerContext::new(id, Arc::clone(settings))
        })?;

        let records: Vec<LogRecord> = outcomes.iter().map(Outcome::to_record).collect();
        self.log.append(&records)?;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let report = BatchReport {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        };
        self.reconcile()?;
        Ok(report)
    }

    /// Drains the pending set, one batch at a time, until nothing is left.
    /// A failed target is consumed for this run (its ledger record satisfies
    /// it at reconcile time); re-attempting requires a fresh run.
    pub fn run(&mut self) -> Result<RunReport> {
        let mut report = RunReport::default();
        while !self.pending.is_empty() {
            let batch = self.run_batch(self.batch_size)?;
            if batch.attempted == 0 {
                break;
            }
            report.batches += 1;
            report.succeeded += batch.succeeded;
            report.failed += batch.failed;
        }
        tracing::info!(
            "run finished: {} ok, {} failed over {} batch(es)",
            report.succeeded,
            report.failed,
            report.batches
        );
        Ok(report)
    }
}

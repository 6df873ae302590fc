//! Per-thread worker context: one HTTP handle, one breaker.
//!
//! Replaces hidden thread-local lookup with an explicit object built inside
//! each pool thread. The `Easy` handle lives as long as the worker, so
//! connections are reused across the targets that worker pulls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use curl::easy::Easy;

use crate::breaker::ErrorBreaker;
use crate::fetcher::{self, BodySink, Outcome};
use crate::progress::ProgressObserver;
use crate::scheduler::Worker;
use crate::target::DownloadTarget;

/// Settings shared by every worker of one downloader.
pub struct WorkerSettings {
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
    pub err_tolerance: u32,
    pub cooldown: Duration,
    pub sink: Option<Box<BodySink>>,
    pub observer: Arc<dyn ProgressObserver>,
}

pub struct WorkerContext {
    id: usize,
    easy: Easy,
    breaker: ErrorBreaker,
    settings: Arc<WorkerSettings>,
}

impl WorkerContext {
    pub fn new(id: usize, settings: Arc<WorkerSettings>) -> Self {
        let breaker = ErrorBreaker::new(settings.err_tolerance, settings.cooldown);
        Self {
            id,
            easy: Easy::new(),
            breaker,
            settings,
        }
    }
}

impl Worker for WorkerContext {
    fn process(&mut self, target: &DownloadTarget) -> Outcome {
        let report = fetcher::fetch_and_store(
            &mut self.easy,
            &target.url,
            &target.dest,
            &self.settings.headers,
            self.settings.timeout,
            self.settings.sink.as_deref(),
        );

        if let Some(err) = &report.write_error {
            self.settings.observer.write_failed(&target.dest, err);
        }

        match &report.outcome {
            Outcome::Success { url } => {
                self.breaker.record_success();
                self.settings.observer.fetched(url);
            }
            Outcome::Failure { url, status } => {
                self.settings.observer.failed(url, *status);
                if self.breaker.record_failure() {
                    tracing::warn!(
                        worker = self.id,
                        url = %url,
                        status = ?status,
                        "breaker tripped, worker cooled down"
                    );
                    self.settings.observer.breaker_tripped(url, *status);
                }
            }
        }

        report.outcome
    }
}

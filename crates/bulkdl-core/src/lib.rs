//! Resumable, concurrent bulk URL downloader engine.
//!
//! Fetches a set of URLs in parallel on a fixed pool of worker threads and
//! records each outcome in an append-only ledger, so a re-run over the same
//! output directory resumes instead of re-downloading.

pub mod breaker;
pub mod config;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod progress;
pub mod progress_log;
pub mod scheduler;
pub mod target;
pub mod url_model;
pub mod worker;

pub use downloader::{BatchReport, Downloader, DownloaderBuilder, RunReport};
pub use error::{Error, Result};
pub use fetcher::Outcome;

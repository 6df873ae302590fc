//! Typed errors for the library surface.
//!
//! Per-target transport failures are not errors: they become
//! [`crate::fetcher::Outcome::Failure`] values and are recorded in the ledger.
//! Only conditions that must stop a construction or a run live here.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Explicit output names were supplied but do not pair 1:1 with the URLs.
    #[error("url list has {urls} entries but name list has {names}")]
    NameListMismatch { urls: usize, names: usize },

    /// A URL could not be parsed while deriving its destination filename.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The progress ledger could not be opened, read, or appended to.
    /// The ledger is the source of truth for resumption, so this aborts a run.
    #[error("progress log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory (or its `data/` subdirectory) could not be created.
    #[error("output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A pool thread panicked; the batch's outcomes cannot be trusted.
    #[error("worker thread panicked")]
    WorkerPanicked,
}

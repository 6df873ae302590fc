//! Blocking HTTP fetch-and-store for one target.
//!
//! One GET per call on a reused `curl::easy::Easy` handle (connection reuse
//! across a worker's targets), body buffered in memory, then written to the
//! destination or handed to a caller-supplied sink. The transport result is
//! classified into an explicit [`Outcome`].

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use curl::easy::{Easy, List};
use thiserror::Error;

use crate::progress_log::{LogRecord, LogStatus};

/// Caller-supplied replacement for the default body writer.
pub type BodySink = dyn Fn(&Path, &[u8]) -> io::Result<()> + Send + Sync;

/// Why a single GET did not produce a body.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, connection failure, DNS error: anything libcurl reports
    /// before an HTTP status exists.
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("http status {0}")]
    Status(u32),
}

impl FetchError {
    pub fn status_code(&self) -> Option<u32> {
        match self {
            FetchError::Status(code) => Some(*code),
            FetchError::Transport(_) => None,
        }
    }
}

/// Result of attempting one target. Immutable once produced; converted 1:1
/// into a ledger record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { url: String },
    Failure { url: String, status: Option<u32> },
}

impl Outcome {
    pub fn url(&self) -> &str {
        match self {
            Outcome::Success { url } | Outcome::Failure { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn to_record(&self) -> LogRecord {
        let status = if self.is_success() {
            LogStatus::Done
        } else {
            LogStatus::Failed
        };
        LogRecord {
            url: self.url().to_string(),
            status,
        }
    }
}

/// An [`Outcome`] plus the body-write error, if any. The write error never
/// changes the outcome (the ledger mirrors fetch results, not disk state);
/// it is surfaced separately so the observer can report it.
pub struct FetchReport {
    pub outcome: Outcome,
    pub write_error: Option<io::Error>,
}

/// Issues one GET with the given timeout and header set, buffering the body.
pub fn fetch(
    easy: &mut Easy,
    url: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    easy.timeout(timeout)?;

    let mut list = List::new();
    for (name, value) in headers {
        list.append(&format!("{}: {}", name.trim(), value.trim()))?;
    }
    easy.http_headers(list)?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Status(code));
    }
    Ok(body)
}

/// Fetches one target and persists the body (default writer truncates/creates
/// `dest`; a sink replaces it). Nothing is written on a failed fetch. The
/// destination's parent directory must already exist.
pub fn fetch_and_store(
    easy: &mut Easy,
    url: &str,
    dest: &Path,
    headers: &HashMap<String, String>,
    timeout: Duration,
    sink: Option<&BodySink>,
) -> FetchReport {
    match fetch(easy, url, headers, timeout) {
        Ok(body) => {
            let written = match sink {
                Some(sink) => sink(dest, &body),
                None => fs::write(dest, &body),
            };
            let write_error = match written {
                Ok(()) => None,
                Err(err) => {
                    tracing::warn!("body write failed for {}: {}", dest.display(), err);
                    Some(err)
                }
            };
            FetchReport {
                outcome: Outcome::Success {
                    url: url.to_string(),
                },
                write_error,
            }
        }
        Err(err) => {
            tracing::debug!("GET {} failed: {}", url, err);
            FetchReport {
                outcome: Outcome::Failure {
                    url: url.to_string(),
                    status: err.status_code(),
                },
                write_error: None,
            }
        }
    }
}

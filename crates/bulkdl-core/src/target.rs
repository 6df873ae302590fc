//! Download targets and pending-set reconciliation.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::progress_log::LogRecord;
use crate::url_model;

/// One URL plus the local path its body should land at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub dest: PathBuf,
}

/// Builds the full target list once, at construction.
///
/// Without explicit names, URLs are deduplicated by value (first occurrence
/// kept, input order preserved) and the filename is derived from each URL.
/// With explicit names, the lists must pair 1:1 and nothing is deduplicated:
/// the same URL may legitimately map to several destination files.
pub fn build_targets(
    urls: &[String],
    names: Option<&[String]>,
    data_dir: &Path,
) -> Result<Vec<DownloadTarget>> {
    match names {
        Some(names) => {
            if urls.len() != names.len() {
                return Err(Error::NameListMismatch {
                    urls: urls.len(),
                    names: names.len(),
                });
            }
            Ok(urls
                .iter()
                .zip(names)
                .map(|(url, name)| DownloadTarget {
                    url: url.clone(),
                    dest: data_dir.join(name),
                })
                .collect())
        }
        None => {
            let mut seen = HashSet::new();
            let mut targets = Vec::with_capacity(urls.len());
            for url in urls {
                if !seen.insert(url.as_str()) {
                    continue;
                }
                let name = url_model::derive_dest_filename(url)?;
                targets.push(DownloadTarget {
                    url: url.clone(),
                    dest: data_dir.join(name),
                });
            }
            Ok(targets)
        }
    }
}

/// Recomputes the pending list: multiset subtraction of logged URLs from the
/// full target list.
///
/// Each log record (success or failure alike; a failed target is processed,
/// not retried) cancels one pending instance of its URL. Targets that survive
/// keep their original relative order. Running this again with no new records
/// yields the same result.
pub fn reconcile(all_targets: &[DownloadTarget], records: &[LogRecord]) -> Vec<DownloadTarget> {
    let mut remaining: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *remaining.entry(record.url.as_str()).or_insert(0) += 1;
    }

    let mut pending = Vec::new();
    for target in all_targets {
        match remaining.get_mut(target.url.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => pending.push(target.clone()),
        }
    }
    pending
}

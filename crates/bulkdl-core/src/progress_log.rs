//! Append-only progress ledger (`downloaded.log`).
//!
//! One tab-separated line per attempted target: `<url>\t<o|x>`. The file only
//! ever grows; a URL may appear many times across runs and each occurrence
//! satisfies one pending instance at reconcile time. Appends from concurrent
//! batches are serialized through one mutex-guarded write so lines never
//! interleave; a line torn by a crash is skipped on reload.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// On-disk outcome tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    /// Body fetched; written `o`.
    Done,
    /// Fetch failed; written `x`. Still counts as processed for resumption.
    Failed,
}

impl LogStatus {
    pub fn as_tag(self) -> &'static str {
        match self {
            LogStatus::Done => "o",
            LogStatus::Failed => "x",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "o" => Some(LogStatus::Done),
            "x" => Some(LogStatus::Failed),
            _ => None,
        }
    }
}

/// One ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub url: String,
    pub status: LogStatus,
}

/// Handle on the ledger file. Opening creates the file if absent.
pub struct ProgressLog {
    path: PathBuf,
    writer: Mutex<File>,
}

impl ProgressLog {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| Error::Log {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends all records in one write. Best-effort durability: a crash
    /// mid-write may tear the last line, which reload tolerates.
    pub fn append(&self, records: &[LogRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut buf = String::new();
        for record in records {
            buf.push_str(&record.url);
            buf.push('\t');
            buf.push_str(record.status.as_tag());
            buf.push('\n');
        }
        let mut file = self.writer.lock().expect("ledger writer lock poisoned");
        file.write_all(buf.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| self.io_error(source))
    }

    /// Re-reads the whole file. Blank lines, `#` marker lines, and lines
    /// without a recognizable `<url>\t<tag>` shape are skipped; duplicates
    /// are preserved.
    pub fn load_all(&self) -> Result<Vec<LogRecord>> {
        let file = File::open(&self.path).map_err(|source| self.io_error(source))?;
        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| self.io_error(source))?;
            if let Some(record) = parse_line(&line) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::Log {
            path: self.path.clone(),
            source,
        }
    }
}

fn parse_line(line: &str) -> Option<LogRecord> {
    let line = line.trim_end_matches(['\r', ' ']);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (url, tag) = line.rsplit_once('\t')?;
    if url.is_empty() {
        return None;
    }
    Some(LogRecord {
        url: url.to_string(),
        status: LogStatus::from_tag(tag)?,
    })
}

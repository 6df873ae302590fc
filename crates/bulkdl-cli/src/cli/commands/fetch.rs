//! `bulkdl fetch` – download a URL list into an output directory.

use anyhow::{bail, Context, Result};
use bulkdl_core::config::BulkdlConfig;
use bulkdl_core::DownloaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct FetchOpts {
    pub list: PathBuf,
    pub out_dir: PathBuf,
    pub workers: Option<usize>,
    pub batch_size: Option<usize>,
    pub timeout: Option<u64>,
    pub err_tolerance: Option<u32>,
    pub cooldown: Option<u64>,
    pub headers: Vec<String>,
    pub quiet: bool,
}

pub fn run_fetch(opts: FetchOpts, cfg: &BulkdlConfig) -> Result<()> {
    let (urls, names) = read_url_list(&opts.list)?;
    if urls.is_empty() {
        println!("No urls in {}.", opts.list.display());
        return Ok(());
    }
    let headers = parse_headers(&opts.headers)?;

    let mut builder = DownloaderBuilder::new(urls, &opts.out_dir)
        .workers(opts.workers.unwrap_or(cfg.num_workers))
        .batch_size(opts.batch_size.unwrap_or(cfg.batch_size))
        .timeout(Duration::from_secs(opts.timeout.unwrap_or(cfg.timeout_secs)))
        .err_tolerance(opts.err_tolerance.unwrap_or(cfg.err_tolerance))
        .cooldown(Duration::from_secs(opts.cooldown.unwrap_or(cfg.cooldown_secs)))
        .headers(headers);
    if let Some(names) = names {
        builder = builder.output_names(names);
    }
    if opts.quiet {
        builder = builder.quiet();
    }

    let mut downloader = builder.build().context("construct downloader")?;
    let report = downloader.run().context("download run")?;
    println!(
        "{} downloaded, {} failed in {} batch(es); output in {}",
        report.succeeded,
        report.failed,
        report.batches,
        opts.out_dir.display()
    );
    Ok(())
}

/// Reads a URL list file and splits it into URLs and (optional) output names.
pub(crate) fn read_url_list(path: &Path) -> Result<(Vec<String>, Option<Vec<String>>)> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read url list {}", path.display()))?;
    parse_entries(&data).with_context(|| format!("parse url list {}", path.display()))
}

/// One URL per line, optional tab-separated output name, `#` comments and
/// blank lines skipped. Names are all-or-nothing: mixing named and unnamed
/// entries is rejected, matching the engine's 1:1 pairing rule.
fn parse_entries(data: &str) -> Result<(Vec<String>, Option<Vec<String>>)> {
    let mut urls = Vec::new();
    let mut names = Vec::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once('\t') {
            Some((url, name)) => {
                urls.push(url.trim().to_string());
                names.push(name.trim().to_string());
            }
            None => urls.push(line.to_string()),
        }
    }
    if names.is_empty() {
        Ok((urls, None))
    } else if names.len() == urls.len() {
        Ok((urls, Some(names)))
    } else {
        bail!("list mixes named and unnamed entries");
    }
}

fn parse_headers(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut headers = HashMap::new();
    for header in raw {
        let Some((name, value)) = header.split_once(':') else {
            bail!("header {:?} is not `Name: value`", header);
        };
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }
    Ok(headers)
}

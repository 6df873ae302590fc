//! `bulkdl status` – pending count for a URL list against an output directory.

use anyhow::{Context, Result};
use bulkdl_core::DownloaderBuilder;
use std::path::Path;

use super::fetch::read_url_list;

pub fn run_status(list: &Path, out_dir: &Path) -> Result<()> {
    let (urls, names) = read_url_list(list)?;
    let total = urls.len();

    let mut builder = DownloaderBuilder::new(urls, out_dir).quiet();
    if let Some(names) = names {
        builder = builder.output_names(names);
    }
    let mut downloader = builder.build().context("construct downloader")?;
    let pending = downloader.pending_count()?;

    println!(
        "{} of {} target(s) pending in {}",
        pending,
        total,
        out_dir.display()
    );
    Ok(())
}

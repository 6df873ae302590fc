//! Integration tests: full download runs against a local HTTP server.
//!
//! Covers the end-to-end contract: bodies land under `data/`, every attempt
//! leaves a ledger line, resumption skips the network, failures are consumed
//! rather than retried.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bulkdl_core::progress_log::{LogStatus, ProgressLog};
use bulkdl_core::DownloaderBuilder;
use common::http_server::{self, Route};
use tempfile::tempdir;

fn routes(entries: &[(&str, Route)]) -> HashMap<String, Route> {
    entries
        .iter()
        .map(|(path, route)| (path.to_string(), route.clone()))
        .collect()
}

#[test]
fn two_urls_end_to_end_then_resume_without_network() {
    let server = http_server::start(routes(&[
        ("/a.jpg", Route::ok(b"A")),
        ("/b.jpg", Route::ok(b"B")),
    ]));
    let out = tempdir().unwrap();
    let urls = vec![server.url("/a.jpg"), server.url("/b.jpg")];

    let mut downloader = DownloaderBuilder::new(urls.clone(), out.path())
        .quiet()
        .build()
        .unwrap();
    let report = downloader.run().unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 0);

    assert_eq!(
        std::fs::read(out.path().join("data/a.jpg")).unwrap(),
        b"A"
    );
    assert_eq!(
        std::fs::read(out.path().join("data/b.jpg")).unwrap(),
        b"B"
    );

    let log = ProgressLog::open(&out.path().join("downloaded.log")).unwrap();
    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.status == LogStatus::Done));

    assert_eq!(downloader.pending_count().unwrap(), 0);

    // a fresh downloader over the same directory resumes purely from the
    // ledger: pending is zero and the server sees no further requests
    let hits_before = server.hits();
    let mut resumed = DownloaderBuilder::new(urls, out.path())
        .quiet()
        .build()
        .unwrap();
    assert_eq!(resumed.pending_count().unwrap(), 0);
    assert_eq!(resumed.run().unwrap().succeeded, 0);
    assert_eq!(server.hits(), hits_before);
}

#[test]
fn failed_target_is_logged_and_not_retried() {
    let server = http_server::start(routes(&[("/present", Route::ok(b"ok"))]));
    let out = tempdir().unwrap();
    let urls = vec![server.url("/missing")];

    let mut downloader = DownloaderBuilder::new(urls.clone(), out.path())
        .quiet()
        .build()
        .unwrap();
    let report = downloader.run().unwrap();
    assert_eq!(report.failed, 1);
    assert!(!out.path().join("data/missing").exists());

    let log = ProgressLog::open(&out.path().join("downloaded.log")).unwrap();
    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, LogStatus::Failed);

    // the failure consumed the target: a new run sees nothing pending
    let hits_before = server.hits();
    let mut retry = DownloaderBuilder::new(urls, out.path())
        .quiet()
        .build()
        .unwrap();
    assert_eq!(retry.pending_count().unwrap(), 0);
    assert_eq!(server.hits(), hits_before);
}

#[test]
fn second_run_fetches_only_new_targets() {
    let server = http_server::start(routes(&[
        ("/a.bin", Route::ok(b"aaa")),
        ("/b.bin", Route::ok(b"bbb")),
    ]));
    let out = tempdir().unwrap();

    let mut first = DownloaderBuilder::new(vec![server.url("/a.bin")], out.path())
        .quiet()
        .build()
        .unwrap();
    first.run().unwrap();
    assert_eq!(server.hits(), 1);

    let mut second = DownloaderBuilder::new(
        vec![server.url("/a.bin"), server.url("/b.bin")],
        out.path(),
    )
    .quiet()
    .build()
    .unwrap();
    assert_eq!(second.pending_count().unwrap(), 1);
    let report = second.run().unwrap();
    assert_eq!(report.succeeded, 1);
    // /a.bin was never requested again
    assert_eq!(server.hits(), 2);
    assert_eq!(
        std::fs::read(out.path().join("data/b.bin")).unwrap(),
        b"bbb"
    );
}

#[test]
fn small_batches_drain_everything() {
    let server = http_server::start(routes(&[
        ("/1", Route::ok(b"1")),
        ("/2", Route::ok(b"2")),
        ("/3", Route::ok(b"3")),
    ]));
    let out = tempdir().unwrap();
    let urls = vec![server.url("/1"), server.url("/2"), server.url("/3")];

    let mut downloader = DownloaderBuilder::new(urls, out.path())
        .quiet()
        .batch_size(1)
        .build()
        .unwrap();
    let report = downloader.run().unwrap();
    assert_eq!(report.batches, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(downloader.pending_count().unwrap(), 0);
}

#[test]
fn duplicate_url_with_distinct_names_downloads_twice() {
    let server = http_server::start(routes(&[("/img", Route::ok(b"pixels"))]));
    let out = tempdir().unwrap();
    let urls = vec![server.url("/img"), server.url("/img")];

    let mut downloader = DownloaderBuilder::new(urls, out.path())
        .output_names(vec!["first.jpg".into(), "second.jpg".into()])
        .quiet()
        .build()
        .unwrap();
    assert_eq!(downloader.pending_count().unwrap(), 2);
    let report = downloader.run().unwrap();
    assert_eq!(report.succeeded, 2);
    assert_eq!(
        std::fs::read(out.path().join("data/first.jpg")).unwrap(),
        b"pixels"
    );
    assert_eq!(
        std::fs::read(out.path().join("data/second.jpg")).unwrap(),
        b"pixels"
    );
    assert_eq!(downloader.pending_count().unwrap(), 0);
}

#[test]
fn custom_sink_replaces_the_file_writer() {
    let server = http_server::start(routes(&[("/payload", Route::ok(b"payload-bytes"))]));
    let out = tempdir().unwrap();

    let captured: Arc<Mutex<Vec<(String, Vec<u8>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_capture = Arc::clone(&captured);

    let mut downloader = DownloaderBuilder::new(vec![server.url("/payload")], out.path())
        .quiet()
        .body_sink(move |path, body| {
            sink_capture
                .lock()
                .unwrap()
                .push((path.display().to_string(), body.to_vec()));
            Ok(())
        })
        .build()
        .unwrap();
    let report = downloader.run().unwrap();
    assert_eq!(report.succeeded, 1);

    // sink got the body; the default writer never ran
    let captured = captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].1, b"payload-bytes");
    assert!(!out.path().join("data/payload").exists());
}

#[test]
fn timed_out_request_is_a_transport_failure() {
    let server = http_server::start(routes(&[(
        "/slow",
        Route::ok(b"late").delayed(Duration::from_millis(1500)),
    )]));
    let out = tempdir().unwrap();

    let mut downloader = DownloaderBuilder::new(vec![server.url("/slow")], out.path())
        .quiet()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let report = downloader.run().unwrap();
    assert_eq!(report.failed, 1);
    assert!(!out.path().join("data/slow").exists());

    let log = ProgressLog::open(&out.path().join("downloaded.log")).unwrap();
    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, LogStatus::Failed);
}

#[test]
fn mixed_batch_reports_both_outcomes() {
    let server = http_server::start(routes(&[
        ("/good", Route::ok(b"good")),
        ("/gone", Route::status(404)),
    ]));
    let out = tempdir().unwrap();
    let urls = vec![server.url("/good"), server.url("/gone")];

    let mut downloader = DownloaderBuilder::new(urls, out.path())
        .quiet()
        .workers(2)
        .build()
        .unwrap();
    let report = downloader.run().unwrap();
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(downloader.pending_count().unwrap(), 0);
}

//! Metrics collection using Prometheus
//!
//! Tracks:
//! - Janitor activity (files deleted, bytes freed, failures)
//! - Request outcomes and download duration
//!
//! Registration only fails on a duplicate metric name, which is a programming
//! error caught by the first test run, hence the unwraps below.

#![allow(clippy::unwrap_used)]

use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram};

// ======================
// JANITOR METRICS
// ======================

lazy_static! {
    /// Files removed by the retention janitor
    pub static ref JANITOR_FILES_DELETED_TOTAL: Counter = register_counter!(
        "grabbot_janitor_files_deleted_total",
        "Files removed by the retention janitor"
    )
    .unwrap();

    /// Bytes reclaimed by the retention janitor
    pub static ref JANITOR_BYTES_FREED_TOTAL: Counter = register_counter!(
        "grabbot_janitor_bytes_freed_total",
        "Bytes reclaimed by the retention janitor"
    )
    .unwrap();

    /// Individual files the janitor could not stat or delete
    pub static ref JANITOR_FILE_ERRORS_TOTAL: Counter = register_counter!(
        "grabbot_janitor_file_errors_total",
        "Files skipped by the janitor because stat or delete failed"
    )
    .unwrap();

    /// Whole sweep cycles that failed or panicked
    pub static ref JANITOR_CYCLE_FAILURES_TOTAL: Counter = register_counter!(
        "grabbot_janitor_cycle_failures_total",
        "Sweep cycles that failed and were skipped"
    )
    .unwrap();
}

// ======================
// REQUEST METRICS
// ======================

lazy_static! {
    /// Handled requests
    /// Labels: outcome (delivered/invalid_url/download_failed/timed_out/oversize/delivery_failed)
    pub static ref REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "grabbot_requests_total",
        "Handled download requests by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Download failures by error subcategory
    /// Labels: category (ytdlp/timeout/process/file_not_found/other)
    pub static ref DOWNLOAD_FAILURE_TOTAL: CounterVec = register_counter_vec!(
        "grabbot_download_failure_total",
        "Download failures by error category",
        &["category"]
    )
    .unwrap();

    /// Wall-clock time of the external download call
    pub static ref DOWNLOAD_DURATION_SECONDS: Histogram = register_histogram!(
        "grabbot_download_duration_seconds",
        "Time spent in the external downloader",
        vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 240.0, 600.0]
    )
    .unwrap();
}

/// Record one handled request
pub fn record_request(outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a failed download by category
pub fn record_download_failure(category: &str) {
    DOWNLOAD_FAILURE_TOTAL.with_label_values(&[category]).inc();
}

/// Record the outcome of one sweep
pub fn record_sweep(deleted: u64, freed_bytes: u64, failed: u64) {
    JANITOR_FILES_DELETED_TOTAL.inc_by(deleted as f64);
    JANITOR_BYTES_FREED_TOTAL.inc_by(freed_bytes as f64);
    JANITOR_FILE_ERRORS_TOTAL.inc_by(failed as f64);
}

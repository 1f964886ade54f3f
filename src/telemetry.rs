// src/telemetry.rs
use std::net::SocketAddr;

use anyhow::Context;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on the exporter).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "crawler_announcements_total",
            "New announcements admitted past the dedup window."
        );
        describe_counter!(
            "crawler_filings_processed_total",
            "Filings stored (raw + processed artifacts)."
        );
        describe_counter!(
            "crawler_job_failures_total",
            "Jobs dropped after an error, labeled by kind."
        );
        describe_counter!("crawler_feed_errors_total", "Feed fetch/parse failures.");
        describe_counter!(
            "crawler_cycle_errors_total",
            "Poll cycles that failed outright."
        );
        describe_counter!(
            "crawler_stub_pages_total",
            "Viewer stub pages hit during document resolution."
        );
        describe_gauge!("crawler_queue_depth", "Jobs waiting in the queue.");
        describe_gauge!("crawler_dedup_size", "Ids currently in the dedup window.");
    });
}

/// Install the Prometheus recorder with its built-in HTTP listener when
/// `METRICS_ADDR` is set; without it the metrics macros stay no-ops.
pub fn install_exporter() -> anyhow::Result<()> {
    let Ok(addr) = std::env::var("METRICS_ADDR") else {
        return Ok(());
    };
    let addr: SocketAddr = addr.parse().context("parsing METRICS_ADDR")?;
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("installing prometheus exporter")?;
    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}

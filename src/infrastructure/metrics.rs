// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use crate::domain::models::crawl_result::CrawlResult;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

pub const SITES_PROCESSED: &str = "contactrs_sites_processed_total";
pub const JOBS_TOTAL: &str = "contactrs_jobs_total";
pub const ACTIVE_JOBS: &str = "contactrs_active_jobs";

/// 安装Prometheus导出器
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    info!("Metrics exporter listening on {}", addr);
}

/// 记录单个站点的处理结果
pub fn record_site(result: &CrawlResult) {
    let method = result
        .method()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "none".to_string());
    let outcome = if result.is_error() { "error" } else { "ok" };

    metrics::counter!(SITES_PROCESSED, "method" => method, "outcome" => outcome).increment(1);
}

pub fn job_started() {
    metrics::gauge!(ACTIVE_JOBS).increment(1.0);
}

pub fn job_finished(cancelled: bool) {
    let outcome = if cancelled { "cancelled" } else { "completed" };
    metrics::gauge!(ACTIVE_JOBS).decrement(1.0);
    metrics::counter!(JOBS_TOTAL, "outcome" => outcome).increment(1);
}

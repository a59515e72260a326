// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prometheus metrics for the analysis endpoints
//!
//! - `psychdoodle_http_requests_total{endpoint,status}`
//! - `psychdoodle_analysis_duration_seconds{kind}`
//! - `psychdoodle_analysis_method_total{kind,method}`
//! - `psychdoodle_rate_limited_total`

use anyhow::{Context, Result};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::analysis::AnalysisMethod;

const NAMESPACE: &str = "psychdoodle";

/// Owns its registry so tests and multiple servers never collide
#[derive(Clone)]
pub struct AnalysisMetrics {
    registry: Registry,
    requests: IntCounterVec,
    analysis_duration: HistogramVec,
    analysis_method: IntCounterVec,
    rate_limited: IntCounter,
}

impl std::fmt::Debug for AnalysisMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisMetrics").finish_non_exhaustive()
    }
}

impl AnalysisMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by endpoint and status")
                .namespace(NAMESPACE),
            &["endpoint", "status"],
        )
        .context("Failed to create request counter")?;

        let analysis_duration = HistogramVec::new(
            HistogramOpts::new(
                "analysis_duration_seconds",
                "Time spent analyzing one submission",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["kind"],
        )
        .context("Failed to create duration histogram")?;

        let analysis_method = IntCounterVec::new(
            Opts::new("analysis_method_total", "Analyses by scoring method")
                .namespace(NAMESPACE),
            &["kind", "method"],
        )
        .context("Failed to create method counter")?;

        let rate_limited = IntCounter::with_opts(
            Opts::new("rate_limited_total", "Requests rejected by the rate limiter")
                .namespace(NAMESPACE),
        )
        .context("Failed to create rate limit counter")?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(analysis_duration.clone()))?;
        registry.register(Box::new(analysis_method.clone()))?;
        registry.register(Box::new(rate_limited.clone()))?;

        Ok(Self {
            registry,
            requests,
            analysis_duration,
            analysis_method,
            rate_limited,
        })
    }

    pub fn record_request(&self, endpoint: &str, status: u16) {
        self.requests
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    pub fn record_analysis(&self, kind: &str, method: AnalysisMethod, elapsed: Duration) {
        self.analysis_duration
            .with_label_values(&[kind])
            .observe(elapsed.as_secs_f64());
        self.analysis_method
            .with_label_values(&[kind, method.as_str()])
            .inc();
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.inc();
    }

    pub fn request_count(&self, endpoint: &str, status: u16) -> u64 {
        self.requests
            .with_label_values(&[endpoint, &status.to_string()])
            .get()
    }

    /// Text exposition format
    pub fn export(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}

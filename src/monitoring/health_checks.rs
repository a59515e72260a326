// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health reporting and the periodic health task

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::vision::{AnalysisModelInfo, AnalysisModelManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Serving, but every analyzer runs on heuristics
    Degraded,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Number, build tag, date and feature list
    pub version: serde_json::Value,
    pub uptime_seconds: u64,
    pub checked_at: DateTime<Utc>,
    pub models: Vec<AnalysisModelInfo>,
}

pub struct HealthChecker {
    models: Arc<AnalysisModelManager>,
    started: Instant,
    last_report: Arc<RwLock<Option<HealthReport>>>,
}

impl HealthChecker {
    pub fn new(models: Arc<AnalysisModelManager>) -> Self {
        Self {
            models,
            started: Instant::now(),
            last_report: Arc::new(RwLock::new(None)),
        }
    }

    /// Build a fresh report and remember it
    pub async fn check(&self) -> HealthReport {
        let models = self.models.list_models();
        let status = if models.iter().any(|m| m.available) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };

        let report = HealthReport {
            status,
            version: crate::version::get_version_info(),
            uptime_seconds: self.started.elapsed().as_secs(),
            checked_at: Utc::now(),
            models,
        };
        *self.last_report.write().await = Some(report.clone());
        report
    }

    pub async fn last_report(&self) -> Option<HealthReport> {
        self.last_report.read().await.clone()
    }

    /// Re-check every `interval` until the returned handle is aborted
    pub fn spawn_periodic(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        info!("Health checks every {}s", interval.as_secs());
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let report = self.check().await;
                debug!(
                    "Health check: {:?}, uptime {}s",
                    report.status, report.uptime_seconds
                );
            }
        })
    }
}

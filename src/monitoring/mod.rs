// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Metrics and health monitoring

pub mod health_checks;
pub mod metrics;

pub use health_checks::{HealthChecker, HealthReport, HealthStatus};
pub use metrics::AnalysisMetrics;

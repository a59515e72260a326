// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::monitoring::HealthReport;

pub const ANALYSIS_ENDPOINTS: &[&str] = &["/shape-analysis", "/doodle-analysis"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
}

/// Shapes offered for tracing exercises, grouped by difficulty
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredefinedShapesResponse {
    pub basic: Vec<String>,
    pub complex: Vec<String>,
    pub emotional: Vec<String>,
}

impl PredefinedShapesResponse {
    pub fn catalog() -> Self {
        let names = |shapes: &[&str]| shapes.iter().map(|s| s.to_string()).collect();
        Self {
            basic: names(&["triangle", "circle", "square"]),
            complex: names(&["star", "house", "tree", "person"]),
            emotional: names(&["heart", "smile", "frown"]),
        }
    }
}

/// GET /
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to AI-PsychDoodle-Analyzer API".to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
        endpoints: ANALYSIS_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// GET /predefined-shapes
pub async fn predefined_shapes_handler() -> Json<PredefinedShapesResponse> {
    Json(PredefinedShapesResponse::catalog())
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.check().await)
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let metrics = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))?;

    let body = metrics.export().map_err(|e| {
        warn!("Failed to export metrics: {}", e);
        ApiError::InternalError(e.to_string())
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shape analysis endpoint handler

use axum::{extract::State, Json};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::ShapeAnalysisRequest;
use super::response::ShapeAnalysisResponse;
use crate::analysis::{AnalysisError, ShapeAnalyzer};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::decode_base64_image;

/// POST /shape-analysis - Score a traced shape against its reference
///
/// Pipeline:
/// 1. Validate request (400 on failure)
/// 2. Decode both images
/// 3. Extract overlap, completion, steadiness and score them
/// 4. Pick feedback and a recommendation for the dominant category
///
/// Any failure after validation is reported as 500 "Analysis failed: ...".
pub async fn shape_analysis_handler(
    State(state): State<AppState>,
    Json(request): Json<ShapeAnalysisRequest>,
) -> Result<Json<ShapeAnalysisResponse>, ApiError> {
    debug!(
        "Shape analysis request: shape={}, response_time={}s",
        request.shape_type, request.response_time
    );

    if let Err(e) = request.validate() {
        warn!("Shape analysis validation failed: {}", e);
        return Err(e);
    }

    let analyzer = state.shape_analyzer.clone();
    let started = Instant::now();
    let response = tokio::task::spawn_blocking(move || run_analysis(&analyzer, &request))
        .await
        .map_err(|e| ApiError::InternalError(format!("Analysis task failed: {}", e)))?
        .map_err(|e| {
            warn!("Shape analysis failed: {}", e);
            ApiError::from(e)
        })?;

    let elapsed = started.elapsed();
    if let Some(metrics) = &state.metrics {
        metrics.record_analysis("shape", response.method, elapsed);
    }
    info!(
        "Shape analysis {} complete: {} via {}, {}ms",
        response.analysis_id,
        response
            .emotional_state
            .dominant()
            .map(|e| e.as_str())
            .unwrap_or("none"),
        response.method.as_str(),
        elapsed.as_millis()
    );

    Ok(Json(response))
}

fn run_analysis(
    analyzer: &ShapeAnalyzer,
    request: &ShapeAnalysisRequest,
) -> Result<ShapeAnalysisResponse, AnalysisError> {
    let (original, original_info) = decode_base64_image(&request.original_image)?;
    let (traced, traced_info) = decode_base64_image(&request.traced_image)?;
    debug!(
        "Decoded images: original {}x{}, traced {}x{}",
        original_info.width, original_info.height, traced_info.width, traced_info.height
    );

    let analysis = analyzer.analyze(
        &original.to_rgb8(),
        &traced.to_rgb8(),
        request.response_time,
        &request.shape_type,
    )?;

    let mut rng = rand::thread_rng();
    let feedback = analyzer.generate_feedback(&analysis.scores, &mut rng)?;
    let recommendation = analyzer.generate_recommendation(&analysis.scores, &mut rng)?;

    Ok(ShapeAnalysisResponse {
        analysis_id: Uuid::new_v4().to_string(),
        emotional_state: analysis.scores,
        feedback,
        recommendation,
        method: analysis.method,
        features: analysis.features,
    })
}

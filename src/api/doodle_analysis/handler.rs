// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Doodle analysis endpoint handler

use axum::{extract::State, Json};
use image::imageops::{self, FilterType};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::request::DoodleAnalysisRequest;
use super::response::{DominantColorInfo, DoodleAnalysisResponse};
use crate::analysis::{AnalysisError, DrawingAnalyzer};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::transform::DoodleTransformer;
use crate::vision::processing::detect_dominant_colors;
use crate::vision::{decode_base64_image, encode_base64_image, EncodeFormat};

/// Palette size reported per doodle
const DOMINANT_COLOR_COUNT: usize = 5;
/// Palette clustering runs on a thumbnail of at most this side length
const PALETTE_THUMBNAIL_SIZE: u32 = 64;

/// POST /doodle-analysis - Score a free-form drawing and transform it
///
/// Pipeline:
/// 1. Validate request (400 on failure)
/// 2. Decode the doodle
/// 3. Transform the doodle into a landscape (generator or swatch composite)
/// 4. Score color and composition features of the landscape
/// 5. Cluster the palette of the submitted doodle
pub async fn doodle_analysis_handler(
    State(state): State<AppState>,
    Json(request): Json<DoodleAnalysisRequest>,
) -> Result<Json<DoodleAnalysisResponse>, ApiError> {
    debug!(
        "Doodle analysis request: {} base64 chars",
        request.doodle_image.len()
    );

    if let Err(e) = request.validate() {
        warn!("Doodle analysis validation failed: {}", e);
        return Err(e);
    }

    let analyzer = state.drawing_analyzer.clone();
    let transformer = state.transformer.clone();
    let started = Instant::now();
    let response =
        tokio::task::spawn_blocking(move || run_analysis(&analyzer, &transformer, &request))
            .await
            .map_err(|e| ApiError::InternalError(format!("Analysis task failed: {}", e)))?
            .map_err(|e| {
                warn!("Doodle analysis failed: {}", e);
                ApiError::from(e)
            })?;

    let elapsed = started.elapsed();
    if let Some(metrics) = &state.metrics {
        metrics.record_analysis("doodle", response.method, elapsed);
    }
    info!(
        "Doodle analysis {} complete: {} via {}, transform via {}, {}ms",
        response.analysis_id,
        response
            .emotional_state
            .dominant()
            .map(|e| e.as_str())
            .unwrap_or("none"),
        response.method.as_str(),
        response.transform_method.as_str(),
        elapsed.as_millis()
    );

    Ok(Json(response))
}

fn run_analysis(
    analyzer: &DrawingAnalyzer,
    transformer: &DoodleTransformer,
    request: &DoodleAnalysisRequest,
) -> Result<DoodleAnalysisResponse, AnalysisError> {
    let (doodle, info) = decode_base64_image(&request.doodle_image)?;
    debug!(
        "Decoded doodle: {}x{}, {:?}, {} bytes",
        info.width, info.height, info.format, info.size_bytes
    );
    let doodle = doodle.to_rgb8();

    let transformed = transformer.transform(&doodle);
    let analysis = analyzer.analyze(&transformed.image)?;

    let mut rng = rand::thread_rng();
    let feedback = analyzer.generate_feedback(&analysis.scores, &mut rng)?;
    let recommendation = analyzer.generate_recommendation(&analysis.scores, &mut rng)?;

    let generated_image = encode_base64_image(&transformed.image, EncodeFormat::Jpeg)?;

    let thumbnail = imageops::resize(
        &doodle,
        PALETTE_THUMBNAIL_SIZE.min(doodle.width()),
        PALETTE_THUMBNAIL_SIZE.min(doodle.height()),
        FilterType::Nearest,
    );
    let dominant_colors = detect_dominant_colors(&thumbnail, DOMINANT_COLOR_COUNT)
        .iter()
        .map(DominantColorInfo::from)
        .collect();

    Ok(DoodleAnalysisResponse {
        analysis_id: Uuid::new_v4().to_string(),
        generated_image,
        emotional_state: analysis.scores,
        feedback,
        recommendation,
        dominant_colors,
        method: analysis.method,
        transform_method: transformed.method,
        features: analysis.features,
    })
}

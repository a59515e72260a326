// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shape analysis request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Request for POST /shape-analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeAnalysisRequest {
    /// Base64-encoded reference shape
    pub original_image: String,

    /// Base64-encoded user tracing
    pub traced_image: String,

    /// Seconds the user took to trace the shape
    pub response_time: f32,

    /// Shape name, e.g. "triangle", "circle", "square"
    pub shape_type: String,
}

impl ShapeAnalysisRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.original_image.trim().is_empty() {
            return Err(ApiError::validation(
                "original_image",
                "original_image is required",
            ));
        }
        if self.traced_image.trim().is_empty() {
            return Err(ApiError::validation(
                "traced_image",
                "traced_image is required",
            ));
        }
        if !self.response_time.is_finite() || self.response_time < 0.0 {
            return Err(ApiError::validation(
                "response_time",
                format!(
                    "response_time must be a non-negative number of seconds, got {}",
                    self.response_time
                ),
            ));
        }
        if self.shape_type.trim().is_empty() {
            return Err(ApiError::validation("shape_type", "shape_type is required"));
        }
        Ok(())
    }
}

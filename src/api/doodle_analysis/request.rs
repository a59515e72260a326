// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Doodle analysis request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;

/// Request for POST /doodle-analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoodleAnalysisRequest {
    /// Base64-encoded drawing, optionally as a data URI
    pub doodle_image: String,
}

impl DoodleAnalysisRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.doodle_image.trim().is_empty() {
            return Err(ApiError::validation(
                "doodle_image",
                "doodle_image is required",
            ));
        }
        Ok(())
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Doodle analysis response types

use serde::Serialize;

use crate::analysis::{AnalysisMethod, DrawingFeatures, EmotionScores};
use crate::vision::DominantColor;

/// One palette entry of the submitted doodle
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DominantColorInfo {
    /// "#RRGGBB"
    pub hex: String,
    pub rgb: [u8; 3],
    /// Share of pixels (0.0-1.0)
    pub percentage: f32,
}

impl From<&DominantColor> for DominantColorInfo {
    fn from(color: &DominantColor) -> Self {
        Self {
            hex: color.hex(),
            rgb: color.rgb,
            percentage: color.fraction,
        }
    }
}

/// Response from POST /doodle-analysis
#[derive(Debug, Clone, Serialize)]
pub struct DoodleAnalysisResponse {
    pub analysis_id: String,

    /// Data URI of the transformed landscape (JPEG)
    pub generated_image: String,

    /// Normalized scores over the drawing categories
    pub emotional_state: EmotionScores,

    pub feedback: String,

    pub recommendation: String,

    /// Palette, largest cluster first
    pub dominant_colors: Vec<DominantColorInfo>,

    /// Scorer used for `emotional_state`
    pub method: AnalysisMethod,

    /// "model" when the generator produced the image, else "heuristic"
    pub transform_method: AnalysisMethod,

    pub features: DrawingFeatures,
}

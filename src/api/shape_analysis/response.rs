// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shape analysis response types

use serde::Serialize;

use crate::analysis::{AnalysisMethod, EmotionScores, ShapeFeatures};

/// Response from POST /shape-analysis
#[derive(Debug, Clone, Serialize)]
pub struct ShapeAnalysisResponse {
    /// Fresh UUID per request; analyses are not stored
    pub analysis_id: String,

    /// Normalized scores over the shape categories
    pub emotional_state: EmotionScores,

    pub feedback: String,

    pub recommendation: String,

    /// "model" or "heuristic"
    pub method: AnalysisMethod,

    pub features: ShapeFeatures,
}

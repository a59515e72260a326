// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Psychological-state analysis of traced shapes and free-form drawings
//!
//! Both analyzers follow the same pipeline: extract scalar features, score
//! each emotion category (trained model when loaded, heuristic otherwise),
//! then pick templated feedback for the dominant category.

pub mod drawing;
pub mod emotions;
pub mod feedback;
pub mod shape;

use serde::Serialize;
use thiserror::Error;

use crate::vision::{ImageError, ProcessingError};

pub use drawing::{DrawingAnalysis, DrawingAnalyzer, DrawingFeatures};
pub use emotions::{Emotion, EmotionScores, DRAWING_EMOTIONS, SHAPE_EMOTIONS};
pub use feedback::FeedbackTemplates;
pub use shape::{ShapeAnalysis, ShapeAnalyzer, ShapeFeatures};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Image(#[from] ImageError),

    #[error("{0}")]
    Processing(#[from] ProcessingError),

    #[error("No emotion scores to summarize")]
    EmptyScores,

    #[error("No feedback template for '{0}'")]
    MissingTemplate(Emotion),
}

/// Which scorer produced an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Model,
    Heuristic,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMethod::Model => "model",
            AnalysisMethod::Heuristic => "heuristic",
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model manager for the optional shape scorer, drawing scorer and doodle generator

use serde::Serialize;
use std::sync::Arc;

use super::onnx::{DoodleGeneratorModel, EmotionScoringModel, SessionOptions};

/// Number of inputs of the shape scoring model
pub const SHAPE_FEATURE_COUNT: usize = 4;
/// Number of inputs of the drawing scoring model (11 colors + 4 composition features)
pub const DRAWING_FEATURE_COUNT: usize = 15;
/// Both scorers predict one value per emotion category
pub const EMOTION_OUTPUT_COUNT: usize = 8;

/// Configuration for loading analysis models
#[derive(Debug, Clone, Default)]
pub struct AnalysisModelConfig {
    /// Path to the shape scoring ONNX model (optional)
    pub shape_model_path: Option<String>,
    /// Path to the drawing scoring ONNX model (optional)
    pub drawing_model_path: Option<String>,
    /// Path to the doodle generator ONNX model (optional)
    pub generator_model_path: Option<String>,
    pub session: SessionOptions,
}

/// Availability of one model, reported by `/health`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisModelInfo {
    pub name: String,
    pub model_type: String,
    pub available: bool,
}

/// Holds whichever trained models could be loaded
///
/// Every model is optional; analyzers fall back to heuristics when theirs
/// is missing.
#[derive(Debug, Default)]
pub struct AnalysisModelManager {
    shape_model: Option<Arc<EmotionScoringModel>>,
    drawing_model: Option<Arc<EmotionScoringModel>>,
    generator_model: Option<Arc<DoodleGeneratorModel>>,
}

impl AnalysisModelManager {
    /// Load every configured model; failures are logged and skipped
    pub fn new(config: &AnalysisModelConfig) -> Self {
        let shape_model = config.shape_model_path.as_deref().and_then(|path| {
            load_logged("shape scorer", path, || {
                EmotionScoringModel::new(
                    path,
                    SHAPE_FEATURE_COUNT,
                    EMOTION_OUTPUT_COUNT,
                    config.session,
                )
            })
        });

        let drawing_model = config.drawing_model_path.as_deref().and_then(|path| {
            load_logged("drawing scorer", path, || {
                EmotionScoringModel::new(
                    path,
                    DRAWING_FEATURE_COUNT,
                    EMOTION_OUTPUT_COUNT,
                    config.session,
                )
            })
        });

        let generator_model = config.generator_model_path.as_deref().and_then(|path| {
            load_logged("doodle generator", path, || {
                DoodleGeneratorModel::new(path, config.session)
            })
        });

        Self {
            shape_model,
            drawing_model,
            generator_model,
        }
    }

    /// Manager with no models: every analyzer runs its heuristic
    pub fn heuristic_only() -> Self {
        Self::default()
    }

    pub fn get_shape_model(&self) -> Option<Arc<EmotionScoringModel>> {
        self.shape_model.clone()
    }

    pub fn get_drawing_model(&self) -> Option<Arc<EmotionScoringModel>> {
        self.drawing_model.clone()
    }

    pub fn get_generator_model(&self) -> Option<Arc<DoodleGeneratorModel>> {
        self.generator_model.clone()
    }

    pub fn list_models(&self) -> Vec<AnalysisModelInfo> {
        vec![
            AnalysisModelInfo {
                name: "shape-analyzer".to_string(),
                model_type: "scoring".to_string(),
                available: self.shape_model.is_some(),
            },
            AnalysisModelInfo {
                name: "drawing-analyzer".to_string(),
                model_type: "scoring".to_string(),
                available: self.drawing_model.is_some(),
            },
            AnalysisModelInfo {
                name: "doodle-generator".to_string(),
                model_type: "generator".to_string(),
                available: self.generator_model.is_some(),
            },
        ]
    }
}

fn load_logged<T>(
    label: &str,
    path: &str,
    load: impl FnOnce() -> anyhow::Result<T>,
) -> Option<Arc<T>> {
    match load() {
        Ok(model) => {
            tracing::info!("✅ {} model loaded from {}", label, path);
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Could not load {} model from {}: {}. Using heuristic-based analysis instead.",
                label,
                path,
                e
            );
            None
        }
    }
}

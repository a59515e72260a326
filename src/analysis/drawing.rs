// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Free-form drawing analyzer
//!
//! Scores a doodle from its palette (color psychology weights) and its
//! composition: edge complexity, left/right balance, contrast, brightness.

use image::imageops::{self, FilterType};
use image::RgbImage;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::emotions::{Emotion, EmotionScores, DRAWING_EMOTIONS};
use super::feedback::FeedbackTemplates;
use super::{AnalysisError, AnalysisMethod};
use crate::vision::color::{ColorDistribution, NamedColor};
use crate::vision::onnx::EmotionScoringModel;
use crate::vision::processing::{edge_density, mean_and_std, symmetry_balance, to_gray};

/// Drawings are measured at this square size
pub const ANALYSIS_SIZE: u32 = 224;

/// Emotion weights contributed by each unit share of a color
const COLOR_EMOTIONS: &[(NamedColor, &[(Emotion, f32)])] = &[
    (
        NamedColor::Red,
        &[
            (Emotion::Energetic, 0.8),
            (Emotion::Anxious, 0.6),
            (Emotion::Joyful, 0.4),
            (Emotion::Melancholic, 0.1),
        ],
    ),
    (
        NamedColor::Blue,
        &[
            (Emotion::Calm, 0.8),
            (Emotion::Contemplative, 0.7),
            (Emotion::Melancholic, 0.4),
            (Emotion::Anxious, 0.2),
        ],
    ),
    (
        NamedColor::Green,
        &[
            (Emotion::Calm, 0.7),
            (Emotion::Creative, 0.5),
            (Emotion::Logical, 0.4),
            (Emotion::Joyful, 0.4),
        ],
    ),
    (
        NamedColor::Yellow,
        &[
            (Emotion::Joyful, 0.8),
            (Emotion::Energetic, 0.7),
            (Emotion::Creative, 0.6),
            (Emotion::Anxious, 0.3),
        ],
    ),
    (
        NamedColor::Purple,
        &[
            (Emotion::Creative, 0.7),
            (Emotion::Contemplative, 0.6),
            (Emotion::Melancholic, 0.4),
            (Emotion::Calm, 0.3),
        ],
    ),
    (
        NamedColor::Orange,
        &[
            (Emotion::Energetic, 0.7),
            (Emotion::Joyful, 0.6),
            (Emotion::Creative, 0.5),
            (Emotion::Anxious, 0.3),
        ],
    ),
    (
        NamedColor::Pink,
        &[
            (Emotion::Joyful, 0.7),
            (Emotion::Creative, 0.5),
            (Emotion::Energetic, 0.4),
            (Emotion::Calm, 0.3),
        ],
    ),
    (
        NamedColor::Brown,
        &[
            (Emotion::Logical, 0.7),
            (Emotion::Contemplative, 0.6),
            (Emotion::Melancholic, 0.5),
            (Emotion::Calm, 0.4),
        ],
    ),
    (
        NamedColor::Black,
        &[
            (Emotion::Melancholic, 0.7),
            (Emotion::Contemplative, 0.6),
            (Emotion::Logical, 0.5),
            (Emotion::Anxious, 0.4),
        ],
    ),
    (
        NamedColor::White,
        &[
            (Emotion::Logical, 0.6),
            (Emotion::Calm, 0.5),
            (Emotion::Contemplative, 0.4),
            (Emotion::Melancholic, 0.3),
        ],
    ),
    (
        NamedColor::Gray,
        &[
            (Emotion::Logical, 0.6),
            (Emotion::Contemplative, 0.5),
            (Emotion::Melancholic, 0.4),
            (Emotion::Calm, 0.3),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingFeatures {
    pub color_distribution: ColorDistribution,
    /// Canny edge density
    pub complexity: f32,
    /// Left/right mirror similarity
    pub balance: f32,
    /// Intensity std over 128
    pub contrast: f32,
    /// Mean intensity over 255
    pub brightness: f32,
}

impl DrawingFeatures {
    /// Model input: color shares in [`NamedColor::ALL`] order, then the
    /// four composition features
    pub fn to_vector(&self) -> Vec<f32> {
        let mut vector: Vec<f32> = self.color_distribution.iter().map(|(_, f)| f).collect();
        vector.extend([self.complexity, self.balance, self.contrast, self.brightness]);
        vector
    }
}

#[derive(Debug, Clone)]
pub struct DrawingAnalysis {
    pub scores: EmotionScores,
    pub features: DrawingFeatures,
    pub method: AnalysisMethod,
}

#[derive(Debug, Clone, Default)]
pub struct DrawingAnalyzer {
    model: Option<Arc<EmotionScoringModel>>,
}

impl DrawingAnalyzer {
    pub fn new(model: Option<Arc<EmotionScoringModel>>) -> Self {
        Self { model }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn analyze(&self, image: &RgbImage) -> Result<DrawingAnalysis, AnalysisError> {
        let features = extract_features(image);
        debug!(
            "Drawing features - complexity: {:.3}, balance: {:.3}, contrast: {:.3}, brightness: {:.3}",
            features.complexity, features.balance, features.contrast, features.brightness
        );

        if let Some(model) = &self.model {
            match model.predict(&features.to_vector()) {
                Ok(predictions) => {
                    return Ok(DrawingAnalysis {
                        scores: EmotionScores::from_predictions(&DRAWING_EMOTIONS, &predictions),
                        features,
                        method: AnalysisMethod::Model,
                    });
                }
                Err(e) => warn!("Drawing model failed, using heuristic analysis: {}", e),
            }
        }

        Ok(DrawingAnalysis {
            scores: heuristic_scores(&features),
            features,
            method: AnalysisMethod::Heuristic,
        })
    }

    pub fn generate_feedback<R: Rng + ?Sized>(
        &self,
        scores: &EmotionScores,
        rng: &mut R,
    ) -> Result<String, AnalysisError> {
        FeedbackTemplates::DRAWING.generate_feedback(scores, rng)
    }

    pub fn generate_recommendation<R: Rng + ?Sized>(
        &self,
        scores: &EmotionScores,
        rng: &mut R,
    ) -> Result<String, AnalysisError> {
        FeedbackTemplates::DRAWING.generate_recommendation(scores, rng)
    }
}

pub fn extract_features(image: &RgbImage) -> DrawingFeatures {
    let resized = imageops::resize(image, ANALYSIS_SIZE, ANALYSIS_SIZE, FilterType::Triangle);
    let gray = to_gray(&resized);
    let (mean, std) = mean_and_std(&gray);

    DrawingFeatures {
        color_distribution: ColorDistribution::from_image(&resized),
        complexity: edge_density(&gray),
        balance: symmetry_balance(&gray),
        contrast: std / 128.0,
        brightness: mean / 255.0,
    }
}

/// Rule-based scores used when no drawing model is loaded
pub fn heuristic_scores(features: &DrawingFeatures) -> EmotionScores {
    let mut raw: Vec<(Emotion, f32)> = DRAWING_EMOTIONS.iter().map(|e| (*e, 0.0)).collect();
    let mut add = |emotion: Emotion, amount: f32| {
        if let Some((_, score)) = raw.iter_mut().find(|(e, _)| *e == emotion) {
            *score += amount;
        }
    };

    for (color, weights) in COLOR_EMOTIONS {
        let share = features.color_distribution.get(*color);
        for (emotion, weight) in weights.iter() {
            add(*emotion, share * weight);
        }
    }

    add(Emotion::Creative, features.complexity * 0.5);
    add(Emotion::Anxious, features.complexity * 0.3);

    add(Emotion::Calm, features.balance * 0.5);
    add(Emotion::Logical, features.balance * 0.4);

    add(Emotion::Energetic, features.contrast * 0.4);
    add(Emotion::Melancholic, (1.0 - features.contrast) * 0.3);

    add(Emotion::Joyful, features.brightness * 0.6);
    add(Emotion::Contemplative, (1.0 - features.brightness) * 0.5);

    EmotionScores::from_raw(raw)
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Traced-shape analyzer
//!
//! Compares a user's tracing against the reference shape. Overlap, coverage
//! and contour regularity, together with how long the tracing took, are
//! turned into scores over [`SHAPE_EMOTIONS`].

use image::imageops::{self, FilterType};
use image::RgbImage;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::emotions::{EmotionScores, SHAPE_EMOTIONS};
use super::feedback::FeedbackTemplates;
use super::{AnalysisError, AnalysisMethod};
use crate::vision::onnx::EmotionScoringModel;
use crate::vision::processing::{
    apply_threshold, approximate_polygon, contour_perimeter, count_nonzero, extract_contours,
    largest_contour, mask_overlap, to_gray,
};

/// Gray level separating strokes from background
pub const BINARY_THRESHOLD: u8 = 127;
/// Polygon approximation tolerance relative to the contour perimeter
const APPROX_EPSILON_RATIO: f64 = 0.02;
/// Steadiness reported when the tracing has no contour at all
const DEFAULT_STEADINESS: f32 = 0.5;
/// Response time, in seconds, treated as the neutral tracing pace
const BASELINE_RESPONSE_TIME: f32 = 2.0;
/// Response-time range the scoring model was trained on
const RESPONSE_TIME_RANGE: (f32, f32) = (0.5, 10.0);

/// Vertex count a steady tracing of `shape_type` approximates to
pub fn expected_vertices(shape_type: &str) -> usize {
    match shape_type.trim().to_ascii_lowercase().as_str() {
        "triangle" => 3,
        "square" | "rectangle" => 4,
        _ => 8,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeFeatures {
    /// Intersection over union of the two masks
    pub overlap_percentage: f32,
    /// Share of the reference shape covered by the tracing
    pub completion_percentage: f32,
    pub line_steadiness: f32,
    /// Seconds
    pub response_time: f32,
}

impl ShapeFeatures {
    /// Model input: ratios clamped to [0, 1], response time scaled over
    /// its training range and inverted so faster is higher
    pub fn normalized(&self) -> [f32; 4] {
        let (min, max) = RESPONSE_TIME_RANGE;
        let time = ((self.response_time - min) / (max - min)).clamp(0.0, 1.0);
        [
            self.overlap_percentage.clamp(0.0, 1.0),
            self.completion_percentage.clamp(0.0, 1.0),
            self.line_steadiness.clamp(0.0, 1.0),
            1.0 - time,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ShapeAnalysis {
    pub scores: EmotionScores,
    pub features: ShapeFeatures,
    pub method: AnalysisMethod,
}

#[derive(Debug, Clone, Default)]
pub struct ShapeAnalyzer {
    model: Option<Arc<EmotionScoringModel>>,
}

impl ShapeAnalyzer {
    pub fn new(model: Option<Arc<EmotionScoringModel>>) -> Self {
        Self { model }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn analyze(
        &self,
        original: &RgbImage,
        traced: &RgbImage,
        response_time: f32,
        shape_type: &str,
    ) -> Result<ShapeAnalysis, AnalysisError> {
        let features = extract_features(original, traced, response_time, shape_type)?;
        debug!(
            "Shape features - overlap: {:.3}, completion: {:.3}, steadiness: {:.3}, time: {:.2}s",
            features.overlap_percentage,
            features.completion_percentage,
            features.line_steadiness,
            features.response_time
        );

        if let Some(model) = &self.model {
            match model.predict(&features.normalized()) {
                Ok(predictions) => {
                    return Ok(ShapeAnalysis {
                        scores: EmotionScores::from_predictions(&SHAPE_EMOTIONS, &predictions),
                        features,
                        method: AnalysisMethod::Model,
                    });
                }
                Err(e) => warn!("Shape model failed, using heuristic analysis: {}", e),
            }
        }

        Ok(ShapeAnalysis {
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
        FeedbackTemplates::SHAPE.generate_feedback(scores, rng)
    }

    pub fn generate_recommendation<R: Rng + ?Sized>(
        &self,
        scores: &EmotionScores,
        rng: &mut R,
    ) -> Result<String, AnalysisError> {
        FeedbackTemplates::SHAPE.generate_recommendation(scores, rng)
    }
}

/// Measure a tracing against its reference shape
///
/// A tracing captured at a different size is scaled (nearest neighbour) to
/// the reference dimensions first.
pub fn extract_features(
    original: &RgbImage,
    traced: &RgbImage,
    response_time: f32,
    shape_type: &str,
) -> Result<ShapeFeatures, AnalysisError> {
    let resized;
    let traced = if traced.dimensions() != original.dimensions() {
        debug!(
            "Resizing traced image {:?} to {:?}",
            traced.dimensions(),
            original.dimensions()
        );
        resized = imageops::resize(
            traced,
            original.width(),
            original.height(),
            FilterType::Nearest,
        );
        &resized
    } else {
        traced
    };

    let original_mask = apply_threshold(&to_gray(original), BINARY_THRESHOLD);
    let traced_mask = apply_threshold(&to_gray(traced), BINARY_THRESHOLD);

    let overlap = mask_overlap(&original_mask, &traced_mask)?;
    let overlap_percentage = overlap.intersection as f32 / overlap.union.max(1) as f32;
    let original_area = count_nonzero(&original_mask);
    let completion_percentage = overlap.intersection as f32 / original_area.max(1) as f32;

    let contours = extract_contours(&traced_mask);
    let line_steadiness = match largest_contour(&contours) {
        Some(contour) => {
            let epsilon = APPROX_EPSILON_RATIO * contour_perimeter(contour);
            let vertices = approximate_polygon(contour, epsilon).len();
            let cap = expected_vertices(shape_type) * 2;
            1.0 - vertices.min(cap) as f32 / cap as f32
        }
        None => DEFAULT_STEADINESS,
    };

    Ok(ShapeFeatures {
        overlap_percentage,
        completion_percentage,
        line_steadiness,
        response_time,
    })
}

/// Rule-based scores used when no shape model is loaded
pub fn heuristic_scores(features: &ShapeFeatures) -> EmotionScores {
    let overlap = features.overlap_percentage;
    let completion = features.completion_percentage;
    let steady = features.line_steadiness;
    let t = (features.response_time / BASELINE_RESPONSE_TIME).min(1.0);

    let raw = [
        0.5 * (steady + (2.0 * (1.0 - (t - 0.5).abs())).min(1.0)),
        0.5 * ((1.0 - steady) + (t - 0.7).max(0.0)),
        0.5 * ((1.0 - steady) + t.min(0.7)),
        0.5 * ((1.0 - completion) + (1.5 * (t - 0.6)).max(0.0)),
        0.5 * (overlap + steady),
        0.5 * ((1.0 - overlap) + (1.0 - completion)),
        0.5 * (t.min(0.6) + completion * steady),
        0.5 * ((t - 0.6).max(0.0) + (1.0 - overlap * completion)),
    ];

    EmotionScores::from_predictions(&SHAPE_EMOTIONS, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Emotion;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square_image(size: u32, x: i32, y: i32, side: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(size, size, Rgb([0, 0, 0]));
        draw_filled_rect_mut(
            &mut img,
            Rect::at(x, y).of_size(side, side),
            Rgb([255, 255, 255]),
        );
        img
    }

    #[test]
    fn test_expected_vertices() {
        assert_eq!(expected_vertices("triangle"), 3);
        assert_eq!(expected_vertices("square"), 4);
        assert_eq!(expected_vertices("Rectangle"), 4);
        assert_eq!(expected_vertices("circle"), 8);
        assert_eq!(expected_vertices("star"), 8);
    }

    #[test]
    fn test_perfect_tracing_features() {
        let original = square_image(64, 16, 16, 32);
        let features = extract_features(&original, &original, 1.0, "square").unwrap();

        assert_eq!(features.overlap_percentage, 1.0);
        assert_eq!(features.completion_percentage, 1.0);
        // Four corners out of a cap of eight
        assert!((features.line_steadiness - 0.5).abs() < 1e-6);
        assert_eq!(features.response_time, 1.0);
    }

    #[test]
    fn test_partial_tracing_features() {
        let original = square_image(64, 0, 0, 32);
        let traced = square_image(64, 16, 0, 32);
        let features = extract_features(&original, &traced, 2.0, "square").unwrap();

        // Intersection 16x32, union 48x32
        assert!((features.overlap_percentage - 1.0 / 3.0).abs() < 1e-4);
        assert!((features.completion_percentage - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_blank_tracing_uses_default_steadiness() {
        let original = square_image(32, 8, 8, 16);
        let traced = RgbImage::new(32, 32);
        let features = extract_features(&original, &traced, 3.0, "circle").unwrap();

        assert_eq!(features.overlap_percentage, 0.0);
        assert_eq!(features.completion_percentage, 0.0);
        assert_eq!(features.line_steadiness, 0.5);
    }

    #[test]
    fn test_traced_image_is_resized_to_original() {
        let original = square_image(64, 16, 16, 32);
        let traced = square_image(32, 8, 8, 16);
        let features = extract_features(&original, &traced, 1.0, "square").unwrap();
        assert!(features.overlap_percentage > 0.9);
    }

    #[test]
    fn test_heuristic_scores_for_perfect_tracing() {
        let features = ShapeFeatures {
            overlap_percentage: 1.0,
            completion_percentage: 1.0,
            line_steadiness: 0.5,
            response_time: 1.0,
        };
        let scores = heuristic_scores(&features);

        // Raw: calm .75, anxious .25, excited .5, depressed 0, focused .75,
        // distracted 0, confident .5, hesitant 0 (total 2.75)
        assert!((scores.total() - 1.0).abs() < 1e-5);
        assert!((scores.get(Emotion::Calm).unwrap() - 0.75 / 2.75).abs() < 1e-5);
        assert_eq!(scores.get(Emotion::Depressed), Some(0.0));
        // calm and focused tie; calm comes first
        assert_eq!(scores.dominant(), Some(Emotion::Calm));
    }

    #[test]
    fn test_slow_sloppy_tracing_leans_hesitant() {
        let features = ShapeFeatures {
            overlap_percentage: 0.1,
            completion_percentage: 0.1,
            line_steadiness: 0.0,
            response_time: 9.0,
        };
        let scores = heuristic_scores(&features);
        assert!(scores.get(Emotion::Hesitant).unwrap() > scores.get(Emotion::Focused).unwrap());
        assert!(scores.get(Emotion::Distracted).unwrap() > scores.get(Emotion::Calm).unwrap());
    }

    #[test]
    fn test_normalized_features_invert_response_time() {
        let fast = ShapeFeatures {
            overlap_percentage: 1.5,
            completion_percentage: 0.5,
            line_steadiness: -0.2,
            response_time: 0.2,
        };
        assert_eq!(fast.normalized(), [1.0, 0.5, 0.0, 1.0]);

        let slow = ShapeFeatures {
            response_time: 20.0,
            ..fast
        };
        assert_eq!(slow.normalized()[3], 0.0);
    }

    #[test]
    fn test_analyze_without_model_is_heuristic() {
        let analyzer = ShapeAnalyzer::default();
        let original = square_image(64, 16, 16, 32);
        let analysis = analyzer.analyze(&original, &original, 1.5, "square").unwrap();

        assert_eq!(analysis.method, AnalysisMethod::Heuristic);
        assert!((analysis.scores.total() - 1.0).abs() < 1e-5);

        let mut rng = StdRng::seed_from_u64(5);
        let feedback = analyzer.generate_feedback(&analysis.scores, &mut rng).unwrap();
        let recommendation = analyzer
            .generate_recommendation(&analysis.scores, &mut rng)
            .unwrap();
        assert!(!feedback.is_empty());
        assert!(!recommendation.is_empty());
    }

    fn fixture_model(name: &str, feature_count: usize) -> Arc<EmotionScoringModel> {
        let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
        Arc::new(
            EmotionScoringModel::new(path, feature_count, SHAPE_EMOTIONS.len(), Default::default())
                .unwrap(),
        )
    }

    #[test]
    fn test_analyze_with_model_uses_its_scores() {
        // Fixture routes the feature sum into the sixth output
        let analyzer = ShapeAnalyzer::new(Some(fixture_model("shape_scorer.onnx", 4)));
        assert!(analyzer.has_model());

        let original = square_image(64, 16, 16, 32);
        let analysis = analyzer.analyze(&original, &original, 1.5, "square").unwrap();

        assert_eq!(analysis.method, AnalysisMethod::Model);
        assert_eq!(analysis.scores.dominant(), Some(Emotion::Distracted));
        assert!((analysis.scores.get(Emotion::Distracted).unwrap() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_failing_model_falls_back_to_heuristic() {
        // Fifteen-input graph cannot take the four shape features
        let analyzer = ShapeAnalyzer::new(Some(fixture_model("drawing_scorer.onnx", 4)));

        let original = square_image(64, 16, 16, 32);
        let analysis = analyzer.analyze(&original, &original, 1.5, "square").unwrap();

        assert_eq!(analysis.method, AnalysisMethod::Heuristic);
        let expected = heuristic_scores(&analysis.features);
        assert_eq!(analysis.scores.dominant(), expected.dominant());
        assert!((analysis.scores.total() - 1.0).abs() < 1e-5);
    }
}

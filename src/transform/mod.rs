// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Doodle-to-landscape transform
//!
//! Uses the ONNX generator when one is loaded. Otherwise the doodle is
//! segmented by its key colors and each segment is filled with a texture
//! swatch, which gives a rough landscape preview.

pub mod segmentation;
pub mod swatches;

use image::imageops::{self, FilterType};
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analysis::AnalysisMethod;
use crate::vision::onnx::{DoodleGeneratorModel, GENERATOR_INPUT_SIZE};

pub use segmentation::{segment_doodle, LandscapeClass, SegmentationMap};
pub use swatches::SwatchSet;

/// Side length of every transformed image
pub const OUTPUT_SIZE: u32 = GENERATOR_INPUT_SIZE;

#[derive(Debug, Clone)]
pub struct TransformedDoodle {
    pub image: RgbImage,
    pub method: AnalysisMethod,
}

#[derive(Debug, Clone)]
pub struct DoodleTransformer {
    generator: Option<Arc<DoodleGeneratorModel>>,
    swatches: SwatchSet,
}

impl Default for DoodleTransformer {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl DoodleTransformer {
    pub fn new(generator: Option<Arc<DoodleGeneratorModel>>, landscapes_dir: Option<&Path>) -> Self {
        Self {
            generator,
            swatches: SwatchSet::load(landscapes_dir),
        }
    }

    pub fn has_model(&self) -> bool {
        self.generator.is_some()
    }

    pub fn transform(&self, doodle: &RgbImage) -> TransformedDoodle {
        let resized = imageops::resize(doodle, OUTPUT_SIZE, OUTPUT_SIZE, FilterType::Triangle);

        if let Some(generator) = &self.generator {
            match generator.generate(&resized) {
                Ok(image) => {
                    return TransformedDoodle {
                        image,
                        method: AnalysisMethod::Model,
                    }
                }
                Err(e) => warn!("Doodle generator failed, using swatch composite: {}", e),
            }
        }

        TransformedDoodle {
            image: self.composite(&resized),
            method: AnalysisMethod::Heuristic,
        }
    }

    /// Paint every pixel with its class swatch
    fn composite(&self, doodle: &RgbImage) -> RgbImage {
        let segments = segment_doodle(doodle);
        debug!(
            "Doodle segments - sky: {:.2}, grass: {:.2}, water: {:.2}, background: {:.2}",
            segments.coverage(LandscapeClass::Sky),
            segments.coverage(LandscapeClass::Grass),
            segments.coverage(LandscapeClass::Water),
            segments.coverage(LandscapeClass::Background)
        );

        RgbImage::from_fn(doodle.width(), doodle.height(), |x, y| {
            *self.swatches.get(segments.class_at(x, y)).get_pixel(x, y)
        })
    }
}

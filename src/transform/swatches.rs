// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Texture swatches painted into each landscape segment

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{debug, warn};

use super::segmentation::LandscapeClass;
use super::OUTPUT_SIZE;

/// Amplitude of the synthetic texture noise
const TEXTURE_NOISE: i16 = 15;

impl LandscapeClass {
    /// File looked up in the landscapes directory
    pub fn swatch_file(&self) -> &'static str {
        match self {
            LandscapeClass::Sky => "sky_dominant.jpg",
            LandscapeClass::Grass => "grass_dominant.jpg",
            LandscapeClass::Water => "water_dominant.jpg",
            LandscapeClass::Mountain => "mountain_dominant.jpg",
            LandscapeClass::Tree => "forest_dominant.jpg",
            LandscapeClass::Building => "urban_dominant.jpg",
            LandscapeClass::Road => "road_dominant.jpg",
            LandscapeClass::Cloud => "cloudy_dominant.jpg",
            LandscapeClass::Background => "mixed_landscape.jpg",
        }
    }

    /// Base color of the synthesized swatch
    pub fn swatch_color(&self) -> [u8; 3] {
        match self {
            LandscapeClass::Sky => [135, 206, 235],
            LandscapeClass::Grass => [34, 139, 34],
            LandscapeClass::Water => [65, 105, 225],
            LandscapeClass::Mountain => [139, 137, 137],
            LandscapeClass::Tree => [15, 120, 34],
            LandscapeClass::Building => [165, 42, 42],
            LandscapeClass::Road => [128, 128, 128],
            LandscapeClass::Cloud => [255, 255, 255],
            LandscapeClass::Background => [169, 169, 169],
        }
    }
}

/// One OUTPUT_SIZE square texture per class
#[derive(Debug, Clone)]
pub struct SwatchSet {
    swatches: Vec<RgbImage>,
}

impl SwatchSet {
    /// Use images from `dir` where present, synthesized textures elsewhere
    pub fn load(dir: Option<&Path>) -> Self {
        let swatches = LandscapeClass::ALL
            .iter()
            .map(|class| {
                dir.and_then(|dir| load_swatch(&dir.join(class.swatch_file())))
                    .unwrap_or_else(|| synthesize(*class))
            })
            .collect();
        Self { swatches }
    }

    pub fn synthesized() -> Self {
        Self::load(None)
    }

    pub fn get(&self, class: LandscapeClass) -> &RgbImage {
        &self.swatches[class.index()]
    }
}

fn load_swatch(path: &Path) -> Option<RgbImage> {
    if !path.exists() {
        return None;
    }
    match image::open(path) {
        Ok(img) => {
            debug!("Loaded landscape swatch {}", path.display());
            Some(imageops::resize(
                &img.to_rgb8(),
                OUTPUT_SIZE,
                OUTPUT_SIZE,
                FilterType::Triangle,
            ))
        }
        Err(e) => {
            warn!("Ignoring unreadable swatch {}: {}", path.display(), e);
            None
        }
    }
}

/// Flat class color with ±TEXTURE_NOISE noise, seeded per class
pub fn synthesize(class: LandscapeClass) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(class.index() as u64);
    let base = class.swatch_color();
    RgbImage::from_fn(OUTPUT_SIZE, OUTPUT_SIZE, |_, _| {
        Rgb(base.map(|c| {
            let noise = rng.gen_range(-TEXTURE_NOISE..TEXTURE_NOISE);
            (c as i16 + noise).clamp(0, 255) as u8
        }))
    })
}

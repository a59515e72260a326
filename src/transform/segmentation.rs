// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Semantic segmentation of a color-coded doodle

use image::RgbImage;

/// Per-channel tolerance around each key color (inclusive)
pub const COLOR_TOLERANCE: u8 = 30;

/// Landscape element a doodle color stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandscapeClass {
    Sky,
    Grass,
    Water,
    Mountain,
    Tree,
    Building,
    Road,
    Cloud,
    Background,
}

impl LandscapeClass {
    /// Painting order; later classes overwrite earlier ones
    pub const ALL: [LandscapeClass; 9] = [
        LandscapeClass::Sky,
        LandscapeClass::Grass,
        LandscapeClass::Water,
        LandscapeClass::Mountain,
        LandscapeClass::Tree,
        LandscapeClass::Building,
        LandscapeClass::Road,
        LandscapeClass::Cloud,
        LandscapeClass::Background,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandscapeClass::Sky => "sky",
            LandscapeClass::Grass => "grass",
            LandscapeClass::Water => "water",
            LandscapeClass::Mountain => "mountain",
            LandscapeClass::Tree => "tree",
            LandscapeClass::Building => "building",
            LandscapeClass::Road => "road",
            LandscapeClass::Cloud => "cloud",
            LandscapeClass::Background => "background",
        }
    }

    /// RGB color a user paints to request this class
    pub fn key_color(&self) -> [u8; 3] {
        match self {
            LandscapeClass::Sky => [255, 0, 0],
            LandscapeClass::Grass => [0, 255, 0],
            LandscapeClass::Water => [0, 0, 255],
            LandscapeClass::Mountain => [0, 255, 255],
            LandscapeClass::Tree => [255, 0, 255],
            LandscapeClass::Building => [255, 255, 0],
            LandscapeClass::Road => [128, 128, 128],
            LandscapeClass::Cloud => [255, 255, 255],
            LandscapeClass::Background => [0, 0, 0],
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    fn matches(&self, rgb: [u8; 3]) -> bool {
        let key = self.key_color();
        (0..3).all(|c| rgb[c].abs_diff(key[c]) <= COLOR_TOLERANCE)
    }
}

/// One class label per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationMap {
    width: u32,
    height: u32,
    labels: Vec<LandscapeClass>,
}

impl SegmentationMap {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn class_at(&self, x: u32, y: u32) -> LandscapeClass {
        self.labels[(y * self.width + x) as usize]
    }

    /// Share of pixels labelled `class`
    pub fn coverage(&self, class: LandscapeClass) -> f32 {
        if self.labels.is_empty() {
            return 0.0;
        }
        let count = self.labels.iter().filter(|label| **label == class).count();
        count as f32 / self.labels.len() as f32
    }
}

/// Label each pixel with the last matching class; unmatched pixels, and
/// pixels only matching the black key, are background
pub fn segment_doodle(doodle: &RgbImage) -> SegmentationMap {
    let labels = doodle
        .pixels()
        .map(|pixel| {
            LandscapeClass::ALL
                .iter()
                .filter(|class| **class != LandscapeClass::Background)
                .rev()
                .find(|class| class.matches(pixel.0))
                .copied()
                .unwrap_or(LandscapeClass::Background)
        })
        .collect();

    SegmentationMap {
        width: doodle.width(),
        height: doodle.height(),
        labels,
    }
}

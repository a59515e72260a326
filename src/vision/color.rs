// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HSV color segmentation
//!
//! Hue is stored in 0..=180 and saturation/value in 0..=255, the usual 8-bit
//! HSV layout, so the range table below reads like the classic OpenCV tables.

use image::RgbImage;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Named colors recognised in drawings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Brown,
    Black,
    White,
    Gray,
}

impl NamedColor {
    pub const ALL: [NamedColor; 11] = [
        NamedColor::Red,
        NamedColor::Orange,
        NamedColor::Yellow,
        NamedColor::Green,
        NamedColor::Blue,
        NamedColor::Purple,
        NamedColor::Pink,
        NamedColor::Brown,
        NamedColor::Black,
        NamedColor::White,
        NamedColor::Gray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamedColor::Red => "red",
            NamedColor::Orange => "orange",
            NamedColor::Yellow => "yellow",
            NamedColor::Green => "green",
            NamedColor::Blue => "blue",
            NamedColor::Purple => "purple",
            NamedColor::Pink => "pink",
            NamedColor::Brown => "brown",
            NamedColor::Black => "black",
            NamedColor::White => "white",
            NamedColor::Gray => "gray",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    fn ranges(self) -> &'static [HsvRange] {
        match self {
            NamedColor::Red => RED,
            NamedColor::Orange => ORANGE,
            NamedColor::Yellow => YELLOW,
            NamedColor::Green => GREEN,
            NamedColor::Blue => BLUE,
            NamedColor::Purple => PURPLE,
            NamedColor::Pink => PINK,
            NamedColor::Brown => BROWN,
            NamedColor::Black => BLACK,
            NamedColor::White => WHITE,
            NamedColor::Gray => GRAY,
        }
    }
}

// Inclusive HSV bounds; red wraps around the hue circle
const RED: &[HsvRange] = &[
    HsvRange::new([0, 70, 50], [10, 255, 255]),
    HsvRange::new([170, 70, 50], [180, 255, 255]),
];
const ORANGE: &[HsvRange] = &[HsvRange::new([11, 70, 50], [25, 255, 255])];
const YELLOW: &[HsvRange] = &[HsvRange::new([26, 70, 50], [35, 255, 255])];
const GREEN: &[HsvRange] = &[HsvRange::new([36, 70, 50], [80, 255, 255])];
const BLUE: &[HsvRange] = &[HsvRange::new([81, 70, 50], [130, 255, 255])];
const PURPLE: &[HsvRange] = &[HsvRange::new([131, 70, 50], [170, 255, 255])];
const PINK: &[HsvRange] = &[HsvRange::new([0, 30, 180], [10, 150, 255])];
const BROWN: &[HsvRange] = &[HsvRange::new([10, 30, 50], [20, 150, 150])];
const BLACK: &[HsvRange] = &[HsvRange::new([0, 0, 0], [180, 255, 50])];
const WHITE: &[HsvRange] = &[HsvRange::new([0, 0, 200], [180, 30, 255])];
const GRAY: &[HsvRange] = &[HsvRange::new([0, 0, 50], [180, 30, 200])];

#[derive(Debug, Clone, Copy)]
struct HsvRange {
    lower: [u8; 3],
    upper: [u8; 3],
}

impl HsvRange {
    const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

/// Convert an RGB pixel to 8-bit HSV (H 0..=180, S and V 0..=255)
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max == 0.0 { 0.0 } else { 255.0 * delta / max };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    [
        (hue / 2.0).round().min(180.0) as u8,
        saturation.round() as u8,
        max as u8,
    ]
}

/// Share of pixels falling inside each named color range
///
/// Ranges overlap (pink and brown sit inside the red/orange hues), so the
/// shares are independent and need not sum to 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorDistribution {
    fractions: [f32; 11],
}

impl ColorDistribution {
    pub fn from_image(image: &RgbImage) -> Self {
        let total = image.width() as usize * image.height() as usize;
        if total == 0 {
            return Self::default();
        }

        let mut counts = [0usize; 11];
        for pixel in image.pixels() {
            let hsv = rgb_to_hsv(pixel.0);
            for color in NamedColor::ALL {
                if color.ranges().iter().any(|range| range.contains(hsv)) {
                    counts[color.index()] += 1;
                }
            }
        }

        Self {
            fractions: counts.map(|count| count as f32 / total as f32),
        }
    }

    pub fn get(&self, color: NamedColor) -> f32 {
        self.fractions[color.index()]
    }

    /// Shares in [`NamedColor::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (NamedColor, f32)> + '_ {
        NamedColor::ALL.iter().map(|c| (*c, self.get(*c)))
    }
}

impl Serialize for ColorDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fractions.len()))?;
        for (color, fraction) in self.iter() {
            map.serialize_entry(color.as_str(), &fraction)?;
        }
        map.end()
    }
}

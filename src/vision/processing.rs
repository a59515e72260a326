// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classical image measurements used by the analyzers
//!
//! Everything here works on 8-bit buffers from the `image` crate. Binary
//! masks use 0 for background and 255 for foreground.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Canny hysteresis thresholds used for edge density
pub const CANNY_LOW_THRESHOLD: f32 = 100.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 200.0;

const KMEANS_SEED: u64 = 0x5eed_c010;
const KMEANS_MAX_ITERATIONS: usize = 100;
const KMEANS_EPSILON: f32 = 0.2;

#[derive(Debug, Error, PartialEq)]
pub enum ProcessingError {
    #[error("Mask dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },
}

/// Pixel counts of two overlapping masks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskOverlap {
    pub intersection: usize,
    pub union: usize,
}

/// A cluster center found by [`detect_dominant_colors`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantColor {
    pub rgb: [u8; 3],
    /// Share of pixels assigned to this center (0.0-1.0)
    pub fraction: f32,
}

impl DominantColor {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

/// Convert to grayscale with BT.601 luma weights
pub fn to_gray(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
    }
    gray
}

/// Binary mask: 255 where the pixel is strictly above `threshold`
pub fn apply_threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255 } else { 0 };
        mask.put_pixel(x, y, Luma([value]));
    }
    mask
}

pub fn count_nonzero(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}

/// Intersection and union pixel counts of two equally sized masks
pub fn mask_overlap(a: &GrayImage, b: &GrayImage) -> Result<MaskOverlap, ProcessingError> {
    if a.dimensions() != b.dimensions() {
        return Err(ProcessingError::DimensionMismatch {
            left: a.dimensions(),
            right: b.dimensions(),
        });
    }

    let mut overlap = MaskOverlap {
        intersection: 0,
        union: 0,
    };
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        let (on_a, on_b) = (pa[0] != 0, pb[0] != 0);
        if on_a && on_b {
            overlap.intersection += 1;
        }
        if on_a || on_b {
            overlap.union += 1;
        }
    }
    Ok(overlap)
}

/// Intersection over union of two masks; 0.0 when both are empty
pub fn calculate_iou(a: &GrayImage, b: &GrayImage) -> Result<f32, ProcessingError> {
    let overlap = mask_overlap(a, b)?;
    if overlap.union == 0 {
        return Ok(0.0);
    }
    Ok(overlap.intersection as f32 / overlap.union as f32)
}

/// Outer borders of the top-level foreground regions
pub fn extract_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .map(|c| c.points)
        .collect()
}

/// Polygon area by the shoelace formula
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p, q)| p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64)
        .sum();
    (twice_area as f64 / 2.0).abs()
}

/// The contour enclosing the largest area; first one wins on ties
pub fn largest_contour(contours: &[Vec<Point<i32>>]) -> Option<&[Point<i32>]> {
    let mut best: Option<(&[Point<i32>], f64)> = None;
    for contour in contours {
        let area = contour_area(contour);
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((contour.as_slice(), area)),
        }
    }
    best.map(|(contour, _)| contour)
}

/// Length of the closed outline
pub fn contour_perimeter(points: &[Point<i32>]) -> f64 {
    arc_length(points, true)
}

/// Douglas-Peucker simplification of a closed outline, without a repeated
/// start vertex
pub fn approximate_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }
    let mut polygon = approximate_polygon_dp(points, epsilon, true);
    if polygon.len() > 1 && polygon.first() == polygon.last() {
        polygon.pop();
    }
    polygon
}

/// Fraction of pixels that are Canny edges
pub fn edge_density(gray: &GrayImage) -> f32 {
    let total = gray.width() as usize * gray.height() as usize;
    if total == 0 {
        return 0.0;
    }
    let edges = imageproc::edges::canny(gray, CANNY_LOW_THRESHOLD, CANNY_HIGH_THRESHOLD);
    count_nonzero(&edges) as f32 / total as f32
}

/// Left/right mirror similarity in [0, 1]; 1.0 means perfectly symmetric
pub fn symmetry_balance(gray: &GrayImage) -> f32 {
    let (width, height) = gray.dimensions();
    let half = width / 2;
    if half == 0 || height == 0 {
        return 1.0;
    }

    let mut difference: u64 = 0;
    for y in 0..height {
        for x in 0..half {
            let left = gray.get_pixel(x, y)[0];
            let right = gray.get_pixel(width - 1 - x, y)[0];
            difference += left.abs_diff(right) as u64;
        }
    }

    let max_difference = half as f64 * height as f64 * 255.0;
    (1.0 - difference as f64 / max_difference) as f32
}

/// Mean and population standard deviation of the intensities
pub fn mean_and_std(gray: &GrayImage) -> (f32, f32) {
    let total = gray.width() as f64 * gray.height() as f64;
    if total == 0.0 {
        return (0.0, 0.0);
    }
    let (sum, sum_sq) = gray.pixels().fold((0.0f64, 0.0f64), |(s, sq), p| {
        let v = p[0] as f64;
        (s + v, sq + v * v)
    });
    let mean = sum / total;
    let variance = (sum_sq / total - mean * mean).max(0.0);
    (mean as f32, variance.sqrt() as f32)
}

/// K-means clustering over pixel colors, largest cluster first
///
/// Seeded so the same image always yields the same palette.
pub fn detect_dominant_colors(image: &RgbImage, k: usize) -> Vec<DominantColor> {
    let pixels: Vec<[f32; 3]> = image
        .pixels()
        .map(|Rgb([r, g, b])| [*r as f32, *g as f32, *b as f32])
        .collect();
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let k = k.min(pixels.len());
    let mut rng = StdRng::seed_from_u64(KMEANS_SEED);
    let mut centers = vec![pixels[rng.gen_range(0..pixels.len())]];
    // Farthest-point seeding keeps distinct colors in distinct clusters
    while centers.len() < k {
        let next = pixels
            .iter()
            .max_by(|a, b| {
                let da = squared_distance(&centers[nearest_center(&centers, a)], a);
                let db = squared_distance(&centers[nearest_center(&centers, b)], b);
                da.total_cmp(&db)
            })
            .copied()
            .unwrap_or(pixels[0]);
        centers.push(next);
    }
    let mut labels = vec![0usize; pixels.len()];

    for _ in 0..KMEANS_MAX_ITERATIONS {
        for (label, pixel) in labels.iter_mut().zip(&pixels) {
            *label = nearest_center(&centers, pixel);
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (label, pixel) in labels.iter().zip(&pixels) {
            counts[*label] += 1;
            for c in 0..3 {
                sums[*label][c] += pixel[c] as f64;
            }
        }

        let mut shift = 0.0f32;
        for (i, center) in centers.iter_mut().enumerate() {
            if counts[i] == 0 {
                continue;
            }
            let updated = [
                (sums[i][0] / counts[i] as f64) as f32,
                (sums[i][1] / counts[i] as f64) as f32,
                (sums[i][2] / counts[i] as f64) as f32,
            ];
            shift = shift.max(squared_distance(center, &updated).sqrt());
            *center = updated;
        }

        if shift < KMEANS_EPSILON {
            break;
        }
    }

    let mut counts = vec![0usize; k];
    for label in &labels {
        counts[*label] += 1;
    }

    let total = pixels.len() as f32;
    let mut colors: Vec<DominantColor> = centers
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(center, count)| DominantColor {
            rgb: [
                center[0].round().clamp(0.0, 255.0) as u8,
                center[1].round().clamp(0.0, 255.0) as u8,
                center[2].round().clamp(0.0, 255.0) as u8,
            ],
            fraction: count as f32 / total,
        })
        .collect();
    colors.sort_by(|a, b| b.fraction.total_cmp(&a.fraction));
    colors
}

fn nearest_center(centers: &[[f32; 3]], pixel: &[f32; 3]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::MAX;
    for (i, center) in centers.iter().enumerate() {
        let distance = squared_distance(center, pixel);
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

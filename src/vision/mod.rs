// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image handling for drawing analysis
//!
//! This module provides:
//! - Base64 image codec for API payloads
//! - Classical measurements (thresholding, IoU, contours, edges, symmetry)
//! - HSV color segmentation
//! - Optional ONNX models and the manager that loads them

pub mod color;
pub mod image_utils;
pub mod model_manager;
pub mod onnx;
pub mod processing;

pub use color::{ColorDistribution, NamedColor};
pub use image_utils::{
    decode_base64_image, decode_image_bytes, detect_format, encode_base64_image, EncodeFormat,
    ImageError, ImageInfo,
};
pub use model_manager::{AnalysisModelConfig, AnalysisModelInfo, AnalysisModelManager};
pub use onnx::SessionOptions;
pub use processing::{calculate_iou, DominantColor, ProcessingError};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /doodle-analysis tests

use axum::http::StatusCode;
use image::{Rgb, RgbImage};
use psychdoodle_node::vision::decode_base64_image;
use serde_json::json;

use super::common::*;

/// Sky over grass with a lake, in the doodle key colors
fn landscape_doodle() -> RgbImage {
    RgbImage::from_fn(120, 90, |_, y| match y {
        0..=29 => Rgb([255, 0, 0]),
        30..=59 => Rgb([0, 255, 0]),
        _ => Rgb([0, 0, 255]),
    })
}

#[tokio::test]
async fn test_doodle_is_transformed_and_scored() {
    let body = json!({ "doodle_image": encode_png(&landscape_doodle()) });

    let response = send(test_router(&test_config()), post_json("/doodle-analysis", &body)).await;
    assert_status(&response, StatusCode::OK);
    let json = read_json(response).await;

    let generated = json["generated_image"].as_str().unwrap();
    assert!(generated.starts_with("data:image/jpeg;base64,"));
    let (image, _) = decode_base64_image(generated).unwrap();
    assert_eq!((image.width(), image.height()), (256, 256));

    assert_normalized(&json["emotional_state"], 8);
    assert_eq!(json["method"], "heuristic");
    assert_eq!(json["transform_method"], "heuristic");
    assert!(!json["feedback"].as_str().unwrap().is_empty());
    assert!(!json["recommendation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_dominant_colors_describe_submitted_doodle() {
    let body = json!({ "doodle_image": encode_png(&landscape_doodle()) });

    let response = send(test_router(&test_config()), post_json("/doodle-analysis", &body)).await;
    let json = read_json(response).await;

    let colors = json["dominant_colors"].as_array().unwrap();
    assert!(!colors.is_empty() && colors.len() <= 5);
    let total: f64 = colors
        .iter()
        .map(|c| c["percentage"].as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-3);
    let hexes: Vec<&str> = colors.iter().map(|c| c["hex"].as_str().unwrap()).collect();
    assert!(hexes.contains(&"#00FF00"), "palette {:?}", hexes);
}

#[tokio::test]
async fn test_empty_doodle_is_400() {
    let body = json!({ "doodle_image": "" });
    let response = send(test_router(&test_config()), post_json("/doodle-analysis", &body)).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_truncated_png_is_analysis_failure() {
    // Valid PNG signature, nothing after it
    let body = json!({ "doodle_image": "data:image/png;base64,iVBORw0KGgo=" });
    let response = send(test_router(&test_config()), post_json("/doodle-analysis", &body)).await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let json = read_json(response).await;
    assert_eq!(json["error_type"], "analysis_failed");
}

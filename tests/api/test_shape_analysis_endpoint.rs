// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /shape-analysis tests

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use super::common::*;

const SHAPE_CATEGORIES: [&str; 8] = [
    "calm",
    "anxious",
    "excited",
    "depressed",
    "focused",
    "distracted",
    "confident",
    "hesitant",
];

#[tokio::test]
async fn test_identical_tracing_scores_all_categories() {
    let square = encode_png(&square_image(128, 32));
    let body = json!({
        "original_image": square,
        "traced_image": square,
        "response_time": 2.0,
        "shape_type": "square",
    });

    let response = send(test_router(&test_config()), post_json("/shape-analysis", &body)).await;
    assert_status(&response, StatusCode::OK);
    let json = read_json(response).await;

    assert!(Uuid::parse_str(json["analysis_id"].as_str().unwrap()).is_ok());
    assert_normalized(&json["emotional_state"], 8);
    for category in SHAPE_CATEGORIES {
        assert!(json["emotional_state"].get(category).is_some(), "{}", category);
    }
    assert_eq!(json["method"], "heuristic");
    assert_eq!(json["features"]["overlap_percentage"], 1.0);
    assert_eq!(json["features"]["completion_percentage"], 1.0);
    assert!(!json["feedback"].as_str().unwrap().is_empty());
    assert!(!json["recommendation"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_tracing_lowers_overlap() {
    let body = json!({
        "original_image": encode_png(&square_image(128, 16)),
        "traced_image": encode_png(&square_image(128, 48)),
        "response_time": 6.5,
        "shape_type": "square",
    });

    let response = send(test_router(&test_config()), post_json("/shape-analysis", &body)).await;
    assert_status(&response, StatusCode::OK);
    let json = read_json(response).await;

    let overlap = json["features"]["overlap_percentage"].as_f64().unwrap();
    assert!(overlap > 0.0 && overlap < 0.5, "overlap {}", overlap);
    assert_normalized(&json["emotional_state"], 8);
}

#[tokio::test]
async fn test_traced_image_of_other_size_is_accepted() {
    let body = json!({
        "original_image": encode_png(&square_image(128, 32)),
        "traced_image": encode_png(&square_image(64, 16)),
        "response_time": 1.0,
        "shape_type": "square",
    });

    let response = send(test_router(&test_config()), post_json("/shape-analysis", &body)).await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_errors_are_400() {
    let square = encode_png(&square_image(32, 8));
    let cases = [
        json!({"original_image": "", "traced_image": square, "response_time": 1.0, "shape_type": "square"}),
        json!({"original_image": square, "traced_image": square, "response_time": -1.0, "shape_type": "square"}),
        json!({"original_image": square, "traced_image": square, "response_time": 1.0, "shape_type": "  "}),
    ];

    for body in cases {
        let response =
            send(test_router(&test_config()), post_json("/shape-analysis", &body)).await;
        assert_status(&response, StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["error_type"], "validation_error");
    }
}

#[tokio::test]
async fn test_undecodable_image_is_analysis_failure() {
    let body = json!({
        "original_image": "not base64 at all!",
        "traced_image": encode_png(&square_image(32, 8)),
        "response_time": 1.0,
        "shape_type": "square",
    });

    let response = send(test_router(&test_config()), post_json("/shape-analysis", &body)).await;
    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let json = read_json(response).await;
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("Analysis failed: "));
}

#[tokio::test]
async fn test_missing_field_is_rejected() {
    let body = json!({"original_image": "AAAA", "response_time": 1.0});
    let response = send(test_router(&test_config()), post_json("/shape-analysis", &body)).await;
    assert!(response.status().is_client_error());
}

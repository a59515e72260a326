// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /, /predefined-shapes, /health and /metrics

use axum::http::{header, StatusCode};
use serde_json::json;

use super::common::*;

#[tokio::test]
async fn test_root_describes_api() {
    let response = send(test_router(&test_config()), get("/")).await;
    assert_status(&response, StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["message"], "Welcome to AI-PsychDoodle-Analyzer API");
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(json["endpoints"], json!(["/shape-analysis", "/doodle-analysis"]));
}

#[tokio::test]
async fn test_predefined_shapes_catalog() {
    let response = send(test_router(&test_config()), get("/predefined-shapes")).await;
    assert_status(&response, StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(
        json,
        json!({
            "basic": ["triangle", "circle", "square"],
            "complex": ["star", "house", "tree", "person"],
            "emotional": ["heart", "smile", "frown"],
        })
    );
}

#[tokio::test]
async fn test_health_reports_missing_models() {
    let response = send(test_router(&test_config()), get("/health")).await;
    assert_status(&response, StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["status"], "degraded");
    let models = json["models"].as_array().unwrap();
    assert_eq!(models.len(), 3);
    assert!(models.iter().all(|m| m["available"] == false));
    assert_eq!(json["version"]["version"], "1.0.0");
    let features = json["version"]["features"].as_array().unwrap();
    assert!(features.contains(&json!("doodle-analysis")));
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let config = test_config();
    let app = test_router(&config);

    send(app.clone(), get("/predefined-shapes")).await;
    send(app.clone(), post_json("/doodle-analysis", &json!({"doodle_image": ""}))).await;

    let response = send(app, get("/metrics")).await;
    assert_status(&response, StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let text = read_text(response).await;
    assert!(text.contains(
        "psychdoodle_http_requests_total{endpoint=\"/predefined-shapes\",status=\"200\"} 1"
    ));
    assert!(text.contains(
        "psychdoodle_http_requests_total{endpoint=\"/doodle-analysis\",status=\"400\"} 1"
    ));
}

#[tokio::test]
async fn test_metrics_disabled_is_404() {
    let mut config = test_config();
    config.monitoring.prometheus_enabled = false;
    let response = send(test_router(&config), get("/metrics")).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = send(test_router(&test_config()), get("/nope")).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

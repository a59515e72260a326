// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for driving the router in-process

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use psychdoodle_node::{
    api::{create_router, AppState},
    config::ServerConfig,
    vision::{encode_base64_image, AnalysisModelManager, EncodeFormat},
};
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    // No swatch directory; the transform synthesizes its textures
    config.storage.path = "target/no-such-storage".to_string();
    config
}

pub fn test_router(config: &ServerConfig) -> Router {
    let state = AppState::new(config, AnalysisModelManager::heuristic_only()).unwrap();
    create_router(state, config)
}

/// Light strokes on a dark canvas, as the tracing canvas exports them
pub fn square_image(size: u32, inset: i32) -> RgbImage {
    let mut img = RgbImage::from_pixel(size, size, Rgb([0, 0, 0]));
    let side = size - 2 * inset as u32;
    draw_filled_rect_mut(
        &mut img,
        Rect::at(inset, inset).of_size(side, side),
        Rgb([255, 255, 255]),
    );
    img
}

pub fn encode_png(img: &RgbImage) -> String {
    encode_base64_image(img, EncodeFormat::Png).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn read_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn assert_normalized(scores: &Value, categories: usize) {
    let map = scores.as_object().expect("scores are a JSON object");
    assert_eq!(map.len(), categories);
    let total: f64 = map.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-4, "scores sum to {}", total);
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

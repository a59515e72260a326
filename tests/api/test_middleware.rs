// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! API keys, rate limiting and CORS on the assembled router

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use std::net::SocketAddr;
use psychdoodle_node::api::API_KEY_HEADER;
use serde_json::json;

use super::common::*;

fn keyed_config() -> psychdoodle_node::config::ServerConfig {
    let mut config = test_config();
    config.api.require_api_key = true;
    config.api.api_keys = vec!["doodle-key".to_string()];
    config
}

fn empty_doodle(key: Option<&str>) -> Request<Body> {
    let mut request = post_json("/doodle-analysis", &json!({"doodle_image": ""}));
    if let Some(key) = key {
        request
            .headers_mut()
            .insert(API_KEY_HEADER, key.parse().unwrap());
    }
    request
}

fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

fn forwarded_for(mut request: Request<Body>, client: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-forwarded-for", client.parse().unwrap());
    request
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_401() {
    let app = test_router(&keyed_config());

    let response = send(app.clone(), empty_doodle(None)).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);

    let response = send(app.clone(), empty_doodle(Some("wrong"))).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
    let json = read_json(response).await;
    assert_eq!(json["error_type"], "unauthorized");

    // Accepted key reaches the handler, which rejects the empty image
    let response = send(app, empty_doodle(Some("doodle-key"))).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_info_routes_need_no_key() {
    let app = test_router(&keyed_config());
    let response = send(app.clone(), get("/predefined-shapes")).await;
    assert_status(&response, StatusCode::OK);
    let response = send(app, get("/health")).await;
    assert_status(&response, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_returns_429_with_retry_after() {
    let mut config = test_config();
    config.api.rate_limit = 2;
    let app = test_router(&config);

    for _ in 0..2 {
        let response = send(app.clone(), empty_doodle(None)).await;
        assert_status(&response, StatusCode::BAD_REQUEST);
    }

    let response = send(app.clone(), empty_doodle(None)).await;
    assert_status(&response, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));

    // Another peer still gets through
    let request = from_peer(empty_doodle(None), "10.1.2.3:40000");
    let response = send(app, request).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forwarded_for_is_ignored_without_trusted_proxy() {
    let mut config = test_config();
    config.api.rate_limit = 10;
    let app = test_router(&config);

    let mut limited = 0;
    for i in 0..25 {
        let request = from_peer(empty_doodle(None), "203.0.113.9:51000");
        let request = forwarded_for(request, &format!("10.0.0.{}", i));
        let response = send(app.clone(), request).await;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        }
    }
    assert_eq!(limited, 15);
}

#[tokio::test]
async fn test_unvalidated_api_key_does_not_pick_the_bucket() {
    let mut config = test_config();
    config.api.rate_limit = 1;
    let app = test_router(&config);

    let response = send(app.clone(), from_peer(empty_doodle(Some("a")), "203.0.113.9:1")).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
    let response = send(app, from_peer(empty_doodle(Some("b")), "203.0.113.9:2")).await;
    assert_status(&response, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_proxy_limits_each_forwarded_client() {
    let mut config = test_config();
    config.api.rate_limit = 1;
    config.api.trust_forwarded_for = true;
    let app = test_router(&config);

    let proxy = "127.0.0.1:8443";
    let first = forwarded_for(from_peer(empty_doodle(None), proxy), "198.51.100.1");
    assert_status(&send(app.clone(), first).await, StatusCode::BAD_REQUEST);

    let other = forwarded_for(from_peer(empty_doodle(None), proxy), "198.51.100.2");
    assert_status(&send(app.clone(), other).await, StatusCode::BAD_REQUEST);

    let again = forwarded_for(from_peer(empty_doodle(None), proxy), "198.51.100.1, 10.0.0.1");
    assert_status(&send(app, again).await, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_disabled() {
    let mut config = test_config();
    config.api.rate_limit = 1;
    config.api.rate_limit_enabled = false;
    let app = test_router(&config);

    for _ in 0..3 {
        let response = send(app.clone(), empty_doodle(None)).await;
        assert_status(&response, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let mut config = test_config();
    config.api.allowed_origins = vec!["https://doodles.example".to_string()];
    let app = test_router(&config);

    let request = Request::builder()
        .uri("/predefined-shapes")
        .header(header::ORIGIN, "https://doodles.example")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://doodles.example"
    );
}

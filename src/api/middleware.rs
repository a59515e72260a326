// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request middleware: API keys, rate limiting, request metrics

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::http_server::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Per-client request log over a sliding window
pub struct RateLimiter {
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit_per_minute: usize) -> Self {
        Self::with_window(limit_per_minute, Duration::from_secs(60))
    }

    pub fn with_window(limit: usize, window: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            limit,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record the request, or reject it with the seconds until a slot frees
    pub async fn check_rate_limit(&self, key: &str) -> Result<(), ApiError> {
        let now = Instant::now();
        let mut requests = self.requests.write().await;
        let entry = requests.entry(key.to_string()).or_default();

        entry.retain(|&t| now.duration_since(t) < self.window);

        if entry.len() >= self.limit {
            let oldest = entry.first().copied().unwrap_or(now);
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            return Err(ApiError::RateLimitExceeded {
                retry_after: wait.as_secs().max(1),
            });
        }

        entry.push(now);
        Ok(())
    }

    /// Drop clients with no request inside the window; returns how many
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut requests = self.requests.write().await;
        let before = requests.len();
        requests.retain(|_, times| {
            times.retain(|&t| now.duration_since(t) < self.window);
            !times.is_empty()
        });
        before - requests.len()
    }

    /// Number of clients currently holding a bucket
    pub async fn tracked_clients(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Sweep every `interval` until the returned handle is aborted
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = self.sweep().await;
                if removed > 0 {
                    debug!("Rate limiter dropped {} idle clients", removed);
                }
            }
        })
    }
}

/// Client identity for rate limiting
///
/// A key that passed the API-key check identifies the client. Otherwise the
/// peer address does, or the first `X-Forwarded-For` hop when the service is
/// configured to trust its proxy.
fn client_key(
    request: &Request,
    validated_key: Option<&str>,
    trust_forwarded_for: bool,
) -> String {
    if let Some(key) = validated_key {
        return format!("key:{}", key);
    }
    if trust_forwarded_for {
        if let Some(forwarded) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// API-key check followed by the rate limit; applied to analysis routes
pub async fn access_control(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut validated_key = None;
    if let Some(keys) = &state.api_keys {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        match provided {
            Some(key) if keys.contains(key) => validated_key = Some(key.to_string()),
            Some(_) => {
                warn!("Rejected request with unknown API key");
                return ApiError::Unauthorized("Invalid API key".to_string()).into_response();
            }
            None => {
                warn!("Rejected request without API key");
                return ApiError::Unauthorized("Missing X-API-Key header".to_string())
                    .into_response();
            }
        }
    }

    if let Some(limiter) = &state.rate_limiter {
        let client = client_key(
            &request,
            validated_key.as_deref(),
            state.trust_forwarded_for,
        );
        if let Err(e) = limiter.check_rate_limit(&client).await {
            warn!("Rate limit exceeded for {}", client);
            if let Some(metrics) = &state.metrics {
                metrics.record_rate_limited();
            }
            return e.into_response();
        }
    }

    next.run(request).await
}

/// Count every response by route and status
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    if let Some(metrics) = &state.metrics {
        metrics.record_request(&endpoint, response.status().as_u16());
    }
    response
}

pub fn key_set(keys: &[String]) -> Arc<HashSet<String>> {
    Arc::new(keys.iter().cloned().collect())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::{collections::HashSet, future::Future, net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::doodle_analysis::doodle_analysis_handler;
use super::handlers::{health_handler, metrics_handler, predefined_shapes_handler, root_handler};
use super::middleware::{access_control, key_set, track_requests, RateLimiter};
use super::shape_analysis::shape_analysis_handler;
use crate::analysis::{DrawingAnalyzer, ShapeAnalyzer};
use crate::config::ServerConfig;
use crate::monitoring::{AnalysisMetrics, HealthChecker};
use crate::transform::DoodleTransformer;
use crate::vision::AnalysisModelManager;

/// Base64 payloads of two full-size drawings fit comfortably
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shape_analyzer: Arc<ShapeAnalyzer>,
    pub drawing_analyzer: Arc<DrawingAnalyzer>,
    pub transformer: Arc<DoodleTransformer>,
    pub models: Arc<AnalysisModelManager>,
    pub health: Arc<HealthChecker>,
    /// None when monitoring or Prometheus export is disabled
    pub metrics: Option<AnalysisMetrics>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    /// Key rate limits on `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
    /// None when API keys are not required
    pub api_keys: Option<Arc<HashSet<String>>>,
}

impl AppState {
    pub fn new(config: &ServerConfig, models: AnalysisModelManager) -> Result<Self> {
        let models = Arc::new(models);
        let landscapes_dir = config.storage.landscapes_dir();

        let metrics = if config.monitoring.enabled && config.monitoring.prometheus_enabled {
            Some(AnalysisMetrics::new().context("Failed to register metrics")?)
        } else {
            None
        };

        let rate_limiter = config
            .api
            .rate_limit_enabled
            .then(|| Arc::new(RateLimiter::new(config.api.rate_limit)));

        let api_keys = config
            .api
            .require_api_key
            .then(|| key_set(&config.api.api_keys));

        Ok(Self {
            shape_analyzer: Arc::new(ShapeAnalyzer::new(models.get_shape_model())),
            drawing_analyzer: Arc::new(DrawingAnalyzer::new(models.get_drawing_model())),
            transformer: Arc::new(DoodleTransformer::new(
                models.get_generator_model(),
                Some(landscapes_dir.as_path()),
            )),
            health: Arc::new(HealthChecker::new(models.clone())),
            models,
            metrics,
            rate_limiter,
            trust_forwarded_for: config.api.trust_forwarded_for,
            api_keys,
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let analysis = Router::new()
        .route("/shape-analysis", post(shape_analysis_handler))
        .route("/doodle-analysis", post(doodle_analysis_handler))
        .route_layer(from_fn_with_state(state.clone(), access_control));

    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/predefined-shapes", get(predefined_shapes_handler))
        // Health check
        .route("/health", get(health_handler))
        // Metrics endpoint
        .route("/metrics", get(metrics_handler))
        .merge(analysis)
        .layer(from_fn_with_state(state.clone(), track_requests))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.timeout)))
        .layer(TraceLayer::new_for_http());

    if config.api.enable_cors {
        app = app.layer(cors_layer(&config.api.allowed_origins));
    }

    app.with_state(state)
}

/// Router for the standalone Prometheus listener
pub fn create_metrics_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

pub async fn start_server<F>(config: &ServerConfig, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state, config);

    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    info!("API server stopped");
    Ok(())
}

pub async fn start_metrics_server<F>(host: &str, port: u16, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", host, port)
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid metrics address {}:{}", host, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics listener {}", addr))?;

    info!("Metrics listening on {}", addr);

    axum::serve(listener, create_metrics_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_follows_config() {
        let mut config = ServerConfig::default();
        config.api.require_api_key = true;
        config.api.api_keys = vec!["secret".to_string()];
        config.api.rate_limit_enabled = false;
        config.monitoring.prometheus_enabled = false;

        let state = AppState::new(&config, AnalysisModelManager::heuristic_only()).unwrap();
        assert!(state.api_keys.as_ref().unwrap().contains("secret"));
        assert!(state.rate_limiter.is_none());
        assert!(state.metrics.is_none());
        assert!(!state.shape_analyzer.has_model());
        assert!(!state.transformer.has_model());
    }

    #[test]
    fn test_defaults_enable_limits_and_metrics() {
        let state =
            AppState::new(&ServerConfig::default(), AnalysisModelManager::heuristic_only())
                .unwrap();
        assert!(state.api_keys.is_none());
        assert!(state.rate_limiter.is_some());
        assert!(!state.trust_forwarded_for);
        assert!(state.metrics.is_some());
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod doodle_analysis;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod middleware;
pub mod shape_analysis;

pub use doodle_analysis::{
    doodle_analysis_handler, DominantColorInfo, DoodleAnalysisRequest, DoodleAnalysisResponse,
};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{PredefinedShapesResponse, RootResponse};
pub use http_server::{create_router, start_metrics_server, start_server, AppState};
pub use middleware::{RateLimiter, API_KEY_HEADER};
pub use shape_analysis::{shape_analysis_handler, ShapeAnalysisRequest, ShapeAnalysisResponse};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod monitoring;
pub mod transform;
pub mod version;
pub mod vision;

pub use analysis::{
    AnalysisError, AnalysisMethod, DrawingAnalyzer, Emotion, EmotionScores, ShapeAnalyzer,
};
pub use api::{create_router, start_server, ApiError, AppState};
pub use config::{ConfigError, ServerConfig};
pub use transform::DoodleTransformer;
pub use vision::AnalysisModelManager;

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the PsychDoodle analyzer node

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-doodle-analysis-2025-10-17";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-17";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "shape-analysis",
    "doodle-analysis",
    "heuristic-scoring",
    "onnx-scoring",
    "doodle-transform",
    "rate-limiting",
    "api-keys",
    "prometheus-metrics",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("PsychDoodle Analyzer {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Version block of the health report
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}

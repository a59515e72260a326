// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Doodle analysis API endpoint module
//!
//! Provides POST /doodle-analysis for drawing scoring plus landscape transform.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::doodle_analysis_handler;
pub use request::DoodleAnalysisRequest;
pub use response::{DominantColorInfo, DoodleAnalysisResponse};

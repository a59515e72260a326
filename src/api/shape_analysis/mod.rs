// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shape analysis API endpoint module
//!
//! Provides POST /shape-analysis for traced-shape scoring.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::shape_analysis_handler;
pub use request::ShapeAnalysisRequest;
pub use response::ShapeAnalysisResponse;

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Args;
use image::RgbImage;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::{DrawingAnalyzer, ShapeAnalyzer};
use crate::config::{ServerConfig, DEFAULT_CONFIG_PATH};
use crate::transform::DoodleTransformer;
use crate::vision::{decode_image_bytes, AnalysisModelManager};

/// Arguments for analyze-shape command
#[derive(Args, Debug)]
pub struct AnalyzeShapeArgs {
    /// Reference shape image
    #[arg(long)]
    pub original: PathBuf,

    /// The user's tracing of the shape
    #[arg(long)]
    pub traced: PathBuf,

    /// Seconds the user took to trace
    #[arg(long, default_value_t = 2.0)]
    pub response_time: f32,

    /// Shape label (triangle, square, circle, ...)
    #[arg(long)]
    pub shape_type: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for analyze-doodle command
#[derive(Args, Debug)]
pub struct AnalyzeDoodleArgs {
    /// Doodle image
    #[arg(long)]
    pub doodle: PathBuf,

    /// Write the transformed landscape here (format from extension)
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Configuration file with model paths and storage location
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Skip model loading and score with heuristics only
    #[arg(long)]
    pub heuristic: bool,

    /// Seed for feedback template selection
    #[arg(long)]
    pub seed: Option<u64>,
}

impl CommonArgs {
    fn load(&self) -> Result<(ServerConfig, AnalysisModelManager)> {
        let config = ServerConfig::load(&self.config)?;
        let models = if self.heuristic {
            AnalysisModelManager::heuristic_only()
        } else {
            AnalysisModelManager::new(&config.models.to_model_config())
        };
        Ok((config, models))
    }

    fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::thread_rng()),
        }
    }
}

fn read_image(path: &Path) -> Result<RgbImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (image, _) = decode_image_bytes(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(image.to_rgb8())
}

pub fn analyze_shape(args: AnalyzeShapeArgs) -> Result<()> {
    let report = shape_report(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn shape_report(args: &AnalyzeShapeArgs) -> Result<Value> {
    let (_, models) = args.common.load()?;
    let analyzer = ShapeAnalyzer::new(models.get_shape_model());

    let original = read_image(&args.original)?;
    let traced = read_image(&args.traced)?;
    let analysis = analyzer.analyze(&original, &traced, args.response_time, &args.shape_type)?;

    let mut rng = args.common.rng();
    let feedback = analyzer.generate_feedback(&analysis.scores, &mut *rng)?;
    let recommendation = analyzer.generate_recommendation(&analysis.scores, &mut *rng)?;

    Ok(json!({
        "shape_type": args.shape_type,
        "emotional_state": analysis.scores,
        "feedback": feedback,
        "recommendation": recommendation,
        "method": analysis.method,
        "features": analysis.features,
    }))
}

pub fn analyze_doodle(args: AnalyzeDoodleArgs) -> Result<()> {
    let report = doodle_report(&args)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn doodle_report(args: &AnalyzeDoodleArgs) -> Result<Value> {
    let (config, models) = args.common.load()?;
    let analyzer = DrawingAnalyzer::new(models.get_drawing_model());
    let landscapes_dir = config.storage.landscapes_dir();
    let transformer =
        DoodleTransformer::new(models.get_generator_model(), Some(landscapes_dir.as_path()));

    let doodle = read_image(&args.doodle)?;
    let transformed = transformer.transform(&doodle);
    let analysis = analyzer.analyze(&transformed.image)?;

    let mut rng = args.common.rng();
    let feedback = analyzer.generate_feedback(&analysis.scores, &mut *rng)?;
    let recommendation = analyzer.generate_recommendation(&analysis.scores, &mut *rng)?;

    if let Some(output) = &args.output {
        transformed
            .image
            .save(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Wrote transformed doodle to {}", output.display());
    }

    Ok(json!({
        "emotional_state": analysis.scores,
        "feedback": feedback,
        "recommendation": recommendation,
        "method": analysis.method,
        "transform_method": transformed.method,
        "features": analysis.features,
        "output": args.output,
    }))
}

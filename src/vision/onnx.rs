// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime wrappers for the optional trained models
//!
//! - [`EmotionScoringModel`]: feature vector `[1, N]` -> 8 category scores
//! - [`DoodleGeneratorModel`]: doodle `[1, 3, 256, 256]` in [-1, 1] -> image
//!   of the same shape (tanh output)

use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array4, IxDyn};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Side length the generator consumes and produces
pub const GENERATOR_INPUT_SIZE: u32 = 256;

/// Execution options shared by all models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub use_gpu: bool,
    /// CUDA arena limit in MiB (0 = unlimited)
    pub gpu_memory_limit_mb: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            use_gpu: false,
            gpu_memory_limit_mb: 0,
        }
    }
}

/// Create an ONNX session, trying CUDA first when requested
fn build_session(model_path: &Path, options: SessionOptions) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("Model not found: {}", model_path.display());
    }

    if options.use_gpu {
        let mut cuda = CUDAExecutionProvider::default();
        if options.gpu_memory_limit_mb > 0 {
            cuda = cuda.with_memory_limit(options.gpu_memory_limit_mb * 1024 * 1024);
        }

        let cuda_result = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([cuda.build()])
            .context("Failed to set CUDA execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .commit_from_file(model_path);

        match cuda_result {
            Ok(session) => {
                info!("✅ CUDA execution provider initialized for {}", model_path.display());
                return Ok(session);
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {}", e);
                warn!("   Falling back to CPU execution provider");
            }
        }
    }

    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(2)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!("Failed to load model from {}", model_path.display()))
}

fn first_input_name(session: &Session, fallback: &str) -> String {
    session
        .inputs
        .first()
        .map(|input| input.name.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Trained emotion classifier over a fixed-length feature vector
#[derive(Clone)]
pub struct EmotionScoringModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    feature_count: usize,
    output_count: usize,
}

impl std::fmt::Debug for EmotionScoringModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmotionScoringModel")
            .field("input_name", &self.input_name)
            .field("feature_count", &self.feature_count)
            .field("output_count", &self.output_count)
            .finish_non_exhaustive()
    }
}

impl EmotionScoringModel {
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        feature_count: usize,
        output_count: usize,
        options: SessionOptions,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading emotion scoring model from {}", model_path.display());

        let session = build_session(model_path, options)?;
        let input_name = first_input_name(&session, "features");
        debug!(
            "Scoring model loaded - input: {}, features: {}",
            input_name, feature_count
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            feature_count,
            output_count,
        })
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Raw (unnormalized) category scores for one feature vector
    pub fn predict(&self, features: &[f32]) -> Result<Vec<f32>> {
        if features.len() != self.feature_count {
            anyhow::bail!(
                "Expected {} features, got {}",
                self.feature_count,
                features.len()
            );
        }

        let input = Array2::from_shape_vec((1, self.feature_count), features.to_vec())
            .context("Failed to shape feature tensor")?;
        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Scoring session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Scoring inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        let scores: Vec<f32> = output.iter().copied().collect();

        if scores.len() != self.output_count {
            anyhow::bail!(
                "Model returned {} scores, expected {}",
                scores.len(),
                self.output_count
            );
        }
        Ok(scores)
    }
}

/// Doodle-to-landscape generator (SPADE-style image translation)
#[derive(Clone)]
pub struct DoodleGeneratorModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
}

impl std::fmt::Debug for DoodleGeneratorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoodleGeneratorModel")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl DoodleGeneratorModel {
    pub fn new<P: AsRef<Path>>(model_path: P, options: SessionOptions) -> Result<Self> {
        let model_path = model_path.as_ref();
        info!("Loading doodle generator from {}", model_path.display());

        let session = build_session(model_path, options)?;
        let input_name = first_input_name(&session, "input");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
        })
    }

    /// Translate a 256x256 doodle into a generated image
    pub fn generate(&self, doodle: &RgbImage) -> Result<RgbImage> {
        if doodle.dimensions() != (GENERATOR_INPUT_SIZE, GENERATOR_INPUT_SIZE) {
            anyhow::bail!(
                "Generator expects {0}x{0} input, got {1}x{2}",
                GENERATOR_INPUT_SIZE,
                doodle.width(),
                doodle.height()
            );
        }

        let input_value =
            Value::from_array(to_signed_tensor(doodle)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Generator session lock poisoned"))?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Generator inference failed")?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let size = GENERATOR_INPUT_SIZE as usize;
        if output.shape() != [1, 3, size, size].as_slice() {
            anyhow::bail!("Unexpected generator output shape: {:?}", output.shape());
        }

        let mut image = RgbImage::new(GENERATOR_INPUT_SIZE, GENERATOR_INPUT_SIZE);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let channel = |c: usize| {
                let value = output[IxDyn(&[0, c, y as usize, x as usize])];
                ((value + 1.0) * 127.5).clamp(0.0, 255.0) as u8
            };
            *pixel = Rgb([channel(0), channel(1), channel(2)]);
        }
        Ok(image)
    }
}

/// NCHW tensor with pixel values scaled from [0, 255] to [-1, 1]
pub fn to_signed_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let mut tensor = Array4::zeros((1, 3, height, width));
    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 127.5 - 1.0;
        }
    }
    tensor
}

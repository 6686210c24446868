//! ONNX Runtime backend
//!
//! Runs a U²-Net-style saliency segmentation model: the input image is
//! resized to the model's square side, normalized with ImageNet statistics,
//! and fed through the network; the resulting saliency map is min-max
//! rescaled, resized back to the original dimensions, and applied as the
//! image's alpha channel.
//!
//! Input and output tensor names are read from the session metadata, so
//! both `u2net.onnx` (320) and `isnet-general-use.onnx` (1024) variants
//! load without configuration beyond `input_size`.

use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, RgbImage};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use super::backend::MattingBackend;
use super::types::{MattingError, ModelSpec, Result};

// ============================================================
// Constants - input normalization (ImageNet statistics)
// ============================================================

const NORM_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const NORM_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Default square input side for U²-Net family models
pub const DEFAULT_INPUT_SIZE: u32 = 320;

/// ONNX Runtime inference backend.
///
/// The session is not re-entrant (`run` takes `&mut self`), so it lives
/// behind a mutex; concurrent requests queue on the lock. One inference at
/// a time also bounds peak memory.
#[derive(Debug)]
pub struct OnnxBackend {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    spec: ModelSpec,
}

impl OnnxBackend {
    /// Load a model file and prepare a session.
    pub fn load(spec: ModelSpec) -> Result<Self> {
        if !spec.path.is_file() {
            return Err(MattingError::ModelNotFound(
                spec.path.display().to_string(),
            ));
        }

        let session = build_session(&spec.path)
            .map_err(|e| MattingError::Inference(e.to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| MattingError::Inference("model declares no inputs".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| MattingError::Inference("model declares no outputs".to_string()))?;

        debug!(
            model = %spec.path.display(),
            input = %input_name,
            output = %output_name,
            side = spec.input_size,
            "ONNX session ready"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            spec,
        })
    }

    /// Run the network and copy out the saliency plane.
    fn run_inference(&self, chw: Vec<f32>) -> Result<Vec<f32>> {
        let side = self.spec.input_size as usize;
        let plane = side * side;

        let tensor = Tensor::from_array(([1usize, 3, side, side], chw))
            .map_err(|e| MattingError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MattingError::Inference("model session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| MattingError::Inference(e.to_string()))?;

        let (_, raw) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| MattingError::Inference(e.to_string()))?;

        if raw.len() < plane {
            return Err(MattingError::Inference(format!(
                "unexpected output length {} (expected at least {})",
                raw.len(),
                plane
            )));
        }

        Ok(raw[..plane].to_vec())
    }
}

impl MattingBackend for OnnxBackend {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn remove(&self, input: &[u8]) -> Result<Vec<u8>> {
        let original = image::load_from_memory(input)
            .map_err(|e| MattingError::InvalidInput(e.to_string()))?;
        let (width, height) = (original.width(), original.height());
        if width == 0 || height == 0 {
            return Err(MattingError::InvalidInput(
                "image has zero dimensions".to_string(),
            ));
        }

        let side = self.spec.input_size;
        let resized = original
            .resize_exact(side, side, FilterType::Triangle)
            .to_rgb8();
        let chw = normalize_chw(&resized);

        let saliency = self.run_inference(chw)?;
        let mask = mask_from_saliency(&saliency, side, width, height);

        let mut rgba = original.into_rgba8();
        for (x, y, pixel) in rgba.enumerate_pixels_mut() {
            pixel.0[3] = mask.get_pixel(x, y).0[0];
        }

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| MattingError::Inference(e.to_string()))?;
        Ok(buf.into_inner())
    }

    fn model_path(&self) -> Option<&Path> {
        Some(&self.spec.path)
    }
}

fn build_session(path: &Path) -> ort::Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(num_cpus::get())?
        .commit_from_file(path)
}

/// Pack an RGB image into a normalized NCHW float plane set.
fn normalize_chw(rgb: &RgbImage) -> Vec<f32> {
    let side = rgb.width();
    let plane = (side * rgb.height()) as usize;
    let mut chw = vec![0f32; 3 * plane];

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let idx = (y * side + x) as usize;
        for c in 0..3 {
            chw[c * plane + idx] = (pixel.0[c] as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c];
        }
    }

    chw
}

/// Min-max rescale the saliency plane to 0..=255 and resize it to the
/// original image dimensions.
fn mask_from_saliency(saliency: &[f32], side: u32, width: u32, height: u32) -> GrayImage {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in saliency {
        min = min.min(v);
        max = max.max(v);
    }
    let range = (max - min).max(f32::EPSILON);

    let mut mask = GrayImage::new(side, side);
    for (i, &v) in saliency.iter().enumerate() {
        let x = i as u32 % side;
        let y = i as u32 / side;
        let level = ((v - min) / range * 255.0).round().clamp(0.0, 255.0) as u8;
        mask.put_pixel(x, y, Luma([level]));
    }

    image::imageops::resize(&mask, width, height, FilterType::Triangle)
}

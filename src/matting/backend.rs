//! Background removal backend seam
//!
//! The pipeline treats background removal as an opaque bytes-to-bytes
//! function: encoded image in, encoded RGBA image (with the background
//! made transparent) out. [`MattingBackend`] is that seam; the production
//! implementation is [`OnnxBackend`](super::OnnxBackend), and
//! [`MockBackend`] provides a deterministic stand-in for tests and for
//! running without a model file.

use std::env;
use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageFormat, Rgba};

use super::types::{MattingError, Result};

/// Environment variable overriding the model file location.
pub const MODEL_ENV_VAR: &str = "CUTOUT_MODEL";

/// Model filename searched for in the default locations.
pub const DEFAULT_MODEL_FILENAME: &str = "u2net.onnx";

/// Opaque background-removal function.
///
/// Implementations receive the encoded upload (already rasterized if it was
/// an SVG) and return an encoded image whose background pixels are
/// transparent. Failures map to HTTP 500 at the web layer.
pub trait MattingBackend: Send + Sync {
    /// Short identifier reported by `/health` and `info`.
    fn name(&self) -> &'static str;

    /// Remove the background from an encoded image, returning encoded
    /// (PNG) bytes with an alpha channel.
    fn remove(&self, input: &[u8]) -> Result<Vec<u8>>;

    /// Where the backing model lives, if any.
    fn model_path(&self) -> Option<&std::path::Path> {
        None
    }
}

/// Which backend implementation to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// ONNX Runtime inference against a U²-Net-style saliency model
    #[default]
    Onnx,
    /// Deterministic corner-color keying; no model file required
    Mock,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Onnx => write!(f, "onnx"),
            BackendKind::Mock => write!(f, "mock"),
        }
    }
}

/// Candidate locations for the model file, in resolution order.
///
/// Explicit configuration wins; then the `CUTOUT_MODEL` environment
/// variable, a project-local `models/` directory, and the per-user data
/// directory.
pub fn model_search_paths(explicit: Option<&PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = explicit {
        paths.push(p.clone());
    }

    if let Ok(env_path) = env::var(MODEL_ENV_VAR) {
        if !env_path.is_empty() {
            paths.push(PathBuf::from(env_path));
        }
    }

    paths.push(PathBuf::from("models").join(DEFAULT_MODEL_FILENAME));

    if let Some(data_dir) = dirs::data_dir() {
        paths.push(data_dir.join("cutout/models").join(DEFAULT_MODEL_FILENAME));
    }

    paths
}

/// Resolve the model file, trying each search path in order.
pub fn resolve_model_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    let candidates = model_search_paths(explicit);

    for candidate in &candidates {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }

    let searched = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(MattingError::ModelNotFound(searched))
}

/// Deterministic backend for tests and model-less development.
///
/// Keys out every pixel whose color exactly matches the top-left corner,
/// which is a reasonable proxy for "the background" on synthetic inputs.
/// Output is always RGBA PNG, matching the production backend's contract.
#[derive(Debug, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MattingBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn remove(&self, input: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(input)
            .map_err(|e| MattingError::InvalidInput(e.to_string()))?;
        let mut rgba = decoded.to_rgba8();

        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(MattingError::InvalidInput(
                "image has zero dimensions".to_string(),
            ));
        }

        let key = *rgba.get_pixel(0, 0);
        for pixel in rgba.pixels_mut() {
            if pixel.0[..3] == key.0[..3] {
                *pixel = Rgba([pixel.0[0], pixel.0[1], pixel.0[2], 0]);
            }
        }

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| MattingError::Inference(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn encode_png(img: RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_mock_keys_out_corner_color() {
        // Blue canvas with a red square in the middle
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 255, 255]));
        for y in 3..6 {
            for x in 3..6 {
                img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }

        let backend = MockBackend::new();
        let out = backend.remove(&encode_png(img)).unwrap();
        let result = image::load_from_memory(&out).unwrap().to_rgba8();

        assert_eq!(result.get_pixel(0, 0).0[3], 0, "background transparent");
        assert_eq!(result.get_pixel(4, 4).0[3], 255, "subject opaque");
        assert_eq!(result.get_pixel(4, 4).0[0], 255, "subject color kept");
    }

    #[test]
    fn test_mock_rejects_garbage() {
        let backend = MockBackend::new();
        let err = backend.remove(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap_err();
        assert!(matches!(err, MattingError::InvalidInput(_)));
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Onnx.to_string(), "onnx");
        assert_eq!(BackendKind::Mock.to_string(), "mock");
        assert_eq!(BackendKind::default(), BackendKind::Onnx);
    }

    #[test]
    fn test_search_paths_explicit_first() {
        let explicit = PathBuf::from("/opt/models/isnet.onnx");
        let paths = model_search_paths(Some(&explicit));
        assert_eq!(paths[0], explicit);
        assert!(paths
            .iter()
            .any(|p| p.ends_with(PathBuf::from("models").join(DEFAULT_MODEL_FILENAME))));
    }

    #[test]
    fn test_resolve_missing_model_lists_candidates() {
        let explicit = PathBuf::from("/nonexistent/never/u2net.onnx");
        // May still resolve if a real model exists in a default location;
        // only assert on the error shape when nothing is found.
        if let Err(err) = resolve_model_path(Some(&explicit)) {
            let msg = err.to_string();
            assert!(msg.contains("/nonexistent/never/u2net.onnx"));
            assert!(msg.starts_with("Model file not found"));
        }
    }
}

//! Common types for the matting module

use std::path::PathBuf;
use thiserror::Error;

/// Matting error types
#[derive(Debug, Error)]
pub enum MattingError {
    #[error("Model file not found (searched: {0})")]
    ModelNotFound(String),

    #[error("Invalid input image: {0}")]
    InvalidInput(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MattingError>;

/// A resolved model file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Path to the `.onnx` file
    pub path: PathBuf,
    /// Square side length the model expects as input (320 for U²-Net,
    /// 1024 for ISNet)
    pub input_size: u32,
}

impl ModelSpec {
    pub fn new(path: impl Into<PathBuf>, input_size: u32) -> Self {
        Self {
            path: path.into(),
            input_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_spec_new() {
        let spec = ModelSpec::new("/tmp/u2net.onnx", 320);
        assert_eq!(spec.path, PathBuf::from("/tmp/u2net.onnx"));
        assert_eq!(spec.input_size, 320);
    }

    #[test]
    fn test_error_display() {
        let err = MattingError::Inference("shape mismatch".to_string());
        assert_eq!(err.to_string(), "Inference failed: shape mismatch");
    }
}

//! Common types for the pipeline module

use thiserror::Error;

use crate::matting::MattingError;

/// Pipeline error types
///
/// Each variant corresponds to one failure point of the request handler.
/// `Rasterization` is a client error (the upload itself was bad); the rest
/// are server errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("SVG rasterization failed: {0}")]
    Rasterization(String),

    #[error("Background removal failed: {0}")]
    Matting(#[source] MattingError),

    #[error("Failed to parse model output as image: {0}")]
    OutputDecode(#[source] image::ImageError),

    #[error("Failed to save output image: {0}")]
    Save(String),
}

impl PipelineError {
    /// Whether the failure was caused by the uploaded input rather than
    /// the service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::Rasterization(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_keep_prefixes() {
        let err = PipelineError::Rasterization("bad root element".to_string());
        assert_eq!(
            err.to_string(),
            "SVG rasterization failed: bad root element"
        );

        let err = PipelineError::Save("disk full".to_string());
        assert_eq!(err.to_string(), "Failed to save output image: disk full");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(PipelineError::Rasterization(String::new()).is_client_error());
        assert!(!PipelineError::Save(String::new()).is_client_error());
        assert!(!PipelineError::Matting(MattingError::InvalidInput(String::new()))
            .is_client_error());
    }
}

//! Matting module - opaque background removal
//!
//! "Matting" is the computer-vision term for separating a foreground
//! subject from its background. This module is the seam between the
//! pipeline and the pretrained segmentation model:
//!
//! # Features
//!
//! - **Backend trait** ([`MattingBackend`]) - bytes in, transparent-PNG
//!   bytes out; the pipeline never sees tensors
//! - **ONNX Runtime** ([`OnnxBackend`]) - U²-Net / ISNet saliency models
//! - **Mock** ([`MockBackend`]) - deterministic corner-color keying for
//!   tests and model-less development
//! - **Model discovery** ([`resolve_model_path`]) - flag, `CUTOUT_MODEL`
//!   env var, `./models/`, then the per-user data directory

mod backend;
mod onnx;
mod types;

pub use backend::{
    model_search_paths, resolve_model_path, BackendKind, MattingBackend, MockBackend,
    DEFAULT_MODEL_FILENAME, MODEL_ENV_VAR,
};
pub use onnx::{OnnxBackend, DEFAULT_INPUT_SIZE};
pub use types::{MattingError, ModelSpec, Result};

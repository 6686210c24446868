//! cutout - image background removal service
//!
//! Removes image backgrounds with a pretrained segmentation model and
//! serves the results over HTTP. Uploads go through a fixed sequence:
//! format detection by extension, SVG rasterization, model inference,
//! alpha-mask cleanup (binarize + erode), white-canvas flattening for
//! JPEG targets, and a write into the public output directory under a
//! collision-resistant generated name.
//!
//! # Features
//!
//! - `web` (default): axum HTTP server with `POST /remove-background`,
//!   `GET /health`, `GET /stats` and static serving of processed images.
//!
//! Without `web` the crate still provides the full pipeline and the
//! `remove`/`info` CLI commands.

pub mod cli;
pub mod config;
pub mod matting;
pub mod pipeline;

#[cfg(feature = "web")]
pub mod web;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INPUT_NOT_FOUND: i32 = 2;
    pub const MODEL_ERROR: i32 = 3;
}

// CLI
pub use cli::{Cli, Commands, RemoveArgs};
#[cfg(feature = "web")]
pub use cli::ServeArgs;

// Config
pub use config::{CliOverrides, Config};

// Matting backends
pub use matting::{
    model_search_paths, resolve_model_path, BackendKind, MattingBackend, MattingError,
    MockBackend, ModelSpec, OnnxBackend,
};

// Pipeline
pub use pipeline::{
    AlphaCleanupOptions, ImageProcessor, NamingStrategy, OutputStore, PipelineError,
    ProcessedImage, ProcessorOptions, UploadFormat,
};

// Web server
#[cfg(feature = "web")]
pub use web::{ServerConfig, WebServer};

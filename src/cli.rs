//! Command-line interface definitions
//!
//! Three subcommands: `remove` runs the pipeline once on a local file,
//! `serve` starts the HTTP server (feature `web`), and `info` reports
//! the environment. Flags that mirror config file values are optional;
//! when absent, the file value (or its default) applies.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::matting::BackendKind;
use crate::pipeline::NamingStrategy;

#[derive(Debug, Parser)]
#[command(
    name = "cutout",
    version,
    about = "Remove image backgrounds with a pretrained segmentation model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Remove the background from a local image file
    Remove(RemoveArgs),

    /// Show version, environment and model availability
    Info,

    /// Run the HTTP upload server
    #[cfg(feature = "web")]
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Input image (png, jpg, bmp, tiff, webp or svg)
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model file (.onnx); overrides config and search paths
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Inference backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Output naming strategy
    #[arg(long, value_enum)]
    pub naming: Option<NamingStrategy>,

    /// Alpha binarization threshold (0-255)
    #[arg(long)]
    pub alpha_threshold: Option<u8>,

    /// Skip alpha binarization and erosion entirely
    #[arg(long)]
    pub no_alpha_cleanup: bool,

    /// DPI for SVG rasterization
    #[arg(long)]
    pub svg_dpi: Option<f32>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(feature = "web")]
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Maximum upload size in MB
    #[arg(long)]
    pub upload_limit: Option<u64>,

    /// Output directory for processed images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model file (.onnx); overrides config and search paths
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Inference backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Output naming strategy
    #[arg(long, value_enum)]
    pub naming: Option<NamingStrategy>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

//! Configuration loading and merging
//!
//! Settings come from an optional TOML file with CLI flags layered on
//! top; flags always win. Without an explicit `--config`, the file is
//! searched at `./cutout.toml`, then `<config_dir>/cutout/config.toml`.
//! Every field has a default, so running with no file at all is fine.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[server]`  | Port, bind address, upload size limit            |
//! | `[output]`  | Output directory and naming strategy             |
//! | `[model]`   | Model file path, backend selection, input size   |
//! | `[svg]`     | Rasterization DPI                                |
//! | `[cleanup]` | Alpha binarization threshold and erosion radius  |

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::matting::{BackendKind, DEFAULT_INPUT_SIZE};
use crate::pipeline::{
    AlphaCleanupOptions, NamingStrategy, DEFAULT_ALPHA_THRESHOLD, DEFAULT_EROSION_RADIUS,
    DEFAULT_OUTPUT_DIR, DEFAULT_SVG_DPI,
};

// ============================================================
// Constants
// ============================================================

/// Config filename searched in the working directory
pub const LOCAL_CONFIG_FILE: &str = "cutout.toml";

/// Subdirectory of the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "cutout";

// ============================================================
// Sections
// ============================================================

/// Root configuration, one field per TOML section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub svg: SvgSection,

    #[serde(default)]
    pub cleanup: CleanupSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind")]
    pub bind: String,

    /// Maximum accepted request body size in MiB
    #[serde(default = "default_upload_limit_mb")]
    pub upload_limit_mb: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            upload_limit_mb: default_upload_limit_mb(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub naming: NamingStrategy,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            naming: NamingStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSection {
    /// Explicit model file; falls back to the search paths when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub backend: BackendKind,

    /// Square input side the model expects (320 for U²-Net, 1024 for ISNet)
    #[serde(default = "default_input_size")]
    pub input_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SvgSection {
    /// DPI used to resolve physical units during rasterization
    #[serde(default = "default_svg_dpi")]
    pub dpi: f32,
}

impl Default for SvgSection {
    fn default() -> Self {
        Self {
            dpi: default_svg_dpi(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupSection {
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u8,

    #[serde(default = "default_erosion_radius")]
    pub erosion_radius: u8,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CleanupSection {
    fn default() -> Self {
        Self {
            alpha_threshold: default_alpha_threshold(),
            erosion_radius: default_erosion_radius(),
            enabled: true,
        }
    }
}

impl CleanupSection {
    pub fn to_options(&self) -> AlphaCleanupOptions {
        AlphaCleanupOptions {
            threshold: self.alpha_threshold,
            erosion_radius: self.erosion_radius,
            enabled: self.enabled,
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_upload_limit_mb() -> u64 {
    32
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_input_size() -> u32 {
    DEFAULT_INPUT_SIZE
}

fn default_svg_dpi() -> f32 {
    DEFAULT_SVG_DPI
}

fn default_alpha_threshold() -> u8 {
    DEFAULT_ALPHA_THRESHOLD
}

fn default_erosion_radius() -> u8 {
    DEFAULT_EROSION_RADIUS
}

fn default_true() -> bool {
    true
}

// ============================================================
// Loading and merging
// ============================================================

/// CLI flags that override file values when present.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub upload_limit_mb: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub naming: Option<NamingStrategy>,
    pub model_path: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub svg_dpi: Option<f32>,
    pub alpha_threshold: Option<u8>,
    pub no_alpha_cleanup: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Config {
    /// Load configuration from the first search location that exists.
    /// No file at all is not an error; defaults apply.
    pub fn load() -> Result<Self> {
        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Locations probed by [`Config::load`], in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
        }
        paths
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_str(content: &str) -> Result<Self> {
        let config = toml::from_str(content)?;
        Ok(config)
    }

    /// Layer CLI flags over file values.
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) {
        update_option(&mut self.server.port, cli.port.as_ref());
        update_option(&mut self.server.bind, cli.bind.as_ref());
        update_option(&mut self.server.upload_limit_mb, cli.upload_limit_mb.as_ref());
        update_option(&mut self.output.dir, cli.output_dir.as_ref());
        update_option(&mut self.output.naming, cli.naming.as_ref());
        update_option(&mut self.model.backend, cli.backend.as_ref());
        update_option(&mut self.svg.dpi, cli.svg_dpi.as_ref());
        update_option(&mut self.cleanup.alpha_threshold, cli.alpha_threshold.as_ref());

        if cli.model_path.is_some() {
            self.model.path = cli.model_path.clone();
        }
        if cli.no_alpha_cleanup {
            self.cleanup.enabled = false;
        }
    }
}

/// Overwrite a config value when the CLI supplied one.
fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
    if let Some(value) = cli_option {
        *config_option = value.clone();
    }
}

// ============================================================
// tests
// ============================================================

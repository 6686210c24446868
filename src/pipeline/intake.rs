//! Upload intake - extension dispatch
//!
//! The original filename's extension decides the handling path: SVG is
//! rasterized and always targets PNG; a fixed allow-list of raster formats
//! keeps its extension; everything else defaults to PNG.

use std::path::Path;

use image::ImageFormat;

// ============================================================
// Constants - raster extension allow-list
// ============================================================

/// Extensions that keep their extension through the pipeline. Exact
/// strings: `tif` is intentionally absent, only `tiff` passes.
pub const RASTER_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// Fallback extension for SVG output and unrecognized uploads
pub const DEFAULT_EXTENSION: &str = "png";

/// Handling path for one upload, decided from the filename alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Vector input; rasterized to PNG before the model sees it
    Svg,
    /// Allow-listed raster input; the extension is preserved verbatim
    Raster(&'static str),
    /// Anything else; treated as raster and saved as PNG
    Unknown,
}

impl UploadFormat {
    /// Classify a filename by its lower-cased extension.
    pub fn detect(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if ext == "svg" {
            return UploadFormat::Svg;
        }

        match RASTER_EXTENSIONS.iter().find(|&&known| known == ext) {
            Some(&known) => UploadFormat::Raster(known),
            None => UploadFormat::Unknown,
        }
    }

    /// Extension the output file will carry.
    pub fn target_extension(&self) -> &'static str {
        match self {
            UploadFormat::Raster(ext) => ext,
            UploadFormat::Svg | UploadFormat::Unknown => DEFAULT_EXTENSION,
        }
    }

    /// Encoder used for the output file.
    pub fn target_format(&self) -> TargetFormat {
        TargetFormat::from_extension(self.target_extension())
    }

    /// Whether the bytes must be rasterized before the model call.
    pub fn needs_rasterization(&self) -> bool {
        matches!(self, UploadFormat::Svg)
    }
}

/// Output encoding, derived from the target extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Png,
    Jpeg,
    Bmp,
    Tiff,
    WebP,
}

impl TargetFormat {
    /// Map an allow-listed extension to its encoder. Unknown extensions
    /// fall back to PNG, mirroring [`UploadFormat::detect`].
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "jpg" | "jpeg" => TargetFormat::Jpeg,
            "bmp" => TargetFormat::Bmp,
            "tiff" => TargetFormat::Tiff,
            "webp" => TargetFormat::WebP,
            _ => TargetFormat::Png,
        }
    }

    /// Whether the encoded file can carry an alpha channel. JPEG cannot;
    /// those outputs are flattened onto white first.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, TargetFormat::Jpeg)
    }

    /// The image crate's encoder selector.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            TargetFormat::Png => ImageFormat::Png,
            TargetFormat::Jpeg => ImageFormat::Jpeg,
            TargetFormat::Bmp => ImageFormat::Bmp,
            TargetFormat::Tiff => ImageFormat::Tiff,
            TargetFormat::WebP => ImageFormat::WebP,
        }
    }
}

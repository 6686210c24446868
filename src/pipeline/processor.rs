//! End-to-end processing of a single upload
//!
//! [`ImageProcessor`] ties the stages together: format detection, SVG
//! rasterization, background removal through a [`MattingBackend`],
//! alpha cleanup, white-canvas flattening for formats without
//! transparency, and the final write into the [`OutputStore`].
//!
//! The processor is cheap to share: backends guard their own mutable
//! state, so one instance serves any number of threads.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;

use crate::matting::MattingBackend;

use super::alpha::{clean_alpha, AlphaCleanupOptions};
use super::compose::flatten_onto_white;
use super::intake::{TargetFormat, UploadFormat};
use super::output::{OutputStore, SavedFile};
use super::svg::{rasterize_svg, DEFAULT_SVG_DPI};
use super::types::{PipelineError, Result};

/// Tunables for a processing run.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorOptions {
    /// Resolution used when rasterizing SVG uploads
    pub svg_dpi: f32,
    /// Mask binarization and erosion settings
    pub alpha: AlphaCleanupOptions,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            svg_dpi: DEFAULT_SVG_DPI,
            alpha: AlphaCleanupOptions::default(),
        }
    }
}

impl ProcessorOptions {
    pub fn with_svg_dpi(mut self, dpi: f32) -> Self {
        self.svg_dpi = dpi;
        self
    }

    pub fn with_alpha(mut self, alpha: AlphaCleanupOptions) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Result of a completed run, ready to report back to the caller.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Generated output filename
    pub filename: String,
    /// Where the file was written
    pub path: PathBuf,
    /// URL the file is served under
    pub url: String,
    /// Output dimensions in pixels
    pub width: u32,
    pub height: u32,
}

/// Runs the full background-removal pipeline on uploaded bytes.
pub struct ImageProcessor {
    backend: Arc<dyn MattingBackend>,
    store: OutputStore,
    options: ProcessorOptions,
}

impl ImageProcessor {
    pub fn new(backend: Arc<dyn MattingBackend>, store: OutputStore) -> Self {
        Self {
            backend,
            store,
            options: ProcessorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    /// Backend in use, for status reporting.
    pub fn backend(&self) -> &dyn MattingBackend {
        self.backend.as_ref()
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    /// Process one upload and write the result to the output directory.
    ///
    /// `original_filename` drives both format detection and, under slug
    /// naming, the output name. SVG inputs are rasterized before the
    /// backend runs; everything else is handed over untouched.
    pub fn process(&self, data: &[u8], original_filename: &str) -> Result<ProcessedImage> {
        let upload = UploadFormat::detect(original_filename);

        let input: Cow<'_, [u8]> = if upload.needs_rasterization() {
            Cow::Owned(rasterize_svg(data, self.options.svg_dpi)?)
        } else {
            Cow::Borrowed(data)
        };

        let extension = upload.target_extension();
        let target = upload.target_format();

        let matted = self
            .backend
            .remove(&input)
            .map_err(PipelineError::Matting)?;

        let decoded = image::load_from_memory(&matted).map_err(PipelineError::OutputDecode)?;
        let output = self.finish(decoded, target);

        let (width, height) = (output.width(), output.height());
        let SavedFile { filename, path } =
            self.store
                .save(&output, target, extension, original_filename)?;

        Ok(ProcessedImage {
            url: self.store.public_url(&filename),
            filename,
            path,
            width,
            height,
        })
    }

    /// Clean the mask and reconcile the image with the target format.
    fn finish(&self, decoded: DynamicImage, target: TargetFormat) -> DynamicImage {
        if !decoded.color().has_alpha() {
            // Nothing to clean; formats without alpha can take the RGB as-is
            return if target.supports_alpha() {
                decoded
            } else {
                DynamicImage::ImageRgb8(decoded.to_rgb8())
            };
        }

        let mut rgba = decoded.into_rgba8();
        clean_alpha(&mut rgba, &self.options.alpha);

        let cleaned = DynamicImage::ImageRgba8(rgba);
        if target.supports_alpha() {
            cleaned
        } else {
            DynamicImage::ImageRgb8(flatten_onto_white(&cleaned))
        }
    }
}

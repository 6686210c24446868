//! SVG rasterization
//!
//! Renders SVG uploads to PNG before the model call. Physical units
//! (`in`, `cm`, `mm`, `pt`, `pc`) resolve at the requested DPI, while
//! pixel-sized documents render 1:1. A 1in×1in drawing at DPI 300
//! therefore measures 300×300 px.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use super::types::{PipelineError, Result};

// ============================================================
// Constants
// ============================================================

/// Default rasterization density
pub const DEFAULT_SVG_DPI: f32 = 300.0;

/// Upper bound on either output dimension. Rejecting here keeps a
/// pathological `width="10000in"` document a 400, not an allocation storm.
pub const MAX_RASTER_DIMENSION: u32 = 16_384;

/// Rasterize SVG bytes to PNG at the given DPI.
///
/// Any parse or render problem is a client error: the upload itself was
/// bad, not the service.
pub fn rasterize_svg(data: &[u8], dpi: f32) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.dpi = dpi;
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_data(data, &options)
        .map_err(|e| PipelineError::Rasterization(e.to_string()))?;

    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    if width == 0 || height == 0 {
        return Err(PipelineError::Rasterization(
            "document has zero pixel dimensions".to_string(),
        ));
    }
    if width > MAX_RASTER_DIMENSION || height > MAX_RASTER_DIMENSION {
        return Err(PipelineError::Rasterization(format!(
            "document rasterizes to {}x{}, above the {} px limit",
            width, height, MAX_RASTER_DIMENSION
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        PipelineError::Rasterization(format!("cannot allocate a {}x{} pixmap", width, height))
    })?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    debug!(width, height, dpi, "SVG rasterized");

    encode_pixmap(&pixmap, width, height)
}

/// Demultiply the pixmap and encode it as PNG through the image crate.
fn encode_pixmap(pixmap: &resvg::tiny_skia::Pixmap, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut rgba = RgbaImage::new(width, height);
    for (i, premul) in pixmap.pixels().iter().enumerate() {
        let color = premul.demultiply();
        let x = i as u32 % width;
        let y = i as u32 / width;
        rgba.put_pixel(
            x,
            y,
            Rgba([color.red(), color.green(), color.blue(), color.alpha()]),
        );
    }

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| PipelineError::Rasterization(e.to_string()))?;
    Ok(buf.into_inner())
}

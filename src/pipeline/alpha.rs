//! Alpha channel cleanup
//!
//! Model output tends to leave a semi-transparent "halo" of background
//! pixels around the subject. The cleanup runs in two steps: binarize the
//! alpha plane at a fixed threshold, then erode it with a 3×3 minimum
//! filter so single-pixel fringes disappear. Only the alpha plane changes;
//! RGB samples are never touched.

use image::{GrayImage, Luma, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::erode;

// ============================================================
// Constants
// ============================================================

/// Alpha values above this survive binarization as fully opaque
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 30;

/// Chebyshev radius of the erosion; 1 is a 3×3 minimum-filter window
pub const DEFAULT_EROSION_RADIUS: u8 = 1;

/// Options for alpha cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlphaCleanupOptions {
    /// Binarization threshold: alpha > threshold becomes 255, else 0
    pub threshold: u8,

    /// Erosion radius; 0 disables the minimum filter
    pub erosion_radius: u8,

    /// Skip cleanup entirely (binarization included)
    pub enabled: bool,
}

impl Default for AlphaCleanupOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ALPHA_THRESHOLD,
            erosion_radius: DEFAULT_EROSION_RADIUS,
            enabled: true,
        }
    }
}

impl AlphaCleanupOptions {
    /// Cleanup disabled; the model's alpha passes through untouched.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_erosion_radius(mut self, radius: u8) -> Self {
        self.erosion_radius = radius;
        self
    }
}

/// Binarize and erode the alpha plane of an RGBA image in place.
pub fn clean_alpha(image: &mut RgbaImage, options: &AlphaCleanupOptions) {
    if !options.enabled {
        return;
    }

    let mut plane = extract_alpha(image);

    binarize(&mut plane, options.threshold);
    if options.erosion_radius > 0 {
        // Binary planes make the grayscale minimum filter exact: erosion
        // at LInf distance k is a (2k+1)² window minimum.
        plane = erode(&plane, Norm::LInf, options.erosion_radius);
    }

    apply_alpha(image, &plane);
}

/// Copy the alpha channel out as a grayscale plane.
fn extract_alpha(image: &RgbaImage) -> GrayImage {
    let mut plane = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        plane.put_pixel(x, y, Luma([pixel.0[3]]));
    }
    plane
}

/// Threshold the plane: values above `threshold` become 255, the rest 0.
fn binarize(plane: &mut GrayImage, threshold: u8) {
    for pixel in plane.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold { 255 } else { 0 };
    }
}

/// Write a grayscale plane back as the image's alpha channel.
fn apply_alpha(image: &mut RgbaImage, plane: &GrayImage) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        pixel.0[3] = plane.get_pixel(x, y).0[0];
    }
}

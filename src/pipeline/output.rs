//! Output directory management
//!
//! Processed images land in a single flat directory that is created at
//! startup and never cleaned or rotated; name generation makes
//! collisions improbable, so existing files are never overwritten.
//! The same directory is served verbatim under [`PUBLIC_ROUTE`] by the
//! web server.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use super::intake::TargetFormat;
use super::naming::NamingStrategy;
use super::types::{PipelineError, Result};

// ============================================================
// Constants
// ============================================================

/// Directory processed images are written to, relative to the working
/// directory unless overridden
pub const DEFAULT_OUTPUT_DIR: &str = "processed_images";

/// URL prefix the output directory is served under
pub const PUBLIC_ROUTE: &str = "/processed_images";

/// A freshly written output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Generated filename, including extension
    pub filename: String,
    /// Absolute or working-directory-relative path on disk
    pub path: PathBuf,
}

/// Writes processed images into the output directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
    naming: NamingStrategy,
}

impl Default for OutputStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl OutputStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            naming: NamingStrategy::default(),
        }
    }

    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    /// Directory outputs are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn naming(&self) -> NamingStrategy {
        self.naming
    }

    /// Create the output directory if it does not exist yet.
    ///
    /// Called once at startup; existing contents are left untouched.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            PipelineError::Save(format!("cannot create {}: {}", self.dir.display(), e))
        })
    }

    /// Encode `image` as `format` under a freshly generated name.
    ///
    /// The extension is passed separately from the format so that
    /// spelling variants (`jpg` vs `jpeg`) survive into the filename.
    pub fn save(
        &self,
        image: &DynamicImage,
        format: TargetFormat,
        extension: &str,
        original_filename: &str,
    ) -> Result<SavedFile> {
        let filename = self.naming.generate(original_filename, extension);
        let path = self.dir.join(&filename);

        image
            .save_with_format(&path, format.image_format())
            .map_err(|e| PipelineError::Save(format!("{}: {}", path.display(), e)))?;

        Ok(SavedFile { filename, path })
    }

    /// Public URL for a generated filename.
    pub fn public_url(&self, filename: &str) -> String {
        format!("{}/{}", PUBLIC_ROUTE, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])))
    }

    #[test]
    fn test_save_writes_file_with_random_name() {
        let dir = tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dir().unwrap();

        let saved = store
            .save(&sample_image(), TargetFormat::Png, "png", "photo.png")
            .unwrap();

        assert!(saved.path.is_file());
        assert!(saved.filename.ends_with(".png"));
        let stem = saved.filename.trim_end_matches(".png");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_slug_naming_keeps_original_stem() {
        let dir = tempdir().unwrap();
        let store = OutputStore::new(dir.path()).with_naming(NamingStrategy::SlugSuffix);
        store.ensure_dir().unwrap();

        let saved = store
            .save(&sample_image(), TargetFormat::Png, "png", "My Cat.png")
            .unwrap();

        assert!(saved.filename.starts_with("my_cat_"), "got {}", saved.filename);
        assert!(saved.path.is_file());
    }

    #[test]
    fn test_jpeg_spelling_survives_in_filename() {
        let dir = tempdir().unwrap();
        let store = OutputStore::new(dir.path());
        store.ensure_dir().unwrap();

        let image = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([10, 20, 30]),
        ));
        let saved = store
            .save(&image, TargetFormat::Jpeg, "jpeg", "scan.jpeg")
            .unwrap();

        assert!(saved.filename.ends_with(".jpeg"));
        // Written bytes really are JPEG regardless of spelling
        let bytes = std::fs::read(&saved.path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_ensure_dir_creates_nested_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = OutputStore::new(&nested);

        store.ensure_dir().unwrap();
        assert!(nested.is_dir());
        store.ensure_dir().unwrap();
    }

    #[test]
    fn test_ensure_dir_leaves_existing_files_alone() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("keep.png");
        std::fs::write(&existing, b"sentinel").unwrap();

        OutputStore::new(dir.path()).ensure_dir().unwrap();
        assert_eq!(std::fs::read(&existing).unwrap(), b"sentinel");
    }

    #[test]
    fn test_save_into_missing_dir_is_save_error() {
        let dir = tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("never_created"));

        let err = store
            .save(&sample_image(), TargetFormat::Png, "png", "photo.png")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Save(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_public_url_joins_route_and_name() {
        let store = OutputStore::default();
        assert_eq!(
            store.public_url("abc123.png"),
            "/processed_images/abc123.png"
        );
    }
}

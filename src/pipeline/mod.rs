//! Image processing pipeline
//!
//! Everything between "bytes arrived" and "file on disk":
//!
//! - `intake` - extension-based format detection and target selection
//! - `svg` - SVG rasterization to PNG via resvg
//! - `alpha` - mask binarization and fringe erosion
//! - `compose` - white-canvas flattening for alpha-less targets
//! - `naming` - collision-resistant output filenames
//! - `output` - the write-once output directory
//! - `processor` - the orchestrator running a full upload end to end
//!
//! The web server and the CLI both drive [`ImageProcessor`]; nothing in
//! this module knows about HTTP.

mod alpha;
mod compose;
mod intake;
mod naming;
mod output;
mod processor;
mod svg;
mod types;

pub use alpha::{clean_alpha, AlphaCleanupOptions, DEFAULT_ALPHA_THRESHOLD, DEFAULT_EROSION_RADIUS};
pub use compose::{flatten_onto_white, CANVAS_COLOR};
pub use intake::{TargetFormat, UploadFormat, DEFAULT_EXTENSION, RASTER_EXTENSIONS};
pub use naming::{sanitize_stem, NamingStrategy};
pub use output::{OutputStore, SavedFile, DEFAULT_OUTPUT_DIR, PUBLIC_ROUTE};
pub use processor::{ImageProcessor, ProcessedImage, ProcessorOptions};
pub use svg::{rasterize_svg, DEFAULT_SVG_DPI, MAX_RASTER_DIMENSION};
pub use types::{PipelineError, Result};

//! Output filename generation
//!
//! Two collision-resistant schemes exist, selectable per deployment:
//! a fully random 32-hex name, or a sanitized slug of the original
//! basename with a short random suffix for operators who want outputs
//! traceable to uploads. Neither scheme ever reuses a name in practice,
//! so concurrent uploads of the same file cannot clobber each other.

use std::path::Path;

use serde::Deserialize;
use uuid::Uuid;

// ============================================================
// Constants
// ============================================================

/// Hex characters appended to slug names
pub const SUFFIX_LEN: usize = 8;

/// Longest sanitized stem kept in a slug name
pub const MAX_STEM_LEN: usize = 64;

/// Stem used when sanitization leaves nothing
pub const FALLBACK_STEM: &str = "image";

/// How output filenames are generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// 32 random hex characters; no trace of the original name
    #[default]
    Random,
    /// Sanitized original basename plus an 8-hex suffix
    #[value(name = "slug")]
    #[serde(rename = "slug")]
    SlugSuffix,
}

impl NamingStrategy {
    /// Generate an output filename for an upload.
    pub fn generate(&self, original_filename: &str, extension: &str) -> String {
        match self {
            NamingStrategy::Random => format!("{}.{}", random_hex(32), extension),
            NamingStrategy::SlugSuffix => format!(
                "{}_{}.{}",
                sanitize_stem(original_filename),
                random_hex(SUFFIX_LEN),
                extension
            ),
        }
    }
}

/// Lower-case hex token of the requested length (at most 32).
fn random_hex(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len);
    hex
}

/// Reduce an uploaded filename to a safe slug.
///
/// Directory components are stripped first so traversal attempts like
/// `../../etc/passwd` collapse to their basename. The stem is lower-cased,
/// every non-alphanumeric becomes `_`, and the result is capped at
/// [`MAX_STEM_LEN`] characters.
pub fn sanitize_stem(original_filename: &str) -> String {
    let basename = Path::new(original_filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    let stem = match basename.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => basename,
    };

    let slug: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_STEM_LEN)
        .collect();

    if slug.chars().all(|c| c == '_') {
        FALLBACK_STEM.to_string()
    } else {
        slug
    }
}

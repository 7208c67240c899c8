use image::imageops::{self, FilterType};
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Side length of the grayscale grid an image is reduced to before digesting.
pub const FINGERPRINT_GRID: u32 = 8;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// Lowercase hex digest of an image's reduced grayscale pixels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduces image files to content fingerprints for equality grouping.
pub struct HashService {
    filter: FilterType,
}

impl HashService {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Decode `file_path`, shrink it to an 8x8 grayscale grid and digest the
    /// 64 samples (row-major) with BLAKE3.
    ///
    /// The container format is sniffed from the file content, so the same
    /// pixels stored as PNG or under a misleading extension hash identically.
    pub fn compute_fingerprint(&self, file_path: &Path) -> Result<Fingerprint, HashError> {
        let img = ImageReader::open(file_path)?
            .with_guessed_format()?
            .decode()?;

        let gray = img.to_luma8();
        let reduced = imageops::resize(&gray, FINGERPRINT_GRID, FINGERPRINT_GRID, self.filter);

        Ok(Self::digest(reduced.as_raw()))
    }

    fn digest(samples: &[u8]) -> Fingerprint {
        Fingerprint(blake3::hash(samples).to_hex().to_string())
    }
}

impl Default for HashService {
    fn default() -> Self {
        Self::new()
    }
}

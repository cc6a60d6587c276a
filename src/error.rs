//! Typed error surface of the digitization pipeline.
//!
//! Every fatal condition aborts processing of that single image and maps to
//! exactly one variant here; nothing is retried internally and no variant
//! ever accompanies a partially populated result. Non-fatal degradation is
//! not an error — it travels as [`QualityWarning`](crate::types::QualityWarning)
//! entries in the result metadata.

use std::path::PathBuf;

/// Fatal errors produced while digitizing one image.
#[derive(Debug, thiserror::Error)]
pub enum DigitizeError {
    /// Input bytes are not a decodable raster image.
    #[error("failed to decode input image: {0}")]
    Decode(#[from] image::ImageError),

    /// Reading an input file or config from disk failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Preprocessing could not isolate enough trace or grid pixels.
    #[error("insufficient signal: mask density {density:.6} below minimum {min_density:.6}")]
    InsufficientSignal { density: f32, min_density: f32 },

    /// Grid detection failed validity checks and no fallback calibration is
    /// configured.
    #[error("grid calibration failed: {0}")]
    GridCalibration(String),

    /// Fewer than the required 12 lead regions fit the configured layout.
    #[error("lead segmentation failed: {0}")]
    LeadSegmentation(String),

    /// A parameter set fails its own invariants.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

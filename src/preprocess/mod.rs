//! Image preprocessing: from the raw RGB scan to trace/grid masks.
//!
//! Order of operations: luminance plane → optional separable Gaussian
//! denoise → local-mean reference ([`filters::box_mean`]) → per-pixel color
//! classification → soft binary masks. The input image is never mutated.
//!
//! A degenerate trace mask (density under `min_mask_density`) is a fatal
//! [`DigitizeError::InsufficientSignal`]: downstream stages must not run on
//! an effectively empty mask. A degenerate grid mask is not fatal here —
//! grid detection reports it as an invalid calibration and the orchestrator
//! decides whether a nominal fallback applies.

pub mod color;
pub mod filters;

use crate::error::DigitizeError;
use crate::image::{ImageF32, RgbImageU8};
use crate::types::PreprocessSummary;
use color::{luminance, ColorClass, ColorPolicy};
use log::debug;
use serde::{Deserialize, Serialize};

/// Preprocessing knobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreprocessParams {
    pub color: ColorPolicy,
    /// Apply the 5-tap Gaussian denoise before classification.
    pub denoise: bool,
    /// Radius of the local-mean window, pixels.
    pub adaptive_radius_px: usize,
    /// Minimum trace-mask density below which the image is rejected.
    pub min_mask_density: f32,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            color: ColorPolicy::default(),
            denoise: true,
            adaptive_radius_px: 24,
            min_mask_density: 1e-4,
        }
    }
}

/// Derived images handed to the later stages.
#[derive(Clone, Debug)]
pub struct PreprocessOutput {
    /// Soft binary mask of trace-ink candidates, `[0, 1]`.
    pub trace_mask: ImageF32,
    /// Soft binary mask of grid-line candidates, `[0, 1]`.
    pub grid_mask: ImageF32,
    pub summary: PreprocessSummary,
}

/// Separate trace ink from the printed grid.
pub fn preprocess(
    image: &RgbImageU8,
    params: &PreprocessParams,
) -> Result<PreprocessOutput, DigitizeError> {
    let w = image.width();
    let h = image.height();
    debug!("preprocess start w={} h={} denoise={}", w, h, params.denoise);

    let mut luma = ImageF32::new(w, h);
    for y in 0..h {
        let dst = luma.row_mut(y);
        for (x, out) in dst.iter_mut().enumerate() {
            *out = luminance(image.get(x, y));
        }
    }
    if params.denoise {
        luma = filters::gaussian_blur(&luma);
    }
    let local_mean = filters::box_mean(&luma, params.adaptive_radius_px);

    let mut trace_mask = ImageF32::new(w, h);
    let mut grid_mask = ImageF32::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let cls = params
                .color
                .classify(image.get(x, y), luma.get(x, y), local_mean.get(x, y));
            match cls {
                ColorClass::Trace => trace_mask.set(x, y, 1.0),
                ColorClass::Grid => grid_mask.set(x, y, 1.0),
                ColorClass::Background => {}
            }
        }
    }

    let trace_density = trace_mask.mean();
    let grid_density = grid_mask.mean();
    debug!(
        "preprocess masks trace_density={:.6} grid_density={:.6}",
        trace_density, grid_density
    );
    if trace_density < params.min_mask_density {
        return Err(DigitizeError::InsufficientSignal {
            density: trace_density,
            min_density: params.min_mask_density,
        });
    }

    Ok(PreprocessOutput {
        trace_mask,
        grid_mask,
        summary: PreprocessSummary {
            trace_mask_density: trace_density,
            grid_mask_density: grid_density,
            denoise_applied: params.denoise,
        },
    })
}

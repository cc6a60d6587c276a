//! Calibration-grid detection.
//!
//! Overview
//! - Estimates global skew by scanning for the angle that maximises the
//!   sharpness of the skew-compensated row projection.
//! - Projects the grid mask onto each axis and recovers the modal periodic
//!   peak spacing per axis ([`peaks`]), with a windowed fallback when only
//!   part of the image carries a grid.
//! - Validates the implied pixels-per-millimetre against a plausible range
//!   for printed ECG paper; outside it, the calibration is marked invalid
//!   and the configured nominal value (if any) takes over with reduced
//!   confidence. Fatality of a missing fallback is the orchestrator's
//!   decision, not this module's.
//! - Maps millimetres to physical units through named paper constants
//!   (`paper_speed_mm_per_s`, `gain_mm_per_mv`); one small grid square is
//!   one millimetre.
//!
//! Single-shot: no state is carried across images, every strip calibrates
//! independently.

pub mod peaks;
pub mod profile;
pub mod rotation;

use crate::image::ImageF32;
use crate::types::GridCalibration;
use log::debug;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Grid detection parameters, including the physical paper constants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridParams {
    /// Paper transport speed, millimetres per second (25 on standard strips).
    pub paper_speed_mm_per_s: f32,
    /// Amplitude gain, millimetres per millivolt (10 on standard strips).
    pub gain_mm_per_mv: f32,
    /// Plausible range of detected pixels-per-millimetre for printed grids.
    pub min_px_per_mm: f32,
    pub max_px_per_mm: f32,
    /// Relative tolerance when clustering candidate peak spacings.
    pub spacing_rel_tol: f32,
    /// Maximum ratio between the two axis spacings. Calibration squares
    /// are square; strongly anisotropic estimates are artifacts.
    pub max_axis_ratio: f32,
    /// Minimum projected peak mass for a grid line, as a fraction of the
    /// perpendicular image dimension. Lines run across most of the strip;
    /// stray mask pixels project slivers.
    pub min_line_coverage: f32,
    /// Half-width of the rotation scan, degrees.
    pub rotation_search_deg: f32,
    /// Rotation scan step, degrees.
    pub rotation_step_deg: f32,
    /// Nominal pixels-per-millimetre used when detection is rejected.
    /// `None` means no fallback is available and the orchestrator fails.
    pub nominal_px_per_mm: Option<f32>,
    /// Confidence reported when running on the nominal fallback.
    pub nominal_confidence: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            paper_speed_mm_per_s: 25.0,
            gain_mm_per_mv: 10.0,
            min_px_per_mm: 2.0,
            max_px_per_mm: 60.0,
            spacing_rel_tol: 0.2,
            max_axis_ratio: 1.3,
            min_line_coverage: 0.25,
            rotation_search_deg: 5.0,
            rotation_step_deg: 0.25,
            nominal_px_per_mm: Some(10.0),
            nominal_confidence: 0.2,
        }
    }
}

/// Detect the calibration grid in a grid mask.
///
/// Never fails: an undetectable or implausible grid yields
/// `is_valid = false` with either the nominal fallback scales (when
/// configured) or zeroed scales the orchestrator must not use.
pub fn detect_grid(grid_mask: &ImageF32, params: &GridParams) -> GridCalibration {
    let angle_deg = rotation::estimate_rotation(
        grid_mask,
        params.rotation_search_deg,
        params.rotation_step_deg,
    );

    let col_profile = profile::project_cols(grid_mask, angle_deg);
    let row_profile = profile::project_rows(grid_mask, angle_deg);
    // vertical lines span the height, horizontal lines the width
    let spacing_x = peaks::axis_spacing(
        &col_profile,
        params.spacing_rel_tol,
        params.min_line_coverage * grid_mask.h as f32,
    );
    let spacing_y = peaks::axis_spacing(
        &row_profile,
        params.spacing_rel_tol,
        params.min_line_coverage * grid_mask.w as f32,
    );

    let estimate = match (spacing_x, spacing_y) {
        (Some(sx), Some(sy)) => {
            let plausible = |s: f32| s >= params.min_px_per_mm && s <= params.max_px_per_mm;
            let ratio = sx.spacing_px.max(sy.spacing_px) / sx.spacing_px.min(sy.spacing_px);
            if plausible(sx.spacing_px) && plausible(sy.spacing_px) && ratio <= params.max_axis_ratio
            {
                Some((sx, sy))
            } else {
                debug!(
                    "grid spacing implausible sx={:.2} sy={:.2} ratio={:.2} (allowed {}..{})",
                    sx.spacing_px, sy.spacing_px, ratio, params.min_px_per_mm, params.max_px_per_mm
                );
                None
            }
        }
        _ => {
            debug!("grid spacing not found on at least one axis");
            None
        }
    };

    match estimate {
        Some((sx, sy)) => {
            let confidence = (sx.support_ratio() * sy.support_ratio())
                .sqrt()
                .clamp(0.0, 1.0);
            let origin = unshear_origin(grid_mask, sx.first_peak, sy.first_peak, angle_deg);
            debug!(
                "grid detected px/mm=({:.2}, {:.2}) rotation={:.2}deg confidence={:.3}",
                sx.spacing_px, sy.spacing_px, angle_deg, confidence
            );
            GridCalibration {
                pixels_per_second: sx.spacing_px * params.paper_speed_mm_per_s,
                pixels_per_millivolt: sy.spacing_px * params.gain_mm_per_mv,
                origin,
                rotation_angle_deg: angle_deg,
                confidence,
                is_valid: true,
            }
        }
        None => nominal_calibration(params, angle_deg),
    }
}

/// Calibration used when detection is rejected. With no nominal value the
/// scales are zero and `is_valid = false` signals the orchestrator to fail.
pub fn nominal_calibration(params: &GridParams, angle_deg: f32) -> GridCalibration {
    let px_per_mm = params.nominal_px_per_mm.unwrap_or(0.0);
    GridCalibration {
        pixels_per_second: px_per_mm * params.paper_speed_mm_per_s,
        pixels_per_millivolt: px_per_mm * params.gain_mm_per_mv,
        origin: (0.0, 0.0),
        rotation_angle_deg: angle_deg,
        confidence: if params.nominal_px_per_mm.is_some() {
            params.nominal_confidence
        } else {
            0.0
        },
        is_valid: false,
    }
}

/// Map the first-peak intersection from the shear-compensated frame back to
/// image coordinates by inverting the projection shear: column bins shift by
/// `+tan * (y - cy)`, row bins by `-tan * (x - cx)`.
fn unshear_origin(mask: &ImageF32, x_sheared: f32, y_sheared: f32, angle_deg: f32) -> (f32, f32) {
    let tan = angle_deg.to_radians().tan();
    let cx = 0.5 * (mask.w as f32 - 1.0);
    let cy = 0.5 * (mask.h as f32 - 1.0);
    let shear = Matrix2::new(1.0, tan, -tan, 1.0);
    let sheared = Vector2::new(x_sheared - cx, y_sheared - cy);
    let p = shear
        .try_inverse()
        .map(|inv| inv * sheared)
        .unwrap_or(sheared);
    (cx + p.x, cy + p.y)
}

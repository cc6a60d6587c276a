//! Global skew estimation from the grid mask.
//!
//! Scans a small angle range, scoring how sharply the horizontal grid
//! lines concentrate in the skew-compensated row projection, then refines
//! the best sample with a parabolic fit over its neighbours. The scan is
//! exhaustive and orderless ties keep the first (smallest) angle, so the
//! result is deterministic.

use super::profile::{profile_sharpness, project_rows};
use crate::image::ImageF32;
use log::debug;

/// Estimated skew in degrees, positive = clockwise.
pub fn estimate_rotation(mask: &ImageF32, search_deg: f32, step_deg: f32) -> f32 {
    if search_deg <= 0.0 || step_deg <= 0.0 {
        return 0.0;
    }
    let steps = (2.0 * search_deg / step_deg).round() as i32;
    let mut scores = Vec::with_capacity(steps as usize + 1);
    let mut best_idx = 0usize;
    let mut best_score = f64::MIN;
    for i in 0..=steps {
        let angle = -search_deg + i as f32 * step_deg;
        let score = profile_sharpness(&project_rows(mask, angle));
        if score > best_score {
            best_score = score;
            best_idx = scores.len();
        }
        scores.push((angle, score));
    }

    // a flat (e.g. empty) mask scores zero everywhere; report no skew
    if best_score <= 0.0 {
        return 0.0;
    }

    let (best_angle, _) = scores[best_idx];
    let refined = if best_idx > 0 && best_idx + 1 < scores.len() {
        parabolic_refine(
            scores[best_idx - 1],
            scores[best_idx],
            scores[best_idx + 1],
        )
    } else {
        best_angle
    };
    debug!(
        "rotation scan best={:.3}deg refined={:.3}deg score={:.1}",
        best_angle, refined, best_score
    );
    refined
}

/// Vertex of the parabola through three (angle, score) samples; falls back
/// to the centre sample when the fit degenerates.
fn parabolic_refine(left: (f32, f64), centre: (f32, f64), right: (f32, f64)) -> f32 {
    let denom = left.1 - 2.0 * centre.1 + right.1;
    if denom.abs() < 1e-12 {
        return centre.0;
    }
    let offset = 0.5 * (left.1 - right.1) / denom;
    let step = centre.0 - left.0;
    centre.0 + (offset as f32) * step
}

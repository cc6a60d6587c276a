//! Pixel color classification policy.
//!
//! ECG paper prints two distinguishable colors: dark ink for the trace and
//! a lighter (typically reddish) hue for the calibration grid. The policy
//! maps each pixel to {Trace, Grid, Background} relative to the local
//! illumination level, and is plain data so it can be swapped per dataset
//! without touching pipeline structure.

use serde::{Deserialize, Serialize};

/// Classification of one pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorClass {
    Trace,
    Grid,
    Background,
}

/// Thresholds of the default luminance + red-dominance rule.
///
/// All luminance comparisons are relative to the local mean, so scan
/// brightness drifting across the strip does not shift the decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColorPolicy {
    /// Pixel is trace ink when its luminance is below
    /// `trace_dark_factor * local_mean`.
    pub trace_dark_factor: f32,
    /// Pixel is a grid line when below `grid_dark_factor * local_mean`
    /// (and not already trace), or when red-dominant.
    pub grid_dark_factor: f32,
    /// Minimum normalised `r - max(g, b)` excess for the red-dominance rule.
    pub red_dominance: f32,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        Self {
            trace_dark_factor: 0.55,
            grid_dark_factor: 0.88,
            red_dominance: 0.08,
        }
    }
}

impl ColorPolicy {
    /// Classify one pixel given its RGB triple and the local mean luminance
    /// (both normalised to `[0, 1]`).
    pub fn classify(&self, rgb: [u8; 3], luma: f32, local_mean: f32) -> ColorClass {
        let reference = local_mean.max(1e-3);
        if luma < self.trace_dark_factor * reference {
            return ColorClass::Trace;
        }
        let r = rgb[0] as f32 / 255.0;
        let g = rgb[1] as f32 / 255.0;
        let b = rgb[2] as f32 / 255.0;
        let red_excess = r - g.max(b);
        if red_excess > self.red_dominance || luma < self.grid_dark_factor * reference {
            return ColorClass::Grid;
        }
        ColorClass::Background
    }
}

/// Rec. 601 luminance of an RGB triple, normalised to `[0, 1]`.
#[inline]
pub fn luminance(rgb: [u8; 3]) -> f32 {
    (0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32) / 255.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_ink_is_trace() {
        let policy = ColorPolicy::default();
        let px = [20u8, 20, 20];
        let cls = policy.classify(px, luminance(px), 0.9);
        assert_eq!(cls, ColorClass::Trace);
    }

    #[test]
    fn reddish_line_is_grid() {
        let policy = ColorPolicy::default();
        let px = [230u8, 150, 150];
        let cls = policy.classify(px, luminance(px), 0.9);
        assert_eq!(cls, ColorClass::Grid);
    }

    #[test]
    fn white_paper_is_background() {
        let policy = ColorPolicy::default();
        let px = [245u8, 245, 245];
        let cls = policy.classify(px, luminance(px), 0.92);
        assert_eq!(cls, ColorClass::Background);
    }

    #[test]
    fn threshold_tracks_local_illumination() {
        let policy = ColorPolicy::default();
        // mid-grey pixel: trace under bright local illumination, background
        // in an equally dim neighbourhood
        let px = [115u8, 115, 115];
        let luma = luminance(px);
        assert_eq!(policy.classify(px, luma, 0.95), ColorClass::Trace);
        assert_eq!(policy.classify(px, luma, luma), ColorClass::Background);
    }
}

//! Waveform reconstruction: pixel trace → calibrated uniform samples.
//!
//! Steps, in order: linear interpolation across gap columns (edge gaps
//! clamp to the nearest recovered value), a 1-D Gaussian low-pass matched
//! to the resampling ratio to suppress pixel-column quantisation aliasing,
//! baseline estimation (median recovered row of the lead), conversion to
//! millivolts via `(baseline - row) / pixels_per_millivolt`, and uniform
//! resampling at the target rate by linear interpolation in pixel space.
//!
//! Output length is `floor(region_width / pixels_per_second * rate)`,
//! a function of region width and calibration, never a fixed constant.

use crate::preprocess::filters::gaussian_taps;
use crate::types::{GridCalibration, PixelTrace, Waveform};
use serde::{Deserialize, Serialize};

/// Reconstruction parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconstructParams {
    /// Target uniform sample rate (clinical convention: 500 Hz).
    pub sample_rate_hz: f32,
    /// Scale factor applied to the anti-aliasing Gaussian sigma
    /// (`sigma = smoothing_factor * pixels_per_sample`). Zero disables
    /// smoothing entirely.
    pub smoothing_factor: f32,
}

impl Default for ReconstructParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 500.0,
            smoothing_factor: 0.5,
        }
    }
}

/// Convert one pixel trace into a calibrated waveform.
///
/// `calibration` must carry strictly positive scales (guaranteed by the
/// orchestrator before this stage runs). `smooth = false` skips the
/// anti-aliasing pass (the fast strategy).
pub fn reconstruct(
    trace: &PixelTrace,
    calibration: &GridCalibration,
    params: &ReconstructParams,
    smooth: bool,
) -> Waveform {
    let filled = fill_gaps(&trace.rows);
    let rows = if smooth && params.smoothing_factor > 0.0 {
        let px_per_sample = calibration.pixels_per_second / params.sample_rate_hz;
        smooth_rows(&filled, params.smoothing_factor * px_per_sample)
    } else {
        filled
    };

    let baseline = median(&rows).unwrap_or(0.0);
    let amplitudes: Vec<f32> = rows
        .iter()
        .map(|&row| (baseline - row) / calibration.pixels_per_millivolt)
        .collect();

    let width_px = trace.rows.len() as f32;
    let duration_s = width_px / calibration.pixels_per_second;
    let n_samples = ((duration_s * params.sample_rate_hz).floor() as usize).max(1);

    let samples: Vec<f32> = (0..n_samples)
        .map(|i| {
            let x = i as f32 / params.sample_rate_hz * calibration.pixels_per_second;
            sample_linear(&amplitudes, x)
        })
        .collect();

    Waveform {
        lead: trace.lead,
        samples,
        sample_rate_hz: params.sample_rate_hz,
    }
}

/// Linear interpolation across `None` runs; edge gaps clamp to the nearest
/// known value. An all-gap trace collapses to zeros (flagged upstream via
/// its gap ratio, never fabricated as signal).
fn fill_gaps(rows: &[Option<f32>]) -> Vec<f32> {
    let mut filled = vec![0.0f32; rows.len()];
    let known: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.map(|_| i))
        .collect();
    if known.is_empty() {
        return filled;
    }

    for (i, slot) in filled.iter_mut().enumerate() {
        if let Some(v) = rows[i] {
            *slot = v;
            continue;
        }
        // nearest known neighbours on each side
        let right = known.partition_point(|&k| k < i);
        let left = right.checked_sub(1).map(|j| known[j]);
        let right = known.get(right).copied();
        *slot = match (left, right) {
            (Some(l), Some(r)) => {
                let t = (i - l) as f32 / (r - l) as f32;
                let vl = rows[l].unwrap_or(0.0);
                let vr = rows[r].unwrap_or(0.0);
                vl + t * (vr - vl)
            }
            (Some(l), None) => rows[l].unwrap_or(0.0),
            (None, Some(r)) => rows[r].unwrap_or(0.0),
            (None, None) => 0.0,
        };
    }
    filled
}

fn smooth_rows(rows: &[f32], sigma: f32) -> Vec<f32> {
    let taps = gaussian_taps(sigma);
    if taps.len() <= 1 || rows.is_empty() {
        return rows.to_vec();
    }
    let radius = (taps.len() / 2) as isize;
    let max = rows.len() as isize - 1;
    (0..rows.len() as isize)
        .map(|i| {
            taps.iter()
                .enumerate()
                .map(|(k, &tap)| tap * rows[(i + k as isize - radius).clamp(0, max) as usize])
                .sum()
        })
        .collect()
}

fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        0.5 * (sorted[mid - 1] + sorted[mid])
    })
}

/// Linear sample of a pixel-indexed series at fractional position `x`.
fn sample_linear(series: &[f32], x: f32) -> f32 {
    if series.is_empty() {
        return 0.0;
    }
    let max = (series.len() - 1) as f32;
    let xc = x.clamp(0.0, max);
    let i0 = xc.floor() as usize;
    let i1 = (i0 + 1).min(series.len() - 1);
    let t = xc - i0 as f32;
    series[i0] + t * (series[i1] - series[i0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeadName;

    fn calibration(pps: f32, ppmv: f32) -> GridCalibration {
        GridCalibration {
            pixels_per_second: pps,
            pixels_per_millivolt: ppmv,
            origin: (0.0, 0.0),
            rotation_angle_deg: 0.0,
            confidence: 1.0,
            is_valid: true,
        }
    }

    #[test]
    fn gap_fill_interpolates_linearly() {
        let rows = vec![Some(10.0), None, None, Some(16.0)];
        let filled = fill_gaps(&rows);
        assert!((filled[1] - 12.0).abs() < 1e-5);
        assert!((filled[2] - 14.0).abs() < 1e-5);
    }

    #[test]
    fn edge_gaps_clamp_to_nearest_value() {
        let rows = vec![None, None, Some(5.0), Some(7.0), None];
        let filled = fill_gaps(&rows);
        assert_eq!(filled[0], 5.0);
        assert_eq!(filled[1], 5.0);
        assert_eq!(filled[4], 7.0);
    }

    #[test]
    fn flat_trace_reconstructs_to_zero_millivolts() {
        let trace = PixelTrace {
            lead: LeadName::II,
            x0: 0,
            rows: vec![Some(40.0); 250],
        };
        let wf = reconstruct(&trace, &calibration(250.0, 100.0), &ReconstructParams::default(), true);
        // 250 px at 250 px/s -> 1 s -> 500 samples
        assert_eq!(wf.samples.len(), 500);
        assert!(wf.samples.iter().all(|&s| s.abs() < 1e-5));
    }

    #[test]
    fn sample_count_follows_width_and_calibration() {
        let trace = PixelTrace {
            lead: LeadName::I,
            x0: 0,
            rows: vec![Some(10.0); 100],
        };
        let wf = reconstruct(&trace, &calibration(200.0, 80.0), &ReconstructParams::default(), true);
        // 100 px / 200 px/s = 0.5 s -> 250 samples
        assert_eq!(wf.samples.len(), 250);
        assert!(wf.sample_rate_hz > 0.0);
    }

    #[test]
    fn amplitude_sign_and_scale() {
        // rows 10 px above the 50 px baseline, 100 px/mV -> +0.1 mV;
        // baseline-majority trace keeps the median at the baseline
        let mut rows = vec![Some(50.0); 80];
        for r in rows.iter_mut().take(40).skip(20) {
            *r = Some(40.0);
        }
        let trace = PixelTrace {
            lead: LeadName::V3,
            x0: 0,
            rows,
        };
        let wf = reconstruct(&trace, &calibration(80.0, 100.0), &ReconstructParams::default(), false);
        // 80 px at 80 px/s -> 500 samples; sample 187 sits at x ≈ 29.9 px,
        // inside the deflection
        assert_eq!(wf.samples.len(), 500);
        let inside = wf.samples[187];
        assert!((inside - 0.1).abs() < 1e-4, "deflection sample {inside}");
        assert!(wf.samples[0].abs() < 1e-4);
        assert!(wf.samples[450].abs() < 1e-4);
    }
}

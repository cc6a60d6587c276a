//! SNR-style quality scoring.
//!
//! Two uses share one formula: (a) comparing candidate preprocessing or
//! extraction outputs against a reference image and keeping the best, and
//! (b) post-hoc flagging of a digitized waveform set. "Noise" is always a
//! variance of a difference; `snr_db` is capped at [`SNR_CAP_DB`] when the
//! noise power is numerically negligible and clamped into `[0, 60]` so
//! consumers never see unbounded, negative-infinite or NaN scores.

use crate::image::ImageF32;
use crate::preprocess::filters::gaussian_taps;
use crate::types::{LeadName, QualityReport, Waveform};
use rayon::prelude::*;
use serde::Serialize;

/// Reporting ceiling; also the cap for the near-zero-noise case.
pub const SNR_CAP_DB: f32 = 60.0;

/// Noise power below this is treated as zero.
const NOISE_EPS: f64 = 1e-12;

/// Outcome of one SNR comparison.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct SnrScore {
    /// Clamped decibel score in `[0, 60]`.
    pub snr_db: f32,
    pub snr_linear: f32,
    pub signal_power: f32,
    pub noise_power: f32,
}

fn score_from_powers(signal_power: f64, noise_power: f64) -> SnrScore {
    if noise_power < NOISE_EPS {
        return SnrScore {
            snr_db: SNR_CAP_DB,
            snr_linear: 10f32.powf(SNR_CAP_DB / 10.0),
            signal_power: signal_power as f32,
            noise_power: noise_power as f32,
        };
    }
    let linear = signal_power / noise_power;
    let db = (10.0 * linear.log10()).clamp(0.0, SNR_CAP_DB as f64);
    SnrScore {
        snr_db: db as f32,
        snr_linear: linear as f32,
        signal_power: signal_power as f32,
        noise_power: noise_power as f32,
    }
}

/// SNR of a candidate image against a reference treated as ground truth.
///
/// The candidate is resampled (bilinear) to the reference's shape when the
/// dimensions differ. Signal power is the variance of the reference, noise
/// power the variance of the element-wise difference.
pub fn snr(reference: &ImageF32, candidate: &ImageF32) -> SnrScore {
    let n = (reference.w * reference.h) as f64;
    if n == 0.0 {
        return score_from_powers(0.0, 0.0);
    }
    let sx = (candidate.w.max(1) - 1) as f32 / (reference.w.max(2) - 1) as f32;
    let sy = (candidate.h.max(1) - 1) as f32 / (reference.h.max(2) - 1) as f32;
    let same_dims = reference.w == candidate.w && reference.h == candidate.h;

    let mut diff_sum = 0.0f64;
    let mut diff_sq = 0.0f64;
    for y in 0..reference.h {
        let ref_row = reference.row(y);
        for (x, &r) in ref_row.iter().enumerate() {
            let c = if same_dims {
                candidate.get(x, y)
            } else {
                candidate.sample_bilinear(x as f32 * sx, y as f32 * sy)
            };
            let d = (c - r) as f64;
            diff_sum += d;
            diff_sq += d * d;
        }
    }
    let noise_power = (diff_sq / n - (diff_sum / n).powi(2)).max(0.0);
    score_from_powers(reference.variance() as f64, noise_power)
}

/// Score several candidates against one reference in parallel and pick the
/// winner by highest `snr_db`; the earliest index wins ties, so the
/// selection is deterministic.
pub fn select_best(reference: &ImageF32, candidates: &[ImageF32]) -> Option<(usize, SnrScore)> {
    let scores: Vec<SnrScore> = candidates
        .par_iter()
        .map(|candidate| snr(reference, candidate))
        .collect();
    scores
        .into_iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| {
            a.snr_db
                .partial_cmp(&b.snr_db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(ib.cmp(ia))
        })
}

/// Reference-free SNR of one waveform, used for post-hoc lead flagging.
///
/// A smoothed copy stands in for the underlying signal; the residual is
/// treated as extraction noise. Same cap and clamp rules as image scoring.
pub fn waveform_snr_db(waveform: &Waveform) -> f32 {
    let samples = &waveform.samples;
    if samples.len() < 3 {
        return 0.0;
    }
    // sigma of ~2 samples separates trend from pixel-quantisation jitter
    let taps = gaussian_taps(2.0);
    let radius = (taps.len() / 2) as isize;
    let max = samples.len() as isize - 1;
    let smoothed: Vec<f32> = (0..samples.len() as isize)
        .map(|i| {
            taps.iter()
                .enumerate()
                .map(|(k, &tap)| tap * samples[(i + k as isize - radius).clamp(0, max) as usize])
                .sum()
        })
        .collect();

    let n = samples.len() as f64;
    let mean_s: f64 = smoothed.iter().map(|&v| v as f64).sum::<f64>() / n;
    let signal_power: f64 = smoothed
        .iter()
        .map(|&v| {
            let d = v as f64 - mean_s;
            d * d
        })
        .sum::<f64>()
        / n;
    let residual: Vec<f64> = samples
        .iter()
        .zip(&smoothed)
        .map(|(&s, &m)| (s - m) as f64)
        .collect();
    let mean_r: f64 = residual.iter().sum::<f64>() / n;
    let noise_power: f64 = residual.iter().map(|&d| (d - mean_r) * (d - mean_r)).sum::<f64>() / n;
    score_from_powers(signal_power, noise_power).snr_db
}

/// Aggregate the per-lead scores of a digitized set.
pub fn report_for(waveforms: &[Waveform]) -> QualityReport {
    let per_lead: Vec<(LeadName, f32)> = waveforms
        .iter()
        .map(|wf| (wf.lead, waveform_snr_db(wf)))
        .collect();
    let mean = if per_lead.is_empty() {
        0.0
    } else {
        per_lead.iter().map(|(_, s)| s).sum::<f32>() / per_lead.len() as f32
    };
    let min = per_lead
        .iter()
        .map(|&(_, s)| s)
        .fold(f32::INFINITY, f32::min);
    QualityReport {
        per_lead_snr_db: per_lead,
        mean_snr_db: mean,
        min_snr_db: if min.is_finite() { min } else { 0.0 },
    }
}

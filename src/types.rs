//! Core data model shared across the pipeline stages.

use serde::{Deserialize, Serialize};

/// One of the twelve standard ECG measurement channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadName {
    I,
    II,
    III,
    #[serde(rename = "aVR")]
    AVR,
    #[serde(rename = "aVL")]
    AVL,
    #[serde(rename = "aVF")]
    AVF,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl LeadName {
    /// The twelve standard leads in canonical reporting order.
    pub const STANDARD_12: [LeadName; 12] = [
        LeadName::I,
        LeadName::II,
        LeadName::III,
        LeadName::AVR,
        LeadName::AVL,
        LeadName::AVF,
        LeadName::V1,
        LeadName::V2,
        LeadName::V3,
        LeadName::V4,
        LeadName::V5,
        LeadName::V6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadName::I => "I",
            LeadName::II => "II",
            LeadName::III => "III",
            LeadName::AVR => "aVR",
            LeadName::AVL => "aVL",
            LeadName::AVF => "aVF",
            LeadName::V1 => "V1",
            LeadName::V2 => "V2",
            LeadName::V3 => "V3",
            LeadName::V4 => "V4",
            LeadName::V5 => "V5",
            LeadName::V6 => "V6",
        }
    }
}

/// Mapping from pixel distances to physical time/amplitude units, derived
/// from the printed reference grid.
///
/// Invariant: both scale factors are strictly positive when `is_valid` is
/// true, and `confidence` lies in `[0, 1]`.
#[derive(Clone, Debug, Serialize)]
pub struct GridCalibration {
    /// Horizontal scale: pixels per second of recorded time.
    pub pixels_per_second: f32,
    /// Vertical scale: pixels per millivolt of amplitude.
    pub pixels_per_millivolt: f32,
    /// Detected grid origin (first line intersection) in image coordinates.
    pub origin: (f32, f32),
    /// Global skew of the printed grid, degrees, positive = clockwise.
    pub rotation_angle_deg: f32,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f32,
    /// False when detection fell back to nominal values.
    pub is_valid: bool,
}

/// Layout-derived bounding box of one lead on the printout.
///
/// Depends only on image dimensions and the assumed print layout, never on
/// pixel content. Half-open in both axes: `x0..x1`, `y0..y1`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LeadRegion {
    pub lead: LeadName,
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl LeadRegion {
    #[inline]
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }
}

/// Pixel-space trace of one lead: one recovered row position per pixel
/// column of its region, `None` where no trace pixel was found (gap).
#[derive(Clone, Debug, Serialize)]
pub struct PixelTrace {
    pub lead: LeadName,
    /// Image x coordinate of the first entry in `rows`.
    pub x0: usize,
    /// Recovered row position per column, image coordinates, skew-compensated.
    pub rows: Vec<Option<f32>>,
}

impl PixelTrace {
    /// Fraction of columns with no recovered trace pixel.
    pub fn gap_ratio(&self) -> f32 {
        if self.rows.is_empty() {
            return 1.0;
        }
        let gaps = self.rows.iter().filter(|r| r.is_none()).count();
        gaps as f32 / self.rows.len() as f32
    }

    /// Length in columns of the longest contiguous gap.
    pub fn longest_gap_px(&self) -> usize {
        let mut longest = 0usize;
        let mut run = 0usize;
        for row in &self.rows {
            if row.is_none() {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        longest
    }
}

/// Calibrated, uniformly time-sampled signal of one lead, in millivolts.
#[derive(Clone, Debug, Serialize)]
pub struct Waveform {
    pub lead: LeadName,
    pub samples: Vec<f32>,
    pub sample_rate_hz: f32,
}

/// Per-lead and aggregate SNR annotation attached to a digitization result.
#[derive(Clone, Debug, Serialize)]
pub struct QualityReport {
    /// Per-lead SNR in dB, canonical lead order.
    pub per_lead_snr_db: Vec<(LeadName, f32)>,
    pub mean_snr_db: f32,
    pub min_snr_db: f32,
}

/// Non-fatal degradation recorded in result metadata, never raised.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum QualityWarning {
    /// Grid detection fell back to the configured nominal calibration.
    NominalCalibration,
    /// One lead lost too much trace to gaps: its interpolated-gap ratio
    /// exceeded the threshold, or a single contiguous gap grew wider than
    /// the configured maximum.
    ExcessiveGaps {
        lead: LeadName,
        gap_ratio: f32,
        longest_gap_px: usize,
    },
    /// Computed SNR of one lead is below the usability floor.
    LowSnr { lead: LeadName, snr_db: f32 },
}

/// Extraction strategy knob exposed by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStrategy {
    /// Full per-column centroid extraction with pre-smoothing.
    Segmented,
    /// Faster approximation: stride-2 column sampling, no pre-smoothing.
    Fast,
}

/// Summary of the preprocessing choices that produced a result.
#[derive(Clone, Debug, Serialize)]
pub struct PreprocessSummary {
    pub trace_mask_density: f32,
    pub grid_mask_density: f32,
    pub denoise_applied: bool,
}

/// Free-form metadata packaged with every result.
#[derive(Clone, Debug, Serialize)]
pub struct DigitizationMetadata {
    pub calibration: GridCalibration,
    pub strategy: ExtractionStrategy,
    /// True when the calibration in use is the nominal fallback.
    pub nominal_fallback: bool,
    pub warnings: Vec<QualityWarning>,
    pub preprocess: PreprocessSummary,
}

/// Top-level output of one digitized image: exactly twelve calibrated
/// waveforms in canonical lead order, plus quality and metadata.
///
/// Immutable after construction; the pipeline never returns a partially
/// populated instance.
#[derive(Clone, Debug, Serialize)]
pub struct DigitizationResult {
    pub leads: Vec<Waveform>,
    pub quality: QualityReport,
    pub metadata: DigitizationMetadata,
}

//! Read-only diagnostics for the external visualizer.
//!
//! The visualizer renders the calibration, the pre-conversion pixel traces
//! and the final waveforms as overlay images; nothing here feeds back into
//! the pipeline.

use crate::types::{DigitizationResult, GridCalibration, LeadRegion, PixelTrace};
use serde::Serialize;

/// Result of [`EcgDigitizer::process_bytes`](crate::EcgDigitizer), pairing
/// the digitized output with an optional execution trace.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitizationReport {
    pub result: DigitizationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<DigitizationTrace>,
}

/// End-to-end trace describing one digitization run.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitizationTrace {
    pub input: InputDescriptor,
    pub timings: StageTimings,
    pub calibration: GridCalibration,
    pub regions: Vec<LeadRegion>,
    /// Per-lead traces in canonical order, pre-conversion.
    pub pixel_traces: Vec<PixelTrace>,
    /// Rhythm-strip trace when the layout has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhythm_trace: Option<PixelTrace>,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
}

/// Wall-clock stage timings, milliseconds.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTimings {
    pub preprocess_ms: f64,
    pub grid_ms: f64,
    pub extract_ms: f64,
    pub reconstruct_ms: f64,
    pub quality_ms: f64,
    pub total_ms: f64,
}

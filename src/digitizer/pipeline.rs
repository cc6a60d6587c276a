//! Orchestrator driving the digitization end-to-end.
//!
//! The [`EcgDigitizer`] exposes a pure API: image bytes (or a path) in,
//! [`DigitizationReport`] out. Internally it runs the strictly linear
//! sequence preprocess → grid detection → segmentation → per-lead
//! extraction → reconstruction → quality scoring → assembly. Processing
//! borrows `&self` only; concurrent invocations share nothing mutable, so
//! callers may fan out across threads freely, and identical bytes with
//! identical parameters always produce identical output.
//!
//! Typical usage:
//! ```no_run
//! use ecg_digitizer::{DigitizerParams, EcgDigitizer};
//!
//! # fn example(bytes: &[u8]) -> Result<(), ecg_digitizer::DigitizeError> {
//! let digitizer = EcgDigitizer::new(DigitizerParams::default());
//! let report = digitizer.process_bytes(bytes)?;
//! println!("mean SNR {:.1} dB", report.result.quality.mean_snr_db);
//! # Ok(())
//! # }
//! ```

use super::params::DigitizerParams;
use crate::diagnostics::{DigitizationReport, DigitizationTrace, InputDescriptor, StageTimings};
use crate::error::DigitizeError;
use crate::extract::extract_trace;
use crate::grid;
use crate::image::{self, RgbImageU8};
use crate::preprocess;
use crate::quality;
use crate::reconstruct::reconstruct;
use crate::types::{
    DigitizationMetadata, DigitizationResult, ExtractionStrategy, PixelTrace, QualityWarning,
    Waveform,
};
use log::debug;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Digitizer orchestrating preprocessing, grid calibration, lead
/// segmentation, trace extraction, reconstruction and quality scoring.
pub struct EcgDigitizer {
    params: DigitizerParams,
}

impl EcgDigitizer {
    /// Create a digitizer with the supplied parameters.
    pub fn new(params: DigitizerParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DigitizerParams {
        &self.params
    }

    /// Digitize an image file.
    pub fn process_path(&self, path: &Path) -> Result<DigitizationReport, DigitizeError> {
        let image = image::io::load_image(path)?;
        self.process_image(&image)
    }

    /// Digitize in-memory image bytes.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<DigitizationReport, DigitizeError> {
        let image = image::io::decode_bytes(bytes)?;
        self.process_image(&image)
    }

    /// Digitize an already decoded image.
    pub fn process_image(&self, image: &RgbImageU8) -> Result<DigitizationReport, DigitizeError> {
        self.params.validate()?;
        let total_start = Instant::now();
        let (width, height) = (image.width(), image.height());
        debug!("digitizer start w={} h={} strategy={:?}", width, height, self.params.strategy);

        let mut timings = StageTimings::default();
        let mut warnings: Vec<QualityWarning> = Vec::new();

        let stage = Instant::now();
        let pre = preprocess::preprocess(image, &self.params.preprocess)?;
        timings.preprocess_ms = stage.elapsed().as_secs_f64() * 1000.0;

        let stage = Instant::now();
        let calibration = grid::detect_grid(&pre.grid_mask, &self.params.grid);
        timings.grid_ms = stage.elapsed().as_secs_f64() * 1000.0;
        if !calibration.is_valid {
            if self.params.grid.nominal_px_per_mm.is_none() {
                return Err(DigitizeError::GridCalibration(
                    "grid detection failed validity checks and no nominal fallback is configured"
                        .into(),
                ));
            }
            debug!(
                "grid invalid, continuing on nominal fallback confidence={:.3}",
                calibration.confidence
            );
            warnings.push(QualityWarning::NominalCalibration);
        }

        let regions = self.params.layout.regions(width, height)?;

        let stage = Instant::now();
        let smooth = self.params.strategy == ExtractionStrategy::Segmented;
        let traces: Vec<PixelTrace> = regions
            .par_iter()
            .map(|region| {
                extract_trace(
                    &pre.trace_mask,
                    region,
                    calibration.rotation_angle_deg,
                    self.params.strategy,
                )
            })
            .collect();
        timings.extract_ms = stage.elapsed().as_secs_f64() * 1000.0;

        let px_per_mm = calibration.pixels_per_second / self.params.grid.paper_speed_mm_per_s;
        let max_gap_px = self.params.max_gap_mm * px_per_mm;
        for trace in &traces {
            let gap_ratio = trace.gap_ratio();
            let longest_gap_px = trace.longest_gap_px();
            if gap_ratio > self.params.max_gap_ratio || longest_gap_px as f32 > max_gap_px {
                warnings.push(QualityWarning::ExcessiveGaps {
                    lead: trace.lead,
                    gap_ratio,
                    longest_gap_px,
                });
            }
        }

        let stage = Instant::now();
        let leads: Vec<Waveform> = traces
            .iter()
            .map(|trace| reconstruct(trace, &calibration, &self.params.reconstruct, smooth))
            .collect();
        timings.reconstruct_ms = stage.elapsed().as_secs_f64() * 1000.0;

        let stage = Instant::now();
        let report = quality::report_for(&leads);
        timings.quality_ms = stage.elapsed().as_secs_f64() * 1000.0;
        for &(lead, snr_db) in &report.per_lead_snr_db {
            if snr_db < self.params.min_snr_db {
                warnings.push(QualityWarning::LowSnr { lead, snr_db });
            }
        }

        let trace = if self.params.collect_trace {
            let rhythm_trace = self.params.layout.rhythm_region(width, height).map(|r| {
                extract_trace(
                    &pre.trace_mask,
                    &r,
                    calibration.rotation_angle_deg,
                    self.params.strategy,
                )
            });
            timings.total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
            Some(DigitizationTrace {
                input: InputDescriptor { width, height },
                timings,
                calibration: calibration.clone(),
                regions,
                pixel_traces: traces,
                rhythm_trace,
            })
        } else {
            None
        };

        debug!(
            "digitizer done leads={} mean_snr={:.1}dB warnings={}",
            leads.len(),
            report.mean_snr_db,
            warnings.len()
        );
        let nominal_fallback = !calibration.is_valid;
        Ok(DigitizationReport {
            result: DigitizationResult {
                leads,
                quality: report,
                metadata: DigitizationMetadata {
                    calibration,
                    strategy: self.params.strategy,
                    nominal_fallback,
                    warnings,
                    preprocess: pre.summary,
                },
            },
            trace,
        })
    }
}

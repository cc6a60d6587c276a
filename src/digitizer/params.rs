//! Parameter types configuring the digitizer stages.
//!
//! One nested struct per stage, all plain data with documented defaults,
//! serializable so a whole run is reproducible from a JSON config.

use crate::error::DigitizeError;
use crate::grid::GridParams;
use crate::layout::LeadLayout;
use crate::preprocess::PreprocessParams;
use crate::reconstruct::ReconstructParams;
use crate::types::ExtractionStrategy;
use serde::{Deserialize, Serialize};

/// Digitizer-wide parameters controlling the linear pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DigitizerParams {
    pub preprocess: PreprocessParams,
    pub grid: GridParams,
    pub layout: LeadLayout,
    pub reconstruct: ReconstructParams,
    /// Heavier segmented extraction versus the faster approximation.
    pub strategy: ExtractionStrategy,
    /// Collect the per-lead pixel traces and stage timings for the
    /// external visualizer.
    pub collect_trace: bool,
    /// Per-lead gap ratio above which the lead is flagged (not aborted).
    pub max_gap_ratio: f32,
    /// Widest contiguous gap tolerated in one lead, millimetres of paper.
    /// Converted to pixels with the calibrated scale, so a single long
    /// dropout is flagged even when the overall ratio stays low.
    pub max_gap_mm: f32,
    /// Per-lead SNR floor below which the lead is flagged, dB.
    pub min_snr_db: f32,
}

impl Default for DigitizerParams {
    fn default() -> Self {
        Self {
            preprocess: PreprocessParams::default(),
            grid: GridParams::default(),
            layout: LeadLayout::default(),
            reconstruct: ReconstructParams::default(),
            strategy: ExtractionStrategy::Segmented,
            collect_trace: false,
            max_gap_ratio: 0.2,
            max_gap_mm: 2.0,
            min_snr_db: 6.0,
        }
    }
}

impl DigitizerParams {
    /// Check cross-stage invariants before a run.
    pub fn validate(&self) -> Result<(), DigitizeError> {
        self.layout.validate()?;
        if self.reconstruct.sample_rate_hz <= 0.0 {
            return Err(DigitizeError::InvalidConfig(format!(
                "sample_rate_hz must be positive, got {}",
                self.reconstruct.sample_rate_hz
            )));
        }
        if self.grid.min_px_per_mm <= 0.0 || self.grid.max_px_per_mm <= self.grid.min_px_per_mm {
            return Err(DigitizeError::InvalidConfig(
                "grid px-per-mm range must be positive and ordered".into(),
            ));
        }
        if self.grid.max_axis_ratio < 1.0 {
            return Err(DigitizeError::InvalidConfig(
                "max_axis_ratio must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.grid.min_line_coverage) {
            return Err(DigitizeError::InvalidConfig(
                "min_line_coverage must lie in [0, 1]".into(),
            ));
        }
        if let Some(px_per_mm) = self.grid.nominal_px_per_mm {
            if px_per_mm <= 0.0 {
                return Err(DigitizeError::InvalidConfig(
                    "nominal_px_per_mm must be positive when configured".into(),
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.max_gap_ratio) {
            return Err(DigitizeError::InvalidConfig(
                "max_gap_ratio must lie in [0, 1]".into(),
            ));
        }
        if self.max_gap_mm <= 0.0 {
            return Err(DigitizeError::InvalidConfig(format!(
                "max_gap_mm must be positive, got {}",
                self.max_gap_mm
            )));
        }
        if self.grid.paper_speed_mm_per_s <= 0.0 || self.grid.gain_mm_per_mv <= 0.0 {
            return Err(DigitizeError::InvalidConfig(
                "paper speed and gain must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        DigitizerParams::default().validate().unwrap();
    }

    #[test]
    fn bad_sample_rate_is_rejected() {
        let mut params = DigitizerParams::default();
        params.reconstruct.sample_rate_hz = 0.0;
        assert!(matches!(
            params.validate(),
            Err(DigitizeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn non_positive_gap_width_is_rejected() {
        let mut params = DigitizerParams::default();
        params.max_gap_mm = 0.0;
        assert!(matches!(
            params.validate(),
            Err(DigitizeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_px_per_mm_range_is_rejected() {
        let mut params = DigitizerParams::default();
        params.grid.max_px_per_mm = params.grid.min_px_per_mm;
        assert!(params.validate().is_err());
    }
}

//! Print-layout template mapping lead names to image regions.
//!
//! Standard 12-lead printouts arrange the leads in a 3-row by 4-column
//! grid, column-major (I aVR V1 V4 / II aVL V2 V5 / III aVF V3 V6),
//! optionally with a full-width rhythm strip below. The template is data:
//! it scales to whatever pixel dimensions the scan has and can be replaced
//! per dataset. Regions depend only on image dimensions, never on content.

use crate::error::DigitizeError;
use crate::types::{LeadName, LeadRegion};
use serde::{Deserialize, Serialize};

/// Configurable physical layout of a 12-lead printout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeadLayout {
    /// Lead at each grid cell, row-major: `grid[row][col]`.
    pub grid: Vec<Vec<LeadName>>,
    /// Optional full-width rhythm lead occupying an extra bottom row.
    /// It shrinks the grid cells but does not join the 12 reported leads.
    pub rhythm_lead: Option<LeadName>,
    /// Fractional margins of the printable area inside the image.
    pub margin_x: f32,
    pub margin_y: f32,
    /// Minimum region size in pixels for the layout to be resolvable.
    pub min_region_px: usize,
}

impl Default for LeadLayout {
    fn default() -> Self {
        use LeadName::*;
        Self {
            grid: vec![
                vec![I, AVR, V1, V4],
                vec![II, AVL, V2, V5],
                vec![III, AVF, V3, V6],
            ],
            rhythm_lead: Some(LeadName::II),
            margin_x: 0.02,
            margin_y: 0.04,
            min_region_px: 16,
        }
    }
}

impl LeadLayout {
    /// Validate structural invariants of the template.
    pub fn validate(&self) -> Result<(), DigitizeError> {
        let count: usize = self.grid.iter().map(|row| row.len()).sum();
        if count != 12 {
            return Err(DigitizeError::InvalidConfig(format!(
                "lead layout must place exactly 12 leads, found {count}"
            )));
        }
        let cols = self.grid.first().map(|r| r.len()).unwrap_or(0);
        if cols == 0 || self.grid.iter().any(|r| r.len() != cols) {
            return Err(DigitizeError::InvalidConfig(
                "lead layout rows must be non-empty and equally sized".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.margin_x) || !(0.0..0.5).contains(&self.margin_y) {
            return Err(DigitizeError::InvalidConfig(
                "lead layout margins must lie in [0, 0.5)".into(),
            ));
        }
        Ok(())
    }

    /// Partition an image of the given dimensions into the 12 lead regions
    /// (rhythm strip excluded), in canonical lead order.
    pub fn regions(&self, width: usize, height: usize) -> Result<Vec<LeadRegion>, DigitizeError> {
        self.validate()?;
        let rows = self.grid.len();
        let cols = self.grid[0].len();
        let body_rows = rows + usize::from(self.rhythm_lead.is_some());

        let x_lo = (width as f32 * self.margin_x).round() as usize;
        let x_hi = (width as f32 * (1.0 - self.margin_x)).round() as usize;
        let y_lo = (height as f32 * self.margin_y).round() as usize;
        let y_hi = (height as f32 * (1.0 - self.margin_y)).round() as usize;
        let usable_w = x_hi.saturating_sub(x_lo);
        let usable_h = y_hi.saturating_sub(y_lo);

        let cell_w = usable_w / cols;
        let cell_h = usable_h / body_rows;
        if cell_w < self.min_region_px || cell_h < self.min_region_px {
            return Err(DigitizeError::LeadSegmentation(format!(
                "image {width}x{height} too small for {rows}x{cols} layout: \
                 cell {cell_w}x{cell_h} below minimum {}",
                self.min_region_px
            )));
        }

        let mut by_lead = Vec::with_capacity(12);
        for (row, leads) in self.grid.iter().enumerate() {
            for (col, &lead) in leads.iter().enumerate() {
                by_lead.push(LeadRegion {
                    lead,
                    x0: x_lo + col * cell_w,
                    y0: y_lo + row * cell_h,
                    x1: x_lo + (col + 1) * cell_w,
                    y1: y_lo + (row + 1) * cell_h,
                });
            }
        }

        // canonical reporting order, independent of the printed arrangement
        let mut ordered = Vec::with_capacity(12);
        for name in LeadName::STANDARD_12 {
            let region = by_lead
                .iter()
                .find(|r| r.lead == name)
                .copied()
                .ok_or_else(|| {
                    DigitizeError::LeadSegmentation(format!(
                        "layout does not place lead {}",
                        name.as_str()
                    ))
                })?;
            ordered.push(region);
        }
        Ok(ordered)
    }

    /// Region of the rhythm strip, when the template has one.
    pub fn rhythm_region(&self, width: usize, height: usize) -> Option<LeadRegion> {
        let lead = self.rhythm_lead?;
        if self.validate().is_err() {
            return None;
        }
        let rows = self.grid.len();
        let x_lo = (width as f32 * self.margin_x).round() as usize;
        let x_hi = (width as f32 * (1.0 - self.margin_x)).round() as usize;
        let y_lo = (height as f32 * self.margin_y).round() as usize;
        let y_hi = (height as f32 * (1.0 - self.margin_y)).round() as usize;
        let cell_h = y_hi.saturating_sub(y_lo) / (rows + 1);
        if cell_h < self.min_region_px || x_hi <= x_lo {
            return None;
        }
        Some(LeadRegion {
            lead,
            x0: x_lo,
            y0: y_lo + rows * cell_h,
            x1: x_hi,
            y1: y_lo + (rows + 1) * cell_h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_partitions_into_twelve_regions() {
        let layout = LeadLayout::default();
        let regions = layout.regions(1200, 900).unwrap();
        assert_eq!(regions.len(), 12);
        // canonical order
        assert_eq!(regions[0].lead, LeadName::I);
        assert_eq!(regions[11].lead, LeadName::V6);
        for r in &regions {
            assert!(r.width() >= 16 && r.height() >= 16);
            assert!(r.x1 <= 1200 && r.y1 <= 900);
        }
    }

    #[test]
    fn regions_do_not_overlap() {
        let layout = LeadLayout::default();
        let regions = layout.regions(800, 600).unwrap();
        for (i, a) in regions.iter().enumerate() {
            for b in regions.iter().skip(i + 1) {
                let disjoint = a.x1 <= b.x0 || b.x1 <= a.x0 || a.y1 <= b.y0 || b.y1 <= a.y0;
                assert!(
                    disjoint,
                    "regions {:?} and {:?} overlap",
                    a.lead, b.lead
                );
            }
        }
    }

    #[test]
    fn tiny_image_fails_segmentation() {
        let layout = LeadLayout::default();
        let err = layout.regions(40, 30).unwrap_err();
        assert!(matches!(err, DigitizeError::LeadSegmentation(_)));
    }

    #[test]
    fn layout_missing_a_lead_is_rejected() {
        use LeadName::*;
        let layout = LeadLayout {
            grid: vec![
                vec![I, AVR, V1, V4],
                vec![II, AVL, V2, V5],
                vec![III, AVF, V3, V3], // V6 missing, V3 duplicated
            ],
            ..LeadLayout::default()
        };
        let err = layout.regions(1200, 900).unwrap_err();
        assert!(matches!(err, DigitizeError::LeadSegmentation(_)));
    }

    #[test]
    fn rhythm_region_spans_full_width() {
        let layout = LeadLayout::default();
        let rhythm = layout.rhythm_region(1200, 900).unwrap();
        assert_eq!(rhythm.lead, LeadName::II);
        let regions = layout.regions(1200, 900).unwrap();
        let max_y1 = regions.iter().map(|r| r.y1).max().unwrap();
        assert!(rhythm.y0 >= max_y1);
    }
}

mod common;

use common::synthetic_image::{render_png, StripSpec};
use ecg_digitizer::{DigitizerParams, EcgDigitizer};

fn process(spec: &StripSpec) -> ecg_digitizer::DigitizationReport {
    EcgDigitizer::new(DigitizerParams::default())
        .process_bytes(&render_png(spec))
        .expect("synthetic strip digitizes")
}

#[test]
fn grid_scale_recovered_within_two_percent_across_spacings() {
    for spacing in [8usize, 12, 16] {
        let report = process(&StripSpec {
            spacing_px: spacing,
            ..StripSpec::default()
        });
        let cal = &report.result.metadata.calibration;
        assert!(cal.is_valid, "spacing {spacing}: fell back to nominal");
        let expected_pps = spacing as f32 * 25.0;
        let rel = (cal.pixels_per_second - expected_pps).abs() / expected_pps;
        assert!(
            rel <= 0.02,
            "spacing {spacing}: pixels_per_second {:.2} vs expected {:.2} ({:.1}% off)",
            cal.pixels_per_second,
            expected_pps,
            rel * 100.0
        );
        let expected_ppmv = spacing as f32 * 10.0;
        let rel = (cal.pixels_per_millivolt - expected_ppmv).abs() / expected_ppmv;
        assert!(rel <= 0.02, "spacing {spacing}: amplitude scale off by {:.1}%", rel * 100.0);
    }
}

#[test]
fn three_degree_skew_recovered_within_half_degree() {
    let report = process(&StripSpec {
        rotation_deg: 3.0,
        ..StripSpec::default()
    });
    let cal = &report.result.metadata.calibration;
    assert!(cal.is_valid);
    assert!(
        (cal.rotation_angle_deg - 3.0).abs() <= 0.5,
        "rotation_angle_deg = {:.3}",
        cal.rotation_angle_deg
    );
}

#[test]
fn rotated_grid_still_calibrates_scale() {
    let spec = StripSpec {
        rotation_deg: 3.0,
        ..StripSpec::default()
    };
    let report = process(&spec);
    let cal = &report.result.metadata.calibration;
    let expected_pps = spec.spacing_px as f32 * 25.0;
    let rel = (cal.pixels_per_second - expected_pps).abs() / expected_pps;
    assert!(rel <= 0.03, "pixels_per_second off by {:.1}%", rel * 100.0);
}

#[test]
fn skew_compensation_removes_the_baseline_tilt() {
    // flat traces on a 3°-rotated page: uncompensated extraction would ramp
    // by width * tan(3°) ≈ 15 px ≈ 0.15 mV across each lead
    let report = process(&StripSpec {
        rotation_deg: 3.0,
        trace_amp_px: 0.0,
        ..StripSpec::default()
    });
    for lead in &report.result.leads {
        let n = lead.samples.len();
        assert!(n > 20);
        let head: f32 = lead.samples[..n / 10].iter().sum::<f32>() / (n / 10) as f32;
        let tail: f32 = lead.samples[n - n / 10..].iter().sum::<f32>() / (n / 10) as f32;
        assert!(
            (head - tail).abs() < 0.03,
            "lead {}: head {:.4} mV vs tail {:.4} mV",
            lead.lead.as_str(),
            head,
            tail
        );
        let peak = lead
            .samples
            .iter()
            .fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!(peak < 0.05, "lead {}: residual tilt peak {:.4} mV", lead.lead.as_str(), peak);
    }
}

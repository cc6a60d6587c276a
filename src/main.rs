use ecg_digitizer::image::RgbImageU8;
use ecg_digitizer::{DigitizerParams, EcgDigitizer};

/// Demo stub: draws a minimal synthetic strip (red grid, black baseline
/// traces) and runs the digitizer on it.
fn synthetic_strip(w: usize, h: usize, spacing: usize) -> RgbImageU8 {
    let mut data = vec![245u8; 3 * w * h];
    let mut put = |x: usize, y: usize, rgb: [u8; 3]| {
        let i = 3 * (y * w + x);
        data[i..i + 3].copy_from_slice(&rgb);
    };
    let grid_rgb = [235u8, 160, 160];
    for y in (0..h).step_by(spacing) {
        for x in 0..w {
            put(x, y, grid_rgb);
        }
    }
    for x in (0..w).step_by(spacing) {
        for y in 0..h {
            put(x, y, grid_rgb);
        }
    }
    // one dark three-pixel-thick trace through the middle of each of the
    // four layout rows
    for band in 0..4 {
        let y = h * (2 * band + 1) / 8;
        for x in 0..w {
            let wobble = ((x as f32) * 0.1).sin() * 3.0;
            let yy = (y as f32 + wobble) as usize;
            for dy in 0..3 {
                put(x, (yy + dy).min(h - 1), [15, 15, 15]);
            }
        }
    }
    RgbImageU8::new(w, h, data)
}

fn main() {
    env_logger::init();
    let image = synthetic_strip(1200, 900, 11);
    let digitizer = EcgDigitizer::new(DigitizerParams::default());
    match digitizer.process_image(&image) {
        Ok(report) => {
            let cal = &report.result.metadata.calibration;
            println!(
                "calibrated px/s={:.1} px/mV={:.1} confidence={:.3}",
                cal.pixels_per_second, cal.pixels_per_millivolt, cal.confidence
            );
            for lead in &report.result.leads {
                println!("{:>4}: {} samples", lead.lead.as_str(), lead.samples.len());
            }
        }
        Err(err) => eprintln!("digitization failed: {err}"),
    }
}

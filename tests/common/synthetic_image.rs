//! Synthetic ECG strip renderer shared by the integration tests.
//!
//! Draws a white page with a red calibration grid and dark sinusoidal
//! traces centred in each lead region of the default layout. Rotation is
//! applied as the small-angle model of a rotated scan: horizontal features
//! gain slope `+tan(angle)`, vertical features `-tan(angle)`.

use ecg_digitizer::image::RgbImageU8;
use ecg_digitizer::layout::LeadLayout;

pub const WHITE: [u8; 3] = [245, 245, 245];
pub const GRID_RED: [u8; 3] = [235, 160, 160];
pub const TRACE_INK: [u8; 3] = [15, 15, 15];

#[derive(Clone, Debug)]
pub struct StripSpec {
    pub width: usize,
    pub height: usize,
    /// Small-square size in pixels (1 mm on paper).
    pub spacing_px: usize,
    /// Global skew, degrees, positive = clockwise.
    pub rotation_deg: f32,
    pub draw_grid: bool,
    pub draw_traces: bool,
    /// Sine amplitude of the per-lead traces, pixels.
    pub trace_amp_px: f32,
    /// Columns skipped while drawing traces: every `period` columns a run
    /// of `width` columns is left blank.
    pub gap: Option<(usize, usize)>,
}

impl Default for StripSpec {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            spacing_px: 10,
            rotation_deg: 0.0,
            draw_grid: true,
            draw_traces: true,
            trace_amp_px: 18.0,
            gap: None,
        }
    }
}

struct Canvas {
    w: usize,
    h: usize,
    data: Vec<u8>,
}

impl Canvas {
    fn new(w: usize, h: usize) -> Self {
        let mut data = Vec::with_capacity(3 * w * h);
        for _ in 0..w * h {
            data.extend_from_slice(&WHITE);
        }
        Self { w, h, data }
    }

    fn put(&mut self, x: isize, y: isize, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let i = 3 * (y as usize * self.w + x as usize);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }
}

/// Render the strip into an owned RGB buffer.
pub fn render(spec: &StripSpec) -> RgbImageU8 {
    let mut canvas = Canvas::new(spec.width, spec.height);
    let tan = spec.rotation_deg.to_radians().tan();
    let cx = 0.5 * (spec.width as f32 - 1.0);
    let cy = 0.5 * (spec.height as f32 - 1.0);

    if spec.draw_grid {
        for base in (0..spec.height).step_by(spec.spacing_px) {
            for x in 0..spec.width {
                let y = base as f32 + tan * (x as f32 - cx);
                canvas.put(x as isize, y.round() as isize, GRID_RED);
            }
        }
        for base in (0..spec.width).step_by(spec.spacing_px) {
            for y in 0..spec.height {
                let x = base as f32 - tan * (y as f32 - cy);
                canvas.put(x.round() as isize, y as isize, GRID_RED);
            }
        }
    }

    if spec.draw_traces {
        let layout = LeadLayout::default();
        let mut regions = layout
            .regions(spec.width, spec.height)
            .expect("default layout fits the synthetic strip");
        if let Some(rhythm) = layout.rhythm_region(spec.width, spec.height) {
            regions.push(rhythm);
        }
        for region in &regions {
            let mid = 0.5 * (region.y0 + region.y1) as f32;
            for col in 0..region.width() {
                if let Some((period, gap_w)) = spec.gap {
                    if col % period < gap_w {
                        continue;
                    }
                }
                let x = (region.x0 + col) as f32;
                let phase = col as f32 / region.width() as f32;
                let base =
                    mid + spec.trace_amp_px * (2.0 * std::f32::consts::PI * 2.0 * phase).sin();
                let y = base + tan * (x - cx);
                // three-pixel stroke thickness
                for dy in -1..=1 {
                    canvas.put(x as isize, y.round() as isize + dy, TRACE_INK);
                }
            }
        }
    }

    RgbImageU8::new(spec.width, spec.height, canvas.data)
}

/// Render and PNG-encode the strip.
pub fn render_png(spec: &StripSpec) -> Vec<u8> {
    let img = render(spec);
    let w = img.width();
    let h = img.height();
    let mut raw = Vec::with_capacity(3 * w * h);
    for y in 0..h {
        raw.extend_from_slice(img.row(y));
    }
    let buffer: image::RgbImage =
        image::ImageBuffer::from_raw(w as u32, h as u32, raw).expect("raw buffer matches dims");
    let mut png = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(buffer)
        .write_to(&mut png, image::ImageOutputFormat::Png)
        .expect("in-memory PNG encoding");
    png.into_inner()
}

/// A uniformly blank page (no grid, no trace).
pub fn blank_png(width: usize, height: usize) -> Vec<u8> {
    render_png(&StripSpec {
        width,
        height,
        draw_grid: false,
        draw_traces: false,
        ..StripSpec::default()
    })
}

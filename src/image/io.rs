//! Boundary I/O: decode raster input, dump debug PNGs and JSON.
//!
//! - `decode_bytes` / `load_image`: decode a PNG/JPEG/etc. into an owned
//!   RGB buffer.
//! - `save_grayscale_f32`: write an `ImageF32` to a grayscale PNG
//!   (debug/visualizer output only, never read back by the pipeline).
//! - `write_json_file`: pretty-print a serializable value to disk.

use super::{ImageF32, RgbImageU8};
use crate::error::DigitizeError;
use image::GrayImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Decode in-memory image bytes into an owned RGB buffer.
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbImageU8, DigitizeError> {
    let img = image::load_from_memory(bytes)?.into_rgb8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    Ok(RgbImageU8::new(w, h, img.into_raw()))
}

/// Read an image file from disk and decode it.
pub fn load_image(path: &Path) -> Result<RgbImageU8, DigitizeError> {
    let bytes = fs::read(path).map_err(|source| DigitizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(&bytes)
}

/// Save a float image to a grayscale PNG, mapping [0, 1] to [0, 255].
pub fn save_grayscale_f32(image: &ImageF32, path: &Path) -> Result<(), DigitizeError> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for y in 0..image.h {
        let row = image.row(y);
        for (x, &px) in row.iter().enumerate() {
            let v = (px * 255.0).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, image::Luma([v as u8]));
        }
    }
    out.save(path)?;
    Ok(())
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), DigitizeError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| DigitizeError::InvalidConfig(format!("serialize {}: {e}", path.display())))?;
    fs::write(path, json).map_err(|source| DigitizeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), DigitizeError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| DigitizeError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

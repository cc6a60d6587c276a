//! Owned interleaved 8-bit RGB buffer produced by decoding.
//!
//! Immutable once loaded; every later stage derives new images instead of
//! mutating this one.

#[derive(Clone, Debug)]
pub struct RgbImageU8 {
    w: usize,
    h: usize,
    /// Interleaved RGB, `3 * w * h` bytes, row-major.
    data: Vec<u8>,
}

impl RgbImageU8 {
    pub fn new(w: usize, h: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), 3 * w * h);
        Self { w, h, data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// RGB triple at (x, y).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = 3 * (y * self.w + x);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        let start = 3 * y * self.w;
        &self.data[start..start + 3 * self.w]
    }
}

/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Square scalar field and the image initializer that produces it.
//!
//! A [`Field`] is an N×N row-major grid of `f64`. Fields built from images
//! hold values in [0.0, 1.0]; the simulator keeps them there after every step.
//!
//! # Initialization
//!
//! ```rust,ignore
//! use esqet_core::field::Field;
//!
//! let bytes = std::fs::read("mint0.jpg")?;
//! let field = Field::from_image_bytes(&bytes, 32)?;
//! assert_eq!(field.side(), 32);
//! ```

use std::path::Path;

use image::imageops::FilterType;
use image::GrayImage;

use crate::error::{EsqetError, EsqetResult};

/// Label used in decode errors for in-memory input.
pub const MEMORY_SOURCE: &str = "<memory>";

/// N×N grid of intensities, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    side: usize,
    cells: Vec<f64>,
}

impl Field {
    /// Wrap an existing row-major buffer. `cells.len()` must equal `side²`.
    pub fn new(side: usize, cells: Vec<f64>) -> EsqetResult<Self> {
        if side == 0 || cells.len() != side * side {
            return Err(EsqetError::Config(format!(
                "field of side {side} needs {} cells, got {}",
                side * side,
                cells.len()
            )));
        }
        Ok(Self { side, cells })
    }

    /// A field with every cell set to `value`.
    pub fn filled(side: usize, value: f64) -> Self {
        Self {
            side,
            cells: vec![value; side * side],
        }
    }

    /// Build a field from a `(row, col) -> value` function.
    pub fn from_fn(side: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut cells = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                cells.push(f(row, col));
            }
        }
        Self { side, cells }
    }

    // ── Image initialization ───────────────────────────────────────────────

    /// Decode raster bytes, convert to grayscale, resample to `side`×`side`
    /// and normalize by 255.
    pub fn from_image_bytes(bytes: &[u8], side: usize) -> EsqetResult<Self> {
        Self::decode(bytes, side, MEMORY_SOURCE)
    }

    /// Read and decode an image file. A missing file is a decode error
    /// carrying the path.
    pub fn from_image_path(path: impl AsRef<Path>, side: usize) -> EsqetResult<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|e| EsqetError::decode(label.clone(), e))?;
        Self::decode(&bytes, side, &label)
    }

    /// Resample an already-decoded grayscale image.
    pub fn from_gray(gray: &GrayImage, side: usize) -> Self {
        let resized = if gray.width() as usize == side && gray.height() as usize == side {
            gray.clone()
        } else {
            image::imageops::resize(gray, side as u32, side as u32, FilterType::Triangle)
        };
        Self {
            side,
            cells: resized.pixels().map(|p| p.0[0] as f64 / 255.0).collect(),
        }
    }

    fn decode(bytes: &[u8], side: usize, label: &str) -> EsqetResult<Self> {
        if bytes.is_empty() {
            return Err(EsqetError::decode(label, "empty input"));
        }
        if side == 0 {
            return Err(EsqetError::Config("grid side must be > 0".into()));
        }
        let img = image::load_from_memory(bytes).map_err(|e| EsqetError::decode(label, e))?;
        let gray = img.to_luma8();
        if gray.width() == 0 || gray.height() == 0 {
            return Err(EsqetError::decode(label, "image has no pixels"));
        }
        tracing::debug!(
            source = label,
            width = gray.width(),
            height = gray.height(),
            side,
            "decoded image"
        );
        Ok(Self::from_gray(&gray, side))
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    /// Side length N.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.cells
    }

    /// Value at `(row, col)`. Panics if out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.side + col]
    }

    /// Value at `(row, col)` with periodic wraparound on both axes.
    pub fn get_wrapped(&self, row: isize, col: isize) -> f64 {
        let n = self.side as isize;
        let r = row.rem_euclid(n) as usize;
        let c = col.rem_euclid(n) as usize;
        self.cells[r * self.side + c]
    }

    /// Smallest and largest cell value.
    pub fn min_max(&self) -> (f64, f64) {
        self.cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// `true` if every cell lies in [0.0, 1.0].
    pub fn is_unit_bounded(&self) -> bool {
        self.cells.iter().all(|v| (0.0..=1.0).contains(v))
    }

    /// Clamp every cell into [0.0, 1.0].
    pub fn clamp_unit(&mut self) {
        for v in &mut self.cells {
            *v = v.clamp(0.0, 1.0);
        }
    }

    // ── Conversions ────────────────────────────────────────────────────────

    /// Rescale to 8-bit: `(v × 255) as u8`, truncating toward zero.
    pub fn to_gray8(&self) -> GrayImage {
        let n = self.side as u32;
        let data: Vec<u8> = self.cells.iter().map(|&v| (v * 255.0) as u8).collect();
        GrayImage::from_raw(n, n, data).unwrap_or_else(|| GrayImage::new(n, n))
    }

    /// Raw cell bytes: each value as little-endian IEEE-754 `f64`, row-major.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.cells.len() * 8);
        for v in &self.cells {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: &GrayImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(Field::new(4, vec![0.0; 15]).is_err());
        assert!(Field::new(0, vec![]).is_err());
        assert!(Field::new(4, vec![0.0; 16]).is_ok());
    }

    #[test]
    fn test_from_image_bytes_normalizes() {
        let img = GrayImage::from_pixel(32, 32, Luma([255]));
        let field = Field::from_image_bytes(&png_bytes(&img), 32).unwrap();
        assert_eq!(field.side(), 32);
        assert!(field.cells().iter().all(|&v| v == 1.0));

        let img = GrayImage::from_pixel(32, 32, Luma([0]));
        let field = Field::from_image_bytes(&png_bytes(&img), 32).unwrap();
        assert!(field.cells().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_image_bytes_resizes_and_bounds() {
        let img = GrayImage::from_fn(100, 60, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
        let field = Field::from_image_bytes(&png_bytes(&img), 32).unwrap();
        assert_eq!(field.cells().len(), 32 * 32);
        assert!(field.is_unit_bounded());
    }

    #[test]
    fn test_color_input_is_grayscaled() {
        let img = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        let field = Field::from_image_bytes(&buf.into_inner(), 8).unwrap();
        assert!(field.cells().iter().all(|&v| (v - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let err = Field::from_image_bytes(&[], 32).unwrap_err();
        assert!(matches!(err, EsqetError::Decode { .. }), "{}", err);
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let err = Field::from_image_bytes(b"definitely not an image", 32).unwrap_err();
        assert!(matches!(err, EsqetError::Decode { ref path, .. } if path == MEMORY_SOURCE));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Field::from_image_path("/no/such/dir/mint0.jpg", 32).unwrap_err();
        match err {
            EsqetError::Decode { path, .. } => assert!(path.ends_with("mint0.jpg")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_wraparound_indexing() {
        let field = Field::from_fn(4, |r, c| (r * 4 + c) as f64);
        assert_eq!(field.get_wrapped(-1, 0), field.get(3, 0));
        assert_eq!(field.get_wrapped(0, -1), field.get(0, 3));
        assert_eq!(field.get_wrapped(4, 5), field.get(0, 1));
    }

    #[test]
    fn test_to_gray8_truncates() {
        let field = Field::new(2, vec![0.0, 0.5, 0.999, 1.0]).unwrap();
        let gray = field.to_gray8();
        let px: Vec<u8> = gray.pixels().map(|p| p.0[0]).collect();
        assert_eq!(px, vec![0, 127, 254, 255]);
    }

    #[test]
    fn test_le_bytes_layout() {
        let field = Field::new(1, vec![0.5]).unwrap();
        assert_eq!(field.to_le_bytes(), 0.5f64.to_le_bytes().to_vec());
    }
}

//! Frame composition for the bitonal panel.
//!
//! Everything the panel shows is a [`Bitmap`] the size of the panel.
//! [`Renderer`] builds those frames from text (built-in 5x7 typeface) or
//! from `.bmp` assets on disk.

pub mod bmp;
pub mod font;

use std::path::Path;

use crate::config::SystemConfig;
use crate::error::AssetError;

use font::TextStyle;

// ---------------------------------------------------------------------------
// Bitmap
// ---------------------------------------------------------------------------

/// Packed 1-bit frame.  Rows are `stride` bytes, MSB is the leftmost
/// pixel, a set bit is white.  This is the layout the panel controller
/// takes directly.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("black_pixels", &self.count_black())
            .finish()
    }
}

impl Bitmap {
    /// All-white frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0xFF)
    }

    /// Frame with every byte set to `fill`.
    pub fn filled(width: u32, height: u32, fill: u8) -> Self {
        let stride = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            stride,
            data: vec![fill; stride * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Raw packed rows.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn locate(&self, x: i64, y: i64) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        let idx = y as usize * self.stride + (x as usize >> 3);
        let mask = 0x80u8 >> (x as usize & 7);
        Some((idx, mask))
    }

    /// Paint one pixel.  Out-of-bounds writes are clipped.
    pub fn set_black(&mut self, x: i64, y: i64, black: bool) {
        if let Some((idx, mask)) = self.locate(x, y) {
            if black {
                self.data[idx] &= !mask;
            } else {
                self.data[idx] |= mask;
            }
        }
    }

    /// Out-of-bounds reads are white.
    pub fn is_black(&self, x: i64, y: i64) -> bool {
        self.locate(x, y)
            .is_some_and(|(idx, mask)| self.data[idx] & mask == 0)
    }

    /// Black rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32) {
        for yy in y..y + i64::from(h) {
            for xx in x..x + i64::from(w) {
                self.set_black(xx, yy, true);
            }
        }
    }

    /// Copy every pixel of `src` onto `self` with its top-left at `(x, y)`.
    pub fn blit(&mut self, src: &Bitmap, x: i64, y: i64) {
        for sy in 0..i64::from(src.height) {
            for sx in 0..i64::from(src.width) {
                self.set_black(x + sx, y + sy, src.is_black(sx, sy));
            }
        }
    }

    pub fn count_black(&self) -> usize {
        let mut n = 0;
        for y in 0..i64::from(self.height) {
            for x in 0..i64::from(self.width) {
                if self.is_black(x, y) {
                    n += 1;
                }
            }
        }
        n
    }

    /// Binary PBM (P4) encoding, used for frame snapshots.
    pub fn to_pbm(&self) -> Vec<u8> {
        let mut out = format!("P4\n{} {}\n", self.width, self.height).into_bytes();
        // PBM uses 1 = black; the padding bits of each row are don't-care.
        out.extend(self.data.iter().map(|b| !b));
        out
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Builds panel-sized frames.
#[derive(Debug, Clone)]
pub struct Renderer {
    width: u32,
    height: u32,
    regular: TextStyle,
    bold: TextStyle,
}

impl Renderer {
    pub fn new(width: u32, height: u32, regular: TextStyle, bold: TextStyle) -> Self {
        Self { width, height, regular, bold }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.panel_width,
            config.panel_height,
            TextStyle::new(config.text_scale, config.text_stroke_width),
            TextStyle::new(config.text_scale, config.text_stroke_width_bold),
        )
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// All-white frame the size of the panel.
    pub fn blank(&self) -> Bitmap {
        Bitmap::new(self.width, self.height)
    }

    /// `message` centered horizontally and vertically as one block.
    pub fn text_frame(&self, message: &str, bold: bool) -> Bitmap {
        let style = if bold { self.bold } else { self.regular };
        let (w, h) = font::measure(message, style);
        let x = (i64::from(self.width) - i64::from(w)).div_euclid(2);
        let y = (i64::from(self.height) - i64::from(h)).div_euclid(2);

        let mut frame = self.blank();
        font::draw(&mut frame, x, y, message, style);
        frame
    }

    /// Decode a `.bmp` and place it at the frame origin.
    pub fn image_frame(&self, path: &Path) -> Result<Bitmap, AssetError> {
        let image = bmp::load(path)?;
        let mut frame = self.blank();
        frame.blit(&image, 0, 0);
        Ok(frame)
    }
}

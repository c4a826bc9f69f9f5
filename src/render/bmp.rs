//! Minimal BMP decoder for presentation assets.
//!
//! File layout:
//! ```text
//! ┌──────────────┬──────────────┬───────────┬──────────────────────┐
//! │ File header  │ DIB header   │ Palette   │ Pixel rows           │
//! │ 14 B, "BM"   │ 12 or ≥40 B  │ (≤ 8 bpp) │ padded to 4 B, LE    │
//! └──────────────┴──────────────┴───────────┴──────────────────────┘
//! ```
//!
//! Supports uncompressed 1/4/8 bpp palettized and 24/32 bpp images,
//! bottom-up or top-down.  Pixels darker than mid-grey become black.

use std::path::Path;

use crate::error::AssetError;

use super::Bitmap;

const FILE_HEADER_SIZE: usize = 14;
const CORE_HEADER_SIZE: u32 = 12;
const INFO_HEADER_SIZE: u32 = 40;
const BI_RGB: u32 = 0;
/// Refuse absurd headers before allocating.
const MAX_DIMENSION: u32 = 8192;

fn u16_at(data: &[u8], off: usize) -> Result<u16, AssetError> {
    data.get(off..off + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(AssetError::Corrupt("truncated header"))
}

fn u32_at(data: &[u8], off: usize) -> Result<u32, AssetError> {
    data.get(off..off + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(AssetError::Corrupt("truncated header"))
}

/// Perceived luminance below mid-grey?
fn is_dark(r: u8, g: u8, b: u8) -> bool {
    let luma = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
    luma < 128 * 1000
}

struct Header {
    width: u32,
    height: u32,
    top_down: bool,
    bpp: u16,
    /// Per palette entry: true = dark.
    palette: Vec<bool>,
    pixel_offset: usize,
}

fn parse_header(data: &[u8]) -> Result<Header, AssetError> {
    if data.len() < FILE_HEADER_SIZE || &data[0..2] != b"BM" {
        return Err(AssetError::BadSignature);
    }
    let pixel_offset = u32_at(data, 10)? as usize;
    let dib_size = u32_at(data, 14)?;

    let (width, raw_height, bpp, colors_used, entry_size) = if dib_size == CORE_HEADER_SIZE {
        let w = u32::from(u16_at(data, 18)?);
        let h = i64::from(u16_at(data, 20)?);
        (w, h, u16_at(data, 24)?, 0u32, 3usize)
    } else if dib_size >= INFO_HEADER_SIZE {
        let w = u32_at(data, 18)? as i32;
        let h = u32_at(data, 22)? as i32;
        if w <= 0 {
            return Err(AssetError::Corrupt("non-positive width"));
        }
        if u32_at(data, 30)? != BI_RGB {
            return Err(AssetError::Unsupported("compressed pixel data"));
        }
        (w as u32, i64::from(h), u16_at(data, 28)?, u32_at(data, 46)?, 4usize)
    } else {
        return Err(AssetError::Unsupported("unknown DIB header"));
    };

    let height = raw_height.unsigned_abs() as u32;
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(AssetError::Corrupt("bad dimensions"));
    }

    let palette = match bpp {
        1 | 4 | 8 => {
            let max = 1u32 << bpp;
            let count = if colors_used == 0 { max } else { colors_used.min(max) } as usize;
            let start = FILE_HEADER_SIZE + dib_size as usize;
            let mut palette = Vec::with_capacity(count);
            for i in 0..count {
                let off = start + i * entry_size;
                let bgr = data
                    .get(off..off + 3)
                    .ok_or(AssetError::Corrupt("truncated palette"))?;
                palette.push(is_dark(bgr[2], bgr[1], bgr[0]));
            }
            palette
        }
        24 | 32 => Vec::new(),
        _ => return Err(AssetError::Unsupported("bit depth")),
    };

    Ok(Header {
        width,
        height,
        top_down: raw_height < 0,
        bpp,
        palette,
        pixel_offset,
    })
}

/// Decode an in-memory BMP file.
pub fn decode(data: &[u8]) -> Result<Bitmap, AssetError> {
    let h = parse_header(data)?;
    let bpp = usize::from(h.bpp);
    let stride = (bpp * h.width as usize).div_ceil(32) * 4;
    let needed = h.pixel_offset + stride * h.height as usize;
    if data.len() < needed {
        return Err(AssetError::Corrupt("truncated pixel data"));
    }

    let mut out = Bitmap::new(h.width, h.height);
    for row in 0..h.height as usize {
        let y = if h.top_down { row } else { h.height as usize - 1 - row };
        let line = &data[h.pixel_offset + row * stride..h.pixel_offset + (row + 1) * stride];

        for x in 0..h.width as usize {
            let dark = match h.bpp {
                1 | 4 | 8 => {
                    let bit = x * bpp;
                    let byte = line[bit / 8];
                    let shift = 8 - bpp - (bit % 8);
                    let idx = usize::from((byte >> shift) & ((1u16 << bpp) - 1) as u8);
                    h.palette.get(idx).copied().unwrap_or(false)
                }
                _ => {
                    let px = &line[x * bpp / 8..];
                    is_dark(px[2], px[1], px[0])
                }
            };
            if dark {
                out.set_black(x as i64, y as i64, true);
            }
        }
    }
    Ok(out)
}

/// Read and decode a BMP file.
pub fn load(path: &Path) -> Result<Bitmap, AssetError> {
    let data = std::fs::read(path).map_err(|e| AssetError::Io(format!("{}: {e}", path.display())))?;
    decode(&data)
}

/// Encode a 1-bpp BMP (bottom-up, black/white palette) for fixtures.
pub fn encode_1bpp(frame: &Bitmap) -> Vec<u8> {
    let (w, h) = frame.dimensions();
    let stride = (w as usize).div_ceil(32) * 4;
    let pixel_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE as usize + 8;
    let file_size = pixel_offset + stride * h as usize;

    let mut out = Vec::with_capacity(file_size);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(pixel_offset as u32).to_le_bytes());

    out.extend_from_slice(&INFO_HEADER_SIZE.to_le_bytes());
    out.extend_from_slice(&(w as i32).to_le_bytes());
    out.extend_from_slice(&(h as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&1u16.to_le_bytes()); // bpp
    out.extend_from_slice(&BI_RGB.to_le_bytes());
    out.extend_from_slice(&((stride * h as usize) as u32).to_le_bytes());
    out.extend_from_slice(&2835u32.to_le_bytes()); // 72 dpi
    out.extend_from_slice(&2835u32.to_le_bytes());
    out.extend_from_slice(&2u32.to_le_bytes()); // colours used
    out.extend_from_slice(&0u32.to_le_bytes());

    // Palette: index 0 black, index 1 white.
    out.extend_from_slice(&[0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0]);

    for y in (0..h).rev() {
        let mut row = vec![0u8; stride];
        for x in 0..w {
            if !frame.is_black(i64::from(x), i64::from(y)) {
                row[x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
        out.extend_from_slice(&row);
    }
    out
}

//! Quantization of RGBA pixels to 16-color ANSI terminal cells.
//!
//! Every pixel becomes one foreground escape sequence followed by one
//! character of an intensity ramp. A palette color is a candidate only if it
//! is at least as bright as the pixel in every channel; among candidates the
//! one with the smallest largest-channel gap wins, and that gap picks the
//! ramp character (no gap prints the densest glyph).

use std::io::{self, Write};

use image::{Rgba, RgbaImage};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Characters from densest to sparsest.
pub const INTENSITY_RAMP: &[u8; 13] = b"%@&#$=+<;:-. ";
/// Score used when no palette entry bounds the pixel.
pub const NO_MATCH_SCORE: u32 = 768;
/// Resets all terminal attributes.
pub const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub rgb: [u8; 3],
    pub escape: &'static str,
}

const fn entry(r: u8, g: u8, b: u8, escape: &'static str) -> PaletteEntry {
    PaletteEntry {
        rgb: [r, g, b],
        escape,
    }
}

/// The 8 normal and 8 bright ANSI foreground colors.
pub const PALETTE: [PaletteEntry; 16] = [
    entry(0x00, 0x00, 0x00, "\x1b[23;30m"),
    entry(0x18, 0x18, 0xc2, "\x1b[23;34m"),
    entry(0x18, 0xc2, 0x18, "\x1b[23;32m"),
    entry(0x18, 0xc2, 0xc2, "\x1b[23;36m"),
    entry(0xc2, 0x18, 0x18, "\x1b[23;31m"),
    entry(0xc2, 0x18, 0xc2, "\x1b[23;35m"),
    entry(0xc2, 0xc2, 0x18, "\x1b[23;33m"),
    entry(0xc2, 0xc2, 0xc2, "\x1b[23;37m"),
    entry(0x68, 0x68, 0x68, "\x1b[3;30m"),
    entry(0x74, 0x74, 0xff, "\x1b[3;34m"),
    entry(0x54, 0xff, 0x54, "\x1b[3;32m"),
    entry(0x54, 0xff, 0xff, "\x1b[3;36m"),
    entry(0xff, 0x54, 0x54, "\x1b[3;31m"),
    entry(0xff, 0x54, 0xff, "\x1b[3;35m"),
    entry(0xff, 0xff, 0x54, "\x1b[3;33m"),
    entry(0xff, 0xff, 0xff, "\x1b[3;37m"),
];

/// One quantized terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsiCell {
    pub palette_index: usize,
    /// Largest channel gap to the chosen palette color.
    pub score: u32,
    pub glyph: char,
}

impl AnsiCell {
    pub fn escape(&self) -> &'static str {
        PALETTE[self.palette_index].escape
    }
}

/// Ramp character for a palette score; scores above 255 clamp to the sparsest end.
pub fn intensity_char(score: u32) -> char {
    let s = score.min(255) as usize;
    INTENSITY_RAMP[s * INTENSITY_RAMP.len() / 256] as char
}

/// Maps a pixel to its palette color and ramp character. Alpha is ignored.
pub fn quantize(px: Rgba<u8>) -> AnsiCell {
    let [r, g, b, _] = px.0;
    let mut nearest = 0;
    let mut nearest_score = NO_MATCH_SCORE;
    for (i, p) in PALETTE.iter().enumerate() {
        let [pr, pg, pb] = p.rgb;
        if r > pr || g > pg || b > pb {
            continue;
        }
        let score = (pr - r).max(pg - g).max(pb - b) as u32;
        if score < nearest_score {
            nearest = i;
            nearest_score = score;
        }
    }
    AnsiCell {
        palette_index: nearest,
        score: nearest_score,
        glyph: intensity_char(nearest_score),
    }
}

fn row_text(img: &RgbaImage, y: u32) -> String {
    let mut line = String::with_capacity(img.width() as usize * 10 + 1);
    for x in 0..img.width() {
        let cell = quantize(*img.get_pixel(x, y));
        line.push_str(cell.escape());
        line.push(cell.glyph);
    }
    line.push('\n');
    line
}

/// Writes `img` as ANSI cells, one text line per pixel row.
///
/// With `reset` a final attribute reset is written after the last row.
pub fn write_ansi<W: Write + ?Sized>(img: &RgbaImage, w: &mut W, reset: bool) -> io::Result<()> {
    #[cfg(feature = "parallel")]
    let rows: Vec<String> = (0..img.height())
        .into_par_iter()
        .map(|y| row_text(img, y))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<String> = (0..img.height()).map(|y| row_text(img, y)).collect();

    for row in &rows {
        w.write_all(row.as_bytes())?;
    }
    if reset {
        w.write_all(RESET.as_bytes())?;
    }
    w.flush()
}

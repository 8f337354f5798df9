#![allow(dead_code)]

use glyph_atlas_core::model::{GlyphMetrics, RasterGlyph};
use image::{Rgba, RgbaImage};

/// A glyph whose texels encode their own position and the glyph's code.
pub fn patterned(code: u32, w: u16, h: u16, bearing_x: i16, bearing_y: i16, advance_x: i16) -> RasterGlyph {
    let pixels = RgbaImage::from_fn(w as u32, h as u32, |x, y| {
        Rgba([x as u8, y as u8, code as u8, 255])
    });
    RasterGlyph {
        metrics: GlyphMetrics {
            width: w,
            height: h,
            bearing_x,
            bearing_y,
            advance_x,
        },
        pixels: Some(pixels),
    }
}

/// A single-colour glyph.
pub fn solid(color: [u8; 4], w: u16, h: u16, bearing_x: i16, bearing_y: i16, advance_x: i16) -> RasterGlyph {
    RasterGlyph {
        metrics: GlyphMetrics {
            width: w,
            height: h,
            bearing_x,
            bearing_y,
            advance_x,
        },
        pixels: Some(RgbaImage::from_pixel(w as u32, h as u32, Rgba(color))),
    }
}

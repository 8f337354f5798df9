use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn x2(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn y2(&self) -> u32 {
        self.y + self.h
    }
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x >= other.x2() || other.x >= self.x2() || self.y >= other.y2() || other.y >= self.y2())
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Metrics of a rasterized glyph as produced by a glyph source.
///
/// `bearing_x`/`bearing_y` locate the bitmap's top-left corner relative to the
/// pen origin: the bitmap starts at column `pen_x - bearing_x` and at row
/// `-bearing_y` (rows grow downward, the baseline is row 0).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub width: u16,
    pub height: u16,
    pub bearing_x: i16,
    pub bearing_y: i16,
    pub advance_x: i16,
}

impl GlyphMetrics {
    /// True if the glyph carries visible pixels.
    pub fn has_pixels(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A glyph handed over by a [`GlyphSource`](crate::source::GlyphSource).
#[derive(Debug, Clone)]
pub struct RasterGlyph {
    pub metrics: GlyphMetrics,
    /// RGBA pixels of exactly `width x height`; `None` for invisible glyphs.
    pub pixels: Option<RgbaImage>,
}

impl RasterGlyph {
    /// A glyph with an advance but no pixels (whitespace).
    pub fn empty(advance_x: i16) -> Self {
        Self {
            metrics: GlyphMetrics {
                advance_x,
                ..Default::default()
            },
            pixels: None,
        }
    }
}

/// One loaded character code: metrics plus its placement in the atlas.
///
/// `atlas_u`/`atlas_v` are meaningful only when the glyph has pixels.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphRecord {
    pub code: u16,
    pub advance_x: i16,
    pub width: u16,
    pub height: u16,
    pub bearing_x: i16,
    pub bearing_y: i16,
    pub atlas_u: u16,
    pub atlas_v: u16,
}

impl GlyphRecord {
    pub fn new(code: u16, metrics: GlyphMetrics, atlas_u: u16, atlas_v: u16) -> Self {
        Self {
            code,
            advance_x: metrics.advance_x,
            width: metrics.width,
            height: metrics.height,
            bearing_x: metrics.bearing_x,
            bearing_y: metrics.bearing_y,
            atlas_u,
            atlas_v,
        }
    }

    pub fn metrics(&self) -> GlyphMetrics {
        GlyphMetrics {
            width: self.width,
            height: self.height,
            bearing_x: self.bearing_x,
            bearing_y: self.bearing_y,
            advance_x: self.advance_x,
        }
    }

    pub fn has_pixels(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Rectangle covered by this glyph inside the atlas.
    pub fn atlas_rect(&self) -> Rect {
        Rect::new(
            self.atlas_u as u32,
            self.atlas_v as u32,
            self.width as u32,
            self.height as u32,
        )
    }
}

/// Extent of a laid-out string relative to the pen origin (rows grow downward).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }
    /// True when the box covers no pixels (empty or all-whitespace text).
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Statistics about a packed glyph atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtlasStats {
    pub atlas_size: u32,
    /// Codes registered, with or without pixels.
    pub loaded_glyphs: usize,
    /// Codes that own an atlas region.
    pub visible_glyphs: usize,
    /// Sum of `width * height` over visible glyphs.
    pub used_area: u64,
    /// used_area / atlas_size^2 (0.0 to 1.0).
    pub occupancy: f64,
    /// Highest occupied row over all columns.
    pub skyline_height: u32,
}

impl AtlasStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Atlas: {0}x{0}, Glyphs: {1} loaded / {2} visible, Occupancy: {3:.2}%, Used Area: {4} px², Skyline: {5} px",
            self.atlas_size,
            self.loaded_glyphs,
            self.visible_glyphs,
            self.occupancy * 100.0,
            self.used_area,
            self.skyline_height,
        )
    }
}

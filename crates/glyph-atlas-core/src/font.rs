use image::RgbaImage;
use tracing::warn;

use crate::compositing::blit_rows;
use crate::model::{BoundingBox, GlyphRecord};

/// A decoded bitmap font: the atlas plus its glyph table sorted by code.
#[derive(Debug, Clone)]
pub struct AtlasFont {
    bitmap: RgbaImage,
    glyphs: Vec<GlyphRecord>,
}

impl AtlasFont {
    /// Builds a font from an atlas and a glyph table.
    ///
    /// `glyphs` must be sorted by ascending code; lookups binary-search it.
    pub fn from_parts(bitmap: RgbaImage, glyphs: Vec<GlyphRecord>) -> Self {
        Self { bitmap, glyphs }
    }

    pub fn atlas_size(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn glyphs(&self) -> &[GlyphRecord] {
        &self.glyphs
    }

    /// Looks `code` up in the glyph table.
    pub fn find_glyph(&self, code: u32) -> Option<&GlyphRecord> {
        let code = u16::try_from(code).ok()?;
        self.glyphs
            .binary_search_by_key(&code, |g| g.code)
            .ok()
            .map(|i| &self.glyphs[i])
    }

    /// Resolvable glyphs of `text` with the pen position each one is drawn at.
    ///
    /// Characters without a glyph are skipped and do not advance the pen.
    fn pen_walk<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (i32, &'a GlyphRecord)> + 'a {
        text.chars()
            .filter_map(|ch| self.find_glyph(ch as u32))
            .scan(0i32, |x, g| {
                let pen = *x;
                *x += g.advance_x as i32;
                Some((pen, g))
            })
    }

    /// Bounding box of `text` relative to the pen origin.
    pub fn measure(&self, text: &str) -> BoundingBox {
        let mut bb = BoundingBox::default();
        for (x, g) in self.pen_walk(text) {
            let bx = g.bearing_x as i32;
            let by = g.bearing_y as i32;
            bb.left = bb.left.min(x - bx);
            bb.right = bb.right.max(x + g.width as i32 - bx);
            bb.top = bb.top.min(-by);
            bb.bottom = bb.bottom.max(g.height as i32 - by);
        }
        bb
    }

    /// Copies the glyphs of `text` out of the atlas into a `bb`-sized image.
    ///
    /// Texels are copied verbatim; where glyph boxes overlap the later glyph
    /// wins. Glyph rectangles reaching outside the atlas or `bb` are clipped.
    pub fn composite(&self, text: &str, bb: &BoundingBox) -> RgbaImage {
        let mut out = RgbaImage::new(bb.width(), bb.height());
        if bb.is_empty() {
            return out;
        }
        for (x, g) in self.pen_walk(text) {
            if !g.has_pixels() {
                continue;
            }
            let dx = (x - g.bearing_x as i32 - bb.left) as i64;
            let dy = (-(g.bearing_y as i32) - bb.top) as i64;
            if !blit_rows(&self.bitmap, g.atlas_rect(), &mut out, dx, dy) {
                warn!(code = g.code, "glyph clipped while compositing");
            }
        }
        out
    }

    /// Lays out and composites `text` in one go.
    pub fn render(&self, text: &str) -> RgbaImage {
        let bb = self.measure(text);
        self.composite(text, &bb)
    }
}

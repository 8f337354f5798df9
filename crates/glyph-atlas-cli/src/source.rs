use std::path::Path;

use anyhow::{Context, anyhow};
use fontdue::{Font, FontSettings, Metrics};
use glyph_atlas_core::model::{GlyphMetrics, RasterGlyph};
use glyph_atlas_core::source::GlyphSource;
use glyph_atlas_core::FontRequest;
use image::{Rgba, RgbaImage};
use tracing::{debug, info};

/// Rasterizes glyphs with fontdue from a face picked through fontdb.
pub struct FontdbSource {
    font: Font,
    px: f32,
}

impl FontdbSource {
    /// Resolves `req` against the installed system fonts.
    pub fn from_system(req: &FontRequest) -> anyhow::Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system font database");

        let families = [fontdb::Family::Name(&req.family)];
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(req.weight),
            ..Default::default()
        };
        let id = db
            .query(&query)
            .ok_or_else(|| anyhow!("no installed font matches family {:?} weight {}", req.family, req.weight))?;
        if let Some(face) = db.face(id) {
            info!(family = ?face.families.first().map(|f| &f.0), weight = face.weight.0, "selected font face");
        }

        let font = db
            .with_face_data(id, |data, index| {
                Font::from_bytes(
                    data,
                    FontSettings {
                        collection_index: index,
                        scale: req.size as f32,
                        ..Default::default()
                    },
                )
            })
            .ok_or_else(|| anyhow!("font data for {:?} is unavailable", req.family))?
            .map_err(|e| anyhow!("parse font {:?}: {e}", req.family))?;
        Ok(Self {
            font,
            px: req.size as f32,
        })
    }

    /// Loads the first face of a font file, ignoring family and weight.
    pub fn from_file(path: &Path, size: u32) -> anyhow::Result<Self> {
        let data = std::fs::read(path).with_context(|| format!("read font {}", path.display()))?;
        let font = Font::from_bytes(
            data,
            FontSettings {
                scale: size as f32,
                ..Default::default()
            },
        )
        .map_err(|e| anyhow!("parse font {}: {e}", path.display()))?;
        info!(?path, "loaded font file");
        Ok(Self {
            font,
            px: size as f32,
        })
    }
}

impl GlyphSource for FontdbSource {
    fn load_glyph(&mut self, code: u32) -> Option<RasterGlyph> {
        let ch = char::from_u32(code)?;
        if self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        to_raster(&metrics, &coverage)
    }
}

/// Converts fontdue output to a white glyph whose alpha and color are the coverage.
///
/// fontdue measures `ymin` from the baseline up to the bitmap's bottom edge;
/// the atlas wants the distance from the baseline up to the top edge.
fn to_raster(m: &Metrics, coverage: &[u8]) -> Option<RasterGlyph> {
    let width = u16::try_from(m.width).ok()?;
    let height = u16::try_from(m.height).ok()?;
    let metrics = GlyphMetrics {
        width,
        height,
        bearing_x: i16::try_from(-m.xmin).ok()?,
        bearing_y: i16::try_from(m.ymin + m.height as i32).ok()?,
        advance_x: m.advance_width.round() as i16,
    };
    if !metrics.has_pixels() {
        return Some(RasterGlyph {
            metrics: GlyphMetrics {
                width: 0,
                height: 0,
                ..metrics
            },
            pixels: None,
        });
    }
    let pixels = RgbaImage::from_fn(m.width as u32, m.height as u32, |x, y| {
        let c = coverage[y as usize * m.width + x as usize];
        Rgba([c, c, c, c])
    });
    Some(RasterGlyph {
        metrics,
        pixels: Some(pixels),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(xmin: i32, ymin: i32, width: usize, height: usize, advance: f32) -> Metrics {
        Metrics {
            xmin,
            ymin,
            width,
            height,
            advance_width: advance,
            ..Default::default()
        }
    }

    #[test]
    fn bearings_follow_the_atlas_convention() {
        // a descender: bitmap reaches 2 px below the baseline
        let g = to_raster(&metrics(1, -2, 3, 7, 6.6), &[128; 21]).unwrap();
        assert_eq!(g.metrics.bearing_x, -1);
        assert_eq!(g.metrics.bearing_y, 5);
        assert_eq!(g.metrics.advance_x, 7);
        let px = g.pixels.unwrap();
        assert_eq!(px.dimensions(), (3, 7));
        assert_eq!(px.get_pixel(2, 6).0, [128; 4]);
    }

    #[test]
    fn blank_glyphs_carry_no_pixels() {
        let g = to_raster(&metrics(0, 0, 0, 0, 4.2), &[]).unwrap();
        assert!(g.pixels.is_none());
        assert_eq!(g.metrics.advance_x, 4);
    }
}

use std::collections::BTreeMap;

use image::RgbaImage;
use tracing::{debug, info, instrument};

use crate::compositing::blit_rows;
use crate::config::AtlasConfig;
use crate::error::{GlyphAtlasError, Result};
use crate::model::{AtlasStats, GlyphRecord, RasterGlyph, Rect};
use crate::packer::{Packer, skyline::ColumnSkyline};
use crate::source::GlyphSource;

/// Number of addressable character codes (`0..=65535`).
pub const CODE_SPACE: u32 = 1 << 16;

/// Bitset over the code space recording which codes were registered.
///
/// Membership is independent of whether a glyph has pixels.
#[derive(Debug, Clone)]
pub struct LoadedSet {
    words: Vec<u64>,
    len: usize,
}

impl LoadedSet {
    pub fn new() -> Self {
        Self {
            words: vec![0; (CODE_SPACE / 64) as usize],
            len: 0,
        }
    }

    /// Returns true if `code` was not present before.
    pub fn insert(&mut self, code: u16) -> bool {
        let (word, bit) = (code as usize >> 6, code & 63);
        let fresh = self.words[word] & (1u64 << bit) == 0;
        self.words[word] |= 1u64 << bit;
        if fresh {
            self.len += 1;
        }
        fresh
    }

    pub fn contains(&self, code: u16) -> bool {
        self.words[code as usize >> 6] & (1u64 << (code & 63)) != 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            (0..64u16)
                .filter(move |&b| w & (1u64 << b) != 0)
                .map(move |b| ((i as u16) << 6) | b)
        })
    }
}

impl Default for LoadedSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the atlas bitmap and the glyph table while glyphs are being imported.
pub struct GlyphRegistry {
    cfg: AtlasConfig,
    packer: ColumnSkyline,
    atlas: RgbaImage,
    glyphs: BTreeMap<u16, GlyphRecord>,
    loaded: LoadedSet,
}

impl GlyphRegistry {
    pub fn new(cfg: AtlasConfig) -> Result<Self> {
        cfg.validate()?;
        let size = cfg.atlas_size;
        Ok(Self {
            packer: ColumnSkyline::new(size),
            atlas: RgbaImage::new(size, size),
            glyphs: BTreeMap::new(),
            loaded: LoadedSet::new(),
            cfg,
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.cfg
    }

    pub fn atlas_size(&self) -> u32 {
        self.cfg.atlas_size
    }

    /// The packed RGBA atlas.
    pub fn atlas(&self) -> &RgbaImage {
        &self.atlas
    }

    pub fn packer(&self) -> &ColumnSkyline {
        &self.packer
    }

    /// Registers `glyph` under `code`.
    ///
    /// Glyphs with pixels get a fresh atlas region; adding a code twice
    /// replaces its record and leaves the old region orphaned. A failed call
    /// leaves the code unloaded. `AtlasFull` is not recoverable for the
    /// import run.
    pub fn add(&mut self, code: u32, glyph: &RasterGlyph) -> Result<()> {
        let key = u16::try_from(code).map_err(|_| GlyphAtlasError::CodeOutOfRange(code))?;
        let m = glyph.metrics;
        let pixels = if m.has_pixels() {
            let img = glyph.pixels.as_ref().ok_or_else(|| GlyphAtlasError::InvalidGlyph {
                code,
                reason: format!("{}x{} glyph without pixels", m.width, m.height),
            })?;
            if img.dimensions() != (m.width as u32, m.height as u32) {
                return Err(GlyphAtlasError::InvalidGlyph {
                    code,
                    reason: format!(
                        "bitmap is {}x{}, metrics say {}x{}",
                        img.width(),
                        img.height(),
                        m.width,
                        m.height
                    ),
                });
            }
            Some(img)
        } else {
            None
        };

        let (u, v) = match pixels {
            Some(img) => {
                let place = self.packer.pack(m.width as u32, m.height as u32)?;
                blit_rows(
                    img,
                    Rect::new(0, 0, place.w, place.h),
                    &mut self.atlas,
                    place.x as i64,
                    place.y as i64,
                );
                (place.x as u16, place.y as u16)
            }
            None => (0, 0),
        };

        self.loaded.insert(key);
        if self.glyphs.insert(key, GlyphRecord::new(key, m, u, v)).is_some() {
            debug!(code, "replaced glyph record");
        }
        Ok(())
    }

    /// Whether `code` has been registered.
    ///
    /// Codes outside the code space always report `true`, so callers that
    /// check before loading never try to add them.
    pub fn is_loaded(&self, code: u32) -> bool {
        match u16::try_from(code) {
            Ok(c) => self.loaded.contains(c),
            Err(_) => true,
        }
    }

    pub fn get(&self, code: u32) -> Option<&GlyphRecord> {
        u16::try_from(code).ok().and_then(|c| self.glyphs.get(&c))
    }

    pub fn loaded(&self) -> &LoadedSet {
        &self.loaded
    }

    /// All loaded glyphs in ascending code order.
    pub fn records(&self) -> impl Iterator<Item = &GlyphRecord> + '_ {
        self.loaded.iter().filter_map(|c| self.glyphs.get(&c))
    }

    /// Loaded glyphs that own atlas pixels, ascending.
    pub fn visible_records(&self) -> impl Iterator<Item = &GlyphRecord> + '_ {
        self.records().filter(|g| g.has_pixels())
    }

    /// Pulls every code of `codes` from `source` that is not loaded yet.
    ///
    /// A code the source cannot produce aborts the import with
    /// `GlyphResolution`. Returns the number of glyphs added.
    #[instrument(skip_all)]
    pub fn import_glyphs<S, I>(&mut self, source: &mut S, codes: I) -> Result<usize>
    where
        S: GlyphSource + ?Sized,
        I: IntoIterator<Item = u32>,
    {
        let mut added = 0;
        for code in codes {
            if self.is_loaded(code) {
                continue;
            }
            let glyph = source
                .load_glyph(code)
                .ok_or(GlyphAtlasError::GlyphResolution { code })?;
            self.add(code, &glyph)?;
            added += 1;
        }
        info!(added, loaded = self.loaded.len(), "imported glyphs");
        Ok(added)
    }

    /// Computes packing statistics for this registry.
    pub fn stats(&self) -> AtlasStats {
        let mut visible_glyphs = 0;
        let mut used_area = 0u64;
        for g in self.visible_records() {
            visible_glyphs += 1;
            used_area += g.width as u64 * g.height as u64;
        }
        let total = self.cfg.atlas_size as u64 * self.cfg.atlas_size as u64;
        AtlasStats {
            atlas_size: self.cfg.atlas_size,
            loaded_glyphs: self.loaded.len(),
            visible_glyphs,
            used_area,
            occupancy: if total > 0 {
                used_area as f64 / total as f64
            } else {
                0.0
            },
            skyline_height: self.packer.max_height(),
        }
    }
}

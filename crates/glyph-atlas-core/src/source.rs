use crate::model::RasterGlyph;

/// Produces rasterized glyphs for character codes.
///
/// This is the seam to a font backend. Returning `None` means the backend has
/// no glyph for `code`; the importer treats that as fatal for requested codes.
pub trait GlyphSource {
    fn load_glyph(&mut self, code: u32) -> Option<RasterGlyph>;
}

impl<F> GlyphSource for F
where
    F: FnMut(u32) -> Option<RasterGlyph>,
{
    fn load_glyph(&mut self, code: u32) -> Option<RasterGlyph> {
        self(code)
    }
}

/// Ordered set of character codes to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSet {
    ranges: Vec<std::ops::RangeInclusive<u32>>,
}

impl CharacterSet {
    pub fn new(ranges: Vec<std::ops::RangeInclusive<u32>>) -> Self {
        Self { ranges }
    }

    /// Printable ASCII followed by the printable ISO-8859-1 upper half.
    pub fn latin1() -> Self {
        Self::new(vec![0x20..=0x7e, 0xa1..=0xff])
    }

    pub fn codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.clone().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CharacterSet {
    fn default() -> Self {
        Self::latin1()
    }
}

//! Core library for packing glyph bitmaps into a bitmap-font atlas and
//! rendering text with it on a terminal.
//!
//! - Packing: per-column skyline allocator into one fixed-size square RGBA atlas
//! - Registry: glyph table keyed by character code, fed by a `GlyphSource`
//! - Codec: compact little-endian binary stream, plus C source and JSON dumps
//! - Rendering: glyph lookup, string layout, compositing and ANSI quantization
//!
//! Quick example:
//! ```ignore
//! use glyph_atlas_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = GlyphRegistry::new(AtlasConfig::default())?;
//! registry.import_glyphs(&mut my_source, CharacterSet::latin1().codes())?;
//! let mut stream = Vec::new();
//! write_binary(&registry, &mut stream)?;
//!
//! let font = read_binary(&mut stream.as_slice(), DEFAULT_MAX_RECORDS)?;
//! write_ansi(&font.render("Hello"), &mut std::io::stdout(), true)?;
//! # Ok(()) }
//! ```

pub mod ansi;
pub mod codec;
pub mod compositing;
pub mod config;
pub mod error;
pub mod font;
pub mod model;
pub mod packer;
pub mod registry;
pub mod source;

pub use config::*;
pub use error::*;
pub use model::*;

/// Convenience prelude for common types and functions.
/// Importing `glyph_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::ansi::{AnsiCell, quantize, write_ansi};
    pub use crate::codec::{export, read_binary, read_font, to_json, write_binary, write_source};
    pub use crate::config::{
        AtlasConfig, AtlasConfigBuilder, DEFAULT_ATLAS_SIZE, DEFAULT_MAX_RECORDS, ExportFormat,
        FontRequest,
    };
    pub use crate::error::{GlyphAtlasError, Result};
    pub use crate::font::AtlasFont;
    pub use crate::model::{
        AtlasStats, BoundingBox, GlyphMetrics, GlyphRecord, RasterGlyph, Rect,
    };
    pub use crate::packer::{Packer, skyline::ColumnSkyline};
    pub use crate::registry::{GlyphRegistry, LoadedSet};
    pub use crate::source::{CharacterSet, GlyphSource};
}

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GlyphAtlasError;

/// Side length of the square atlas used by the importer.
pub const DEFAULT_ATLAS_SIZE: u32 = 512;
/// Largest side length representable in the stream header (`int16`).
pub const MAX_ATLAS_SIZE: u32 = i16::MAX as u32;
/// Number of glyph records a renderer reads before it stops.
pub const DEFAULT_MAX_RECORDS: usize = 256;

/// Output formats understood by the exporter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Little-endian binary stream consumed by the renderer.
    Binary,
    /// C source listing: a 256-entry glyph table and the raw atlas bytes.
    #[serde(rename = "c")]
    CSource,
    /// JSON glyph table (debug aid; the atlas itself is not embedded).
    Json,
}

impl FromStr for ExportFormat {
    type Err = GlyphAtlasError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "c" => Ok(Self::CSource),
            "json" => Ok(Self::Json),
            _ => Err(GlyphAtlasError::UnknownExportFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Side length of the square atlas in pixels.
    #[serde(default = "default_atlas_size")]
    pub atlas_size: u32,
    /// Maximum number of glyph records read back from a binary stream.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Also write records for loaded glyphs without pixels (e.g. space), so a
    /// renderer can still advance the pen past them. Off by default to keep the
    /// stream identical to what older readers expect.
    #[serde(default)]
    pub emit_empty_glyphs: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            atlas_size: default_atlas_size(),
            max_records: default_max_records(),
            emit_empty_glyphs: false,
        }
    }
}

impl AtlasConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if the atlas side is zero or does not fit the
    /// `int16` stream header, or if no glyph records could ever be read.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.atlas_size == 0 || self.atlas_size > MAX_ATLAS_SIZE {
            return Err(GlyphAtlasError::InvalidDimensions {
                size: self.atlas_size,
            });
        }
        if self.max_records == 0 {
            return Err(GlyphAtlasError::InvalidConfig(
                "max_records must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

fn default_atlas_size() -> u32 {
    DEFAULT_ATLAS_SIZE
}
fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn atlas_size(mut self, v: u32) -> Self {
        self.cfg.atlas_size = v;
        self
    }
    pub fn max_records(mut self, v: usize) -> Self {
        self.cfg.max_records = v;
        self
    }
    pub fn emit_empty_glyphs(mut self, v: bool) -> Self {
        self.cfg.emit_empty_glyphs = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

/// Font selection handed to a glyph source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FontRequest {
    pub family: String,
    /// Pixel size.
    pub size: u32,
    /// CSS-style weight (100..=900 is typical).
    pub weight: u16,
}

impl Default for FontRequest {
    fn default() -> Self {
        Self {
            family: "DejaVu Sans".into(),
            size: 13,
            weight: 200,
        }
    }
}

impl FontRequest {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.size == 0 {
            return Err(GlyphAtlasError::InvalidConfig(format!(
                "Invalid size {}. Expected positive integer",
                self.size
            )));
        }
        if self.weight == 0 {
            return Err(GlyphAtlasError::InvalidConfig(format!(
                "Invalid weight {}. Expected positive integer",
                self.weight
            )));
        }
        Ok(())
    }
}

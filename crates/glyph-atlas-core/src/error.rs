use thiserror::Error;

#[derive(Debug, Error)]
pub enum GlyphAtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to get glyph for character {code}")]
    GlyphResolution { code: u32 },
    #[error("Atlas is full: no room for glyph of size {width}x{height}")]
    AtlasFull { width: u32, height: u32 },
    #[error("Malformed font stream: {0}")]
    MalformedStream(String),
    #[error("Unknown export format: {0}")]
    UnknownExportFormat(String),
    #[error("Character code {0} is outside 0..=65535")]
    CodeOutOfRange(u32),
    #[error("Invalid atlas size {size}: expected 1..=32767")]
    InvalidDimensions { size: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid glyph for character {code}: {reason}")]
    InvalidGlyph { code: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, GlyphAtlasError>;

//! Serialization of a packed glyph atlas.
//!
//! The binary stream is little-endian throughout:
//!
//! | field              | encoding                                   |
//! |--------------------|--------------------------------------------|
//! | atlas size `S`     | `int16`                                    |
//! | atlas bitmap       | `S * S` RGBA texels, row-major, no padding |
//! | glyph records      | 8 x `int16` each, ascending by code        |
//!
//! A record is `code, advanceX, width, height, bearingX, bearingY, u, v`.
//! Only loaded glyphs with pixels are written unless
//! [`AtlasConfig::emit_empty_glyphs`](crate::config::AtlasConfig) is set, in
//! which case pixel-less glyphs follow the same layout with zero size and
//! zero atlas coordinates.

use std::io::{self, Read, Write};

use image::RgbaImage;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::config::{AtlasConfig, ExportFormat};
use crate::error::{GlyphAtlasError, Result};
use crate::font::AtlasFont;
use crate::model::GlyphRecord;
use crate::registry::GlyphRegistry;

/// Size of one glyph record on the wire.
pub const RECORD_LEN: usize = 8 * 2;
/// Number of table entries in the C source listing.
pub const SOURCE_TABLE_LEN: usize = 256;

const BYTES_PER_LINE: usize = 12;

pub fn write_i16<W: Write + ?Sized>(w: &mut W, v: i16) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_u16<W: Write + ?Sized>(w: &mut W, v: u16) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn read_i16<R: Read + ?Sized>(r: &mut R) -> io::Result<i16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

/// Writes `registry` in `format`.
pub fn export<W: Write + ?Sized>(registry: &GlyphRegistry, format: ExportFormat, w: &mut W) -> Result<()> {
    match format {
        ExportFormat::Binary => write_binary(registry, w),
        ExportFormat::CSource => write_source(registry, w),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut *w, &to_json(registry))
                .map_err(|e| GlyphAtlasError::Io(e.into()))?;
            w.write_all(b"\n")?;
            Ok(())
        }
    }
}

fn write_record<W: Write + ?Sized>(w: &mut W, g: &GlyphRecord) -> io::Result<()> {
    write_u16(w, g.code)?;
    write_i16(w, g.advance_x)?;
    write_u16(w, g.width)?;
    write_u16(w, g.height)?;
    write_i16(w, g.bearing_x)?;
    write_i16(w, g.bearing_y)?;
    write_u16(w, g.atlas_u)?;
    write_u16(w, g.atlas_v)
}

fn decode_record(buf: &[u8; RECORD_LEN]) -> GlyphRecord {
    let u = |i: usize| u16::from_le_bytes([buf[i * 2], buf[i * 2 + 1]]);
    let s = |i: usize| i16::from_le_bytes([buf[i * 2], buf[i * 2 + 1]]);
    GlyphRecord {
        code: u(0),
        advance_x: s(1),
        width: u(2),
        height: u(3),
        bearing_x: s(4),
        bearing_y: s(5),
        atlas_u: u(6),
        atlas_v: u(7),
    }
}

/// Writes the binary stream consumed by [`read_binary`].
#[instrument(skip_all)]
pub fn write_binary<W: Write + ?Sized>(registry: &GlyphRegistry, w: &mut W) -> Result<()> {
    let size = registry.atlas_size();
    let header = i16::try_from(size).map_err(|_| GlyphAtlasError::InvalidDimensions { size })?;
    write_i16(w, header)?;
    w.write_all(registry.atlas().as_raw())?;

    let with_empty = registry.config().emit_empty_glyphs;
    let mut records = 0usize;
    for g in registry.records().filter(|g| with_empty || g.has_pixels()) {
        if g.has_pixels() {
            write_record(w, g)?;
        } else {
            write_record(
                w,
                &GlyphRecord {
                    width: 0,
                    height: 0,
                    atlas_u: 0,
                    atlas_v: 0,
                    ..*g
                },
            )?;
        }
        records += 1;
    }
    w.flush()?;
    info!(atlas_size = size, records, "binary font written");
    Ok(())
}

/// Fills `buf` completely or up to end of stream; returns the byte count read.
fn read_full<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads a binary stream produced by [`write_binary`].
///
/// Records are read until end of stream or until `max_records` have been
/// read, whichever comes first. A truncated header, bitmap or record is an
/// error. Record order is taken as written: the producer emits ascending
/// codes and lookups rely on it.
#[instrument(skip_all)]
pub fn read_binary<R: Read + ?Sized>(r: &mut R, max_records: usize) -> Result<AtlasFont> {
    let mut header = [0u8; 2];
    if read_full(r, &mut header)? != header.len() {
        return Err(GlyphAtlasError::MalformedStream("truncated header".into()));
    }
    let size = i16::from_le_bytes(header);
    if size <= 0 {
        return Err(GlyphAtlasError::MalformedStream(format!(
            "atlas size {size} is not positive"
        )));
    }
    let size = size as u32;

    let expected = size as usize * size as usize * 4;
    // the header is untrusted; grow with the bytes actually present
    let mut texels = Vec::new();
    let got = (&mut *r).take(expected as u64).read_to_end(&mut texels)?;
    if got != expected {
        return Err(GlyphAtlasError::MalformedStream(format!(
            "truncated atlas bitmap: expected {expected} bytes, got {got}"
        )));
    }
    let bitmap = RgbaImage::from_raw(size, size, texels).ok_or_else(|| {
        GlyphAtlasError::MalformedStream("atlas bitmap does not match its size".into())
    })?;

    let mut glyphs = Vec::new();
    let mut buf = [0u8; RECORD_LEN];
    while glyphs.len() < max_records {
        match read_full(r, &mut buf)? {
            0 => break,
            RECORD_LEN => glyphs.push(decode_record(&buf)),
            n => {
                return Err(GlyphAtlasError::MalformedStream(format!(
                    "truncated glyph record {}: {n} of {RECORD_LEN} bytes",
                    glyphs.len()
                )));
            }
        }
    }
    info!(atlas_size = size, records = glyphs.len(), "binary font read");
    Ok(AtlasFont::from_parts(bitmap, glyphs))
}

/// Reads a binary stream with the record cap of `cfg`.
pub fn read_font<R: Read + ?Sized>(r: &mut R, cfg: &AtlasConfig) -> Result<AtlasFont> {
    cfg.validate()?;
    read_binary(r, cfg.max_records)
}

/// Writes a C source listing of the first 256 codes and the raw atlas.
///
/// Codes that are unloaded or have no pixels become all-zero entries. This is
/// an embedding aid; nothing reads it back.
pub fn write_source<W: Write + ?Sized>(registry: &GlyphRegistry, w: &mut W) -> Result<()> {
    let size = registry.atlas_size();
    writeln!(w, "#include <stdint.h>")?;
    writeln!(w)?;
    writeln!(w, "#define GLYPH_ATLAS_SIZE {size}")?;
    writeln!(w)?;
    writeln!(w, "struct glyph_Info")?;
    writeln!(w, "{{")?;
    writeln!(w, "  int16_t xOffset;")?;
    writeln!(w, "  int16_t width, height;")?;
    writeln!(w, "  int16_t x, y;")?;
    writeln!(w, "  int16_t u, v;")?;
    writeln!(w, "}};")?;
    writeln!(w)?;
    writeln!(w, "static const struct glyph_Info glyph_table[{SOURCE_TABLE_LEN}] =")?;
    writeln!(w, "{{")?;
    for code in 0..SOURCE_TABLE_LEN as u32 {
        let g = registry
            .get(code)
            .filter(|g| g.has_pixels())
            .copied()
            .unwrap_or_default();
        writeln!(
            w,
            "  {{ {}, {}, {}, {}, {}, {}, {} }},",
            g.advance_x, g.width, g.height, g.bearing_x, g.bearing_y, g.atlas_u, g.atlas_v
        )?;
    }
    writeln!(w, "}};")?;
    writeln!(w)?;
    writeln!(w, "static const uint8_t glyph_atlas[] =")?;
    writeln!(w, "{{")?;
    for line in registry.atlas().as_raw().chunks(BYTES_PER_LINE) {
        write!(w, " ")?;
        for b in line {
            write!(w, " 0x{b:02x},")?;
        }
        writeln!(w)?;
    }
    writeln!(w, "}};")?;
    w.flush()?;
    Ok(())
}

/// Glyph table as JSON: `{ atlasSize, glyphs: [ { code, advanceX, width, height, bearingX, bearingY, u, v } ] }`.
///
/// Includes every loaded glyph, with or without pixels.
pub fn to_json(registry: &GlyphRegistry) -> Value {
    let glyphs: Vec<Value> = registry
        .records()
        .map(|g| {
            json!({
                "code": g.code,
                "advanceX": g.advance_x,
                "width": g.width,
                "height": g.height,
                "bearingX": g.bearing_x,
                "bearingY": g.bearing_y,
                "u": g.atlas_u,
                "v": g.atlas_v,
            })
        })
        .collect();
    json!({
        "atlasSize": registry.atlas_size(),
        "stats": registry.stats(),
        "glyphs": glyphs,
    })
}

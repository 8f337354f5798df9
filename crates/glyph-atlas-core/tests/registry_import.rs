mod common;

use common::patterned;
use glyph_atlas_core::prelude::*;

fn registry(size: u32) -> GlyphRegistry {
    GlyphRegistry::new(AtlasConfig::builder().atlas_size(size).build()).expect("registry")
}

#[test]
fn visible_glyph_is_blitted_at_its_placement() {
    let mut reg = registry(64);
    reg.add('A' as u32, &patterned('A' as u32, 8, 10, 1, 9, 9)).unwrap();
    reg.add('B' as u32, &patterned('B' as u32, 6, 4, 0, 4, 7)).unwrap();

    let b = *reg.get('B' as u32).expect("B loaded");
    assert_eq!((b.atlas_u, b.atlas_v), (8, 0));
    assert_eq!((b.width, b.height, b.bearing_x, b.bearing_y, b.advance_x), (6, 4, 0, 4, 7));
    for y in 0..4 {
        for x in 0..6 {
            let px = reg.atlas().get_pixel(8 + x, y);
            assert_eq!(px.0, [x as u8, y as u8, b'B', 255]);
        }
    }
    assert!(reg.is_loaded('A' as u32));
    assert!(!reg.is_loaded('C' as u32));
}

#[test]
fn zero_size_glyph_is_loaded_without_allocation() {
    let mut reg = registry(32);
    reg.add(' ' as u32, &RasterGlyph::empty(4)).unwrap();
    assert!(reg.is_loaded(' ' as u32));
    let space = reg.get(' ' as u32).expect("space");
    assert_eq!(space.advance_x, 4);
    assert!(!space.has_pixels());
    assert_eq!(reg.packer().max_height(), 0);
    assert_eq!(reg.visible_records().count(), 0);
    assert_eq!(reg.records().count(), 1);
}

#[test]
fn out_of_range_codes_report_loaded_and_cannot_be_added() {
    let mut reg = registry(32);
    assert!(reg.is_loaded(0x1_0000));
    assert!(!reg.is_loaded(0xffff));
    match reg.add(0x1_0000, &RasterGlyph::empty(1)) {
        Err(GlyphAtlasError::CodeOutOfRange(code)) => assert_eq!(code, 0x1_0000),
        other => panic!("expected CodeOutOfRange, got {other:?}"),
    }
    reg.add(0xffff, &RasterGlyph::empty(1)).unwrap();
    assert!(reg.is_loaded(0xffff));
}

#[test]
fn re_adding_a_code_takes_a_new_region() {
    let mut reg = registry(32);
    reg.add(65, &patterned(1, 4, 4, 0, 4, 5)).unwrap();
    reg.add(65, &patterned(2, 4, 4, 0, 4, 5)).unwrap();
    let rec = reg.get(65).unwrap();
    assert_eq!((rec.atlas_u, rec.atlas_v), (4, 0));
    // the first region keeps its bytes
    assert_eq!(reg.atlas().get_pixel(0, 0).0, [0, 0, 1, 255]);
    assert_eq!(reg.atlas().get_pixel(4, 0).0, [0, 0, 2, 255]);
    assert_eq!(reg.loaded().len(), 1);
}

#[test]
fn mismatched_bitmap_is_rejected_before_loading() {
    let mut reg = registry(32);
    let mut glyph = patterned(1, 4, 4, 0, 4, 5);
    glyph.metrics.width = 5;
    assert!(matches!(
        reg.add(66, &glyph),
        Err(GlyphAtlasError::InvalidGlyph { code: 66, .. })
    ));
    glyph.pixels = None;
    assert!(reg.add(66, &glyph).is_err());
    assert!(!reg.is_loaded(66));
}

#[test]
fn atlas_overflow_is_fatal() {
    let mut reg = registry(16);
    reg.add(1, &patterned(1, 16, 12, 0, 0, 16)).unwrap();
    match reg.add(2, &patterned(2, 4, 5, 0, 0, 4)) {
        Err(GlyphAtlasError::AtlasFull { width, height }) => assert_eq!((width, height), (4, 5)),
        other => panic!("expected AtlasFull, got {other:?}"),
    }
    // the failed code stays unloaded, so a retry reports the same error
    assert!(!reg.is_loaded(2));
    assert!(reg.get(2).is_none());
    let mut source = |code: u32| Some(patterned(code, 4, 5, 0, 0, 4));
    assert!(matches!(
        reg.import_glyphs(&mut source, [2]),
        Err(GlyphAtlasError::AtlasFull { width: 4, height: 5 })
    ));
    assert_eq!(reg.loaded().len(), 1);
}

#[test]
fn import_pulls_each_missing_code_once() {
    let mut reg = registry(128);
    let mut calls = Vec::new();
    let mut source = |code: u32| {
        calls.push(code);
        if code == ' ' as u32 {
            Some(RasterGlyph::empty(3))
        } else {
            Some(patterned(code, 3, 5, 0, 5, 4))
        }
    };
    let added = reg
        .import_glyphs(&mut source, [' ' as u32, 'a' as u32, 'a' as u32, 0x2_0000])
        .unwrap();
    assert_eq!(added, 2);
    assert_eq!(calls, vec![' ' as u32, 'a' as u32]);

    let stats = reg.stats();
    assert_eq!(stats.loaded_glyphs, 2);
    assert_eq!(stats.visible_glyphs, 1);
    assert_eq!(stats.used_area, 15);
    assert_eq!(stats.skyline_height, 5);
}

#[test]
fn import_fails_on_unresolvable_code() {
    let mut reg = registry(64);
    let mut source = |code: u32| (code != 'z' as u32).then(|| patterned(code, 2, 2, 0, 2, 3));
    match reg.import_glyphs(&mut source, CharacterSet::latin1().codes()) {
        Err(GlyphAtlasError::GlyphResolution { code }) => assert_eq!(code, 'z' as u32),
        other => panic!("expected GlyphResolution, got {other:?}"),
    }
    assert!(reg.is_loaded('y' as u32));
}

#[test]
fn latin1_import_fits_default_atlas() {
    let mut reg = GlyphRegistry::new(AtlasConfig::default()).unwrap();
    let mut source = |code: u32| {
        if code == ' ' as u32 || code == 0xa0 {
            Some(RasterGlyph::empty(4))
        } else {
            Some(patterned(code, 9, 14, 1, 11, 10))
        }
    };
    let added = reg
        .import_glyphs(&mut source, CharacterSet::latin1().codes())
        .unwrap();
    assert_eq!(added, 190);
    assert_eq!(reg.visible_records().count(), 189);
    let codes: Vec<u16> = reg.records().map(|g| g.code).collect();
    assert!(codes.windows(2).all(|w| w[0] < w[1]));
}

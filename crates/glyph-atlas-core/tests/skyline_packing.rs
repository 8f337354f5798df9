use glyph_atlas_core::error::GlyphAtlasError;
use glyph_atlas_core::model::Rect;
use glyph_atlas_core::packer::Packer;
use glyph_atlas_core::packer::skyline::ColumnSkyline;
use rand::{Rng, SeedableRng};

fn random_sizes(seed: u64, count: usize) -> Vec<(u32, u32)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.gen_range(1..=24), rng.gen_range(1..=32)))
        .collect()
}

fn pack_all(size: u32, sizes: &[(u32, u32)]) -> Vec<Rect> {
    let mut sky = ColumnSkyline::new(size);
    let mut placed = Vec::new();
    for &(w, h) in sizes {
        match sky.pack(w, h) {
            Ok(r) => placed.push(r),
            Err(_) => break,
        }
    }
    placed
}

#[test]
fn placements_are_disjoint_and_inside_the_atlas() {
    let size = 256;
    let placed = pack_all(size, &random_sizes(42, 200));
    assert!(!placed.is_empty());
    for (i, a) in placed.iter().enumerate() {
        assert!(a.x2() <= size && a.y2() <= size, "{a:?} leaves the atlas");
        for b in &placed[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn placements_are_repeatable() {
    let sizes = random_sizes(7, 150);
    let first = pack_all(256, &sizes);
    let second = pack_all(256, &sizes);
    assert_eq!(first, second);
}

#[test]
fn placements_keep_requested_sizes() {
    let sizes = random_sizes(3, 60);
    let placed = pack_all(512, &sizes);
    assert_eq!(placed.len(), sizes.len());
    for (r, &(w, h)) in placed.iter().zip(&sizes) {
        assert_eq!((r.w, r.h), (w, h));
    }
}

#[test]
fn order_changes_the_layout() {
    let a = pack_all(16, &[(8, 4), (16, 2)]);
    let b = pack_all(16, &[(16, 2), (8, 4)]);
    assert_eq!(a[1], Rect::new(0, 4, 16, 2));
    assert_eq!(b[1], Rect::new(0, 2, 8, 4));
}

#[test]
fn exhaustion_reports_size_and_keeps_state() {
    let mut sky = ColumnSkyline::new(32);
    // fill three rows of 10-high glyphs
    while sky.can_pack(8, 10) {
        sky.pack(8, 10).expect("fits");
    }
    let heights = sky.column_heights().to_vec();
    assert_eq!(sky.max_height(), 30);
    match sky.pack(8, 10) {
        Err(GlyphAtlasError::AtlasFull { width, height }) => assert_eq!((width, height), (8, 10)),
        other => panic!("expected AtlasFull, got {other:?}"),
    }
    assert_eq!(sky.column_heights(), &heights[..]);
    // a shorter glyph still fits in the remaining band
    assert_eq!(sky.pack(32, 2).expect("fits"), Rect::new(0, 30, 32, 2));
}

#[test]
fn glyph_wider_than_the_atlas_never_fits() {
    let mut sky = ColumnSkyline::new(16);
    assert!(matches!(
        sky.pack(17, 1),
        Err(GlyphAtlasError::AtlasFull { width: 17, height: 1 })
    ));
    assert!(sky.column_heights().iter().all(|&t| t == 0));
}

#[test]
fn huge_height_fails_instead_of_overflowing() {
    let mut sky = ColumnSkyline::new(16);
    sky.pack(16, 5).expect("fits");
    assert!(matches!(
        sky.pack(1, u32::MAX),
        Err(GlyphAtlasError::AtlasFull { width: 1, height: u32::MAX })
    ));
    assert!(!sky.can_pack(16, u32::MAX - 4));
    assert!(sky.column_heights().iter().all(|&t| t == 5));
}

use super::Packer;
use crate::error::{GlyphAtlasError, Result};
use crate::model::Rect;
use tracing::debug;

/// Per-column skyline allocator.
///
/// Keeps, for every atlas column, the first row that is still free. A request
/// of `w x h` is placed at the column range whose tallest column is lowest;
/// ties go to the leftmost range. Placement is greedy and online: earlier
/// glyphs are never moved, so the result depends on request order.
#[derive(Debug, Clone)]
pub struct ColumnSkyline {
    size: u32,
    top: Vec<u32>,
}

impl ColumnSkyline {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            top: vec![0; size as usize],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Lowest unused row of every column.
    pub fn column_heights(&self) -> &[u32] {
        &self.top
    }

    /// Highest occupied row over all columns.
    pub fn max_height(&self) -> u32 {
        self.top.iter().copied().max().unwrap_or(0)
    }

    fn find(&self, w: u32, h: u32) -> Option<Rect> {
        if w == 0 || h == 0 || w > self.size {
            return None;
        }
        let w = w as usize;
        let mut best_u: Option<usize> = None;
        let mut best_v = self.size;
        for u in 0..=(self.top.len() - w) {
            let mut v_max = self.top[u];
            for k in 1..w {
                // cannot beat the current best any more
                if v_max >= best_v {
                    break;
                }
                v_max = v_max.max(self.top[u + k]);
            }
            if v_max < best_v {
                best_v = v_max;
                best_u = Some(u);
            }
        }
        let u = best_u?;
        if best_v.checked_add(h).is_none_or(|bottom| bottom > self.size) {
            return None;
        }
        Some(Rect::new(u as u32, best_v, w as u32, h))
    }

    fn commit(&mut self, rect: &Rect) {
        let new_top = rect.y2();
        for t in &mut self.top[rect.x as usize..rect.x2() as usize] {
            *t = new_top;
        }
    }
}

impl Packer for ColumnSkyline {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        self.find(w, h).is_some()
    }

    fn pack(&mut self, w: u32, h: u32) -> Result<Rect> {
        let rect = self
            .find(w, h)
            .ok_or(GlyphAtlasError::AtlasFull { width: w, height: h })?;
        self.commit(&rect);
        debug!(x = rect.x, y = rect.y, w, h, "placed glyph");
        Ok(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_glyph_lands_at_origin() {
        let mut sky = ColumnSkyline::new(16);
        assert_eq!(sky.pack(4, 3).unwrap(), Rect::new(0, 0, 4, 3));
        assert_eq!(&sky.column_heights()[..5], &[3, 3, 3, 3, 0]);
    }

    #[test]
    fn picks_lowest_range_then_leftmost() {
        let mut sky = ColumnSkyline::new(8);
        sky.pack(3, 5).unwrap();
        sky.pack(2, 1).unwrap(); // lands at x=3, y=0
        // columns: [5,5,5,1,1,0,0,0]; a 3-wide glyph fits lowest at x=5
        assert_eq!(sky.pack(3, 2).unwrap(), Rect::new(5, 0, 3, 2));
        // columns: [5,5,5,1,1,2,2,2]; a 2-wide glyph fits lowest at x=3
        assert_eq!(sky.pack(2, 2).unwrap(), Rect::new(3, 1, 2, 2));
    }

    #[test]
    fn failed_request_leaves_columns_untouched() {
        let mut sky = ColumnSkyline::new(8);
        sky.pack(8, 6).unwrap();
        let before = sky.column_heights().to_vec();
        match sky.pack(1, 3) {
            Err(GlyphAtlasError::AtlasFull { width: 1, height: 3 }) => {}
            other => panic!("expected AtlasFull, got {other:?}"),
        }
        assert_eq!(sky.column_heights(), &before[..]);
        assert!(!sky.can_pack(9, 1));
        assert!(sky.can_pack(8, 2));
    }

    #[test]
    fn glyph_filling_the_atlas_exactly_fits() {
        let mut sky = ColumnSkyline::new(4);
        assert_eq!(sky.pack(4, 4).unwrap(), Rect::new(0, 0, 4, 4));
        assert_eq!(sky.max_height(), 4);
        assert!(!sky.can_pack(1, 1));
    }
}

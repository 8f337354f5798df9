use crate::error::Result;
use crate::model::Rect;

pub mod skyline;

/// An allocator places glyph rectangles into a fixed-size atlas.
///
/// Implementations must never return overlapping rectangles and must leave
/// their state untouched when a request fails.
pub trait Packer {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, w: u32, h: u32) -> Result<Rect>;
}

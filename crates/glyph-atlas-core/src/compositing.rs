use image::RgbaImage;

use crate::model::Rect;

const TEXEL: usize = 4;

/// Copy the sub-rectangle `src_rect` of `src` into `canvas` with its top-left
/// corner at `(dx, dy)`, row by row. Texels are overwritten, never blended.
///
/// The copy is clipped to both images; the return value is `false` when any
/// part of the rectangle had to be dropped.
pub fn blit_rows(src: &RgbaImage, src_rect: Rect, canvas: &mut RgbaImage, dx: i64, dy: i64) -> bool {
    let (sw, sh) = src.dimensions();
    let (cw, ch) = canvas.dimensions();

    // clip against the source
    let x0 = src_rect.x.min(sw);
    let y0 = src_rect.y.min(sh);
    let x1 = src_rect.x2().min(sw);
    let y1 = src_rect.y2().min(sh);
    let mut complete = x0 == src_rect.x && y0 == src_rect.y && x1 == src_rect.x2() && y1 == src_rect.y2();

    // clip against the canvas, in canvas coordinates
    let left = dx.max(0);
    let top = dy.max(0);
    let right = (dx + (x1 - x0) as i64).min(cw as i64);
    let bottom = (dy + (y1 - y0) as i64).min(ch as i64);
    if right <= left || bottom <= top {
        return src_rect.is_empty();
    }
    if left != dx || top != dy || right != dx + (x1 - x0) as i64 || bottom != dy + (y1 - y0) as i64 {
        complete = false;
    }

    let row_len = (right - left) as usize * TEXEL;
    let src_x = x0 as usize + (left - dx) as usize;
    let src_stride = sw as usize * TEXEL;
    let dst_stride = cw as usize * TEXEL;
    let src_buf: &[u8] = src.as_raw();
    let dst_buf: &mut [u8] = canvas;
    for y in top..bottom {
        let sy = y0 as usize + (y - dy) as usize;
        let s = sy * src_stride + src_x * TEXEL;
        let d = y as usize * dst_stride + left as usize * TEXEL;
        dst_buf[d..d + row_len].copy_from_slice(&src_buf[s..s + row_len]);
    }
    complete
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn copies_sub_rect_verbatim() {
        let src = checker(8, 8);
        let mut canvas = RgbaImage::new(4, 4);
        assert!(blit_rows(&src, Rect::new(2, 3, 2, 2), &mut canvas, 1, 1));
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([2, 3, 7, 255]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([3, 4, 7, 255]));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*canvas.get_pixel(3, 3), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn clips_at_negative_offsets() {
        let src = checker(4, 4);
        let mut canvas = RgbaImage::new(3, 3);
        assert!(!blit_rows(&src, Rect::new(0, 0, 4, 4), &mut canvas, -1, -2));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([1, 2, 7, 255]));
        assert_eq!(*canvas.get_pixel(2, 1), Rgba([3, 3, 7, 255]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn source_overrun_is_reported() {
        let src = checker(4, 4);
        let mut canvas = RgbaImage::new(8, 8);
        assert!(!blit_rows(&src, Rect::new(2, 2, 4, 4), &mut canvas, 0, 0));
        assert_eq!(*canvas.get_pixel(1, 1), Rgba([3, 3, 7, 255]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgba([0, 0, 0, 0]));
    }
}

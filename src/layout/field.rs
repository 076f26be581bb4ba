use super::error::PackError;
use super::mask::{BitGrid, WordMask};
use super::types::{Canvas, PixelRect};
use crate::config::DilationShape;

/// Canvas-sized occupancy bitmap shared by every word of one packing session.
///
/// `commit` is the only mutator; `collides` never changes the field.
#[derive(Debug, Clone)]
pub struct CollisionField {
    grid: BitGrid,
    margin: usize,
    dilation: usize,
    shape: DilationShape,
}

impl CollisionField {
    pub fn new(canvas: &Canvas, margin: usize, dilation: usize, shape: DilationShape) -> Self {
        Self {
            grid: BitGrid::new(canvas.pixel_width(), canvas.pixel_height()),
            margin,
            dilation,
            shape,
        }
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    pub fn dilation(&self) -> usize {
        self.dilation
    }

    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.grid.get_xy(x, y)
    }

    pub fn occupied_count(&self) -> usize {
        self.grid.count_ones()
    }

    /// Rectangles touching the right/bottom margin band or starting left of or
    /// above the origin are out of bounds.
    pub fn is_out_of_bounds(&self, rect: &PixelRect) -> bool {
        rect.right() >= self.width() as i64 - self.margin as i64
            || rect.bottom() >= self.height() as i64 - self.margin as i64
            || rect.x < 0
            || rect.y < 0
    }

    /// Whether a mask of this size has any in-bounds origin at all.
    pub fn can_ever_fit(&self, mask: &WordMask) -> bool {
        !self.is_out_of_bounds(&PixelRect::new(0, 0, mask.width(), mask.height()))
    }

    pub fn collides(&self, mask: &WordMask, x: i64, y: i64) -> bool {
        let rect = PixelRect::new(x, y, mask.width(), mask.height());
        if self.is_out_of_bounds(&rect) {
            return true;
        }
        let Some(first) = mask.first_set() else {
            return false;
        };

        let mask_width = mask.width();
        let field_width = self.width();
        let origin = y as usize * field_width + x as usize;
        let bits = mask.bits();

        // Walk the mask row-major; the field index advances in lockstep and
        // jumps by the field stride whenever the mask wraps to its next row.
        let mut row = first / mask_width;
        let mut col = first % mask_width;
        let mut field_idx = origin + row * field_width + col;
        let mut mask_idx = first;
        let total = bits.len();
        while mask_idx < total {
            if bits.get(mask_idx) && self.grid.get(field_idx) {
                return true;
            }
            mask_idx += 1;
            col += 1;
            if col == mask_width {
                col = 0;
                row += 1;
                field_idx = origin + row * field_width;
            } else {
                field_idx += 1;
            }
        }
        false
    }

    /// Mark the mask's opaque pixels, plus the dilation buffer around each, as
    /// occupied. Buffer pixels falling outside the field are clipped.
    pub fn commit(&mut self, mask: &WordMask, x: i64, y: i64) -> Result<(), PackError> {
        let rect = PixelRect::new(x, y, mask.width(), mask.height());
        if x < 0
            || y < 0
            || rect.right() > self.width() as i64
            || rect.bottom() > self.height() as i64
        {
            return Err(PackError::OutOfBounds {
                x,
                y,
                width: mask.width(),
                height: mask.height(),
                field_width: self.width(),
                field_height: self.height(),
            });
        }

        let mask_width = mask.width();
        let (ox, oy) = (x as usize, y as usize);
        let radius = self.dilation as i64;
        let (fw, fh) = (self.width() as i64, self.height() as i64);
        for idx in mask.bits().iter_ones() {
            let fx = (ox + idx % mask_width) as i64;
            let fy = (oy + idx / mask_width) as i64;
            if radius == 0 {
                self.grid.set_xy(fx as usize, fy as usize);
                continue;
            }
            for dy in -radius..=radius {
                let py = fy + dy;
                if py < 0 || py >= fh {
                    continue;
                }
                let reach = match self.shape {
                    DilationShape::Square => radius,
                    DilationShape::Diamond => radius - dy.abs(),
                };
                for dx in -reach..=reach {
                    let px = fx + dx;
                    if px < 0 || px >= fw {
                        continue;
                    }
                    self.grid.set_xy(px as usize, py as usize);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: f64, height: f64) -> CollisionField {
        CollisionField::new(
            &Canvas::new(width, height).unwrap(),
            2,
            0,
            DilationShape::Square,
        )
    }

    #[test]
    fn out_of_bounds_includes_margin_band() {
        let field = field(100.0, 100.0);
        assert!(!field.is_out_of_bounds(&PixelRect::new(0, 0, 10, 10)));
        assert!(!field.is_out_of_bounds(&PixelRect::new(87, 87, 10, 10)));
        assert!(field.is_out_of_bounds(&PixelRect::new(88, 0, 10, 10)));
        assert!(field.is_out_of_bounds(&PixelRect::new(0, 88, 10, 10)));
        assert!(field.is_out_of_bounds(&PixelRect::new(-1, 0, 10, 10)));
        assert!(field.is_out_of_bounds(&PixelRect::new(0, -1, 10, 10)));
    }

    #[test]
    fn collides_reports_out_of_bounds_as_collision() {
        let field = field(20.0, 20.0);
        let mask = WordMask::filled(30, 30).unwrap();
        assert!(!field.can_ever_fit(&mask));
        assert!(field.collides(&mask, 0, 0));
    }

    #[test]
    fn collision_follows_committed_pixels() {
        let mut field = field(100.0, 100.0);
        let block = WordMask::filled(10, 10).unwrap();
        field.commit(&block, 45, 45).unwrap();
        assert_eq!(field.occupied_count(), 100);

        assert!(field.collides(&block, 45, 45));
        assert!(field.collides(&block, 54, 54));
        assert!(!field.collides(&block, 55, 45));
        assert!(!field.collides(&block, 45, 35));
    }

    #[test]
    fn collides_is_repeatable_and_pure() {
        let mut field = field(60.0, 60.0);
        let block = WordMask::filled(8, 4).unwrap();
        field.commit(&block, 20, 20).unwrap();
        let before = field.occupied_count();
        let first = field.collides(&block, 24, 22);
        for _ in 0..5 {
            assert_eq!(field.collides(&block, 24, 22), first);
        }
        assert!(first);
        assert_eq!(field.occupied_count(), before);
    }

    #[test]
    fn transparent_pixels_never_collide() {
        let mut field = field(40.0, 40.0);
        field.commit(&WordMask::filled(2, 2).unwrap(), 10, 10).unwrap();
        // Ring mask whose hole sits exactly on the committed block.
        let mut pixels = vec![true; 16];
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            pixels[y * 4 + x] = false;
        }
        let ring = WordMask::from_bools(4, 4, &pixels).unwrap();
        assert!(!field.collides(&ring, 9, 9));
        assert!(field.collides(&ring, 10, 10));
    }

    #[test]
    fn commit_rejects_masks_past_the_edge() {
        let mut field = field(20.0, 20.0);
        let mask = WordMask::filled(5, 5).unwrap();
        assert!(matches!(
            field.commit(&mask, 16, 0),
            Err(PackError::OutOfBounds { .. })
        ));
        assert!(field.commit(&mask, -1, 0).is_err());
        assert!(field.commit(&mask, 15, 15).is_ok());
        assert_eq!(field.occupied_count(), 25);
    }

    #[test]
    fn dilation_marks_buffer_clipped_to_field() {
        let canvas = Canvas::new(10.0, 10.0).unwrap();
        let mut square = CollisionField::new(&canvas, 0, 1, DilationShape::Square);
        square.commit(&WordMask::filled(1, 1).unwrap(), 0, 0).unwrap();
        assert_eq!(square.occupied_count(), 4);

        let mut diamond = CollisionField::new(&canvas, 0, 2, DilationShape::Diamond);
        diamond.commit(&WordMask::filled(1, 1).unwrap(), 5, 5).unwrap();
        assert_eq!(diamond.occupied_count(), 13);
        assert!(diamond.is_occupied(5, 3));
        assert!(!diamond.is_occupied(4, 3));
    }
}

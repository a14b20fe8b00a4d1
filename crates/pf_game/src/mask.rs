//! Per-pixel opacity masks used for the precise stage of sprite collision.

use image::RgbaImage;

/// Pixels with alpha strictly above this count as solid.
pub const ALPHA_THRESHOLD: u8 = 127;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let bits = image
            .pixels()
            .map(|pixel| pixel.0[3] > ALPHA_THRESHOLD)
            .collect();
        Self {
            width,
            height,
            bits,
        }
    }

    #[cfg(test)]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    pub fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        self.bits[(y as u32 * self.width + x as u32) as usize]
    }

    #[cfg(test)]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }

    pub fn flipped_horizontal(&self) -> Self {
        let mut bits = Vec::with_capacity(self.bits.len());
        for row in self.bits.chunks(self.width.max(1) as usize) {
            bits.extend(row.iter().rev());
        }
        Self {
            width: self.width,
            height: self.height,
            bits,
        }
    }

    /// `offset` is the other mask's top-left relative to this one's.
    pub fn overlaps(&self, other: &Mask, offset: (i32, i32)) -> bool {
        let (ox, oy) = offset;
        let x0 = ox.max(0);
        let y0 = oy.max(0);
        let x1 = (self.width as i32).min(ox + other.width as i32);
        let y1 = (self.height as i32).min(oy + other.height as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - ox, y - oy) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn half_transparent(width: u32, height: u32) -> RgbaImage {
        // Left half opaque, right half clear.
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    #[test]
    fn alpha_threshold_is_exclusive() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 127]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        let mask = Mask::from_rgba(&img);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
    }

    #[test]
    fn flip_mirrors_columns() {
        let mask = Mask::from_rgba(&half_transparent(4, 2));
        let flipped = mask.flipped_horizontal();
        assert!(mask.get(0, 0) && !mask.get(3, 0));
        assert!(!flipped.get(0, 0) && flipped.get(3, 0));
        assert_eq!(mask.count(), flipped.count());
    }

    #[test]
    fn clear_pixels_do_not_overlap() {
        let a = Mask::from_rgba(&half_transparent(4, 4));
        let b = Mask::full(2, 4);
        // b sits over a's clear right half only.
        assert!(!a.overlaps(&b, (2, 0)));
        assert!(a.overlaps(&b, (1, 0)));
        assert!(!a.overlaps(&b, (10, 0)));
        assert!(a.overlaps(&b, (-1, 2)));
    }
}

use crate::*;
use ::image::Rgba;

/// Axis-aligned rectangle in frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Binary per-pixel map of where two frames differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifferenceMask {
    width: u32,
    height: u32,
    changed: Vec<bool>,
}

impl DifferenceMask {
    /// Marks every pixel whose difference luma is strictly above `threshold`.
    pub fn between(older: &RgbaImage, newer: &RgbaImage, threshold: u8) -> Result<Self> {
        if older.dimensions() != newer.dimensions() {
            return Err(Error::DimensionMismatch {
                older: older.dimensions(),
                newer: newer.dimensions(),
            }
            .into());
        }

        let (width, height) = older.dimensions();

        let changed = older
            .pixels()
            .zip(newer.pixels())
            .map(|(a, b)| difference_luma(a, b) > threshold)
            .collect();

        Ok(Self {
            width,
            height,
            changed,
        })
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            changed: vec![true; (width * height) as usize],
        }
    }

    /// Grows the mask by `radius` pixels in every direction (square max
    /// filter); the result always contains the original mask.
    pub fn dilate(&self, radius: u32) -> Self {
        let (width, height) = (self.width as usize, self.height as usize);
        let radius = radius as usize;

        if radius == 0 || self.changed.is_empty() {
            return self.clone();
        }

        let mut rows = Vec::with_capacity(self.changed.len());

        for row in self.changed.chunks(width) {
            rows.extend(dilate_line(row, radius));
        }

        let mut changed = vec![false; rows.len()];

        for x in 0..width {
            let column: Vec<_> = (0..height).map(|y| rows[y * width + x]).collect();

            for (y, on) in dilate_line(&column, radius).into_iter().enumerate() {
                changed[y * width + x] = on;
            }
        }

        Self {
            width: self.width,
            height: self.height,
            changed,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_changed(&self, x: u32, y: u32) -> bool {
        self.changed[(y * self.width + x) as usize]
    }

    pub fn is_empty(&self) -> bool {
        !self.changed.contains(&true)
    }

    pub fn count(&self) -> usize {
        self.changed.iter().filter(|&&on| on).count()
    }

    /// Smallest rectangle holding every changed pixel.
    pub fn bounding_box(&self) -> Option<Region> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;

        for (idx, _) in self.changed.iter().enumerate().filter(|&(_, &on)| on) {
            let x = idx as u32 % self.width;
            let y = idx as u32 / self.width;

            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }

        bounds.map(|(x0, y0, x1, y1)| Region {
            x: x0,
            y: y0,
            width: x1 - x0 + 1,
            height: y1 - y0 + 1,
        })
    }

    /// Whether every pixel changed here is changed in `other` too.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .changed
                .iter()
                .zip(&other.changed)
                .all(|(&a, &b)| !a || b)
    }
}

/// Brightness of the per-channel absolute difference (ITU-R 601 weights),
/// rounded to nearest.
pub fn difference_luma(a: &Rgba<u8>, b: &Rgba<u8>) -> u8 {
    let dr = a[0].abs_diff(b[0]) as u32;
    let dg = a[1].abs_diff(b[1]) as u32;
    let db = a[2].abs_diff(b[2]) as u32;

    ((dr * 299 + dg * 587 + db * 114 + 500) / 1000) as u8
}

fn dilate_line(line: &[bool], radius: usize) -> Vec<bool> {
    let mut prefix = Vec::with_capacity(line.len() + 1);
    let mut total = 0;

    prefix.push(0);

    for &on in line {
        total += on as usize;
        prefix.push(total);
    }

    (0..line.len())
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(line.len());

            prefix[hi] > prefix[lo]
        })
        .collect()
}

use crate::*;
use ::image::imageops::{self, FilterType};
use ::image::{Rgba, Rgba32FImage};
use std::borrow::Cow;

/// The part of a frame that changed since the previous one, cut out onto an
/// otherwise transparent canvas of the full frame size.
#[derive(Clone, Debug)]
pub struct ChangedRegion {
    pub mask: DifferenceMask,
    pub image: RgbaImage,
}

impl ChangedRegion {
    pub fn between(older: &RgbaImage, newer: &RgbaImage, threshold: u8, radius: u32) -> Result<Self> {
        let mask = DifferenceMask::between(older, newer, threshold)?.dilate(radius);
        let image = cut_out(&mask, newer);

        Ok(Self { mask, image })
    }

    /// Region covering the entire frame; used when there is nothing to diff
    /// against.
    pub fn whole(frame: &RgbaImage) -> Self {
        let (width, height) = frame.dimensions();
        let mask = DifferenceMask::full(width, height);

        let mut image = frame.clone();

        for pixel in image.pixels_mut() {
            pixel[3] = 255;
        }

        Self { mask, image }
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Like [`composite`], but pixels outside the mask are always taken from
    /// `original`.
    pub fn composite_onto(&self, original: &RgbaImage, upscaled: &RgbaImage) -> Result<RgbaImage> {
        if self.mask.dimensions() != original.dimensions() {
            return Err(Error::DimensionMismatch {
                older: self.mask.dimensions(),
                newer: original.dimensions(),
            }
            .into());
        }

        let mut out = composite(original, upscaled);

        for (x, y, pixel) in out.enumerate_pixels_mut() {
            if !self.mask.is_changed(x, y) {
                *pixel = *original.get_pixel(x, y);
            }
        }

        Ok(out)
    }
}

fn cut_out(mask: &DifferenceMask, frame: &RgbaImage) -> RgbaImage {
    let (width, height) = frame.dimensions();

    RgbaImage::from_fn(width, height, |x, y| {
        if mask.is_changed(x, y) {
            let p = frame.get_pixel(x, y);
            Rgba([p[0], p[1], p[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Scales an upscaled region back to `original`'s size and lays it over
/// `original`. Transparent pixels leave the original untouched.
pub fn composite(original: &RgbaImage, region: &RgbaImage) -> RgbaImage {
    let (width, height) = original.dimensions();

    let region = if region.dimensions() == (width, height) {
        Cow::Borrowed(region)
    } else {
        Cow::Owned(resample(region, width, height))
    };

    let mut out = original.clone();

    for (dst, src) in out.pixels_mut().zip(region.pixels()) {
        blend(dst, src);
    }

    out
}

// Premultiplied channels are stored as `HEADROOM + v / 2`, so Catmull-Rom
// overshoot stays inside the 0..1 range `resize` clamps floats to.
const HEADROOM: f32 = 0.25;

fn encode(v: f32) -> f32 {
    HEADROOM + v * 0.5
}

fn decode(v: f32) -> f32 {
    (v - HEADROOM) * 2.0
}

/// Catmull-Rom resize on premultiplied alpha, so transparent pixels lend no
/// colour to their opaque neighbours.
fn resample(region: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(region.width(), region.height(), |x, y| {
        let p = region.get_pixel(x, y);
        let a = p[3] as f32 / 255.0;
        let c = |i: usize| encode(p[i] as f32 / 255.0 * a);

        Rgba([c(0), c(1), c(2), encode(a)])
    });

    let resized = imageops::resize(&premultiplied, width, height, FilterType::CatmullRom);

    RgbaImage::from_fn(width, height, |x, y| {
        let p = resized.get_pixel(x, y);
        let a = decode(p[3]);
        let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;

        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }

        // Divided by the unclamped alpha, so overshoot cancels out
        let c = |i: usize| ((decode(p[i]) / a).clamp(0.0, 1.0) * 255.0).round() as u8;

        Rgba([c(0), c(1), c(2), alpha])
    })
}

/// Straight-alpha "over" operator.
fn blend(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    let sa = src[3] as u32;

    match sa {
        0 => {}
        255 => *dst = *src,

        _ => {
            let keep = dst[3] as u32 * (255 - sa) / 255;
            let alpha = sa + keep;

            for c in 0..3 {
                dst[c] = ((src[c] as u32 * sa + dst[c] as u32 * keep + alpha / 2) / alpha) as u8;
            }

            dst[3] = alpha as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([v, v, v, 255]))
    }

    /// 100×100 frame of 100 with a 10×10 block of 150 at (40, 40).
    fn moved_block() -> (RgbaImage, RgbaImage) {
        let older = gray(100, 100, 100);
        let mut newer = older.clone();

        for y in 40..50 {
            for x in 40..50 {
                newer.put_pixel(x, y, Rgba([150, 150, 150, 255]));
            }
        }

        (older, newer)
    }

    fn doubled(image: &RgbaImage) -> RgbaImage {
        imageops::resize(image, image.width() * 2, image.height() * 2, FilterType::Nearest)
    }

    #[test]
    fn changed_block_is_cut_out_with_its_margin() {
        let (older, newer) = moved_block();
        let region = ChangedRegion::between(&older, &newer, 30, 9).unwrap();

        assert_eq!(
            region.mask.bounding_box(),
            Some(Region {
                x: 31,
                y: 31,
                width: 28,
                height: 28
            })
        );
        assert_eq!(region.mask.count(), 28 * 28);

        for (x, y, pixel) in region.image.enumerate_pixels() {
            let inside = (31..59).contains(&x) && (31..59).contains(&y);

            if inside {
                assert_eq!(pixel[3], 255);
                assert_eq!(pixel, newer.get_pixel(x, y));
            } else {
                assert_eq!(*pixel, Rgba([0, 0, 0, 0]));
            }
        }
    }

    #[test]
    fn unchanged_frames_give_transparent_region() {
        let frame = gray(16, 16, 7);
        let region = ChangedRegion::between(&frame, &frame, 30, 9).unwrap();

        assert!(region.is_empty());
        assert!(region.image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn mismatched_frames_are_rejected() {
        let err = ChangedRegion::between(&gray(10, 10, 0), &gray(12, 10, 0), 30, 9).unwrap_err();

        assert!(err.downcast_ref::<Error>().is_some());
    }

    #[test]
    fn whole_region_is_opaque() {
        let mut frame = gray(4, 4, 9);
        frame.put_pixel(1, 1, Rgba([1, 2, 3, 0]));

        let region = ChangedRegion::whole(&frame);

        assert!(!region.is_empty());
        assert_eq!(region.mask.count(), 16);
        assert_eq!(*region.image.get_pixel(1, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn transparent_composite_is_identity() {
        let original = RgbaImage::from_fn(20, 10, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 77, 255]));

        let same_size = RgbaImage::new(20, 10);
        let upscaled = RgbaImage::new(40, 20);

        assert_eq!(composite(&original, &same_size), original);
        assert_eq!(composite(&original, &upscaled), original);
    }

    #[test]
    fn upscaled_region_leaves_surroundings_alone() {
        let (older, newer) = moved_block();
        let region = ChangedRegion::between(&older, &newer, 30, 9).unwrap();
        let upscaled = doubled(&region.image);

        for out in [
            composite(&older, &upscaled),
            region.composite_onto(&older, &upscaled).unwrap(),
        ] {
            assert_eq!(out.dimensions(), (100, 100));

            for (x, y, pixel) in out.enumerate_pixels() {
                if !region.mask.is_changed(x, y) {
                    assert_eq!(pixel, older.get_pixel(x, y), "x={} y={}", x, y);
                }
            }

            // margin pixels beyond the filter's reach of the block keep their value
            for x in 30..38 {
                assert_eq!(*out.get_pixel(x, 45), Rgba([100, 100, 100, 255]), "x={}", x);
            }

            for x in 42..48 {
                assert_eq!(*out.get_pixel(x, 45), Rgba([150, 150, 150, 255]), "x={}", x);
            }
        }
    }

    #[test]
    fn composite_onto_clips_to_the_mask() {
        let (older, newer) = moved_block();
        let region = ChangedRegion::between(&older, &newer, 30, 9).unwrap();

        // an upscaler that paints outside the region
        let upscaled = gray(200, 200, 255);
        let out = region.composite_onto(&older, &upscaled).unwrap();

        assert_eq!(*out.get_pixel(10, 10), Rgba([100, 100, 100, 255]));
        assert_eq!(*out.get_pixel(30, 45), Rgba([100, 100, 100, 255]));
        assert_eq!(*out.get_pixel(31, 45), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn composite_onto_rejects_foreign_frames() {
        let (older, newer) = moved_block();
        let region = ChangedRegion::between(&older, &newer, 30, 9).unwrap();

        let err = region
            .composite_onto(&gray(50, 50, 0), &region.image)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn opaque_composite_replaces() {
        let original = gray(10, 10, 0);
        let upscaled = gray(20, 20, 200);

        let out = composite(&original, &upscaled);

        assert_eq!(out.dimensions(), (10, 10));
        assert!(out.pixels().all(|p| *p == Rgba([200, 200, 200, 255])));
    }

    #[test]
    fn half_transparent_pixels_are_mixed() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend(&mut dst, &Rgba([255, 255, 255, 128]));

        assert_eq!(dst, Rgba([128, 128, 128, 255]));
    }
}

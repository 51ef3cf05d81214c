//! Property-based tests for fingerprinting, elision and dilation.

use ::image::Rgba;
use proptest::prelude::*;
use upscale_lib::{decide, Decision, DifferenceMask, Fingerprint, RgbaImage, Similarity};

const SIDE: u32 = 12;

fn image_from(values: &[u8]) -> RgbaImage {
    RgbaImage::from_fn(SIDE, SIDE, |x, y| {
        let i = ((y * SIDE + x) * 3) as usize;
        Rgba([values[i], values[i + 1], values[i + 2], 255])
    })
}

fn pixels(range: std::ops::RangeInclusive<u8>) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(range, (SIDE * SIDE * 3) as usize)
}

/// Masks built from a sparse random set of changed pixels.
fn mask_from(changed: &[bool]) -> DifferenceMask {
    let older = RgbaImage::new(SIDE, SIDE);

    let newer = RgbaImage::from_fn(SIDE, SIDE, |x, y| {
        if changed[(y * SIDE + x) as usize] {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    DifferenceMask::between(&older, &newer, 30).unwrap()
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(values in pixels(0..=255)) {
        let image = image_from(&values);

        prop_assert_eq!(Fingerprint::of(&image), Fingerprint::of(&image));
    }

    /// A uniform brightness shift keeps every gradient comparison but must
    /// still be told apart.
    #[test]
    fn uniform_shift_changes_fingerprint(values in pixels(0..=150), shift in 32u8..=100) {
        let image = image_from(&values);
        let shifted: Vec<_> = values.iter().map(|&v| v + shift).collect();
        let shifted = image_from(&shifted);

        prop_assert_ne!(Fingerprint::of(&image), Fingerprint::of(&shifted));
    }

    #[test]
    fn upscale_iff_fingerprint_changed(
        shades in prop::collection::vec(prop::sample::select(vec![0u8, 64, 128, 192]), 0..40)
    ) {
        let fingerprints: Vec<_> = shades
            .iter()
            .map(|&shade| Fingerprint::of(&RgbaImage::from_pixel(4, 4, Rgba([shade, shade, shade, 255]))))
            .collect();

        let decisions = decide(&fingerprints, Similarity::Exact);

        prop_assert_eq!(decisions.len(), fingerprints.len());

        for (idx, decision) in decisions.iter().enumerate() {
            let changed = idx == 0 || fingerprints[idx] != fingerprints[idx - 1];

            match *decision {
                Decision::Upscale => prop_assert!(changed),

                Decision::ReuseFrom(anchor) => {
                    prop_assert!(!changed);
                    prop_assert!(anchor < idx);
                    prop_assert_eq!(decisions[anchor], Decision::Upscale);
                    prop_assert_eq!(fingerprints[anchor], fingerprints[idx]);
                }
            }
        }
    }

    #[test]
    fn dilation_is_monotonic(
        changed in prop::collection::vec(prop::bool::weighted(0.05), (SIDE * SIDE) as usize),
        r1 in 0u32..6,
        extra in 1u32..6,
    ) {
        let mask = mask_from(&changed);
        let small = mask.dilate(r1);
        let large = mask.dilate(r1 + extra);

        prop_assert!(mask.is_subset_of(&small));
        prop_assert!(small.is_subset_of(&large));
    }
}

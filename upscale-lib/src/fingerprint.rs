use crate::*;
use ::image::imageops::{self, FilterType};
use std::fmt;

const HASH_WIDTH: u32 = 8;
const HASH_HEIGHT: u32 = 8;

/// Luma levels per brightness step.
const LEVEL_STEP: u64 = 16;

/// Perceptual signature of a frame.
///
/// `gradient` is a difference hash: the frame is reduced to a 9x8 grayscale
/// grid and every pixel is compared with its right neighbour, giving one bit
/// per comparison (row-major, first bit most significant).
///
/// A difference hash can't see uniform brightness changes (a fade keeps every
/// comparison intact), so the mean luma is carried along as a coarse `level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    gradient: u64,
    level: u8,
}

impl Fingerprint {
    pub fn of(image: &RgbaImage) -> Self {
        let gray = imageops::grayscale(image);

        let level = {
            let pixels = gray.as_raw();
            let sum: u64 = pixels.iter().map(|&p| p as u64).sum();
            let mean = sum / (pixels.len() as u64).max(1);

            (mean / LEVEL_STEP) as u8
        };

        let small = imageops::resize(&gray, HASH_WIDTH + 1, HASH_HEIGHT, FilterType::Lanczos3);
        let mut gradient = 0u64;

        for y in 0..HASH_HEIGHT {
            for x in 0..HASH_WIDTH {
                let left = small.get_pixel(x, y)[0];
                let right = small.get_pixel(x + 1, y)[0];

                gradient = (gradient << 1) | (right > left) as u64;
            }
        }

        Self { gradient, level }
    }

    pub fn gradient(self) -> u64 {
        self.gradient
    }

    pub fn level(self) -> u8 {
        self.level
    }

    /// Differing gradient bits plus the brightness level gap.
    pub fn distance(self, other: Self) -> u32 {
        let bits = (self.gradient ^ other.gradient).count_ones();
        let levels = (self.level as i32 - other.level as i32).unsigned_abs();

        bits + levels
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:x}", self.gradient, self.level)
    }
}

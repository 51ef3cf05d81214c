use crate::*;
use std::fmt;

/// How frames are sent to the upscaler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Upscale whole frames, copying the previous output for duplicates.
    Elide,

    /// Upscale only the region that changed since the previous frame and
    /// composite it back onto that frame.
    Region,
}

/// When two consecutive fingerprints count as the same frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Similarity {
    Exact,

    /// Fingerprint distance at most this many units.
    Within(u32),
}

impl Similarity {
    pub fn matches(self, a: Fingerprint, b: Fingerprint) -> bool {
        match self {
            Similarity::Exact => a == b,
            Similarity::Within(max) => a.distance(b) <= max,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    Jpg,
    Png,
}

impl FrameFormat {
    pub fn ext(self) -> &'static str {
        match self {
            FrameFormat::Jpg => "jpg",
            FrameFormat::Png => "png",
        }
    }

    /// Name of the `n`-th (1-based) frame file, as written by the extractor.
    pub fn file_name(self, n: usize) -> String {
        format!("frame{:08}.{}", n, self.ext())
    }

    /// printf-style pattern understood by ffmpeg.
    pub fn pattern(self) -> String {
        format!("frame%08d.{}", self.ext())
    }
}

impl fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Tunables of a single run.
#[derive(Clone, Debug)]
pub struct Params {
    /// Upscaler model identifier, e.g. `realesr-animevideov3`.
    pub model: String,

    /// Integer factor the upscaler enlarges images by.
    pub scale: u32,

    /// Upscaler `load:proc:save` thread hint.
    pub threads: String,

    /// A pixel is changed when its difference luma is strictly above this.
    pub threshold: u8,

    /// Dilation radius applied to the difference mask.
    pub radius: u32,

    pub strategy: Strategy,
    pub similarity: Similarity,

    /// Size of the worker pool used for fingerprinting and upscaling.
    pub workers: usize,

    pub format: FrameFormat,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            model: "realesr-animevideov3".into(),
            scale: 2,
            threads: "1:2:2".into(),
            threshold: 30,
            radius: 9,
            strategy: Strategy::Elide,
            similarity: Similarity::Exact,
            workers: 1,
            format: FrameFormat::Jpg,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.model.is_empty(), "Model name must not be empty");

        ensure!(
            (2..=4).contains(&self.scale),
            "Scale factor must be 2, 3 or 4 (got {})",
            self.scale
        );

        ensure!(self.workers > 0, "At least one worker is required");

        ensure!(
            self.threads.split(':').count() == 3
                && self.threads.split(':').all(|n| n.parse::<u32>().is_ok()),
            "Thread hint must look like load:proc:save (got {:?})",
            self.threads
        );

        Ok(())
    }
}

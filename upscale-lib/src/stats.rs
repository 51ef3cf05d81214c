/// What a run did with its frames.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub frames: usize,

    /// Frames (or regions) sent to the upscaler.
    pub upscaled: usize,

    /// Frames whose output was copied from an earlier one.
    pub reused: usize,

    /// Regions composited back onto a frame.
    pub composited: usize,

    /// Frames with an empty difference mask, whose output is the previous one.
    pub skipped: usize,
}

impl Stats {
    /// Share of frames that skipped the upscaler.
    pub fn saved(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            (self.reused + self.skipped) as f64 / self.frames as f64
        }
    }
}

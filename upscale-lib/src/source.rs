use crate::*;
use log::warn;
use std::path::Path;

/// Extracted frames, in temporal order.
#[derive(Clone, Debug, Default)]
pub struct Source {
    frames: Vec<Frame>,
}

impl Source {
    pub fn from_dir(path: impl AsRef<Path>, format: FrameFormat) -> Result<Self> {
        let pattern = path.as_ref().join(format!("frame*.{}", format.ext()));
        let paths = glob::glob(&pattern.to_string_lossy()).context("Couldn't find frames")?;

        let mut paths = paths
            .map(|path| path.context("Couldn't find frame"))
            .collect::<Result<Vec<_>>>()?;

        // zero-padded names, so lexical order is frame order
        paths.sort();

        if paths.is_empty() {
            warn!("No frames found in {}", path.as_ref().display());
        }

        let frames = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Frame { index, path })
            .collect();

        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

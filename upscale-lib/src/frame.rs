use crate::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// One extracted frame on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Position in the sequence, starting at 0.
    pub index: usize,
    pub path: PathBuf,
}

impl Frame {
    pub fn load(&self) -> Result<RgbaImage> {
        crate::image::load(&self.path)
    }

    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or_default()
    }

    /// Where this frame's result goes inside `dir`.
    pub fn output_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Scratch directories of a run.
///
/// They are wiped when a run starts, not when it fails, so a failed run
/// leaves its intermediate frames behind for inspection.
#[derive(Clone, Debug)]
pub struct Workspace {
    pub frames: PathBuf,
    pub outputs: PathBuf,
    pub regions: PathBuf,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();

        Self {
            frames: root.join("tmp_frames"),
            outputs: root.join("out_frames"),
            regions: root.join("region_frames"),
        }
    }

    /// Recreates every directory empty.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.frames, &self.outputs, &self.regions] {
            if dir.exists() {
                fs::remove_dir_all(dir)
                    .with_context(|| format!("Couldn't clear {}", dir.display()))?;
            }

            fs::create_dir_all(dir).with_context(|| format!("Couldn't create {}", dir.display()))?;
        }

        Ok(())
    }
}

//! External programs the pipeline depends on, each behind a narrow trait so
//! the decision logic can be driven by in-memory fakes.

use crate::*;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Splits a video into numbered frame images.
pub trait Extractor: Sync {
    fn extract(&self, video: &Path, frames_dir: &Path, format: FrameFormat) -> Result<()>;
}

pub trait Prober: Sync {
    fn probe(&self, video: &Path) -> Result<VideoMetadata>;
}

/// Enlarges a single image; the output format follows `output`'s extension.
pub trait Upscaler: Sync {
    fn upscale(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Encodes numbered frames into a video, taking audio from `video`.
pub trait Muxer: Sync {
    fn mux(
        &self,
        frames_dir: &Path,
        format: FrameFormat,
        video: &Path,
        frame_rate: FrameRate,
        output: &Path,
    ) -> Result<()>;
}

/// The set of collaborators a pipeline runs with.
#[derive(Clone, Copy)]
pub struct Tools<'a> {
    pub extractor: &'a dyn Extractor,
    pub prober: &'a dyn Prober,
    pub upscaler: &'a dyn Upscaler,
    pub muxer: &'a dyn Muxer,
}

/// Runs `command` to completion; a non-zero exit carries the tool's stderr.
pub fn run(mut command: Command) -> Result<Output> {
    let tool = command.get_program().to_string_lossy().into_owned();

    debug!("Running {:?}", command);

    let output = command
        .output()
        .with_context(|| format!("Couldn't launch {}", tool))?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
        }
        .into());
    }

    Ok(output)
}

#[derive(Clone, Debug)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Extractor for Ffmpeg {
    fn extract(&self, video: &Path, frames_dir: &Path, format: FrameFormat) -> Result<()> {
        let mut command = Command::new(&self.program);

        command
            .arg("-i")
            .arg(video)
            .args(["-qscale:v", "1", "-qmin", "1", "-qmax", "1", "-vsync", "0"])
            .arg(frames_dir.join(format.pattern()));

        run(command).map(drop)
    }
}

impl Muxer for Ffmpeg {
    fn mux(
        &self,
        frames_dir: &Path,
        format: FrameFormat,
        video: &Path,
        frame_rate: FrameRate,
        output: &Path,
    ) -> Result<()> {
        let mut command = Command::new(&self.program);

        command
            .arg("-y")
            .arg("-framerate")
            .arg(frame_rate.to_string())
            .arg("-i")
            .arg(frames_dir.join(format.pattern()))
            .arg("-i")
            .arg(video)
            .args(["-map", "0:v:0", "-map", "1:a:0?"])
            .args(["-c:a", "copy", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(output);

        run(command).map(drop)
    }
}

#[derive(Clone, Debug)]
pub struct Ffprobe {
    program: PathBuf,
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Prober for Ffprobe {
    fn probe(&self, video: &Path) -> Result<VideoMetadata> {
        let mut command = Command::new(&self.program);

        command
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(["-show_entries", "stream=width,height,avg_frame_rate"])
            .args(["-of", "csv=s=x:p=0"])
            .arg(video);

        let output = run(command)?;

        Ok(String::from_utf8_lossy(&output.stdout).parse()?)
    }
}

/// `realesrgan-ncnn-vulkan`.
#[derive(Clone, Debug)]
pub struct RealEsrgan {
    program: PathBuf,
    model: String,
    scale: u32,
    threads: String,
}

impl RealEsrgan {
    pub fn new(program: impl Into<PathBuf>, params: &Params) -> Self {
        Self {
            program: program.into(),
            model: params.model.clone(),
            scale: params.scale,
            threads: params.threads.clone(),
        }
    }
}

impl Upscaler for RealEsrgan {
    fn upscale(&self, input: &Path, output: &Path) -> Result<()> {
        let format = output
            .extension()
            .and_then(|ext| ext.to_str())
            .with_context(|| format!("Output has no extension: {}", output.display()))?;

        let mut command = Command::new(&self.program);

        command
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("-n")
            .arg(&self.model)
            .arg("-s")
            .arg(self.scale.to_string())
            .arg("-f")
            .arg(format)
            .arg("-j")
            .arg(&self.threads);

        run(command).map(drop)
    }
}

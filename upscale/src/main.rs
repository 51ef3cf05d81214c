use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use fern::Dispatch;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use upscale_lib::{
    Event, Ffmpeg, Ffprobe, FrameFormat, Observer, Params, Pipeline, RealEsrgan, Similarity,
    Stage, Strategy, Tools, Workspace,
};

/// Upscales an animated video with realesrgan-ncnn-vulkan, skipping frames
/// that didn't change.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input video file
    #[arg(short, long)]
    input: PathBuf,

    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Directory holding the scratch frame directories (wiped on every run)
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Upscaler model (realesr-animevideov3 | realesrgan-x4plus | realesrgan-x4plus-anime | realesrnet-x4plus)
    #[arg(short = 'n', long, default_value = "realesr-animevideov3")]
    model: String,

    /// Upscale factor; x4plus models need 4
    #[arg(short, long, default_value_t = 2)]
    scale: u32,

    /// Upscaler thread hint, load:proc:save
    #[arg(short = 'j', long, default_value = "1:2:2")]
    threads: String,

    #[arg(long, value_enum, default_value_t = Mode::Elide)]
    strategy: Mode,

    /// Treat frames whose fingerprints are at most this far apart as duplicates
    /// (exact match when absent)
    #[arg(long)]
    max_distance: Option<u32>,

    /// Difference luma above which a pixel counts as changed (region strategy)
    #[arg(long, default_value_t = 30)]
    threshold: u8,

    /// How far a changed region is grown around each changed pixel (region strategy)
    #[arg(long, default_value_t = 9)]
    radius: u32,

    /// Frames fingerprinted / upscaled at once
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    #[arg(long, value_enum, default_value_t = Format::Jpg)]
    format: Format,

    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,

    #[arg(long, default_value = "./realesrgan-ncnn-vulkan")]
    upscaler: PathBuf,

    /// Also write the log next to the input, as <input>.log
    #[arg(long, action)]
    log_file: bool,

    /// Enable debug logging
    #[arg(short, long, action)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Upscale whole frames, copy duplicates
    Elide,
    /// Upscale only the changed region of each frame
    Region,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Jpg,
    Png,
}

impl Cli {
    fn as_params(&self) -> Params {
        Params {
            model: self.model.clone(),
            scale: self.scale,
            threads: self.threads.clone(),
            threshold: self.threshold,
            radius: self.radius,
            strategy: match self.strategy {
                Mode::Elide => Strategy::Elide,
                Mode::Region => Strategy::Region,
            },
            similarity: self
                .max_distance
                .map_or(Similarity::Exact, Similarity::Within),
            workers: self.workers,
            format: match self.format {
                Format::Jpg => FrameFormat::Jpg,
                Format::Png => FrameFormat::Png,
            },
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let mut dispatch = Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .chain(std::io::stderr());

    if cli.log_file {
        let mut path = cli.input.clone().into_os_string();
        path.push(".log");

        dispatch = dispatch.chain(fern::log_file(&path).context("Couldn't open log file")?);
    }

    dispatch.apply().context("Couldn't install logger")
}

/// Progress bar fed by pipeline events.
struct Bar {
    bar: ProgressBar,
}

impl Bar {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(0);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:<14} [{bar:50}] {pos}/{len} ({percent}%) {eta}")?
                .progress_chars("#>-"),
        );

        Ok(Self { bar })
    }
}

impl Observer for Bar {
    fn notify(&self, event: Event) {
        match event {
            Event::Stage(stage) => {
                let msg = match stage {
                    Stage::Preparing => "Preparing",
                    Stage::Extracting => "Extracting",
                    Stage::Fingerprinting => "Fingerprinting",
                    Stage::Upscaling => "Upscaling",
                    Stage::Probing => "Probing",
                    Stage::Muxing => "Muxing",
                };

                self.bar.set_message(msg);
            }

            Event::Frame { done, total } => {
                self.bar.set_length(total as u64);
                self.bar.set_position(done as u64);
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    ensure!(
        cli.input.exists(),
        "Input file does not exist: {}",
        cli.input.display()
    );

    setup_logging(&cli)?;

    let params = cli.as_params();
    let ffmpeg = Ffmpeg::new(&cli.ffmpeg);
    let ffprobe = Ffprobe::new(&cli.ffprobe);
    let upscaler = RealEsrgan::new(&cli.upscaler, &params);

    let tools = Tools {
        extractor: &ffmpeg,
        prober: &ffprobe,
        upscaler: &upscaler,
        muxer: &ffmpeg,
    };

    let bar = Bar::new()?;
    let pipeline = Pipeline::new(&params, tools, Workspace::new(&cli.workdir), &bar)?;

    info!(
        "Processing \"{}\" to \"{}\"",
        cli.input.display(),
        cli.output.display()
    );

    let start = std::time::Instant::now();
    let stats = pipeline.run(&cli.input, &cli.output)?;

    bar.bar.finish_and_clear();

    eprintln!("{:#?}", stats);
    info!("Finished in {:.2}s", start.elapsed().as_secs_f32());

    Ok(())
}

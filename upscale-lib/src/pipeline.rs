use crate::progress::Tally;
use crate::*;
use log::{debug, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Pipeline<'a> {
    params: &'a Params,
    tools: Tools<'a>,
    workspace: Workspace,
    observer: &'a dyn Observer,
    pool: rayon::ThreadPool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        params: &'a Params,
        tools: Tools<'a>,
        workspace: Workspace,
        observer: &'a dyn Observer,
    ) -> Result<Self> {
        params.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.workers)
            .build()
            .context("Couldn't start worker pool")?;

        Ok(Self {
            params,
            tools,
            workspace,
            observer,
            pool,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Upscales `video` into `output`.
    pub fn run(&self, video: &Path, output: &Path) -> Result<Stats> {
        self.observer.notify(Event::Stage(Stage::Preparing));
        self.workspace.prepare()?;

        if output.exists() {
            fs::remove_file(output)
                .with_context(|| format!("Couldn't remove {}", output.display()))?;
        }

        self.observer.notify(Event::Stage(Stage::Extracting));
        info!("Extracting frames from {}", video.display());

        self.tools
            .extractor
            .extract(video, &self.workspace.frames, self.params.format)?;

        let source = Source::from_dir(&self.workspace.frames, self.params.format)?;
        let stats = self.process(&source)?;

        self.observer.notify(Event::Stage(Stage::Probing));
        let meta = self.tools.prober.probe(video)?;

        info!(
            "Source is {}x{} at {} ({:.3} fps)",
            meta.width,
            meta.height,
            meta.frame_rate,
            meta.frame_rate.as_f64()
        );

        self.observer.notify(Event::Stage(Stage::Muxing));
        info!("Muxing {}", output.display());

        self.tools.muxer.mux(
            &self.workspace.outputs,
            self.params.format,
            video,
            meta.frame_rate,
            output,
        )?;

        Ok(stats)
    }

    /// Produces an output image for every frame of `source`.
    pub fn process(&self, source: &Source) -> Result<Stats> {
        info!("Processing {} frames ({:?})", source.len(), self.params.strategy);

        let stats = match self.params.strategy {
            Strategy::Elide => self.elide(source)?,
            Strategy::Region => self.upscale_regions(source)?,
        };

        info!(
            "{} frames: {} upscaled, {} reused, {} skipped ({:.1}% saved)",
            stats.frames,
            stats.upscaled,
            stats.reused,
            stats.skipped,
            stats.saved() * 100.0
        );

        Ok(stats)
    }

    pub fn fingerprints(&self, source: &Source) -> Result<Vec<Fingerprint>> {
        self.pool.install(|| {
            source
                .frames()
                .par_iter()
                .map(|frame| Ok(Fingerprint::of(&frame.load()?)))
                .collect()
        })
    }

    pub fn plan(&self, source: &Source) -> Result<Vec<Decision>> {
        let fingerprints = self.fingerprints(source)?;

        Ok(decide(&fingerprints, self.params.similarity))
    }

    fn elide(&self, source: &Source) -> Result<Stats> {
        self.observer.notify(Event::Stage(Stage::Fingerprinting));
        let decisions = self.plan(source)?;

        self.observer.notify(Event::Stage(Stage::Upscaling));

        let frames = source.frames();
        let outputs = &self.workspace.outputs;
        let tally = Tally::new(self.observer, frames.len());

        // Anchors don't depend on each other, so they may go in parallel
        self.pool.install(|| {
            frames
                .par_iter()
                .zip(&decisions)
                .filter(|(_, decision)| **decision == Decision::Upscale)
                .try_for_each(|(frame, _)| -> Result<()> {
                    debug!("Upscaling {}", frame.path.display());

                    self.tools
                        .upscaler
                        .upscale(&frame.path, &frame.output_in(outputs))?;

                    tally.tick();
                    Ok(())
                })
        })?;

        let mut stats = Stats {
            frames: frames.len(),
            ..Default::default()
        };

        for (frame, decision) in frames.iter().zip(&decisions) {
            match *decision {
                Decision::Upscale => {
                    stats.upscaled += 1;
                }

                Decision::ReuseFrom(anchor) => {
                    let from = frames[anchor].output_in(outputs);
                    let to = frame.output_in(outputs);

                    debug!("Reusing {} for {}", from.display(), to.display());

                    fs::copy(&from, &to).with_context(|| {
                        format!("Couldn't copy {} to {}", from.display(), to.display())
                    })?;

                    stats.reused += 1;
                    tally.tick();
                }
            }
        }

        Ok(stats)
    }

    fn upscale_regions(&self, source: &Source) -> Result<Stats> {
        self.observer.notify(Event::Stage(Stage::Upscaling));

        let outputs = &self.workspace.outputs;
        let tally = Tally::new(self.observer, source.len());

        let mut stats = Stats {
            frames: source.len(),
            ..Default::default()
        };

        let mut prev: Option<(&Frame, RgbaImage)> = None;

        for frame in source.frames() {
            let curr = frame.load()?;
            let output = frame.output_in(outputs);

            let (base, region) = match &prev {
                Some((_, older)) => {
                    let region = ChangedRegion::between(
                        older,
                        &curr,
                        self.params.threshold,
                        self.params.radius,
                    )?;

                    (older, region)
                }

                None => (&curr, ChangedRegion::whole(&curr)),
            };

            match (&prev, region.mask.bounding_box()) {
                (Some((prev_frame, _)), None) => {
                    let from = prev_frame.output_in(outputs);

                    debug!("No change in {}, reusing {}", frame.path.display(), from.display());

                    fs::copy(&from, &output).with_context(|| {
                        format!("Couldn't copy {} to {}", from.display(), output.display())
                    })?;

                    stats.skipped += 1;
                }

                (_, bounds) => {
                    debug!("Upscaling {} within {:?}", frame.path.display(), bounds);

                    let upscaled = self.upscale_region(frame, &region)?;

                    crate::image::save(&region.composite_onto(base, &upscaled)?, &output)?;

                    stats.upscaled += 1;
                    stats.composited += 1;
                }
            }

            tally.tick();
            prev = Some((frame, curr));
        }

        Ok(stats)
    }

    /// Sends a region image through the upscaler and reads the result back.
    fn upscale_region(&self, frame: &Frame, region: &ChangedRegion) -> Result<RgbaImage> {
        let (input, output) = self.region_paths(frame);

        crate::image::save_rgba(&region.image, &input)?;
        self.tools.upscaler.upscale(&input, &output)?;

        crate::image::load(&output)
    }

    fn region_paths(&self, frame: &Frame) -> (PathBuf, PathBuf) {
        let input = frame.output_in(&self.workspace.regions).with_extension("png");
        let output = input.with_extension("up.png");

        (input, output)
    }
}

//! Upscales animated video frame by frame with an external upscaler, skipping
//! the work that temporal redundancy makes unnecessary: frames identical to
//! their predecessor reuse its output, and changed frames can have just the
//! changed region upscaled.

mod decision;
mod error;
mod fingerprint;
mod frame;
mod image;
mod mask;
mod params;
mod pipeline;
mod probe;
mod progress;
mod region;
mod source;
mod stats;
mod tools;
mod workspace;

pub use ::image::RgbaImage;
use anyhow::{ensure, Context, Result};

pub use self::{
    decision::*, error::*, fingerprint::*, frame::*, mask::*, params::*, pipeline::*, probe::*,
    progress::*, region::*, source::*, stats::*, tools::*, workspace::*,
};
pub use self::image::{load, save, save_rgba};

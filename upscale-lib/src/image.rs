use crate::*;
use ::image::io::Reader as ImageReader;
use ::image::DynamicImage;
use std::path::Path;

pub fn load(path: &Path) -> Result<RgbaImage> {
    let image = ImageReader::open(path)
        .with_context(|| format!("Couldn't open frame: {}", path.display()))?
        .decode()
        .with_context(|| format!("Couldn't decode frame: {}", path.display()))?;

    Ok(image.to_rgba8())
}

/// Saves a finished frame; alpha is dropped since output frames are opaque
/// and JPEG can't carry it anyway.
pub fn save(image: &RgbaImage, path: &Path) -> Result<()> {
    DynamicImage::ImageRgba8(image.clone())
        .to_rgb8()
        .save(path)
        .with_context(|| format!("Couldn't save frame: {}", path.display()))
}

/// Saves an image keeping its alpha channel (region images are PNGs).
pub fn save_rgba(image: &RgbaImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Couldn't save image: {}", path.display()))
}

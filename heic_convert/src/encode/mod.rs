//! Output format dispatch and encoders.
//!
//! Each format is a plain function with the [`EncodeFn`] signature that turns
//! a decoded image into the bytes of the output file. [`encode_to_file`]
//! selects the function for the configured format and writes the result.

pub mod jpeg;
pub mod pdf;
pub mod png;

use crate::config::{OutputFormat, RunConfig};
use crate::decode::DecodedImage;
use crate::error::ConvertError;
use image::{DynamicImage, Rgb, RgbImage};
use std::io::{self, Write};
use std::path::Path;

/// `(image, config, output path) -> encoded bytes`. The path is used for
/// error context and document titles only; nothing is written.
pub type EncodeFn = fn(&DecodedImage, &RunConfig, &Path) -> Result<Vec<u8>, ConvertError>;

pub fn target_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Png => "png",
        OutputFormat::Jpg => "jpg",
        OutputFormat::Pdf => "pdf",
    }
}

pub fn select_encoder(format: OutputFormat) -> EncodeFn {
    match format {
        OutputFormat::Png => png::encode,
        OutputFormat::Jpg => jpeg::encode,
        OutputFormat::Pdf => pdf::encode,
    }
}

/// Encodes fully in memory, writes a temporary file next to `output` and
/// renames it into place. Returns the byte size written. On failure the
/// temporary file is removed and an existing `output` is left untouched.
pub fn encode_to_file(
    image: &DecodedImage,
    config: &RunConfig,
    output: &Path,
) -> Result<u64, ConvertError> {
    let encoder = select_encoder(config.format());
    let bytes = encoder(image, config, output)?;

    let write_error = |source: io::Error| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".heic_convert-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(write_error)?;
    temp.write_all(&bytes).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(output).map_err(|e| write_error(e.error))?;

    Ok(bytes.len() as u64)
}

/// Composites any transparency onto an opaque white background.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
        let alpha = u32::from(src[3]);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }
    out
}

//! Lossless PNG output. Alpha is kept as decoded; EXIF goes into an `eXIf`
//! chunk ahead of the image data.

use crate::config::RunConfig;
use crate::decode::DecodedImage;
use crate::error::ConvertError;
use ::png::chunk::ChunkType;
use ::png::{BitDepth, ColorType, Compression, Encoder};
use std::path::Path;

pub const EXIF_CHUNK: ChunkType = ChunkType(*b"eXIf");

pub fn encode(
    image: &DecodedImage,
    _config: &RunConfig,
    output: &Path,
) -> Result<Vec<u8>, ConvertError> {
    let (color, pixels) = if image.has_alpha() {
        (ColorType::Rgba, image.image.to_rgba8().into_raw())
    } else {
        (ColorType::Rgb, image.image.to_rgb8().into_raw())
    };

    let mut buf = Vec::new();
    {
        let mut encoder = Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(color);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(Compression::Default);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ConvertError::encode(output, e))?;
        if let Some(exif) = &image.exif {
            writer
                .write_chunk(EXIF_CHUNK, exif)
                .map_err(|e| ConvertError::encode(output, e))?;
        }
        writer
            .write_image_data(&pixels)
            .map_err(|e| ConvertError::encode(output, e))?;
        writer
            .finish()
            .map_err(|e| ConvertError::encode(output, e))?;
    }

    Ok(buf)
}

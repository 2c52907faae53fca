//! JPG output: transparency flattened onto white, configured quality,
//! no chroma subsampling (4:4:4), progressive scans, EXIF in APP1.

use super::flatten_onto_white;
use crate::config::RunConfig;
use crate::decode::DecodedImage;
use crate::error::ConvertError;
use jpeg_encoder::{ColorType, Encoder, SamplingFactor};
use std::path::Path;

const EXIF_APP_SEGMENT: u8 = 1;
const EXIF_HEADER: &[u8] = b"Exif\0\0";
/// Payload limit of one APP segment (65535 minus the 2-byte length field).
const MAX_APP_SEGMENT_LEN: usize = 65533;

pub fn encode(
    image: &DecodedImage,
    config: &RunConfig,
    output: &Path,
) -> Result<Vec<u8>, ConvertError> {
    let (width, height) = match (u16::try_from(image.width()), u16::try_from(image.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(ConvertError::encode(
                output,
                format!(
                    "{}x{} exceeds the JPG limit of 65535 pixels per side",
                    image.width(),
                    image.height()
                ),
            ))
        }
    };

    let rgb = flatten_onto_white(&image.image);

    let mut buf = Vec::new();
    let mut encoder = Encoder::new(&mut buf, config.quality().value());
    encoder.set_sampling_factor(SamplingFactor::R_4_4_4);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);

    if let Some(exif) = &image.exif {
        match app1_payload(exif) {
            Some(payload) => encoder
                .add_app_segment(EXIF_APP_SEGMENT, &payload)
                .map_err(|e| ConvertError::encode(output, e))?,
            None => tracing::warn!(
                file = %output.display(),
                bytes = exif.len(),
                "EXIF block too large for a JPG APP1 segment, writing without metadata"
            ),
        }
    }

    encoder
        .encode(rgb.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| ConvertError::encode(output, e))?;

    Ok(buf)
}

fn app1_payload(tiff: &[u8]) -> Option<Vec<u8>> {
    if EXIF_HEADER.len() + tiff.len() > MAX_APP_SEGMENT_LEN {
        return None;
    }
    let mut payload = Vec::with_capacity(EXIF_HEADER.len() + tiff.len());
    payload.extend_from_slice(EXIF_HEADER);
    payload.extend_from_slice(tiff);
    Some(payload)
}

//! HEIC/HEIF decoding.
//!
//! Uses libheif-rs to decode the primary image of a container into an 8-bit
//! RGB(A) raster and to pull its EXIF block.

use crate::error::ConvertError;
use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, ImageHandle, ItemId, LibHeif, RgbChroma};
use std::path::Path;

/// A decoded source image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    /// Raw TIFF-structured EXIF payload (starts with `II*\0` or `MM\0*`).
    pub exif: Option<Vec<u8>>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image, exif: None }
    }

    pub fn with_exif(mut self, exif: Vec<u8>) -> Self {
        self.exif = Some(exif);
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

/// Turns a source file into a [`DecodedImage`].
pub trait Decode {
    fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError>;
}

/// Production decoder backed by the system libheif.
pub struct HeifDecoder {
    lib_heif: LibHeif,
}

impl HeifDecoder {
    pub fn new() -> Self {
        Self {
            lib_heif: LibHeif::new(),
        }
    }
}

impl Default for HeifDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decode for HeifDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, ConvertError> {
        let ctx = HeifContext::read_from_file(path.to_string_lossy().as_ref()).map_err(|e| {
            let error_msg = format!("{}", e);
            if error_msg.contains("SecurityLimitExceeded") || error_msg.contains("ipco") {
                ConvertError::decode(path, format!("security limit exceeded: {}", e))
            } else {
                ConvertError::decode(path, format!("not a readable HEIC/HEIF container: {}", e))
            }
        })?;

        let handle = ctx
            .primary_image_handle()
            .map_err(|e| ConvertError::decode(path, format!("no primary image: {}", e)))?;

        let width = handle.width();
        let height = handle.height();
        let has_alpha = handle.has_alpha_channel();
        let chroma = if has_alpha {
            RgbChroma::Rgba
        } else {
            RgbChroma::Rgb
        };

        let decoded = self
            .lib_heif
            .decode(&handle, ColorSpace::Rgb(chroma), None)
            .map_err(|e| ConvertError::decode(path, e))?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .ok_or_else(|| ConvertError::decode(path, "no interleaved RGB plane"))?;

        let channels = if has_alpha { 4 } else { 3 };
        let pixels = pack_rows(plane.data, plane.stride, plane.width, plane.height, channels)
            .ok_or_else(|| ConvertError::decode(path, "pixel plane shorter than its geometry"))?;

        let image = if has_alpha {
            RgbaImage::from_raw(plane.width, plane.height, pixels).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(plane.width, plane.height, pixels).map(DynamicImage::ImageRgb8)
        }
        .ok_or_else(|| ConvertError::decode(path, "failed to build raster"))?;

        tracing::debug!(
            file = %path.display(),
            width,
            height,
            has_alpha,
            "Decoded primary image"
        );

        let exif = read_exif(&handle).and_then(|blob| {
            let tiff = normalize_heif_exif(&blob);
            if tiff.is_none() {
                tracing::debug!(file = %path.display(), bytes = blob.len(), "Ignoring malformed EXIF block");
            }
            tiff
        });
        if let Some(exif) = &exif {
            tracing::debug!(file = %path.display(), bytes = exif.len(), "Extracted EXIF metadata");
        }

        Ok(DecodedImage { image, exif })
    }
}

fn read_exif(handle: &ImageHandle) -> Option<Vec<u8>> {
    let mut meta_ids: Vec<ItemId> = vec![0; 1];
    let count = handle.metadata_block_ids(&mut meta_ids, b"Exif");
    if count == 0 {
        return None;
    }
    handle.metadata(meta_ids[0]).ok()
}

/// Copies `height` rows of `width * channels` bytes out of a plane whose
/// rows are `stride` bytes apart.
fn pack_rows(data: &[u8], stride: usize, width: u32, height: u32, channels: usize) -> Option<Vec<u8>> {
    let row_len = width as usize * channels;
    if stride < row_len {
        return None;
    }
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(data.get(start..start + row_len)?);
    }
    Some(pixels)
}

fn is_tiff_header(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*")
}

/// HEIF stores EXIF as a 4-byte big-endian offset followed by the payload;
/// the offset points past any `Exif\0\0` prefix to the TIFF header.
/// Returns the TIFF-structured payload, or `None` when malformed.
pub fn normalize_heif_exif(blob: &[u8]) -> Option<Vec<u8>> {
    if is_tiff_header(blob) {
        return Some(blob.to_vec());
    }
    if let Some(rest) = blob.strip_prefix(b"Exif\0\0") {
        return is_tiff_header(rest).then(|| rest.to_vec());
    }

    let offset = u32::from_be_bytes(blob.get(..4)?.try_into().ok()?) as usize;
    let tiff = blob.get(4usize.checked_add(offset)?..)?;
    is_tiff_header(tiff).then(|| tiff.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIFF: &[u8] = b"MM\0*\0\0\0\x08payload";

    #[test]
    fn test_normalize_offset_prefixed_blob() {
        let mut blob = vec![0, 0, 0, 6];
        blob.extend_from_slice(b"Exif\0\0");
        blob.extend_from_slice(TIFF);
        assert_eq!(normalize_heif_exif(&blob).unwrap(), TIFF);
    }

    #[test]
    fn test_normalize_zero_offset_blob() {
        let mut blob = vec![0, 0, 0, 0];
        blob.extend_from_slice(TIFF);
        assert_eq!(normalize_heif_exif(&blob).unwrap(), TIFF);
    }

    #[test]
    fn test_normalize_already_raw() {
        assert_eq!(normalize_heif_exif(TIFF).unwrap(), TIFF);
        let mut app1 = b"Exif\0\0".to_vec();
        app1.extend_from_slice(TIFF);
        assert_eq!(normalize_heif_exif(&app1).unwrap(), TIFF);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_heif_exif(&[]).is_none());
        assert!(normalize_heif_exif(&[0, 0, 0]).is_none());
        assert!(normalize_heif_exif(&[0, 0, 0, 200, 1, 2]).is_none());
        assert!(normalize_heif_exif(&[0, 0, 0, 0, b'x', b'y', b'z', b'w']).is_none());
        assert!(normalize_heif_exif(&[0xff, 0xff, 0xff, 0xff, 0]).is_none());
    }

    #[test]
    fn test_pack_rows_drops_padding() {
        // 2x2 RGB, stride 8 (6 bytes of pixels + 2 padding)
        let data = [1, 2, 3, 4, 5, 6, 0, 0, 7, 8, 9, 10, 11, 12, 0, 0];
        let packed = pack_rows(&data, 8, 2, 2, 3).unwrap();
        assert_eq!(packed, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn test_pack_rows_short_plane() {
        assert!(pack_rows(&[0; 10], 6, 2, 2, 3).is_none());
        assert!(pack_rows(&[0; 12], 4, 2, 2, 3).is_none());
    }

    #[test]
    fn test_decode_rejects_empty_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.heic");
        std::fs::write(&path, b"").unwrap();

        let err = HeifDecoder::new().decode(&path).unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("bad.heic"));
    }
}

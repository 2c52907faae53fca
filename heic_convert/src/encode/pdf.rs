//! Single-page PDF output using `printpdf` 0.8.
//!
//! The raster is placed at 72 DPI, so one pixel is one point before scaling.
//! It is shrunk (never enlarged) to fit the page minus [`PAGE_MARGIN_PT`] on
//! every side and centred. EXIF is not carried over. The raster is embedded
//! at its full pixel size; printpdf's save-time image optimization is off.

use super::flatten_onto_white;
use crate::config::{PageSize, RunConfig};
use crate::decode::DecodedImage;
use crate::error::ConvertError;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use std::fmt::Debug;
use std::path::Path;

pub const PAGE_MARGIN_PT: f32 = 36.0;
const PLACEMENT_DPI: f32 = 72.0;

/// Where the image lands on the page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Largest uniform scale <= 1 that fits `image_w x image_h` inside the page
/// area minus margins, centred in that area.
pub fn fit_to_page(image_w: u32, image_h: u32, page: PageSize) -> Placement {
    let (page_w, page_h) = page.dimensions_pt();
    let usable_w = page_w - 2.0 * PAGE_MARGIN_PT;
    let usable_h = page_h - 2.0 * PAGE_MARGIN_PT;

    let w = image_w.max(1) as f32;
    let h = image_h.max(1) as f32;
    let scale = (usable_w / w).min(usable_h / h).min(1.0);

    let width = w * scale;
    let height = h * scale;

    Placement {
        scale,
        x: PAGE_MARGIN_PT + (usable_w - width) / 2.0,
        y: PAGE_MARGIN_PT + (usable_h - height) / 2.0,
        width,
        height,
    }
}

pub fn encode(
    image: &DecodedImage,
    config: &RunConfig,
    output: &Path,
) -> Result<Vec<u8>, ConvertError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ConvertError::encode(output, "image has no pixels"));
    }

    let page_size = config.page_size();
    let (page_w_mm, page_h_mm) = page_size.dimensions_mm();
    let placement = fit_to_page(image.width(), image.height(), page_size);

    let title = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let rgb = flatten_onto_white(&image.image);
    let raw = RawImage {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        pixels: RawImageData::U8(rgb.into_raw()),
        data_format: RawImageFormat::RGB8,
        tag: Vec::new(),
    };

    let mut doc = PdfDocument::new(&title);
    let xobject_id = doc.add_image(&raw);

    let ops = vec![Op::UseXobject {
        id: xobject_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(placement.x)),
            translate_y: Some(Pt(placement.y)),
            scale_x: Some(placement.scale),
            scale_y: Some(placement.scale),
            dpi: Some(PLACEMENT_DPI),
            rotate: None,
        },
    }];

    doc.with_pages(vec![PdfPage::new(Mm(page_w_mm), Mm(page_h_mm), ops)]);

    tracing::debug!(
        file = %output.display(),
        page = %page_size,
        scale = placement.scale,
        width_pt = placement.width,
        height_pt = placement.height,
        "Image placed on page"
    );

    let options = PdfSaveOptions {
        image_optimization: None,
        ..Default::default()
    };
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let bytes = doc.save(&options, &mut warnings);
    log_save_warnings(output, &warnings);

    Ok(bytes)
}

fn log_save_warnings<W: Debug>(output: &Path, warnings: &[W]) {
    for warning in warnings {
        tracing::debug!(file = %output.display(), warning = ?warning, "PDF writer warning");
    }
}

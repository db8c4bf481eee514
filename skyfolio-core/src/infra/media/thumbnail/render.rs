//! Decode, cover-fit and encode. Everything here is CPU bound and is only
//! called from the blocking pool.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageFormat};
use skyfolio_model::{OutputFormat, ThumbnailOptions};

use crate::error::{Result, ThumbnailError};

pub(crate) fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| {
        ThumbnailError::Processing(format!("Failed to decode source image: {e}"))
    })
}

/// Scale to fully cover `target_w x target_h`, cropping the excess evenly
/// from both sides. The output always has exactly the target dimensions.
pub(crate) fn cover_fit(
    src: &DynamicImage,
    target_w: u32,
    target_h: u32,
) -> Result<DynamicImage> {
    if target_w == 0 || target_h == 0 {
        return Err(ThumbnailError::InvalidOptions(
            "Thumbnail target dimensions must be non-zero".into(),
        ));
    }

    let (src_w, src_h) = (src.width(), src.height());
    if src_w == 0 || src_h == 0 {
        return Err(ThumbnailError::Processing(
            "Source image has no pixels".into(),
        ));
    }

    // Center-crop to the target aspect ratio before resizing to avoid distortion.
    let dst_aspect = target_w as f64 / target_h as f64;
    let src_aspect = src_w as f64 / src_h as f64;

    let (crop_x, crop_y, crop_w, crop_h) = if src_aspect > dst_aspect {
        // Wider than target: crop width.
        let crop_w = (((src_h as f64) * dst_aspect).round() as u32).clamp(1, src_w);
        let crop_x = (src_w - crop_w) / 2;
        (crop_x, 0, crop_w, src_h)
    } else {
        // Taller than target: crop height.
        let crop_h = (((src_w as f64) / dst_aspect).round() as u32).clamp(1, src_h);
        let crop_y = (src_h - crop_h) / 2;
        (0, crop_y, src_w, crop_h)
    };

    let cropped = src.crop_imm(crop_x, crop_y, crop_w, crop_h);
    Ok(cropped.resize_exact(target_w, target_h, FilterType::Lanczos3))
}

pub(crate) fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>> {
    let (w, h) = (img.width(), img.height());
    let mut out = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let rgb = img.to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
            encoder
                .encode(rgb.as_raw(), w, h, ColorType::Rgb8.into())
                .map_err(|e| {
                    ThumbnailError::Processing(format!(
                        "Failed to encode thumbnail JPEG: {e}"
                    ))
                })?;
        }
        OutputFormat::Png | OutputFormat::Webp => {
            let image_format = if format == OutputFormat::Png {
                ImageFormat::Png
            } else {
                ImageFormat::WebP
            };
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_to(&mut out, image_format)
                .map_err(|e| {
                    ThumbnailError::Processing(format!(
                        "Failed to encode thumbnail {format}: {e}"
                    ))
                })?;
        }
    }

    let encoded = out.into_inner();
    if encoded.is_empty() {
        return Err(ThumbnailError::Processing(format!(
            "Encoder produced no {format} output"
        )));
    }
    Ok(encoded)
}

/// Full pipeline for one rendition of an already decoded image.
pub(crate) fn render(img: &DynamicImage, options: &ThumbnailOptions) -> Result<Vec<u8>> {
    let fitted = cover_fit(img, options.width, options.height)?;
    encode(&fitted, options.format, options.quality)
}

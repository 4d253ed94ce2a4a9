//! Raster format-pair converters built on the `image` crate.
//!
//! Each converter is a [`PipelineConverter`] wired with a format-specific
//! decode and encode function. JPEG targets flatten transparency onto a
//! white background inside their encode step (JPEG has no alpha channel)
//! and accept the quality parameter; everything else encodes losslessly
//! with the default settings.

use super::pipeline::{DecodeFn, EncodeFn, PipelineConverter};
use crate::concept::{self, Concept};
use crate::error::CodecError;
use crate::params;
use crate::registry::Converter;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

/// Decode bytes as a fixed format. No content sniffing — the caller named
/// the source concept, so the bytes must match it.
pub(crate) fn decode(format: ImageFormat) -> DecodeFn {
    Box::new(move |data| {
        image::load_from_memory_with_format(data, format).map_err(CodecError::from)
    })
}

/// Encode with the format's default encoder. Parameters beyond dimensions
/// are ignored by these targets.
pub(crate) fn encode(format: ImageFormat) -> EncodeFn {
    Box::new(move |img, _| {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format)?;
        Ok(buf.into_inner())
    })
}

/// JPEG encode at the resolved quality, flattening any transparency onto
/// white first.
pub(crate) fn encode_jpeg() -> EncodeFn {
    Box::new(|img, resolved| {
        let flat = flatten_onto_white(img);
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, resolved.quality());
        flat.write_with_encoder(encoder)?;
        Ok(out)
    })
}

/// Composite the image over an opaque white background, dropping alpha.
pub(crate) fn flatten_onto_white(img: &DynamicImage) -> DynamicImage {
    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (out, px) in rgb.pixels_mut().zip(rgba.pixels()) {
        let a = px[3] as u32;
        for c in 0..3 {
            out[c] = ((px[c] as u32 * a + 255 * (255 - a)) / 255) as u8;
        }
    }
    DynamicImage::ImageRgb8(rgb)
}

fn pair(source: Concept, target: Concept, format: ImageFormat, to: ImageFormat) -> Arc<dyn Converter> {
    Arc::new(PipelineConverter::new(
        source,
        target,
        decode(format),
        encode(to),
    ))
}

fn pair_to_jpeg(source: Concept, format: ImageFormat) -> Arc<dyn Converter> {
    Arc::new(
        PipelineConverter::new(source, concept::jpeg(), decode(format), encode_jpeg())
            .with_params([params::quality_spec()]),
    )
}

/// All raster format-pair converters.
pub(crate) fn converters() -> Vec<Arc<dyn Converter>> {
    use ImageFormat::{Bmp, Gif, Ico, Jpeg, Png, Tiff, WebP};
    vec![
        pair_to_jpeg(concept::png(), Png),
        pair(concept::jpeg(), concept::png(), Jpeg, Png),
        pair(concept::png(), concept::gif(), Png, Gif),
        pair(concept::gif(), concept::png(), Gif, Png),
        pair_to_jpeg(concept::gif(), Gif),
        pair(concept::png(), concept::ico(), Png, Ico),
        pair(concept::ico(), concept::png(), Ico, Png),
        pair_to_jpeg(concept::ico(), Ico),
        pair(concept::bmp(), concept::png(), Bmp, Png),
        pair_to_jpeg(concept::bmp(), Bmp),
        pair(concept::png(), concept::tiff(), Png, Tiff),
        pair(concept::tiff(), concept::png(), Tiff, Png),
        pair_to_jpeg(concept::tiff(), Tiff),
        pair(concept::png(), concept::webp(), Png, WebP),
        pair(concept::webp(), concept::png(), WebP, Png),
        pair_to_jpeg(concept::webp(), WebP),
    ]
}

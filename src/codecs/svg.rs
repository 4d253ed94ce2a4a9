//! SVG converters: rasterization via usvg/resvg and raster-to-SVG
//! embedding.
//!
//! SVG is the one source format where a missing target dimension is
//! computed from the document's own aspect ratio rather than left to the
//! shared pipeline: the rasterizer needs the final pixel size up front to
//! scale the render transform, so these converters implement
//! [`Converter`] directly instead of going through the decode/encode
//! template.

use super::pipeline::EncodeFn;
use super::raster;
use crate::cancel::CancelToken;
use crate::concept::{self, Concept};
use crate::error::{CodecError, ConvertError, Result, Stage};
use crate::params::{self, ParamSet, ParamSpec, Validator};
use crate::registry::Converter;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

fn svg_width_spec() -> ParamSpec {
    ParamSpec::new(
        params::WIDTH,
        "Output width in pixels. Positive integer; default 0 uses the SVG's own width.",
        "0",
        Validator::NonNegativeInt,
    )
}

fn svg_height_spec() -> ParamSpec {
    ParamSpec::new(
        params::HEIGHT,
        "Output height in pixels. Positive integer; default 0 uses the SVG's own height.",
        "0",
        Validator::NonNegativeInt,
    )
}

/// Final raster size for an SVG with intrinsic size `(w, h)`.
///
/// Both axes requested: exact. One axis: the other follows the document's
/// aspect ratio. Neither: the intrinsic size, rounded.
fn raster_size(want_w: u32, want_h: u32, w: f32, h: f32) -> (u32, u32) {
    match (want_w, want_h) {
        (0, 0) => (w.round() as u32, h.round() as u32),
        (tw, 0) => (tw, (h * tw as f32 / w).round() as u32),
        (0, th) => ((w * th as f32 / h).round() as u32, th),
        (tw, th) => (tw, th),
    }
}

/// SVG -> raster converter parameterized by the target encode function.
struct SvgRasterConverter {
    source: Concept,
    target: Concept,
    params: ParamSet,
    encode: EncodeFn,
}

impl SvgRasterConverter {
    fn new(target: Concept, encode: EncodeFn, extra: Vec<ParamSpec>) -> Self {
        let mut set = ParamSet::new();
        set.append([svg_width_spec(), svg_height_spec()]);
        set.append(extra);
        SvgRasterConverter {
            source: concept::svg(),
            target,
            params: set,
            encode,
        }
    }

    fn rasterize(input: &[u8], want_w: u32, want_h: u32) -> std::result::Result<DynamicImage, CodecError> {
        let tree = usvg::Tree::from_data(input, &usvg::Options::default())
            .map_err(|e| CodecError::Svg(format!("parse failed: {e}")))?;

        let size = tree.size();
        let (w, h) = raster_size(want_w, want_h, size.width(), size.height());
        if w == 0 || h == 0 {
            return Err(CodecError::Svg(format!("degenerate raster size {w}x{h}")));
        }

        let mut pixmap = tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| CodecError::Svg(format!("cannot allocate {w}x{h} pixmap")))?;
        let transform = tiny_skia::Transform::from_scale(
            w as f32 / size.width(),
            h as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        // tiny-skia keeps premultiplied RGBA; encoders want straight alpha
        let mut rgba = RgbaImage::new(w, h);
        for (out, px) in rgba.pixels_mut().zip(pixmap.pixels()) {
            let c = px.demultiply();
            *out = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(DynamicImage::ImageRgba8(rgba))
    }
}

impl Converter for SvgRasterConverter {
    fn source(&self) -> &Concept {
        &self.source
    }

    fn target(&self) -> &Concept {
        &self.target
    }

    fn params(&self) -> Vec<ParamSpec> {
        self.params.specs().to_vec()
    }

    fn convert(
        &self,
        cancel: &CancelToken,
        input: &[u8],
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>> {
        let resolved = self.params.check_and_resolve(params)?;
        cancel.check()?;

        let img = Self::rasterize(input, resolved.width(), resolved.height())
            .map_err(|e| ConvertError::failed(Stage::Decode, e))?;
        cancel.check()?;

        (self.encode)(&img, &resolved).map_err(|e| ConvertError::failed(Stage::Encode, e))
    }
}

/// JPEG -> SVG converter: wraps the JPEG bytes in an SVG document as a
/// base64 data URI. No re-encoding — the pixels pass through untouched.
struct JpegToSvgConverter {
    source: Concept,
    target: Concept,
    params: ParamSet,
}

impl JpegToSvgConverter {
    fn new() -> Self {
        let mut set = ParamSet::new();
        set.append([
            ParamSpec::new(
                params::WIDTH,
                "SVG viewport width in pixels. Positive integer; default 0 uses the image width.",
                "0",
                Validator::NonNegativeInt,
            ),
            ParamSpec::new(
                params::HEIGHT,
                "SVG viewport height in pixels. Positive integer; default 0 uses the image height.",
                "0",
                Validator::NonNegativeInt,
            ),
        ]);
        JpegToSvgConverter {
            source: concept::jpeg(),
            target: concept::svg(),
            params: set,
        }
    }
}

impl Converter for JpegToSvgConverter {
    fn source(&self) -> &Concept {
        &self.source
    }

    fn target(&self) -> &Concept {
        &self.target
    }

    fn params(&self) -> Vec<ParamSpec> {
        self.params.specs().to_vec()
    }

    fn convert(
        &self,
        cancel: &CancelToken,
        input: &[u8],
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>> {
        let resolved = self.params.check_and_resolve(params)?;
        cancel.check()?;

        // Validate the JPEG and read its dimensions from the header.
        let mut reader = ImageReader::new(Cursor::new(input));
        reader.set_format(ImageFormat::Jpeg);
        let (img_w, img_h) = reader
            .into_dimensions()
            .map_err(|e| ConvertError::failed(Stage::Decode, CodecError::Image(e)))?;
        cancel.check()?;

        let view_w = if resolved.width() > 0 {
            resolved.width()
        } else {
            img_w
        };
        let view_h = if resolved.height() > 0 {
            resolved.height()
        } else {
            img_h
        };

        let encoded = BASE64.encode(input);
        let svg = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{view_w}" height="{view_h}" viewBox="0 0 {img_w} {img_h}">
<image width="{img_w}" height="{img_h}" xlink:href="data:image/jpeg;base64,{encoded}" />
</svg>
"#,
        );
        Ok(svg.into_bytes())
    }
}

/// SVG-related converters: svg->png, svg->jpeg, jpeg->svg.
pub(crate) fn converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(SvgRasterConverter::new(
            concept::png(),
            raster::encode(ImageFormat::Png),
            Vec::new(),
        )),
        Arc::new(SvgRasterConverter::new(
            concept::jpeg(),
            raster::encode_jpeg(),
            vec![params::quality_spec()],
        )),
        Arc::new(JpegToSvgConverter::new()),
    ]
}

//! Codec adapters: the concrete format-pair converters.
//!
//! The conversion core only cares about the [`Converter`] contract; this
//! module supplies the built-in implementations on top of external codec
//! crates:
//!
//! | Converter family | Crate |
//! |---|---|
//! | Raster pairs (png, jpeg, gif, bmp, tiff, webp, ico) | `image` |
//! | SVG rasterization | `resvg` (usvg + tiny-skia) |
//! | JPEG -> SVG embedding | `base64` data URI |
//!
//! All of them share the [`pipeline::PipelineConverter`] template or, for
//! SVG, mirror its phase order with the same cancellation polling.

pub mod pipeline;
mod raster;
mod svg;

use crate::registry::Converter;
use std::sync::Arc;

/// The full built-in converter list, in registration order.
pub fn builtin_converters() -> Vec<Arc<dyn Converter>> {
    let mut converters = raster::converters();
    converters.extend(svg::converters());
    converters
}

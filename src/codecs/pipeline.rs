//! Generic decode -> resize -> encode conversion template.
//!
//! Every raster format pair runs the same linear sequence; only the decode
//! and encode functions and any extra parameter specs differ. The template
//! is stateless per invocation — nothing persists between calls, and there
//! is nothing to resume.
//!
//! Pipeline order for one invocation:
//!
//! 1. Validate and resolve parameters.
//! 2. Decode input bytes to a [`DynamicImage`].
//! 3. Resize to the requested dimensions, or normalize the pixel format
//!    when no resize was requested.
//! 4. Encode with the resolved parameters.
//!
//! The cancellation token is polled between phases so a triggered token
//! never pays for more than one phase of a large image.

use crate::cancel::CancelToken;
use crate::concept::Concept;
use crate::error::{CodecError, ConvertError, Result, Stage};
use crate::params::{self, ParamSet, ParamSpec, ResolvedParams};
use crate::registry::Converter;
use image::DynamicImage;
use image::imageops::FilterType;
use std::collections::BTreeMap;

/// Decode input bytes into the intermediate representation.
pub type DecodeFn = Box<dyn Fn(&[u8]) -> std::result::Result<DynamicImage, CodecError> + Send + Sync>;

/// Encode the (possibly resized) intermediate using resolved parameters.
///
/// Compositing that a target format requires — flattening transparency
/// before a format without alpha, say — belongs inside the encode
/// function, after the resize step.
pub type EncodeFn =
    Box<dyn Fn(&DynamicImage, &ResolvedParams) -> std::result::Result<Vec<u8>, CodecError> + Send + Sync>;

/// Shared implementation behind every raster format-pair converter.
pub struct PipelineConverter {
    source: Concept,
    target: Concept,
    params: ParamSet,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl PipelineConverter {
    /// New pipeline converter with the standard width and height specs.
    pub fn new(source: Concept, target: Concept, decode: DecodeFn, encode: EncodeFn) -> Self {
        let mut set = ParamSet::new();
        set.append([params::width_spec(), params::height_spec()]);
        PipelineConverter {
            source,
            target,
            params: set,
            decode,
            encode,
        }
    }

    /// Append extra specs (e.g. quality for lossy targets). Replaces on
    /// name collision.
    pub fn with_params(mut self, extra: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.append(extra);
        self
    }
}

/// Final dimensions for a resize request against a decoded image.
///
/// A zero axis is unconstrained and is computed from the source aspect
/// ratio; when both axes are given the image is forced to exactly that
/// size, aspect be damned.
pub(crate) fn target_dimensions(want_w: u32, want_h: u32, have_w: u32, have_h: u32) -> (u32, u32) {
    match (want_w, want_h) {
        (0, 0) => (have_w, have_h),
        (w, 0) => {
            let h = (have_h as u64 * w as u64 / have_w.max(1) as u64).clamp(1, u32::MAX as u64);
            (w, h as u32)
        }
        (0, h) => {
            let w = (have_w as u64 * h as u64 / have_h.max(1) as u64).clamp(1, u32::MAX as u64);
            (w as u32, h)
        }
        (w, h) => (w, h),
    }
}

impl Converter for PipelineConverter {
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

        let img = (self.decode)(input).map_err(|e| ConvertError::failed(Stage::Decode, e))?;
        cancel.check()?;

        let (want_w, want_h) = (resolved.width(), resolved.height());
        let img = if want_w > 0 || want_h > 0 {
            let (w, h) = target_dimensions(want_w, want_h, img.width(), img.height());
            img.resize_exact(w, h, FilterType::Lanczos3)
        } else {
            // No resize requested: normalize to RGBA8 so encoders that
            // assume a simple color model never see an exotic one.
            DynamicImage::ImageRgba8(img.to_rgba8())
        };
        cancel.check()?;

        (self.encode)(&img, &resolved).map_err(|e| ConvertError::failed(Stage::Encode, e))
    }
}

//! Error types for the conversion core.
//!
//! Two of these are ordinary control flow, not exceptional conditions:
//! [`ConvertError::NoSupportedConverter`] (the caller asked for a pair
//! nobody registered) and [`ConvertError::IllegalParam`] (a user-supplied
//! value failed its validator). Codec failures and contract violations are
//! the unexpected ones and carry their underlying cause.
//!
//! Nothing here is retried — conversion is deterministic, so retrying with
//! the same input and parameters cannot change the outcome.

use std::fmt;
use thiserror::Error;

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// No converter is registered for the requested (kind, from, to)
    /// triple. Carries the caller's original tokens for diagnostics.
    #[error("no supported converter for kind={kind}: {from} -> {to}")]
    NoSupportedConverter {
        kind: String,
        from: String,
        to: String,
    },

    /// A caller-supplied parameter value failed its validator.
    #[error("illegal param {name}={value:?}: {reason}")]
    IllegalParam {
        name: String,
        value: String,
        reason: String,
    },

    /// A decode or encode step failed. Wraps the codec error.
    #[error("conversion failed: {stage}")]
    ConversionFailed {
        stage: Stage,
        #[source]
        source: CodecError,
    },

    /// Two converters in the same registration batch declared the same
    /// (source, target) name pair. Fatal at startup.
    #[error("duplicate converter: {from} -> {to}")]
    DuplicateConverter { from: String, to: String },

    /// A converter broke an internal invariant. This is a bug in the
    /// converter implementation, not a user-input problem.
    #[error("converter contract violation: {0}")]
    ContractViolation(String),

    /// The cancellation token was triggered between pipeline phases.
    #[error("conversion cancelled")]
    Cancelled,
}

/// Pipeline phase in which a conversion failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Encode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Decode => write!(f, "image decode failed"),
            Stage::Encode => write!(f, "image encode failed"),
        }
    }
}

/// Error raised by a codec collaborator (decoder, encoder, rasterizer).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("image codec: {0}")]
    Image(#[from] image::ImageError),

    #[error("svg: {0}")]
    Svg(String),
}

impl ConvertError {
    /// Wrap a codec error under the conversion-failed classification.
    pub fn failed(stage: Stage, source: CodecError) -> Self {
        ConvertError::ConversionFailed { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_failed_preserves_cause() {
        let err = ConvertError::failed(Stage::Decode, CodecError::Svg("bad root".into()));
        let msg = format!("{err}");
        assert!(msg.contains("decode"), "got: {msg}");

        let source = std::error::Error::source(&err).expect("cause preserved");
        assert!(format!("{source}").contains("bad root"));
    }

    #[test]
    fn illegal_param_names_the_offender() {
        let err = ConvertError::IllegalParam {
            name: "quality".into(),
            value: "150".into(),
            reason: "must be in range [1, 100]".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("quality") && msg.contains("150"));
    }
}

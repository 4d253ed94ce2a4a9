//! Dispatch facade: the public entry point for conversion requests.
//!
//! An [`Engine`] wraps a built [`Registry`] and resolves each request to a
//! converter. Everything here is read-only and side-effect-free, so one
//! engine serves unlimited concurrent callers; each conversion request is
//! independent and runs wherever the caller schedules it.

use crate::cancel::CancelToken;
use crate::codecs;
use crate::concept::{Catalog, Kind};
use crate::error::{ConvertError, Result};
use crate::registry::{Converter, Registry};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Engine {
    registry: Registry,
}

impl Engine {
    /// Wrap an already-built registry. No ambient state — tests construct
    /// isolated engines from their own catalogs and converter lists.
    pub fn new(registry: Registry) -> Self {
        Engine { registry }
    }

    /// Engine with the built-in catalog and converter set.
    ///
    /// A registration failure here means two built-ins collide; that is
    /// fatal to startup and the binary must not proceed to serve requests.
    pub fn builtin() -> Result<Self> {
        let mut registry = Registry::new(Catalog::builtin());
        registry.register(codecs::builtin_converters())?;
        Ok(Engine::new(registry))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve a request to its converter, or a classified error carrying
    /// the caller's original tokens.
    pub fn get_converter(&self, kind: &Kind, from: &str, to: &str) -> Result<&Arc<dyn Converter>> {
        self.registry
            .find(kind, from, to)
            .ok_or_else(|| ConvertError::NoSupportedConverter {
                kind: kind.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Capability probe: branch before attempting a conversion without
    /// paying for an error value.
    pub fn can_convert(&self, kind: &Kind, from: &str, to: &str) -> bool {
        self.registry.find(kind, from, to).is_some()
    }

    /// Look up and invoke in one step.
    ///
    /// "Not supported" and "bad parameter" outcomes pass through as
    /// ordinary control flow; codec failures are logged with the request
    /// context before being returned.
    pub fn convert(
        &self,
        cancel: &CancelToken,
        kind: &Kind,
        from: &str,
        to: &str,
        input: &[u8],
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>> {
        let converter = self.get_converter(kind, from, to)?;
        converter.convert(cancel, input, params).inspect_err(|err| {
            if matches!(err, ConvertError::ConversionFailed { .. }) {
                tracing::warn!(%kind, from, to, error = %err, "conversion failed");
            }
        })
    }
}

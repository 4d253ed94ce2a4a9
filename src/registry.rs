//! Converter storage and lookup.
//!
//! The [`Registry`] is built once, before any conversion traffic, and is
//! read-only afterwards: registration is a single-writer startup phase,
//! and every index is a plain map that is never mutated post-construction,
//! so lookups are lock-free and safe for unbounded concurrent readers.
//!
//! Four views are maintained over the same converter set:
//!
//! | View | Shape | Use |
//! |------|-------|-----|
//! | flat list | `Vec` | enumeration, consistency checks |
//! | by kind | kind -> list | `formats` output |
//! | matrix | kind -> source -> target -> converter | dispatch |
//! | by source / by target | kind -> name -> list | discovery |
//!
//! After every successful `register` call the matrix and the flat list
//! mirror each other entry for entry.

use crate::cancel::CancelToken;
use crate::concept::{Catalog, Concept, Kind};
use crate::error::{ConvertError, Result};
use crate::params::ParamSpec;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// A unit that transforms bytes of one concept into bytes of another,
/// subject to its declared parameters.
///
/// The boundary type is fixed to opaque byte buffers on both sides; there
/// is no generic or type-erased variant behind this trait.
pub trait Converter: Send + Sync {
    /// Concept this converter consumes.
    fn source(&self) -> &Concept;

    /// Concept this converter produces.
    fn target(&self) -> &Concept;

    /// Advertised parameter specs, deep-copied so callers cannot mutate
    /// the converter's own set.
    fn params(&self) -> Vec<ParamSpec>;

    /// Run the conversion. `params` carries raw `key=value` overrides;
    /// validation and defaulting happen inside.
    fn convert(
        &self,
        cancel: &CancelToken,
        input: &[u8],
        params: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>>;
}

/// Indexed converter storage with duplicate detection.
pub struct Registry {
    catalog: Catalog,
    all: Vec<Arc<dyn Converter>>,
    by_kind: HashMap<Kind, Vec<Arc<dyn Converter>>>,
    /// kind -> source name -> target name -> converter
    matrix: HashMap<Kind, HashMap<String, HashMap<String, Arc<dyn Converter>>>>,
    by_source: HashMap<Kind, HashMap<String, Vec<Arc<dyn Converter>>>>,
    by_target: HashMap<Kind, HashMap<String, Vec<Arc<dyn Converter>>>>,
}

impl Registry {
    /// Empty registry resolving tokens through `catalog`.
    pub fn new(catalog: Catalog) -> Self {
        Registry {
            catalog,
            all: Vec::new(),
            by_kind: HashMap::new(),
            matrix: HashMap::new(),
            by_source: HashMap::new(),
            by_target: HashMap::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Register a batch of converters, all-or-nothing.
    ///
    /// The dedup key is the `(source name, target name)` pair. Kind is
    /// deliberately not part of the key: only one kind exists today and
    /// the original behavior is preserved until a second kind forces the
    /// question. Dedup is scoped to this call — re-registering the same
    /// pair in a later call overwrites the matrix slot silently.
    ///
    /// A converter whose source and target kinds differ is rejected as a
    /// contract violation; the matrix could not index it coherently.
    pub fn register(&mut self, converters: Vec<Arc<dyn Converter>>) -> Result<()> {
        let mut seen = HashSet::new();
        for converter in &converters {
            let source = converter.source();
            let target = converter.target();
            if source.kind() != target.kind() {
                return Err(ConvertError::ContractViolation(format!(
                    "converter {} -> {} crosses kinds {} and {}",
                    source.name(),
                    target.name(),
                    source.kind(),
                    target.kind(),
                )));
            }
            if !seen.insert((source.name().to_string(), target.name().to_string())) {
                return Err(ConvertError::DuplicateConverter {
                    from: source.name().to_string(),
                    to: target.name().to_string(),
                });
            }
        }

        // Batch validated; now touch the indices.
        let count = converters.len();
        for converter in converters {
            self.add(converter);
        }
        tracing::debug!(count, total = self.all.len(), "registered converters");
        Ok(())
    }

    /// Look up the converter for a normalized (kind, from, to) triple.
    ///
    /// Both tokens go through the catalog first; an unknown token is a
    /// routing failure, reported as `None`. No fuzzy matching, no
    /// kind-crossing fallback.
    pub fn find(&self, kind: &Kind, from: &str, to: &str) -> Option<&Arc<dyn Converter>> {
        let source = self.catalog.normalize(from)?;
        let target = self.catalog.normalize(to)?;
        self.matrix
            .get(kind)?
            .get(source.name())?
            .get(target.name())
    }

    /// Every registered converter, registration order.
    pub fn all(&self) -> &[Arc<dyn Converter>] {
        &self.all
    }

    /// Converters in a category, registration order.
    pub fn by_kind(&self, kind: &Kind) -> &[Arc<dyn Converter>] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Converters consuming the named source concept within a category.
    pub fn by_source(&self, kind: &Kind, source: &str) -> &[Arc<dyn Converter>] {
        self.by_source
            .get(kind)
            .and_then(|m| m.get(source))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Converters producing the named target concept within a category.
    pub fn by_target(&self, kind: &Kind, target: &str) -> &[Arc<dyn Converter>] {
        self.by_target
            .get(kind)
            .and_then(|m| m.get(target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registered (source, target) name pairs for a category, sorted for
    /// stable listing output.
    pub fn conversions(&self, kind: &Kind) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .by_kind(kind)
            .iter()
            .map(|c| (c.source().name().to_string(), c.target().name().to_string()))
            .collect();
        pairs.sort();
        pairs
    }

    fn add(&mut self, converter: Arc<dyn Converter>) {
        let kind = converter.source().kind().clone();
        let source = converter.source().name().to_string();
        let target = converter.target().name().to_string();

        self.all.push(Arc::clone(&converter));
        self.by_kind
            .entry(kind.clone())
            .or_default()
            .push(Arc::clone(&converter));
        self.matrix
            .entry(kind.clone())
            .or_default()
            .entry(source.clone())
            .or_default()
            .insert(target.clone(), Arc::clone(&converter));
        self.by_source
            .entry(kind.clone())
            .or_default()
            .entry(source)
            .or_default()
            .push(Arc::clone(&converter));
        self.by_target
            .entry(kind)
            .or_default()
            .entry(target)
            .or_default()
            .push(converter);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::concept;

    /// Trivial converter that uppercases its input. Enough structure to
    /// exercise registration and dispatch without touching a codec.
    pub(crate) struct UpcaseConverter {
        source: Concept,
        target: Concept,
    }

    impl UpcaseConverter {
        pub(crate) fn new(source: Concept, target: Concept) -> Arc<dyn Converter> {
            Arc::new(UpcaseConverter { source, target })
        }
    }

    impl Converter for UpcaseConverter {
        fn source(&self) -> &Concept {
            &self.source
        }

        fn target(&self) -> &Concept {
            &self.target
        }

        fn params(&self) -> Vec<ParamSpec> {
            Vec::new()
        }

        fn convert(
            &self,
            cancel: &CancelToken,
            input: &[u8],
            _params: &BTreeMap<String, String>,
        ) -> Result<Vec<u8>> {
            cancel.check()?;
            Ok(input.to_ascii_uppercase())
        }
    }

    fn file_registry() -> Registry {
        Registry::new(Catalog::builtin())
    }

    #[test]
    fn registered_converter_is_findable_by_exact_triple() {
        let mut registry = file_registry();
        let converter = UpcaseConverter::new(concept::png(), concept::jpeg());
        registry.register(vec![Arc::clone(&converter)]).unwrap();

        let found = registry
            .find(&Kind::file(), "png", "jpeg")
            .expect("registered pair");
        assert!(Arc::ptr_eq(found, &converter));

        // reverse direction was never registered
        assert!(registry.find(&Kind::file(), "jpeg", "png").is_none());
    }

    #[test]
    fn find_normalizes_aliases() {
        let mut registry = file_registry();
        registry
            .register(vec![UpcaseConverter::new(concept::png(), concept::jpeg())])
            .unwrap();

        assert!(registry.find(&Kind::file(), "png", "jpg").is_some());
        assert!(registry.find(&Kind::file(), "png", "jpe").is_some());
    }

    #[test]
    fn find_with_unknown_token_is_none() {
        let mut registry = file_registry();
        registry
            .register(vec![UpcaseConverter::new(concept::png(), concept::jpeg())])
            .unwrap();

        assert!(registry.find(&Kind::file(), "nope", "jpeg").is_none());
        assert!(registry.find(&Kind::file(), "png", "nope").is_none());
        assert!(registry.find(&Kind::new("currency"), "png", "jpeg").is_none());
    }

    #[test]
    fn duplicate_pair_in_one_batch_registers_nothing() {
        let mut registry = file_registry();
        let err = registry
            .register(vec![
                UpcaseConverter::new(concept::png(), concept::jpeg()),
                UpcaseConverter::new(concept::png(), concept::jpeg()),
            ])
            .unwrap_err();

        assert!(matches!(
            err,
            ConvertError::DuplicateConverter { ref from, ref to } if from == "png" && to == "jpeg"
        ));
        // all-or-nothing: neither copy became findable
        assert!(registry.find(&Kind::file(), "png", "jpeg").is_none());
        assert!(registry.all().is_empty());
    }

    #[test]
    fn dedup_is_batch_scoped() {
        let mut registry = file_registry();
        registry
            .register(vec![UpcaseConverter::new(concept::png(), concept::jpeg())])
            .unwrap();
        // second call, same pair: succeeds, overwrites the matrix slot
        registry
            .register(vec![UpcaseConverter::new(concept::png(), concept::jpeg())])
            .unwrap();

        assert_eq!(registry.all().len(), 2);
        assert!(registry.find(&Kind::file(), "png", "jpeg").is_some());
    }

    #[test]
    fn kind_crossing_converter_is_a_contract_violation() {
        let mut registry = file_registry();
        let odd = UpcaseConverter::new(
            concept::png(),
            Concept::new("usd", Kind::new("currency"), &[]),
        );
        assert!(matches!(
            registry.register(vec![odd]),
            Err(ConvertError::ContractViolation(_))
        ));
        assert!(registry.all().is_empty());
    }

    #[test]
    fn matrix_and_flat_list_stay_consistent() {
        let mut registry = file_registry();
        registry
            .register(vec![
                UpcaseConverter::new(concept::png(), concept::jpeg()),
                UpcaseConverter::new(concept::jpeg(), concept::png()),
                UpcaseConverter::new(concept::gif(), concept::png()),
            ])
            .unwrap();

        // every flat entry has a mirror in the matrix
        for converter in registry.all() {
            let found = registry
                .find(
                    converter.source().kind(),
                    converter.source().name(),
                    converter.target().name(),
                )
                .expect("flat entry present in matrix");
            assert!(Arc::ptr_eq(found, converter));
        }
        // and the pair count matches
        assert_eq!(registry.conversions(&Kind::file()).len(), registry.all().len());
    }

    #[test]
    fn discovery_views_group_by_source_and_target() {
        let mut registry = file_registry();
        registry
            .register(vec![
                UpcaseConverter::new(concept::png(), concept::jpeg()),
                UpcaseConverter::new(concept::png(), concept::gif()),
                UpcaseConverter::new(concept::bmp(), concept::jpeg()),
            ])
            .unwrap();

        assert_eq!(registry.by_source(&Kind::file(), "png").len(), 2);
        assert_eq!(registry.by_target(&Kind::file(), "jpeg").len(), 2);
        assert_eq!(registry.by_kind(&Kind::file()).len(), 3);
        assert!(registry.by_source(&Kind::file(), "webp").is_empty());
    }
}

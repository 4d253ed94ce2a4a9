//! Concept identity and alias normalization.
//!
//! A [`Concept`] is a canonical named thing a conversion can originate from
//! or target — for file conversions, an image format. Each concept belongs
//! to a [`Kind`] (its category) and may declare aliases ("jpg" and "jpe"
//! both resolve to "jpeg").
//!
//! The [`Catalog`] owns the name/alias index. It is an explicit value, not
//! process-global state: tests build their own catalogs, and the catalog
//! used for dispatch is frozen inside the registry before any conversion
//! traffic runs.
//!
//! Absence is never an error here. "Unknown format" is an expected outcome
//! for user-supplied tokens, so [`Catalog::normalize`] returns an `Option`.

use std::collections::HashMap;
use std::fmt;

/// Category tag scoping which concepts are convertible to one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Kind(String);

impl Kind {
    pub fn new(name: impl Into<String>) -> Self {
        Kind(name.into())
    }

    /// The file-format category all built-in converters live in.
    pub fn file() -> Self {
        Kind::new("file")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable named identity with a category and alternate spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    name: String,
    kind: Kind,
    aliases: Vec<String>,
}

impl Concept {
    pub fn new(name: impl Into<String>, kind: Kind, aliases: &[&str]) -> Self {
        Concept {
            name: name.into(),
            kind,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Canonical name. Registry lookup keys on this, never on an alias.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

// Built-in file-format concepts, mirrored by `Catalog::builtin`.

pub fn png() -> Concept {
    Concept::new("png", Kind::file(), &[])
}

pub fn jpeg() -> Concept {
    Concept::new("jpeg", Kind::file(), &["jpg", "jpe"])
}

pub fn svg() -> Concept {
    Concept::new("svg", Kind::file(), &[])
}

pub fn gif() -> Concept {
    Concept::new("gif", Kind::file(), &[])
}

pub fn bmp() -> Concept {
    Concept::new("bmp", Kind::file(), &["dib"])
}

pub fn tiff() -> Concept {
    Concept::new("tiff", Kind::file(), &["tif"])
}

pub fn webp() -> Concept {
    Concept::new("webp", Kind::file(), &[])
}

pub fn ico() -> Concept {
    Concept::new("ico", Kind::file(), &[])
}

pub fn heic() -> Concept {
    Concept::new("heic", Kind::file(), &["heif"])
}

/// Name/alias index over a set of concepts.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// name or alias -> concept
    by_token: HashMap<String, Concept>,
    /// kind -> concepts, insertion order
    by_kind: HashMap<Kind, Vec<Concept>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with every built-in file concept. HEIC is listed
    /// even though no built-in converter handles it yet; lookups for it
    /// normalize fine and dispatch reports the pair as unsupported.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();
        for concept in [
            png(),
            jpeg(),
            svg(),
            gif(),
            bmp(),
            tiff(),
            webp(),
            ico(),
            heic(),
        ] {
            catalog.insert(concept);
        }
        catalog
    }

    /// Register a concept and index it by name and every alias.
    ///
    /// A colliding name or alias is overwritten, not merged — last write
    /// wins, no error. This lets tests shadow built-ins, at the cost of
    /// silent reassignment.
    pub fn define(&mut self, name: &str, kind: Kind, aliases: &[&str]) -> Concept {
        let concept = Concept::new(name, kind, aliases);
        self.insert(concept.clone());
        concept
    }

    /// Index an already-constructed concept. Same overwrite semantics as
    /// [`Catalog::define`].
    pub fn insert(&mut self, concept: Concept) {
        self.by_token
            .insert(concept.name.clone(), concept.clone());
        for alias in &concept.aliases {
            self.by_token.insert(alias.clone(), concept.clone());
        }
        self.by_kind
            .entry(concept.kind.clone())
            .or_default()
            .push(concept);
    }

    /// Resolve a token as either a canonical name or an alias.
    pub fn normalize(&self, token: &str) -> Option<&Concept> {
        self.by_token.get(token)
    }

    /// All concepts in a category, in insertion order.
    pub fn list_by_kind(&self, kind: &Kind) -> &[Concept] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_by_canonical_name_and_alias_agree() {
        let catalog = Catalog::builtin();
        let by_name = catalog.normalize("jpeg").expect("jpeg defined");
        let by_alias = catalog.normalize("jpg").expect("jpg aliased");
        assert_eq!(by_name, by_alias);
        assert_eq!(by_alias.name(), "jpeg");

        let by_jpe = catalog.normalize("jpe").expect("jpe aliased");
        assert_eq!(by_jpe.name(), "jpeg");
    }

    #[test]
    fn every_builtin_alias_resolves() {
        let catalog = Catalog::builtin();
        for concept in catalog.list_by_kind(&Kind::file()).to_vec() {
            assert_eq!(catalog.normalize(concept.name()), Some(&concept));
            for alias in concept.aliases() {
                assert_eq!(catalog.normalize(alias), Some(&concept));
            }
        }
    }

    #[test]
    fn unknown_token_is_none_not_error() {
        let catalog = Catalog::builtin();
        assert!(catalog.normalize("this_is_not_a_format").is_none());
        assert!(catalog.normalize("").is_none());
    }

    #[test]
    fn redefinition_overwrites() {
        let mut catalog = Catalog::new();
        catalog.define("png", Kind::file(), &[]);
        let shadowed = catalog.define("png", Kind::new("test-double"), &["fake-png"]);

        assert_eq!(catalog.normalize("png"), Some(&shadowed));
        assert_eq!(catalog.normalize("fake-png"), Some(&shadowed));
    }

    #[test]
    fn list_by_kind_keeps_insertion_order() {
        let mut catalog = Catalog::new();
        catalog.define("a", Kind::file(), &[]);
        catalog.define("b", Kind::file(), &[]);
        catalog.define("c", Kind::new("other"), &[]);

        let names: Vec<_> = catalog
            .list_by_kind(&Kind::file())
            .iter()
            .map(Concept::name)
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert!(catalog.list_by_kind(&Kind::new("missing")).is_empty());
    }
}

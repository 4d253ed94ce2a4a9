//! Declarative converter parameters.
//!
//! Each converter advertises a [`ParamSet`]: the names it accepts, their
//! defaults, and a validator per parameter. Parameter values travel as
//! strings end to end; numeric parsing happens inside validators and in the
//! [`ResolvedParams`] accessors. A declarative set plus one generic checker
//! keeps validation out of the individual codec adapters, where it would
//! otherwise be copy-pasted per converter.
//!
//! Validators are pure functions of a single string and safe to run from
//! any number of threads at once.

use crate::error::{ConvertError, Result};
use std::collections::BTreeMap;

/// Target pixel width. "0" means no constraint on that axis.
pub const WIDTH: &str = "width";
/// Target pixel height. "0" means no constraint on that axis.
pub const HEIGHT: &str = "height";
/// Lossy encode quality, 1–100 inclusive.
pub const QUALITY: &str = "quality";

/// Pass/fail-with-reason check applied to a caller-supplied value.
///
/// A small sum of the common shapes rather than an opaque closure, so
/// specs stay `Clone` and introspectable. [`Validator::Custom`] is the
/// escape hatch for one-off rules.
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    /// Accept anything.
    None,
    /// Empty or a base-10 integer >= 0 that fits a pixel dimension.
    NonNegativeInt,
    /// Non-empty integer within `[min, max]`.
    IntRange { min: i64, max: i64 },
    /// Any non-empty string.
    NonEmpty,
    Custom(fn(&str) -> std::result::Result<(), String>),
}

impl Validator {
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        match self {
            Validator::None => Ok(()),
            Validator::NonNegativeInt => {
                if value.is_empty() {
                    return Ok(());
                }
                // u32 bound: dimensions are consumed as u32, and a value
                // that only survives parsing at a wider width would
                // otherwise fall back to 0 downstream and silently mean
                // "do not resize".
                value
                    .parse::<u32>()
                    .map(|_| ())
                    .map_err(|_| {
                        format!("must be a non-negative integer below {}", u32::MAX as u64 + 1)
                    })
            }
            Validator::IntRange { min, max } => {
                if value.is_empty() {
                    return Err("value is required".to_string());
                }
                let v: i64 = value
                    .parse()
                    .map_err(|_| "must be an integer".to_string())?;
                if v < *min || v > *max {
                    return Err(format!("must be in range [{min}, {max}]"));
                }
                Ok(())
            }
            Validator::NonEmpty => {
                if value.is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
            Validator::Custom(check) => check(value),
        }
    }
}

/// Declared name, description, default, required flag, and validator for
/// one converter-accepted option.
///
/// Owned by exactly one converter; [`crate::registry::Converter::params`]
/// hands out clones so callers cannot mutate the originals.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub default: String,
    pub required: bool,
    pub validator: Validator,
}

impl ParamSpec {
    pub fn new(name: &str, description: &str, default: &str, validator: Validator) -> Self {
        ParamSpec {
            name: name.to_string(),
            description: description.to_string(),
            default: default.to_string(),
            required: false,
            validator,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Standard width spec shared by the raster converters.
pub fn width_spec() -> ParamSpec {
    ParamSpec::new(
        WIDTH,
        "Output width in pixels. Positive integer; default 0 leaves the axis unconstrained.",
        "0",
        Validator::NonNegativeInt,
    )
}

/// Standard height spec shared by the raster converters.
pub fn height_spec() -> ParamSpec {
    ParamSpec::new(
        HEIGHT,
        "Output height in pixels. Positive integer; default 0 leaves the axis unconstrained.",
        "0",
        Validator::NonNegativeInt,
    )
}

/// Quality spec for lossy targets.
pub fn quality_spec() -> ParamSpec {
    ParamSpec::new(
        QUALITY,
        "Encode quality for lossy output, 1 to 100 inclusive. Higher is better.",
        "100",
        Validator::IntRange { min: 1, max: 100 },
    )
}

/// Ordered name -> spec mapping for one converter.
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    specs: Vec<ParamSpec>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add specs. A name collision replaces the earlier spec in place —
    /// last append wins, mirroring concept redefinition semantics.
    pub fn append(&mut self, specs: impl IntoIterator<Item = ParamSpec>) {
        for spec in specs {
            match self.specs.iter_mut().find(|s| s.name == spec.name) {
                Some(existing) => *existing = spec,
                None => self.specs.push(spec),
            }
        }
    }

    pub fn specs(&self) -> &[ParamSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Validate caller-supplied values and fill in defaults.
    ///
    /// Supplied values run their validator; a failure is an illegal-param
    /// error naming the parameter and the offending value. Missing values
    /// take the declared default verbatim — defaults are author-controlled
    /// and deliberately skip validation. Keys the set never declared are
    /// dropped, so the result holds exactly the declared names.
    pub fn check_and_resolve(&self, provided: &BTreeMap<String, String>) -> Result<ResolvedParams> {
        let mut values = BTreeMap::new();
        for spec in &self.specs {
            match provided.get(&spec.name) {
                Some(value) => {
                    spec.validator
                        .check(value)
                        .map_err(|reason| ConvertError::IllegalParam {
                            name: spec.name.clone(),
                            value: value.clone(),
                            reason,
                        })?;
                    values.insert(spec.name.clone(), value.clone());
                }
                None => {
                    values.insert(spec.name.clone(), spec.default.clone());
                }
            }
        }
        Ok(ResolvedParams { values })
    }
}

/// Output of [`ParamSet::check_and_resolve`]: exactly the declared
/// parameter names, each either validated or defaulted.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    values: BTreeMap<String, String>,
}

impl ResolvedParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn parsed(&self, name: &str) -> Option<u32> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Resolved width; 0 when unset or unparseable.
    pub fn width(&self) -> u32 {
        self.parsed(WIDTH).unwrap_or(0)
    }

    /// Resolved height; 0 when unset or unparseable.
    pub fn height(&self) -> u32 {
        self.parsed(HEIGHT).unwrap_or(0)
    }

    /// Resolved quality; falls back to 100 when unset or zero.
    pub fn quality(&self) -> u8 {
        match self.parsed(QUALITY) {
            Some(q) if q >= 1 && q <= 100 => q as u8,
            _ => 100,
        }
    }
}

/// Parse `key=value` override strings as accepted on the command line.
///
/// Each entry may carry several pairs joined by `;`. Whitespace around
/// keys and values is trimmed; empty segments between semicolons are
/// skipped.
pub fn parse_overrides(entries: &[String]) -> std::result::Result<BTreeMap<String, String>, String> {
    let mut overrides = BTreeMap::new();
    for entry in entries {
        for item in entry.split(';') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let Some((key, value)) = item.split_once('=') else {
                return Err(format!("expected key=value, got {item:?}"));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("empty key in {item:?}"));
            }
            overrides.insert(key.to_string(), value.trim().to_string());
        }
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_set() -> ParamSet {
        let mut set = ParamSet::new();
        set.append([width_spec(), height_spec(), quality_spec()]);
        set
    }

    #[test]
    fn no_supplied_values_yields_exactly_the_defaults() {
        let resolved = raster_set()
            .check_and_resolve(&BTreeMap::new())
            .expect("defaults resolve");

        assert_eq!(resolved.get(WIDTH), Some("0"));
        assert_eq!(resolved.get(HEIGHT), Some("0"));
        assert_eq!(resolved.get(QUALITY), Some("100"));
        // "0" means do not resize
        assert_eq!(resolved.width(), 0);
        assert_eq!(resolved.height(), 0);
    }

    #[test]
    fn validator_failure_names_the_parameter() {
        let provided = BTreeMap::from([(QUALITY.to_string(), "150".to_string())]);
        let err = raster_set().check_and_resolve(&provided).unwrap_err();

        match err {
            ConvertError::IllegalParam { name, value, .. } => {
                assert_eq!(name, QUALITY);
                assert_eq!(value, "150");
            }
            other => panic!("expected IllegalParam, got {other:?}"),
        }
    }

    #[test]
    fn non_integer_width_is_illegal() {
        let provided = BTreeMap::from([(WIDTH.to_string(), "wide".to_string())]);
        assert!(matches!(
            raster_set().check_and_resolve(&provided),
            Err(ConvertError::IllegalParam { .. })
        ));
    }

    #[test]
    fn unknown_keys_are_silently_dropped() {
        let provided = BTreeMap::from([
            (WIDTH.to_string(), "640".to_string()),
            ("sepia".to_string(), "yes".to_string()),
        ]);
        let resolved = raster_set().check_and_resolve(&provided).unwrap();

        assert_eq!(resolved.width(), 640);
        assert_eq!(resolved.get("sepia"), None);
    }

    #[test]
    fn append_replaces_on_name_collision() {
        let mut set = ParamSet::new();
        set.append([quality_spec()]);
        set.append([ParamSpec::new(QUALITY, "relaxed", "50", Validator::None)]);

        assert_eq!(set.specs().len(), 1);
        assert_eq!(set.specs()[0].default, "50");

        let provided = BTreeMap::from([(QUALITY.to_string(), "150".to_string())]);
        // the replacement spec has no range check
        assert!(set.check_and_resolve(&provided).is_ok());
    }

    #[test]
    fn quality_range_bounds() {
        let v = Validator::IntRange { min: 1, max: 100 };
        assert!(v.check("1").is_ok());
        assert!(v.check("100").is_ok());
        assert!(v.check("0").is_err());
        assert!(v.check("101").is_err());
        assert!(v.check("").is_err());
        assert!(v.check("high").is_err());
    }

    #[test]
    fn non_negative_int_allows_empty() {
        let v = Validator::NonNegativeInt;
        assert!(v.check("").is_ok());
        assert!(v.check("0").is_ok());
        assert!(v.check("-3").is_err());
    }

    #[test]
    fn oversized_width_is_illegal_not_a_silent_no_resize() {
        // one past u32::MAX parses as u64 but cannot be a dimension;
        // letting it through would downstream read as width 0
        let provided = BTreeMap::from([(WIDTH.to_string(), "4294967296".to_string())]);
        assert!(matches!(
            raster_set().check_and_resolve(&provided),
            Err(ConvertError::IllegalParam { ref name, .. }) if name == WIDTH
        ));

        let provided = BTreeMap::from([(WIDTH.to_string(), u32::MAX.to_string())]);
        let resolved = raster_set().check_and_resolve(&provided).unwrap();
        assert_eq!(resolved.width(), u32::MAX);
    }

    #[test]
    fn quality_has_a_default_and_is_not_required() {
        let spec = quality_spec();
        assert!(!spec.required);
        assert_eq!(spec.default, "100");
    }

    #[test]
    fn parse_overrides_accepts_semicolon_joined_pairs() {
        let entries = vec!["width=800;height=600".to_string(), "quality=85".to_string()];
        let map = parse_overrides(&entries).unwrap();
        assert_eq!(map.get("width").map(String::as_str), Some("800"));
        assert_eq!(map.get("height").map(String::as_str), Some("600"));
        assert_eq!(map.get("quality").map(String::as_str), Some("85"));
    }

    #[test]
    fn parse_overrides_rejects_bare_tokens() {
        assert!(parse_overrides(&["width".to_string()]).is_err());
        assert!(parse_overrides(&["=800".to_string()]).is_err());
        // trailing semicolons are harmless
        assert!(parse_overrides(&["width=1;".to_string()]).is_ok());
    }
}

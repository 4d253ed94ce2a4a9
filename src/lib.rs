//! # Morph
//!
//! Image format conversion behind a pluggable converter registry. A caller
//! asks to convert bytes "of concept A to concept B within category K"
//! without knowing which concrete converter does the work; the core
//! normalizes names, finds the converter, validates parameters, and routes
//! the bytes through it.
//!
//! # Architecture: Dispatch Over a Frozen Registry
//!
//! ```text
//! caller
//!   └─► Engine (dispatch facade)
//!         └─► Catalog  — normalize "jpg" → concept "jpeg"
//!         └─► Registry — kind → source → target → converter
//!               └─► Converter
//!                     └─► check params → decode → resize → encode
//! ```
//!
//! Everything mutable happens at startup: the catalog and registry are
//! built once, by a single writer, before any conversion traffic. After
//! that every structure is read-only, so dispatch needs no locks and one
//! engine serves any number of concurrent requests. Each request is
//! independent — there is no state between invocations, and nothing is
//! ever retried (conversion is deterministic; same input, same output).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`concept`] | Concept identity, aliases, the catalog |
//! | [`params`] | Declarative parameter specs, validation, defaulting |
//! | [`registry`] | The `Converter` trait and indexed converter storage |
//! | [`engine`] | Dispatch facade: lookup, capability probe, convert |
//! | [`codecs`] | Built-in converters over `image`, `resvg`, `base64` |
//! | [`cancel`] | Cooperative cancellation polled between pipeline phases |
//! | [`error`] | Error taxonomy (`thiserror`) |
//! | [`output`] | CLI listing output, text and JSON |
//!
//! # Design Decisions
//!
//! ## Bytes at the Boundary
//!
//! Every converter consumes and produces opaque byte buffers. There is no
//! generic converter interface with adapter shims: fixing the boundary
//! type to bytes removes a whole class of contract-violation errors and
//! keeps the registry homogeneous.
//!
//! ## Explicit Construction, No Globals
//!
//! Catalogs, registries, and engines are ordinary values built by explicit
//! functions. Tests construct isolated engines with their own catalogs and
//! converter lists; nothing registers itself through ambient state.
//!
//! ## Absence Is Not an Error
//!
//! Unknown format tokens and unsupported pairs are expected, common
//! outcomes of user input. The catalog and registry report them as
//! `Option::None`; only the facade translates that into a classified
//! error, carrying the caller's original tokens for diagnostics.
//!
//! ## Strings on the Wire, Validators at the Gate
//!
//! Parameter values travel as strings from the command line to the encode
//! step. Each converter declares its parameters once — name, description,
//! default, validator — and a single generic checker enforces the
//! contract, so codec adapters never parse or validate user input.

pub mod cancel;
pub mod codecs;
pub mod concept;
pub mod engine;
pub mod error;
pub mod output;
pub mod params;
pub mod registry;

pub use cancel::CancelToken;
pub use concept::{Catalog, Concept, Kind};
pub use engine::Engine;
pub use error::{ConvertError, Result};
pub use registry::{Converter, Registry};

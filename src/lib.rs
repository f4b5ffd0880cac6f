//! Weft - Semantic core for an API-description language
//!
//! This crate re-exports all layers of the Weft system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: weft_http       - HTTP attributes, case conversion, route and response validators
//! Layer 1: weft_checker    - Binder, type evaluation, relations, templates, attribute engine
//! Layer 0: weft_foundation - Spans, handles, errors, diagnostics
//! ```

pub use weft_checker as checker;
pub use weft_foundation as foundation;
pub use weft_http as http;

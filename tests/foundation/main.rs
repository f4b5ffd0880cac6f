//! Integration tests for Layer 0: Foundation
//!
//! Tests for spans, arena handles, errors, and the diagnostic collector.

mod diagnostics;
mod errors;
mod spans;

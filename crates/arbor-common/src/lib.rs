//! Common utilities for the Arbor parser.
//!
//! This crate provides shared infrastructure used by the parser and loader:
//! - **Warning System** - deduplicated warnings routed through `tracing`

pub mod warning;

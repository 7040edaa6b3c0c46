//! tessera_core: Core utilities for the Tessera front end.
//!
//! Provides source spans with line/column tracking and the ordered
//! collections shared by the scanner, the parser and the diagnostics layer.

pub mod collections;
pub mod text;

// Re-export commonly used types
pub use collections::OrderedMap;
pub use text::{LineAndColumn, LineMap, Span, TextRange};

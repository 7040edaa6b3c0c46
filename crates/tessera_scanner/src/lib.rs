//! tessera_scanner: Reference tokenizer for Tessera source text.
//!
//! Produces the token stream consumed by `tessera_parser`. The parser also
//! uses it to re-tokenize embedded expression islands and WHERE strings, with
//! positions offset into the enclosing file.

mod scanner;

pub use scanner::{Scanner, ScannerState};

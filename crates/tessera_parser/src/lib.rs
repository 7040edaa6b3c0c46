//! tessera_parser: Recursive descent parser for the Tessera tag notation.
//!
//! Parses token streams from the scanner into an arena-allocated AST.
//! Structural problems become diagnostics in the caller's sink; the parse
//! itself always completes.

mod attributes;
pub mod catalog;
mod cursor;
mod decl;
mod expr;
mod interpret;
mod island;
mod parser;
mod stmt;
mod typename;
mod utilities;

pub use attributes::{AttrKind, AttrValue, AttributeCollection};
pub use cursor::TokenCursor;
pub use interpret::Interpreter;
pub use island::IslandError;
pub use parser::Parser;

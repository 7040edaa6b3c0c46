//! tessera_ast: Token and syntax tree definitions for the Tessera front end.
//!
//! Defines the token kinds consumed by the parser, the arena-allocated program
//! tree it produces, and the typed semantic values (types, effects, modifier
//! sets) stored on declarations.

pub mod node;
pub mod syntax_kind;
pub mod token;
pub mod types;

// Re-export key types
pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use token::{LiteralValue, Token};
pub use types::*;

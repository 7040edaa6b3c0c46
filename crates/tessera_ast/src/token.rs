//! Tokens consumed by the parser.

use crate::syntax_kind::SyntaxKind;
use tessera_core::text::Span;

/// Decoded value of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Float(f64),
    /// String contents with escapes resolved.
    String(String),
    Char(char),
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: SyntaxKind,
    /// The raw source text of the token, quotes and escapes included.
    pub text: String,
    /// The decoded literal, for literal tokens.
    pub value: Option<LiteralValue>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
            span,
        }
    }

    pub fn with_value(mut self, value: LiteralValue) -> Self {
        self.value = Some(value);
        self
    }

    /// A zero-width token synthesized during error recovery.
    pub fn missing(kind: SyntaxKind, span: Span) -> Self {
        Self::new(kind, "", span)
    }

    #[inline]
    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.kind == kind
    }

    /// Whether this is an identifier with exactly the given text.
    #[inline]
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == SyntaxKind::Identifier && self.text == text
    }

    /// The unescaped contents of a string literal.
    pub fn string_value(&self) -> Option<&str> {
        match self.value {
            Some(LiteralValue::String(ref s)) => Some(s),
            _ => None,
        }
    }
}

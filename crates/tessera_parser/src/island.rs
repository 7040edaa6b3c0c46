//! Expressions embedded in attribute values and string payloads.
//!
//! An attribute value that is exactly one balanced `( ... )` run is an
//! island: its reassembled text is scanned again, with positions offset into
//! the enclosing file, and parsed by a nested parser that reports into the
//! same sink. A malformed island degrades to a plain reference to its text.

use thiserror::Error;

use tessera_ast::node::{Expr, Literal, LiteralKind, RefExpr};
use tessera_ast::token::Token;
use tessera_core::text::Span;
use tessera_diagnostics::messages;
use tessera_scanner::Scanner;

use crate::attributes::{AttrKind, AttrValue};
use crate::parser::Parser;
use crate::utilities::literal_from_text;

/// Why an island could not be used as an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IslandError {
    #[error("embedded text `{0}` could not be scanned")]
    Lexical(String),
    #[error("embedded expression `{0}` is malformed")]
    Syntax(String),
    #[error("embedded expression `{0}` has trailing content")]
    TrailingTokens(String),
}

impl<'a, 's> Parser<'a, 's> {
    /// Scan embedded text located at `origin`, forwarding scanner
    /// diagnostics to the sink.
    pub(crate) fn scan_embedded(&mut self, text: &str, origin: Span) -> Vec<Token> {
        let mut scanner = Scanner::new(text)
            .with_origin(origin)
            .with_file_name(self.options.file_name.as_str());
        let tokens = scanner.scan_all();
        for diagnostic in scanner.take_diagnostics().into_diagnostics() {
            self.sink.add(diagnostic);
        }
        tokens
    }

    /// The expression an attribute value denotes: an island is parsed, a
    /// quoted value is a string, numbers and `true`/`false`/`null` are
    /// literals, and any other text is a reference.
    pub(crate) fn attr_expr(&mut self, value: &AttrValue) -> &'a Expr<'a> {
        let span = value.span;
        match value.kind {
            AttrKind::Island => self.parse_island(value),
            AttrKind::Quoted(ref text) => {
                let text = self.alloc_str(text);
                self.alloc(Expr::Literal(Literal {
                    kind: LiteralKind::String(text),
                    span,
                }))
            }
            AttrKind::Plain if value.is_empty() => self.alloc(Expr::Missing(span)),
            AttrKind::Plain => match literal_from_text(&value.text) {
                Some(kind) => self.alloc(Expr::Literal(Literal { kind, span })),
                None => {
                    let path = self.alloc_str(&value.text);
                    self.alloc(Expr::Ref(RefExpr { path, span }))
                }
            },
        }
    }

    pub(crate) fn parse_island(&mut self, value: &AttrValue) -> &'a Expr<'a> {
        match self.try_parse_island(value) {
            Ok(expr) => expr,
            Err(err) => {
                log::debug!("{}; keeping it as a reference", err);
                if let IslandError::TrailingTokens(ref text) = err {
                    self.error(
                        value.span,
                        &messages::EMBEDDED_EXPRESSION_0_TREATED_AS_REFERENCE,
                        &[text.as_str()],
                    );
                }
                let path = self.alloc_str(&value.text);
                self.alloc(Expr::Ref(RefExpr {
                    path,
                    span: value.span,
                }))
            }
        }
    }

    /// Parse an island on its own token stream. Scanner problems were
    /// already reported when the enclosing file was scanned, so a second
    /// scan only decides whether the island is usable.
    pub fn try_parse_island(&mut self, value: &AttrValue) -> Result<&'a Expr<'a>, IslandError> {
        let mut scanner = Scanner::new(&value.text)
            .with_origin(value.span)
            .with_file_name(self.options.file_name.as_str());
        let tokens = scanner.scan_all();
        if scanner.diagnostics().has_errors() {
            return Err(IslandError::Lexical(value.text.clone()));
        }

        let errors_before = self.sink.error_count();
        let mut nested = self.nested(tokens);
        let expr = nested.parse_expression();
        let trailing = !nested.cursor.is_at_end();
        drop(nested);

        if self.sink.error_count() > errors_before {
            return Err(IslandError::Syntax(value.text.clone()));
        }
        if trailing {
            return Err(IslandError::TrailingTokens(value.text.clone()));
        }
        Ok(expr)
    }
}

//! Random-access cursor over a finished token stream.

use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::token::Token;
use tessera_core::text::Span;

pub struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    /// Wrap a token stream, appending an end-of-file token when it lacks one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != SyntaxKind::EndOfFileToken) {
            let span = tokens
                .last()
                .map_or_else(Span::default, |t| t.span.shrink_to_end());
            tokens.push(Token::missing(SyntaxKind::EndOfFileToken, span));
        }
        Self { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &Token {
        self.peek(0)
    }

    /// The token `n` places ahead; reading past the end yields the
    /// end-of-file token.
    #[inline]
    pub fn peek(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// The most recently consumed token, or the current one at the start.
    pub fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.current().kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.kind() == SyntaxKind::EndOfFileToken
    }

    /// Move to the next token. Does nothing at end of input.
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    #[inline]
    pub fn check(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    #[inline]
    pub fn check_at(&self, n: usize, kind: SyntaxKind) -> bool {
        self.peek(n).kind == kind
    }

    /// Consume the current token if it has the given kind.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn save(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn restore(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len() - 1);
    }

    /// Whether the current token starts exactly where the previous one ended.
    pub fn is_adjacent(&self) -> bool {
        self.pos > 0 && self.previous().span.touches(&self.current().span)
    }

    /// Whether the tokens at `n` and `n + 1` touch.
    pub fn touches_next(&self, n: usize) -> bool {
        let next = self.peek(n + 1);
        next.kind != SyntaxKind::EndOfFileToken && self.peek(n).span.touches(&next.span)
    }

    /// Span from `start` through the last consumed token.
    pub fn span_from(&self, start: Span) -> Span {
        if self.pos == 0 {
            return start;
        }
        start.cover(&self.previous().span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_scanner::Scanner;

    #[test]
    fn test_eof_is_appended_and_sticky() {
        let mut tokens = Scanner::new("a b").scan_all();
        tokens.pop();
        let mut cursor = TokenCursor::new(tokens);
        assert_eq!(cursor.peek(5).kind, SyntaxKind::EndOfFileToken);
        cursor.advance();
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.previous().text, "b");
    }

    #[test]
    fn test_save_restore() {
        let mut cursor = TokenCursor::new(Scanner::new("( a )").scan_all());
        let mark = cursor.save();
        assert!(cursor.eat(SyntaxKind::OpenParenToken));
        assert!(!cursor.eat(SyntaxKind::OpenParenToken));
        cursor.restore(mark);
        assert!(cursor.check(SyntaxKind::OpenParenToken));
    }

    #[test]
    fn test_adjacency() {
        let cursor = TokenCursor::new(Scanner::new("a.b c").scan_all());
        assert!(cursor.touches_next(0));
        assert!(cursor.touches_next(1));
        assert!(!cursor.touches_next(2));
    }
}

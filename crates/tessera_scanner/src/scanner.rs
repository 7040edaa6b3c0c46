//! The Tessera scanner.
//!
//! Converts source text into the token stream the parser consumes. Positions
//! are byte offsets; every token records the line and column of both ends.

use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::token::{LiteralValue, Token};
use tessera_core::text::{LineAndColumn, LineMap, Span, TextRange};
use tessera_diagnostics::{
    messages, Diagnostic, DiagnosticCollection, DiagnosticMessage, DiagnosticSink,
};

/// Saved scanner state for lookahead.
pub struct ScannerState {
    pub pos: usize,
    pub token_start: usize,
    pub token: SyntaxKind,
    pub token_value: Option<LiteralValue>,
}

/// The scanner converts Tessera source text into tokens.
pub struct Scanner {
    /// The source text being scanned.
    text: String,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// Decoded value of the current literal token.
    token_value: Option<LiteralValue>,
    line_map: LineMap,
    /// Location of this text inside an enclosing file, for embedded text.
    origin: Option<Span>,
    file_name: String,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: None,
            line_map: LineMap::new(text),
            origin: None,
            file_name: String::new(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Report positions relative to `origin`, the span this text occupies in
    /// an enclosing file.
    pub fn with_origin(mut self, origin: Span) -> Self {
        self.origin = Some(origin);
        self
    }

    /// File name attached to scanner diagnostics.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Raw source text of the current token.
    #[inline]
    pub fn token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    pub fn token_value(&self) -> Option<&LiteralValue> {
        self.token_value.as_ref()
    }

    /// Located span of the current token.
    pub fn token_span(&self) -> Span {
        self.span_of(self.token_start, self.pos)
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Materialize the current token.
    pub fn token_info(&self) -> Token {
        let token = Token::new(self.token, self.token_text(), self.token_span());
        match self.token_value {
            Some(ref value) => token.with_value(value.clone()),
            None => token,
        }
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.token = state.token;
        self.token_value = state.token_value;
    }

    /// Look ahead: save state, call f, restore state and return the result.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let state = self.save_state();
        let result = f(self);
        self.restore_state(state);
        result
    }

    /// Scan the whole text. The returned stream always ends with one
    /// end-of-file token.
    pub fn scan_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let kind = self.scan();
            tokens.push(self.token_info());
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
        }
        tokens
    }

    // ========================================================================
    // Character helpers
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Look at the character `offset` characters past the current one.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset)
    }

    /// Advance past the current character.
    #[inline]
    fn bump(&mut self) {
        if let Some(ch) = self.current_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn location(&self, pos: usize) -> LineAndColumn {
        let local = self.line_map.line_and_column_of(pos as u32);
        match self.origin {
            Some(origin) if local.line == 0 => {
                LineAndColumn::new(origin.start.line, origin.start.column + local.column)
            }
            Some(origin) => LineAndColumn::new(origin.start.line + local.line, local.column),
            None => local,
        }
    }

    fn span_of(&self, start: usize, end: usize) -> Span {
        let base = self.origin.map_or(0, |o| o.range.pos);
        Span::new(
            TextRange::new(base + start as u32, base + end as u32),
            self.location(start),
            self.location(end),
        )
    }

    fn error(&mut self, start: usize, message: &DiagnosticMessage) {
        let span = self.span_of(start, self.pos.max(start));
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            span,
            message,
            &[],
        ));
    }

    /// Skip whitespace and `;` line comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                ';' => {
                    while let Some(c) = self.current_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                c if c.is_whitespace() => self.bump(),
                _ => return,
            }
        }
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value = None;
        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '[' => self.single(SyntaxKind::OpenBracketToken),
            ']' => self.single(SyntaxKind::CloseBracketToken),
            '{' => self.single(SyntaxKind::OpenBraceToken),
            '}' => self.single(SyntaxKind::CloseBraceToken),
            '(' => self.single(SyntaxKind::OpenParenToken),
            ')' => self.single(SyntaxKind::CloseParenToken),
            ':' => self.single(SyntaxKind::ColonToken),
            ',' => self.single(SyntaxKind::CommaToken),
            '/' => self.single(SyntaxKind::SlashToken),
            '~' => self.single(SyntaxKind::TildeToken),
            '#' => self.single(SyntaxKind::HashToken),
            '@' => self.single(SyntaxKind::AtToken),
            '*' => self.single(SyntaxKind::AsteriskToken),
            '%' => self.single(SyntaxKind::PercentToken),
            '^' => self.single(SyntaxKind::CaretToken),
            '.' => self.pair('.', SyntaxKind::DotDotToken, SyntaxKind::DotToken),
            '?' => self.pair('?', SyntaxKind::QuestionQuestionToken, SyntaxKind::QuestionToken),
            '!' => self.pair('=', SyntaxKind::ExclamationEqualsToken, SyntaxKind::ExclamationToken),
            '+' => self.pair('+', SyntaxKind::PlusPlusToken, SyntaxKind::PlusToken),
            '&' => self.pair('&', SyntaxKind::AmpersandAmpersandToken, SyntaxKind::AmpersandToken),
            '|' => self.pair('|', SyntaxKind::BarBarToken, SyntaxKind::BarToken),
            '-' => self.scan_minus(),
            '=' => self.scan_equals(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '"' => self.scan_string_literal(),
            '\'' => self.scan_char_literal(),
            c if c.is_ascii_digit() => self.scan_number(),
            c if is_identifier_start(c) => self.scan_identifier(),
            _ => {
                self.bump();
                self.error(self.token_start, &messages::INVALID_CHARACTER);
                SyntaxKind::Unknown
            }
        };
        self.token
    }

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.bump();
        kind
    }

    /// One-character token, or a two-character one when `second` follows.
    fn pair(&mut self, second: char, long: SyntaxKind, short: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some(second) {
            self.pos += 1 + second.len_utf8();
            long
        } else {
            self.bump();
            short
        }
    }

    fn scan_minus(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('-') => {
                self.pos += 2;
                SyntaxKind::MinusMinusToken
            }
            Some('>') => {
                self.pos += 2;
                SyntaxKind::MinusGreaterThanToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::MinusToken
            }
        }
    }

    fn scan_equals(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('=') => {
                self.pos += 2;
                SyntaxKind::EqualsEqualsToken
            }
            Some('>') => {
                self.pos += 2;
                SyntaxKind::EqualsGreaterThanToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::EqualsToken
            }
        }
    }

    fn scan_less_than(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('<') => {
                self.pos += 2;
                SyntaxKind::LessThanLessThanToken
            }
            Some('=') => {
                self.pos += 2;
                SyntaxKind::LessThanEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::LessThanToken
            }
        }
    }

    // `>>` is scanned as one token; generic lists split it during parsing.
    fn scan_greater_than(&mut self) -> SyntaxKind {
        match self.char_at(1) {
            Some('>') => {
                self.pos += 2;
                SyntaxKind::GreaterThanGreaterThanToken
            }
            Some('=') => {
                self.pos += 2;
                SyntaxKind::GreaterThanEqualsToken
            }
            _ => {
                self.pos += 1;
                SyntaxKind::GreaterThanToken
            }
        }
    }

    /// Scan quoted content up to `quote`, resolving escapes. Returns `None`
    /// when the literal runs into a line break or the end of input.
    fn scan_quoted(&mut self, quote: char) -> Option<String> {
        self.bump(); // opening quote
        let mut result = String::new();
        loop {
            let ch = self.current_char()?;
            if ch == quote {
                self.bump();
                return Some(result);
            }
            if ch == '\n' {
                return None;
            }
            if ch == '\\' {
                self.bump();
                match self.scan_escape() {
                    Some(c) => result.push(c),
                    None => return None,
                }
                continue;
            }
            result.push(ch);
            self.bump();
        }
    }

    fn scan_escape(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.bump();
        let escaped = match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'u' if self.current_char() == Some('{') => {
                self.bump();
                let start = self.pos;
                while matches!(self.current_char(), Some(c) if c.is_ascii_hexdigit()) {
                    self.bump();
                }
                let digits = &self.text[start..self.pos];
                let code = u32::from_str_radix(digits, 16).ok();
                if self.current_char() == Some('}') {
                    self.bump();
                }
                code.and_then(char::from_u32).unwrap_or('\u{FFFD}')
            }
            // `\\`, `\"`, `\'` and any other escaped character stand for themselves.
            other => other,
        };
        Some(escaped)
    }

    fn scan_string_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        let value = match self.scan_quoted('"') {
            Some(value) => value,
            None => {
                self.error(start, &messages::UNTERMINATED_STRING_LITERAL);
                self.text[start + 1..self.pos].to_string()
            }
        };
        self.token_value = Some(LiteralValue::String(value));
        SyntaxKind::StringLiteral
    }

    /// A character literal decodes to `Char` only when it holds exactly one
    /// character; anything else keeps its contents as a string.
    fn scan_char_literal(&mut self) -> SyntaxKind {
        let start = self.pos;
        let value = match self.scan_quoted('\'') {
            Some(value) => value,
            None => {
                self.error(start, &messages::UNTERMINATED_STRING_LITERAL);
                self.text[start + 1..self.pos].to_string()
            }
        };
        let mut chars = value.chars();
        self.token_value = Some(match (chars.next(), chars.next()) {
            (Some(c), None) => LiteralValue::Char(c),
            _ => LiteralValue::String(value),
        });
        SyntaxKind::CharLiteral
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        self.scan_digits();

        let is_float =
            self.current_char() == Some('.') && self.char_at(1).is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.bump();
            self.scan_digits();
        }

        let text = self.text[start..self.pos].replace('_', "");
        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                self.token_value = Some(LiteralValue::Integer(value));
                return SyntaxKind::IntegerLiteral;
            }
        }
        // Integers too large for i64 fall back to floating point.
        self.token_value = text.parse::<f64>().ok().map(LiteralValue::Float);
        SyntaxKind::FloatLiteral
    }

    fn scan_digits(&mut self) {
        while matches!(self.current_char(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        self.bump();
        while self.current_char().is_some_and(is_identifier_part) {
            self.bump();
        }
        SyntaxKind::Identifier
    }
}

/// Check if a character can start an identifier.
fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

/// Check if a character can be part of an identifier.
fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}

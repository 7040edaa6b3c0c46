//! Attribute blocks: the `{a:b:c}` groups that follow a tag name.
//!
//! Each group is a colon-separated list of values. Values are recorded under
//! synthetic keys `_pos0`, `_pos1`, ... and the index continues across groups,
//! so `{f1}{Add}{pub}` and `{f1:Add:pub}` produce the same collection.
//! `ident=value` records a named attribute instead.

use crate::parser::Parser;
use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::token::Token;
use tessera_core::collections::OrderedMap;
use tessera_core::text::Span;
use tessera_diagnostics::messages;

#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    Plain,
    /// A single string literal; holds the unescaped contents.
    Quoted(String),
    /// Exactly one balanced parenthesised run, parsed later as an expression.
    Island,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrValue {
    /// The value's tokens reassembled, one space wherever the source had a gap.
    pub text: String,
    pub span: Span,
    pub kind: AttrKind,
}

impl AttrValue {
    /// The value as a string: unescaped contents for a quoted value, the
    /// reassembled text otherwise.
    pub fn as_str(&self) -> &str {
        match self.kind {
            AttrKind::Quoted(ref s) => s,
            _ => &self.text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttributeCollection {
    values: OrderedMap<String, AttrValue>,
    count: usize,
    groups: usize,
}

impl AttributeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_positional(&mut self, value: AttrValue) {
        self.values.insert(format!("_pos{}", self.count), value);
        self.count += 1;
    }

    pub fn insert_named(&mut self, key: &str, value: AttrValue) {
        self.values.insert(key.to_string(), value);
    }

    /// The value at `index`, or `None` when absent or empty.
    pub fn get(&self, index: usize) -> Option<&AttrValue> {
        self.values
            .get(format!("_pos{}", index).as_str())
            .filter(|v| !v.is_empty())
    }

    /// Shorthand for the string form of the value at `index`.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).map(AttrValue::as_str)
    }

    pub fn named(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    /// Number of positional values, empty ones included.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn group_count(&self) -> usize {
        self.groups
    }

    /// Positional values from `start` onward, in order, skipping empty ones.
    pub fn rest(&self, start: usize) -> impl Iterator<Item = &AttrValue> + '_ {
        (start..self.count).filter_map(move |i| self.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reassemble token texts, inserting one space where tokens do not touch.
pub(crate) fn join_tokens(tokens: &[Token]) -> String {
    let mut text = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && !tokens[i - 1].span.touches(&token.span) {
            text.push(' ');
        }
        text.push_str(&token.text);
    }
    text
}

fn classify(tokens: &[Token]) -> AttrKind {
    match tokens {
        [only] if only.kind == SyntaxKind::StringLiteral => {
            AttrKind::Quoted(only.string_value().unwrap_or_default().to_string())
        }
        [first, .., last]
            if first.kind == SyntaxKind::OpenParenToken
                && last.kind == SyntaxKind::CloseParenToken
                && closes_at_end(tokens) =>
        {
            AttrKind::Island
        }
        _ => AttrKind::Plain,
    }
}

/// Whether the paren opened by the first token is closed by the last one.
fn closes_at_end(tokens: &[Token]) -> bool {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            SyntaxKind::OpenParenToken => depth += 1,
            SyntaxKind::CloseParenToken => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == tokens.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

impl<'a, 's> Parser<'a, 's> {
    /// Parse every `{...}` group directly following a tag name.
    pub(crate) fn parse_attribute_blocks(&mut self, tag: &str) -> AttributeCollection {
        let mut attrs = AttributeCollection::new();
        while self.cursor.check(SyntaxKind::OpenBraceToken) {
            self.cursor.advance();
            attrs.groups += 1;
            self.parse_attribute_group(tag, &mut attrs);
        }
        if attrs.groups > 1 && self.options.warn_legacy_attributes {
            let span = self.cursor.previous().span;
            self.error(span, &messages::LEGACY_ATTRIBUTE_FORM_ON_0, &[tag]);
        }
        attrs
    }

    fn parse_attribute_group(&mut self, tag: &str, attrs: &mut AttributeCollection) {
        if self.cursor.eat(SyntaxKind::CloseBraceToken) {
            return;
        }
        loop {
            let named = self.cursor.check(SyntaxKind::Identifier)
                && self.cursor.check_at(1, SyntaxKind::EqualsToken);
            let key = if named {
                let key = self.cursor.current().text.clone();
                self.cursor.advance();
                self.cursor.advance();
                Some(key)
            } else {
                None
            };

            let value = self.parse_attribute_value(tag);
            match key {
                Some(key) => attrs.insert_named(&key, value),
                None => attrs.push_positional(value),
            }

            match self.cursor.kind() {
                SyntaxKind::ColonToken => self.cursor.advance(),
                SyntaxKind::CloseBraceToken => {
                    self.cursor.advance();
                    return;
                }
                _ => {
                    // The tag ended (or input ran out) inside the group.
                    let span = self.cursor.current().span;
                    self.error(span, &messages::_0_EXPECTED, &["}"]);
                    return;
                }
            }
        }
    }

    /// Collect one value: every token up to a `:` or `}` outside brackets,
    /// parentheses and generic angle brackets.
    fn parse_attribute_value(&mut self, tag: &str) -> AttrValue {
        let start = self.cursor.current().span.shrink_to_start();
        let mut tokens: Vec<Token> = Vec::new();
        let mut brackets = 0u32;
        let mut parens = 0u32;
        let mut angles = 0u32;
        let mut stray_angle: Option<Span> = None;

        loop {
            let token = self.cursor.current();
            let kind = token.kind;
            match kind {
                SyntaxKind::EndOfFileToken => break,
                SyntaxKind::ColonToken | SyntaxKind::CloseBraceToken
                    if brackets == 0 && parens == 0 =>
                {
                    break
                }
                SyntaxKind::CloseBracketToken if brackets == 0 => break,
                SyntaxKind::OpenBracketToken => brackets += 1,
                SyntaxKind::CloseBracketToken => brackets -= 1,
                SyntaxKind::OpenParenToken => parens += 1,
                SyntaxKind::CloseParenToken if parens > 0 => parens -= 1,
                // Comparisons inside an island are not generic brackets.
                SyntaxKind::LessThanToken if parens == 0 => angles += 1,
                SyntaxKind::GreaterThanToken if parens == 0 => {
                    if angles == 0 {
                        stray_angle.get_or_insert(token.span);
                    }
                    angles = angles.saturating_sub(1);
                }
                SyntaxKind::GreaterThanGreaterThanToken if parens == 0 => {
                    if angles < 2 {
                        stray_angle.get_or_insert(token.span);
                    }
                    angles = angles.saturating_sub(2);
                }
                _ => {}
            }
            tokens.push(token.clone());
            self.cursor.advance();
        }

        let text = join_tokens(&tokens);
        let span = match (tokens.first(), tokens.last()) {
            (Some(first), Some(last)) => first.span.cover(&last.span),
            _ => start,
        };
        if let Some(at) = stray_angle {
            self.error(at, &messages::UNEXPECTED_CLOSING_ANGLE_IN_0, &[text.as_str()]);
        }
        if angles > 0 {
            self.error(span, &messages::UNTERMINATED_GENERIC_ARGUMENT_LIST_IN_0, &[text.as_str()]);
        }
        log::trace!("attribute on {}: {:?}", tag, text);

        AttrValue {
            kind: classify(&tokens),
            text,
            span,
        }
    }
}

//! The Tessera parser.
//!
//! A recursive descent parser over a finished token stream. Tags (`[NAME
//! attrs payload]`) drive the structure; prefix forms (`(op args)`) are the
//! expressions. The parser never aborts: structural problems are reported to
//! the diagnostics sink and replaced by placeholders, and every dispatch that
//! fails to match consumes at least one token.

use bumpalo::Bump;
use tessera_ast::node::*;
use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::token::Token;
use tessera_core::text::Span;
use tessera_diagnostics::{messages, DiagnosticMessage, DiagnosticSink, IdMismatch, TextEdit};
use tessera_options::ParserOptions;

use crate::attributes::AttributeCollection;
use crate::catalog::tags::{self, TagKind};
use crate::cursor::TokenCursor;
use crate::interpret::Interpreter;
use crate::utilities::alloc_vec_in;

/// A tag seen at the cursor without consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PeekedTag {
    pub closing: bool,
    /// The catalog name, after alias and typo resolution. `None` when nothing
    /// in the catalog is close enough.
    pub name: Option<&'static str>,
}

/// A consumed tag name and its attribute blocks. The payload and the closing
/// `]` are left to the construct.
#[derive(Debug)]
pub(crate) struct TagHead {
    pub name: Option<&'static str>,
    pub closing: bool,
    pub attrs: AttributeCollection,
    /// From `[` through the tag name.
    pub span: Span,
}

impl TagHead {
    /// Position 0, the construct id, or `""` when absent.
    pub fn id(&self) -> &str {
        self.attrs.text(0).unwrap_or("")
    }
}

/// The parser produces a [`Program`] from a token stream.
pub struct Parser<'a, 's> {
    pub(crate) arena: &'a Bump,
    pub(crate) cursor: TokenCursor,
    pub(crate) sink: &'s mut dyn DiagnosticSink,
    pub(crate) options: ParserOptions,
    pub(crate) interp: Interpreter<'a>,
    /// Current nesting of tags and prefix forms.
    pub(crate) depth: u32,
    /// Scope tags opened and not yet closed, innermost last.
    pub(crate) open_tags: Vec<&'static str>,
    /// Generic argument lists currently open in a payload type name.
    pub(crate) generic_depth: u32,
    /// Set when a `>>` token has closed one generic list and still owes the
    /// enclosing list its second `>`.
    pub(crate) pending_angle: bool,
}

#[derive(Default)]
struct ProgramItems<'a> {
    module: Option<ModuleHeader<'a>>,
    imports: Vec<ImportDecl<'a>>,
    types: Vec<TypeDecl<'a>>,
    functions: Vec<FunctionDecl<'a>>,
    metadata: Vec<MetadataRecord<'a>>,
}

impl<'a, 's> Parser<'a, 's> {
    pub fn new(arena: &'a Bump, tokens: Vec<Token>, sink: &'s mut dyn DiagnosticSink) -> Self {
        Self::with_options(arena, tokens, sink, ParserOptions::default())
    }

    pub fn with_options(
        arena: &'a Bump,
        tokens: Vec<Token>,
        sink: &'s mut dyn DiagnosticSink,
        options: ParserOptions,
    ) -> Self {
        Self {
            arena,
            cursor: TokenCursor::new(tokens),
            sink,
            options,
            interp: Interpreter::new(arena),
            depth: 0,
            open_tags: Vec::new(),
            generic_depth: 0,
            pending_angle: false,
        }
    }

    /// A parser over a separate token stream (embedded text) that reports
    /// into the same sink.
    pub(crate) fn nested(&mut self, tokens: Vec<Token>) -> Parser<'a, '_> {
        Parser {
            arena: self.arena,
            cursor: TokenCursor::new(tokens),
            options: self.options.clone(),
            interp: self.interp,
            depth: self.depth,
            open_tags: Vec::new(),
            generic_depth: 0,
            pending_angle: false,
            sink: &mut *self.sink,
        }
    }

    /// Parse the whole stream. Always returns a tree; problems are in the sink.
    pub fn parse_program(mut self) -> Program<'a> {
        let start = self.cursor.current().span;
        let mut items = ProgramItems::default();
        self.parse_top_level(&mut items);
        log::debug!(
            "parsed {} type(s), {} function(s), {} error(s) reported",
            items.types.len(),
            items.functions.len(),
            self.sink.error_count()
        );

        Program {
            span: self.cursor.span_from(start),
            module: items.module,
            imports: self.alloc_slice(items.imports),
            types: self.alloc_slice(items.types),
            functions: self.alloc_slice(items.functions),
            metadata: self.alloc_slice(items.metadata),
        }
    }

    // ========================================================================
    // Allocation and reporting
    // ========================================================================

    #[inline]
    pub(crate) fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    #[inline]
    pub(crate) fn alloc_str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    #[inline]
    pub(crate) fn alloc_slice<T>(&self, items: Vec<T>) -> &'a [T] {
        alloc_vec_in(self.arena, items)
    }

    pub(crate) fn error(&mut self, span: Span, message: &DiagnosticMessage, args: &[&str]) {
        self.sink.report(&self.options.file_name, span, message, args);
    }

    /// Report with a replacement edit for `span`, unless fixes are disabled.
    pub(crate) fn suggest(
        &mut self,
        span: Span,
        message: &DiagnosticMessage,
        args: &[&str],
        replacement: &str,
    ) {
        if self.options.suggest_fixes {
            let fix = TextEdit::replace(&self.options.file_name, span, replacement);
            self.sink
                .report_with_fix(&self.options.file_name, span, message, args, fix);
        } else {
            self.error(span, message, args);
        }
    }

    /// Consume a token of `kind`, or report it missing and synthesize an empty
    /// placeholder at the current position.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Token {
        let token = self.cursor.current().clone();
        if token.kind == kind {
            self.cursor.advance();
            return token;
        }
        self.error(token.span, &messages::_0_EXPECTED, &[kind.describe()]);
        Token::missing(kind, token.span.shrink_to_start())
    }

    /// Enter one nesting level; reports and returns `false` past the limit.
    pub(crate) fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > self.options.max_nesting_depth {
            self.depth -= 1;
            let limit = self.options.max_nesting_depth.to_string();
            let span = self.cursor.current().span;
            self.error(span, &messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[&limit]);
            return false;
        }
        true
    }

    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub(crate) fn peek_tag(&self) -> Option<PeekedTag> {
        if !self.cursor.check(SyntaxKind::OpenBracketToken) {
            return None;
        }
        let closing = self.cursor.check_at(1, SyntaxKind::SlashToken);
        let token = self.cursor.peek(if closing { 2 } else { 1 });
        if token.kind != SyntaxKind::Identifier {
            return None;
        }
        Some(PeekedTag {
            closing,
            name: tags::lookup(&token.text)
                .map(|spec| spec.name)
                .or_else(|| tags::nearest(&token.text, self.options.max_suggestion_distance)),
        })
    }

    /// Whether the cursor is at an opening tag of the given kind.
    pub(crate) fn at_open_tag_of_kind(&self, kind: TagKind) -> bool {
        matches!(
            self.peek_tag(),
            Some(PeekedTag { closing: false, name: Some(name) })
                if tags::lookup(name).map_or(false, |spec| spec.kind == kind)
        )
    }

    pub(crate) fn at_close_of(&self, name: &str) -> bool {
        matches!(self.peek_tag(), Some(PeekedTag { closing: true, name: Some(n) }) if n == name)
    }

    /// Consume `[`, an optional `/`, the tag name and its attribute blocks.
    /// Unknown names are reported here, once.
    pub(crate) fn parse_tag_head(&mut self) -> TagHead {
        let start = self.cursor.current().span;
        self.cursor.advance();
        let closing = self.cursor.eat(SyntaxKind::SlashToken);

        let name_token = self.cursor.current().clone();
        let name = if name_token.kind == SyntaxKind::Identifier {
            self.cursor.advance();
            self.resolve_tag_name(&name_token)
        } else {
            self.error(name_token.span, &messages::_0_EXPECTED, &["tag name"]);
            None
        };
        let span = self.cursor.span_from(start);
        let label: &str = match name {
            Some(name) => name,
            None => &name_token.text,
        };
        let attrs = self.parse_attribute_blocks(label);
        TagHead {
            name,
            closing,
            attrs,
            span,
        }
    }

    fn resolve_tag_name(&mut self, token: &Token) -> Option<&'static str> {
        if let Some(spec) = tags::lookup(&token.text) {
            return Some(spec.name);
        }
        match tags::nearest(&token.text, self.options.max_suggestion_distance) {
            Some(candidate) => {
                log::debug!("tag {:?} read as {}", token.text, candidate);
                self.suggest(
                    token.span,
                    &messages::UNKNOWN_TAG_0_DID_YOU_MEAN_1,
                    &[&token.text, candidate],
                    candidate,
                );
                Some(candidate)
            }
            None => {
                let listing = tags::listing(self.options.max_listing_entries);
                self.error(
                    token.span,
                    &messages::UNKNOWN_TAG_0_VALID_TAGS_1,
                    &[&token.text, &listing],
                );
                None
            }
        }
    }

    /// Parse the head of an opening tag and check its required positions.
    pub(crate) fn open_tag(&mut self) -> TagHead {
        let head = self.parse_tag_head();
        if let Some(spec) = head.name.and_then(tags::lookup) {
            for (index, attr) in spec.required.iter().enumerate() {
                if head.attrs.get(index).is_none() {
                    self.error(
                        head.span,
                        &messages::MISSING_REQUIRED_ATTRIBUTE_0_ON_1,
                        &[*attr, spec.name],
                    );
                }
            }
        }
        head
    }

    /// Whether the payload of the current tag is exhausted.
    pub(crate) fn at_payload_end(&self) -> bool {
        match self.cursor.kind() {
            SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken => true,
            SyntaxKind::OpenBracketToken => !self.at_open_tag_of_kind(TagKind::Expression),
            _ => false,
        }
    }

    /// Consume the `]` ending a tag. Leftover payload is reported once and
    /// skipped.
    pub(crate) fn finish_tag(&mut self) {
        if self.cursor.eat(SyntaxKind::CloseBracketToken) {
            return;
        }
        let token = self.cursor.current().clone();
        match token.kind {
            SyntaxKind::OpenBracketToken | SyntaxKind::EndOfFileToken => {
                self.error(token.span, &messages::_0_EXPECTED, &["]"]);
            }
            _ => {
                self.error(token.span, &messages::UNEXPECTED_TOKEN_0, &[&token.text]);
                self.skip_to_tag_end();
            }
        }
    }

    /// Skip through the next `]` at bracket depth zero, stopping early at a
    /// `[` that starts another tag.
    pub(crate) fn skip_to_tag_end(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.cursor.kind() {
                SyntaxKind::EndOfFileToken => return,
                SyntaxKind::OpenBracketToken if depth == 0 && self.peek_tag().is_some() => return,
                SyntaxKind::OpenBracketToken => depth += 1,
                SyntaxKind::CloseBracketToken if depth == 0 => {
                    self.cursor.advance();
                    return;
                }
                SyntaxKind::CloseBracketToken => depth -= 1,
                _ => {}
            }
            self.cursor.advance();
        }
    }

    /// Skip a whole tag, and for a scope tag everything through its close.
    pub(crate) fn skip_tag(&mut self, head: &TagHead) {
        self.skip_to_tag_end();
        let Some(name) = head.name else { return };
        let is_scope = tags::lookup(name).map_or(false, |spec| {
            matches!(spec.kind, TagKind::Scope | TagKind::Expression)
        });
        if head.closing || !is_scope {
            return;
        }
        let mut nesting = 0u32;
        while !self.cursor.is_at_end() {
            match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some(n) }) if n == name => nesting += 1,
                Some(PeekedTag { closing: true, name: Some(n) }) if n == name => {
                    if nesting == 0 {
                        self.parse_tag_head();
                        self.skip_to_tag_end();
                        return;
                    }
                    nesting -= 1;
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    /// Report a catalog tag used where it does not belong and skip it.
    pub(crate) fn reject_tag(&mut self, context: &str) {
        let head = self.parse_tag_head();
        if let Some(name) = head.name {
            log::debug!("skipping {} {}", name, context);
            self.error(head.span, &messages::TAG_0_IS_NOT_VALID_HERE, &[name, context]);
        }
        self.skip_tag(&head);
    }

    /// Report and skip a close tag that matches no open construct.
    pub(crate) fn reject_stray_close(&mut self) {
        let head = self.parse_tag_head();
        let text = format!("[/{}", head.name.unwrap_or(""));
        self.error(head.span, &messages::UNEXPECTED_TOKEN_0, &[&text]);
        self.skip_to_tag_end();
    }

    #[inline]
    pub(crate) fn push_scope(&mut self, name: &'static str) {
        self.open_tags.push(name);
    }

    #[inline]
    pub(crate) fn pop_scope(&mut self) {
        self.open_tags.pop();
    }

    pub(crate) fn is_open(&self, name: &str) -> bool {
        self.open_tags.iter().any(|open| *open == name)
    }

    /// Consume the close tag of `name` up to its payload, comparing its id
    /// with `open_id`. A mismatch is reported and the open id stands. Returns
    /// `false` without consuming anything when the close tag is missing.
    pub(crate) fn parse_close_head(&mut self, name: &'static str, open_id: &str) -> bool {
        if !self.at_close_of(name) {
            let span = self.cursor.current().span;
            log::debug!("missing [/{} {{{}}}] at {}", name, open_id, span);
            self.error(span, &messages::MISSING_CLOSING_TAG_FOR_0_WITH_ID_1, &[name, open_id]);
            return false;
        }
        let head = self.parse_tag_head();
        let close_id = head.id();
        if close_id != open_id {
            let mismatch = IdMismatch {
                open_tag: name.to_string(),
                open_id: open_id.to_string(),
                close_tag: name.to_string(),
                close_id: close_id.to_string(),
            };
            self.sink
                .report_id_mismatch(&self.options.file_name, head.span, mismatch);
        }
        true
    }

    /// Consume the whole close tag of `name`.
    pub(crate) fn close_scope(&mut self, name: &'static str, open_id: &str) {
        if self.parse_close_head(name, open_id) {
            self.finish_tag();
        }
    }

    // ========================================================================
    // Top level
    // ========================================================================

    fn parse_top_level(&mut self, items: &mut ProgramItems<'a>) {
        while !self.cursor.is_at_end() {
            let before = self.cursor.save();
            match self.peek_tag() {
                Some(PeekedTag { closing: true, name }) => {
                    if name.map_or(false, |n| self.is_open(n)) {
                        return;
                    }
                    self.reject_stray_close();
                }
                Some(PeekedTag { closing: false, name: Some(name) }) => {
                    self.parse_top_level_tag(name, items)
                }
                Some(PeekedTag { closing: false, name: None }) => {
                    let head = self.parse_tag_head();
                    self.skip_tag(&head);
                }
                None => {
                    let token = self.cursor.current().clone();
                    self.error(token.span, &messages::DECLARATION_EXPECTED, &[]);
                    self.skip_to_next_tag();
                }
            }
            if self.cursor.save() == before {
                self.cursor.advance();
            }
        }
    }

    fn parse_top_level_tag(&mut self, name: &'static str, items: &mut ProgramItems<'a>) {
        match name {
            "M" => self.parse_module(items),
            "IMPORT" => {
                let import = self.parse_import();
                items.imports.push(import);
            }
            "META" => {
                let record = self.parse_metadata();
                items.metadata.push(record);
            }
            "F" | "AF" => {
                let function = self.parse_function(FunctionKind::Function, false);
                items.functions.push(function);
            }
            "C" | "I" | "E" | "EX" | "DG" => {
                if let Some(decl) = self.parse_type_decl(name) {
                    items.types.push(decl);
                }
            }
            _ => self.reject_tag("at top level"),
        }
    }

    /// Skip at least one token, then up to the next `[` or `(`.
    pub(crate) fn skip_to_next_tag(&mut self) {
        self.cursor.advance();
        while !matches!(
            self.cursor.kind(),
            SyntaxKind::OpenBracketToken | SyntaxKind::OpenParenToken | SyntaxKind::EndOfFileToken
        ) {
            self.cursor.advance();
        }
    }

    fn parse_module(&mut self, items: &mut ProgramItems<'a>) {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.module_header(&head.attrs);
        log::trace!("module {} ({})", header.name, header.id);
        if items.module.is_none() {
            items.module = Some(ModuleHeader {
                id: header.id,
                name: header.name,
                span: self.cursor.span_from(start),
            });
        }
        if !self.enter() {
            return;
        }
        self.push_scope("M");
        self.parse_top_level(items);
        self.pop_scope();
        self.leave();
        self.close_scope("M", header.id);
    }

    fn parse_import(&mut self) -> ImportDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let (path, alias) = self.interp.import(&head.attrs);
        ImportDecl {
            path,
            alias,
            span: self.cursor.span_from(start),
        }
    }

    fn parse_metadata(&mut self) -> MetadataRecord<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let (key, value) = self.interp.metadata(&head.attrs);
        MetadataRecord {
            key,
            value,
            span: self.cursor.span_from(start),
        }
    }
}

//! Declarations: functions, methods, classes, interfaces, enums, enum
//! extensions, delegates, and the header sections they share.

use tessera_ast::node::*;
use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::types::{ModifierFlags, TypeRef};
use tessera_core::text::Span;
use tessera_diagnostics::messages;

use crate::parser::{Parser, PeekedTag};
use crate::utilities::inner_span;

/// Type parameters of one construct. `TP` declares names, `WHERE` appends
/// constraints (declaring the name when `TP` did not), and `finish` freezes
/// the list into the arena before the construct closes.
#[derive(Debug, Default)]
pub(crate) struct TypeParamsBuilder<'a> {
    params: Vec<(&'a str, Vec<TypeRef<'a>>, Span)>,
}

impl<'a> TypeParamsBuilder<'a> {
    pub fn declare(&mut self, name: &'a str, span: Span) {
        if !self.params.iter().any(|(n, _, _)| *n == name) {
            self.params.push((name, Vec::new(), span));
        }
    }

    pub fn constrain(&mut self, name: &'a str, constraints: Vec<TypeRef<'a>>, span: Span) {
        match self.params.iter_mut().find(|(n, _, _)| *n == name) {
            Some((_, existing, declared)) => {
                existing.extend(constraints);
                *declared = declared.cover(&span);
            }
            None => self.params.push((name, constraints, span)),
        }
    }

    pub fn finish(self, parser: &Parser<'a, '_>) -> &'a [TypeParam<'a>] {
        let params = self
            .params
            .into_iter()
            .map(|(name, constraints, span)| TypeParam {
                name,
                constraints: parser.alloc_slice(constraints),
                span,
            })
            .collect();
        parser.alloc_slice(params)
    }
}

impl<'a, 's> Parser<'a, 's> {
    // ========================================================================
    // Functions and methods
    // ========================================================================

    /// `[F|AF|MT|AMT {id:name:visibility?:modifiers?}] sections body [/F {id}]`
    ///
    /// Inside an interface a method without statements is a signature and
    /// gets no body.
    pub(crate) fn parse_function(&mut self, kind: FunctionKind, in_interface: bool) -> FunctionDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let tag = head.name.unwrap_or("F");
        let header = self.interp.function_header(&head.attrs);
        log::trace!("{} {} ({})", tag, header.name, header.id);

        let (type_params, params, output, contract, body) =
            self.parse_function_rest(tag, header.id, in_interface);

        FunctionDecl {
            kind,
            id: header.id,
            name: header.name,
            visibility: header.visibility,
            modifiers: header.modifiers,
            is_async: matches!(tag, "AF" | "AMT"),
            type_params,
            params,
            output,
            contract,
            body,
            doc: header.doc,
            span: self.cursor.span_from(start),
        }
    }

    /// `[CT {id:visibility?}] [IN ...]* body [/CT {id}]`
    fn parse_constructor(&mut self, class_name: &'a str) -> FunctionDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.constructor_header(&head.attrs, class_name);
        let (type_params, params, output, contract, body) =
            self.parse_function_rest("CT", header.id, false);

        FunctionDecl {
            kind: FunctionKind::Constructor,
            id: header.id,
            name: header.name,
            visibility: header.visibility,
            modifiers: ModifierFlags::NONE,
            is_async: false,
            type_params,
            params,
            output,
            contract,
            body,
            doc: header.doc,
            span: self.cursor.span_from(start),
        }
    }

    /// Sections, body and close tag shared by every function-like scope.
    #[allow(clippy::type_complexity)]
    fn parse_function_rest(
        &mut self,
        tag: &'static str,
        id: &'a str,
        signature_only: bool,
    ) -> (
        &'a [TypeParam<'a>],
        &'a [Param<'a>],
        Option<&'a TypeRef<'a>>,
        Contract<'a>,
        Option<&'a [Stmt<'a>]>,
    ) {
        let mut type_params = TypeParamsBuilder::default();
        let mut params = Vec::new();
        let mut output = None;
        let mut contract = Contract::default();
        let mut explicit_body: Option<Vec<Stmt<'a>>> = None;

        if !self.enter() {
            self.close_scope(tag, id);
            return (&[], &[], None, contract, if signature_only { None } else { Some(&[]) });
        }
        self.push_scope(tag);
        loop {
            match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some(name) }) => match name {
                    "IN" => params.push(self.parse_param()),
                    "OUT" => output = Some(self.parse_output()),
                    "FX" | "SEM" | "DEP" | "CX" => self.parse_contract_section(&mut contract),
                    "TP" | "WHERE" => self.parse_type_param_section(&mut type_params),
                    "BODY" => {
                        let stmts = self.parse_body_scope();
                        explicit_body.get_or_insert_with(Vec::new).extend(stmts.iter().cloned());
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        let rest = self.parse_block();
        self.pop_scope();
        self.leave();
        self.close_scope(tag, id);

        let body = match explicit_body {
            Some(mut stmts) => {
                stmts.extend(rest.iter().cloned());
                Some(self.alloc_slice(stmts))
            }
            None if signature_only && rest.is_empty() => None,
            None => Some(rest),
        };
        (
            type_params.finish(self),
            self.alloc_slice(params),
            output,
            contract,
            body,
        )
    }

    /// `[BODY] statements [/BODY]`
    fn parse_body_scope(&mut self) -> &'a [Stmt<'a>] {
        let head = self.open_tag();
        self.finish_tag();
        self.push_scope("BODY");
        let stmts = self.parse_block();
        self.pop_scope();
        self.close_scope("BODY", head.id());
        stmts
    }

    // ========================================================================
    // Sections
    // ========================================================================

    /// `[IN {~?name:type:default?} default?]`
    pub(crate) fn parse_param(&mut self) -> Param<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.param(&head.attrs);
        let default = match head.attrs.get(2) {
            Some(value) => Some(self.attr_expr(value)),
            None => self.payload_expr(),
        };
        self.finish_tag();
        Param {
            name: header.name,
            ty: header.ty,
            mutable: header.mutable,
            default,
            span: self.cursor.span_from(start),
        }
    }

    /// `[OUT {type}]`
    pub(crate) fn parse_output(&mut self) -> &'a TypeRef<'a> {
        let head = self.open_tag();
        self.finish_tag();
        self.interp.output(&head.attrs)
    }

    /// `[FX ...]`, `[SEM ...]`, `[DEP ...]` or `[CX ...]`. Repeated effect and
    /// semantics sections accumulate.
    fn parse_contract_section(&mut self, contract: &mut Contract<'a>) {
        let head = self.open_tag();
        self.finish_tag();
        match head.name {
            Some("FX") => {
                let effects = self.interp.effects(&head.attrs);
                contract.effects = self.concat(contract.effects, effects);
            }
            Some("SEM") => {
                let semantics = self.interp.semantics(&head.attrs);
                contract.semantics = self.concat(contract.semantics, semantics);
            }
            Some("DEP") => contract.dependencies = Some(self.interp.dependencies(&head.attrs)),
            Some("CX") => contract.complexity = self.interp.complexity(&head.attrs),
            _ => {}
        }
    }

    fn concat<T: Clone>(&self, first: &'a [T], second: &'a [T]) -> &'a [T] {
        if first.is_empty() {
            return second;
        }
        self.alloc_slice(first.iter().chain(second).cloned().collect())
    }

    /// `[TP {T:U}]`, `[WHERE {T:constraint*}]` or `[WHERE "T: A + B, U: C"]`.
    pub(crate) fn parse_type_param_section(&mut self, builder: &mut TypeParamsBuilder<'a>) {
        let head = self.open_tag();
        match head.name {
            Some("TP") => {
                for name in self.interp.type_params(&head.attrs) {
                    builder.declare(name, head.span);
                }
            }
            _ => {
                if let Some((name, constraints)) = self.interp.where_clause(&head.attrs) {
                    builder.constrain(name, constraints, head.span);
                } else if self.cursor.check(SyntaxKind::StringLiteral) {
                    let token = self.cursor.current().clone();
                    self.cursor.advance();
                    let text = token.string_value().unwrap_or_default();
                    for (name, constraints) in self.parse_where_text(text, inner_span(token.span)) {
                        builder.constrain(name, constraints, token.span);
                    }
                } else {
                    self.error(
                        head.span,
                        &messages::MISSING_REQUIRED_ATTRIBUTE_0_ON_1,
                        &["name", "WHERE"],
                    );
                }
            }
        }
        self.finish_tag();
    }

    /// Constraint text `T: A + B, U: C`, scanned and parsed as its own stream.
    fn parse_where_text(&mut self, text: &str, origin: Span) -> Vec<(&'a str, Vec<TypeRef<'a>>)> {
        let tokens = self.scan_embedded(text, origin);
        let mut nested = self.nested(tokens);
        let mut clauses = Vec::new();
        while !nested.cursor.is_at_end() {
            let before = nested.cursor.save();
            let name = nested.expect(SyntaxKind::Identifier);
            nested.expect(SyntaxKind::ColonToken);
            let mut constraints = vec![*nested.parse_type_name()];
            while nested.cursor.eat(SyntaxKind::PlusToken) {
                constraints.push(*nested.parse_type_name());
            }
            if !name.text.is_empty() {
                clauses.push((nested.alloc_str(&name.text), constraints));
            }
            if !nested.cursor.eat(SyntaxKind::CommaToken) && !nested.cursor.is_at_end() {
                let token = nested.cursor.current().clone();
                nested.error(token.span, &messages::UNEXPECTED_TOKEN_0, &[&token.text]);
                nested.cursor.advance();
            }
            if nested.cursor.save() == before {
                nested.cursor.advance();
            }
        }
        clauses
    }

    // ========================================================================
    // Type declarations
    // ========================================================================

    pub(crate) fn parse_type_decl(&mut self, name: &'static str) -> Option<TypeDecl<'a>> {
        let decl = match name {
            "C" => TypeDecl::Class(self.parse_class()),
            "I" => TypeDecl::Interface(self.parse_interface()),
            "E" => TypeDecl::Enum(self.parse_enum()),
            "EX" => TypeDecl::EnumExtension(self.parse_enum_extension()),
            "DG" => TypeDecl::Delegate(self.parse_delegate()),
            _ => return None,
        };
        Some(decl)
    }

    /// Run `member` for every tag up to the close of `tag`, handling junk and
    /// misplaced tags the same way for every type declaration.
    fn parse_members(
        &mut self,
        tag: &'static str,
        context: &str,
        mut member: impl FnMut(&mut Self, &'static str) -> bool,
    ) {
        self.push_scope(tag);
        while !self.cursor.is_at_end() {
            let before = self.cursor.save();
            match self.peek_tag() {
                Some(PeekedTag { closing: true, name }) => {
                    if name.map_or(false, |n| self.is_open(n)) {
                        break;
                    }
                    self.reject_stray_close();
                }
                Some(PeekedTag { closing: false, name: Some(name) }) => {
                    if !member(self, name) {
                        self.reject_tag(context);
                    }
                }
                Some(PeekedTag { closing: false, name: None }) => {
                    let head = self.parse_tag_head();
                    self.skip_tag(&head);
                }
                None => {
                    let span = self.cursor.current().span;
                    self.error(span, &messages::DECLARATION_EXPECTED, &[]);
                    self.skip_to_next_tag();
                }
            }
            if self.cursor.save() == before {
                self.cursor.advance();
            }
        }
        self.pop_scope();
    }

    /// `[C {id:name:(base|visibility)?:modifiers?}] [TP] [WHERE] [IMPL]
    /// members [/C {id}]`
    fn parse_class(&mut self) -> ClassDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.class_header(&head.attrs);
        log::trace!("class {} ({})", header.name, header.id);
        if header.dropped_abstract {
            self.error(head.span, &messages::STRUCT_CLASS_0_CANNOT_BE_ABSTRACT, &[header.name]);
        }

        let mut type_params = TypeParamsBuilder::default();
        let mut implements: Vec<&'a str> = Vec::new();
        let mut members = Vec::new();
        if self.enter() {
            self.parse_members("C", "in a class", |p, name| {
                match name {
                    "TP" | "WHERE" => p.parse_type_param_section(&mut type_params),
                    "IMPL" => {
                        let head = p.open_tag();
                        p.finish_tag();
                        implements.extend(p.interp.implements(&head.attrs));
                    }
                    "FLD" => members.push(ClassMember::Field(p.parse_field())),
                    "PR" => members.push(ClassMember::Property(p.parse_property())),
                    "MT" | "AMT" => {
                        members.push(ClassMember::Method(p.parse_function(FunctionKind::Method, false)))
                    }
                    "CT" => members.push(ClassMember::Constructor(p.parse_constructor(header.name))),
                    _ => return false,
                }
                true
            });
            self.leave();
        }
        self.close_scope("C", header.id);

        ClassDecl {
            id: header.id,
            name: header.name,
            visibility: header.visibility,
            modifiers: header.modifiers,
            base: header.base,
            implements: self.alloc_slice(implements),
            type_params: type_params.finish(self),
            members: self.alloc_slice(members),
            doc: header.doc,
            span: self.cursor.span_from(start),
        }
    }

    /// `[I {id:name:visibility?:extends?}] [TP] [WHERE] [IMPL] members [/I {id}]`
    fn parse_interface(&mut self) -> InterfaceDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.interface_header(&head.attrs);
        log::trace!("interface {} ({})", header.name, header.id);

        let mut type_params = TypeParamsBuilder::default();
        let mut extends: Vec<&'a str> = header.extends.to_vec();
        let mut members = Vec::new();
        if self.enter() {
            self.parse_members("I", "in an interface", |p, name| {
                match name {
                    "TP" | "WHERE" => p.parse_type_param_section(&mut type_params),
                    "IMPL" => {
                        let head = p.open_tag();
                        p.finish_tag();
                        extends.extend(p.interp.implements(&head.attrs));
                    }
                    "PR" => members.push(ClassMember::Property(p.parse_property())),
                    "MT" | "AMT" => {
                        members.push(ClassMember::Method(p.parse_function(FunctionKind::Method, true)))
                    }
                    _ => return false,
                }
                true
            });
            self.leave();
        }
        self.close_scope("I", header.id);

        InterfaceDecl {
            id: header.id,
            name: header.name,
            visibility: header.visibility,
            extends: self.alloc_slice(extends),
            type_params: type_params.finish(self),
            members: self.alloc_slice(members),
            span: self.cursor.span_from(start),
        }
    }

    /// `[FLD {~?name:type:visibility?:modifiers?} init?]`
    fn parse_field(&mut self) -> FieldDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.field(&head.attrs);
        let init = self.payload_expr();
        self.finish_tag();
        FieldDecl {
            name: header.name,
            ty: header.ty,
            visibility: header.visibility,
            modifiers: header.modifiers,
            mutable: header.mutable,
            init,
            span: self.cursor.span_from(start),
        }
    }

    /// `[PR {id:name:type:visibility?:modifiers?}] [GET]..[/GET] [SET]..[/SET]
    /// [/PR {id}]`
    fn parse_property(&mut self) -> PropertyDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.property_header(&head.attrs);

        let mut getter = None;
        let mut setter = None;
        if self.enter() {
            self.parse_members("PR", "in a property", |p, name| {
                match name {
                    "GET" => getter = Some(p.parse_accessor("GET")),
                    "SET" => setter = Some(p.parse_accessor("SET")),
                    _ => return false,
                }
                true
            });
            self.leave();
        }
        self.close_scope("PR", header.id);

        PropertyDecl {
            id: header.id,
            name: header.name,
            ty: header.ty,
            visibility: header.visibility,
            modifiers: header.modifiers,
            getter,
            setter,
            span: self.cursor.span_from(start),
        }
    }

    fn parse_accessor(&mut self, tag: &'static str) -> &'a [Stmt<'a>] {
        let head = self.open_tag();
        self.finish_tag();
        self.push_scope(tag);
        let body = self.parse_block();
        self.pop_scope();
        self.close_scope(tag, head.id());
        body
    }

    /// `[E {id:name:visibility?:underlying?}] [V ...]* [/E {id}]`
    fn parse_enum(&mut self) -> EnumDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.enum_header(&head.attrs);

        let mut variants = Vec::new();
        self.parse_members("E", "in an enum", |p, name| {
            if name != "V" {
                return false;
            }
            variants.push(p.parse_variant());
            true
        });
        self.close_scope("E", header.id);

        EnumDecl {
            id: header.id,
            name: header.name,
            visibility: header.visibility,
            underlying: header.underlying,
            variants: self.alloc_slice(variants),
            span: self.cursor.span_from(start),
        }
    }

    /// `[V {name:value?}]` or `[V {name} value]`
    fn parse_variant(&mut self) -> EnumVariant<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let name = self.interp.variant(&head.attrs);
        let value = match head.attrs.get(1) {
            Some(value) => Some(self.attr_expr(value)),
            None => self.payload_expr(),
        };
        self.finish_tag();
        EnumVariant {
            name,
            value,
            span: self.cursor.span_from(start),
        }
    }

    /// `[EX {id:enum}] [V ...]* [MT ...]* [/EX {id}]`
    fn parse_enum_extension(&mut self) -> EnumExtensionDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let id = self.interp.text_at(&head.attrs, 0).unwrap_or("");
        let target = self.interp.text_at(&head.attrs, 1).unwrap_or("");

        let mut variants = Vec::new();
        let mut methods = Vec::new();
        if self.enter() {
            self.parse_members("EX", "in an enum extension", |p, name| {
                match name {
                    "V" => variants.push(p.parse_variant()),
                    "MT" | "AMT" => methods.push(p.parse_function(FunctionKind::Method, false)),
                    _ => return false,
                }
                true
            });
            self.leave();
        }
        self.close_scope("EX", id);

        EnumExtensionDecl {
            id,
            target,
            variants: self.alloc_slice(variants),
            methods: self.alloc_slice(methods),
            span: self.cursor.span_from(start),
        }
    }

    /// `[DG {id:name:visibility?}] [TP] [WHERE] [IN]* [OUT]? [/DG {id}]`
    fn parse_delegate(&mut self) -> DelegateDecl<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        self.finish_tag();
        let header = self.interp.delegate_header(&head.attrs);

        let mut type_params = TypeParamsBuilder::default();
        let mut params = Vec::new();
        let mut output = None;
        self.parse_members("DG", "in a delegate", |p, name| {
            match name {
                "TP" | "WHERE" => p.parse_type_param_section(&mut type_params),
                "IN" => params.push(p.parse_param()),
                "OUT" => output = Some(p.parse_output()),
                _ => return false,
            }
            true
        });
        self.close_scope("DG", header.id);

        DelegateDecl {
            id: header.id,
            name: header.name,
            visibility: header.visibility,
            type_params: type_params.finish(self),
            params: self.alloc_slice(params),
            output,
            span: self.cursor.span_from(start),
        }
    }
}

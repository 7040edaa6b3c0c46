//! Statements and the block loop.

use tessera_ast::node::*;
use tessera_ast::syntax_kind::SyntaxKind;
use tessera_core::text::Span;
use tessera_diagnostics::messages;

use crate::catalog::tags::TagKind;
use crate::parser::{Parser, PeekedTag, TagHead};

/// The scope a body-dividing marker belongs to.
fn marker_owner(name: &str) -> Option<&'static str> {
    match name {
        "ELIF" | "ELSE" => Some("IF"),
        "CASE" | "DEFAULT" => Some("MATCH"),
        "CATCH" | "FINALLY" => Some("TRY"),
        _ => None,
    }
}

fn mutation_kind(name: &str) -> Option<MutationKind> {
    match name {
        "ADD" => Some(MutationKind::Add),
        "PUT" => Some(MutationKind::Put),
        "REMOVE" => Some(MutationKind::Remove),
        "INSERT" => Some(MutationKind::Insert),
        "CLEAR" => Some(MutationKind::Clear),
        _ => None,
    }
}

impl<'a, 's> Parser<'a, 's> {
    // ========================================================================
    // Blocks
    // ========================================================================

    /// Whether the current block ends here: end of input, the close tag of an
    /// open construct, or a marker whose construct is open.
    pub(crate) fn at_block_end(&self) -> bool {
        if self.cursor.is_at_end() {
            return true;
        }
        match self.peek_tag() {
            Some(PeekedTag { closing: true, name: Some(name) }) => self.is_open(name),
            Some(PeekedTag { closing: false, name: Some(name) }) => {
                marker_owner(name).map_or(false, |owner| self.is_open(owner))
            }
            _ => false,
        }
    }

    /// Statements up to the end of the enclosing block.
    pub(crate) fn parse_block(&mut self) -> &'a [Stmt<'a>] {
        let mut stmts = Vec::new();
        while !self.at_block_end() {
            let before = self.cursor.save();
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
            // Forward progress, whatever the statement parser did.
            if self.cursor.save() == before {
                self.cursor.advance();
            }
        }
        self.alloc_slice(stmts)
    }

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt<'a>> {
        match self.cursor.kind() {
            SyntaxKind::OpenBracketToken => match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some(name) }) => {
                    if !self.enter() {
                        let head = self.parse_tag_head();
                        self.skip_tag(&head);
                        return None;
                    }
                    let stmt = self.parse_tag_statement(name);
                    self.leave();
                    stmt
                }
                Some(PeekedTag { closing: false, name: None }) => {
                    let head = self.parse_tag_head();
                    self.skip_tag(&head);
                    None
                }
                Some(PeekedTag { closing: true, .. }) => {
                    self.reject_stray_close();
                    None
                }
                None => {
                    let span = self.cursor.current().span;
                    self.error(span, &messages::STATEMENT_EXPECTED, &[]);
                    self.skip_to_next_tag();
                    None
                }
            },
            SyntaxKind::OpenParenToken => {
                let expr = self.parse_expression();
                Some(Stmt::Expr(ExprStmt {
                    expr,
                    span: expr.span(),
                }))
            }
            _ => {
                let token = self.cursor.current().clone();
                log::debug!("statement expected at {:?}", token.text);
                self.error(token.span, &messages::STATEMENT_EXPECTED, &[]);
                self.skip_to_next_tag();
                None
            }
        }
    }

    fn parse_tag_statement(&mut self, name: &'static str) -> Option<Stmt<'a>> {
        let stmt = match name {
            "B" => self.parse_bind(),
            "A" => self.parse_assign(),
            "R" => self.parse_return(),
            "CALL" => self.parse_call_statement(),
            "IF" => self.parse_if(),
            "FOR" => self.parse_for(),
            "WHILE" => self.parse_while(),
            "DO" => self.parse_do_while(),
            "EACH" => self.parse_foreach(),
            "MATCH" => self.parse_match_statement(),
            "TRY" => self.parse_try(),
            "USING" => self.parse_using(),
            "THROW" => self.parse_throw(),
            "BREAK" | "CONTINUE" => self.parse_jump(name),
            "ASSERT" => self.parse_assert(),
            "EXPR" => self.parse_expr_statement(),
            _ if mutation_kind(name).is_some() => self.parse_mutation(name),
            _ if self.at_open_tag_of_kind(TagKind::Expression) => {
                let expr = self.parse_expression();
                Stmt::Expr(ExprStmt {
                    expr,
                    span: expr.span(),
                })
            }
            _ => {
                match marker_owner(name) {
                    Some(owner) => self.reject_tag(&format!("outside {}", owner)),
                    None => self.reject_tag("in a body"),
                }
                return None;
            }
        };
        Some(stmt)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// The expression at attribute `index`, else the payload.
    fn attr_or_payload(&mut self, head: &TagHead, index: usize) -> &'a Expr<'a> {
        match head.attrs.get(index) {
            Some(value) => self.attr_expr(value),
            None => self.required_payload_expr(),
        }
    }

    /// The expression at attribute `index`; a missing position was already
    /// reported against the tag's schema.
    fn attr_or_missing(&mut self, head: &TagHead, index: usize) -> &'a Expr<'a> {
        match head.attrs.get(index) {
            Some(value) => self.attr_expr(value),
            None => self.alloc(Expr::Missing(head.span)),
        }
    }

    /// A scope body closed by `[/NAME {id}]`.
    fn parse_scoped_body(&mut self, name: &'static str, id: &str) -> &'a [Stmt<'a>] {
        self.push_scope(name);
        let body = self.parse_block();
        self.pop_scope();
        self.close_scope(name, id);
        body
    }

    // ========================================================================
    // Line statements
    // ========================================================================

    /// `[B {~?name:type?} value?]`
    fn parse_bind(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.bind(&head.attrs);
        let value = self.payload_expr();
        self.finish_tag();
        Stmt::Bind(BindStmt {
            name: header.name,
            ty: header.ty,
            mutable: header.mutable,
            value,
            span: self.cursor.span_from(start),
        })
    }

    /// `[A {target:op?} value]`
    fn parse_assign(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.assign(&head.attrs);
        let value = self.required_payload_expr();
        self.finish_tag();
        Stmt::Assign(AssignStmt {
            target: header.target,
            op: header.op,
            value,
            span: self.cursor.span_from(start),
        })
    }

    /// `[R value?]`
    fn parse_return(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        self.open_tag();
        let value = self.payload_expr();
        self.finish_tag();
        Stmt::Return(ReturnStmt {
            value,
            span: self.cursor.span_from(start),
        })
    }

    /// `[CALL {target!?:result?} args*]`
    fn parse_call_statement(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let target = self.interp.call_target(&head.attrs);
        let args = self.payload_args();
        self.finish_tag();
        Stmt::Call(CallStmt {
            target: target.target,
            fallible: target.fallible,
            result: target.result,
            args,
            span: self.cursor.span_from(start),
        })
    }

    /// `[THROW {type?:msg=?} value?]`
    fn parse_throw(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.throw_header(&head.attrs);
        let value = self.payload_expr();
        self.finish_tag();
        Stmt::Throw(ThrowStmt {
            exception_type: header.exception_type,
            message: header.message,
            value,
            span: self.cursor.span_from(start),
        })
    }

    /// `[BREAK {label?}]` or `[CONTINUE {label?}]`
    fn parse_jump(&mut self, name: &str) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let label = self.interp.label(&head.attrs);
        self.finish_tag();
        let jump = JumpStmt {
            label,
            span: self.cursor.span_from(start),
        };
        if name == "BREAK" {
            Stmt::Break(jump)
        } else {
            Stmt::Continue(jump)
        }
    }

    /// `[ASSERT {msg=?} condition]`
    fn parse_assert(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let message = self.interp.message(&head.attrs);
        let condition = self.required_payload_expr();
        self.finish_tag();
        Stmt::Assert(AssertStmt {
            condition,
            message,
            span: self.cursor.span_from(start),
        })
    }

    /// `[EXPR expression]`
    fn parse_expr_statement(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        self.open_tag();
        let expr = self.required_payload_expr();
        self.finish_tag();
        Stmt::Expr(ExprStmt {
            expr,
            span: self.cursor.span_from(start),
        })
    }

    /// `[ADD {target} args*]` and the other collection mutations.
    fn parse_mutation(&mut self, name: &str) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let target = self.interp.text_at(&head.attrs, 0).unwrap_or("");
        let args = self.payload_args();
        self.finish_tag();
        Stmt::Mutation(MutationStmt {
            kind: mutation_kind(name).unwrap_or(MutationKind::Add),
            target,
            args,
            span: self.cursor.span_from(start),
        })
    }

    // ========================================================================
    // Scoped statements
    // ========================================================================

    /// `[IF {id} cond] .. [ELIF cond] .. [ELSE] .. [/IF {id}]`
    fn parse_if(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let id = self.interp.text_at(&head.attrs, 0).unwrap_or("");
        let condition = self.attr_or_payload(&head, 1);
        self.finish_tag();
        log::trace!("IF {}", id);

        self.push_scope("IF");
        let then_body = self.parse_block();
        let mut elifs = Vec::new();
        let mut else_body = None;
        loop {
            match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some("ELIF") }) => {
                    let clause_start = self.cursor.current().span;
                    let marker = self.open_tag();
                    let condition = self.attr_or_payload(&marker, 0);
                    self.finish_tag();
                    let body = self.parse_block();
                    elifs.push(ElifClause {
                        condition,
                        body,
                        span: self.cursor.span_from(clause_start),
                    });
                }
                Some(PeekedTag { closing: false, name: Some("ELSE") }) => {
                    let marker = self.open_tag();
                    self.finish_tag();
                    if else_body.is_some() {
                        self.error(marker.span, &messages::UNEXPECTED_TOKEN_0, &["[ELSE"]);
                    }
                    else_body = Some(self.parse_block());
                }
                _ => break,
            }
        }
        self.pop_scope();
        self.close_scope("IF", id);

        Stmt::If(IfStmt {
            id,
            condition,
            then_body,
            elifs: self.alloc_slice(elifs),
            else_body,
            span: self.cursor.span_from(start),
        })
    }

    /// `[FOR {id:var:start:end:step?}] .. [/FOR {id}]`; the step defaults
    /// to 1.
    fn parse_for(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.for_header(&head.attrs);
        let from = self.attr_or_missing(&head, 2);
        let to = self.attr_or_missing(&head, 3);
        let step = match head.attrs.get(4) {
            Some(value) => self.attr_expr(value),
            None => self.alloc(Expr::Literal(Literal {
                kind: LiteralKind::Integer(1),
                span: head.span.shrink_to_end(),
            })),
        };
        self.finish_tag();
        let body = self.parse_scoped_body("FOR", header.id);

        Stmt::For(ForStmt {
            id: header.id,
            label: header.label,
            var: header.var,
            start: from,
            end: to,
            step,
            body,
            span: self.cursor.span_from(start),
        })
    }

    /// `[WHILE {id} cond] .. [/WHILE {id}]`
    fn parse_while(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.loop_header(&head.attrs);
        let condition = self.attr_or_payload(&head, 1);
        self.finish_tag();
        let body = self.parse_scoped_body("WHILE", header.id);

        Stmt::While(WhileStmt {
            id: header.id,
            label: header.label,
            condition,
            body,
            span: self.cursor.span_from(start),
        })
    }

    /// `[DO {id}] .. [/DO {id} cond]`
    fn parse_do_while(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.loop_header(&head.attrs);
        self.finish_tag();

        self.push_scope("DO");
        let body = self.parse_block();
        self.pop_scope();
        let condition = if self.parse_close_head("DO", header.id) {
            let condition = self.required_payload_expr();
            self.finish_tag();
            condition
        } else {
            self.alloc(Expr::Missing(self.cursor.current().span.shrink_to_start()))
        };

        Stmt::DoWhile(DoWhileStmt {
            id: header.id,
            label: header.label,
            body,
            condition,
            span: self.cursor.span_from(start),
        })
    }

    /// `[EACH {id:var:collection?:type?} collection?] .. [/EACH {id}]`
    ///
    /// The collection comes from the third attribute or, failing that, the
    /// payload.
    fn parse_foreach(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.foreach_header(&head.attrs);
        let collection = self.attr_or_payload(&head, 2);
        self.finish_tag();
        let body = self.parse_scoped_body("EACH", header.id);

        Stmt::ForEach(ForEachStmt {
            id: header.id,
            label: header.label,
            var: header.var,
            var_type: header.var_type,
            collection,
            body,
            span: self.cursor.span_from(start),
        })
    }

    /// `[MATCH {id} scrutinee] [CASE pattern guard?] .. [DEFAULT] ..
    /// [/MATCH {id}]`
    fn parse_match_statement(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let id = self.interp.text_at(&head.attrs, 0).unwrap_or("");
        let scrutinee = self.attr_or_payload(&head, 1);
        self.finish_tag();

        self.push_scope("MATCH");
        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some("CASE") }) => {
                    let case_start = self.cursor.current().span;
                    self.open_tag();
                    let pattern = self.parse_pattern();
                    let guard = self.payload_expr();
                    self.finish_tag();
                    let body = self.parse_block();
                    cases.push(CaseClause {
                        pattern,
                        guard,
                        body,
                        span: self.cursor.span_from(case_start),
                    });
                }
                Some(PeekedTag { closing: false, name: Some("DEFAULT") }) => {
                    self.open_tag();
                    self.finish_tag();
                    default = Some(self.parse_block());
                }
                _ if self.at_block_end() => break,
                _ => {
                    // Statements before the first CASE belong to no arm.
                    let before = self.cursor.save();
                    let token = self.cursor.current().clone();
                    self.error(token.span, &messages::UNEXPECTED_TOKEN_0, &[token.text.as_str()]);
                    self.parse_statement();
                    if self.cursor.save() == before {
                        self.cursor.advance();
                    }
                }
            }
        }
        self.pop_scope();
        self.close_scope("MATCH", id);

        Stmt::Match(MatchStmt {
            id,
            scrutinee,
            cases: self.alloc_slice(cases),
            default,
            span: self.cursor.span_from(start),
        })
    }

    /// `[TRY {id}] .. [CATCH {type?:var?}] .. [FINALLY] .. [/TRY {id}]`
    fn parse_try(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let id = self.interp.text_at(&head.attrs, 0).unwrap_or("");
        self.finish_tag();
        log::trace!("TRY {}", id);

        self.push_scope("TRY");
        let body = self.parse_block();
        let mut catches = Vec::new();
        let mut finally = None;
        loop {
            match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some("CATCH") }) => {
                    let clause_start = self.cursor.current().span;
                    let marker = self.open_tag();
                    let clause = self.interp.catch_clause(&marker.attrs);
                    self.finish_tag();
                    let body = self.parse_block();
                    catches.push(CatchClause {
                        exception_type: clause.exception_type,
                        variable: clause.variable,
                        body,
                        span: self.cursor.span_from(clause_start),
                    });
                }
                Some(PeekedTag { closing: false, name: Some("FINALLY") }) => {
                    self.open_tag();
                    self.finish_tag();
                    finally = Some(self.parse_block());
                }
                _ => break,
            }
        }
        self.pop_scope();
        self.close_scope("TRY", id);

        Stmt::Try(TryStmt {
            id,
            body,
            catches: self.alloc_slice(catches),
            finally,
            span: self.cursor.span_from(start),
        })
    }

    /// `[USING {id:name:type?} resource] .. [/USING {id}]`
    fn parse_using(&mut self) -> Stmt<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.using_header(&head.attrs);
        let resource = self.attr_or_payload(&head, 3);
        self.finish_tag();
        let body = self.parse_scoped_body("USING", header.id);

        Stmt::Using(UsingStmt {
            id: header.id,
            name: header.name,
            ty: header.ty,
            resource,
            body,
            span: self.cursor.span_from(start),
        })
    }

    /// A zero-width missing expression at the cursor.
    pub(crate) fn missing_here(&mut self) -> &'a Expr<'a> {
        let span: Span = self.cursor.current().span.shrink_to_start();
        self.alloc(Expr::Missing(span))
    }
}

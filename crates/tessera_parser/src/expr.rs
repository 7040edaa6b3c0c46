//! Expressions: atoms, prefix forms `(op args)` and expression tags.

use tessera_ast::node::*;
use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::token::{LiteralValue, Token};
use tessera_ast::types::{ComparisonMode, TypeRef};
use tessera_core::text::Span;
use tessera_diagnostics::messages;

use crate::catalog::operators::{self, OperatorSpec};
use crate::catalog::tags::{self, TagKind};
use crate::parser::{Parser, PeekedTag};

/// A trailing `:mode` keyword collected from an argument list.
struct ModeArg {
    text: String,
    span: Span,
}

impl<'a, 's> Parser<'a, 's> {
    // ========================================================================
    // Entry points
    // ========================================================================

    pub(crate) fn parse_expression(&mut self) -> &'a Expr<'a> {
        let expr = self.parse_expr_node();
        self.alloc(expr)
    }

    /// The tag payload as an expression, if any is left.
    pub(crate) fn payload_expr(&mut self) -> Option<&'a Expr<'a>> {
        if self.at_payload_end() {
            None
        } else {
            Some(self.parse_expression())
        }
    }

    /// The tag payload as an expression, reported when absent.
    pub(crate) fn required_payload_expr(&mut self) -> &'a Expr<'a> {
        match self.payload_expr() {
            Some(expr) => expr,
            None => {
                let span = self.cursor.current().span;
                self.error(span, &messages::EXPRESSION_EXPECTED, &[]);
                self.missing_here()
            }
        }
    }

    /// Every expression left in the tag payload.
    pub(crate) fn payload_args(&mut self) -> &'a [Expr<'a>] {
        let mut args = Vec::new();
        while !self.at_payload_end() {
            let before = self.cursor.save();
            args.push(self.parse_expr_node());
            if self.cursor.save() == before {
                self.cursor.advance();
            }
        }
        self.alloc_slice(args)
    }

    fn parse_expr_node(&mut self) -> Expr<'a> {
        let start = self.cursor.current().span;
        match self.cursor.kind() {
            SyntaxKind::OpenParenToken => {
                if !self.enter() {
                    self.skip_balanced();
                    return Expr::Missing(self.cursor.span_from(start));
                }
                let expr = self.parse_prefix_form();
                self.leave();
                expr
            }
            SyntaxKind::OpenBracketToken => match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some(name) })
                    if tags::lookup(name).map_or(false, |spec| spec.kind == TagKind::Expression) =>
                {
                    if !self.enter() {
                        let head = self.parse_tag_head();
                        self.skip_tag(&head);
                        return Expr::Missing(self.cursor.span_from(start));
                    }
                    let expr = self.parse_tag_expression(name);
                    self.leave();
                    expr
                }
                _ => self.parse_atom(),
            },
            _ => self.parse_atom(),
        }
    }

    /// Skip from `(` through its matching `)`.
    fn skip_balanced(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.cursor.kind() {
                SyntaxKind::EndOfFileToken => return,
                SyntaxKind::OpenParenToken => depth += 1,
                SyntaxKind::CloseParenToken => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.cursor.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    // ========================================================================
    // Atoms
    // ========================================================================

    fn parse_atom(&mut self) -> Expr<'a> {
        let token = self.cursor.current().clone();
        match token.kind {
            SyntaxKind::IntegerLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::CharLiteral => {
                self.cursor.advance();
                Expr::Literal(self.literal_of(&token))
            }
            SyntaxKind::Identifier => match keyword_literal(&token.text) {
                Some(kind) => {
                    self.cursor.advance();
                    Expr::Literal(Literal {
                        kind,
                        span: token.span,
                    })
                }
                None => self.parse_reference(),
            },
            SyntaxKind::MinusToken => match self.negative_literal() {
                Some(literal) => Expr::Literal(literal),
                None => self.expression_expected(&token),
            },
            _ => self.expression_expected(&token),
        }
    }

    fn expression_expected(&mut self, token: &Token) -> Expr<'a> {
        self.error(token.span, &messages::EXPRESSION_EXPECTED, &[]);
        // Delimiters belong to the enclosing construct.
        if !matches!(
            token.kind,
            SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::EndOfFileToken
        ) {
            self.cursor.advance();
        }
        Expr::Missing(token.span.shrink_to_start())
    }

    fn literal_of(&self, token: &Token) -> Literal<'a> {
        let kind = match (&token.value, token.kind) {
            (Some(LiteralValue::Integer(value)), _) => LiteralKind::Integer(*value),
            (Some(LiteralValue::Float(value)), _) => LiteralKind::Float(*value),
            (Some(LiteralValue::String(value)), _) => LiteralKind::String(self.alloc_str(value)),
            (Some(LiteralValue::Char(value)), _) => LiteralKind::Char(*value),
            // Malformed literals were reported by the scanner.
            (None, SyntaxKind::StringLiteral) => LiteralKind::String(""),
            (None, SyntaxKind::CharLiteral) => LiteralKind::Char('\0'),
            (None, SyntaxKind::FloatLiteral) => LiteralKind::Float(0.0),
            (None, _) => LiteralKind::Integer(0),
        };
        Literal {
            kind,
            span: token.span,
        }
    }

    /// `-` written flush against a number.
    fn negative_literal(&mut self) -> Option<Literal<'a>> {
        let next = self.cursor.peek(1);
        let numeric = matches!(next.kind, SyntaxKind::IntegerLiteral | SyntaxKind::FloatLiteral);
        if !self.cursor.check(SyntaxKind::MinusToken) || !numeric || !self.cursor.touches_next(0) {
            return None;
        }
        let start = self.cursor.current().span;
        self.cursor.advance();
        let token = self.cursor.current().clone();
        self.cursor.advance();
        let kind = match self.literal_of(&token).kind {
            LiteralKind::Integer(value) => LiteralKind::Integer(value.wrapping_neg()),
            LiteralKind::Float(value) => LiteralKind::Float(-value),
            other => other,
        };
        Some(Literal {
            kind,
            span: start.cover(&token.span),
        })
    }

    /// A name, with adjacent `.member` parts glued on.
    fn parse_reference(&mut self) -> Expr<'a> {
        let start = self.cursor.current().span;
        let path = self.dotted_name();
        Expr::Ref(RefExpr {
            path,
            span: self.cursor.span_from(start),
        })
    }

    fn dotted_name(&mut self) -> &'a str {
        let mut path = self.cursor.current().text.clone();
        self.cursor.advance();
        while self.cursor.check(SyntaxKind::DotToken)
            && self.cursor.is_adjacent()
            && self.cursor.check_at(1, SyntaxKind::Identifier)
            && self.cursor.touches_next(0)
        {
            self.cursor.advance();
            path.push('.');
            path.push_str(&self.cursor.current().text);
            self.cursor.advance();
        }
        self.alloc_str(&path)
    }

    /// An identifier with flush `-word` and `.word` runs: `str-len`,
    /// `Console.WriteLine`, `ignore-case`.
    fn glued_word(&mut self) -> (String, Span) {
        let first = self.cursor.current().clone();
        self.cursor.advance();
        let mut text = first.text;
        let mut span = first.span;
        while matches!(self.cursor.kind(), SyntaxKind::MinusToken | SyntaxKind::DotToken)
            && self.cursor.is_adjacent()
            && self.cursor.check_at(1, SyntaxKind::Identifier)
            && self.cursor.touches_next(0)
        {
            text.push_str(&self.cursor.current().text);
            self.cursor.advance();
            let part = self.cursor.current().clone();
            text.push_str(&part.text);
            span = span.cover(&part.span);
            self.cursor.advance();
        }
        (text, span)
    }

    // ========================================================================
    // Prefix forms
    // ========================================================================

    fn parse_prefix_form(&mut self) -> Expr<'a> {
        let start = self.cursor.current().span;
        if self.cursor.check_at(1, SyntaxKind::OpenParenToken) && self.is_lambda_head() {
            return self.parse_inline_lambda();
        }
        self.cursor.advance();

        match self.cursor.kind() {
            SyntaxKind::OpenParenToken => {
                let inner = self.parse_expr_node();
                self.expect(SyntaxKind::CloseParenToken);
                return inner;
            }
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken => {
                let span = self.cursor.current().span;
                self.error(span, &messages::EXPRESSION_EXPECTED, &[]);
                self.cursor.eat(SyntaxKind::CloseParenToken);
                return Expr::Missing(self.cursor.span_from(start));
            }
            _ => {}
        }

        let (raw, op_span) = if self.cursor.check(SyntaxKind::Identifier) {
            self.glued_word()
        } else {
            let token = self.cursor.current().clone();
            self.cursor.advance();
            (token.text, token.span)
        };
        let op = operators::normalize(&raw).to_string();
        log::trace!("prefix form {:?} at {}", op, op_span);

        match op.as_str() {
            "forall" | "exists" => self.parse_quantifier(&op, start),
            "typeof" => {
                let ty = self.parse_type_name();
                self.expect(SyntaxKind::CloseParenToken);
                Expr::TypeOp(TypeOpExpr {
                    op: TypeOpKind::TypeOf,
                    operand: None,
                    ty,
                    span: self.cursor.span_from(start),
                })
            }
            "is" | "as" => {
                let operand = self.parse_expression();
                let ty = self.parse_type_name();
                self.expect(SyntaxKind::CloseParenToken);
                Expr::TypeOp(TypeOpExpr {
                    op: if op == "is" { TypeOpKind::Is } else { TypeOpKind::As },
                    operand: Some(operand),
                    ty,
                    span: self.cursor.span_from(start),
                })
            }
            "cast" => {
                let ty = self.parse_type_name();
                let operand = self.parse_expression();
                self.expect(SyntaxKind::CloseParenToken);
                Expr::TypeOp(TypeOpExpr {
                    op: TypeOpKind::Cast,
                    operand: Some(operand),
                    ty,
                    span: self.cursor.span_from(start),
                })
            }
            "match" => self.parse_match_expr(start),
            "call" => self.parse_call_expr(start),
            "new" => {
                let ty = self.parse_type_name();
                let (args, _) = self.parse_args();
                Expr::New(NewExpr {
                    ty,
                    args: self.alloc_slice(args),
                    span: self.cursor.span_from(start),
                })
            }
            _ => match operators::family_operator(&op) {
                Some(spec) if spec.takes_type => {
                    let ty = self.parse_type_name();
                    self.expect(SyntaxKind::CloseParenToken);
                    Expr::Operation(OperationExpr {
                        family: spec.family,
                        name: spec.name,
                        args: &[],
                        type_arg: Some(ty),
                        comparison: None,
                        span: self.cursor.span_from(start),
                    })
                }
                _ => {
                    let (args, mode) = self.parse_args();
                    let span = self.cursor.span_from(start);
                    self.build_operation(&op, &raw, op_span, args, mode, span)
                }
            },
        }
    }

    /// Whether the argument list of a prefix form has ended.
    fn at_args_end(&self) -> bool {
        match self.cursor.kind() {
            SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken => true,
            SyntaxKind::OpenBracketToken => !self.at_open_tag_of_kind(TagKind::Expression),
            _ => false,
        }
    }

    /// Arguments through the closing `)`, and a trailing `:mode` keyword.
    fn parse_args(&mut self) -> (Vec<Expr<'a>>, Option<ModeArg>) {
        let mut args = Vec::new();
        let mut mode = None;
        while !self.at_args_end() {
            let before = self.cursor.save();
            if self.cursor.check(SyntaxKind::ColonToken) && self.cursor.check_at(1, SyntaxKind::Identifier) {
                self.cursor.advance();
                let (text, span) = self.glued_word();
                mode = Some(ModeArg { text, span });
                continue;
            }
            args.push(self.parse_expr_node());
            if self.cursor.save() == before {
                self.cursor.advance();
            }
        }
        self.expect(SyntaxKind::CloseParenToken);
        (args, mode)
    }

    fn arity_error(&mut self, span: Span, op: &str, expected: &str, found: usize) {
        let found = found.to_string();
        self.error(span, &messages::OPERATOR_0_EXPECTS_1_ARGUMENTS_FOUND_2, &[op, expected, &found]);
    }

    /// Report a wrong argument count and pad with placeholders up to `min`.
    fn check_arity(
        &mut self,
        args: &mut Vec<Expr<'a>>,
        op: &str,
        op_span: Span,
        min: usize,
        max: Option<usize>,
        expected: &str,
        form_span: Span,
    ) {
        let found = args.len();
        if found >= min && max.map_or(true, |max| found <= max) {
            return;
        }
        self.arity_error(op_span, op, expected, found);
        while args.len() < min {
            args.push(Expr::Missing(form_span.shrink_to_end()));
        }
    }

    fn build_operation(
        &mut self,
        op: &str,
        raw: &str,
        op_span: Span,
        mut args: Vec<Expr<'a>>,
        mode: Option<ModeArg>,
        span: Span,
    ) -> Expr<'a> {
        let family = operators::family_operator(op);
        let known = family.is_some() || operators::is_operator(op);
        if !known {
            return self.unknown_operator(raw, op_span, args, span);
        }
        let comparison = match mode {
            Some(mode) => self.comparison_mode(op, family, mode),
            None => None,
        };

        match op {
            "?" => {
                self.check_arity(&mut args, op, op_span, 3, Some(3), "3", span);
                let mut args = args.into_iter();
                let mut next = || args.next().unwrap_or(Expr::Missing(span.shrink_to_end()));
                let (condition, then_branch, else_branch) = (next(), next(), next());
                Expr::Conditional(ConditionalExpr {
                    condition: self.alloc(condition),
                    then_branch: self.alloc(then_branch),
                    else_branch: self.alloc(else_branch),
                    span,
                })
            }
            "??" | "->" => {
                self.check_arity(&mut args, op, op_span, 2, Some(2), "2", span);
                args.truncate(2);
                let binary = BinaryOp::from_symbol(op).unwrap_or(BinaryOp::Coalesce);
                self.fold_binary(binary, args, span)
            }
            "-" if args.len() == 1 => self.unary(UnaryOp::Neg, args, span),
            "!" | "~" | "++" | "--" => {
                self.check_arity(&mut args, op, op_span, 1, Some(1), "1", span);
                let unary = UnaryOp::from_symbol(op).unwrap_or(UnaryOp::Not);
                self.unary(unary, args, span)
            }
            _ => {
                if let Some(binary) = BinaryOp::from_symbol(op) {
                    self.check_arity(&mut args, op, op_span, 2, None, "2 or more", span);
                    return self.fold_binary(binary, args, span);
                }
                match family {
                    Some(spec) => self.family_operation(spec, op_span, args, comparison, span),
                    None => {
                        // Core words reached without their own grammar (`await`).
                        self.check_arity(&mut args, op, op_span, 1, Some(1), "1", span);
                        let operand = args.into_iter().next().unwrap_or(Expr::Missing(span));
                        Expr::Await(AwaitExpr {
                            operand: self.alloc(operand),
                            span,
                        })
                    }
                }
            }
        }
    }

    fn comparison_mode(
        &mut self,
        op: &str,
        family: Option<&'static OperatorSpec>,
        mode: ModeArg,
    ) -> Option<ComparisonMode> {
        if !family.map_or(false, |spec| spec.supports_mode) {
            self.error(mode.span, &messages::OPERATION_0_DOES_NOT_SUPPORT_A_COMPARISON_MODE, &[op]);
            return None;
        }
        let parsed = ComparisonMode::from_keyword(&mode.text);
        if parsed.is_none() {
            let expected = ComparisonMode::KEYWORDS.join(", ");
            self.error(
                mode.span,
                &messages::UNKNOWN_COMPARISON_MODE_0,
                &[mode.text.as_str(), expected.as_str()],
            );
        }
        parsed
    }

    fn unary(&mut self, op: UnaryOp, args: Vec<Expr<'a>>, span: Span) -> Expr<'a> {
        let operand = args.into_iter().next().unwrap_or(Expr::Missing(span));
        Expr::Unary(UnaryExpr {
            op,
            operand: self.alloc(operand),
            span,
        })
    }

    /// `(op a b c)` as `((a op b) op c)`; the outermost node spans the form.
    fn fold_binary(&mut self, op: BinaryOp, args: Vec<Expr<'a>>, span: Span) -> Expr<'a> {
        let mut args = args.into_iter();
        let mut acc = args.next().unwrap_or(Expr::Missing(span));
        let rest: Vec<Expr<'a>> = args.collect();
        let last = rest.len().saturating_sub(1);
        for (i, right) in rest.into_iter().enumerate() {
            let node_span = if i == last {
                span
            } else {
                acc.span().cover(&right.span())
            };
            acc = Expr::Binary(BinaryExpr {
                op,
                left: self.alloc(acc),
                right: self.alloc(right),
                span: node_span,
            });
        }
        acc
    }

    fn family_operation(
        &mut self,
        spec: &'static OperatorSpec,
        op_span: Span,
        mut args: Vec<Expr<'a>>,
        comparison: Option<ComparisonMode>,
        span: Span,
    ) -> Expr<'a> {
        let expected = spec.arity_text();
        self.check_arity(&mut args, spec.name, op_span, spec.min_args, spec.max_args, &expected, span);

        match spec.name {
            "char" => {
                if let Some(Expr::Literal(Literal {
                    kind: LiteralKind::String(text),
                    span: literal_span,
                })) = args.first()
                {
                    let count = text.chars().count();
                    match text.chars().next() {
                        Some(ch) if count == 1 => {
                            return Expr::Literal(Literal {
                                kind: LiteralKind::Char(ch),
                                span,
                            })
                        }
                        _ => {
                            let found = count.to_string();
                            self.error(
                                *literal_span,
                                &messages::CHARACTER_LITERAL_MUST_CONTAIN_ONE_CHARACTER_FOUND_0,
                                &[found.as_str()],
                            );
                        }
                    }
                }
            }
            "substr" => {
                let mut args = args.into_iter();
                let source = args.next().unwrap_or(Expr::Missing(span));
                let start = args.next().unwrap_or(Expr::Missing(span));
                let length = args.next();
                return Expr::Substring(SubstringExpr {
                    source: self.alloc(source),
                    start: self.alloc(start),
                    length: length.map(|length| self.alloc(length)),
                    span,
                });
            }
            _ => {}
        }

        Expr::Operation(OperationExpr {
            family: spec.family,
            name: spec.name,
            args: self.alloc_slice(args),
            type_arg: None,
            comparison,
            span,
        })
    }

    /// One diagnostic for an unresolved operator; the form stands for its
    /// first argument, or `0`.
    fn unknown_operator(&mut self, raw: &str, op_span: Span, args: Vec<Expr<'a>>, span: Span) -> Expr<'a> {
        if let Some(hint) = operators::foreign_hint(raw) {
            self.error(op_span, &messages::UNKNOWN_OPERATOR_0_HINT_1, &[raw, hint]);
        } else if let Some(candidate) = operators::nearest(raw, self.options.max_suggestion_distance) {
            log::debug!("operator {:?} is close to {}", raw, candidate);
            self.suggest(
                op_span,
                &messages::UNKNOWN_OPERATOR_0_DID_YOU_MEAN_1,
                &[raw, candidate],
                candidate,
            );
        } else {
            let listing = operators::listing(self.options.max_listing_entries);
            self.error(
                op_span,
                &messages::UNKNOWN_OPERATOR_0_VALID_OPERATORS_1,
                &[raw, listing.as_str()],
            );
        }
        args.into_iter().next().unwrap_or(Expr::Literal(Literal {
            kind: LiteralKind::Integer(0),
            span,
        }))
    }

    // ========================================================================
    // Core forms
    // ========================================================================

    /// `(forall ((x T) ...) body)`
    fn parse_quantifier(&mut self, op: &str, start: Span) -> Expr<'a> {
        let kind = if op == "forall" {
            QuantifierKind::ForAll
        } else {
            QuantifierKind::Exists
        };
        let list_start = self.cursor.current().span;
        let mut bindings = Vec::new();
        let has_list = self.cursor.eat(SyntaxKind::OpenParenToken);
        if has_list {
            while self.cursor.check(SyntaxKind::OpenParenToken) {
                let binding_start = self.cursor.current().span;
                self.cursor.advance();
                let name = self.expect(SyntaxKind::Identifier);
                let ty = self.parse_type_name();
                self.expect(SyntaxKind::CloseParenToken);
                bindings.push(QuantifierBinding {
                    name: self.alloc_str(&name.text),
                    ty,
                    synthetic: false,
                    span: self.cursor.span_from(binding_start),
                });
            }
            self.expect(SyntaxKind::CloseParenToken);
        }
        if bindings.is_empty() {
            let list_span = self.cursor.span_from(list_start);
            self.error(list_span, &messages::QUANTIFIER_0_REQUIRES_AT_LEAST_ONE_BINDING, &[op]);
            bindings.push(QuantifierBinding {
                name: "_",
                ty: self.alloc(TypeRef::Named("?")),
                synthetic: true,
                span: list_span,
            });
        }
        let mut body = self.parse_expression();
        if !has_list {
            // Bare operands before the body stand in for the binding list.
            while !self.at_args_end() {
                body = self.parse_expression();
            }
        }
        self.expect(SyntaxKind::CloseParenToken);
        Expr::Quantifier(QuantifierExpr {
            kind,
            bindings: self.alloc_slice(bindings),
            body,
            span: self.cursor.span_from(start),
        })
    }

    /// `(call target!? args*)`
    fn parse_call_expr(&mut self, start: Span) -> Expr<'a> {
        let (target, fallible) = if self.cursor.check(SyntaxKind::Identifier) {
            let target = self.dotted_name();
            let fallible = self.cursor.check(SyntaxKind::ExclamationToken) && self.cursor.is_adjacent();
            if fallible {
                self.cursor.advance();
            }
            (target, fallible)
        } else {
            self.expect(SyntaxKind::Identifier);
            ("", false)
        };
        let (args, _) = self.parse_args();
        Expr::Call(CallExpr {
            target,
            fallible,
            args: self.alloc_slice(args),
            span: self.cursor.span_from(start),
        })
    }

    /// `(match x (case p e) (when p g e) (default e))`
    fn parse_match_expr(&mut self, start: Span) -> Expr<'a> {
        let scrutinee = self.parse_expression();
        let mut arms = Vec::new();
        while self.cursor.check(SyntaxKind::OpenParenToken) {
            let arm_start = self.cursor.current().span;
            let before = self.cursor.save();
            self.cursor.advance();
            let word = self.cursor.current().clone();
            let (pattern, guard, is_default) = match word.text.as_str() {
                "case" if word.kind == SyntaxKind::Identifier => {
                    self.cursor.advance();
                    (self.parse_pattern(), None, false)
                }
                "when" if word.kind == SyntaxKind::Identifier => {
                    self.cursor.advance();
                    let pattern = self.parse_pattern();
                    (pattern, Some(self.parse_expression()), false)
                }
                "default" if word.kind == SyntaxKind::Identifier => {
                    self.cursor.advance();
                    (self.alloc(Pattern::Wildcard(word.span)), None, true)
                }
                _ => {
                    self.error(word.span, &messages::UNEXPECTED_TOKEN_0, &[word.text.as_str()]);
                    self.cursor.restore(before);
                    self.skip_balanced();
                    continue;
                }
            };
            let body = self.parse_expression();
            self.expect(SyntaxKind::CloseParenToken);
            arms.push(MatchArm {
                pattern,
                guard,
                body,
                is_default,
                span: self.cursor.span_from(arm_start),
            });
        }
        self.expect(SyntaxKind::CloseParenToken);
        Expr::Match(MatchExpr {
            scrutinee,
            arms: self.alloc_slice(arms),
            span: self.cursor.span_from(start),
        })
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    pub(crate) fn parse_pattern(&mut self) -> &'a Pattern<'a> {
        let pattern = self.parse_pattern_node();
        self.alloc(pattern)
    }

    fn parse_pattern_node(&mut self) -> Pattern<'a> {
        let token = self.cursor.current().clone();
        match token.kind {
            SyntaxKind::Identifier if token.text == "_" => {
                self.cursor.advance();
                Pattern::Wildcard(token.span)
            }
            SyntaxKind::Identifier => {
                if let Some(kind) = keyword_literal(&token.text) {
                    self.cursor.advance();
                    return Pattern::Literal(Literal {
                        kind,
                        span: token.span,
                    });
                }
                let name = self.dotted_name();
                let span = self.cursor.span_from(token.span);
                if name.contains('.') {
                    Pattern::Variant {
                        name,
                        fields: &[],
                        span,
                    }
                } else {
                    Pattern::Binding { name, span }
                }
            }
            SyntaxKind::OpenParenToken => self.parse_compound_pattern(),
            _ => match self.literal_pattern() {
                Some(literal) => Pattern::Literal(literal),
                None => {
                    self.error(token.span, &messages::PATTERN_EXPECTED, &[]);
                    if !matches!(
                        token.kind,
                        SyntaxKind::CloseBracketToken | SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
                    ) {
                        self.cursor.advance();
                    }
                    Pattern::Wildcard(token.span.shrink_to_start())
                }
            },
        }
    }

    fn literal_pattern(&mut self) -> Option<Literal<'a>> {
        let token = self.cursor.current().clone();
        match token.kind {
            SyntaxKind::IntegerLiteral
            | SyntaxKind::FloatLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::CharLiteral => {
                self.cursor.advance();
                Some(self.literal_of(&token))
            }
            SyntaxKind::MinusToken => self.negative_literal(),
            SyntaxKind::Identifier => {
                let kind = keyword_literal(&token.text)?;
                self.cursor.advance();
                Some(Literal {
                    kind,
                    span: token.span,
                })
            }
            _ => None,
        }
    }

    /// `(is T name?)`, `(.. lo hi)` or `(Name pat*)`.
    fn parse_compound_pattern(&mut self) -> Pattern<'a> {
        let start = self.cursor.current().span;
        let before = self.cursor.save();
        self.cursor.advance();
        let token = self.cursor.current().clone();

        if token.is_ident("is") {
            self.cursor.advance();
            let ty = self.parse_type_name();
            let binding = if self.cursor.check(SyntaxKind::Identifier) {
                Some(self.dotted_name())
            } else {
                None
            };
            self.expect(SyntaxKind::CloseParenToken);
            return Pattern::Type {
                ty,
                binding,
                span: self.cursor.span_from(start),
            };
        }

        if token.is(SyntaxKind::DotDotToken) {
            self.cursor.advance();
            let bound = |parser: &mut Self| {
                parser.literal_pattern().unwrap_or_else(|| {
                    let span = parser.cursor.current().span;
                    parser.error(span, &messages::PATTERN_EXPECTED, &[]);
                    Literal {
                        kind: LiteralKind::Integer(0),
                        span: span.shrink_to_start(),
                    }
                })
            };
            let low = bound(self);
            let high = bound(self);
            self.expect(SyntaxKind::CloseParenToken);
            return Pattern::Range {
                low,
                high,
                span: self.cursor.span_from(start),
            };
        }

        if token.is(SyntaxKind::Identifier) {
            let name = self.dotted_name();
            let mut fields = Vec::new();
            while !matches!(
                self.cursor.kind(),
                SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
            ) {
                let field_start = self.cursor.save();
                fields.push(self.parse_pattern_node());
                if self.cursor.save() == field_start {
                    self.cursor.advance();
                }
            }
            self.expect(SyntaxKind::CloseParenToken);
            return Pattern::Variant {
                name,
                fields: self.alloc_slice(fields),
                span: self.cursor.span_from(start),
            };
        }

        self.error(token.span, &messages::PATTERN_EXPECTED, &[]);
        self.cursor.restore(before);
        self.skip_balanced();
        Pattern::Wildcard(self.cursor.span_from(start))
    }

    // ========================================================================
    // Lambdas
    // ========================================================================

    /// Look past `((` for a parameter list followed by `) =>`, without
    /// moving the cursor.
    fn is_lambda_head(&self) -> bool {
        let mut n = 2;
        loop {
            match self.cursor.peek(n).kind {
                SyntaxKind::Identifier
                | SyntaxKind::ColonToken
                | SyntaxKind::CommaToken
                | SyntaxKind::DotToken
                | SyntaxKind::QuestionToken
                | SyntaxKind::ExclamationToken
                | SyntaxKind::LessThanToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::GreaterThanGreaterThanToken
                | SyntaxKind::OpenBracketToken
                | SyntaxKind::CloseBracketToken => n += 1,
                SyntaxKind::CloseParenToken => {
                    return self.cursor.check_at(n + 1, SyntaxKind::EqualsGreaterThanToken)
                }
                _ => return false,
            }
        }
    }

    /// `((a b:T) => body)`
    fn parse_inline_lambda(&mut self) -> Expr<'a> {
        let start = self.cursor.current().span;
        self.cursor.advance();
        self.cursor.advance();
        let mut params = Vec::new();
        while self.cursor.check(SyntaxKind::Identifier) {
            let token = self.cursor.current().clone();
            self.cursor.advance();
            let ty = if self.cursor.eat(SyntaxKind::ColonToken) {
                self.parse_type_name()
            } else {
                self.alloc(TypeRef::Named("?"))
            };
            params.push(Param {
                name: self.alloc_str(&token.text),
                ty,
                mutable: false,
                default: None,
                span: self.cursor.span_from(token.span),
            });
            self.cursor.eat(SyntaxKind::CommaToken);
        }
        self.expect(SyntaxKind::CloseParenToken);
        self.expect(SyntaxKind::EqualsGreaterThanToken);
        let body = self.parse_expression();
        self.expect(SyntaxKind::CloseParenToken);
        Expr::Lambda(LambdaExpr {
            id: None,
            params: self.alloc_slice(params),
            output: None,
            body: LambdaBody::Expr(body),
            span: self.cursor.span_from(start),
        })
    }

    // ========================================================================
    // Expression tags
    // ========================================================================

    fn parse_tag_expression(&mut self, name: &'static str) -> Expr<'a> {
        match name {
            "LAMBDA" => self.parse_lambda_tag(),
            _ => self.parse_collection(name),
        }
    }

    /// `[LAMBDA {id}] [IN ..]* [OUT ..]? statements [/LAMBDA {id}]`
    fn parse_lambda_tag(&mut self) -> Expr<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let id = self.interp.text_at(&head.attrs, 0).unwrap_or("");
        self.finish_tag();

        self.push_scope("LAMBDA");
        let mut params = Vec::new();
        let mut output = None;
        loop {
            match self.peek_tag() {
                Some(PeekedTag { closing: false, name: Some("IN") }) => params.push(self.parse_param()),
                Some(PeekedTag { closing: false, name: Some("OUT") }) => output = Some(self.parse_output()),
                _ => break,
            }
        }
        let body = self.parse_block();
        self.pop_scope();
        self.close_scope("LAMBDA", id);

        Expr::Lambda(LambdaExpr {
            id: Some(id),
            params: self.alloc_slice(params),
            output,
            body: LambdaBody::Block(body),
            span: self.cursor.span_from(start),
        })
    }

    /// `[ARR {id:type:size?}]`, `[LIST {id:type}]`, `[DICT {id:key:value}]`,
    /// `[SETOF {id:type}]`; elements may follow in the payload or before the
    /// close tag.
    fn parse_collection(&mut self, name: &'static str) -> Expr<'a> {
        let start = self.cursor.current().span;
        let head = self.open_tag();
        let header = self.interp.collection_header(&head.attrs);
        let kind = match name {
            "ARR" => CollectionKind::Array,
            "LIST" => CollectionKind::List,
            "DICT" => CollectionKind::Dict,
            _ => CollectionKind::Set,
        };
        let size = match (kind, head.attrs.get(2)) {
            (CollectionKind::Array, Some(value)) => Some(self.attr_expr(value)),
            _ => None,
        };
        let value_type = match kind {
            CollectionKind::Dict => self.interp.optional_type_at(&head.attrs, 2),
            _ => None,
        };

        let mut items = Vec::new();
        self.collect_elements(&mut items);
        self.finish_tag();
        self.push_scope(name);
        self.collect_elements(&mut items);
        self.pop_scope();
        self.close_scope(name, header.id);

        let (elements, entries) = if kind == CollectionKind::Dict {
            (Vec::new(), self.pair_entries(items))
        } else {
            (items, Vec::new())
        };
        Expr::Collection(CollectionExpr {
            kind,
            id: header.id,
            element_type: header.element_type,
            value_type,
            size,
            elements: self.alloc_slice(elements),
            entries: self.alloc_slice(entries),
            span: self.cursor.span_from(start),
        })
    }

    fn collect_elements(&mut self, items: &mut Vec<Expr<'a>>) {
        while !self.at_payload_end() {
            let before = self.cursor.save();
            items.push(self.parse_expr_node());
            if self.cursor.save() == before {
                self.cursor.advance();
            }
        }
    }

    /// Alternating keys and values; a key without a value is reported.
    fn pair_entries(&mut self, items: Vec<Expr<'a>>) -> Vec<DictEntry<'a>> {
        let mut entries = Vec::new();
        let mut items = items.into_iter();
        while let Some(key) = items.next() {
            let value = match items.next() {
                Some(value) => value,
                None => {
                    let span = key.span().shrink_to_end();
                    self.error(span, &messages::EXPRESSION_EXPECTED, &[]);
                    Expr::Missing(span)
                }
            };
            entries.push(DictEntry {
                key: self.alloc(key),
                value: self.alloc(value),
            });
        }
        entries
    }
}

fn keyword_literal(text: &str) -> Option<LiteralKind<'static>> {
    match text {
        "true" => Some(LiteralKind::Bool(true)),
        "false" => Some(LiteralKind::Bool(false)),
        "null" => Some(LiteralKind::Null),
        _ => None,
    }
}

//! Type names written inside payloads and prefix forms, as opposed to the
//! attribute text handled by the interpreter.

use tessera_ast::syntax_kind::SyntaxKind;
use tessera_ast::types::{Primitive, TypeRef};
use tessera_diagnostics::messages;

use crate::parser::Parser;

impl<'a, 's> Parser<'a, 's> {
    /// Parse a type name from the token stream. A missing type is reported
    /// and stands in as `?` without consuming anything.
    pub(crate) fn parse_type_name(&mut self) -> &'a TypeRef<'a> {
        let ty = self.parse_type_core();
        if self.generic_depth == 0 {
            self.pending_angle = false;
        }
        self.alloc(ty)
    }

    fn parse_type_core(&mut self) -> TypeRef<'a> {
        let mut ty = match self.cursor.kind() {
            SyntaxKind::QuestionToken => {
                self.cursor.advance();
                TypeRef::Option(self.parse_type_name())
            }
            SyntaxKind::OpenBracketToken => {
                self.cursor.advance();
                let element = self.parse_type_name();
                self.expect(SyntaxKind::CloseBracketToken);
                TypeRef::Array(element)
            }
            SyntaxKind::Identifier => self.parse_named_type(),
            _ => {
                let span = self.cursor.current().span;
                self.error(span, &messages::TYPE_EXPECTED, &[]);
                return TypeRef::Named("?");
            }
        };

        // Suffixes only bind when written flush against the type.
        loop {
            if !self.cursor.is_adjacent() {
                break;
            }
            match self.cursor.kind() {
                SyntaxKind::OpenBracketToken if self.cursor.check_at(1, SyntaxKind::CloseBracketToken) => {
                    self.cursor.advance();
                    self.cursor.advance();
                    ty = TypeRef::Array(self.alloc(ty));
                }
                SyntaxKind::QuestionToken => {
                    self.cursor.advance();
                    ty = TypeRef::Option(self.alloc(ty));
                }
                SyntaxKind::ExclamationToken => {
                    self.cursor.advance();
                    let err = if self.cursor.check(SyntaxKind::Identifier) && self.cursor.is_adjacent() {
                        self.parse_type_name()
                    } else {
                        self.alloc(TypeRef::STR)
                    };
                    ty = TypeRef::Result {
                        ok: self.alloc(ty),
                        err,
                    };
                }
                _ => break,
            }
        }
        ty
    }

    /// `Name`, `a.b.Name` or `Name<args>`.
    fn parse_named_type(&mut self) -> TypeRef<'a> {
        let mut name = self.cursor.current().text.clone();
        self.cursor.advance();
        while self.cursor.check(SyntaxKind::DotToken)
            && self.cursor.is_adjacent()
            && self.cursor.check_at(1, SyntaxKind::Identifier)
        {
            self.cursor.advance();
            name.push('.');
            name.push_str(&self.cursor.current().text);
            self.cursor.advance();
        }

        if !(self.cursor.check(SyntaxKind::LessThanToken) && self.cursor.is_adjacent()) {
            return match Primitive::from_code(&name) {
                Some(primitive) => TypeRef::Primitive(primitive),
                None => TypeRef::Named(self.alloc_str(&name)),
            };
        }

        self.cursor.advance();
        self.generic_depth += 1;
        let mut args = vec![*self.parse_type_name()];
        while self.cursor.eat(SyntaxKind::CommaToken) {
            args.push(*self.parse_type_name());
        }
        self.close_generic_list(&name);
        self.generic_depth -= 1;

        match (name.as_str(), args.as_slice()) {
            ("Option", [inner]) => TypeRef::Option(self.alloc(*inner)),
            ("Result", [ok, err]) => TypeRef::Result {
                ok: self.alloc(*ok),
                err: self.alloc(*err),
            },
            _ => TypeRef::Generic {
                name: self.alloc_str(&name),
                args: self.arena.alloc_slice_copy(&args),
            },
        }
    }

    /// Consume the `>` ending a generic list. A `>>` closes the inner list
    /// first and the enclosing one on the way out; with no enclosing list
    /// its second `>` is stray.
    fn close_generic_list(&mut self, name: &str) {
        if self.pending_angle {
            self.pending_angle = false;
            self.cursor.advance();
            return;
        }
        match self.cursor.kind() {
            SyntaxKind::GreaterThanToken => self.cursor.advance(),
            SyntaxKind::GreaterThanGreaterThanToken if self.generic_depth > 1 => {
                self.pending_angle = true
            }
            SyntaxKind::GreaterThanGreaterThanToken => {
                let span = self.cursor.current().span;
                self.error(span, &messages::UNEXPECTED_CLOSING_ANGLE_IN_0, &[name]);
                self.cursor.advance();
            }
            _ => {
                let span = self.cursor.current().span;
                self.error(span, &messages::UNTERMINATED_GENERIC_ARGUMENT_LIST_IN_0, &[name]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use bumpalo::Bump;
    use tessera_ast::types::{Primitive, TypeRef};
    use tessera_diagnostics::DiagnosticCollection;
    use tessera_scanner::Scanner;

    fn check_type(source: &str, expected: &str) {
        let arena = Bump::new();
        let mut diags = DiagnosticCollection::new();
        let mut parser = Parser::new(&arena, Scanner::new(source).scan_all(), &mut diags);
        let ty = parser.parse_type_name();
        assert!(parser.cursor.is_at_end(), "leftover tokens in {:?}", source);
        assert_eq!(ty.to_string(), expected);
        drop(parser);
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
    }

    #[test]
    fn test_simple_and_primitive() {
        check_type("int", "i32");
        check_type("Shape", "Shape");
        check_type("io.File", "io.File");
    }

    #[test]
    fn test_suffixes() {
        check_type("int[]", "[i32]");
        check_type("?str", "?str");
        check_type("int!", "i32!str");
        check_type("int!IOError", "i32!IOError");
    }

    #[test]
    fn test_nested_generics_split_shift() {
        check_type("Map<str, List<int>>", "Map<str,List<i32>>");
        check_type("Option<int>", "?i32");
    }

    #[test]
    fn test_extra_closing_angle_does_not_leak() {
        let arena = Bump::new();
        let mut diags = DiagnosticCollection::new();
        let tokens = Scanner::new("List<int>> Map<str, List<int>>").scan_all();
        let mut parser = Parser::new(&arena, tokens, &mut diags);
        assert_eq!(parser.parse_type_name().to_string(), "List<i32>");
        assert!(!parser.pending_angle);
        assert_eq!(parser.parse_type_name().to_string(), "Map<str,List<i32>>");
        assert!(parser.cursor.is_at_end());
        drop(parser);
        let codes: Vec<_> = diags.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![1010]);
    }

    #[test]
    fn test_missing_type_is_reported() {
        let arena = Bump::new();
        let mut diags = DiagnosticCollection::new();
        let mut parser = Parser::new(&arena, Scanner::new(")").scan_all(), &mut diags);
        let ty = parser.parse_type_name();
        assert_eq!(*ty, TypeRef::Named("?"));
        assert!(!ty.is_primitive(Primitive::I32));
        drop(parser);
        assert_eq!(diags.with_code(1013).count(), 1);
    }
}

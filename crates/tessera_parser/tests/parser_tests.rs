//! Parser integration tests.
//!
//! Verifies that the parser builds the expected program tree from Tessera
//! source and reports structural problems without giving up on the parse.

use bumpalo::Bump;
use proptest::prelude::*;
use rstest::rstest;
use tessera_ast::*;
use tessera_core::text::LineAndColumn;
use tessera_diagnostics::DiagnosticCollection;
use tessera_options::ParserOptions;
use tessera_parser::Parser;
use tessera_scanner::Scanner;

/// Helper: parse `source` with `options` and hand the tree and the collected
/// diagnostics to `check`.
fn parse_with_options<R>(
    source: &str,
    options: ParserOptions,
    check: impl FnOnce(&Program<'_>, &DiagnosticCollection) -> R,
) -> R {
    let arena = Bump::new();
    let mut diags = DiagnosticCollection::new();
    let tokens = Scanner::new(source).scan_all();
    let program = Parser::with_options(&arena, tokens, &mut diags, options).parse_program();
    check(&program, &diags)
}

fn parse<R>(source: &str, check: impl FnOnce(&Program<'_>, &DiagnosticCollection) -> R) -> R {
    parse_with_options(source, ParserOptions::default(), check)
}

/// Helper: wrap statements in a function so they parse as a body.
fn in_function(body: &str) -> String {
    format!("[F {{f1:Test}}]\n{}\n[/F {{f1}}]", body)
}

/// Helper: a function returning `form`.
fn returning(form: &str) -> String {
    in_function(&format!("[R {}]", form))
}

fn codes(diags: &DiagnosticCollection) -> Vec<u32> {
    diags.diagnostics().iter().map(|d| d.code).collect()
}

fn body<'a>(program: &Program<'a>) -> &'a [Stmt<'a>] {
    program.functions[0].body.expect("function has a body")
}

fn returned<'a>(program: &Program<'a>) -> &'a Expr<'a> {
    match body(program).first() {
        Some(Stmt::Return(ReturnStmt { value: Some(expr), .. })) => *expr,
        other => panic!("expected a return with a value, got {:?}", other),
    }
}

fn int_value(expr: &Expr<'_>) -> Option<i64> {
    match expr {
        Expr::Literal(Literal { kind: LiteralKind::Integer(value), .. }) => Some(*value),
        _ => None,
    }
}

fn ref_path<'a>(expr: &Expr<'a>) -> Option<&'a str> {
    match expr {
        Expr::Ref(reference) => Some(reference.path),
        _ => None,
    }
}

const I32: TypeRef<'static> = TypeRef::Primitive(Primitive::I32);

// ============================================================================
// Functions
// ============================================================================

const ADD_SOURCE: &str = "\
[F {f1:Add:pub}]
  [IN {a:i32}]
  [IN {b:i32}]
  [OUT {i32}]
  [R (+ a b)]
[/F {f1}]";

#[test]
fn test_parse_add_function() {
    parse(ADD_SOURCE, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        assert_eq!(program.functions.len(), 1);

        let add = &program.functions[0];
        assert_eq!(add.kind, FunctionKind::Function);
        assert_eq!(add.id, "f1");
        assert_eq!(add.name, "Add");
        assert_eq!(add.visibility, Visibility::Public);
        assert!(!add.is_async);

        let names: Vec<_> = add.params.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(add.params.iter().all(|p| *p.ty == I32));
        assert_eq!(add.output.copied(), Some(I32));

        let stmts = body(program);
        assert_eq!(stmts.len(), 1);
        match returned(program) {
            Expr::Binary(binary) => {
                assert_eq!(binary.op, BinaryOp::Add);
                assert_eq!(ref_path(binary.left), Some("a"));
                assert_eq!(ref_path(binary.right), Some("b"));
            }
            other => panic!("expected a binary add, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_function_span_covers_open_through_close() {
    parse(ADD_SOURCE, |program, _| {
        let span = program.functions[0].span;
        assert_eq!(span.range.pos as usize, 0);
        assert_eq!(span.range.end as usize, ADD_SOURCE.len());
        assert_eq!(span.start, LineAndColumn::new(0, 0));
        assert_eq!(span.end.line, 5);

        // `[R (+ a b)]` sits on line 4, and the add spans its parentheses.
        let ret = body(program)[0].span();
        assert_eq!(ret.start, LineAndColumn::new(4, 2));
        assert_eq!(ret.end, LineAndColumn::new(4, 13));
        let add = returned(program).span();
        assert_eq!(add.start, LineAndColumn::new(4, 5));
        assert_eq!(add.end, LineAndColumn::new(4, 12));
    });
}

#[test]
fn test_parse_async_function_and_doc() {
    let source = "[AF {f1:Fetch:pub:static:doc=\"loads it\"}] [R 1] [/AF {f1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let fetch = &program.functions[0];
        assert!(fetch.is_async);
        assert_eq!(fetch.modifiers, ModifierFlags::STATIC);
        assert_eq!(fetch.doc, Some("loads it"));
    });
}

#[test]
fn test_parse_legacy_attribute_groups() {
    let source = "[F {f1}{Add}{pub}] [R 1] [/F {f1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty());
        assert_eq!(program.functions[0].name, "Add");
        assert_eq!(program.functions[0].visibility, Visibility::Public);
    });

    let options = ParserOptions {
        warn_legacy_attributes: true,
        ..ParserOptions::default()
    };
    parse_with_options(source, options, |_, diags| {
        assert_eq!(codes(diags), vec![2003]);
        assert!(!diags.has_errors());
    });
}

#[test]
fn test_parse_contract_sections() {
    let source = in_function(
        "[FX {io:fr:fw}]\n[SEM {#idem:#weird}]\n[DEP {db@1.2:cache?:*}]\n[CX {O(n log n):O(1)}]\n[R 0]",
    );
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let contract = &program.functions[0].contract;

        let effects: Vec<_> = contract.effects.iter().map(|e| (e.category, e.value)).collect();
        assert_eq!(effects, vec![("io", "console"), ("filesystem", "read,write")]);
        assert_eq!(contract.semantics, &["idempotent", "weird"]);

        let deps = contract.dependencies.expect("dependencies");
        assert!(deps.unknown_callers);
        assert_eq!(deps.items.len(), 2);
        assert_eq!(deps.items[0].name, "db");
        assert_eq!(deps.items[0].version, Some("1.2"));
        assert!(deps.items[1].optional);

        let complexity = contract.complexity.expect("complexity");
        assert_eq!(complexity.time, ComplexityClass::Linearithmic);
        assert_eq!(complexity.space, Some(ComplexityClass::Constant));
        assert_eq!(body(program).len(), 1);
    });
}

#[test]
fn test_parse_where_clauses_in_both_forms() {
    let source = "\
[F {f1:Max}]
  [TP {T}]
  [WHERE {T:IComparable<T>}]
  [WHERE \"U: IEquatable<U> + Clone\"]
  [IN {a:T}]
  [R a]
[/F {f1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let params = program.functions[0].type_params;
        assert_eq!(params.len(), 2);

        assert_eq!(params[0].name, "T");
        let t: Vec<_> = params[0].constraints.iter().map(|c| c.to_string()).collect();
        assert_eq!(t, vec!["IComparable<T>"]);

        assert_eq!(params[1].name, "U");
        let u: Vec<_> = params[1].constraints.iter().map(|c| c.to_string()).collect();
        assert_eq!(u, vec!["IEquatable<U>", "Clone"]);
    });
}

#[test]
fn test_parse_where_string_reports_junk() {
    let source = in_function("[WHERE \"U IEquatable\"] [R 1]");
    parse(&source, |program, diags| {
        assert!(diags.has_errors());
        assert_eq!(body(program).len(), 1);
    });
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_parse_module_imports_and_metadata() {
    let source = "\
[M {m1:geometry}]
[IMPORT {std.math:m}]
[META {author:ada}]
[F {f1:Area:pub}] [R 0] [/F {f1}]
[/M {m1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let module = program.module.as_ref().expect("module header");
        assert_eq!((module.id, module.name), ("m1", "geometry"));
        assert_eq!(program.imports[0].path, "std.math");
        assert_eq!(program.imports[0].alias, Some("m"));
        assert_eq!((program.metadata[0].key, program.metadata[0].value), ("author", "ada"));
        assert_eq!(program.functions.len(), 1);
    });
}

#[test]
fn test_parse_class_members() {
    let source = "\
[C {c1:Counter:pub:sealed}]
  [IMPL {IReset:ICount}]
  [FLD {~count:i32:pri} 0]
  [PR {p1:Count:i32:pub}]
    [GET] [R count] [/GET]
    [SET] [A {count} value] [/SET]
  [/PR {p1}]
  [CT {ct1:pub}] [IN {start:i32}] [A {count} start] [/CT {ct1}]
  [MT {m1:Inc:pub}] [A {count:+} 1] [/MT {m1}]
[/C {c1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let class = match &program.types[0] {
            TypeDecl::Class(class) => class,
            other => panic!("expected a class, got {:?}", other),
        };
        assert_eq!(class.name, "Counter");
        assert_eq!(class.visibility, Visibility::Public);
        assert_eq!(class.modifiers, ModifierFlags::SEALED);
        assert_eq!(class.base, None);
        assert_eq!(class.implements, &["IReset", "ICount"]);
        assert_eq!(class.members.len(), 4);

        match &class.members[0] {
            ClassMember::Field(field) => {
                assert_eq!(field.name, "count");
                assert!(field.mutable);
                assert_eq!(field.visibility, Visibility::Private);
                assert_eq!(field.init.and_then(int_value), Some(0));
            }
            other => panic!("expected a field, got {:?}", other),
        }
        match &class.members[1] {
            ClassMember::Property(prop) => {
                assert_eq!(prop.name, "Count");
                assert_eq!(*prop.ty, I32);
                assert_eq!(prop.getter.map(<[_]>::len), Some(1));
                assert_eq!(prop.setter.map(<[_]>::len), Some(1));
            }
            other => panic!("expected a property, got {:?}", other),
        }
        match &class.members[2] {
            ClassMember::Constructor(ctor) => {
                assert_eq!(ctor.kind, FunctionKind::Constructor);
                assert_eq!(ctor.name, "Counter");
                assert_eq!(ctor.params.len(), 1);
            }
            other => panic!("expected a constructor, got {:?}", other),
        }
        match &class.members[3] {
            ClassMember::Method(method) => match method.body.map(|b| &b[0]) {
                Some(Stmt::Assign(assign)) => {
                    assert_eq!(assign.target, "count");
                    assert_eq!(assign.op, Some(BinaryOp::Add));
                }
                other => panic!("expected a compound assignment, got {:?}", other),
            },
            other => panic!("expected a method, got {:?}", other),
        }
    });
}

#[rstest]
#[case("[C {c1:Dog:Animal:sealed}] [/C {c1}]", Some("Animal"), ModifierFlags::SEALED)]
#[case("[C {c1:Dog:Animal}] [/C {c1}]", Some("Animal"), ModifierFlags::NONE)]
#[case("[C {c1:Point:struct,readonly}] [/C {c1}]", None, ModifierFlags::STRUCT.union(ModifierFlags::READONLY))]
// Known ambiguity: a base class named like a modifier reads as the modifier.
#[case("[C {c1:Entry:record}] [/C {c1}]", None, ModifierFlags::RECORD)]
fn test_parse_class_header_forms(
    #[case] source: &str,
    #[case] base: Option<&str>,
    #[case] modifiers: ModifierFlags,
) {
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &program.types[0] {
            TypeDecl::Class(class) => {
                assert_eq!(class.base, base);
                assert_eq!(class.modifiers, modifiers);
            }
            other => panic!("expected a class, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_struct_class_drops_abstract() {
    parse("[C {c1:P:struct,abstract}] [/C {c1}]", |program, diags| {
        assert_eq!(codes(diags), vec![2002]);
        match &program.types[0] {
            TypeDecl::Class(class) => assert_eq!(class.modifiers, ModifierFlags::STRUCT),
            other => panic!("expected a class, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_interface_signatures() {
    let source = "\
[I {i1:Shape:pub:IDrawable}]
  [MT {m1:Area}] [OUT {f64}] [/MT {m1}]
  [PR {p1:Name:str}] [GET] [/GET] [/PR {p1}]
[/I {i1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let iface = match &program.types[0] {
            TypeDecl::Interface(iface) => iface,
            other => panic!("expected an interface, got {:?}", other),
        };
        assert_eq!(iface.extends, &["IDrawable"]);
        match &iface.members[0] {
            ClassMember::Method(method) => {
                assert_eq!(method.body, None);
                assert_eq!(method.output.copied(), Some(TypeRef::Primitive(Primitive::F64)));
            }
            other => panic!("expected a method, got {:?}", other),
        }
        assert!(matches!(&iface.members[1], ClassMember::Property(p) if p.setter.is_none()));
    });
}

#[test]
fn test_parse_enum_and_extension() {
    let source = "\
[E {e1:Color:pub:u8}]
  [V {Red:1}]
  [V {Green} 2]
  [V {Blue}]
[/E {e1}]
[EX {x1:Color}]
  [V {Alpha:9}]
  [MT {m1:Describe}] [R \"color\"] [/MT {m1}]
[/EX {x1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        assert_eq!(program.types.len(), 2);
        match &program.types[0] {
            TypeDecl::Enum(color) => {
                assert_eq!(color.underlying.copied(), Some(TypeRef::Primitive(Primitive::U8)));
                let values: Vec<_> = color
                    .variants
                    .iter()
                    .map(|v| (v.name, v.value.and_then(int_value)))
                    .collect();
                assert_eq!(values, vec![("Red", Some(1)), ("Green", Some(2)), ("Blue", None)]);
            }
            other => panic!("expected an enum, got {:?}", other),
        }
        match &program.types[1] {
            TypeDecl::EnumExtension(ext) => {
                assert_eq!(ext.target, "Color");
                assert_eq!(ext.variants[0].name, "Alpha");
                assert_eq!(ext.methods[0].name, "Describe");
            }
            other => panic!("expected an enum extension, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_delegate() {
    let source = "[DG {d1:Compare:pub}] [TP {T}] [IN {a:T}] [IN {b:T}] [OUT {i32}] [/DG {d1}]";
    parse(source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &program.types[0] {
            TypeDecl::Delegate(delegate) => {
                assert_eq!(delegate.name, "Compare");
                assert_eq!(delegate.type_params[0].name, "T");
                assert_eq!(delegate.params.len(), 2);
                assert_eq!(*delegate.params[0].ty, TypeRef::Named("T"));
                assert_eq!(delegate.output.copied(), Some(I32));
            }
            other => panic!("expected a delegate, got {:?}", other),
        }
    });
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_line_statements() {
    let source = in_function(
        "\
[B {~total:i32} 0]
[B {name}]
[CALL {io.read!:data} path]
[THROW {ArgError:msg=\"bad input\"}]
[ASSERT {msg=\"positive\"} (> n 0)]
[ADD {items} 1 2]
[CLEAR {items}]
[EXPR (call log \"x\")]
(call log \"y\")",
    );
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let stmts = body(program);
        assert_eq!(stmts.len(), 9);

        match &stmts[0] {
            Stmt::Bind(bind) => {
                assert_eq!(bind.name, "total");
                assert!(bind.mutable);
                assert_eq!(bind.ty.copied(), Some(I32));
                assert_eq!(bind.value.and_then(int_value), Some(0));
            }
            other => panic!("expected a bind, got {:?}", other),
        }
        assert!(matches!(&stmts[1], Stmt::Bind(BindStmt { value: None, ty: None, .. })));
        match &stmts[2] {
            Stmt::Call(call) => {
                assert_eq!(call.target, "io.read");
                assert!(call.fallible);
                assert_eq!(call.result, Some("data"));
                assert_eq!(call.args.len(), 1);
            }
            other => panic!("expected a call, got {:?}", other),
        }
        match &stmts[3] {
            Stmt::Throw(throw) => {
                assert_eq!(throw.exception_type.copied(), Some(TypeRef::Named("ArgError")));
                assert_eq!(throw.message, Some("bad input"));
            }
            other => panic!("expected a throw, got {:?}", other),
        }
        assert!(matches!(&stmts[4], Stmt::Assert(AssertStmt { message: Some("positive"), .. })));
        assert!(matches!(&stmts[5], Stmt::Mutation(m) if m.kind == MutationKind::Add && m.args.len() == 2));
        assert!(matches!(&stmts[6], Stmt::Mutation(m) if m.kind == MutationKind::Clear && m.args.is_empty()));
        assert!(matches!(&stmts[7], Stmt::Expr(ExprStmt { expr: Expr::Call(_), .. })));
        assert!(matches!(&stmts[8], Stmt::Expr(ExprStmt { expr: Expr::Call(_), .. })));
    });
}

#[test]
fn test_parse_if_elif_else() {
    let source = in_function(
        "\
[IF {i1} (> n 0)]
  [R 1]
[ELIF (< n 0)]
  [R -1]
[ELSE]
  [R 0]
[/IF {i1}]",
    );
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::If(stmt) => {
                assert_eq!(stmt.id, "i1");
                assert!(matches!(stmt.condition, Expr::Binary(b) if b.op == BinaryOp::Gt));
                assert_eq!(stmt.then_body.len(), 1);
                assert_eq!(stmt.elifs.len(), 1);
                match &stmt.elifs[0].body[0] {
                    Stmt::Return(ret) => assert_eq!(ret.value.and_then(int_value), Some(-1)),
                    other => panic!("expected a return, got {:?}", other),
                }
                assert_eq!(stmt.else_body.map(<[_]>::len), Some(1));
            }
            other => panic!("expected an if, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_if_condition_from_attribute_island() {
    let source = in_function("[IF {i1:(> n 0)}] [R 1] [/IF {i1}]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::If(stmt) => assert!(matches!(stmt.condition, Expr::Binary(b) if b.op == BinaryOp::Gt)),
            other => panic!("expected an if, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_second_else_is_reported() {
    let source = in_function("[IF {i1} c] [R 1] [ELSE] [R 2] [ELSE] [R 3] [/IF {i1}]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![1002]);
        assert!(matches!(&body(program)[0], Stmt::If(_)));
    });
}

#[test]
fn test_parse_for_loop_defaults_step() {
    let source = in_function("[FOR {l1:i:0:10}] [CALL {print} i] [/FOR {l1}]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::For(stmt) => {
                assert_eq!(stmt.var, "i");
                assert_eq!(int_value(stmt.start), Some(0));
                assert_eq!(int_value(stmt.end), Some(10));
                assert_eq!(int_value(stmt.step), Some(1));
                assert_eq!(stmt.body.len(), 1);
            }
            other => panic!("expected a for loop, got {:?}", other),
        }
    });
}

#[rstest]
#[case("[FOR {l1:i:10:0:-1}] [/FOR {l1}]", Some(-1))]
#[case("[FOR {l1:i:0:10:2}] [/FOR {l1}]", Some(2))]
#[case("[FOR {l1:i:0:10:stride}] [/FOR {l1}]", None)]
fn test_parse_for_loop_explicit_step(#[case] stmt: &str, #[case] step: Option<i64>) {
    parse(&in_function(stmt), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::For(stmt) => {
                assert_eq!(int_value(stmt.step), step);
                if step.is_none() {
                    assert_eq!(ref_path(stmt.step), Some("stride"));
                }
            }
            other => panic!("expected a for loop, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_for_bound_island() {
    let source = in_function("[FOR {l1:i:0:(len items)}] [/FOR {l1}]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::For(stmt) => match stmt.end {
                Expr::Operation(op) => {
                    assert_eq!(op.name, "len");
                    assert_eq!(op.family, OperatorFamily::Collection);
                    assert_eq!(ref_path(&op.args[0]), Some("items"));
                }
                other => panic!("expected a len operation, got {:?}", other),
            },
            other => panic!("expected a for loop, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_malformed_island_degrades_to_reference() {
    let source = in_function("[FOR {l1:i:0:(+ n)}] [/FOR {l1}]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![3004]);
        match &body(program)[0] {
            Stmt::For(stmt) => assert_eq!(ref_path(stmt.end), Some("(+ n)")),
            other => panic!("expected a for loop, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_for_missing_bounds() {
    let source = in_function("[FOR {l1:i}] [/FOR {l1}]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![2001, 2001]);
        match &body(program)[0] {
            Stmt::For(stmt) => {
                assert!(matches!(stmt.start, Expr::Missing(_)));
                assert!(matches!(stmt.end, Expr::Missing(_)));
                assert_eq!(int_value(stmt.step), Some(1));
            }
            other => panic!("expected a for loop, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_while_with_labelled_jumps() {
    let source = in_function(
        "[WHILE {w1:label=outer} true] [BREAK {outer}] [CONTINUE] [/WHILE {w1}]",
    );
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::While(stmt) => {
                assert_eq!(stmt.label, Some("outer"));
                assert!(matches!(
                    stmt.condition,
                    Expr::Literal(Literal { kind: LiteralKind::Bool(true), .. })
                ));
                assert!(matches!(&stmt.body[0], Stmt::Break(JumpStmt { label: Some("outer"), .. })));
                assert!(matches!(&stmt.body[1], Stmt::Continue(JumpStmt { label: None, .. })));
            }
            other => panic!("expected a while loop, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_do_while_condition_on_close() {
    let source = in_function("[DO {d1}] [A {i:+} 1] [/DO {d1} (< i 10)]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::DoWhile(stmt) => {
                assert_eq!(stmt.id, "d1");
                assert_eq!(stmt.body.len(), 1);
                assert!(matches!(stmt.condition, Expr::Binary(b) if b.op == BinaryOp::Lt));
            }
            other => panic!("expected a do-while, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_foreach() {
    let source = in_function("[EACH {e1:item:items:str}] [CALL {print} item] [/EACH {e1}]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::ForEach(stmt) => {
                assert_eq!(stmt.var, "item");
                assert_eq!(stmt.var_type.copied(), Some(TypeRef::STR));
                assert_eq!(ref_path(stmt.collection), Some("items"));
            }
            other => panic!("expected a foreach, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_foreach_collection_from_payload() {
    parse(&in_function("[EACH {e1:item} items] [/EACH {e1}]"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::ForEach(stmt) => {
                assert_eq!(stmt.var, "item");
                assert_eq!(stmt.var_type, None);
                assert_eq!(ref_path(stmt.collection), Some("items"));
            }
            other => panic!("expected a foreach, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_foreach_missing_collection_reports_once() {
    parse(&in_function("[EACH {e1:item}] [/EACH {e1}]"), |program, diags| {
        assert_eq!(codes(diags), vec![1006]);
        assert!(matches!(body(program)[0], Stmt::ForEach(_)));
    });
}

#[test]
fn test_parse_match_statement_patterns() {
    let source = in_function(
        "\
[MATCH {m1} shape]
[CASE (is Circle c)] [R 1]
[CASE (.. 1 5) (> n 2)] [R 2]
[CASE (Some v)] [R 3]
[CASE _] [R 4]
[DEFAULT] [R 0]
[/MATCH {m1}]",
    );
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let stmt = match &body(program)[0] {
            Stmt::Match(stmt) => stmt,
            other => panic!("expected a match, got {:?}", other),
        };
        assert_eq!(ref_path(stmt.scrutinee), Some("shape"));
        assert_eq!(stmt.cases.len(), 4);
        assert!(matches!(
            stmt.cases[0].pattern,
            Pattern::Type { ty: TypeRef::Named("Circle"), binding: Some("c"), .. }
        ));
        match stmt.cases[1].pattern {
            Pattern::Range { low, high, .. } => {
                assert_eq!(low.kind, LiteralKind::Integer(1));
                assert_eq!(high.kind, LiteralKind::Integer(5));
            }
            other => panic!("expected a range, got {:?}", other),
        }
        assert!(stmt.cases[1].guard.is_some());
        assert!(matches!(
            stmt.cases[2].pattern,
            Pattern::Variant { name: "Some", fields: [Pattern::Binding { name: "v", .. }], .. }
        ));
        assert!(matches!(stmt.cases[3].pattern, Pattern::Wildcard(_)));
        assert_eq!(stmt.default.map(<[_]>::len), Some(1));
    });
}

#[test]
fn test_parse_match_statement_before_first_case() {
    let source = in_function("[MATCH {m1} x] (call log 1) [CASE 1] [R 1] [/MATCH {m1}]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![1002]);
        match &body(program)[0] {
            Stmt::Match(stmt) => assert_eq!(stmt.cases.len(), 1),
            other => panic!("expected a match, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_try_catch_finally() {
    let source = in_function(
        "\
[TRY {t1}]
  [CALL {risky}]
[CATCH {IOError:e}]
  [R 1]
[CATCH]
  [R 2]
[FINALLY]
  [CALL {cleanup}]
[/TRY {t1}]",
    );
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Try(stmt) => {
                assert_eq!(stmt.body.len(), 1);
                assert_eq!(stmt.catches.len(), 2);
                assert_eq!(stmt.catches[0].exception_type.copied(), Some(TypeRef::Named("IOError")));
                assert_eq!(stmt.catches[0].variable, Some("e"));
                // A bare CATCH takes every exception and binds nothing.
                assert_eq!(stmt.catches[1].exception_type, None);
                assert_eq!(stmt.catches[1].variable, None);
                assert_eq!(stmt.finally.map(<[_]>::len), Some(1));
            }
            other => panic!("expected a try, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_try_id_mismatch_keeps_open_id() {
    let source = in_function("[TRY {t1}]\n  [CALL {io.read!}]\n[CATCH {IOError:e}]\n  [R]\n[/TRY {t2}]");
    parse(&source, |program, diags| {
        assert_eq!(diags.len(), 1);
        let diagnostic = &diags.diagnostics()[0];
        assert_eq!(diagnostic.code, 1004);
        assert!(diagnostic.message_text.contains("t1"));
        assert!(diagnostic.message_text.contains("t2"));
        let mismatch = diagnostic.id_mismatch.as_ref().expect("mismatch details");
        assert_eq!((mismatch.open_id.as_str(), mismatch.close_id.as_str()), ("t1", "t2"));
        assert_eq!(mismatch.open_tag, "TRY");

        match &body(program)[0] {
            Stmt::Try(stmt) => {
                assert_eq!(stmt.id, "t1");
                assert_eq!(stmt.catches.len(), 1);
            }
            other => panic!("expected a try, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_using() {
    let source = in_function("[USING {u1:f:File} (call open \"a.txt\")] [CALL {f.read}] [/USING {u1}]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Using(stmt) => {
                assert_eq!(stmt.name, "f");
                assert_eq!(stmt.ty.copied(), Some(TypeRef::Named("File")));
                assert!(matches!(stmt.resource, Expr::Call(call) if call.target == "open"));
                assert_eq!(stmt.body.len(), 1);
            }
            other => panic!("expected a using, got {:?}", other),
        }
    });
}

// ============================================================================
// Prefix expressions
// ============================================================================

#[rstest]
#[case("(+ 1 2 3)", BinaryOp::Add)]
#[case("(* 1 2 3)", BinaryOp::Mul)]
#[case("(and 1 2 3)", BinaryOp::And)]
#[case("(mod 1 2 3)", BinaryOp::Rem)]
fn test_parse_variadic_binary_folds_left(#[case] form: &str, #[case] op: BinaryOp) {
    parse(&returning(form), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Binary(outer) => {
                assert_eq!(outer.op, op);
                assert_eq!(int_value(outer.right), Some(3));
                match outer.left {
                    Expr::Binary(inner) => {
                        assert_eq!(inner.op, op);
                        assert_eq!(int_value(inner.left), Some(1));
                        assert_eq!(int_value(inner.right), Some(2));
                    }
                    other => panic!("expected a nested binary, got {:?}", other),
                }
            }
            other => panic!("expected a binary, got {:?}", other),
        }
    });
}

#[rstest]
#[case("(- x)", UnaryOp::Neg)]
#[case("(! x)", UnaryOp::Not)]
#[case("(not x)", UnaryOp::Not)]
#[case("(~ x)", UnaryOp::BitNot)]
#[case("(++ x)", UnaryOp::PreIncrement)]
#[case("(-- x)", UnaryOp::PreDecrement)]
fn test_parse_unary_forms(#[case] form: &str, #[case] op: UnaryOp) {
    parse(&returning(form), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Unary(unary) => {
                assert_eq!(unary.op, op);
                assert_eq!(ref_path(unary.operand), Some("x"));
            }
            other => panic!("expected a unary, got {:?}", other),
        }
    });
}

#[rstest]
#[case("(?? a b)", BinaryOp::Coalesce)]
#[case("(-> p q)", BinaryOp::Implies)]
#[case("(- a b)", BinaryOp::Sub)]
#[case("(ge a b)", BinaryOp::Ge)]
fn test_parse_two_argument_forms(#[case] form: &str, #[case] op: BinaryOp) {
    parse(&returning(form), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        assert!(matches!(returned(program), Expr::Binary(b) if b.op == op));
    });
}

#[test]
fn test_parse_conditional() {
    parse(&returning("(? c 1 2)"), |program, diags| {
        assert!(diags.is_empty());
        match returned(program) {
            Expr::Conditional(cond) => {
                assert_eq!(ref_path(cond.condition), Some("c"));
                assert_eq!(int_value(cond.then_branch), Some(1));
                assert_eq!(int_value(cond.else_branch), Some(2));
            }
            other => panic!("expected a conditional, got {:?}", other),
        }
    });
}

#[rstest]
#[case("(? c 1)")]
#[case("(! a b)")]
#[case("(+ a)")]
#[case("(?? a)")]
#[case("(str-len)")]
fn test_parse_wrong_arity_reports_once(#[case] form: &str) {
    parse(&returning(form), |program, diags| {
        assert_eq!(codes(diags), vec![3004], "{}", form);
        assert_eq!(body(program).len(), 1);
    });
}

#[test]
fn test_parse_missing_conditional_branch_is_placeholder() {
    parse(&returning("(? c 1)"), |program, _| match returned(program) {
        Expr::Conditional(cond) => assert!(matches!(cond.else_branch, Expr::Missing(_))),
        other => panic!("expected a conditional, got {:?}", other),
    });
}

#[test]
fn test_parse_quantifier_bindings() {
    parse(&returning("(exists ((x i32) (s str)) (== x 1))"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Quantifier(q) => {
                assert_eq!(q.kind, QuantifierKind::Exists);
                let bindings: Vec<_> = q.bindings.iter().map(|b| (b.name, *b.ty, b.synthetic)).collect();
                assert_eq!(bindings, vec![("x", I32, false), ("s", TypeRef::STR, false)]);
                assert!(matches!(q.body, Expr::Binary(b) if b.op == BinaryOp::Eq));
            }
            other => panic!("expected a quantifier, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_empty_quantifier_gets_synthetic_binding() {
    parse(&returning("(forall () body)"), |program, diags| {
        assert_eq!(codes(diags), vec![1005]);
        match returned(program) {
            Expr::Quantifier(q) => {
                assert_eq!(q.kind, QuantifierKind::ForAll);
                assert_eq!(q.bindings.len(), 1);
                assert!(q.bindings[0].synthetic);
                assert_eq!(ref_path(q.body), Some("body"));
            }
            other => panic!("expected a quantifier, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_quantifier_without_binding_list() {
    parse(&returning("(forall x true)"), |program, diags| {
        assert_eq!(codes(diags), vec![1005]);
        match returned(program) {
            Expr::Quantifier(q) => {
                assert_eq!(q.bindings.len(), 1);
                assert!(q.bindings[0].synthetic);
                assert!(matches!(q.body, Expr::Literal(_)));
            }
            other => panic!("expected a quantifier, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_type_operations() {
    let cases: [(&str, TypeOpKind, &str, bool); 4] = [
        ("(typeof Circle)", TypeOpKind::TypeOf, "Circle", false),
        ("(is shape Circle)", TypeOpKind::Is, "Circle", true),
        ("(as shape ?Circle)", TypeOpKind::As, "?Circle", true),
        ("(cast int n)", TypeOpKind::Cast, "i32", true),
    ];
    for (form, kind, ty, has_operand) in cases {
        parse(&returning(form), |program, diags| {
            assert!(diags.is_empty(), "{}: {:?}", form, diags.diagnostics());
            match returned(program) {
                Expr::TypeOp(op) => {
                    assert_eq!(op.op, kind);
                    assert_eq!(op.ty.to_string(), ty);
                    assert_eq!(op.operand.is_some(), has_operand);
                }
                other => panic!("expected a type operation, got {:?}", other),
            }
        });
    }
}

#[test]
fn test_parse_new_with_nested_generics() {
    parse(&returning("(new Map<str, List<i32>>)"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::New(new) => {
                assert_eq!(new.ty.to_string(), "Map<str,List<i32>>");
                assert!(new.args.is_empty());
            }
            other => panic!("expected a new, got {:?}", other),
        }
    });
    parse(&returning("(new Point 1 2)"), |program, _| {
        assert!(matches!(returned(program), Expr::New(new) if new.args.len() == 2));
    });
}

#[test]
fn test_parse_call_and_await() {
    parse(&returning("(await (call io.read! path))"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Await(awaited) => match awaited.operand {
                Expr::Call(call) => {
                    assert_eq!(call.target, "io.read");
                    assert!(call.fallible);
                    assert_eq!(call.args.len(), 1);
                }
                other => panic!("expected a call, got {:?}", other),
            },
            other => panic!("expected an await, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_match_expression() {
    let form = "(match x (case 0 \"zero\") (when n (> n 0) \"pos\") (default \"neg\"))";
    parse(&returning(form), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Match(m) => {
                assert_eq!(m.arms.len(), 3);
                assert!(matches!(
                    m.arms[0].pattern,
                    Pattern::Literal(Literal { kind: LiteralKind::Integer(0), .. })
                ));
                assert!(m.arms[1].guard.is_some());
                assert!(m.arms[2].is_default);
            }
            other => panic!("expected a match, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_match_expression_skips_unknown_arm() {
    parse(&returning("(match x (oops 1) (default 2))"), |program, diags| {
        assert_eq!(codes(diags), vec![1002]);
        assert!(matches!(returned(program), Expr::Match(m) if m.arms.len() == 1));
    });
}

#[test]
fn test_parse_inline_lambdas() {
    parse(&returning("(call map xs ((x:i32) => (* x 2)))"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        let call = match returned(program) {
            Expr::Call(call) => call,
            other => panic!("expected a call, got {:?}", other),
        };
        match &call.args[1] {
            Expr::Lambda(lambda) => {
                assert_eq!(lambda.id, None);
                assert_eq!(lambda.params[0].name, "x");
                assert_eq!(*lambda.params[0].ty, I32);
                assert!(matches!(lambda.body, LambdaBody::Expr(Expr::Binary(_))));
            }
            other => panic!("expected a lambda, got {:?}", other),
        }
    });
    parse(&returning("((a b) => (+ a b))"), |program, diags| {
        assert!(diags.is_empty());
        assert!(matches!(returned(program), Expr::Lambda(l) if l.params.len() == 2));
    });
    // A doubled paren without `=>` is just grouping.
    parse(&returning("((+ 1 2))"), |program, diags| {
        assert!(diags.is_empty());
        assert!(matches!(returned(program), Expr::Binary(_)));
    });
}

#[test]
fn test_parse_lambda_tag() {
    let source = in_function("[B {double} [LAMBDA {l1}] [IN {x:i32}] [OUT {i32}] [R (* x 2)] [/LAMBDA {l1}]]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Bind(BindStmt { value: Some(Expr::Lambda(lambda)), .. }) => {
                assert_eq!(lambda.id, Some("l1"));
                assert_eq!(lambda.params.len(), 1);
                assert_eq!(lambda.output.copied(), Some(I32));
                assert!(matches!(lambda.body, LambdaBody::Block(stmts) if stmts.len() == 1));
            }
            other => panic!("expected a lambda binding, got {:?}", other),
        }
    });
}

// ============================================================================
// Operator families
// ============================================================================

#[test]
fn test_parse_string_operation_with_mode() {
    parse(&returning("(contains name \"x\" :ignore-case)"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Operation(op) => {
                assert_eq!(op.family, OperatorFamily::String);
                assert_eq!(op.name, "contains");
                assert_eq!(op.args.len(), 2);
                assert_eq!(op.comparison, Some(ComparisonMode::IgnoreCase));
            }
            other => panic!("expected an operation, got {:?}", other),
        }
    });
}

#[rstest]
#[case("(upper s :ordinal)", 2007)]
#[case("(contains a b :fuzzy)", 2006)]
#[case("(char \"ab\")", 2004)]
#[case("(char \"\")", 2004)]
fn test_parse_family_validation(#[case] form: &str, #[case] code: u32) {
    parse(&returning(form), |_, diags| assert_eq!(codes(diags), vec![code]));
}

#[test]
fn test_parse_char_constructor() {
    parse(&returning("(char \"a\")"), |program, diags| {
        assert!(diags.is_empty());
        assert!(matches!(
            returned(program),
            Expr::Literal(Literal { kind: LiteralKind::Char('a'), .. })
        ));
    });
}

#[test]
fn test_parse_substring_forms() {
    parse(&returning("(substr s 1)"), |program, diags| {
        assert!(diags.is_empty());
        assert!(matches!(returned(program), Expr::Substring(s) if s.length.is_none()));
    });
    parse(&returning("(substr s 1 2)"), |program, diags| {
        assert!(diags.is_empty());
        match returned(program) {
            Expr::Substring(s) => {
                assert_eq!(ref_path(s.source), Some("s"));
                assert_eq!(int_value(s.start), Some(1));
                assert_eq!(s.length.and_then(int_value), Some(2));
            }
            other => panic!("expected a substring, got {:?}", other),
        }
    });
}

#[rstest]
#[case("(char-at s 0)", OperatorFamily::Char, "char-at")]
#[case("(sb-new)", OperatorFamily::StringBuilder, "sb-new")]
#[case("(nameof x)", OperatorFamily::Type, "nameof")]
#[case("(range 0 10 2)", OperatorFamily::Collection, "range")]
fn test_parse_family_operations(#[case] form: &str, #[case] family: OperatorFamily, #[case] name: &str) {
    parse(&returning(form), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        assert!(matches!(returned(program), Expr::Operation(op) if op.family == family && op.name == name));
    });
}

#[test]
fn test_parse_type_argument_operations() {
    parse(&returning("(default List<i32>)"), |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match returned(program) {
            Expr::Operation(op) => {
                assert_eq!(op.name, "default");
                assert!(op.args.is_empty());
                assert_eq!(op.type_arg.map(|t| t.to_string()), Some("List<i32>".to_string()));
            }
            other => panic!("expected an operation, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_extra_closing_angle_is_reported_once() {
    let source = in_function("[R (cast List<i32>> x)]\n[R (default Map<str, List<i32>>)]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![1010]);
        match &body(program)[1] {
            Stmt::Return(ReturnStmt { value: Some(Expr::Operation(op)), .. }) => {
                assert_eq!(op.type_arg.map(|t| t.to_string()), Some("Map<str,List<i32>>".to_string()));
            }
            other => panic!("expected a return of an operation, got {:?}", other),
        }
    });
}

// ============================================================================
// Suggestions
// ============================================================================

#[rstest]
#[case("(concatt a b)", 3002)]
#[case("(Console.WriteLine a)", 3001)]
#[case("(strlen a)", 3001)]
#[case("(zzzzqqq a)", 3003)]
fn test_parse_unknown_operator_reports_once(#[case] form: &str, #[case] code: u32) {
    parse(&returning(form), |program, diags| {
        assert_eq!(codes(diags), vec![code]);
        // The form stands for its first argument.
        assert_eq!(ref_path(returned(program)), Some("a"));
    });
}

#[test]
fn test_parse_unknown_operator_without_arguments_is_zero() {
    parse(&returning("(zzzzqqq)"), |program, diags| {
        assert_eq!(codes(diags), vec![3003]);
        assert_eq!(int_value(returned(program)), Some(0));
    });
}

#[test]
fn test_parse_operator_typo_carries_fix() {
    parse(&returning("(concatt a b)"), |_, diags| {
        let fix = diags.diagnostics()[0].fix.as_ref().expect("fix");
        assert_eq!(fix.replacement, "concat");
        assert_eq!(fix.start, LineAndColumn::new(1, 4));
        assert_eq!(fix.end, LineAndColumn::new(1, 11));
    });

    let options = ParserOptions {
        suggest_fixes: false,
        ..ParserOptions::default()
    };
    parse_with_options(&returning("(concatt a b)"), options, |_, diags| {
        assert_eq!(codes(diags), vec![3002]);
        assert!(diags.diagnostics()[0].fix.is_none());
    });
}

#[test]
fn test_parse_valid_operator_never_suggests() {
    parse(&returning("(concat a b)"), |program, diags| {
        assert!(diags.is_empty());
        assert!(matches!(returned(program), Expr::Operation(op) if op.name == "concat"));
    });
}

#[test]
fn test_parse_tag_typo_is_parsed_as_candidate() {
    let source = in_function("[WHLE {w1} (< i 10)] [A {i:+} 1] [/WHILE {w1}]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![4001]);
        let fix = diags.diagnostics()[0].fix.as_ref().expect("fix");
        assert_eq!(fix.replacement, "WHILE");
        assert!(matches!(&body(program)[0], Stmt::While(w) if w.body.len() == 1));
    });
}

#[test]
fn test_parse_expanded_tag_names_resolve() {
    let source = "[FUNCTION {f1:Add}] [R 1] [/FUNCTION {f1}]";
    parse(source, |program, diags| {
        // Open and close are both reported, and both read as `F`.
        assert_eq!(codes(diags), vec![4001, 4001]);
        assert_eq!(program.functions.len(), 1);
        assert_eq!(program.functions[0].name, "Add");
    });
}

#[test]
fn test_parse_unknown_tag_is_skipped() {
    let source = in_function("[ZZZZZZZZ {x:y} junk] [R 1]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![4002]);
        assert!(diags.diagnostics()[0].message_text.contains("scopes:"));
        assert_eq!(body(program).len(), 1);
    });
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_parse_array_literal() {
    let source = in_function("[B {xs:[i32]} [ARR {a1:i32:3} 1 2 3] [/ARR {a1}]]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Bind(BindStmt { ty: Some(ty), value: Some(Expr::Collection(arr)), .. }) => {
                assert_eq!(ty.to_string(), "[i32]");
                assert_eq!(arr.kind, CollectionKind::Array);
                assert_eq!(arr.id, "a1");
                assert_eq!(arr.element_type.copied(), Some(I32));
                assert_eq!(arr.size.and_then(int_value), Some(3));
                let values: Vec<_> = arr.elements.iter().filter_map(int_value).collect();
                assert_eq!(values, vec![1, 2, 3]);
            }
            other => panic!("expected an array binding, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_array_size_island() {
    let source = in_function("[B {xs} [ARR {a1:i32:(* n 2)}] [/ARR {a1}]]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Bind(BindStmt { value: Some(Expr::Collection(arr)), .. }) => {
                assert!(matches!(arr.size, Some(Expr::Binary(b)) if b.op == BinaryOp::Mul));
            }
            other => panic!("expected an array binding, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_list_elements_before_close() {
    let source = in_function("[B {names} [LIST {l1:str}] \"a\" \"b\" [/LIST {l1}]]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Bind(BindStmt { value: Some(Expr::Collection(list)), .. }) => {
                assert_eq!(list.kind, CollectionKind::List);
                assert_eq!(list.elements.len(), 2);
            }
            other => panic!("expected a list binding, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_dict_entries() {
    let source = in_function("[B {ages} [DICT {d1:str:i32} \"a\" 1 \"b\" 2] [/DICT {d1}]]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        match &body(program)[0] {
            Stmt::Bind(BindStmt { value: Some(Expr::Collection(dict)), .. }) => {
                assert_eq!(dict.kind, CollectionKind::Dict);
                assert_eq!(dict.element_type.copied(), Some(TypeRef::STR));
                assert_eq!(dict.value_type.copied(), Some(I32));
                assert_eq!(dict.entries.len(), 2);
                assert_eq!(int_value(dict.entries[1].value), Some(2));
                assert!(dict.elements.is_empty());
            }
            other => panic!("expected a dict binding, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_dict_key_without_value() {
    let source = in_function("[B {ages} [DICT {d1:str:i32} \"a\"] [/DICT {d1}]]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![1006]);
        match &body(program)[0] {
            Stmt::Bind(BindStmt { value: Some(Expr::Collection(dict)), .. }) => {
                assert!(matches!(dict.entries[0].value, Expr::Missing(_)));
            }
            other => panic!("expected a dict binding, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_set_literal() {
    let source = in_function("[B {seen} [SETOF {s1:i32} 1 2] [/SETOF {s1}]]");
    parse(&source, |program, diags| {
        assert!(diags.is_empty(), "{:?}", diags.diagnostics());
        assert!(matches!(
            &body(program)[0],
            Stmt::Bind(BindStmt { value: Some(Expr::Collection(set)), .. }) if set.kind == CollectionKind::Set
        ));
    });
}

// ============================================================================
// Recovery
// ============================================================================

#[test]
fn test_parse_missing_close_tag() {
    let source = in_function("[IF {i1} c] [R 1]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![1003]);
        assert!(diags.diagnostics()[0].message_text.contains("i1"));
        // The function still closes normally.
        assert_eq!(program.functions.len(), 1);
        match &body(program)[0] {
            Stmt::If(stmt) => assert_eq!(stmt.then_body.len(), 1),
            other => panic!("expected an if, got {:?}", other),
        }
    });
}

#[test]
fn test_parse_missing_close_at_end_of_input() {
    parse("[F {f1:Open}] [R 1]", |program, diags| {
        assert_eq!(codes(diags), vec![1003]);
        assert_eq!(program.functions.len(), 1);
        assert_eq!(body(program).len(), 1);
    });
}

#[test]
fn test_parse_junk_in_body_makes_progress() {
    let source = in_function("hello 42 world [R 1] ] [B {x} 1]");
    parse(&source, |program, diags| {
        assert_eq!(codes(diags), vec![1007, 1007]);
        assert_eq!(body(program).len(), 2);
    });
}

#[rstest]
#[case("[FLD {x:i32}] [R 1]", "in a body")]
#[case("[ELSE] [R 1]", "outside IF")]
#[case("[CATCH] [R 1]", "outside TRY")]
fn test_parse_tag_out_of_place(#[case] stmts: &str, #[case] context: &str) {
    parse(&in_function(stmts), |program, diags| {
        assert_eq!(codes(diags), vec![4003]);
        assert!(diags.diagnostics()[0].message_text.contains(context));
        assert_eq!(body(program).len(), 1);
    });
}

#[test]
fn test_parse_missing_expression_is_placeholder() {
    parse(&in_function("[A {x}]"), |program, diags| {
        assert_eq!(codes(diags), vec![1006]);
        assert!(matches!(&body(program)[0], Stmt::Assign(a) if matches!(a.value, Expr::Missing(_))));
    });
}

#[test]
fn test_parse_statement_in_class_is_rejected() {
    parse("[C {c1:P}] [R 1] [FLD {x:i32}] [/C {c1}]", |program, diags| {
        assert_eq!(codes(diags), vec![4003]);
        match &program.types[0] {
            TypeDecl::Class(class) => assert_eq!(class.members.len(), 1),
            other => panic!("expected a class, got {:?}", other),
        }
    });
}

// ============================================================================
// Properties
// ============================================================================

fn try_source(open: &str, close: &str) -> String {
    in_function(&format!("[TRY {{{}}}] [R 1] [/TRY {{{}}}]", open, close))
}

/// Mismatch count and the id kept on the try node.
fn try_ids(source: &str) -> (usize, String) {
    parse(source, |program, diags| {
        let id = match &body(program)[0] {
            Stmt::Try(stmt) => stmt.id.to_string(),
            other => panic!("expected a try, got {:?}", other),
        };
        (diags.with_code(1004).count(), id)
    })
}

fn token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "[", "]", "{", "}", "(", ")", ":", "/", "F", "IF", "R", "TRY", "CATCH", "ARR", "f1",
            "x", "1", "+", "forall", "\"s\"", ">>", "<", "=>", "..",
        ]),
        0..48,
    )
    .prop_map(|parts| parts.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_matching_ids_never_mismatch(id in "[a-z][a-z0-9]{0,6}") {
        let (mismatches, kept) = try_ids(&try_source(&id, &id));
        prop_assert_eq!(mismatches, 0);
        prop_assert_eq!(kept, id);
    }

    #[test]
    fn prop_differing_ids_mismatch_once(
        open in "[a-z][a-z0-9]{0,6}",
        close in "[a-z][a-z0-9]{0,6}",
    ) {
        prop_assume!(open != close);
        let (mismatches, kept) = try_ids(&try_source(&open, &close));
        prop_assert_eq!(mismatches, 1);
        prop_assert_eq!(kept, open);
    }

    #[test]
    fn prop_any_token_soup_terminates(source in token_soup()) {
        let end = parse(&source, |program, _| program.span.range.end as usize);
        prop_assert!(end <= source.len());
    }
}

//! AST node definitions for the Tessera front end.
//!
//! Nodes live in a bump arena and reference their children through `&'a`
//! references and slices. Every node records the span from its first to its
//! last consumed token.

use crate::types::*;
use tessera_core::text::Span;

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Program
// ============================================================================

/// The root of a parsed file, children grouped by category in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<'a> {
    pub span: Span,
    pub module: Option<ModuleHeader<'a>>,
    pub imports: NodeList<'a, ImportDecl<'a>>,
    pub types: NodeList<'a, TypeDecl<'a>>,
    pub functions: NodeList<'a, FunctionDecl<'a>>,
    pub metadata: NodeList<'a, MetadataRecord<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl<'a> {
    pub path: &'a str,
    pub alias: Option<&'a str>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub span: Span,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDecl<'a> {
    Class(ClassDecl<'a>),
    Interface(InterfaceDecl<'a>),
    Enum(EnumDecl<'a>),
    EnumExtension(EnumExtensionDecl<'a>),
    Delegate(DelegateDecl<'a>),
}

impl<'a> TypeDecl<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            TypeDecl::Class(c) => c.name,
            TypeDecl::Interface(i) => i.name,
            TypeDecl::Enum(e) => e.name,
            TypeDecl::EnumExtension(x) => x.target,
            TypeDecl::Delegate(d) => d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeDecl::Class(c) => c.span,
            TypeDecl::Interface(i) => i.span,
            TypeDecl::Enum(e) => e.span,
            TypeDecl::EnumExtension(x) => x.span,
            TypeDecl::Delegate(d) => d.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Method,
    Constructor,
}

/// Behavioral annotations attached to a function or method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contract<'a> {
    pub effects: NodeList<'a, Effect<'a>>,
    pub semantics: NodeList<'a, &'a str>,
    pub dependencies: Option<Dependencies<'a>>,
    pub complexity: Option<Complexity<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub kind: FunctionKind,
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub is_async: bool,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub params: NodeList<'a, Param<'a>>,
    pub output: Option<&'a TypeRef<'a>>,
    pub contract: Contract<'a>,
    /// `None` for signatures declared without a body (interface members).
    pub body: Option<NodeList<'a, Stmt<'a>>>,
    pub doc: Option<&'a str>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param<'a> {
    pub name: &'a str,
    pub ty: &'a TypeRef<'a>,
    pub mutable: bool,
    pub default: Option<&'a Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam<'a> {
    pub name: &'a str,
    pub constraints: NodeList<'a, TypeRef<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub base: Option<&'a str>,
    pub implements: NodeList<'a, &'a str>,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub members: NodeList<'a, ClassMember<'a>>,
    pub doc: Option<&'a str>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember<'a> {
    Field(FieldDecl<'a>),
    Property(PropertyDecl<'a>),
    Method(FunctionDecl<'a>),
    Constructor(FunctionDecl<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl<'a> {
    pub name: &'a str,
    pub ty: &'a TypeRef<'a>,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub mutable: bool,
    pub init: Option<&'a Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub ty: &'a TypeRef<'a>,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub getter: Option<NodeList<'a, Stmt<'a>>>,
    pub setter: Option<NodeList<'a, Stmt<'a>>>,
    pub span: Span,
}

impl PropertyDecl<'_> {
    /// A property declared without accessor bodies.
    pub fn is_auto(&self) -> bool {
        self.getter.is_none() && self.setter.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub extends: NodeList<'a, &'a str>,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub members: NodeList<'a, ClassMember<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub underlying: Option<&'a TypeRef<'a>>,
    pub variants: NodeList<'a, EnumVariant<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant<'a> {
    pub name: &'a str,
    pub value: Option<&'a Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumExtensionDecl<'a> {
    pub id: &'a str,
    pub target: &'a str,
    pub variants: NodeList<'a, EnumVariant<'a>>,
    pub methods: NodeList<'a, FunctionDecl<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelegateDecl<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub type_params: NodeList<'a, TypeParam<'a>>,
    pub params: NodeList<'a, Param<'a>>,
    pub output: Option<&'a TypeRef<'a>>,
    pub span: Span,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    Bind(BindStmt<'a>),
    Assign(AssignStmt<'a>),
    Call(CallStmt<'a>),
    Return(ReturnStmt<'a>),
    If(IfStmt<'a>),
    For(ForStmt<'a>),
    While(WhileStmt<'a>),
    DoWhile(DoWhileStmt<'a>),
    ForEach(ForEachStmt<'a>),
    Match(MatchStmt<'a>),
    Try(TryStmt<'a>),
    Using(UsingStmt<'a>),
    Throw(ThrowStmt<'a>),
    Break(JumpStmt<'a>),
    Continue(JumpStmt<'a>),
    Assert(AssertStmt<'a>),
    Mutation(MutationStmt<'a>),
    Expr(ExprStmt<'a>),
}

impl Stmt<'_> {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Bind(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Call(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::ForEach(s) => s.span,
            Stmt::Match(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Using(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) => s.span,
            Stmt::Assert(s) => s.span,
            Stmt::Mutation(s) => s.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindStmt<'a> {
    pub name: &'a str,
    pub ty: Option<&'a TypeRef<'a>>,
    pub mutable: bool,
    pub value: Option<&'a Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt<'a> {
    pub target: &'a str,
    /// Set for compound assignment (`x += v`).
    pub op: Option<BinaryOp>,
    pub value: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt<'a> {
    pub target: &'a str,
    pub fallible: bool,
    pub result: Option<&'a str>,
    pub args: NodeList<'a, Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt<'a> {
    pub value: Option<&'a Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt<'a> {
    pub id: &'a str,
    pub condition: &'a Expr<'a>,
    pub then_body: NodeList<'a, Stmt<'a>>,
    pub elifs: NodeList<'a, ElifClause<'a>>,
    pub else_body: Option<NodeList<'a, Stmt<'a>>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifClause<'a> {
    pub condition: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

/// `break` or `continue`, optionally naming the loop they leave.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStmt<'a> {
    pub label: Option<&'a str>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
    pub var: &'a str,
    pub start: &'a Expr<'a>,
    /// Exclusive upper bound.
    pub end: &'a Expr<'a>,
    pub step: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
    pub condition: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub condition: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStmt<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
    pub var: &'a str,
    pub var_type: Option<&'a TypeRef<'a>>,
    pub collection: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStmt<'a> {
    pub id: &'a str,
    pub scrutinee: &'a Expr<'a>,
    pub cases: NodeList<'a, CaseClause<'a>>,
    pub default: Option<NodeList<'a, Stmt<'a>>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause<'a> {
    pub pattern: &'a Pattern<'a>,
    pub guard: Option<&'a Expr<'a>>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt<'a> {
    pub id: &'a str,
    pub body: NodeList<'a, Stmt<'a>>,
    pub catches: NodeList<'a, CatchClause<'a>>,
    pub finally: Option<NodeList<'a, Stmt<'a>>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause<'a> {
    pub exception_type: Option<&'a TypeRef<'a>>,
    pub variable: Option<&'a str>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsingStmt<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub ty: Option<&'a TypeRef<'a>>,
    pub resource: &'a Expr<'a>,
    pub body: NodeList<'a, Stmt<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt<'a> {
    pub exception_type: Option<&'a TypeRef<'a>>,
    pub message: Option<&'a str>,
    pub value: Option<&'a Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmt<'a> {
    pub condition: &'a Expr<'a>,
    pub message: Option<&'a str>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Put,
    Remove,
    Insert,
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationStmt<'a> {
    pub kind: MutationKind,
    pub target: &'a str,
    pub args: NodeList<'a, Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt<'a> {
    pub expr: &'a Expr<'a>,
    pub span: Span,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Literal(Literal<'a>),
    Ref(RefExpr<'a>),
    Binary(BinaryExpr<'a>),
    Unary(UnaryExpr<'a>),
    Conditional(ConditionalExpr<'a>),
    Quantifier(QuantifierExpr<'a>),
    TypeOp(TypeOpExpr<'a>),
    Call(CallExpr<'a>),
    New(NewExpr<'a>),
    Await(AwaitExpr<'a>),
    Lambda(LambdaExpr<'a>),
    Match(MatchExpr<'a>),
    Collection(CollectionExpr<'a>),
    Operation(OperationExpr<'a>),
    Substring(SubstringExpr<'a>),
    /// Placeholder synthesized where an expression was required but absent.
    Missing(Span),
}

impl Expr<'_> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Ref(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Conditional(e) => e.span,
            Expr::Quantifier(e) => e.span,
            Expr::TypeOp(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Await(e) => e.span,
            Expr::Lambda(e) => e.span,
            Expr::Match(e) => e.span,
            Expr::Collection(e) => e.span,
            Expr::Operation(e) => e.span,
            Expr::Substring(e) => e.span,
            Expr::Missing(span) => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'a> {
    Integer(i64),
    Float(f64),
    String(&'a str),
    Char(char),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal<'a> {
    pub kind: LiteralKind<'a>,
    pub span: Span,
}

/// A reference to a name, possibly dotted (`self.count`).
#[derive(Debug, Clone, PartialEq)]
pub struct RefExpr<'a> {
    pub path: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Implies,
    Coalesce,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Le,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "->" => BinaryOp::Implies,
            "??" => BinaryOp::Coalesce,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Implies => "->",
            BinaryOp::Coalesce => "??",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr<'a> {
    pub op: BinaryOp,
    pub left: &'a Expr<'a>,
    pub right: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    BitNot,
    Neg,
    PreIncrement,
    PreDecrement,
}

impl UnaryOp {
    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        match symbol {
            "!" => Some(UnaryOp::Not),
            "~" => Some(UnaryOp::BitNot),
            "-" => Some(UnaryOp::Neg),
            "++" => Some(UnaryOp::PreIncrement),
            "--" => Some(UnaryOp::PreDecrement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr<'a> {
    pub op: UnaryOp,
    pub operand: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr<'a> {
    pub condition: &'a Expr<'a>,
    pub then_branch: &'a Expr<'a>,
    pub else_branch: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    ForAll,
    Exists,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantifierBinding<'a> {
    pub name: &'a str,
    pub ty: &'a TypeRef<'a>,
    /// True for the placeholder inserted when no binding was written.
    pub synthetic: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantifierExpr<'a> {
    pub kind: QuantifierKind,
    pub bindings: NodeList<'a, QuantifierBinding<'a>>,
    pub body: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOpKind {
    TypeOf,
    Is,
    As,
    Cast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeOpExpr<'a> {
    pub op: TypeOpKind,
    /// Absent for `typeof`.
    pub operand: Option<&'a Expr<'a>>,
    pub ty: &'a TypeRef<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr<'a> {
    pub target: &'a str,
    pub fallible: bool,
    pub args: NodeList<'a, Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr<'a> {
    pub ty: &'a TypeRef<'a>,
    pub args: NodeList<'a, Expr<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpr<'a> {
    pub operand: &'a Expr<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody<'a> {
    Expr(&'a Expr<'a>),
    Block(NodeList<'a, Stmt<'a>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr<'a> {
    /// Set for the tag form, absent for inline lambdas.
    pub id: Option<&'a str>,
    pub params: NodeList<'a, Param<'a>>,
    pub output: Option<&'a TypeRef<'a>>,
    pub body: LambdaBody<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr<'a> {
    pub scrutinee: &'a Expr<'a>,
    pub arms: NodeList<'a, MatchArm<'a>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchArm<'a> {
    pub pattern: &'a Pattern<'a>,
    pub guard: Option<&'a Expr<'a>>,
    pub body: &'a Expr<'a>,
    pub is_default: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Array,
    List,
    Dict,
    Set,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry<'a> {
    pub key: &'a Expr<'a>,
    pub value: &'a Expr<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionExpr<'a> {
    pub kind: CollectionKind,
    pub id: &'a str,
    pub element_type: Option<&'a TypeRef<'a>>,
    /// Value type of a dictionary literal.
    pub value_type: Option<&'a TypeRef<'a>>,
    /// Declared array size.
    pub size: Option<&'a Expr<'a>>,
    pub elements: NodeList<'a, Expr<'a>>,
    pub entries: NodeList<'a, DictEntry<'a>>,
    pub span: Span,
}

/// Application of an operator from one of the operator families.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationExpr<'a> {
    pub family: OperatorFamily,
    pub name: &'a str,
    pub args: NodeList<'a, Expr<'a>>,
    /// The type operand of `default` and `sizeof`.
    pub type_arg: Option<&'a TypeRef<'a>>,
    pub comparison: Option<ComparisonMode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstringExpr<'a> {
    pub source: &'a Expr<'a>,
    pub start: &'a Expr<'a>,
    /// `None` takes everything from `start` to the end.
    pub length: Option<&'a Expr<'a>>,
    pub span: Span,
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern<'a> {
    Wildcard(Span),
    Literal(Literal<'a>),
    Binding {
        name: &'a str,
        span: Span,
    },
    Type {
        ty: &'a TypeRef<'a>,
        binding: Option<&'a str>,
        span: Span,
    },
    Range {
        low: Literal<'a>,
        high: Literal<'a>,
        span: Span,
    },
    Variant {
        name: &'a str,
        fields: NodeList<'a, Pattern<'a>>,
        span: Span,
    },
}

impl Pattern<'_> {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard(span) => *span,
            Pattern::Literal(lit) => lit.span,
            Pattern::Binding { span, .. }
            | Pattern::Type { span, .. }
            | Pattern::Range { span, .. }
            | Pattern::Variant { span, .. } => *span,
        }
    }
}

//! Typed semantic values carried by AST nodes.
//!
//! These are the results of interpreting positional attributes: visibility,
//! modifier sets, expanded type descriptors, effects, dependency lists and
//! complexity classes.

use std::fmt;

bitflags::bitflags! {
    /// Modifier flags for declarations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u32 {
        const NONE      = 0;
        const STATIC    = 1 << 0;
        const ABSTRACT  = 1 << 1;
        const SEALED    = 1 << 2;
        const VIRTUAL   = 1 << 3;
        const OVERRIDE  = 1 << 4;
        const STRUCT    = 1 << 5;
        const PARTIAL   = 1 << 6;
        const RECORD    = 1 << 7;
        const READONLY  = 1 << 8;
        const CONST     = 1 << 9;
    }
}

impl ModifierFlags {
    /// Map a single modifier keyword. Matching is exact (lowercase).
    pub fn from_keyword(text: &str) -> Option<ModifierFlags> {
        match text {
            "static" => Some(ModifierFlags::STATIC),
            "abstract" => Some(ModifierFlags::ABSTRACT),
            "sealed" => Some(ModifierFlags::SEALED),
            "virtual" => Some(ModifierFlags::VIRTUAL),
            "override" => Some(ModifierFlags::OVERRIDE),
            "struct" => Some(ModifierFlags::STRUCT),
            "partial" => Some(ModifierFlags::PARTIAL),
            "record" => Some(ModifierFlags::RECORD),
            "readonly" => Some(ModifierFlags::READONLY),
            "const" => Some(ModifierFlags::CONST),
            _ => None,
        }
    }
}

/// Declaration visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    Public,
    #[default]
    Private,
    Internal,
}

impl Visibility {
    /// Recognize a visibility keyword, short or long form.
    pub fn from_keyword(text: &str) -> Option<Visibility> {
        match text {
            "pub" | "public" => Some(Visibility::Public),
            "pri" | "private" => Some(Visibility::Private),
            "int" | "internal" => Some(Visibility::Internal),
            _ => None,
        }
    }
}

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Bool,
    Void,
    Never,
    Char,
}

impl Primitive {
    /// Recognize a primitive code or one of its long aliases.
    pub fn from_code(code: &str) -> Option<Primitive> {
        let primitive = match code {
            "i8" | "sbyte" => Primitive::I8,
            "i16" | "short" => Primitive::I16,
            "i32" | "int" => Primitive::I32,
            "i64" | "long" => Primitive::I64,
            "u8" | "byte" => Primitive::U8,
            "u16" | "ushort" => Primitive::U16,
            "u32" | "uint" => Primitive::U32,
            "u64" | "ulong" => Primitive::U64,
            "f32" | "float" => Primitive::F32,
            "f64" | "double" => Primitive::F64,
            "str" | "string" => Primitive::Str,
            "bool" | "boolean" => Primitive::Bool,
            "void" => Primitive::Void,
            "never" => Primitive::Never,
            "char" => Primitive::Char,
            _ => return None,
        };
        Some(primitive)
    }

    /// The canonical code.
    pub fn code(self) -> &'static str {
        match self {
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Str => "str",
            Primitive::Bool => "bool",
            Primitive::Void => "void",
            Primitive::Never => "never",
            Primitive::Char => "char",
        }
    }
}

/// An expanded type descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeRef<'a> {
    Primitive(Primitive),
    /// Any name the expander does not recognize, spelled as written.
    Named(&'a str),
    Generic {
        name: &'a str,
        args: &'a [TypeRef<'a>],
    },
    Array(&'a TypeRef<'a>),
    Option(&'a TypeRef<'a>),
    Result {
        ok: &'a TypeRef<'a>,
        err: &'a TypeRef<'a>,
    },
}

impl TypeRef<'static> {
    pub const STR: TypeRef<'static> = TypeRef::Primitive(Primitive::Str);
}

impl<'a> TypeRef<'a> {
    pub fn is_primitive(&self, primitive: Primitive) -> bool {
        matches!(self, TypeRef::Primitive(p) if *p == primitive)
    }
}

impl fmt::Display for TypeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => write!(f, "{}", p.code()),
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::Generic { name, args } => {
                write!(f, "{}<", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")
            }
            TypeRef::Array(element) => write!(f, "[{}]", element),
            // `?T!E` reads as Result(?T, E), so an optional result needs the long form.
            TypeRef::Option(inner @ TypeRef::Result { .. }) => write!(f, "Option<{}>", inner),
            TypeRef::Option(inner) => write!(f, "?{}", inner),
            TypeRef::Result { ok: ok @ TypeRef::Result { .. }, err } => {
                write!(f, "Result<{},{}>", ok, err)
            }
            TypeRef::Result { ok, err } => write!(f, "{}!{}", ok, err),
        }
    }
}

/// One expanded effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect<'a> {
    pub category: &'a str,
    /// Comma-joined when several codes of one category were given.
    pub value: &'a str,
}

/// A named dependency of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency<'a> {
    pub name: &'a str,
    pub version: Option<&'a str>,
    pub optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dependencies<'a> {
    pub items: &'a [Dependency<'a>],
    /// Set by the `*` and `external` sentinels.
    pub unknown_callers: bool,
}

/// Big-O complexity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityClass<'a> {
    Constant,
    Logarithmic,
    Linear,
    Linearithmic,
    Quadratic,
    Cubic,
    Exponential,
    Factorial,
    Other(&'a str),
}

impl<'a> ComplexityClass<'a> {
    pub fn notation(&self) -> &'a str {
        match self {
            ComplexityClass::Constant => "O(1)",
            ComplexityClass::Logarithmic => "O(log n)",
            ComplexityClass::Linear => "O(n)",
            ComplexityClass::Linearithmic => "O(n log n)",
            ComplexityClass::Quadratic => "O(n^2)",
            ComplexityClass::Cubic => "O(n^3)",
            ComplexityClass::Exponential => "O(2^n)",
            ComplexityClass::Factorial => "O(n!)",
            ComplexityClass::Other(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complexity<'a> {
    pub time: ComplexityClass<'a>,
    pub space: Option<ComplexityClass<'a>>,
}

/// String comparison mode selected by a trailing keyword argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonMode {
    Ordinal,
    IgnoreCase,
    Culture,
    Invariant,
}

impl ComparisonMode {
    pub const KEYWORDS: &'static [&'static str] = &["ordinal", "ignore-case", "culture", "invariant"];

    pub fn from_keyword(text: &str) -> Option<ComparisonMode> {
        match text {
            "ordinal" => Some(ComparisonMode::Ordinal),
            "ignore-case" => Some(ComparisonMode::IgnoreCase),
            "culture" => Some(ComparisonMode::Culture),
            "invariant" => Some(ComparisonMode::Invariant),
            _ => None,
        }
    }
}

/// Named groups of prefix operators sharing an argument-count contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFamily {
    String,
    Char,
    StringBuilder,
    Type,
    Collection,
}

impl OperatorFamily {
    pub fn label(self) -> &'static str {
        match self {
            OperatorFamily::String => "string",
            OperatorFamily::Char => "char",
            OperatorFamily::StringBuilder => "string-builder",
            OperatorFamily::Type => "type",
            OperatorFamily::Collection => "collection",
        }
    }
}

//! The tag catalog: structural tags, their expanded spellings, and the
//! positional attributes each one requires.

use super::distance;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// How a tag participates in the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Opens a scope closed by `[/NAME]`.
    Scope,
    /// A single self-contained tag.
    Line,
    /// A header section of a declaration.
    Section,
    /// Divides the body of an enclosing scope (`ELSE`, `CASE`, `CATCH`).
    Marker,
    /// A scope that stands where an expression is expected.
    Expression,
}

impl TagKind {
    fn label(self) -> &'static str {
        match self {
            TagKind::Scope => "scopes",
            TagKind::Line => "statements",
            TagKind::Section => "sections",
            TagKind::Marker => "markers",
            TagKind::Expression => "expressions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: TagKind,
    /// Names of the leading positions that must be present.
    pub required: &'static [&'static str],
}

const fn tag(
    name: &'static str,
    aliases: &'static [&'static str],
    kind: TagKind,
    required: &'static [&'static str],
) -> TagSpec {
    TagSpec {
        name,
        aliases,
        kind,
        required,
    }
}

use TagKind::*;

const TAG_TABLE: &[TagSpec] = &[
    // Declarations
    tag("M", &["MODULE"], Scope, &["id", "name"]),
    tag("IMPORT", &["USE", "IM"], Line, &["path"]),
    tag("META", &["METADATA"], Line, &["key", "value"]),
    tag("F", &["FUNCTION", "FN"], Scope, &["id", "name"]),
    tag("AF", &["ASYNC", "ASYNC_FUNCTION"], Scope, &["id", "name"]),
    tag("MT", &["METHOD"], Scope, &["id", "name"]),
    tag("AMT", &["ASYNC_METHOD"], Scope, &["id", "name"]),
    tag("CT", &["CTOR", "CONSTRUCTOR"], Scope, &["id"]),
    tag("C", &["CLASS"], Scope, &["id", "name"]),
    tag("I", &["INTERFACE"], Scope, &["id", "name"]),
    tag("PR", &["PROP", "PROPERTY"], Scope, &["id", "name", "type"]),
    tag("GET", &["GETTER"], Scope, &[]),
    tag("SET", &["SETTER"], Scope, &[]),
    tag("FLD", &["FIELD"], Line, &["name", "type"]),
    tag("E", &["ENUM"], Scope, &["id", "name"]),
    tag("EX", &["EXTEND", "ENUM_EXTENSION"], Scope, &["id", "enum"]),
    tag("V", &["VARIANT"], Line, &["name"]),
    tag("DG", &["DELEGATE"], Scope, &["id", "name"]),
    // Sections
    tag("IN", &["INPUT", "PARAM"], Section, &["name", "type"]),
    tag("OUT", &["OUTPUT", "RETURNS"], Section, &["type"]),
    tag("FX", &["EFFECTS"], Section, &[]),
    tag("SEM", &["SEMANTICS"], Section, &[]),
    tag("DEP", &["DEPENDS", "DEPENDENCIES"], Section, &[]),
    tag("CX", &["COMPLEXITY"], Section, &["time"]),
    tag("TP", &["TYPEPARAMS", "GENERICS"], Section, &[]),
    tag("WHERE", &["CONSTRAINTS"], Section, &[]),
    tag("IMPL", &["IMPLEMENTS"], Section, &[]),
    tag("BODY", &[], Scope, &[]),
    // Statements
    tag("B", &["BIND", "LET"], Line, &["name"]),
    tag("A", &["ASSIGN"], Line, &["target"]),
    tag("R", &["RETURN"], Line, &[]),
    tag("CALL", &["INVOKE"], Line, &["target"]),
    tag("IF", &[], Scope, &["id"]),
    tag("ELIF", &["ELSEIF"], Marker, &[]),
    tag("ELSE", &[], Marker, &[]),
    tag("FOR", &["LOOP"], Scope, &["id", "var", "start", "end"]),
    tag("WHILE", &[], Scope, &["id"]),
    tag("DO", &["DOWHILE"], Scope, &["id"]),
    tag("EACH", &["FOREACH"], Scope, &["id", "var"]),
    tag("MATCH", &["SWITCH"], Scope, &["id"]),
    tag("CASE", &[], Marker, &[]),
    tag("DEFAULT", &[], Marker, &[]),
    tag("TRY", &[], Scope, &["id"]),
    tag("CATCH", &[], Marker, &[]),
    tag("FINALLY", &[], Marker, &[]),
    tag("USING", &[], Scope, &["id", "name"]),
    tag("THROW", &["RAISE"], Line, &[]),
    tag("BREAK", &[], Line, &[]),
    tag("CONTINUE", &[], Line, &[]),
    tag("ASSERT", &[], Line, &[]),
    tag("EXPR", &[], Line, &[]),
    tag("ADD", &[], Line, &["target"]),
    tag("PUT", &[], Line, &["target"]),
    tag("REMOVE", &[], Line, &["target"]),
    tag("INSERT", &[], Line, &["target"]),
    tag("CLEAR", &[], Line, &["target"]),
    // Expressions
    tag("LAMBDA", &[], Expression, &["id"]),
    tag("ARR", &["ARRAY"], Expression, &["id"]),
    tag("LIST", &[], Expression, &["id"]),
    tag("DICT", &[], Expression, &["id"]),
    tag("SETOF", &["SET_OF"], Expression, &["id"]),
];

static TAGS: Lazy<FxHashMap<&'static str, &'static TagSpec>> =
    Lazy::new(|| TAG_TABLE.iter().map(|spec| (spec.name, spec)).collect());

static ALIASES: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    TAG_TABLE
        .iter()
        .flat_map(|spec| spec.aliases.iter().map(move |alias| (*alias, spec.name)))
        .collect()
});

pub fn lookup(name: &str) -> Option<&'static TagSpec> {
    TAGS.get(name).copied()
}

/// The tag an expanded spelling stands for (`FUNCTION` → `F`).
pub fn resolve_alias(name: &str) -> Option<&'static str> {
    ALIASES.get(name.to_ascii_uppercase().as_str()).copied()
}

/// The closest valid tag: the alias map first, then the nearest name within
/// `threshold` edits.
pub fn nearest(name: &str, threshold: usize) -> Option<&'static str> {
    resolve_alias(name)
        .or_else(|| distance::nearest(name, TAG_TABLE.iter().map(|spec| spec.name), threshold))
}

/// Valid tags grouped by kind, at most `max_entries` per group.
pub fn listing(max_entries: usize) -> String {
    [Scope, Section, Line, Marker, Expression]
        .iter()
        .map(|kind| {
            let names: Vec<&str> = TAG_TABLE
                .iter()
                .filter(|spec| spec.kind == *kind)
                .map(|spec| spec.name)
                .collect();
            let mut shown = names.iter().take(max_entries).copied().collect::<Vec<_>>().join(" ");
            if names.len() > max_entries {
                shown.push_str(" ...");
            }
            format!("{}: {}", kind.label(), shown)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

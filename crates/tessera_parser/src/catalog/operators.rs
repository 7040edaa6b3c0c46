//! The operator catalog: every operator a prefix form may name, the
//! argument-count contract of the operator families, and hints for constructs
//! borrowed from other languages.

use super::distance;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use tessera_ast::types::OperatorFamily as Family;

/// Argument-count contract of a family operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSpec {
    pub name: &'static str,
    pub family: Family,
    pub min_args: usize,
    /// `None` for variadic operators.
    pub max_args: Option<usize>,
    /// Accepts a trailing `:mode` comparison keyword.
    pub supports_mode: bool,
    /// The single operand is a type name rather than an expression.
    pub takes_type: bool,
}

impl OperatorSpec {
    const fn new(
        name: &'static str,
        family: Family,
        min_args: usize,
        max_args: Option<usize>,
    ) -> Self {
        Self {
            name,
            family,
            min_args,
            max_args,
            supports_mode: false,
            takes_type: false,
        }
    }

    const fn with_mode(mut self) -> Self {
        self.supports_mode = true;
        self
    }

    const fn with_type(mut self) -> Self {
        self.takes_type = true;
        self
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human-readable arity for diagnostics: `2`, `2 to 3`, `2 or more`.
    pub fn arity_text(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{} to {}", self.min_args, max),
            None => format!("{} or more", self.min_args),
        }
    }
}

const FAMILY_TABLE: &[OperatorSpec] = &[
    // String operations
    OperatorSpec::new("concat", Family::String, 2, None),
    OperatorSpec::new("str-len", Family::String, 1, Some(1)),
    OperatorSpec::new("upper", Family::String, 1, Some(1)),
    OperatorSpec::new("lower", Family::String, 1, Some(1)),
    OperatorSpec::new("trim", Family::String, 1, Some(1)),
    OperatorSpec::new("contains", Family::String, 2, Some(2)).with_mode(),
    OperatorSpec::new("starts-with", Family::String, 2, Some(2)).with_mode(),
    OperatorSpec::new("ends-with", Family::String, 2, Some(2)).with_mode(),
    OperatorSpec::new("index-of", Family::String, 2, Some(2)).with_mode(),
    OperatorSpec::new("replace", Family::String, 3, Some(3)).with_mode(),
    OperatorSpec::new("split", Family::String, 2, Some(2)),
    OperatorSpec::new("join", Family::String, 2, Some(2)),
    OperatorSpec::new("str-eq", Family::String, 2, Some(2)).with_mode(),
    OperatorSpec::new("str-cmp", Family::String, 2, Some(2)).with_mode(),
    OperatorSpec::new("substr", Family::String, 2, Some(3)),
    // Char operations
    OperatorSpec::new("char", Family::Char, 1, Some(1)),
    OperatorSpec::new("char-at", Family::Char, 2, Some(2)),
    OperatorSpec::new("char-code", Family::Char, 1, Some(1)),
    OperatorSpec::new("from-code", Family::Char, 1, Some(1)),
    OperatorSpec::new("is-digit", Family::Char, 1, Some(1)),
    OperatorSpec::new("is-letter", Family::Char, 1, Some(1)),
    OperatorSpec::new("is-upper", Family::Char, 1, Some(1)),
    OperatorSpec::new("is-lower", Family::Char, 1, Some(1)),
    OperatorSpec::new("is-whitespace", Family::Char, 1, Some(1)),
    // String-builder operations
    OperatorSpec::new("sb-new", Family::StringBuilder, 0, Some(1)),
    OperatorSpec::new("sb-append", Family::StringBuilder, 2, Some(2)),
    OperatorSpec::new("sb-append-line", Family::StringBuilder, 1, Some(2)),
    OperatorSpec::new("sb-insert", Family::StringBuilder, 3, Some(3)),
    OperatorSpec::new("sb-clear", Family::StringBuilder, 1, Some(1)),
    OperatorSpec::new("sb-to-str", Family::StringBuilder, 1, Some(1)),
    OperatorSpec::new("sb-len", Family::StringBuilder, 1, Some(1)),
    // Type operations
    OperatorSpec::new("default", Family::Type, 1, Some(1)).with_type(),
    OperatorSpec::new("sizeof", Family::Type, 1, Some(1)).with_type(),
    OperatorSpec::new("nameof", Family::Type, 1, Some(1)),
    // Collection operations
    OperatorSpec::new("len", Family::Collection, 1, Some(1)),
    OperatorSpec::new("at", Family::Collection, 2, Some(2)),
    OperatorSpec::new("has", Family::Collection, 2, Some(2)),
    OperatorSpec::new("keys", Family::Collection, 1, Some(1)),
    OperatorSpec::new("values", Family::Collection, 1, Some(1)),
    OperatorSpec::new("first", Family::Collection, 1, Some(1)),
    OperatorSpec::new("last", Family::Collection, 1, Some(1)),
    OperatorSpec::new("range", Family::Collection, 2, Some(3)),
];

/// Operators handled directly by the expression engine, grouped for listings.
const CORE_GROUPS: &[(&str, &[&str])] = &[
    ("arithmetic", &["+", "-", "*", "/", "%"]),
    ("comparison", &["==", "!=", "<", "<=", ">", ">="]),
    ("logical", &["&&", "||", "!", "->"]),
    ("bitwise", &["&", "|", "^", "<<", ">>", "~"]),
    ("update", &["++", "--"]),
    ("conditional", &["?", "??"]),
    ("quantifier", &["forall", "exists"]),
    ("type test", &["typeof", "is", "as", "cast"]),
    ("core", &["call", "new", "await", "match"]),
];

/// Word spellings accepted in operator position.
const WORD_ALIASES: &[(&str, &str)] = &[
    ("and", "&&"),
    ("or", "||"),
    ("not", "!"),
    ("mod", "%"),
    ("eq", "=="),
    ("ne", "!="),
    ("lt", "<"),
    ("le", "<="),
    ("gt", ">"),
    ("ge", ">="),
];

const HINT_TABLE: &[(&str, &str)] = &[
    ("if", "Use '?' for a conditional expression or an [IF] tag for a conditional statement."),
    ("let", "Bind a variable with a [B] tag."),
    ("var", "Bind a variable with a [B] tag; prefix the name with '~' to make it mutable."),
    ("const", "Bind a variable with a [B] tag."),
    ("for", "Loops are statements; use a [FOR] or [EACH] tag."),
    ("while", "Loops are statements; use a [WHILE] tag."),
    ("return", "Return from a function with an [R] tag."),
    ("lambda", "Write an inline lambda as ((params) => body)."),
    ("fn", "Write an inline lambda as ((params) => body)."),
    ("function", "Write an inline lambda as ((params) => body)."),
    ("print", "Output is a call; use (call print ...)."),
    ("println", "Output is a call; use (call println ...)."),
    ("printf", "Format with 'concat' and print with (call print ...)."),
    ("WriteLine", "Output is a call; use (call println ...)."),
    ("log", "Logging is a call; use (call log ...)."),
    ("strlen", "Use 'str-len' for string length."),
    ("length", "Use 'str-len' for strings or 'len' for collections."),
    ("size", "Use 'len' for collection size."),
    ("count", "Use 'len' for collection size."),
    ("equals", "Use '==' or 'str-eq' for string comparison with a mode."),
    ("toUpperCase", "Use 'upper'."),
    ("ToUpper", "Use 'upper'."),
    ("substring", "Use 'substr' with a start and an optional length."),
    ("Substring", "Use 'substr' with a start and an optional length."),
    ("charAt", "Use 'char-at'."),
    ("instanceof", "Use 'is' for a type test."),
    ("append", "Use 'sb-append' for builders or an [ADD] tag for collections."),
    ("push", "Use an [ADD] tag to add to a collection."),
];

static FAMILY_OPERATORS: Lazy<FxHashMap<&'static str, OperatorSpec>> =
    Lazy::new(|| FAMILY_TABLE.iter().map(|spec| (spec.name, *spec)).collect());

static ALL_OPERATORS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    CORE_GROUPS
        .iter()
        .flat_map(|(_, ops)| ops.iter().copied())
        .chain(FAMILY_TABLE.iter().map(|spec| spec.name))
        .collect()
});

static ALIASES: Lazy<FxHashMap<&'static str, &'static str>> =
    Lazy::new(|| WORD_ALIASES.iter().copied().collect());

static HINTS: Lazy<FxHashMap<&'static str, &'static str>> =
    Lazy::new(|| HINT_TABLE.iter().copied().collect());

/// Map a word alias to its symbolic operator.
pub fn normalize(text: &str) -> &str {
    ALIASES.get(text).copied().unwrap_or(text)
}

pub fn is_operator(text: &str) -> bool {
    ALL_OPERATORS.contains(text)
}

pub fn family_operator(text: &str) -> Option<&'static OperatorSpec> {
    FAMILY_OPERATORS.get(text)
}

/// A hint for a construct from another language, matched on the whole text
/// or on the member after its last `.` (`Console.WriteLine`).
pub fn foreign_hint(text: &str) -> Option<&'static str> {
    if let Some(hint) = HINTS.get(text) {
        return Some(*hint);
    }
    let (_, member) = text.rsplit_once('.')?;
    HINTS.get(member).copied()
}

/// The closest valid operator to `text` within `threshold` edits.
pub fn nearest(text: &str, threshold: usize) -> Option<&'static str> {
    distance::nearest(text, ALL_OPERATORS.iter().copied(), threshold)
}

/// Valid operators grouped by category, at most `max_entries` per category.
pub fn listing(max_entries: usize) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = CORE_GROUPS
        .iter()
        .map(|(label, ops)| (*label, ops.to_vec()))
        .collect();
    for family in [
        Family::String,
        Family::Char,
        Family::StringBuilder,
        Family::Type,
        Family::Collection,
    ] {
        let ops = FAMILY_TABLE
            .iter()
            .filter(|spec| spec.family == family)
            .map(|spec| spec.name)
            .collect();
        groups.push((family.label(), ops));
    }
    groups
        .iter()
        .map(|(label, ops)| {
            let mut shown = ops.iter().take(max_entries).copied().collect::<Vec<_>>().join(" ");
            if ops.len() > max_entries {
                shown.push_str(" ...");
            }
            format!("{}: {}", label, shown)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

//! Interpretation of positional attributes into typed values.
//!
//! Every function here is pure: it reads an [`AttributeCollection`] (or a
//! single value) and returns typed data allocated in the arena. Reporting
//! problems is left to the parser.

use crate::attributes::{AttrKind, AttributeCollection};
use bumpalo::Bump;
use tessera_ast::node::BinaryOp;
use tessera_ast::types::*;

const EFFECT_TABLE: &[(&str, &str, &str)] = &[
    ("pure", "purity", "pure"),
    ("io", "io", "console"),
    ("fr", "filesystem", "read"),
    ("fw", "filesystem", "write"),
    ("net", "network", "any"),
    ("http", "network", "http"),
    ("dbr", "database", "read"),
    ("dbw", "database", "write"),
    ("rnd", "nondeterminism", "random"),
    ("time", "nondeterminism", "clock"),
    ("env", "environment", "read"),
    ("mut", "state", "mutates"),
    ("alloc", "memory", "allocates"),
    ("throw", "exception", "throws"),
    ("async", "concurrency", "async"),
];

const SEMANTIC_TABLE: &[(&str, &str)] = &[
    ("idem", "idempotent"),
    ("pure", "no side effects"),
    ("total", "defined for all inputs"),
    ("cmt", "commutative"),
    ("assoc", "associative"),
    ("mono", "monotonic"),
    ("det", "deterministic"),
    ("ts", "thread-safe"),
    ("nothrow", "never throws"),
];

// Normalized spellings, compared after removing whitespace and lowercasing.
const COMPLEXITY_TABLE: &[(&str, ComplexityClass<'static>)] = &[
    ("1", ComplexityClass::Constant),
    ("logn", ComplexityClass::Logarithmic),
    ("n", ComplexityClass::Linear),
    ("nlogn", ComplexityClass::Linearithmic),
    ("n^2", ComplexityClass::Quadratic),
    ("n^3", ComplexityClass::Cubic),
    ("2^n", ComplexityClass::Exponential),
    ("n!", ComplexityClass::Factorial),
];

// ============================================================================
// Per-construct records
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub doc: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamHeader<'a> {
    pub name: &'a str,
    pub mutable: bool,
    pub ty: &'a TypeRef<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub base: Option<&'a str>,
    pub modifiers: ModifierFlags,
    /// `struct` and `abstract` were both given; `abstract` has been dropped.
    pub dropped_abstract: bool,
    pub doc: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub extends: &'a [&'a str],
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
    pub underlying: Option<&'a TypeRef<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldHeader<'a> {
    pub name: &'a str,
    pub mutable: bool,
    pub ty: &'a TypeRef<'a>,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub ty: &'a TypeRef<'a>,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindHeader<'a> {
    pub name: &'a str,
    pub mutable: bool,
    pub ty: Option<&'a TypeRef<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignHeader<'a> {
    pub target: &'a str,
    pub op: Option<BinaryOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallTarget<'a> {
    pub target: &'a str,
    pub fallible: bool,
    pub result: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopHeader<'a> {
    pub id: &'a str,
    pub var: &'a str,
    pub var_type: Option<&'a TypeRef<'a>>,
    pub label: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchHeader<'a> {
    pub exception_type: Option<&'a TypeRef<'a>>,
    pub variable: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsingHeader<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub ty: Option<&'a TypeRef<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionHeader<'a> {
    pub id: &'a str,
    pub element_type: Option<&'a TypeRef<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowHeader<'a> {
    pub exception_type: Option<&'a TypeRef<'a>>,
    pub message: Option<&'a str>,
}

// ============================================================================
// Text helpers
// ============================================================================

/// Split on `sep` wherever it is not nested in `<>`, `[]` or `()`.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Byte index of the last `ch` not nested in brackets.
fn find_last_top_level(text: &str, target: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut found = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            c if c == target && depth == 0 => found = Some(i),
            _ => {}
        }
    }
    found
}

/// Whether `text` is `[...]` with the opening bracket closed at the very end.
fn is_bracketed(text: &str) -> bool {
    if !text.starts_with('[') || !text.ends_with(']') {
        return false;
    }
    let mut depth = 0i32;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// `~name` → (`name`, mutable).
pub fn strip_mutability(text: &str) -> (&str, bool) {
    match text.strip_prefix('~') {
        Some(name) => (name.trim(), true),
        None => (text, false),
    }
}

/// `target!` → (`target`, fallible).
pub fn strip_fallible(text: &str) -> (&str, bool) {
    match text.strip_suffix('!') {
        Some(target) => (target.trim_end(), true),
        None => (text, false),
    }
}

/// Whether every comma-separated part is a modifier keyword.
pub fn is_modifier_set(text: &str) -> bool {
    let parts = split_top_level(text, ',');
    !parts.is_empty() && parts.iter().all(|p| ModifierFlags::from_keyword(p).is_some())
}

pub fn visibility(text: Option<&str>) -> Visibility {
    text.and_then(Visibility::from_keyword).unwrap_or_default()
}

/// Comma-separated modifier keywords; unknown words are ignored.
pub fn modifiers(text: Option<&str>) -> ModifierFlags {
    text.map(|t| {
        split_top_level(t, ',')
            .into_iter()
            .filter_map(ModifierFlags::from_keyword)
            .fold(ModifierFlags::NONE, |acc, m| acc | m)
    })
    .unwrap_or_default()
}

pub fn complexity_class(text: &str) -> ComplexityClass<'_> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    let inner = normalized
        .strip_prefix("o(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(&normalized);
    COMPLEXITY_TABLE
        .iter()
        .find(|(key, _)| *key == inner)
        .map(|(_, class)| *class)
        .unwrap_or(ComplexityClass::Other(text.trim()))
}

// ============================================================================
// Interpreter
// ============================================================================

/// Maps attribute collections to typed records allocated in the arena.
#[derive(Clone, Copy)]
pub struct Interpreter<'a> {
    arena: &'a Bump,
}

impl<'a> Interpreter<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self { arena }
    }

    #[inline]
    fn alloc_str(&self, text: &str) -> &'a str {
        self.arena.alloc_str(text)
    }

    fn text(&self, attrs: &AttributeCollection, index: usize) -> Option<&'a str> {
        attrs.text(index).map(|t| self.alloc_str(t))
    }

    fn required_text(&self, attrs: &AttributeCollection, index: usize) -> &'a str {
        self.text(attrs, index).unwrap_or("")
    }

    fn named(&self, attrs: &AttributeCollection, key: &str) -> Option<&'a str> {
        attrs.named(key).map(|v| self.alloc_str(v.as_str()))
    }

    fn names(&self, texts: impl Iterator<Item = String>) -> &'a [&'a str] {
        let names: Vec<&'a str> = texts
            .flat_map(|t| {
                split_top_level(&t, ',')
                    .into_iter()
                    .map(|p| self.alloc_str(p))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.arena.alloc_slice_copy(&names)
    }

    // ------------------------------------------------------------------------
    // Type notation
    // ------------------------------------------------------------------------

    /// Expand type notation into a descriptor. Expanding the rendering of a
    /// descriptor gives the same descriptor back.
    pub fn expand_type(&self, text: &str) -> &'a TypeRef<'a> {
        self.arena.alloc(self.expand(text.trim()))
    }

    fn optional_type(&self, attrs: &AttributeCollection, index: usize) -> Option<&'a TypeRef<'a>> {
        attrs.text(index).map(|t| self.expand_type(t))
    }

    fn required_type(&self, attrs: &AttributeCollection, index: usize) -> &'a TypeRef<'a> {
        self.optional_type(attrs, index)
            .unwrap_or_else(|| self.arena.alloc(TypeRef::Named("?")))
    }

    fn expand(&self, text: &str) -> TypeRef<'a> {
        if text.is_empty() || text == "?" {
            return TypeRef::Named(self.alloc_str(text));
        }
        if let Some(bang) = find_last_top_level(text, '!') {
            let ok = text[..bang].trim();
            let err = text[bang + 1..].trim();
            if !ok.is_empty() {
                let err = if err.is_empty() {
                    TypeRef::STR
                } else {
                    self.expand(err)
                };
                return TypeRef::Result {
                    ok: self.arena.alloc(self.expand(ok)),
                    err: self.arena.alloc(err),
                };
            }
        }
        if let Some(inner) = text.strip_prefix('?') {
            return TypeRef::Option(self.arena.alloc(self.expand(inner.trim())));
        }
        if is_bracketed(text) {
            return TypeRef::Array(self.arena.alloc(self.expand(text[1..text.len() - 1].trim())));
        }
        if let Some(element) = text.strip_suffix("[]") {
            return TypeRef::Array(self.arena.alloc(self.expand(element.trim())));
        }
        if let (Some(open), true) = (text.find('<'), text.ends_with('>')) {
            let name = text[..open].trim();
            let args: Vec<TypeRef<'a>> = split_top_level(&text[open + 1..text.len() - 1], ',')
                .into_iter()
                .map(|arg| self.expand(arg))
                .collect();
            return match (name, args.as_slice()) {
                ("Option", [inner]) => TypeRef::Option(self.arena.alloc(*inner)),
                ("Result", [ok, err]) => TypeRef::Result {
                    ok: self.arena.alloc(*ok),
                    err: self.arena.alloc(*err),
                },
                _ => TypeRef::Generic {
                    name: self.alloc_str(name),
                    args: self.arena.alloc_slice_copy(&args),
                },
            };
        }
        match Primitive::from_code(text) {
            Some(primitive) => TypeRef::Primitive(primitive),
            None => TypeRef::Named(self.alloc_str(text)),
        }
    }

    // ------------------------------------------------------------------------
    // Contract sections
    // ------------------------------------------------------------------------

    /// Effect codes → (category, value). Codes of one category accumulate in
    /// first-seen order; unknown codes land in `custom`.
    pub fn effects(&self, attrs: &AttributeCollection) -> &'a [Effect<'a>] {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for value in attrs.rest(0) {
            for code in split_top_level(value.as_str(), ',') {
                let (category, value) = EFFECT_TABLE
                    .iter()
                    .find(|(c, _, _)| *c == code)
                    .map(|(_, category, value)| (*category, *value))
                    .unwrap_or(("custom", code));
                match grouped.iter_mut().find(|(c, _)| c == category) {
                    Some((_, values)) => {
                        if !values.iter().any(|v| v == value) {
                            values.push(value.to_string());
                        }
                    }
                    None => grouped.push((category.to_string(), vec![value.to_string()])),
                }
            }
        }
        let effects: Vec<Effect<'a>> = grouped
            .iter()
            .map(|(category, values)| Effect {
                category: self.alloc_str(category),
                value: self.alloc_str(&values.join(",")),
            })
            .collect();
        self.arena.alloc_slice_copy(&effects)
    }

    /// Semantic annotations: quoted text verbatim, `#code` through the
    /// shortcode table, unknown codes without their marker.
    pub fn semantics(&self, attrs: &AttributeCollection) -> &'a [&'a str] {
        let phrases: Vec<&'a str> = attrs
            .rest(0)
            .map(|value| match value.kind {
                AttrKind::Quoted(ref text) => self.alloc_str(text),
                _ => match value.text.strip_prefix('#') {
                    Some(code) => SEMANTIC_TABLE
                        .iter()
                        .find(|(c, _)| *c == code)
                        .map(|(_, phrase)| *phrase)
                        .unwrap_or_else(|| self.alloc_str(code)),
                    None => self.alloc_str(&value.text),
                },
            })
            .collect();
        self.arena.alloc_slice_copy(&phrases)
    }

    pub fn complexity(&self, attrs: &AttributeCollection) -> Option<Complexity<'a>> {
        let time = self.text(attrs, 0)?;
        Some(Complexity {
            time: complexity_class(time),
            space: self.text(attrs, 1).map(complexity_class),
        })
    }

    pub fn dependencies(&self, attrs: &AttributeCollection) -> Dependencies<'a> {
        let mut items = Vec::new();
        let mut unknown_callers = false;
        for value in attrs.rest(0) {
            for entry in split_top_level(value.as_str(), ',') {
                if entry == "*" || entry == "external" {
                    unknown_callers = true;
                    continue;
                }
                let (entry, optional) = match entry.strip_suffix('?') {
                    Some(rest) => (rest, true),
                    None => (entry, false),
                };
                let (name, version) = match entry.split_once('@') {
                    Some((name, version)) => (name.trim(), Some(self.alloc_str(version.trim()))),
                    None => (entry, None),
                };
                items.push(Dependency {
                    name: self.alloc_str(name),
                    version,
                    optional,
                });
            }
        }
        Dependencies {
            items: self.arena.alloc_slice_copy(&items),
            unknown_callers,
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// `id:name:visibility?:modifiers?`
    pub fn function_header(&self, attrs: &AttributeCollection) -> FunctionHeader<'a> {
        FunctionHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            visibility: visibility(attrs.text(2)),
            modifiers: modifiers(attrs.text(3)),
            doc: self.named(attrs, "doc"),
        }
    }

    /// `id:visibility?`; the name is supplied by the enclosing class.
    pub fn constructor_header(&self, attrs: &AttributeCollection, class_name: &'a str) -> FunctionHeader<'a> {
        FunctionHeader {
            id: self.required_text(attrs, 0),
            name: class_name,
            visibility: visibility(attrs.text(1)),
            modifiers: ModifierFlags::NONE,
            doc: self.named(attrs, "doc"),
        }
    }

    /// `~?name:type`; a default value at position 2 is read by the parser.
    pub fn param(&self, attrs: &AttributeCollection) -> ParamHeader<'a> {
        let (name, mutable) = strip_mutability(attrs.text(0).unwrap_or(""));
        ParamHeader {
            name: self.alloc_str(name),
            mutable,
            ty: self.required_type(attrs, 1),
        }
    }

    pub fn output(&self, attrs: &AttributeCollection) -> &'a TypeRef<'a> {
        self.required_type(attrs, 0)
    }

    /// `id:name:(base|visibility)?:modifiers?`
    ///
    /// With four positions, a visibility keyword at position 2 is the class
    /// visibility and anything else there is the base class. With three,
    /// position 2 is the modifier set when every part of it is a modifier
    /// keyword and the base class otherwise, so a base class that happens to
    /// be named like a modifier is read as a modifier.
    pub fn class_header(&self, attrs: &AttributeCollection) -> ClassHeader<'a> {
        let third = attrs.text(2);
        let (visibility, base, mut modifiers) = if attrs.count() >= 4 {
            match third.and_then(Visibility::from_keyword) {
                Some(v) => (v, None, modifiers(attrs.text(3))),
                None => (Visibility::Private, third, modifiers(attrs.text(3))),
            }
        } else if third.map_or(false, is_modifier_set) {
            (Visibility::Private, None, modifiers(third))
        } else {
            (Visibility::Private, third, ModifierFlags::NONE)
        };

        let dropped_abstract = modifiers.contains(ModifierFlags::STRUCT | ModifierFlags::ABSTRACT);
        if dropped_abstract {
            modifiers.remove(ModifierFlags::ABSTRACT);
        }

        ClassHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            visibility,
            base: base.map(|b| self.alloc_str(b)),
            modifiers,
            dropped_abstract,
            doc: self.named(attrs, "doc"),
        }
    }

    /// `id:name:visibility?:extends?`
    pub fn interface_header(&self, attrs: &AttributeCollection) -> InterfaceHeader<'a> {
        InterfaceHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            visibility: visibility(attrs.text(2)),
            extends: self.names(attrs.text(3).map(str::to_string).into_iter()),
        }
    }

    /// `id:name:visibility?:underlying?`
    pub fn enum_header(&self, attrs: &AttributeCollection) -> EnumHeader<'a> {
        EnumHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            visibility: visibility(attrs.text(2)),
            underlying: self.optional_type(attrs, 3),
        }
    }

    /// `name:value?`; the value is read by the parser.
    pub fn variant(&self, attrs: &AttributeCollection) -> &'a str {
        self.required_text(attrs, 0)
    }

    /// `~?name:type:visibility?:modifiers?`
    pub fn field(&self, attrs: &AttributeCollection) -> FieldHeader<'a> {
        let (name, mutable) = strip_mutability(attrs.text(0).unwrap_or(""));
        FieldHeader {
            name: self.alloc_str(name),
            mutable,
            ty: self.required_type(attrs, 1),
            visibility: visibility(attrs.text(2)),
            modifiers: modifiers(attrs.text(3)),
        }
    }

    /// `id:name:type:visibility?:modifiers?`
    pub fn property_header(&self, attrs: &AttributeCollection) -> PropertyHeader<'a> {
        PropertyHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            ty: self.required_type(attrs, 2),
            visibility: visibility(attrs.text(3)),
            modifiers: modifiers(attrs.text(4)),
        }
    }

    /// `id:name:visibility?`
    pub fn delegate_header(&self, attrs: &AttributeCollection) -> ScopeHeader<'a> {
        ScopeHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            visibility: visibility(attrs.text(2)),
        }
    }

    /// `id:name`
    pub fn module_header(&self, attrs: &AttributeCollection) -> ScopeHeader<'a> {
        ScopeHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            visibility: Visibility::Public,
        }
    }

    /// Type parameter names, one per position or comma-separated.
    pub fn type_params(&self, attrs: &AttributeCollection) -> &'a [&'a str] {
        self.names(attrs.rest(0).map(|v| v.text.clone()))
    }

    /// `name:constraint*`
    pub fn where_clause(&self, attrs: &AttributeCollection) -> Option<(&'a str, Vec<TypeRef<'a>>)> {
        let name = self.text(attrs, 0)?;
        let constraints = attrs
            .rest(1)
            .flat_map(|v| split_top_level(&v.text, ',').into_iter().map(|c| self.expand(c)).collect::<Vec<_>>())
            .collect();
        Some((name, constraints))
    }

    pub fn implements(&self, attrs: &AttributeCollection) -> &'a [&'a str] {
        self.names(attrs.rest(0).map(|v| v.text.clone()))
    }

    /// `path:alias?`
    pub fn import(&self, attrs: &AttributeCollection) -> (&'a str, Option<&'a str>) {
        (self.required_text(attrs, 0), self.text(attrs, 1))
    }

    /// `key:value`
    pub fn metadata(&self, attrs: &AttributeCollection) -> (&'a str, &'a str) {
        (self.required_text(attrs, 0), self.required_text(attrs, 1))
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    /// `~?name:type?`
    pub fn bind(&self, attrs: &AttributeCollection) -> BindHeader<'a> {
        let (name, mutable) = strip_mutability(attrs.text(0).unwrap_or(""));
        BindHeader {
            name: self.alloc_str(name),
            mutable,
            ty: self.optional_type(attrs, 1),
        }
    }

    /// `target:op?`
    pub fn assign(&self, attrs: &AttributeCollection) -> AssignHeader<'a> {
        AssignHeader {
            target: self.required_text(attrs, 0),
            op: attrs.text(1).and_then(BinaryOp::from_symbol),
        }
    }

    /// `target!?:result?`
    pub fn call_target(&self, attrs: &AttributeCollection) -> CallTarget<'a> {
        let (target, fallible) = strip_fallible(attrs.text(0).unwrap_or(""));
        CallTarget {
            target: self.alloc_str(target),
            fallible,
            result: self.text(attrs, 1),
        }
    }

    /// `id:var:start:end:step?`; the bounds are read by the parser.
    pub fn for_header(&self, attrs: &AttributeCollection) -> LoopHeader<'a> {
        LoopHeader {
            id: self.required_text(attrs, 0),
            var: self.required_text(attrs, 1),
            var_type: None,
            label: self.named(attrs, "label"),
        }
    }

    /// `id:var:collection:type?`; the collection is read by the parser.
    pub fn foreach_header(&self, attrs: &AttributeCollection) -> LoopHeader<'a> {
        LoopHeader {
            id: self.required_text(attrs, 0),
            var: self.required_text(attrs, 1),
            var_type: self.optional_type(attrs, 3),
            label: self.named(attrs, "label"),
        }
    }

    /// `id`, plus an optional `label=`.
    pub fn loop_header(&self, attrs: &AttributeCollection) -> LoopHeader<'a> {
        LoopHeader {
            id: self.required_text(attrs, 0),
            var: "",
            var_type: None,
            label: self.named(attrs, "label"),
        }
    }

    /// `type?:variable?`
    pub fn catch_clause(&self, attrs: &AttributeCollection) -> CatchHeader<'a> {
        CatchHeader {
            exception_type: self.optional_type(attrs, 0),
            variable: self.text(attrs, 1),
        }
    }

    /// `id:name:type?`
    pub fn using_header(&self, attrs: &AttributeCollection) -> UsingHeader<'a> {
        UsingHeader {
            id: self.required_text(attrs, 0),
            name: self.required_text(attrs, 1),
            ty: self.optional_type(attrs, 2),
        }
    }

    /// `id:type?`; position 2 (size or value type) is read by the parser.
    pub fn collection_header(&self, attrs: &AttributeCollection) -> CollectionHeader<'a> {
        CollectionHeader {
            id: self.required_text(attrs, 0),
            element_type: self.optional_type(attrs, 1),
        }
    }

    /// `type?` plus `msg=`.
    pub fn throw_header(&self, attrs: &AttributeCollection) -> ThrowHeader<'a> {
        ThrowHeader {
            exception_type: self.optional_type(attrs, 0),
            message: self.named(attrs, "msg"),
        }
    }

    pub fn label(&self, attrs: &AttributeCollection) -> Option<&'a str> {
        self.text(attrs, 0).or_else(|| self.named(attrs, "label"))
    }

    pub fn message(&self, attrs: &AttributeCollection) -> Option<&'a str> {
        self.named(attrs, "msg").or_else(|| self.text(attrs, 0))
    }

    pub fn optional_type_at(&self, attrs: &AttributeCollection, index: usize) -> Option<&'a TypeRef<'a>> {
        self.optional_type(attrs, index)
    }

    pub fn text_at(&self, attrs: &AttributeCollection, index: usize) -> Option<&'a str> {
        self.text(attrs, index)
    }
}
